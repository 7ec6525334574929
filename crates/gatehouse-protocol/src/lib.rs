//! Wire protocol for Gatehouse.
//!
//! The proxy only needs to understand a handful of packets: the client's
//! connect handshake and the few replies the proxy itself may send before
//! handing the connection to the upstream game server.
//!
//! - **Types** ([`Packet`], [`ClientConnect`], [`PlayerUuid`]): the
//!   handshake-phase messages.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! ```text
//! Transport (bytes) → Protocol (Packet) → Auth (ConnectionAttempt)
//! ```
//!
//! Everything after an accepted handshake is relayed as opaque bytes and
//! never decoded by this crate.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientConnect, Packet, PlayerUuid};
