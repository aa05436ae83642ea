//! Remote card client of the eID terminal
//!
//! A [`RemoteCard`] drives a card sitting in a remote reader. The reader is
//! reached through a [`MessageTransport`](transport::MessageTransport) that
//! delivers messages asynchronously; the session turns each request into a
//! blocking, timeout-bounded call.
//!
//! ## Overview
//!
//! - [`apdu`]: command and response APDUs
//! - [`messages`]: requests and responses of the remote reader protocol
//! - [`pace`] and [`pin_modify`]: PIN pad structures
//! - [`outcome`]: mapping of responses to [`CardReturnCode`]s
//! - [`transport`]: link contract, observer registry and an in-process
//!   loopback transport
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod apdu;
pub mod config;
pub mod ecard;
pub mod messages;
pub mod outcome;
pub mod pace;
pub mod pin_modify;
pub mod transport;

mod card;
mod exchange;
mod return_code;

pub use card::RemoteCard;
pub use config::{RemoteCardConfig, VolatileSettings};
pub use exchange::ExchangeError;
pub use return_code::{CardReturnCode, ResponseApduResult};

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Target of every log event emitted by remote card sessions
pub const LOG_TARGET: &str = "card_remote";

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, CardReturnCode, RemoteCard, RemoteCardConfig, ResponseApduResult, VolatileSettings,
        apdu::{CommandApdu, ResponseApdu, StatusWord},
        pace::{EstablishPaceChannelOutput, PacePasswordId},
        transport::{MessageTransport, TransportObserver},
    };
    pub use eid_remote_status::{Status, StatusCode};
}
