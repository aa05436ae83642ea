//! Unified status value for the remote eID terminal
//!
//! Every layer reports the outcome of an operation as a [`Status`]: a code
//! from a closed taxonomy ([`StatusCode`]), the [`Origin`] that raised it and
//! a map of supplementary context fields ([`ExternalInformation`]).
//!
//! Statuses are plain immutable values. They render a localisable
//! description in a detailed and a simplified flavour; which codes get their
//! simplified description masked is decided by a [`MaskPolicy`].
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

mod code;
mod description;
mod info;
mod mask;
mod status;

pub use code::{StatusCode, StatusDomain};
pub use info::{ExternalInfoMap, ExternalInformation, Origin};
pub use mask::MaskPolicy;
pub use status::Status;
