//! Messages of the remote reader protocol
//!
//! Requests are serialised to JSON objects tagged by their `msg` field.
//! Responses arrive as [`serde_json::Value`] payloads and are parsed into the
//! typed response structures; binary fields travel as hex strings.

mod request;
mod response;

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use request::{
    IfdConnect, IfdDestroyPaceChannel, IfdDisconnect, IfdEstablishPaceChannel, IfdMessage,
    IfdModifyPin, IfdTransmit,
};
pub use response::{
    IfdConnectResponse, IfdDestroyPaceChannelResponse, IfdDisconnectResponse,
    IfdEstablishPaceChannelResponse, IfdModifyPinResponse, IfdResponse, IfdTransmitResponse,
};

/// Errors raised while parsing protocol messages
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The payload is not a well formed message object
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The payload carries another message type than expected
    #[error("Unexpected message type {actual}, expected {expected}")]
    UnexpectedType {
        /// Expected message type
        expected: IfdMessageType,
        /// Received message type
        actual: IfdMessageType,
    },

    /// A field mandatory for successful responses is missing
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The message type is not part of the protocol
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// The major result is not part of the protocol
    #[error("Unknown result major: {0}")]
    UnknownResultMajor(String),
}

/// Kind of a protocol message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum IfdMessageType {
    /// Generic error answer to any request
    IfdError,
    /// Connect to a card slot
    IfdConnect,
    /// Answer to [`IfdMessageType::IfdConnect`]
    IfdConnectResponse,
    /// Disconnect from a card slot
    IfdDisconnect,
    /// Answer to [`IfdMessageType::IfdDisconnect`]
    IfdDisconnectResponse,
    /// Transmit an APDU
    IfdTransmit,
    /// Answer to [`IfdMessageType::IfdTransmit`]
    IfdTransmitResponse,
    /// Establish a PACE channel using the remote PIN pad
    IfdEstablishPaceChannel,
    /// Answer to [`IfdMessageType::IfdEstablishPaceChannel`]
    IfdEstablishPaceChannelResponse,
    /// Destroy the PACE channel
    IfdDestroyPaceChannel,
    /// Answer to [`IfdMessageType::IfdDestroyPaceChannel`]
    IfdDestroyPaceChannelResponse,
    /// Modify the PIN using the remote PIN pad
    IfdModifyPin,
    /// Answer to [`IfdMessageType::IfdModifyPin`]
    IfdModifyPinResponse,
}

impl IfdMessageType {
    const ALL: [Self; 13] = [
        Self::IfdError,
        Self::IfdConnect,
        Self::IfdConnectResponse,
        Self::IfdDisconnect,
        Self::IfdDisconnectResponse,
        Self::IfdTransmit,
        Self::IfdTransmitResponse,
        Self::IfdEstablishPaceChannel,
        Self::IfdEstablishPaceChannelResponse,
        Self::IfdDestroyPaceChannel,
        Self::IfdDestroyPaceChannelResponse,
        Self::IfdModifyPin,
        Self::IfdModifyPinResponse,
    ];

    /// Name used on the wire
    pub const fn name(self) -> &'static str {
        match self {
            Self::IfdError => "IFDError",
            Self::IfdConnect => "IFDConnect",
            Self::IfdConnectResponse => "IFDConnectResponse",
            Self::IfdDisconnect => "IFDDisconnect",
            Self::IfdDisconnectResponse => "IFDDisconnectResponse",
            Self::IfdTransmit => "IFDTransmit",
            Self::IfdTransmitResponse => "IFDTransmitResponse",
            Self::IfdEstablishPaceChannel => "IFDEstablishPACEChannel",
            Self::IfdEstablishPaceChannelResponse => "IFDEstablishPACEChannelResponse",
            Self::IfdDestroyPaceChannel => "IFDDestroyPACEChannel",
            Self::IfdDestroyPaceChannelResponse => "IFDDestroyPACEChannelResponse",
            Self::IfdModifyPin => "IFDModifyPIN",
            Self::IfdModifyPinResponse => "IFDModifyPINResponse",
        }
    }

    /// Look up a message type by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Message type answering this request type
    pub const fn response_type(self) -> Option<Self> {
        match self {
            Self::IfdConnect => Some(Self::IfdConnectResponse),
            Self::IfdDisconnect => Some(Self::IfdDisconnectResponse),
            Self::IfdTransmit => Some(Self::IfdTransmitResponse),
            Self::IfdEstablishPaceChannel => Some(Self::IfdEstablishPaceChannelResponse),
            Self::IfdDestroyPaceChannel => Some(Self::IfdDestroyPaceChannelResponse),
            Self::IfdModifyPin => Some(Self::IfdModifyPinResponse),
            _ => None,
        }
    }
}

impl TryFrom<String> for IfdMessageType {
    type Error = MessageError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::from_name(&name).ok_or(MessageError::UnknownMessageType(name))
    }
}

impl From<IfdMessageType> for &'static str {
    fn from(kind: IfdMessageType) -> Self {
        kind.name()
    }
}

impl fmt::Display for IfdMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary field encoded as an upper case hex string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HexBytes(pub(crate) Bytes);

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode_upper(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded)
            .map(|raw| Self(Bytes::from(raw)))
            .map_err(serde::de::Error::custom)
    }
}

impl From<Bytes> for HexBytes {
    fn from(raw: Bytes) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_names() {
        for kind in IfdMessageType::ALL {
            assert_eq!(IfdMessageType::from_name(kind.name()), Some(kind));
        }
        assert_eq!(IfdMessageType::from_name("IFDGetStatus"), None);
        assert_eq!(
            serde_json::to_value(IfdMessageType::IfdModifyPin).unwrap(),
            serde_json::json!("IFDModifyPIN")
        );
        assert!(serde_json::from_value::<IfdMessageType>(serde_json::json!("IFDUnknown")).is_err());
    }

    #[test]
    fn test_response_types() {
        assert_eq!(
            IfdMessageType::IfdTransmit.response_type(),
            Some(IfdMessageType::IfdTransmitResponse)
        );
        assert_eq!(IfdMessageType::IfdError.response_type(), None);
    }

    #[test]
    fn test_hex_bytes() {
        let encoded = serde_json::to_value(HexBytes(Bytes::from_static(&[0x90, 0x00]))).unwrap();
        assert_eq!(encoded, serde_json::json!("9000"));
        let decoded: HexBytes = serde_json::from_value(serde_json::json!("6a82")).unwrap();
        assert_eq!(&decoded.0[..], &[0x6A, 0x82]);
        assert!(serde_json::from_value::<HexBytes>(serde_json::json!("XYZ")).is_err());
    }
}
