use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{HexBytes, IfdMessageType};
use crate::apdu::CommandApdu;

/// Request sent to the remote reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg")]
pub enum IfdMessage {
    /// Connect to a card slot
    #[serde(rename = "IFDConnect")]
    Connect(IfdConnect),
    /// Disconnect from a card slot
    #[serde(rename = "IFDDisconnect")]
    Disconnect(IfdDisconnect),
    /// Transmit an APDU
    #[serde(rename = "IFDTransmit")]
    Transmit(IfdTransmit),
    /// Establish a PACE channel
    #[serde(rename = "IFDEstablishPACEChannel")]
    EstablishPaceChannel(IfdEstablishPaceChannel),
    /// Destroy the PACE channel
    #[serde(rename = "IFDDestroyPACEChannel")]
    DestroyPaceChannel(IfdDestroyPaceChannel),
    /// Modify the PIN
    #[serde(rename = "IFDModifyPIN")]
    ModifyPin(IfdModifyPin),
}

impl IfdMessage {
    /// Kind of the request
    pub const fn message_type(&self) -> IfdMessageType {
        match self {
            Self::Connect(_) => IfdMessageType::IfdConnect,
            Self::Disconnect(_) => IfdMessageType::IfdDisconnect,
            Self::Transmit(_) => IfdMessageType::IfdTransmit,
            Self::EstablishPaceChannel(_) => IfdMessageType::IfdEstablishPaceChannel,
            Self::DestroyPaceChannel(_) => IfdMessageType::IfdDestroyPaceChannel,
            Self::ModifyPin(_) => IfdMessageType::IfdModifyPin,
        }
    }

    /// Slot handle addressed by the request, if any
    pub fn slot_handle(&self) -> Option<&str> {
        match self {
            Self::Connect(_) => None,
            Self::Disconnect(msg) => Some(&msg.slot_handle),
            Self::Transmit(msg) => Some(&msg.slot_handle),
            Self::EstablishPaceChannel(msg) => Some(&msg.slot_handle),
            Self::DestroyPaceChannel(msg) => Some(&msg.slot_handle),
            Self::ModifyPin(msg) => Some(&msg.slot_handle),
        }
    }

    /// Encode the request as a JSON object
    pub fn to_value(&self) -> serde_json::Value {
        // Every field is a string, number or boolean, so encoding cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Connect to the card in the named slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IfdConnect {
    /// Name of the slot on the remote side
    pub slot_name: String,
    /// Request exclusive access to the card
    #[serde(rename = "ExclusiveAccess")]
    pub exclusive: bool,
}

/// Release the connection identified by the slot handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IfdDisconnect {
    /// Handle of the connected slot
    pub slot_handle: String,
}

/// Transmit a command APDU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IfdTransmit {
    /// Handle of the connected slot
    pub slot_handle: String,
    #[serde(rename = "InputAPDU")]
    input_apdu: HexBytes,
    /// Text the remote side shows while the command runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl IfdTransmit {
    /// Create a transmit request from raw command bytes
    pub fn new(slot_handle: impl Into<String>, input_apdu: Bytes, display_text: Option<String>) -> Self {
        Self {
            slot_handle: slot_handle.into(),
            input_apdu: input_apdu.into(),
            display_text,
        }
    }

    /// Encoded command APDU
    pub const fn input_apdu(&self) -> &Bytes {
        &self.input_apdu.0
    }

    /// Parse the carried command APDU
    pub fn command(&self) -> Result<CommandApdu, crate::apdu::ApduError> {
        CommandApdu::from_bytes(self.input_apdu())
    }
}

/// Ask the remote PIN pad to establish a PACE channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IfdEstablishPaceChannel {
    /// Handle of the connected slot
    pub slot_handle: String,
    input_data: HexBytes,
    /// Preferred PIN length, 0 for no preference
    pub preferred_pin_length: u8,
}

impl IfdEstablishPaceChannel {
    /// Create a request carrying an encoded CCID input structure
    pub fn new(slot_handle: impl Into<String>, input_data: Bytes, preferred_pin_length: u8) -> Self {
        Self {
            slot_handle: slot_handle.into(),
            input_data: input_data.into(),
            preferred_pin_length,
        }
    }

    /// Encoded CCID input structure
    pub const fn input_data(&self) -> &Bytes {
        &self.input_data.0
    }
}

/// Tear down the PACE channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IfdDestroyPaceChannel {
    /// Handle of the connected slot
    pub slot_handle: String,
}

/// Ask the remote PIN pad to modify the PIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IfdModifyPin {
    /// Handle of the connected slot
    pub slot_handle: String,
    input_data: HexBytes,
}

impl IfdModifyPin {
    /// Create a request carrying an encoded PIN_MODIFY structure
    pub fn new(slot_handle: impl Into<String>, input_data: Bytes) -> Self {
        Self {
            slot_handle: slot_handle.into(),
            input_data: input_data.into(),
        }
    }

    /// Encoded PIN_MODIFY structure
    pub const fn input_data(&self) -> &Bytes {
        &self.input_data.0
    }
}
