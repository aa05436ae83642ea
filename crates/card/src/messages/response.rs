use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{HexBytes, IfdMessageType, MessageError};
use crate::apdu::ResponseApdu;
use crate::ecard::{ECardApiResult, ResultMajor, ResultMinor};

/// Common fields of every response
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    #[serde(rename = "msg")]
    msg: Option<IfdMessageType>,
    result_major: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_minor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slot_handle: Option<String>,
    #[serde(default, rename = "ResponseAPDU", skip_serializing_if = "Option::is_none")]
    response_apdu: Option<HexBytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_data: Option<HexBytes>,
}

impl Envelope {
    fn parse(payload: &Value, expected: IfdMessageType) -> Result<(Self, ECardApiResult), MessageError> {
        let envelope = Self::deserialize(payload)?;
        match envelope.msg {
            Some(actual) if actual == expected || actual == IfdMessageType::IfdError => {}
            Some(actual) => return Err(MessageError::UnexpectedType { expected, actual }),
            None => return Err(MessageError::MissingField("msg")),
        }

        let result = ECardApiResult {
            major: ResultMajor::from_uri(&envelope.result_major)?,
            minor: envelope.result_minor.as_deref().map(ResultMinor::from_uri),
        };
        Ok((envelope, result))
    }

    fn new(msg: IfdMessageType, result: &ECardApiResult) -> Self {
        Self {
            msg: Some(msg),
            result_major: result.major.uri().to_owned(),
            result_minor: result.minor.as_ref().map(ResultMinor::uri),
            ..Self::default()
        }
    }

    fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Mandatory output of a successful response, optional otherwise
fn required<T>(value: Option<T>, result: &ECardApiResult, field: &'static str) -> Result<Option<T>, MessageError> {
    match value {
        None if !result.has_error() => Err(MessageError::MissingField(field)),
        value => Ok(value),
    }
}

/// Response parsed from a JSON payload
pub trait IfdResponse: Sized {
    /// Message type of the successful response
    const MESSAGE_TYPE: IfdMessageType;

    /// Parse the payload, accepting [`IfdMessageType::IfdError`] as well
    fn from_payload(payload: &Value) -> Result<Self, MessageError>;

    /// Result reported by the remote side
    fn result(&self) -> &ECardApiResult;

    /// Encode the response as a JSON object
    fn to_value(&self) -> Value;
}

/// Answer to a connect request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdConnectResponse {
    /// Result reported by the remote side
    pub result: ECardApiResult,
    /// Handle of the connected slot, empty on failure
    pub slot_handle: String,
}

impl IfdResponse for IfdConnectResponse {
    const MESSAGE_TYPE: IfdMessageType = IfdMessageType::IfdConnectResponse;

    fn from_payload(payload: &Value) -> Result<Self, MessageError> {
        let (envelope, result) = Envelope::parse(payload, Self::MESSAGE_TYPE)?;
        let slot_handle = required(envelope.slot_handle, &result, "SlotHandle")?.unwrap_or_default();
        Ok(Self { result, slot_handle })
    }

    fn result(&self) -> &ECardApiResult {
        &self.result
    }

    fn to_value(&self) -> Value {
        Envelope {
            slot_handle: Some(self.slot_handle.clone()),
            ..Envelope::new(Self::MESSAGE_TYPE, &self.result)
        }
        .into_value()
    }
}

/// Answer to a disconnect request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdDisconnectResponse {
    /// Result reported by the remote side
    pub result: ECardApiResult,
}

impl IfdResponse for IfdDisconnectResponse {
    const MESSAGE_TYPE: IfdMessageType = IfdMessageType::IfdDisconnectResponse;

    fn from_payload(payload: &Value) -> Result<Self, MessageError> {
        let (_, result) = Envelope::parse(payload, Self::MESSAGE_TYPE)?;
        Ok(Self { result })
    }

    fn result(&self) -> &ECardApiResult {
        &self.result
    }

    fn to_value(&self) -> Value {
        Envelope::new(Self::MESSAGE_TYPE, &self.result).into_value()
    }
}

/// Answer to a transmit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdTransmitResponse {
    /// Result reported by the remote side
    pub result: ECardApiResult,
    /// Response of the card, empty on failure
    pub response_apdu: ResponseApdu,
}

impl IfdResponse for IfdTransmitResponse {
    const MESSAGE_TYPE: IfdMessageType = IfdMessageType::IfdTransmitResponse;

    fn from_payload(payload: &Value) -> Result<Self, MessageError> {
        let (envelope, result) = Envelope::parse(payload, Self::MESSAGE_TYPE)?;
        let response_apdu = required(envelope.response_apdu, &result, "ResponseAPDU")?
            .map(|apdu| ResponseApdu::from(apdu.0))
            .unwrap_or_default();
        Ok(Self {
            result,
            response_apdu,
        })
    }

    fn result(&self) -> &ECardApiResult {
        &self.result
    }

    fn to_value(&self) -> Value {
        Envelope {
            response_apdu: Some(self.response_apdu.as_bytes().clone().into()),
            ..Envelope::new(Self::MESSAGE_TYPE, &self.result)
        }
        .into_value()
    }
}

/// Answer to an establish PACE channel request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdEstablishPaceChannelResponse {
    /// Result reported by the remote side
    pub result: ECardApiResult,
    /// Encoded CCID output structure, empty on failure
    pub output_data: Bytes,
}

impl IfdResponse for IfdEstablishPaceChannelResponse {
    const MESSAGE_TYPE: IfdMessageType = IfdMessageType::IfdEstablishPaceChannelResponse;

    fn from_payload(payload: &Value) -> Result<Self, MessageError> {
        let (envelope, result) = Envelope::parse(payload, Self::MESSAGE_TYPE)?;
        let output_data = required(envelope.output_data, &result, "OutputData")?
            .map(|data| data.0)
            .unwrap_or_default();
        Ok(Self {
            result,
            output_data,
        })
    }

    fn result(&self) -> &ECardApiResult {
        &self.result
    }

    fn to_value(&self) -> Value {
        Envelope {
            output_data: Some(self.output_data.clone().into()),
            ..Envelope::new(Self::MESSAGE_TYPE, &self.result)
        }
        .into_value()
    }
}

/// Answer to a destroy PACE channel request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdDestroyPaceChannelResponse {
    /// Result reported by the remote side
    pub result: ECardApiResult,
}

impl IfdResponse for IfdDestroyPaceChannelResponse {
    const MESSAGE_TYPE: IfdMessageType = IfdMessageType::IfdDestroyPaceChannelResponse;

    fn from_payload(payload: &Value) -> Result<Self, MessageError> {
        let (_, result) = Envelope::parse(payload, Self::MESSAGE_TYPE)?;
        Ok(Self { result })
    }

    fn result(&self) -> &ECardApiResult {
        &self.result
    }

    fn to_value(&self) -> Value {
        Envelope::new(Self::MESSAGE_TYPE, &self.result).into_value()
    }
}

/// Answer to a modify PIN request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdModifyPinResponse {
    /// Result reported by the remote side
    pub result: ECardApiResult,
    /// Response of the PIN pad, possibly partial on failure
    pub output_data: Bytes,
}

impl IfdResponse for IfdModifyPinResponse {
    const MESSAGE_TYPE: IfdMessageType = IfdMessageType::IfdModifyPinResponse;

    fn from_payload(payload: &Value) -> Result<Self, MessageError> {
        let (envelope, result) = Envelope::parse(payload, Self::MESSAGE_TYPE)?;
        let output_data = required(envelope.output_data, &result, "OutputData")?
            .map(|data| data.0)
            .unwrap_or_default();
        Ok(Self {
            result,
            output_data,
        })
    }

    fn result(&self) -> &ECardApiResult {
        &self.result
    }

    fn to_value(&self) -> Value {
        Envelope {
            output_data: Some(self.output_data.clone().into()),
            ..Envelope::new(Self::MESSAGE_TYPE, &self.result)
        }
        .into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OK: &str = "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#ok";
    const ERROR: &str = "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#error";

    #[test]
    fn test_connect_response() {
        let response = IfdConnectResponse::from_payload(&json!({
            "msg": "IFDConnectResponse",
            "ResultMajor": OK,
            "ResultMinor": null,
            "SlotHandle": "slot-1"
        }))
        .unwrap();
        assert!(!response.result.has_error());
        assert_eq!(response.slot_handle, "slot-1");
    }

    #[test]
    fn test_missing_output_on_success() {
        let err = IfdConnectResponse::from_payload(&json!({
            "msg": "IFDConnectResponse",
            "ResultMajor": OK
        }))
        .unwrap_err();
        assert!(matches!(err, MessageError::MissingField("SlotHandle")));
    }

    #[test]
    fn test_error_message_accepted() {
        let response = IfdTransmitResponse::from_payload(&json!({
            "msg": "IFDError",
            "ResultMajor": ERROR,
            "ResultMinor": "http://www.bsi.bund.de/ecard/api/1.1/resultminor/ifdl/common#invalidSlotHandle"
        }))
        .unwrap();
        assert!(response.result.has_error());
        assert!(response.result.is_minor(&ResultMinor::IfdlInvalidSlotHandle));
        assert!(response.response_apdu.is_empty());
    }

    #[test]
    fn test_unexpected_type() {
        let err = IfdDisconnectResponse::from_payload(&json!({
            "msg": "IFDTransmitResponse",
            "ResultMajor": OK,
            "ResponseAPDU": "9000"
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            MessageError::UnexpectedType {
                expected: IfdMessageType::IfdDisconnectResponse,
                actual: IfdMessageType::IfdTransmitResponse,
            }
        ));
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            IfdDestroyPaceChannelResponse::from_payload(&Value::Null),
            Err(MessageError::Malformed(_))
        ));
        assert!(matches!(
            IfdDestroyPaceChannelResponse::from_payload(&json!({"ResultMajor": OK})),
            Err(MessageError::MissingField("msg"))
        ));
        assert!(matches!(
            IfdDestroyPaceChannelResponse::from_payload(&json!({
                "msg": "IFDDestroyPACEChannelResponse",
                "ResultMajor": "ok"
            })),
            Err(MessageError::UnknownResultMajor(_))
        ));
    }

    #[test]
    fn test_encoded_response_parses() {
        let response = IfdModifyPinResponse {
            result: ECardApiResult::error(ResultMinor::IfdlTimeoutError),
            output_data: Bytes::from_static(&[0x64, 0x00]),
        };
        let value = response.to_value();
        assert_eq!(value["msg"], json!("IFDModifyPINResponse"));
        assert_eq!(value["OutputData"], json!("6400"));
        assert_eq!(IfdModifyPinResponse::from_payload(&value).unwrap(), response);
    }
}
