//! Mapping of raw response payloads to card level outcomes
//!
//! Every function takes the payload delivered for one request, which is
//! `Value::Null` when the link closed before an answer arrived. Payloads that
//! cannot be parsed and responses reporting an error yield
//! [`CardReturnCode::CommandFailed`] unless an operation defines a more
//! specific outcome.

use serde_json::Value;
use tracing::{debug, warn};

use crate::LOG_TARGET;
use crate::apdu::ResponseApdu;
use crate::ecard::ResultMinor;
use crate::messages::{
    IfdConnectResponse, IfdDestroyPaceChannelResponse, IfdDisconnectResponse,
    IfdEstablishPaceChannelResponse, IfdModifyPinResponse, IfdResponse, IfdTransmitResponse,
};
use crate::pace::{EstablishPaceChannelOutput, PacePasswordId};
use crate::return_code::{CardReturnCode, ResponseApduResult};

fn parse<R: IfdResponse>(payload: &Value) -> Result<R, CardReturnCode> {
    R::from_payload(payload).map_err(|err| {
        debug!(target: LOG_TARGET, expected = %R::MESSAGE_TYPE, %err, "Incomplete response");
        CardReturnCode::CommandFailed
    })
}

fn check<R: IfdResponse>(response: &R) -> Result<(), CardReturnCode> {
    if response.result().has_error() {
        warn!(
            target: LOG_TARGET,
            expected = %R::MESSAGE_TYPE,
            result = %response.result(),
            "Remote reader reported an error"
        );
        return Err(CardReturnCode::CommandFailed);
    }
    Ok(())
}

/// Slot handle of a successful connect response
pub fn connect(payload: &Value) -> Result<String, CardReturnCode> {
    let response: IfdConnectResponse = parse(payload)?;
    check(&response)?;
    Ok(response.slot_handle)
}

/// Outcome of a disconnect response
pub fn disconnect(payload: &Value) -> Result<(), CardReturnCode> {
    let response: IfdDisconnectResponse = parse(payload)?;
    check(&response)
}

/// Response APDU of a transmit response
pub fn transmit(payload: &Value) -> Result<ResponseApdu, CardReturnCode> {
    let response: IfdTransmitResponse = parse(payload)?;
    check(&response)?;
    Ok(response.response_apdu)
}

/// Output of an establish PACE channel response
///
/// A missing card or an invalid slot handle yields
/// [`CardReturnCode::CardNotFound`].
pub fn establish_pace_channel(payload: &Value, password_id: PacePasswordId) -> EstablishPaceChannelOutput {
    let response: IfdEstablishPaceChannelResponse = match parse(payload) {
        Ok(response) => response,
        Err(code) => return EstablishPaceChannelOutput::new(code),
    };

    if response.result.is_minor(&ResultMinor::IfdlTerminalNoCard)
        || response.result.is_minor(&ResultMinor::IfdlInvalidSlotHandle)
    {
        warn!(target: LOG_TARGET, result = %response.result, "Card vanished before PACE");
        return EstablishPaceChannelOutput::new(CardReturnCode::CardNotFound);
    }
    if let Err(code) = check(&response) {
        return EstablishPaceChannelOutput::new(code);
    }

    EstablishPaceChannelOutput::from_ccid(&response.output_data, password_id).unwrap_or_else(|err| {
        debug!(target: LOG_TARGET, %err, "Malformed PACE output");
        EstablishPaceChannelOutput::new(CardReturnCode::CommandFailed)
    })
}

/// Outcome of a destroy PACE channel response
pub fn destroy_pace_channel(payload: &Value) -> Result<(), CardReturnCode> {
    let response: IfdDestroyPaceChannelResponse = parse(payload)?;
    check(&response)
}

/// Result of a modify PIN response
///
/// On failure the return code follows the minor result and the output bytes
/// received so far are kept.
pub fn modify_pin(payload: &Value) -> ResponseApduResult {
    let response: IfdModifyPinResponse = match parse(payload) {
        Ok(response) => response,
        Err(code) => return code.into(),
    };

    let output = ResponseApdu::new(response.output_data);
    if response.result.has_error() {
        let return_code = response
            .result
            .minor
            .as_ref()
            .map_or(CardReturnCode::Unknown, ResultMinor::pin_pad_return_code);
        warn!(
            target: LOG_TARGET,
            result = %response.result,
            %return_code,
            "PIN modification failed"
        );
        return ResponseApduResult::new(return_code, output);
    }

    ResponseApduResult::new(CardReturnCode::Ok, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecard::ECardApiResult;
    use bytes::Bytes;
    use serde_json::json;

    const OK: &str = "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#ok";

    #[test]
    fn test_closed_link_fails_every_operation() {
        assert_eq!(connect(&Value::Null), Err(CardReturnCode::CommandFailed));
        assert_eq!(disconnect(&Value::Null), Err(CardReturnCode::CommandFailed));
        assert_eq!(transmit(&Value::Null), Err(CardReturnCode::CommandFailed));
        assert_eq!(destroy_pace_channel(&Value::Null), Err(CardReturnCode::CommandFailed));
        assert_eq!(
            establish_pace_channel(&Value::Null, PacePasswordId::Pin).return_code,
            CardReturnCode::CommandFailed
        );
        assert_eq!(modify_pin(&Value::Null).return_code, CardReturnCode::CommandFailed);
    }

    #[test]
    fn test_connect_error() {
        let payload = IfdConnectResponse {
            result: ECardApiResult::error(ResultMinor::AlUnknownError),
            slot_handle: String::new(),
        }
        .to_value();
        assert_eq!(connect(&payload), Err(CardReturnCode::CommandFailed));
    }

    #[test]
    fn test_transmit_success() {
        let payload = json!({
            "msg": "IFDTransmitResponse",
            "ResultMajor": OK,
            "ResponseAPDU": "01029000"
        });
        let response = transmit(&payload).unwrap();
        assert_eq!(response.data(), &[0x01, 0x02]);
        assert!(response.status_word().unwrap().is_success());
    }

    #[test]
    fn test_pace_not_found_minors() {
        for minor in [ResultMinor::IfdlTerminalNoCard, ResultMinor::IfdlInvalidSlotHandle] {
            let payload = IfdEstablishPaceChannelResponse {
                result: ECardApiResult::error(minor),
                output_data: Bytes::new(),
            }
            .to_value();
            assert_eq!(
                establish_pace_channel(&payload, PacePasswordId::Pin).return_code,
                CardReturnCode::CardNotFound
            );
        }

        let payload = IfdEstablishPaceChannelResponse {
            result: ECardApiResult::error(ResultMinor::IfdlTimeoutError),
            output_data: Bytes::new(),
        }
        .to_value();
        assert_eq!(
            establish_pace_channel(&payload, PacePasswordId::Pin).return_code,
            CardReturnCode::CommandFailed
        );
    }

    #[test]
    fn test_pace_output_is_parsed() {
        let output = EstablishPaceChannelOutput {
            return_code: CardReturnCode::InvalidPin,
            pace_return_code: 0xF002_63C2,
            ..EstablishPaceChannelOutput::default()
        };
        let payload = IfdEstablishPaceChannelResponse {
            result: ECardApiResult::ok(),
            output_data: output.to_ccid(),
        }
        .to_value();
        let parsed = establish_pace_channel(&payload, PacePasswordId::Pin);
        assert_eq!(parsed.return_code, CardReturnCode::InvalidPin);
        assert_eq!(parsed.pace_return_code, 0xF002_63C2);

        let payload = IfdEstablishPaceChannelResponse {
            result: ECardApiResult::ok(),
            output_data: Bytes::from_static(&[0x00]),
        }
        .to_value();
        assert_eq!(
            establish_pace_channel(&payload, PacePasswordId::Pin).return_code,
            CardReturnCode::CommandFailed
        );
    }

    #[test]
    fn test_modify_pin_error_keeps_output() {
        let payload = IfdModifyPinResponse {
            result: ECardApiResult::error(ResultMinor::IfdlCancellationByUser),
            output_data: Bytes::from_static(&[0x64, 0x01]),
        }
        .to_value();
        let result = modify_pin(&payload);
        assert_eq!(result.return_code, CardReturnCode::CancellationByUser);
        assert_eq!(result.response_apdu.as_bytes().to_vec(), vec![0x64, 0x01]);

        let payload = json!({
            "msg": "IFDModifyPINResponse",
            "ResultMajor": "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#error"
        });
        let result = modify_pin(&payload);
        assert_eq!(result.return_code, CardReturnCode::Unknown);
        assert!(result.response_apdu.is_empty());
    }

    #[test]
    fn test_modify_pin_without_card() {
        for minor in [ResultMinor::IfdlTerminalNoCard, ResultMinor::IfdlInvalidSlotHandle] {
            let payload = IfdModifyPinResponse {
                result: ECardApiResult::error(minor),
                output_data: Bytes::new(),
            }
            .to_value();
            assert_eq!(modify_pin(&payload).return_code, CardReturnCode::CardNotFound);
        }

        let payload = IfdModifyPinResponse {
            result: ECardApiResult::error(ResultMinor::AlCommunicationError),
            output_data: Bytes::new(),
        }
        .to_value();
        assert_eq!(modify_pin(&payload).return_code, CardReturnCode::Unknown);
    }

    #[test]
    fn test_modify_pin_success() {
        let payload = IfdModifyPinResponse {
            result: ECardApiResult::ok(),
            output_data: Bytes::from_static(&[0x90, 0x00]),
        }
        .to_value();
        let result = modify_pin(&payload);
        assert_eq!(result.return_code, CardReturnCode::Ok);
        assert_eq!(result.response_apdu.status_word().map(|sw| sw.to_u16()), Some(0x9000));
    }
}
