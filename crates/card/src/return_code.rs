//! Card level return codes and the results carrying them

use derive_more::Display;
use eid_remote_status::{Status, StatusCode};

use crate::apdu::ResponseApdu;

/// Outcome of a card operation
#[must_use]
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CardReturnCode {
    /// No outcome was determined yet
    #[default]
    Undefined,
    /// Unclassified failure
    Unknown,
    /// Success
    Ok,
    /// Success after the PUK unblocked the PIN
    OkPuk,
    /// Success after the CAN was used
    OkCan,
    /// No card is present, or the slot handle is invalid
    CardNotFound,
    /// The operation may be retried
    RetryAllowed,
    /// No answer within the timeout, or the PIN pad timed out
    InputTimeOut,
    /// The command could not be executed
    CommandFailed,
    /// The card violated the protocol
    ProtocolError,
    /// The card answered with an unexpected status word
    UnexpectedTransmitStatus,
    /// The user cancelled the PIN entry
    CancellationByUser,
    /// Wrong PIN, two attempts left
    InvalidPin,
    /// Wrong PIN, the PIN is suspended
    InvalidPin2,
    /// Wrong PIN, the PIN is blocked
    InvalidPin3,
    /// Wrong CAN
    InvalidCan,
    /// Wrong PUK
    InvalidPuk,
    /// The PIN is blocked
    PinBlocked,
    /// The PIN is not blocked
    PinNotBlocked,
    /// The PUK can no longer be used
    PukInoperative,
    /// The two new PIN entries differ
    NewPinMismatch,
    /// The new PIN has an invalid length
    NewPinInvalidLength,
}

impl CardReturnCode {
    /// Whether the code reports success
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::OkPuk | Self::OkCan)
    }

    /// Status code reported to the workflow for this outcome
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Ok | Self::OkPuk | Self::OkCan => StatusCode::NoError,
            Self::Undefined | Self::Unknown => StatusCode::UnknownError,
            Self::CardNotFound => StatusCode::CardNotFound,
            Self::RetryAllowed | Self::CommandFailed => StatusCode::CardCommunicationError,
            Self::InputTimeOut => StatusCode::CardInputTimeOut,
            Self::ProtocolError => StatusCode::CardProtocolError,
            Self::UnexpectedTransmitStatus => StatusCode::CardUnexpectedTransmitStatus,
            Self::CancellationByUser => StatusCode::CardCancellationByUser,
            Self::InvalidPin | Self::InvalidPin2 | Self::InvalidPin3 => StatusCode::CardInvalidPin,
            Self::InvalidCan => StatusCode::CardInvalidCan,
            Self::InvalidPuk => StatusCode::CardInvalidPuk,
            Self::PinBlocked => StatusCode::CardPinBlocked,
            Self::PinNotBlocked => StatusCode::CardPinNotBlocked,
            Self::PukInoperative => StatusCode::CardPukBlocked,
            Self::NewPinMismatch => StatusCode::CardNewPinMismatch,
            Self::NewPinInvalidLength => StatusCode::CardNewPinInvalidLength,
        }
    }

    /// Status reported to the workflow for this outcome
    pub const fn to_status(self) -> Status {
        Status::new(self.status_code())
    }
}

/// Return code together with the response APDU of a card operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseApduResult {
    /// Outcome of the operation
    pub return_code: CardReturnCode,
    /// Response of the card, empty when none was received
    pub response_apdu: ResponseApdu,
}

impl ResponseApduResult {
    /// Create a result carrying a response
    pub const fn new(return_code: CardReturnCode, response_apdu: ResponseApdu) -> Self {
        Self {
            return_code,
            response_apdu,
        }
    }
}

impl From<CardReturnCode> for ResponseApduResult {
    fn from(return_code: CardReturnCode) -> Self {
        Self::new(return_code, ResponseApdu::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_codes_map_to_no_error() {
        for code in [CardReturnCode::Ok, CardReturnCode::OkPuk, CardReturnCode::OkCan] {
            assert!(code.is_ok());
            assert!(code.to_status().is_no_error());
        }
    }

    #[test]
    fn test_failures_map_to_errors() {
        let failures = [
            CardReturnCode::Undefined,
            CardReturnCode::Unknown,
            CardReturnCode::CardNotFound,
            CardReturnCode::InputTimeOut,
            CardReturnCode::CommandFailed,
            CardReturnCode::CancellationByUser,
            CardReturnCode::InvalidPin3,
            CardReturnCode::PukInoperative,
            CardReturnCode::NewPinMismatch,
        ];
        for code in failures {
            assert!(!code.is_ok(), "{code}");
            assert!(code.to_status().is_error(), "{code}");
        }
        assert!(CardReturnCode::CancellationByUser.to_status().is_cancellation_by_user());
        assert_eq!(CardReturnCode::PukInoperative.status_code(), StatusCode::CardPukBlocked);
    }

    #[test]
    fn test_result_from_code() {
        let result = ResponseApduResult::from(CardReturnCode::InputTimeOut);
        assert_eq!(result.return_code, CardReturnCode::InputTimeOut);
        assert!(result.response_apdu.is_empty());
    }
}
