//! eCard-API result codes carried by remote reader responses

use std::fmt;

use eid_remote_status::{ExternalInformation, Origin, Status, StatusCode};

use crate::messages::MessageError;
use crate::return_code::CardReturnCode;

const MAJOR_PREFIX: &str = "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#";
const MINOR_PREFIX: &str = "http://www.bsi.bund.de/ecard/api/1.1/resultminor/";

/// Major result of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultMajor {
    /// The request was processed successfully
    Ok,
    /// The request was processed with a warning
    Warning,
    /// The request failed, see the minor result
    Error,
}

impl ResultMajor {
    /// URI of the major result
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Ok => "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#ok",
            Self::Warning => "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#warning",
            Self::Error => "http://www.bsi.bund.de/ecard/api/1.1/resultmajor#error",
        }
    }

    /// Parse a major result URI
    pub fn from_uri(uri: &str) -> Result<Self, MessageError> {
        match uri.strip_prefix(MAJOR_PREFIX) {
            Some("ok") => Ok(Self::Ok),
            Some("warning") => Ok(Self::Warning),
            Some("error") => Ok(Self::Error),
            _ => Err(MessageError::UnknownResultMajor(uri.to_owned())),
        }
    }
}

impl TryFrom<String> for ResultMajor {
    type Error = MessageError;

    fn try_from(uri: String) -> Result<Self, MessageError> {
        Self::from_uri(&uri)
    }
}

/// Minor result of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultMinor {
    /// Application layer: unknown error
    AlUnknownError,
    /// Application layer: internal error
    AlInternalError,
    /// Application layer: communication error
    AlCommunicationError,
    /// Application layer: missing permission
    AlNoPermission,
    /// Application layer: incorrect parameter
    AlIncorrectParameter,
    /// Dispatcher: trusted channel establishment failed
    DpTrustedChannelEstablishmentFailed,
    /// Service access layer: cancelled by the user
    SalCancellationByUser,
    /// Service access layer: invalid key
    SalInvalidKey,
    /// Interface device layer: timeout
    IfdlTimeoutError,
    /// Interface device layer: invalid slot handle
    IfdlInvalidSlotHandle,
    /// Interface device layer: cancelled by the user
    IfdlCancellationByUser,
    /// Interface device layer: no card in the terminal
    IfdlTerminalNoCard,
    /// Interface device layer: the two PIN entries differ
    IfdlIoRepeatedDataMismatch,
    /// Interface device layer: unknown PIN format
    IfdlIoUnknownPinFormat,
    /// Any minor result without a dedicated variant, kept verbatim
    Other(String),
}

impl ResultMinor {
    const KNOWN: &'static [(Self, &'static str)] = &[
        (Self::AlUnknownError, "al/common#unknownError"),
        (Self::AlInternalError, "al/common#internalError"),
        (Self::AlCommunicationError, "al/common#communicationError"),
        (Self::AlNoPermission, "al/common#noPermission"),
        (Self::AlIncorrectParameter, "al/common#incorrectParameter"),
        (
            Self::DpTrustedChannelEstablishmentFailed,
            "dp#trustedChannelEstablishmentFailed",
        ),
        (Self::SalCancellationByUser, "sal#cancellationByUser"),
        (Self::SalInvalidKey, "sal#invalidKey"),
        (Self::IfdlTimeoutError, "ifdl/common#timeoutError"),
        (Self::IfdlInvalidSlotHandle, "ifdl/common#invalidSlotHandle"),
        (Self::IfdlCancellationByUser, "ifdl#cancellationByUser"),
        (Self::IfdlTerminalNoCard, "ifdl/terminal#noCard"),
        (Self::IfdlIoRepeatedDataMismatch, "ifdl/IO#repeatedDataMismatch"),
        (Self::IfdlIoUnknownPinFormat, "ifdl/IO#unknownPINFormat"),
    ];

    /// Parse a minor result URI, keeping unknown URIs verbatim
    pub fn from_uri(uri: &str) -> Self {
        uri.strip_prefix(MINOR_PREFIX)
            .and_then(|suffix| {
                Self::KNOWN
                    .iter()
                    .find(|(_, known)| *known == suffix)
                    .map(|(minor, _)| minor.clone())
            })
            .unwrap_or_else(|| Self::Other(uri.to_owned()))
    }

    /// URI of the minor result
    pub fn uri(&self) -> String {
        match self {
            Self::Other(uri) => uri.clone(),
            known => Self::KNOWN
                .iter()
                .find(|(minor, _)| minor == known)
                .map(|(_, suffix)| format!("{MINOR_PREFIX}{suffix}"))
                .unwrap_or_default(),
        }
    }

    /// Card return code reported by a PIN pad operation failing with this result
    pub const fn pin_pad_return_code(&self) -> CardReturnCode {
        match self {
            Self::IfdlTimeoutError => CardReturnCode::InputTimeOut,
            Self::IfdlCancellationByUser | Self::SalCancellationByUser => {
                CardReturnCode::CancellationByUser
            }
            Self::IfdlIoRepeatedDataMismatch => CardReturnCode::NewPinMismatch,
            Self::IfdlIoUnknownPinFormat => CardReturnCode::NewPinInvalidLength,
            Self::IfdlTerminalNoCard | Self::IfdlInvalidSlotHandle => CardReturnCode::CardNotFound,
            _ => CardReturnCode::Unknown,
        }
    }

    /// Status code the remote side reports with this result
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::AlUnknownError => StatusCode::PaosErrorAlUnknownError,
            Self::AlInternalError => StatusCode::PaosErrorAlInternalError,
            Self::AlCommunicationError => StatusCode::PaosErrorAlCommunicationError,
            Self::DpTrustedChannelEstablishmentFailed => {
                StatusCode::PaosErrorDpTrustedChannelEstablishmentFailed
            }
            Self::SalCancellationByUser => StatusCode::PaosErrorSalCancellationByUser,
            Self::SalInvalidKey => StatusCode::PaosErrorSalInvalidKey,
            Self::IfdlTimeoutError => StatusCode::CardInputTimeOut,
            Self::IfdlCancellationByUser => StatusCode::CardCancellationByUser,
            Self::IfdlTerminalNoCard | Self::IfdlInvalidSlotHandle => StatusCode::CardNotFound,
            Self::IfdlIoRepeatedDataMismatch => StatusCode::CardNewPinMismatch,
            Self::IfdlIoUnknownPinFormat => StatusCode::CardNewPinInvalidLength,
            Self::AlNoPermission | Self::AlIncorrectParameter | Self::Other(_) => {
                StatusCode::PaosGenericServerError
            }
        }
    }

    /// Server side status wrapping this result
    pub fn to_status(&self) -> Status {
        Status::with_entry(
            self.status_code(),
            ExternalInformation::ECardApiError,
            self.uri(),
            Origin::Server,
        )
    }
}

impl From<String> for ResultMinor {
    fn from(uri: String) -> Self {
        Self::from_uri(&uri)
    }
}

impl fmt::Display for ResultMinor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

/// Result of a remote reader response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ECardApiResult {
    /// Major result
    pub major: ResultMajor,
    /// Minor result, present on failures
    pub minor: Option<ResultMinor>,
}

impl ECardApiResult {
    /// Successful result
    pub const fn ok() -> Self {
        Self {
            major: ResultMajor::Ok,
            minor: None,
        }
    }

    /// Failed result
    pub const fn error(minor: ResultMinor) -> Self {
        Self {
            major: ResultMajor::Error,
            minor: Some(minor),
        }
    }

    /// Whether the response reports a failure
    pub const fn has_error(&self) -> bool {
        matches!(self.major, ResultMajor::Error)
    }

    /// Whether the minor result is `minor`
    pub fn is_minor(&self, minor: &ResultMinor) -> bool {
        self.minor.as_ref() == Some(minor)
    }

    /// Status describing this result
    pub fn to_status(&self) -> Status {
        match (&self.minor, self.has_error()) {
            (_, false) => Status::new(StatusCode::NoError),
            (Some(minor), true) => minor.to_status(),
            (None, true) => Status::with_origin(StatusCode::PaosGenericServerError, Origin::Server),
        }
    }
}

impl fmt::Display for ECardApiResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.major.uri())?;
        if let Some(minor) = &self.minor {
            write!(f, " | {minor}")?;
        }
        Ok(())
    }
}
