//! The status value reported by every layer

use std::fmt;

use crate::code::StatusCode;
use crate::description::{self, MASKED};
use crate::info::{ExternalInfoMap, ExternalInformation, Origin};
use crate::mask::MaskPolicy;

/// Immutable outcome of an operation
///
/// A status couples a [`StatusCode`] with the [`Origin`] that raised it and
/// optional context fields. Equality is structural.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Status {
    code: StatusCode,
    origin: Origin,
    external_info: ExternalInfoMap,
}

impl Status {
    /// Create a client side status without context fields
    pub const fn new(code: StatusCode) -> Self {
        Self::with_origin(code, Origin::Client)
    }

    /// Create a status without context fields
    pub const fn with_origin(code: StatusCode, origin: Origin) -> Self {
        Self {
            code,
            origin,
            external_info: ExternalInfoMap::new(),
        }
    }

    /// Create a status carrying a map of context fields
    pub const fn with_info(code: StatusCode, external_info: ExternalInfoMap, origin: Origin) -> Self {
        Self {
            code,
            origin,
            external_info,
        }
    }

    /// Create a status carrying a single context field
    pub fn with_entry(
        code: StatusCode,
        key: ExternalInformation,
        value: impl Into<String>,
        origin: Origin,
    ) -> Self {
        Self::with_info(code, ExternalInfoMap::from([(key, value.into())]), origin)
    }

    /// Status code
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    /// Whether the status carries `code`
    pub fn is(&self, code: StatusCode) -> bool {
        self.code == code
    }

    /// Side that raised the status
    pub const fn origin(&self) -> Origin {
        self.origin
    }

    /// Whether the server raised the status
    pub const fn is_origin_server(&self) -> bool {
        matches!(self.origin, Origin::Server)
    }

    /// Whether the status reports success
    pub const fn is_no_error(&self) -> bool {
        self.code.is_no_error()
    }

    /// Whether the status reports a failure
    pub const fn is_error(&self) -> bool {
        !self.is_no_error()
    }

    /// Whether the failure is a cancellation performed by the user
    pub const fn is_cancellation_by_user(&self) -> bool {
        self.code.is_cancellation_by_user()
    }

    /// Whether the description must be generalised for end users, according
    /// to the default [`MaskPolicy`]
    pub fn is_message_masked(&self) -> bool {
        self.is_message_masked_by(MaskPolicy::global())
    }

    /// Whether the description must be generalised for end users, according
    /// to `policy`
    pub fn is_message_masked_by(&self, policy: &MaskPolicy) -> bool {
        policy.is_masked(self.code)
    }

    /// Context fields
    pub const fn external_info(&self) -> &ExternalInfoMap {
        &self.external_info
    }

    /// Value of a single context field
    pub fn external_info_value(&self, key: ExternalInformation) -> Option<&str> {
        self.external_info.get(&key).map(String::as_str)
    }

    /// Render the context fields as `key: value` pairs joined by `separator`
    pub fn external_info_joined(&self, separator: &str) -> String {
        self.external_info
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Render a description using the default [`MaskPolicy`]
    ///
    /// The simplified version leaves out cause-level detail and replaces the
    /// description of masked codes with a generic hint.
    pub fn to_error_description(&self, simplified: bool) -> String {
        self.to_error_description_with(simplified, MaskPolicy::global())
    }

    /// Render a description using `policy` to decide on masking
    pub fn to_error_description_with(&self, simplified: bool, policy: &MaskPolicy) -> String {
        if self.is_no_error() {
            return description::NO_ERROR.to_owned();
        }

        let (summary, detail) = description::texts(self.code);
        match (simplified, detail) {
            (true, _) if self.is_message_masked_by(policy) => MASKED.to_owned(),
            (true, _) | (false, None) => summary.to_owned(),
            (false, Some(detail)) => format!("{summary} {detail}"),
        }
    }
}

impl From<StatusCode> for Status {
    fn from(code: StatusCode) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if self.is_origin_server() {
            write!(f, " ({})", self.origin)?;
        }
        if !self.external_info.is_empty() {
            write!(f, " | {}", self.external_info_joined("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for Status {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_predicates() {
        for code in StatusCode::ALL {
            let status = Status::new(*code);
            assert_eq!(status.is_no_error(), *code == StatusCode::NoError);
            assert_eq!(status.is_error(), !status.is_no_error());
        }
    }

    #[test]
    fn test_default() {
        let status = Status::default();
        assert_eq!(status.code(), StatusCode::UnknownError);
        assert_eq!(status.origin(), Origin::Client);
        assert!(status.external_info().is_empty());
        assert!(status.is_error());
    }

    #[test]
    fn test_construction_paths_compare_equal() {
        let from_map = Status::with_info(
            StatusCode::WorkflowNetworkInvalidScheme,
            ExternalInfoMap::from([(ExternalInformation::UrlScheme, "http".to_owned())]),
            Origin::Server,
        );
        let from_entry = Status::with_entry(
            StatusCode::WorkflowNetworkInvalidScheme,
            ExternalInformation::UrlScheme,
            "http",
            Origin::Server,
        );
        assert_eq!(from_map, from_entry);
        assert_eq!(from_map.clone(), from_entry);

        assert_eq!(
            Status::from(StatusCode::CardNotFound),
            Status::with_info(StatusCode::CardNotFound, ExternalInfoMap::new(), Origin::Client)
        );
        assert_ne!(
            Status::with_origin(StatusCode::CardNotFound, Origin::Server),
            Status::new(StatusCode::CardNotFound)
        );
    }

    #[test]
    fn test_cancellation_by_user() {
        let cancelled: Vec<_> = StatusCode::ALL
            .iter()
            .filter(|code| Status::new(**code).is_cancellation_by_user())
            .copied()
            .collect();
        assert_eq!(
            cancelled,
            vec![
                StatusCode::WorkflowCancellationByUser,
                StatusCode::PaosErrorSalCancellationByUser,
                StatusCode::CardCancellationByUser,
            ]
        );
    }

    #[test]
    fn test_origin_server() {
        assert!(Status::with_origin(StatusCode::PaosGenericServerError, Origin::Server).is_origin_server());
        assert!(!Status::new(StatusCode::PaosGenericServerError).is_origin_server());
    }

    #[test]
    fn test_descriptions_not_empty() {
        for code in StatusCode::ALL.iter().filter(|code| !code.is_no_error()) {
            let status = Status::new(*code);
            let detailed = status.to_error_description(false);
            let simplified = status.to_error_description(true);
            assert!(!detailed.is_empty(), "{code}");
            assert!(!simplified.is_empty(), "{code}");
            assert!(simplified.len() <= detailed.len(), "{code}");
        }
    }

    #[test]
    fn test_masked_description() {
        let status = Status::new(StatusCode::PaosErrorAlInternalError);
        assert!(status.is_message_masked());
        assert_eq!(status.to_error_description(true), MASKED);
        assert!(status.to_error_description(false).contains("internal"));

        let unmasked = status.to_error_description_with(true, &MaskPolicy::empty());
        assert_eq!(unmasked, "The server reported an internal error.");
    }

    #[test]
    fn test_simplified_drops_detail() {
        let status = Status::new(StatusCode::CardPinBlocked);
        assert_eq!(
            status.to_error_description(true),
            "The PIN was blocked after too many unsuccessful attempts."
        );
        assert_eq!(
            status.to_error_description(false),
            "The PIN was blocked after too many unsuccessful attempts. Unblock the PIN with your PUK."
        );
        assert_eq!(
            Status::new(StatusCode::NoError).to_error_description(true),
            "No error occurred."
        );
    }

    #[test]
    fn test_external_info_joined() {
        let mut info = ExternalInfoMap::new();
        info.insert(ExternalInformation::HttpStatusCode, "503".to_owned());
        info.insert(ExternalInformation::LastUrl, "https://eid.example/".to_owned());
        info.insert(ExternalInformation::ECardApiError, "minor".to_owned());
        let status = Status::with_info(StatusCode::NetworkServiceUnavailable, info.clone(), Origin::Server);

        let joined = status.external_info_joined("; ");
        assert_eq!(
            joined,
            "ECARDAPI_ERROR: minor; LAST_URL: https://eid.example/; HTTP_STATUS_CODE: 503"
        );
        for (key, value) in &info {
            let pair = format!("{key}: {value}");
            assert_eq!(joined.matches(&pair).count(), 1);
        }
        assert_eq!(Status::new(StatusCode::NoError).external_info_joined("; "), "");
    }

    #[test]
    fn test_display() {
        let status = Status::with_entry(
            StatusCode::PaosGenericServerError,
            ExternalInformation::ECardApiError,
            "http://www.bsi.bund.de/ecard/api/1.1/resultminor/al/common#internalError",
            Origin::Server,
        );
        assert_eq!(
            status.to_string(),
            "PaosGenericServerError (Server) | ECARDAPI_ERROR: http://www.bsi.bund.de/ecard/api/1.1/resultminor/al/common#internalError"
        );
        assert_eq!(Status::new(StatusCode::NoError).to_string(), "NoError");
    }
}
