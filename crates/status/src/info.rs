//! Origin and supplementary context attached to a status

use std::collections::BTreeMap;

use derive_more::Display;

/// Side that is responsible for, or detected, a condition
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Origin {
    /// The local application
    #[default]
    Client,
    /// The remote server
    Server,
}

/// Key of a supplementary context field
///
/// Fields iterate in declaration order.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExternalInformation {
    /// Wrapped eCard-API result reported by the remote side
    #[display("ECARDAPI_ERROR")]
    ECardApiError,
    /// Last address that was requested
    #[display("LAST_URL")]
    LastUrl,
    /// HTTP status code of the last response
    #[display("HTTP_STATUS_CODE")]
    HttpStatusCode,
    /// Address the client was redirected to
    #[display("REDIRECT_URL")]
    RedirectUrl,
    /// Issuer of the offending certificate
    #[display("CERTIFICATE_ISSUER_NAME")]
    CertificateIssuerName,
    /// Scheme of the offending address
    #[display("URL_SCHEME")]
    UrlScheme,
    /// Failure reported while activating the workflow
    #[display("ACTIVATION_ERROR")]
    ActivationError,
}

/// Supplementary context fields of a status
pub type ExternalInfoMap = BTreeMap<ExternalInformation, String>;
