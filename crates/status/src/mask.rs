//! Policy deciding which descriptions are hidden from end users

use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::code::StatusCode;

/// Codes masked by [`MaskPolicy::default`]
const DEFAULT_MASKED: &[StatusCode] = &[
    StatusCode::NetworkSslEstablishmentError,
    StatusCode::WorkflowUnknownPaosFromEidServer,
    StatusCode::WorkflowUnexpectedMessageFromEidServer,
    StatusCode::WorkflowTrustedChannelEstablishmentError,
    StatusCode::WorkflowTrustedChannelErrorFromServer,
    StatusCode::WorkflowTrustedChannelHashNotInDescription,
    StatusCode::WorkflowTrustedChannelSslCertificateUnsupportedAlgorithmOrLength,
    StatusCode::WorkflowTrustedChannelServerFormatError,
    StatusCode::WorkflowTrustedChannelOtherNetworkError,
    StatusCode::WorkflowNetworkSslConnectionUnsupportedAlgorithmOrLength,
    StatusCode::WorkflowNetworkSslCertificateUnsupportedAlgorithmOrLength,
    StatusCode::WorkflowNetworkSslHashNotInCertificateDescription,
    StatusCode::PaosUnexpectedWarning,
    StatusCode::PaosGenericServerError,
    StatusCode::PaosErrorAlUnknownError,
    StatusCode::PaosErrorAlInternalError,
    StatusCode::PaosErrorAlCommunicationError,
    StatusCode::PaosErrorDpTrustedChannelEstablishmentFailed,
];

static DEFAULT_POLICY: LazyLock<MaskPolicy> = LazyLock::new(MaskPolicy::default);

/// Table of status codes whose descriptions must be generalised before they
/// are shown to an end user
///
/// Membership is a product decision. The default table hides server and TLS
/// internals; embedders may start from [`MaskPolicy::empty`] or adjust the
/// default with [`MaskPolicy::with_masked`] and [`MaskPolicy::without`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPolicy {
    masked: BTreeSet<StatusCode>,
}

impl MaskPolicy {
    /// A policy that masks nothing
    pub const fn empty() -> Self {
        Self {
            masked: BTreeSet::new(),
        }
    }

    /// Shared instance of the default policy
    pub fn global() -> &'static Self {
        &DEFAULT_POLICY
    }

    /// Add a code to the table
    pub fn with_masked(mut self, code: StatusCode) -> Self {
        self.masked.insert(code);
        self
    }

    /// Remove a code from the table
    pub fn without(mut self, code: StatusCode) -> Self {
        self.masked.remove(&code);
        self
    }

    /// Whether descriptions of `code` are masked
    pub fn is_masked(&self, code: StatusCode) -> bool {
        self.masked.contains(&code)
    }

    /// Masked codes in declaration order
    pub fn masked_codes(&self) -> impl Iterator<Item = StatusCode> + '_ {
        self.masked.iter().copied()
    }
}

impl Default for MaskPolicy {
    fn default() -> Self {
        Self {
            masked: DEFAULT_MASKED.iter().copied().collect(),
        }
    }
}

impl FromIterator<StatusCode> for MaskPolicy {
    fn from_iter<I: IntoIterator<Item = StatusCode>>(iter: I) -> Self {
        Self {
            masked: iter.into_iter().collect(),
        }
    }
}
