//! Status codes and the domains they are grouped in

use derive_more::Display;

/// Domain a [`StatusCode`] belongs to
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusDomain {
    /// The two sentinels [`StatusCode::UnknownError`] and [`StatusCode::NoError`]
    General,
    /// Connectivity, TLS and proxy failures
    Network,
    /// Artifact retrieval failures
    Downloader,
    /// Authentication workflow failures
    Workflow,
    /// Errors of the remote eID-server protocol
    Paos,
    /// Smart card communication and PIN handling failures
    Card,
    /// Remote reader link failures
    RemoteReader,
    /// Remote connector failures
    RemoteConnector,
}

macro_rules! status_codes {
    ($($domain:ident { $($(#[$doc:meta])* $code:ident,)+ })+) => {
        /// Outcome code of any operation
        ///
        /// The set is closed and flat. Codes are grouped by [`StatusDomain`];
        /// the ordering of variants carries no meaning.
        #[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum StatusCode {
            $($($(#[$doc])* $code,)+)+
        }

        impl StatusCode {
            /// Every status code, in declaration order
            pub const ALL: &'static [Self] = &[$($(Self::$code,)+)+];

            /// Domain this code belongs to
            pub const fn domain(self) -> StatusDomain {
                match self {
                    $($(Self::$code => StatusDomain::$domain,)+)+
                }
            }
        }
    };
}

status_codes! {
    General {
        /// Nothing more specific is known about the failure
        UnknownError,
        /// The operation succeeded
        NoError,
    }
    Network {
        /// The service is not available
        NetworkServiceUnavailable,
        /// The TLS handshake failed
        NetworkSslEstablishmentError,
        /// The request timed out
        NetworkTimeOut,
        /// The proxy rejected or broke the connection
        NetworkProxyError,
        /// Any other network failure
        NetworkOtherError,
    }
    Downloader {
        /// The requested file does not exist
        DownloaderFileNotFound,
        /// The downloaded file could not be stored
        DownloaderCannotSaveFile,
        /// The downloaded file is corrupted
        DownloaderDataCorrupted,
    }
    Workflow {
        /// Another workflow is already running
        WorkflowAlreadyInProgressError,
        /// The provider did not send a redirect address
        WorkflowCommunicationMissingRedirectUrl,
        /// The user cancelled the workflow
        WorkflowCancellationByUser,
        /// The card was removed during the workflow
        WorkflowCardRemoved,
        /// The authenticity of the card could not be confirmed
        WorkflowCannotConfirmIdCardAuthenticity,
        /// The eID server sent an unknown message
        WorkflowUnknownPaosFromEidServer,
        /// The eID server sent a message that was not expected at this point
        WorkflowUnexpectedMessageFromEidServer,
        /// Pre-verification failed in developer mode
        WorkflowPreverificationDevelopermodeError,
        /// Pre-verification of the certificate chain failed
        WorkflowPreverificationError,
        /// The terminal certificate is ambiguous
        WorkflowNoUniqueAtCvc,
        /// The document verifier certificate is ambiguous
        WorkflowNoUniqueDvCvc,
        /// The provider lacks a required permission
        WorkflowNoPermissionError,
        /// The certificate description is missing
        WorkflowCertificateNoDescription,
        /// The certificate description lacks the service address
        WorkflowCertificateNoUrlInDescription,
        /// A certificate hash did not match the description
        WorkflowCertificateHashError,
        /// The same-origin policy was violated
        WorkflowCertificateSopError,
        /// The error page could not be transmitted
        WorkflowErrorPageTransmissionError,
        /// The redirect could not be transmitted
        WorkflowRedirectTransmissionError,
        /// Generic processing error
        WorkflowProcessingError,
        /// The trusted channel could not be established
        WorkflowTrustedChannelEstablishmentError,
        /// The server reported a trusted channel error
        WorkflowTrustedChannelErrorFromServer,
        /// A trusted channel certificate hash is missing in the description
        WorkflowTrustedChannelHashNotInDescription,
        /// No data was received over the trusted channel
        WorkflowTrustedChannelNoDataReceived,
        /// The trusted channel certificate uses an unsupported algorithm or key length
        WorkflowTrustedChannelSslCertificateUnsupportedAlgorithmOrLength,
        /// The trusted channel service is unavailable
        WorkflowTrustedChannelServiceUnavailable,
        /// The trusted channel timed out
        WorkflowTrustedChannelTimeOut,
        /// The proxy broke the trusted channel
        WorkflowTrustedChannelProxyError,
        /// The server answered in an unexpected format
        WorkflowTrustedChannelServerFormatError,
        /// Any other network error on the trusted channel
        WorkflowTrustedChannelOtherNetworkError,
        /// The card reader became inaccessible
        WorkflowReaderBecameInaccessible,
        /// The server provided incomplete information
        WorkflowServerIncompleteInformationProvided,
        /// The TLS connection uses an unsupported algorithm or key length
        WorkflowNetworkSslConnectionUnsupportedAlgorithmOrLength,
        /// The TLS certificate uses an unsupported algorithm or key length
        WorkflowNetworkSslCertificateUnsupportedAlgorithmOrLength,
        /// The TLS certificate hash is missing in the certificate description
        WorkflowNetworkSslHashNotInCertificateDescription,
        /// The redirect address is empty
        WorkflowNetworkEmptyRedirectUrl,
        /// A redirect was expected but not received
        WorkflowNetworkExpectedRedirect,
        /// The address uses an unsupported scheme
        WorkflowNetworkInvalidScheme,
        /// The redirect address is malformed
        WorkflowNetworkMalformedRedirectUrl,
        /// The workflow was started with invalid parameters
        WorkflowWrongParameterInvocation,
        /// Connecting to the Bluetooth reader failed
        WorkflowBluetoothReaderConnectionError,
        /// Scanning for reader devices failed
        WorkflowReaderDeviceScanError,
    }
    Paos {
        /// The eID server reported an unexpected warning
        PaosUnexpectedWarning,
        /// The eID server reported an unspecified error
        PaosGenericServerError,
        /// Application layer: unknown error
        PaosErrorAlUnknownError,
        /// Application layer: internal error
        PaosErrorAlInternalError,
        /// Application layer: communication error
        PaosErrorAlCommunicationError,
        /// Dispatcher: trusted channel establishment failed
        PaosErrorDpTrustedChannelEstablishmentFailed,
        /// Service access layer: cancelled by the user on the remote device
        PaosErrorSalCancellationByUser,
        /// Service access layer: invalid key
        PaosErrorSalInvalidKey,
    }
    Card {
        /// No card was found
        CardNotFound,
        /// Communication with the card failed
        CardCommunicationError,
        /// The card protocol was violated
        CardProtocolError,
        /// The card answered with an unexpected status
        CardUnexpectedTransmitStatus,
        /// The user cancelled the PIN entry
        CardCancellationByUser,
        /// The PIN entry timed out
        CardInputTimeOut,
        /// The PIN was wrong
        CardInvalidPin,
        /// The CAN was wrong
        CardInvalidCan,
        /// The PUK was wrong
        CardInvalidPuk,
        /// The PIN is blocked
        CardPinBlocked,
        /// The PIN is not blocked
        CardPinNotBlocked,
        /// The PUK is inoperative
        CardPukBlocked,
        /// The two new PIN entries differ
        CardNewPinMismatch,
        /// The new PIN has an invalid length
        CardNewPinInvalidLength,
    }
    RemoteReader {
        /// The remote reader closed the connection abnormally
        RemoteReaderCloseCodeAbnormalClose,
    }
    RemoteConnector {
        /// The remote connector received an invalid request
        RemoteConnectorInvalidRequest,
        /// No supported API level is shared with the remote device
        RemoteConnectorNoSupportedApiLevel,
        /// Connecting to the remote device timed out
        RemoteConnectorConnectionTimeout,
        /// Connecting to the remote device failed
        RemoteConnectorConnectionError,
        /// The remote device refused the connection
        RemoteConnectorRemoteHostRefusedConnection,
    }
}

impl StatusCode {
    /// Whether this is the success sentinel
    pub const fn is_no_error(self) -> bool {
        matches!(self, Self::NoError)
    }

    /// Whether this code reports a cancellation performed by the user
    pub const fn is_cancellation_by_user(self) -> bool {
        matches!(
            self,
            Self::WorkflowCancellationByUser
                | Self::CardCancellationByUser
                | Self::PaosErrorSalCancellationByUser
        )
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::UnknownError
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_codes_unique() {
        let unique: HashSet<_> = StatusCode::ALL.iter().collect();
        assert_eq!(unique.len(), StatusCode::ALL.len());
    }

    #[test]
    fn test_no_error_is_only_general_success() {
        let successes: Vec<_> = StatusCode::ALL
            .iter()
            .filter(|code| code.is_no_error())
            .collect();
        assert_eq!(successes, vec![&StatusCode::NoError]);
    }

    #[test]
    fn test_domains() {
        assert_eq!(StatusCode::NoError.domain(), StatusDomain::General);
        assert_eq!(StatusCode::NetworkTimeOut.domain(), StatusDomain::Network);
        assert_eq!(
            StatusCode::PaosErrorSalCancellationByUser.domain(),
            StatusDomain::Paos
        );
        assert_eq!(StatusCode::CardPinBlocked.domain(), StatusDomain::Card);
        assert_eq!(
            StatusCode::RemoteConnectorConnectionTimeout.domain(),
            StatusDomain::RemoteConnector
        );
    }

    #[test]
    fn test_display_is_variant_name() {
        assert_eq!(StatusCode::CardInvalidPin.to_string(), "CardInvalidPin");
    }
}
