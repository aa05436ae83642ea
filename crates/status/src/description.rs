//! Human readable descriptions of status codes
//!
//! Each code has a summary sentence meant for end users and, for most codes,
//! a second sentence with the cause-level detail support staff need.

use crate::code::StatusCode;

/// Text rendered for [`StatusCode::NoError`]
pub(crate) const NO_ERROR: &str = "No error occurred.";

/// Text rendered instead of the summary when a code is masked
pub(crate) const MASKED: &str = "An error occurred. Please contact support.";

/// Summary and optional detail of a status code
pub(crate) const fn texts(code: StatusCode) -> (&'static str, Option<&'static str>) {
    use StatusCode::*;

    match code {
        UnknownError => (
            "An unexpected error has occurred during processing.",
            None,
        ),
        NoError => (NO_ERROR, None),

        NetworkServiceUnavailable => (
            "The service is temporarily not available.",
            Some("Please try again later."),
        ),
        NetworkSslEstablishmentError => (
            "An error occurred while establishing a secure connection.",
            Some("The TLS handshake with the server failed."),
        ),
        NetworkTimeOut => (
            "The connection timed out.",
            Some("The server did not respond within the expected time."),
        ),
        NetworkProxyError => (
            "An error occurred with the configured proxy.",
            Some("The proxy refused or interrupted the connection."),
        ),
        NetworkOtherError => (
            "An unknown network error occurred.",
            Some("Check your network connection and try again."),
        ),

        DownloaderFileNotFound => (
            "The file could not be found on the server.",
            None,
        ),
        DownloaderCannotSaveFile => (
            "The downloaded file could not be saved.",
            Some("The local storage may be full or write protected."),
        ),
        DownloaderDataCorrupted => (
            "The downloaded file is corrupted.",
            Some("The received data does not match the expected checksum."),
        ),

        WorkflowAlreadyInProgressError => (
            "Another process is already running.",
            Some("Finish or cancel the running process before starting a new one."),
        ),
        WorkflowCommunicationMissingRedirectUrl => (
            "The provider did not send a valid redirect address.",
            Some("The service provider has to be contacted to resolve this."),
        ),
        WorkflowCancellationByUser => ("The process has been cancelled.", None),
        WorkflowCardRemoved => (
            "The ID card has been removed.",
            Some("The connection to the card was lost during the process."),
        ),
        WorkflowCannotConfirmIdCardAuthenticity => (
            "The authenticity of your ID card could not be confirmed.",
            Some("The chip authentication of the card failed."),
        ),
        WorkflowUnknownPaosFromEidServer => (
            "The program received an unknown message from the server.",
            Some("The eID server sent a message type that is not supported."),
        ),
        WorkflowUnexpectedMessageFromEidServer => (
            "The program received an unexpected message from the server.",
            Some("The eID server sent a message that is not valid at this point of the process."),
        ),
        WorkflowPreverificationDevelopermodeError => (
            "Pre-verification failed in developer mode.",
            Some("The test certificate chain is not accepted by the pre-verification."),
        ),
        WorkflowPreverificationError => (
            "Pre-verification failed.",
            Some("The certificate chain of the provider could not be verified."),
        ),
        WorkflowNoUniqueAtCvc => (
            "No unique terminal certificate found.",
            Some("The server sent several matching terminal certificates."),
        ),
        WorkflowNoUniqueDvCvc => (
            "No unique document verifier certificate found.",
            Some("The server sent several matching document verifier certificates."),
        ),
        WorkflowNoPermissionError => (
            "The provider is not authorised to read the requested data.",
            Some("The access rights requested exceed those of the provider certificate."),
        ),
        WorkflowCertificateNoDescription => (
            "The provider certificate has no description.",
            None,
        ),
        WorkflowCertificateNoUrlInDescription => (
            "The provider certificate description has no service address.",
            None,
        ),
        WorkflowCertificateHashError => (
            "A certificate check failed.",
            Some("The hash of a certificate does not match the certificate description."),
        ),
        WorkflowCertificateSopError => (
            "A certificate check failed.",
            Some("The same-origin policy of the provider was violated."),
        ),
        WorkflowErrorPageTransmissionError => (
            "The error page of the provider could not be shown.",
            Some("Transmitting the error page address to the browser failed."),
        ),
        WorkflowRedirectTransmissionError => (
            "The redirect to the provider failed.",
            Some("Transmitting the redirect address to the browser failed."),
        ),
        WorkflowProcessingError => (
            "An error occurred during processing.",
            Some("The process could not be completed."),
        ),
        WorkflowTrustedChannelEstablishmentError => (
            "A secure connection to the provider could not be established.",
            Some("The trusted channel handshake with the eID server failed."),
        ),
        WorkflowTrustedChannelErrorFromServer => (
            "The provider reported an error.",
            Some("The eID server answered the trusted channel request with an error."),
        ),
        WorkflowTrustedChannelHashNotInDescription => (
            "A certificate check failed.",
            Some("The trusted channel certificate hash is missing from the certificate description."),
        ),
        WorkflowTrustedChannelNoDataReceived => (
            "The provider did not send any data.",
            Some("The trusted channel was closed before any data was received."),
        ),
        WorkflowTrustedChannelSslCertificateUnsupportedAlgorithmOrLength => (
            "A secure connection to the provider could not be established.",
            Some("The trusted channel certificate uses an unsupported algorithm or key length."),
        ),
        WorkflowTrustedChannelServiceUnavailable => (
            "The provider is temporarily not available.",
            Some("The trusted channel endpoint reported that the service is unavailable."),
        ),
        WorkflowTrustedChannelTimeOut => (
            "The connection to the provider timed out.",
            Some("The trusted channel endpoint did not respond in time."),
        ),
        WorkflowTrustedChannelProxyError => (
            "An error occurred with the configured proxy.",
            Some("The proxy interrupted the trusted channel to the provider."),
        ),
        WorkflowTrustedChannelServerFormatError => (
            "The provider answered in an unexpected format.",
            Some("The trusted channel response could not be parsed."),
        ),
        WorkflowTrustedChannelOtherNetworkError => (
            "A network error occurred while contacting the provider.",
            Some("The trusted channel failed for an unknown network reason."),
        ),
        WorkflowReaderBecameInaccessible => (
            "The card reader is no longer accessible.",
            Some("The reader was disconnected or the driver stopped responding."),
        ),
        WorkflowServerIncompleteInformationProvided => (
            "The server provided incomplete information.",
            Some("Mandatory fields are missing in the server response."),
        ),
        WorkflowNetworkSslConnectionUnsupportedAlgorithmOrLength => (
            "A secure connection could not be established.",
            Some("The TLS connection uses an unsupported algorithm or key length."),
        ),
        WorkflowNetworkSslCertificateUnsupportedAlgorithmOrLength => (
            "A secure connection could not be established.",
            Some("The TLS certificate uses an unsupported algorithm or key length."),
        ),
        WorkflowNetworkSslHashNotInCertificateDescription => (
            "A certificate check failed.",
            Some("The TLS certificate hash is missing from the certificate description."),
        ),
        WorkflowNetworkEmptyRedirectUrl => (
            "The provider sent an empty redirect address.",
            None,
        ),
        WorkflowNetworkExpectedRedirect => (
            "The provider did not redirect as expected.",
            Some("A redirect response was expected from the server."),
        ),
        WorkflowNetworkInvalidScheme => (
            "The address uses an unsupported scheme.",
            Some("Only secure addresses are accepted."),
        ),
        WorkflowNetworkMalformedRedirectUrl => (
            "The provider sent a malformed redirect address.",
            None,
        ),
        WorkflowWrongParameterInvocation => (
            "The process was started with invalid parameters.",
            Some("The activation request is missing parameters or contains invalid ones."),
        ),
        WorkflowBluetoothReaderConnectionError => (
            "The connection to the Bluetooth reader failed.",
            Some("Make sure the reader is switched on and within range."),
        ),
        WorkflowReaderDeviceScanError => (
            "Scanning for card readers failed.",
            Some("The system did not allow the device scan to be started."),
        ),

        PaosUnexpectedWarning => (
            "The server reported an unexpected warning.",
            Some("The eID server attached a warning to a message that must not carry one."),
        ),
        PaosGenericServerError => (
            "The server reported an error.",
            Some("The eID server returned an error without further classification."),
        ),
        PaosErrorAlUnknownError => (
            "The server reported an unknown error.",
            Some("The eID server returned an unknown application layer error."),
        ),
        PaosErrorAlInternalError => (
            "The server reported an internal error.",
            Some("The eID server returned an internal application layer error."),
        ),
        PaosErrorAlCommunicationError => (
            "The server reported a communication error.",
            Some("The eID server returned an application layer communication error."),
        ),
        PaosErrorDpTrustedChannelEstablishmentFailed => (
            "A secure connection to the provider could not be established.",
            Some("The eID server reported that the trusted channel could not be established."),
        ),
        PaosErrorSalCancellationByUser => (
            "The process has been cancelled on the remote device.",
            None,
        ),
        PaosErrorSalInvalidKey => (
            "The server reported an invalid key.",
            Some("A key used in the service access layer was rejected."),
        ),

        CardNotFound => (
            "No ID card was found.",
            Some("Place the ID card on the card reader."),
        ),
        CardCommunicationError => (
            "An error occurred while communicating with the ID card.",
            Some("Make sure the card is positioned correctly and try again."),
        ),
        CardProtocolError => (
            "The ID card did not follow the expected protocol.",
            Some("A protocol error occurred while communicating with the card."),
        ),
        CardUnexpectedTransmitStatus => (
            "The ID card answered unexpectedly.",
            Some("The card returned a status word that was not expected."),
        ),
        CardCancellationByUser => ("The PIN entry has been cancelled.", None),
        CardInputTimeOut => (
            "The maximum time was exceeded during the input process.",
            Some("Please enter the PIN within the allowed time."),
        ),
        CardInvalidPin => (
            "The given PIN is not correct.",
            Some("The number of remaining attempts has been reduced."),
        ),
        CardInvalidCan => (
            "The given card access number (CAN) is not correct.",
            None,
        ),
        CardInvalidPuk => (
            "The given PUK is not correct.",
            Some("The number of remaining attempts has been reduced."),
        ),
        CardPinBlocked => (
            "The PIN was blocked after too many unsuccessful attempts.",
            Some("Unblock the PIN with your PUK."),
        ),
        CardPinNotBlocked => (
            "The PIN is not blocked.",
            Some("Unblocking is not required."),
        ),
        CardPukBlocked => (
            "The PUK is no longer usable.",
            Some("The PUK has been used the maximum number of times."),
        ),
        CardNewPinMismatch => (
            "The new PIN and the confirmation do not match.",
            None,
        ),
        CardNewPinInvalidLength => (
            "The length of the new PIN is not valid.",
            Some("The new PIN has to consist of six digits."),
        ),

        RemoteReaderCloseCodeAbnormalClose => (
            "The connection to the smartphone card reader was lost.",
            Some("The remote device closed the connection unexpectedly."),
        ),

        RemoteConnectorInvalidRequest => (
            "The smartphone card reader received an invalid request.",
            None,
        ),
        RemoteConnectorNoSupportedApiLevel => (
            "The smartphone card reader is not compatible.",
            Some("No common protocol version is supported by both devices."),
        ),
        RemoteConnectorConnectionTimeout => (
            "The connection to the smartphone card reader timed out.",
            None,
        ),
        RemoteConnectorConnectionError => (
            "The connection to the smartphone card reader failed.",
            Some("Make sure both devices are in the same network."),
        ),
        RemoteConnectorRemoteHostRefusedConnection => (
            "The smartphone card reader refused the connection.",
            Some("Pair the devices again and retry."),
        ),
    }
}
