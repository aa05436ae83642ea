//! Blocking card session on top of an asynchronous remote reader link

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use crossbeam_channel::RecvTimeoutError;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::LOG_TARGET;
use crate::apdu::CommandApdu;
use crate::config::{RemoteCardConfig, VolatileSettings};
use crate::exchange::{Exchange, ExchangeError};
use crate::messages::{
    IfdConnect, IfdDestroyPaceChannel, IfdDisconnect, IfdEstablishPaceChannel, IfdMessage,
    IfdMessageType, IfdModifyPin, IfdTransmit,
};
use crate::outcome;
use crate::pace::{EstablishPaceChannel, EstablishPaceChannelOutput, PacePasswordId};
use crate::pin_modify::PinModify;
use crate::return_code::{CardReturnCode, ResponseApduResult};
use crate::transport::MessageTransport;

/// Card in a remote reader
///
/// Every operation sends one request and blocks the calling thread until
/// the matching response arrives, the link closes or the timeout elapses.
/// Operations take `&mut self`, so a session never has more than one
/// request in flight.
pub struct RemoteCard {
    transport: Arc<dyn MessageTransport>,
    reader_name: String,
    slot_handle: Option<String>,
    progress_message: Option<String>,
    settings: Arc<VolatileSettings>,
    config: RemoteCardConfig,
}

impl RemoteCard {
    /// Bind a session to the slot `reader_name` announced by `transport`
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        reader_name: &str,
        settings: Arc<VolatileSettings>,
    ) -> Self {
        Self::with_config(transport, reader_name, settings, RemoteCardConfig::default())
    }

    /// Bind a session using custom configuration
    pub fn with_config(
        transport: Arc<dyn MessageTransport>,
        reader_name: &str,
        settings: Arc<VolatileSettings>,
        config: RemoteCardConfig,
    ) -> Self {
        let context_handle = transport.context_handle();
        let reader_name = if context_handle.is_empty() {
            reader_name.to_owned()
        } else {
            reader_name.replace(&context_handle, "")
        };

        Self {
            transport,
            reader_name,
            slot_handle: None,
            progress_message: None,
            settings,
            config,
        }
    }

    /// Name of the slot on the remote side
    pub fn reader_name(&self) -> &str {
        &self.reader_name
    }

    /// Handle of the connected slot
    pub fn slot_handle(&self) -> Option<&str> {
        self.slot_handle.as_deref()
    }

    /// Whether a connection to the card is established
    pub const fn is_connected(&self) -> bool {
        self.slot_handle.is_some()
    }

    /// Text the remote side shows during the next transmit
    pub fn set_progress_message(&mut self, message: &str, progress: Option<u8>) {
        self.progress_message = Some(match progress {
            Some(progress) => format!("{message}\n{progress} %"),
            None => message.to_owned(),
        });
    }

    /// Connect to the card
    pub fn establish_connection(&mut self) -> CardReturnCode {
        debug_assert!(!self.is_connected(), "session is already connected");

        let message = IfdMessage::Connect(IfdConnect {
            slot_name: self.reader_name.clone(),
            exclusive: true,
        });
        let payload = match self.send_message(
            message,
            IfdMessageType::IfdConnectResponse,
            self.config.response_timeout,
        ) {
            Ok(payload) => payload,
            Err(err) => return err.into(),
        };

        match outcome::connect(&payload) {
            Ok(slot_handle) => {
                debug!(target: LOG_TARGET, reader = %self.reader_name, %slot_handle, "Connected");
                self.slot_handle = Some(slot_handle);
                CardReturnCode::Ok
            }
            Err(code) => code,
        }
    }

    /// Release the connection to the card
    pub fn release_connection(&mut self) -> CardReturnCode {
        let message = IfdMessage::Disconnect(IfdDisconnect {
            slot_handle: self.connected_slot(),
        });
        let payload = match self.send_message(
            message,
            IfdMessageType::IfdDisconnectResponse,
            self.config.response_timeout,
        ) {
            Ok(payload) => payload,
            Err(err) => return err.into(),
        };

        match outcome::disconnect(&payload) {
            Ok(()) => {
                debug!(target: LOG_TARGET, reader = %self.reader_name, "Disconnected");
                self.slot_handle = None;
                CardReturnCode::Ok
            }
            Err(code) => code,
        }
    }

    /// Send a command APDU to the card
    ///
    /// The progress message is consumed even when the call fails.
    pub fn transmit(&mut self, command: &CommandApdu) -> ResponseApduResult {
        let display_text = self.progress_message.take();
        let input_apdu = match command.to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(target: LOG_TARGET, %err, "Command APDU cannot be encoded");
                return CardReturnCode::CommandFailed.into();
            }
        };
        debug!(target: LOG_TARGET, command = %hex::encode_upper(&input_apdu), "Transmit command APDU");

        let message = IfdMessage::Transmit(IfdTransmit::new(
            self.connected_slot(),
            input_apdu,
            display_text,
        ));
        let payload = match self.send_message(
            message,
            IfdMessageType::IfdTransmitResponse,
            self.config.response_timeout,
        ) {
            Ok(payload) => payload,
            Err(err) => return CardReturnCode::from(err).into(),
        };

        match outcome::transmit(&payload) {
            Ok(response) => {
                debug!(target: LOG_TARGET, %response, "Transmit response APDU");
                ResponseApduResult::new(CardReturnCode::Ok, response)
            }
            Err(code) => code.into(),
        }
    }

    /// Establish a PACE channel using the PIN pad of the remote reader
    ///
    /// When the application is embedded, the preferred PIN length is
    /// replaced by 0 ("no preference").
    pub fn establish_pace_channel(
        &mut self,
        password_id: PacePasswordId,
        preferred_pin_length: u8,
        chat: Bytes,
        certificate_description: Bytes,
        timeout_seconds: u8,
    ) -> EstablishPaceChannelOutput {
        let preferred_pin_length = if self.settings.is_used_as_sdk() {
            0
        } else {
            preferred_pin_length
        };

        let input = EstablishPaceChannel::new(password_id, chat, certificate_description);
        let input_data = match input.to_ccid() {
            Ok(data) => data,
            Err(err) => {
                debug!(target: LOG_TARGET, %err, "PACE input cannot be encoded");
                return EstablishPaceChannelOutput::new(CardReturnCode::CommandFailed);
            }
        };

        let message = IfdMessage::EstablishPaceChannel(IfdEstablishPaceChannel::new(
            self.connected_slot(),
            input_data,
            preferred_pin_length,
        ));
        match self.send_message(
            message,
            IfdMessageType::IfdEstablishPaceChannelResponse,
            seconds(timeout_seconds),
        ) {
            Ok(payload) => outcome::establish_pace_channel(&payload, password_id),
            Err(err) => EstablishPaceChannelOutput::new(err.into()),
        }
    }

    /// Destroy the PACE channel
    pub fn destroy_pace_channel(&mut self) -> CardReturnCode {
        let message = IfdMessage::DestroyPaceChannel(IfdDestroyPaceChannel {
            slot_handle: self.connected_slot(),
        });
        match self.send_message(
            message,
            IfdMessageType::IfdDestroyPaceChannelResponse,
            self.config.response_timeout,
        ) {
            Ok(payload) => match outcome::destroy_pace_channel(&payload) {
                Ok(()) => CardReturnCode::Ok,
                Err(code) => code,
            },
            Err(err) => err.into(),
        }
    }

    /// Set a new eID PIN using the PIN pad of the remote reader
    pub fn set_eid_pin(&mut self, timeout_seconds: u8) -> ResponseApduResult {
        let input_data = PinModify::new(timeout_seconds).create_ccid();
        let message = IfdMessage::ModifyPin(IfdModifyPin::new(self.connected_slot(), input_data));
        match self.send_message(
            message,
            IfdMessageType::IfdModifyPinResponse,
            seconds(timeout_seconds),
        ) {
            Ok(payload) => outcome::modify_pin(&payload),
            Err(err) => CardReturnCode::from(err).into(),
        }
    }

    fn connected_slot(&self) -> String {
        debug_assert!(self.is_connected(), "session is not connected");
        self.slot_handle.clone().unwrap_or_default()
    }

    /// Send `message` and wait up to `timeout` for a payload of type `expected`
    ///
    /// Returns `Value::Null` when the link closed while waiting.
    #[instrument(level = "trace", skip_all, fields(kind = %message.message_type(), %expected))]
    fn send_message(
        &self,
        message: IfdMessage,
        expected: IfdMessageType,
        timeout: Duration,
    ) -> Result<Value, ExchangeError> {
        let (exchange, reply) = Exchange::new(expected);
        let subscription = self.transport.subscribe(exchange.clone());
        self.transport.send(message);

        let result = reply.recv_timeout(timeout);
        drop(subscription);

        match result {
            Ok(payload) => {
                trace!(target: LOG_TARGET, "Response received");
                Ok(payload)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                if !exchange.retract() {
                    // Delivered between the timeout and the retraction
                    if let Ok(payload) = reply.try_recv() {
                        return Ok(payload);
                    }
                }
                debug!(target: LOG_TARGET, %expected, ?timeout, "Expected answer was not received in time");
                Err(ExchangeError::Timeout { expected, timeout })
            }
        }
    }
}

const fn seconds(timeout_seconds: u8) -> Duration {
    Duration::from_secs(timeout_seconds as u64)
}

impl fmt::Debug for RemoteCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCard")
            .field("transport", &self.transport)
            .field("reader_name", &self.reader_name)
            .field("slot_handle", &self.slot_handle)
            .field("config", &self.config)
            .finish()
    }
}
