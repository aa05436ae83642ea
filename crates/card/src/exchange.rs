//! Correlation of one request with its response

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};
use eid_remote_status::StatusCode;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::LOG_TARGET;
use crate::messages::IfdMessageType;
use crate::return_code::CardReturnCode;
use crate::transport::TransportObserver;

/// Errors raised while waiting for a response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    /// No response arrived in time
    #[error("No {expected} within {timeout:?}")]
    Timeout {
        /// Awaited message type
        expected: IfdMessageType,
        /// Elapsed bound
        timeout: Duration,
    },
}

impl From<ExchangeError> for CardReturnCode {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Timeout { .. } => Self::InputTimeOut,
        }
    }
}

/// Pending request awaiting its response
///
/// The exchange is awaiting while it still holds the reply sender. The first
/// matching notification takes the sender, so at most one payload is
/// delivered.
#[derive(Debug)]
pub(crate) struct Exchange {
    expected: IfdMessageType,
    reply: Mutex<Option<Sender<Value>>>,
}

impl Exchange {
    /// Create an exchange and the receiver its payload arrives on
    pub(crate) fn new(expected: IfdMessageType) -> (Arc<Self>, Receiver<Value>) {
        let (sender, receiver) = bounded(1);
        let exchange = Arc::new(Self {
            expected,
            reply: Mutex::new(Some(sender)),
        });
        (exchange, receiver)
    }

    /// Stop awaiting, returns whether the exchange was still awaiting
    pub(crate) fn retract(&self) -> bool {
        self.reply.lock().take().is_some()
    }

    fn deliver(&self, payload: Value) -> bool {
        match self.reply.lock().take() {
            // The channel has room for exactly this payload
            Some(sender) => sender.try_send(payload).is_ok(),
            None => false,
        }
    }

    fn is_awaiting(&self) -> bool {
        self.reply.lock().is_some()
    }
}

impl TransportObserver for Exchange {
    fn on_received(&self, kind: IfdMessageType, payload: &Value) {
        if !self.is_awaiting() {
            debug!(target: LOG_TARGET, %kind, "Dropping message, no request pending");
            return;
        }

        if kind != self.expected && kind != IfdMessageType::IfdError {
            warn!(target: LOG_TARGET, %kind, expected = %self.expected, "Ignoring unexpected message type");
            return;
        }

        if !self.deliver(payload.clone()) {
            debug!(target: LOG_TARGET, %kind, "Response arrived after the request ended");
        }
    }

    fn on_closed(&self, code: StatusCode, context_handle: &str) {
        if self.deliver(Value::Null) {
            warn!(
                target: LOG_TARGET,
                %code,
                context_handle,
                expected = %self.expected,
                "Link closed while awaiting a response"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matching_message_is_delivered_once() {
        let (exchange, receiver) = Exchange::new(IfdMessageType::IfdTransmitResponse);
        exchange.on_received(IfdMessageType::IfdTransmitResponse, &json!({"n": 1}));
        exchange.on_received(IfdMessageType::IfdTransmitResponse, &json!({"n": 2}));

        assert_eq!(receiver.try_recv().unwrap(), json!({"n": 1}));
        assert!(receiver.try_recv().is_err());
        assert!(!exchange.retract());
    }

    #[test]
    fn test_error_message_is_accepted() {
        let (exchange, receiver) = Exchange::new(IfdMessageType::IfdConnectResponse);
        exchange.on_received(IfdMessageType::IfdError, &json!({"msg": "IFDError"}));
        assert_eq!(receiver.try_recv().unwrap()["msg"], "IFDError");
    }

    #[test]
    fn test_other_types_are_ignored() {
        let (exchange, receiver) = Exchange::new(IfdMessageType::IfdConnectResponse);
        exchange.on_received(IfdMessageType::IfdTransmitResponse, &json!({}));
        assert!(receiver.try_recv().is_err());
        assert!(exchange.is_awaiting());
    }

    #[test]
    fn test_closure_wakes_with_empty_payload() {
        let (exchange, receiver) = Exchange::new(IfdMessageType::IfdDisconnectResponse);
        exchange.on_closed(StatusCode::RemoteReaderCloseCodeAbnormalClose, "ctx");
        assert_eq!(receiver.try_recv().unwrap(), Value::Null);

        // Closure without a pending request only logs
        exchange.on_closed(StatusCode::RemoteReaderCloseCodeAbnormalClose, "ctx");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_retracted_exchange_drops_late_reply() {
        let (exchange, receiver) = Exchange::new(IfdMessageType::IfdTransmitResponse);
        assert!(exchange.retract());
        exchange.on_received(IfdMessageType::IfdTransmitResponse, &json!({}));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_timeout_maps_to_input_timeout() {
        let err = ExchangeError::Timeout {
            expected: IfdMessageType::IfdConnectResponse,
            timeout: Duration::from_secs(5),
        };
        assert_eq!(CardReturnCode::from(err), CardReturnCode::InputTimeOut);
    }
}
