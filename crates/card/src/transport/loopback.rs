//! In-process transport whose remote side is a closure
//!
//! Requests are handed to a worker thread that runs the responder and
//! reports its replies to the observers, the way a network transport
//! reports messages arriving on its socket thread.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, unbounded};
use eid_remote_status::StatusCode;
use serde_json::Value;
use tracing::{debug, trace};

use super::{MessageTransport, ObserverRegistry, Subscription, TransportObserver};
use crate::LOG_TARGET;
use crate::messages::{IfdMessage, IfdMessageType, IfdResponse};

/// Reaction of the remote side to a request
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Send a message of the given type
    Message(IfdMessageType, Value),
    /// Close the link with the given code
    Close(StatusCode),
}

impl Reply {
    /// Reply with an encoded response
    pub fn response<R: IfdResponse>(response: &R) -> Self {
        Self::Message(R::MESSAGE_TYPE, response.to_value())
    }
}

enum Command {
    Deliver(IfdMessage),
    Inject(IfdMessageType, Value),
    Close(StatusCode),
    Shutdown,
}

/// Transport answering requests with a local responder
pub struct LoopbackTransport {
    context_handle: String,
    registry: ObserverRegistry,
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl LoopbackTransport {
    /// Start the worker thread running `responder` for every request
    pub fn spawn<F>(context_handle: impl Into<String>, mut responder: F) -> io::Result<Arc<Self>>
    where
        F: FnMut(&IfdMessage) -> Vec<Reply> + Send + 'static,
    {
        let context_handle = context_handle.into();
        let registry = ObserverRegistry::new();
        let (commands, receiver) = unbounded();

        let worker = {
            let registry = registry.clone();
            let context_handle = context_handle.clone();
            thread::Builder::new()
                .name(format!("loopback-{context_handle}"))
                .spawn(move || {
                    for command in receiver {
                        match command {
                            Command::Deliver(message) => {
                                trace!(target: LOG_TARGET, kind = %message.message_type(), "Loopback request");
                                for reply in responder(&message) {
                                    dispatch(&registry, &context_handle, reply);
                                }
                            }
                            Command::Inject(kind, payload) => {
                                dispatch(&registry, &context_handle, Reply::Message(kind, payload));
                            }
                            Command::Close(code) => {
                                dispatch(&registry, &context_handle, Reply::Close(code));
                            }
                            Command::Shutdown => break,
                        }
                    }
                })?
        };

        Ok(Arc::new(Self {
            context_handle,
            registry,
            commands,
            worker: Some(worker),
        }))
    }

    /// Deliver a message that answers no request
    pub fn inject(&self, kind: IfdMessageType, payload: Value) {
        self.enqueue(Command::Inject(kind, payload));
    }

    /// Report closure of the link to the observers
    ///
    /// The worker keeps serving requests afterwards, like a transport that
    /// reconnects.
    pub fn close(&self, code: StatusCode) {
        self.enqueue(Command::Close(code));
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }

    fn enqueue(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!(target: LOG_TARGET, context_handle = %self.context_handle, "Loopback worker stopped");
        }
    }
}

fn dispatch(registry: &ObserverRegistry, context_handle: &str, reply: Reply) {
    match reply {
        Reply::Message(kind, payload) => {
            trace!(target: LOG_TARGET, %kind, "Loopback message");
            registry.notify_received(kind, &payload);
        }
        Reply::Close(code) => {
            debug!(target: LOG_TARGET, %code, context_handle, "Loopback link closed");
            registry.notify_closed(code, context_handle);
        }
    }
}

impl MessageTransport for LoopbackTransport {
    fn context_handle(&self) -> String {
        self.context_handle.clone()
    }

    fn send(&self, message: IfdMessage) {
        self.enqueue(Command::Deliver(message));
    }

    fn subscribe(&self, observer: Arc<dyn TransportObserver>) -> Subscription {
        self.registry.subscribe(observer)
    }
}

impl fmt::Debug for LoopbackTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopbackTransport")
            .field("context_handle", &self.context_handle)
            .field("registry", &self.registry)
            .finish()
    }
}

impl Drop for LoopbackTransport {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            // A panicking responder has already reported itself
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::IfdConnect;
    use crossbeam_channel::bounded;
    use std::time::Duration;

    struct Forward(Sender<(IfdMessageType, Value)>);

    impl TransportObserver for Forward {
        fn on_received(&self, kind: IfdMessageType, payload: &Value) {
            let _ = self.0.send((kind, payload.clone()));
        }

        fn on_closed(&self, _code: StatusCode, context_handle: &str) {
            let _ = self.0.send((IfdMessageType::IfdError, Value::String(context_handle.to_owned())));
        }
    }

    #[test]
    fn test_responder_replies_reach_observers() {
        let transport = LoopbackTransport::spawn("ctx", |message| {
            vec![Reply::Message(
                IfdMessageType::IfdConnectResponse,
                serde_json::json!({"echo": message.message_type().name()}),
            )]
        })
        .unwrap();

        let (tx, rx) = bounded(4);
        let _subscription = transport.subscribe(Arc::new(Forward(tx)));
        transport.send(IfdMessage::Connect(IfdConnect {
            slot_name: "reader".to_owned(),
            exclusive: true,
        }));

        let (kind, payload) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(kind, IfdMessageType::IfdConnectResponse);
        assert_eq!(payload["echo"], "IFDConnect");

        transport.close(StatusCode::RemoteReaderCloseCodeAbnormalClose);
        let (_, payload) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(payload, Value::String("ctx".to_owned()));
    }

    #[test]
    fn test_drop_stops_worker() {
        let transport = LoopbackTransport::spawn("ctx", |_| Vec::new()).unwrap();
        assert_eq!(transport.observer_count(), 0);
        assert_eq!(transport.context_handle(), "ctx");
        drop(transport);
    }
}
