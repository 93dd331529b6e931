//! Messages delivered to clients
//!
//! Every externally observable outcome of a request is a [`Message`]
//! delivered to exactly one client through [`crate::Client::push_message`].
//! Receivers consume messages with an exhaustive `match`; there is no
//! per-message-type dispatch.

use crate::client::ClientId;
use crate::content::SourceId;
use crate::rendezvous::Rendezvous;
use crate::request::SearchRequest;
use crate::result::SearchResult;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Notifications a client can receive.
#[derive(Debug, Clone)]
pub enum Message {
    /// A metered client ran out of credit mid-scan. The scan is parked on
    /// `rendezvous` until the payment authority signals it.
    CreditExhausted {
        /// Signaled once the recharge transaction completes
        rendezvous: Rendezvous,
    },
    /// Credit was added to the client's allotment
    CreditRecharged {
        /// Units credited
        amount: u32,
    },
    /// A client that cannot be recharged ran out of credit; the rest of the
    /// request was abandoned.
    AdmissionDenied {
        /// The truncated request
        request: Arc<SearchRequest>,
    },
    /// A source finished scanning without a single occurrence
    NoResultsFound {
        /// The request that found nothing
        request: Arc<SearchRequest>,
        /// The source that was scanned
        source: SourceId,
    },
    /// One occurrence was found
    ResultFound {
        /// The request the result belongs to
        request: Arc<SearchRequest>,
        /// The occurrence
        result: SearchResult,
    },
}

impl Message {
    /// Short variant name, for logs and counters
    pub fn kind(&self) -> &'static str {
        match self {
            Message::CreditExhausted { .. } => "credit_exhausted",
            Message::CreditRecharged { .. } => "credit_recharged",
            Message::AdmissionDenied { .. } => "admission_denied",
            Message::NoResultsFound { .. } => "no_results_found",
            Message::ResultFound { .. } => "result_found",
        }
    }
}

/// Where a client's messages end up.
///
/// Called with the client's transaction lock held: implementations must not
/// call back into the same client.
pub trait MessageSink: Send + Sync {
    /// Handle one message addressed to `client`
    fn receive(&self, client: ClientId, message: &Message);
}

/// Sink that renders every message through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn receive(&self, client: ClientId, message: &Message) {
        match message {
            Message::CreditExhausted { .. } => {
                info!(%client, "not enough credit, waiting for recharge");
            }
            Message::CreditRecharged { amount } => {
                info!(%client, amount, "credit recharged");
            }
            Message::AdmissionDenied { request } => {
                warn!(%client, %request, "out of credit, request abandoned");
            }
            Message::NoResultsFound { request, source } => {
                info!(%client, %request, %source, "no results");
            }
            Message::ResultFound { request, result } => {
                info!(%client, %request, %result, "search result");
            }
        }
    }
}

/// Sink that keeps every delivered message, in delivery order.
#[derive(Debug, Default)]
pub struct MessageRecorder {
    messages: Mutex<Vec<(ClientId, Message)>>,
}

impl MessageRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages recorded so far
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Copy of every message recorded so far
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    /// Messages addressed to one client
    pub fn messages_for(&self, client: ClientId) -> Vec<Message> {
        self.messages
            .lock()
            .iter()
            .filter(|(c, _)| *c == client)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Every reported result, in delivery order
    pub fn results(&self) -> Vec<SearchResult> {
        self.messages
            .lock()
            .iter()
            .filter_map(|(_, m)| match m {
                Message::ResultFound { result, .. } => Some(result.clone()),
                _ => None,
            })
            .collect()
    }

    /// How many recorded messages have the given [`Message::kind`]
    pub fn count(&self, kind: &str) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|(_, m)| m.kind() == kind)
            .count()
    }
}

impl MessageSink for MessageRecorder {
    fn receive(&self, client: ClientId, message: &Message) {
        self.messages.lock().push((client, message.clone()));
    }
}

/// Forward every message to several sinks in turn
pub struct Fanout(pub Vec<Arc<dyn MessageSink>>);

impl MessageSink for Fanout {
    fn receive(&self, client: ClientId, message: &Message) {
        for sink in &self.0 {
            sink.receive(client, message);
        }
    }
}
