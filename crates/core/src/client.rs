//! Clients: service consumers that hold credit and receive messages
//!
//! A [`Client`] owns a transaction lock guarding its credit. Every credit
//! mutation (consumption by a scan, recharge by the payment service) and
//! every message delivery happens under that lock, so a client never handles
//! two messages at once.

use crate::message::{Message, MessageSink};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Create a new random ClientId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscription tier of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Free clients. Dispatched less often; never recharged.
    Standard,
    /// Paying clients. Dispatched more often; metered credit is recharged
    /// through the payment authority.
    Premium,
}

impl Tier {
    /// Both tiers, Premium first
    pub const ALL: [Tier; 2] = [Tier::Premium, Tier::Standard];

    /// Dense index for per-tier arrays
    pub fn index(self) -> usize {
        match self {
            Tier::Premium => 0,
            Tier::Standard => 1,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Standard => write!(f, "standard"),
            Tier::Premium => write!(f, "premium"),
        }
    }
}

/// Credit allotment of a client.
///
/// `Unmetered` is the sentinel for "does not take part in credit
/// accounting". A metered counter is unsigned, so it can never go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credit {
    /// No credit accounting; every match is admitted
    Unmetered,
    /// Remaining units; one unit pays for one reported match
    Metered(u32),
}

impl Credit {
    /// Remaining units, or `None` for unmetered clients
    pub fn remaining(self) -> Option<u32> {
        match self {
            Credit::Unmetered => None,
            Credit::Metered(units) => Some(units),
        }
    }
}

/// Outcome of a credit check for one candidate match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The match may be reported. Metered Premium clients have already paid
    /// one unit for it.
    Granted,
    /// A metered Premium client is out of credit and must be recharged
    /// before the match can be reported.
    Exhausted,
    /// A metered client that is not eligible for recharge is out of credit.
    Denied,
}

/// A service consumer.
///
/// Clients live for the whole process once created and are shared by
/// `Arc` between the scheduler queues, the scans and the payment service.
pub struct Client {
    id: ClientId,
    tier: Tier,
    /// Transaction lock: guards credit and serializes message handling
    credit: Mutex<Credit>,
    sink: Arc<dyn MessageSink>,
}

impl Client {
    /// Create a client that reports its messages to `sink`
    pub fn new(tier: Tier, credit: Credit, sink: Arc<dyn MessageSink>) -> Self {
        Self::with_id(ClientId::new(), tier, credit, sink)
    }

    /// Create a client with a caller-chosen identity
    pub fn with_id(id: ClientId, tier: Tier, credit: Credit, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            id,
            tier,
            credit: Mutex::new(credit),
            sink,
        }
    }

    /// Client identity
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Subscription tier
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Current credit allotment
    pub fn credit(&self) -> Credit {
        *self.credit.lock()
    }

    /// Whether this client takes part in paid recharge: Premium tier with a
    /// concrete allotment.
    pub fn is_metered(&self) -> bool {
        self.tier == Tier::Premium && matches!(self.credit(), Credit::Metered(_))
    }

    /// Check credit for one candidate match and, if granted, pay for it.
    ///
    /// Check and consumption happen atomically under the transaction lock,
    /// so two scans racing for the last unit cannot both be granted.
    /// Only metered Premium clients are charged; unmetered clients always
    /// pass.
    pub fn try_admit(&self) -> Admission {
        let mut credit = self.credit.lock();
        match (*credit, self.tier) {
            (Credit::Unmetered, _) => Admission::Granted,
            (Credit::Metered(0), Tier::Premium) => Admission::Exhausted,
            (Credit::Metered(0), Tier::Standard) => Admission::Denied,
            (Credit::Metered(units), Tier::Premium) => {
                *credit = Credit::Metered(units - 1);
                Admission::Granted
            }
            (Credit::Metered(_), Tier::Standard) => Admission::Granted,
        }
    }

    /// Deliver a message to this client.
    ///
    /// The transaction lock is held while the message is applied and handed
    /// to the sink, so deliveries to the same client never interleave.
    /// [`Message::CreditRecharged`] adds its amount to a metered allotment.
    pub fn push_message(&self, message: Message) {
        let mut credit = self.credit.lock();
        if let Message::CreditRecharged { amount } = &message {
            if let Credit::Metered(units) = *credit {
                *credit = Credit::Metered(units.saturating_add(*amount));
            }
        }
        self.sink.receive(self.id, &message);
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("tier", &self.tier)
            .field("credit", &self.credit())
            .finish()
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client({}) {{ tier={} }}", self.id, self.tier)
    }
}
