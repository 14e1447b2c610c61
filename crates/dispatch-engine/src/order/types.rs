//! Core types for order tracking

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::operator::types::PartyId;

/// Unique integer identifier for one customer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderToken(pub u64);

impl fmt::Display for OrderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a media object held by the chat platform
///
/// Opaque to the engine; it is only ever handed back to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef(pub String);

impl From<&str> for MediaRef {
    fn from(s: &str) -> Self {
        MediaRef(s.to_string())
    }
}

impl From<String> for MediaRef {
    fn from(s: String) -> Self {
        MediaRef(s)
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    /// Cash on delivery
    Cod,

    /// Paid up front; `payment_ref` carries the payment id
    Prepaid,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMode::Cod => write!(f, "cod"),
            PaymentMode::Prepaid => write!(f, "prepaid"),
        }
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Waiting for the assigned operator to accept
    Pending,

    /// An operator accepted; the relay session is open
    Accepted,

    /// Fulfilled and removed from the store
    Completed,

    /// Abandoned without fulfillment
    Expired,
}

impl OrderStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Expired)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" | "Pending" | "PENDING" => Ok(OrderStatus::Pending),
            "accepted" | "Accepted" | "ACCEPTED" => Ok(OrderStatus::Accepted),
            "completed" | "Completed" | "COMPLETED" => Ok(OrderStatus::Completed),
            "expired" | "Expired" | "EXPIRED" => Ok(OrderStatus::Expired),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Accepted => write!(f, "accepted"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Everything intake collected about the order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Customer display name, shown on the operator's order card
    pub customer_name: String,

    /// Delivery address (free text or a map link)
    pub address: String,

    /// Food or payment-card image captured during intake
    pub image: MediaRef,

    /// Final price quoted to the customer
    pub final_price: f64,

    /// Payment mode chosen at intake
    pub payment: PaymentMode,

    /// Payment reference (e.g. UPI id) for prepaid orders
    pub payment_ref: Option<String>,
}

/// One in-flight order
///
/// `candidates` is the online-operator snapshot taken at creation and never
/// changes afterwards; reassignment only moves `cursor`. The generation
/// counter is bumped on every transition so a stale escalation timer can
/// detect that the order moved on without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique, immutable token
    pub token: OrderToken,

    /// Lifecycle status
    pub status: OrderStatus,

    /// The customer who placed the order
    pub customer: PartyId,

    /// Intake details
    pub details: OrderDetails,

    /// Online-operator snapshot at creation, in registration order; never empty
    pub candidates: Vec<PartyId>,

    /// Index of the currently assigned operator within `candidates`
    pub cursor: usize,

    /// Transition counter guarding against stale timer fires
    pub generation: u64,

    /// When the order entered the engine
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// The operator currently holding first refusal
    ///
    /// `candidates` is non-empty by construction (submission fails before an
    /// order exists when the online snapshot is empty).
    pub fn assigned_operator(&self) -> PartyId {
        self.candidates[self.cursor % self.candidates.len()]
    }

    /// Move the assignment to the next candidate, wrapping at the end
    ///
    /// Also bumps the generation, which invalidates any escalation timer
    /// armed for the previous assignment.
    pub fn advance_cursor(&mut self) {
        self.cursor = (self.cursor + 1) % self.candidates.len();
        self.generation += 1;
    }
}
