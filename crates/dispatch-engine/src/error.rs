use thiserror::Error;

use crate::operator::types::PartyId;
use crate::order::types::OrderToken;

/// Error types for dispatch engine operations
///
/// Every failure is local to a single operation: a returned error means the
/// affected order, roster entry, or session is exactly as it was before the
/// call. Delivery failures at the notifier boundary are not represented here
/// at all; they are swallowed and logged by the engine.
///
/// # Examples
///
/// ```
/// use tiffin_dispatch_engine::{DispatchError, Result};
///
/// fn submit() -> Result<()> {
///     Err(DispatchError::NoOperatorsOnline)
/// }
///
/// match submit() {
///     Ok(_) => println!("order placed"),
///     Err(DispatchError::NoOperatorsOnline) => println!("try again later"),
///     Err(e) => println!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Submission-time failure: the online-operator snapshot was empty.
    ///
    /// Surfaced to the customer; the caller discards its intake state. No
    /// order is created and no token is consumed.
    #[error("no operators online")]
    NoOperatorsOnline,

    /// An operator acted on an order that is not currently routed to them.
    ///
    /// Surfaced as a rejection to the actor; no state change.
    #[error("order {0} is not assigned to operator {1}")]
    NotAssigned(OrderToken, PartyId),

    /// The token is unknown or the order already reached a terminal state.
    ///
    /// Surfaced to the actor as "expired or completed".
    #[error("order {0} expired or already completed")]
    OrderGone(OrderToken),

    /// Attempt to open a relay session for a party that already has one.
    ///
    /// Indicates a boundary-layer invariant violation; logged and the
    /// operation aborted with no state change.
    #[error("session conflict: {0}")]
    Conflict(String),

    /// A relay was attempted by a party with no open session.
    ///
    /// Not a defect: the boundary layer uses this to fall through to its
    /// other handling (intake flows, operator commands).
    #[error("no open session for party {0}")]
    NoSession(PartyId),

    /// The operator id is not on the roster.
    #[error("operator not found: {0}")]
    NotFound(PartyId),

    /// Roster mutation that the registry refuses, e.g. removing the main
    /// operator or removing an id that was never registered.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Attempt to register an id that is already on the roster.
    #[error("operator already registered: {0}")]
    AlreadyExists(PartyId),

    /// The engine is tracking too many in-flight orders to take another.
    #[error("system at capacity: {0} orders in flight")]
    AtCapacity(usize),

    /// Pricing rejection: the item total is under the configured minimum.
    #[error("item total {0:.2} is below the minimum of {1:.2}")]
    BelowMinimum(f64, f64),

    /// Configuration validation failure.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unexpected internal errors. These should be logged and investigated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        // Map anyhow errors to Internal by default, as they are usually
        // unexpected errors from boundary collaborators.
        Self::Internal(err.to_string())
    }
}

impl DispatchError {
    /// Create a new Conflict error with the provided message
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a new InvalidOperation error with the provided message
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create a new Configuration error with the provided message
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new Internal error with the provided message
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type for dispatch engine operations
///
/// Type alias for `std::result::Result<T, DispatchError>` used throughout the
/// crate.
pub type Result<T> = std::result::Result<T, DispatchError>;
