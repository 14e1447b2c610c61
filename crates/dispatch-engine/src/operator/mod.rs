//! Operator management for the dispatch engine
//!
//! The roster of human operators who handle orders. The registry is the
//! authoritative source of operator identity, role, and online/offline
//! status; the dispatch engine only ever consumes the resulting state (its
//! online snapshot drives round-robin assignment).
//!
//! Mutations come from an external operator-management surface: the main
//! operator adds and removes admins, and admins toggle their own status.

pub mod registry;
pub mod types;

pub use registry::{OperatorRegistry, OperatorStats};
pub use types::{Operator, OperatorRole, OperatorStatus, PartyId};
