//! # Operator Registry
//!
//! The registry is the authoritative roster of operators: who exists, what
//! role they hold, and whether they are currently online. Round-robin
//! assignment depends on one property above all others: the online snapshot
//! is returned in **registration order**, and that order is stable across
//! status flips. An operator who goes offline and comes back keeps their
//! original position in the rotation.
//!
//! ## Examples
//!
//! ```
//! use tiffin_dispatch_engine::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let mut registry = OperatorRegistry::new(PartyId(990001));
//!
//! registry.register(PartyId(1001), OperatorRole::Admin)?;
//! registry.register(PartyId(1002), OperatorRole::Admin)?;
//! registry.set_status(PartyId(1001), OperatorStatus::Online)?;
//! registry.set_status(PartyId(1002), OperatorStatus::Online)?;
//!
//! assert_eq!(registry.online_operators(), vec![PartyId(1001), PartyId(1002)]);
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use tracing::info;

use crate::error::{DispatchError, Result};
use crate::operator::types::{Operator, OperatorRole, OperatorStatus, PartyId};

/// Roster of operators handling dispatched orders
///
/// Entries are kept in registration order; lookups are linear scans, which is
/// the right trade for a roster that is a handful of humans. The registry is
/// plain mutable state; the engine wraps it in `Arc<RwLock<...>>` for
/// concurrent access.
pub struct OperatorRegistry {
    /// Identity of the main operator; seeded at construction, never removed
    main: PartyId,

    /// All operators in registration order, the main operator first
    roster: Vec<Operator>,
}

impl OperatorRegistry {
    /// Create a registry seeded with the main operator
    ///
    /// The main operator starts online, manages the roster, and never appears
    /// in the assignment rotation.
    pub fn new(main: PartyId) -> Self {
        Self {
            main,
            roster: vec![Operator {
                id: main,
                role: OperatorRole::Main,
                status: OperatorStatus::Online,
                status_changed_at: Utc::now(),
            }],
        }
    }

    /// Identity of the main operator
    pub fn main_operator(&self) -> PartyId {
        self.main
    }

    /// Add an operator to the roster
    ///
    /// New operators start offline (they opt in by toggling their status).
    /// Fails with `AlreadyExists` for a duplicate id and `InvalidOperation`
    /// for an attempt to register a second main operator.
    pub fn register(&mut self, id: PartyId, role: OperatorRole) -> Result<()> {
        if role == OperatorRole::Main {
            return Err(DispatchError::invalid_operation(format!(
                "main operator is fixed at {}",
                self.main
            )));
        }
        if self.get(id).is_some() {
            return Err(DispatchError::AlreadyExists(id));
        }

        self.roster.push(Operator {
            id,
            role,
            status: OperatorStatus::Offline,
            status_changed_at: Utc::now(),
        });

        info!("👤 operator {} registered", id);
        Ok(())
    }

    /// Remove an operator from the roster
    ///
    /// Fails with `InvalidOperation` if the id is the main operator or was
    /// never registered. Orders already carrying the removed operator in
    /// their candidate snapshot are unaffected; the snapshot is fixed at
    /// order creation.
    pub fn remove(&mut self, id: PartyId) -> Result<Operator> {
        if id == self.main {
            return Err(DispatchError::invalid_operation(format!(
                "cannot remove the main operator {}",
                id
            )));
        }

        match self.roster.iter().position(|op| op.id == id) {
            Some(idx) => {
                info!("➖ operator {} removed from roster", id);
                Ok(self.roster.remove(idx))
            }
            None => Err(DispatchError::invalid_operation(format!(
                "operator {} is not on the roster",
                id
            ))),
        }
    }

    /// Update an operator's availability status
    ///
    /// Fails with `NotFound` if the id is unknown. The change is stamped so
    /// the management surface can show how long someone has been online.
    pub fn set_status(&mut self, id: PartyId, status: OperatorStatus) -> Result<()> {
        let op = self
            .roster
            .iter_mut()
            .find(|op| op.id == id)
            .ok_or(DispatchError::NotFound(id))?;

        if op.status != status {
            op.status = status;
            op.status_changed_at = Utc::now();
        }

        info!("🔄 operator {} status: {}", id, status);
        Ok(())
    }

    /// Snapshot of admin-role operators currently online, in registration order
    ///
    /// This ordering is what makes round robin deterministic; callers must
    /// not sort or dedup it.
    pub fn online_operators(&self) -> Vec<PartyId> {
        self.roster
            .iter()
            .filter(|op| op.role == OperatorRole::Admin && op.status == OperatorStatus::Online)
            .map(|op| op.id)
            .collect()
    }

    /// Whether the id belongs to anyone on the roster, the main operator included
    pub fn is_operator(&self, id: PartyId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a roster entry
    pub fn get(&self, id: PartyId) -> Option<&Operator> {
        self.roster.iter().find(|op| op.id == id)
    }

    /// List the full roster in registration order
    pub fn list(&self) -> &[Operator] {
        &self.roster
    }

    /// Roster summary for the status panel
    ///
    /// Counts admin-role operators only; the main operator never takes
    /// assignments and is excluded.
    pub fn statistics(&self) -> OperatorStats {
        let admins = self
            .roster
            .iter()
            .filter(|op| op.role == OperatorRole::Admin);

        let mut total = 0;
        let mut online = 0;
        for op in admins {
            total += 1;
            if op.status == OperatorStatus::Online {
                online += 1;
            }
        }

        OperatorStats {
            total,
            online,
            offline: total - online,
        }
    }
}

/// Roster summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorStats {
    /// Number of admin-role operators on the roster
    pub total: usize,

    /// Number currently online
    pub online: usize,

    /// Number currently offline
    pub offline: usize,
}
