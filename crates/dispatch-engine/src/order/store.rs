//! In-memory order table

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{DispatchError, Result};
use crate::order::types::{Order, OrderStatus, OrderToken};

/// Authoritative table of in-flight orders, keyed by token
///
/// Backed by a sharded concurrent map: transitions on one order run under its
/// entry guard and are serialized per token, while distinct orders proceed in
/// parallel. Callers must not hold an entry guard across an await point,
/// which is why the mutating API takes closures instead of returning guards.
pub struct OrderStore {
    orders: DashMap<OrderToken, Order>,
}

impl OrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
        }
    }

    /// Insert a freshly created order
    pub fn insert(&self, order: Order) {
        self.orders.insert(order.token, order);
    }

    /// Snapshot an order by token
    pub fn get(&self, token: OrderToken) -> Option<Order> {
        self.orders.get(&token).map(|entry| entry.value().clone())
    }

    /// Whether the token is present
    pub fn contains(&self, token: OrderToken) -> bool {
        self.orders.contains_key(&token)
    }

    /// Mutate an order in place under its entry guard
    ///
    /// Returns `None` if the token is absent; otherwise the closure's result.
    /// The closure runs synchronously while the guard is held.
    pub fn update<T>(&self, token: OrderToken, f: impl FnOnce(&mut Order) -> T) -> Option<T> {
        self.orders
            .get_mut(&token)
            .map(|mut entry| f(entry.value_mut()))
    }

    /// Remove an order after a validation check, atomically
    ///
    /// The check runs under the entry guard, so no transition can interleave
    /// between validation and removal. A failing check leaves the order in
    /// place; an absent token is `OrderGone`.
    pub fn try_remove(
        &self,
        token: OrderToken,
        check: impl FnOnce(&Order) -> Result<()>,
    ) -> Result<Order> {
        match self.orders.entry(token) {
            Entry::Occupied(entry) => {
                check(entry.get())?;
                Ok(entry.remove())
            }
            Entry::Vacant(_) => Err(DispatchError::OrderGone(token)),
        }
    }

    /// Number of in-flight orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Counts of (pending, accepted) orders
    pub fn status_counts(&self) -> (usize, usize) {
        let mut pending = 0;
        let mut accepted = 0;
        for entry in self.orders.iter() {
            match entry.value().status {
                OrderStatus::Pending => pending += 1,
                OrderStatus::Accepted => accepted += 1,
                _ => {}
            }
        }
        (pending, accepted)
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}
