//! Core dispatch engine state and construction

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::config::DispatchConfig;
use crate::error::Result;
use crate::notifier::Notifier;
use crate::operator::registry::OperatorRegistry;
use crate::order::store::OrderStore;
use crate::order::token::TokenAllocator;
use crate::order::types::{Order, OrderToken};
use crate::session::router::SessionRouter;
use crate::{DispatchStats, DispatchTotals};

/// Primary order dispatch engine
///
/// Central coordinator for order intake completion, round-robin operator
/// assignment, timeout escalation, accept/reject/complete transitions, and
/// relay session lifecycle. Cloning is cheap; all state is shared behind
/// `Arc`s, so handlers and timer tasks each hold their own handle.
///
/// # Examples
///
/// ```
/// use tiffin_dispatch_engine::prelude::*;
/// use std::sync::Arc;
///
/// # fn example() -> Result<()> {
/// let engine = DispatchEngine::new(DispatchConfig::default(), Arc::new(LogNotifier))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DispatchEngine {
    /// Engine configuration, fixed at construction
    pub(super) config: DispatchConfig,

    /// Operator roster; mutated by the external management surface
    pub(super) operators: Arc<RwLock<OperatorRegistry>>,

    /// In-flight order table
    pub(super) orders: Arc<OrderStore>,

    /// Active relay sessions
    pub(super) sessions: Arc<SessionRouter>,

    /// Order token issuance
    pub(super) tokens: Arc<TokenAllocator>,

    /// Process-wide round-robin rotation, advanced once per created order
    ///
    /// Independent of every order's own reassignment cursor, and never reset
    /// on operator churn; it wraps via modulo at read time.
    pub(super) rotation: Arc<AtomicUsize>,

    /// Cumulative counters since startup
    pub(super) totals: Arc<RwLock<DispatchTotals>>,

    /// Outbound delivery boundary
    pub(super) notifier: Arc<dyn Notifier>,
}

impl DispatchEngine {
    /// Create a new dispatch engine
    ///
    /// Validates the configuration and seeds the operator registry with the
    /// configured main operator. Returns an `Arc` for shared ownership across
    /// handler tasks.
    pub fn new(config: DispatchConfig, notifier: Arc<dyn Notifier>) -> Result<Arc<Self>> {
        config.validate()?;

        info!(
            "🚀 dispatch engine starting (main operator {}, acceptance timeout {:?})",
            config.general.main_operator, config.escalation.acceptance_timeout
        );

        let registry = OperatorRegistry::new(config.general.main_operator);

        Ok(Arc::new(Self {
            config,
            operators: Arc::new(RwLock::new(registry)),
            orders: Arc::new(OrderStore::new()),
            sessions: Arc::new(SessionRouter::new()),
            tokens: Arc::new(TokenAllocator::new()),
            rotation: Arc::new(AtomicUsize::new(0)),
            totals: Arc::new(RwLock::new(DispatchTotals::default())),
            notifier,
        }))
    }

    /// Handle to the operator registry
    ///
    /// This is the mutation surface for external operator management
    /// (register, remove, status toggles); the engine itself only reads it.
    pub fn operators(&self) -> &Arc<RwLock<OperatorRegistry>> {
        &self.operators
    }

    /// Handle to the session router
    pub fn sessions(&self) -> &Arc<SessionRouter> {
        &self.sessions
    }

    /// Engine configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Snapshot an in-flight order
    ///
    /// `None` once the order completes (completed orders are removed, not
    /// archived) or if the token was never issued.
    pub fn order(&self, token: OrderToken) -> Option<Order> {
        self.orders.get(token)
    }

    /// Live statistics snapshot
    pub async fn stats(&self) -> DispatchStats {
        let (pending_orders, accepted_orders) = self.orders.status_counts();
        DispatchStats {
            pending_orders,
            accepted_orders,
            open_sessions: self.sessions.active_sessions().await,
            online_operators: self.operators.read().await.online_operators().len(),
            totals: self.totals.read().await.clone(),
        }
    }
}
