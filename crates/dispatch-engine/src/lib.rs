//! # Tiffin Dispatch Engine
//!
//! The order-dispatch and session-relay core of the Tiffin operator desk:
//! customers place food or price-check orders, a pool of human operators
//! works them, and this crate owns everything between the two with real
//! state in it.
//!
//! ## Overview
//!
//! - **Token issuance**: strictly increasing order tokens, unique for the
//!   process lifetime
//! - **Round-robin assignment**: each new order offers first refusal to the
//!   next online operator in registration order
//! - **Timeout escalation**: an unanswered assignment is bounced to the next
//!   candidate automatically
//! - **Lifecycle transitions**: accept, reject, and complete with ownership
//!   checks and race-free timer cancellation
//! - **Session relay**: after acceptance, text and media flow both ways
//!   through an ephemeral customer↔operator tunnel
//!
//! The chat platform itself (message formatting, keyboards, process
//! bootstrap) is a thin shell around this crate: inbound events call into
//! [`DispatchEngine`], and outbound delivery goes through the
//! [`Notifier`](notifier::Notifier) boundary trait the shell implements.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐
//! │  Intake shell    │   │ Operator surface │
//! └──────────────────┘   └──────────────────┘
//!           │                      │
//!           └──────────┬───────────┘
//!                      │
//!            ┌──────────────────┐
//!            │  DispatchEngine  │
//!            └──────────────────┘
//!              │       │       │
//!    ┌───────────┐ ┌─────────┐ ┌───────────────┐
//!    │ Operator  │ │  Order  │ │    Session    │
//!    │ Registry  │ │  Store  │ │    Router     │
//!    └───────────┘ └─────────┘ └───────────────┘
//!                      │
//!            ┌──────────────────┐
//!            │     Notifier     │ (platform shell)
//!            └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use tiffin_dispatch_engine::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let engine = DispatchEngine::new(DispatchConfig::default(), Arc::new(LogNotifier))?;
//!
//! // Operator management surface: put one admin online.
//! {
//!     let mut roster = engine.operators().write().await;
//!     roster.register(PartyId(1001), OperatorRole::Admin)?;
//!     roster.set_status(PartyId(1001), OperatorStatus::Online)?;
//! }
//!
//! // A completed intake enters the engine.
//! let token = engine
//!     .submit_order(
//!         PartyId(5000),
//!         OrderDetails {
//!             customer_name: "Asha".to_string(),
//!             address: "12 MG Road".to_string(),
//!             image: MediaRef::from("file-abc"),
//!             final_price: 174.0,
//!             payment: PaymentMode::Cod,
//!             payment_ref: None,
//!         },
//!     )
//!     .await?;
//!
//! // The assigned operator accepts and the relay opens.
//! engine.accept(token, PartyId(1001)).await?;
//! engine.relay(PartyId(5000), RelayPayload::Text("extra chutney please".into())).await?;
//!
//! // Fulfillment closes everything down.
//! let summary = engine.complete(token, PartyId(1001)).await?;
//! assert_eq!(summary.customer, PartyId(5000));
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Modules
//!
//! - [`dispatch`]: the engine itself; submission, transitions, escalation
//! - [`operator`]: roster, roles, online/offline status
//! - [`order`]: tokens, order state, the in-flight table
//! - [`session`]: the bidirectional relay mapping
//! - [`notifier`]: outbound delivery boundary
//! - [`pricing`]: quote math shared with the intake shell
//! - [`config`]: sectioned configuration with validation
//! - [`error`]: error taxonomy and result alias

// Core modules
pub mod config;
pub mod error;

// Dispatch functionality modules
pub mod dispatch;
pub mod operator;
pub mod order;
pub mod pricing;
pub mod session;

// External boundary
pub mod notifier;

// Re-exports for convenience
pub use config::DispatchConfig;
pub use dispatch::core::DispatchEngine;
pub use error::{DispatchError, Result};

/// Live dispatch statistics snapshot
///
/// A point-in-time view of the engine's operational state, returned by
/// [`DispatchEngine::stats`].
#[derive(Debug, Clone)]
pub struct DispatchStats {
    /// Orders waiting for an operator to accept
    pub pending_orders: usize,

    /// Orders accepted and being worked
    pub accepted_orders: usize,

    /// Open relay sessions
    pub open_sessions: usize,

    /// Operators currently eligible for assignment
    pub online_operators: usize,

    /// Cumulative counters since startup
    pub totals: DispatchTotals,
}

/// Cumulative dispatch counters since startup
#[derive(Debug, Clone, Default)]
pub struct DispatchTotals {
    /// Orders successfully submitted
    pub submitted: u64,

    /// Timer-driven reassignments
    pub escalated: u64,

    /// Operator-driven bounces
    pub rejected: u64,

    /// Orders completed
    pub completed: u64,
}

/// Prelude module for convenient imports
///
/// ```
/// use tiffin_dispatch_engine::prelude::*;
/// ```
pub mod prelude {
    //! Commonly used types for working with the dispatch engine

    pub use crate::{DispatchConfig, DispatchError, DispatchStats, DispatchTotals, Result};

    pub use crate::config::{EscalationConfig, GeneralConfig, PricingConfig};

    pub use crate::dispatch::{CompletionSummary, DispatchEngine};

    pub use crate::operator::{
        Operator, OperatorRegistry, OperatorRole, OperatorStats, OperatorStatus, PartyId,
    };

    pub use crate::order::{
        MediaRef, Order, OrderDetails, OrderStatus, OrderStore, OrderToken, PaymentMode,
        TokenAllocator,
    };

    pub use crate::session::{RelayPayload, RoutedMessage, SessionRouter};

    pub use crate::notifier::{LogNotifier, Notifier, RoleTag};

    pub use crate::pricing::Quote;

    // Common external types
    pub use chrono::{DateTime, Utc};
}
