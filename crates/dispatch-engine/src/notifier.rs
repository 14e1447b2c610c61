//! Outbound delivery boundary
//!
//! The engine never talks to the chat platform directly. Every outbound
//! message or photo goes through the [`Notifier`] trait, implemented by the
//! platform shell. Delivery is best effort: the engine invokes it from
//! fire-and-forget tasks, logs failures, and never lets a failed delivery
//! roll back a state transition that already happened.

use std::fmt;

use async_trait::async_trait;
use tracing::info;

use crate::operator::types::PartyId;
use crate::order::types::{MediaRef, OrderToken};

/// Role tag attached to relayed and engine-originated messages
///
/// Lets the receiving shell prefix messages so an operator can tell which
/// customer (by token) is talking, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTag {
    /// Sent by the operator side of a relay session
    Operator,

    /// Sent by the customer side; carries the order token for labeling
    Customer(OrderToken),

    /// Engine-originated notice (order card, acceptance confirmation)
    System,
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleTag::Operator => write!(f, "operator"),
            RoleTag::Customer(token) => write!(f, "customer (token {})", token),
            RoleTag::System => write!(f, "system"),
        }
    }
}

/// Boundary collaborator that delivers messages to a party
///
/// Implementations are expected to be cheap to call and to do their own
/// retries if they want any; the engine treats every call as best effort and
/// only logs errors.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a text message
    async fn send_text(&self, to: PartyId, text: String, tag: RoleTag) -> anyhow::Result<()>;

    /// Deliver a media object with an optional caption
    async fn send_media(
        &self,
        to: PartyId,
        media: MediaRef,
        caption: Option<String>,
        tag: RoleTag,
    ) -> anyhow::Result<()>;
}

/// Notifier that logs deliveries instead of sending them
///
/// Useful for wiring demos and local runs before a platform shell exists.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_text(&self, to: PartyId, text: String, tag: RoleTag) -> anyhow::Result<()> {
        info!("📨 [{}] text to {}: {}", tag, to, text);
        Ok(())
    }

    async fn send_media(
        &self,
        to: PartyId,
        media: MediaRef,
        caption: Option<String>,
        tag: RoleTag,
    ) -> anyhow::Result<()> {
        info!(
            "📨 [{}] media {} to {} (caption: {})",
            tag,
            media,
            to,
            caption.as_deref().unwrap_or("none")
        );
        Ok(())
    }
}
