//! # Session Router
//!
//! Maintains the active customer↔operator relay mapping. A session is nothing
//! more than two directed entries in one map, always created and removed
//! together under a single lock, so the pairing can never be observed
//! half-open. A party belongs to at most one session at a time.
//!
//! Role tags are snapshotted when the session opens: membership is fixed for
//! the session's lifetime, so the label on a sender's messages never changes
//! while the tunnel exists.
//!
//! ## Examples
//!
//! ```
//! use tiffin_dispatch_engine::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let router = SessionRouter::new();
//! router.open(PartyId(1001), PartyId(5000), OrderToken(1)).await?;
//!
//! let routed = router
//!     .route(PartyId(5000), RelayPayload::Text("where is my food?".into()))
//!     .await?;
//! assert_eq!(routed.recipient, PartyId(1001));
//! assert_eq!(routed.tag, RoleTag::Customer(OrderToken(1)));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{DispatchError, Result};
use crate::notifier::RoleTag;
use crate::operator::types::PartyId;
use crate::order::types::{MediaRef, OrderToken};

/// A relayed payload: text or media, mirroring the notifier surface
#[derive(Debug, Clone)]
pub enum RelayPayload {
    /// Plain text message
    Text(String),

    /// Media object with an optional caption
    Media {
        media: MediaRef,
        caption: Option<String>,
    },
}

/// A payload routed to the other end of a session, labeled with the sender's role
#[derive(Debug, Clone)]
pub struct RoutedMessage {
    /// The party the payload should be delivered to
    pub recipient: PartyId,

    /// Role tag of the *sender*, for labeling at delivery time
    pub tag: RoleTag,

    /// The payload itself, unchanged
    pub payload: RelayPayload,
}

/// One direction of a session: the peer plus the sender's role tag
#[derive(Debug, Clone, Copy)]
struct SessionLink {
    peer: PartyId,
    tag: RoleTag,
}

/// Bidirectional relay mapping between customers and operators
pub struct SessionRouter {
    links: Mutex<HashMap<PartyId, SessionLink>>,
}

impl SessionRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self {
            links: Mutex::new(HashMap::new()),
        }
    }

    /// Open a session between an operator and a customer
    ///
    /// Both directions are inserted atomically. Fails with `Conflict` if
    /// either party already has an open session; the caller must close the
    /// stale one first. A conflict indicates a boundary-layer invariant
    /// violation and leaves the map untouched.
    pub async fn open(
        &self,
        operator: PartyId,
        customer: PartyId,
        token: OrderToken,
    ) -> Result<()> {
        let mut links = self.links.lock().await;

        if links.contains_key(&operator) {
            return Err(DispatchError::conflict(format!(
                "operator {} already has an open session",
                operator
            )));
        }
        if links.contains_key(&customer) {
            return Err(DispatchError::conflict(format!(
                "customer {} already has an open session",
                customer
            )));
        }

        links.insert(
            operator,
            SessionLink {
                peer: customer,
                tag: RoleTag::Operator,
            },
        );
        links.insert(
            customer,
            SessionLink {
                peer: operator,
                tag: RoleTag::Customer(token),
            },
        );

        info!(
            "💬 relay open: operator {} <-> customer {} (token {})",
            operator, customer, token
        );
        Ok(())
    }

    /// Route a payload from a sender to the other end of their session
    ///
    /// Fails with `NoSession` if the sender has no open session, which the
    /// boundary layer uses to fall through to its other handling.
    pub async fn route(&self, sender: PartyId, payload: RelayPayload) -> Result<RoutedMessage> {
        let links = self.links.lock().await;
        match links.get(&sender) {
            Some(link) => Ok(RoutedMessage {
                recipient: link.peer,
                tag: link.tag,
                payload,
            }),
            None => Err(DispatchError::NoSession(sender)),
        }
    }

    /// Close the session containing a party, if any
    ///
    /// Removes both directions together. Idempotent; returns whether a
    /// session was actually closed.
    pub async fn close(&self, party: PartyId) -> bool {
        let mut links = self.links.lock().await;
        if let Some(link) = links.remove(&party) {
            links.remove(&link.peer);
            info!("📴 relay closed: {} <-> {}", party, link.peer);
            true
        } else {
            debug!("📴 close for {} ignored, no open session", party);
            false
        }
    }

    /// The other end of a party's session, if one is open
    pub async fn peer_of(&self, party: PartyId) -> Option<PartyId> {
        self.links.lock().await.get(&party).map(|link| link.peer)
    }

    /// Number of open sessions
    pub async fn active_sessions(&self) -> usize {
        self.links.lock().await.len() / 2
    }
}

impl Default for SessionRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPERATOR: PartyId = PartyId(1001);
    const CUSTOMER: PartyId = PartyId(5000);
    const TOKEN: OrderToken = OrderToken(3);

    #[tokio::test]
    async fn routes_symmetrically_with_role_tags() {
        let router = SessionRouter::new();
        router.open(OPERATOR, CUSTOMER, TOKEN).await.unwrap();

        let from_customer = router
            .route(CUSTOMER, RelayPayload::Text("hi".into()))
            .await
            .unwrap();
        assert_eq!(from_customer.recipient, OPERATOR);
        assert_eq!(from_customer.tag, RoleTag::Customer(TOKEN));

        let from_operator = router
            .route(
                OPERATOR,
                RelayPayload::Media {
                    media: MediaRef::from("file-7"),
                    caption: Some("receipt".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(from_operator.recipient, CUSTOMER);
        assert_eq!(from_operator.tag, RoleTag::Operator);
    }

    #[tokio::test]
    async fn open_rejects_parties_already_in_a_session() {
        let router = SessionRouter::new();
        router.open(OPERATOR, CUSTOMER, TOKEN).await.unwrap();

        // Same operator, different customer.
        let err = router.open(OPERATOR, PartyId(5001), OrderToken(4)).await;
        assert!(matches!(err, Err(DispatchError::Conflict(_))));

        // Different operator, same customer.
        let err = router.open(PartyId(1002), CUSTOMER, OrderToken(5)).await;
        assert!(matches!(err, Err(DispatchError::Conflict(_))));

        // The original session is untouched.
        assert_eq!(router.peer_of(CUSTOMER).await, Some(OPERATOR));
        assert_eq!(router.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn close_removes_both_directions_and_is_idempotent() {
        let router = SessionRouter::new();
        router.open(OPERATOR, CUSTOMER, TOKEN).await.unwrap();

        assert!(router.close(CUSTOMER).await);
        assert!(!router.close(CUSTOMER).await);
        assert!(!router.close(OPERATOR).await);

        for party in [OPERATOR, CUSTOMER] {
            let err = router.route(party, RelayPayload::Text("hello?".into())).await;
            assert!(matches!(err, Err(DispatchError::NoSession(_))));
        }
        assert_eq!(router.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn parties_can_pair_again_after_close() {
        let router = SessionRouter::new();
        router.open(OPERATOR, CUSTOMER, TOKEN).await.unwrap();
        router.close(OPERATOR).await;

        router.open(OPERATOR, PartyId(5001), OrderToken(4)).await.unwrap();
        assert_eq!(router.peer_of(OPERATOR).await, Some(PartyId(5001)));
    }
}
