//! Message relay through an open session

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::operator::types::PartyId;
use crate::session::router::{RelayPayload, RoutedMessage};

use super::core::DispatchEngine;

impl DispatchEngine {
    /// Forward a message from one end of an open session to the other
    ///
    /// Routes through the session map and hands the labeled payload to the
    /// notifier as a fire-and-forget delivery. Fails with `NoSession` when
    /// the sender has no open session, which the boundary layer uses to fall
    /// through to its other handling (intake flows, operator commands);
    /// nothing is delivered in that case.
    pub async fn relay(&self, sender: PartyId, payload: RelayPayload) -> Result<()> {
        let RoutedMessage {
            recipient,
            tag,
            payload,
        } = self.sessions.route(sender, payload).await?;

        debug!("💬 relaying [{}] message from {} to {}", tag, sender, recipient);

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let result = match payload {
                RelayPayload::Text(text) => notifier.send_text(recipient, text, tag).await,
                RelayPayload::Media { media, caption } => {
                    notifier.send_media(recipient, media, caption, tag).await
                }
            };
            if let Err(e) = result {
                warn!("⚠️ relay delivery to {} failed: {:#}", recipient, e);
            }
        });

        Ok(())
    }

    /// Tear down the session containing a party without completing the order
    ///
    /// The operator-side "close chat" action: the order stays accepted and
    /// can still be completed later. Idempotent; returns whether a session
    /// was actually closed.
    pub async fn close_session(&self, party: PartyId) -> bool {
        let closed = self.sessions.close(party).await;
        if closed {
            info!("📴 relay session closed on request of {}", party);
        }
        closed
    }
}
