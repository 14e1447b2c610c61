//! Order lifecycle: submission, transitions, escalation timers
//!
//! All transitions run under the order's store entry guard, so a timer fire
//! and a concurrent human action on the same token serialize; the per-order
//! generation counter then tells a stale timer that the order moved on
//! without it. Outbound deliveries are spawned fire-and-forget and can never
//! stall or roll back a transition.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{DispatchError, Result};
use crate::notifier::RoleTag;
use crate::operator::types::PartyId;
use crate::order::types::{Order, OrderDetails, OrderStatus, OrderToken};

use super::core::DispatchEngine;

/// Returned by [`DispatchEngine::complete`] so the boundary layer can relay
/// the final payload (e.g. a tracking reference) to the customer.
#[derive(Debug, Clone)]
pub struct CompletionSummary {
    /// Token of the completed order
    pub token: OrderToken,

    /// The customer who placed it
    pub customer: PartyId,

    /// The operator who fulfilled it
    pub operator: PartyId,

    /// Intake details, for any final message the boundary wants to build
    pub details: OrderDetails,
}

impl DispatchEngine {
    /// Submit a completed intake as a new order
    ///
    /// Snapshots the online operators, picks the starting candidate from the
    /// process-wide rotation, stores the order under a fresh token, arms the
    /// escalation timer, and emits the order card to the assigned operator.
    ///
    /// Fails with `NoOperatorsOnline` when the snapshot is empty and
    /// `AtCapacity` when too many orders are in flight; both checks run
    /// before a token is allocated, so a failed submission leaves no gap in
    /// the token sequence. On failure the caller notifies the customer and
    /// discards its intake state.
    pub async fn submit_order(
        &self,
        customer: PartyId,
        details: OrderDetails,
    ) -> Result<OrderToken> {
        let candidates = self.operators.read().await.online_operators();
        if candidates.is_empty() {
            warn!(
                "❌ order from customer {} rejected: no operators online",
                customer
            );
            return Err(DispatchError::NoOperatorsOnline);
        }

        let in_flight = self.orders.len();
        if in_flight >= self.config.general.max_open_orders {
            warn!(
                "❌ order from customer {} rejected: {} orders already in flight",
                customer, in_flight
            );
            return Err(DispatchError::AtCapacity(in_flight));
        }

        let token = self.tokens.next();
        let cursor = self.rotation.fetch_add(1, Ordering::Relaxed) % candidates.len();

        let order = Order {
            token,
            status: OrderStatus::Pending,
            customer,
            details,
            candidates,
            cursor,
            generation: 0,
            created_at: Utc::now(),
        };

        info!(
            "📦 order {} from customer {} assigned to operator {} ({} candidates)",
            token,
            customer,
            order.assigned_operator(),
            order.candidates.len()
        );

        // Store before emitting the card: on a multi-threaded runtime the
        // operator's reaction must never race an order that is not there yet.
        self.orders.insert(order.clone());
        self.notify_assignment(&order);
        self.schedule_escalation(token, 0);
        self.totals.write().await.submitted += 1;

        Ok(token)
    }

    /// Bounce a pending order to the next candidate
    ///
    /// Any operator may bounce a pending order; ownership is only enforced on
    /// accept and complete. Advances the cursor by exactly one (wrapping),
    /// re-emits the order card to the new assignee, and re-arms the
    /// escalation timer from now. There is no reassignment cap: an order
    /// cycles through its candidate snapshot, revisiting operators, until
    /// someone accepts.
    ///
    /// Fails with `OrderGone` if the token is unknown or no longer pending.
    pub async fn reject(&self, token: OrderToken, acting: PartyId) -> Result<()> {
        let order = self
            .orders
            .update(token, |order| {
                if order.status != OrderStatus::Pending {
                    return Err(DispatchError::OrderGone(token));
                }
                order.advance_cursor();
                Ok(order.clone())
            })
            .unwrap_or(Err(DispatchError::OrderGone(token)))?;

        info!(
            "↩️ order {} bounced by operator {}, reassigned to operator {}",
            token,
            acting,
            order.assigned_operator()
        );

        self.totals.write().await.rejected += 1;
        self.notify_assignment(&order);
        self.schedule_escalation(token, order.generation);
        Ok(())
    }

    /// Accept a pending order
    ///
    /// Only the currently assigned operator may accept. On success the order
    /// becomes accepted, the outstanding escalation timer is invalidated, a
    /// relay session opens between operator and customer, and the customer is
    /// notified.
    ///
    /// Fails with `OrderGone` if the token is unknown or not pending,
    /// `NotAssigned` if the actor is not the assigned operator, and
    /// `Conflict` if either party already has an open session. Every failure
    /// leaves the order and the session map untouched.
    pub async fn accept(&self, token: OrderToken, acting: PartyId) -> Result<()> {
        let snapshot = self
            .orders
            .get(token)
            .ok_or(DispatchError::OrderGone(token))?;
        if snapshot.status != OrderStatus::Pending {
            return Err(DispatchError::OrderGone(token));
        }
        if snapshot.assigned_operator() != acting {
            return Err(DispatchError::NotAssigned(token, acting));
        }

        // Open the tunnel first: a Conflict must abort with no state change,
        // and an accepted order without a session would violate that.
        self.sessions.open(acting, snapshot.customer, token).await?;

        // Commit under the entry guard, re-checking that nothing (a timer
        // fire, a concurrent bounce) moved the order since the snapshot.
        let committed = self
            .orders
            .update(token, |order| {
                if order.status == OrderStatus::Pending
                    && order.generation == snapshot.generation
                    && order.assigned_operator() == acting
                {
                    order.status = OrderStatus::Accepted;
                    order.generation += 1;
                    true
                } else {
                    false
                }
            })
            .unwrap_or(false);

        if !committed {
            // Lost the race; undo the tunnel and report what the order
            // looks like now.
            self.sessions.close(acting).await;
            return match self.orders.get(token) {
                Some(order) if order.status == OrderStatus::Pending => {
                    Err(DispatchError::NotAssigned(token, acting))
                }
                _ => Err(DispatchError::OrderGone(token)),
            };
        }

        info!(
            "✅ order {} accepted by operator {}, relay open with customer {}",
            token, acting, snapshot.customer
        );

        let notifier = Arc::clone(&self.notifier);
        let customer = snapshot.customer;
        tokio::spawn(async move {
            let text = "Your order has been accepted. You can now chat with the operator."
                .to_string();
            if let Err(e) = notifier.send_text(customer, text, RoleTag::System).await {
                warn!(
                    "⚠️ acceptance notice for order {} to customer {} failed: {:#}",
                    token, customer, e
                );
            }
        });

        Ok(())
    }

    /// Complete an accepted order
    ///
    /// Only the operator who accepted may complete. The order is removed from
    /// the store (terminal, no further transitions), the relay session is
    /// torn down, and a summary is returned so the boundary layer can relay
    /// the final payload to the customer.
    pub async fn complete(&self, token: OrderToken, acting: PartyId) -> Result<CompletionSummary> {
        let mut order = self.orders.try_remove(token, |order| {
            if order.assigned_operator() != acting {
                return Err(DispatchError::NotAssigned(token, acting));
            }
            if order.status != OrderStatus::Accepted {
                return Err(DispatchError::OrderGone(token));
            }
            Ok(())
        })?;

        order.status = OrderStatus::Completed;
        order.generation += 1;

        // Close by the customer's id: the customer's session, if still open,
        // is necessarily with this order's operator, while the operator may
        // have already moved on to another chat.
        self.sessions.close(order.customer).await;
        self.totals.write().await.completed += 1;

        info!(
            "🏁 order {} completed by operator {}, relay closed",
            token, acting
        );

        Ok(CompletionSummary {
            token,
            customer: order.customer,
            operator: acting,
            details: order.details,
        })
    }

    /// Arm a one-shot escalation timer for (token, generation)
    ///
    /// The timer holds its own engine handle; on fire it checks that the
    /// order still exists, is still pending, and is still at the generation
    /// it was armed for, and otherwise discards itself.
    pub(super) fn schedule_escalation(&self, token: OrderToken, generation: u64) {
        let engine = self.clone();
        let delay = self.config.escalation.acceptance_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.on_escalation_timer(token, generation).await;
        });
    }

    /// Timer-fired reassignment, identical in effect to a bounce
    async fn on_escalation_timer(&self, token: OrderToken, generation: u64) {
        let escalated = self
            .orders
            .update(token, |order| {
                if order.status != OrderStatus::Pending || order.generation != generation {
                    return None;
                }
                order.advance_cursor();
                Some(order.clone())
            })
            .flatten();

        match escalated {
            Some(order) => {
                warn!(
                    "⏰ order {} not accepted within {:?}, reassigned to operator {}",
                    token,
                    self.config.escalation.acceptance_timeout,
                    order.assigned_operator()
                );
                self.totals.write().await.escalated += 1;
                self.notify_assignment(&order);
                self.schedule_escalation(token, order.generation);
            }
            None => {
                debug!(
                    "⏰ stale escalation timer for order {} (generation {}) discarded",
                    token, generation
                );
            }
        }
    }

    /// Deliver the order card to the currently assigned operator
    ///
    /// Fire-and-forget: a failed delivery is logged and nothing else. An
    /// operator who went offline after the candidate snapshot was taken still
    /// gets cycled to; their delivery simply fails here.
    pub(super) fn notify_assignment(&self, order: &Order) {
        let operator = order.assigned_operator();
        let token = order.token;
        let media = order.details.image.clone();
        let caption = assignment_card(order);

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier
                .send_media(operator, media, Some(caption), RoleTag::System)
                .await
            {
                warn!(
                    "⚠️ order {} card delivery to operator {} failed: {:#}",
                    token, operator, e
                );
            }
        });
    }
}

/// Plain-text order card shown to the assigned operator
fn assignment_card(order: &Order) -> String {
    let d = &order.details;
    let mut card = format!(
        "NEW ORDER\n{}\nToken: {}\nAddress: {}\nTotal: {:.2}\nPayment: {}",
        d.customer_name,
        order.token,
        d.address,
        d.final_price,
        d.payment.to_string().to_uppercase(),
    );
    if let Some(reference) = &d.payment_ref {
        card.push_str(&format!("\nPayment ref: {}", reference));
    }
    card
}
