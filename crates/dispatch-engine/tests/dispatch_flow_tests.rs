//! End-to-end tests for the dispatch lifecycle
//!
//! These drive the public engine API the way the platform shell would:
//! submission, bounce, accept, relay, complete, and the error paths around
//! them. Escalation timing is covered separately in `escalation_tests.rs`.

use std::sync::{Arc, Mutex};

use tiffin_dispatch_engine::prelude::*;

const MAIN: PartyId = PartyId(990001);
const OP_A: PartyId = PartyId(1001);
const OP_B: PartyId = PartyId(1002);
const CUSTOMER: PartyId = PartyId(5000);

/// One recorded outbound delivery
#[derive(Debug, Clone, PartialEq)]
enum Delivery {
    Text {
        to: PartyId,
        text: String,
        tag: RoleTag,
    },
    Media {
        to: PartyId,
        caption: Option<String>,
        tag: RoleTag,
    },
}

/// Notifier that records every delivery for assertions
#[derive(Default)]
struct RecordingNotifier {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingNotifier {
    fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    fn media_count_to(&self, to: PartyId) -> usize {
        self.deliveries()
            .iter()
            .filter(|d| matches!(d, Delivery::Media { to: t, .. } if *t == to))
            .count()
    }

    fn texts_to(&self, to: PartyId) -> Vec<String> {
        self.deliveries()
            .iter()
            .filter_map(|d| match d {
                Delivery::Text { to: t, text, .. } if *t == to => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, to: PartyId, text: String, tag: RoleTag) -> anyhow::Result<()> {
        self.deliveries
            .lock()
            .unwrap()
            .push(Delivery::Text { to, text, tag });
        Ok(())
    }

    async fn send_media(
        &self,
        to: PartyId,
        _media: MediaRef,
        caption: Option<String>,
        tag: RoleTag,
    ) -> anyhow::Result<()> {
        self.deliveries
            .lock()
            .unwrap()
            .push(Delivery::Media { to, caption, tag });
        Ok(())
    }
}

fn details() -> OrderDetails {
    OrderDetails {
        customer_name: "Asha".to_string(),
        address: "12 MG Road".to_string(),
        image: MediaRef::from("file-abc"),
        final_price: 174.0,
        payment: PaymentMode::Cod,
        payment_ref: None,
    }
}

/// Build an engine with the given admins registered and online
async fn engine_with_online(
    ops: &[PartyId],
) -> (Arc<DispatchEngine>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut config = DispatchConfig::default();
    config.general.main_operator = MAIN;

    let engine = DispatchEngine::new(config, notifier.clone()).unwrap();
    {
        let mut roster = engine.operators().write().await;
        for &op in ops {
            roster.register(op, OperatorRole::Admin).unwrap();
            roster.set_status(op, OperatorStatus::Online).unwrap();
        }
    }
    (engine, notifier)
}

/// Let fire-and-forget delivery tasks run to completion
async fn settle() {
    for _ in 0..25 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn round_robin_assigns_in_registration_order() {
    let (engine, _) = engine_with_online(&[OP_A, OP_B]).await;

    let mut assigned = Vec::new();
    for i in 0..4 {
        let token = engine
            .submit_order(PartyId(5000 + i), details())
            .await
            .unwrap();
        assigned.push(engine.order(token).unwrap().assigned_operator());
    }

    assert_eq!(assigned, vec![OP_A, OP_B, OP_A, OP_B]);
}

#[tokio::test]
async fn no_operators_online_consumes_no_token() {
    let (engine, _) = engine_with_online(&[]).await;

    let err = engine.submit_order(CUSTOMER, details()).await;
    assert!(matches!(err, Err(DispatchError::NoOperatorsOnline)));

    let stats = engine.stats().await;
    assert_eq!(stats.pending_orders, 0);
    assert_eq!(stats.totals.submitted, 0);

    // The failed submission left no gap: the first real order gets token 1.
    {
        let mut roster = engine.operators().write().await;
        roster.register(OP_A, OperatorRole::Admin).unwrap();
        roster.set_status(OP_A, OperatorStatus::Online).unwrap();
    }
    let token = engine.submit_order(CUSTOMER, details()).await.unwrap();
    assert_eq!(token, OrderToken(1));
}

#[tokio::test]
async fn reject_advances_by_one_and_wraps() {
    let (engine, notifier) = engine_with_online(&[OP_A, OP_B]).await;

    let token = engine.submit_order(CUSTOMER, details()).await.unwrap();
    assert_eq!(engine.order(token).unwrap().assigned_operator(), OP_A);

    engine.reject(token, OP_A).await.unwrap();
    assert_eq!(engine.order(token).unwrap().assigned_operator(), OP_B);

    // Wrapping: the same operator can be revisited.
    engine.reject(token, OP_B).await.unwrap();
    let order = engine.order(token).unwrap();
    assert_eq!(order.assigned_operator(), OP_A);
    assert_eq!(order.cursor, 0);
    assert_eq!(order.status, OrderStatus::Pending);

    settle().await;
    // One card per assignment: two to A (initial + wrap), one to B.
    assert_eq!(notifier.media_count_to(OP_A), 2);
    assert_eq!(notifier.media_count_to(OP_B), 1);
    assert_eq!(engine.stats().await.totals.rejected, 2);
}

#[tokio::test]
async fn accept_by_non_assigned_operator_changes_nothing() {
    let (engine, _) = engine_with_online(&[OP_A, OP_B]).await;

    let token = engine.submit_order(CUSTOMER, details()).await.unwrap();
    let before = engine.order(token).unwrap();

    let err = engine.accept(token, OP_B).await;
    assert!(matches!(err, Err(DispatchError::NotAssigned(t, op)) if t == token && op == OP_B));

    let after = engine.order(token).unwrap();
    assert_eq!(after.status, OrderStatus::Pending);
    assert_eq!(after.cursor, before.cursor);
    assert_eq!(after.generation, before.generation);

    // No session was opened for anyone.
    let err = engine.relay(CUSTOMER, RelayPayload::Text("hello?".into())).await;
    assert!(matches!(err, Err(DispatchError::NoSession(_))));
}

#[tokio::test]
async fn accept_opens_relay_and_routes_both_ways() {
    let (engine, notifier) = engine_with_online(&[OP_A]).await;

    let token = engine.submit_order(CUSTOMER, details()).await.unwrap();
    engine.accept(token, OP_A).await.unwrap();

    engine
        .relay(CUSTOMER, RelayPayload::Text("extra chutney please".into()))
        .await
        .unwrap();
    engine
        .relay(
            OP_A,
            RelayPayload::Media {
                media: MediaRef::from("file-receipt"),
                caption: Some("your bill".into()),
            },
        )
        .await
        .unwrap();
    settle().await;

    let deliveries = notifier.deliveries();
    assert!(deliveries.contains(&Delivery::Text {
        to: OP_A,
        text: "extra chutney please".to_string(),
        tag: RoleTag::Customer(token),
    }));
    assert!(deliveries.contains(&Delivery::Media {
        to: CUSTOMER,
        caption: Some("your bill".to_string()),
        tag: RoleTag::Operator,
    }));

    // The customer also got the acceptance notice.
    assert!(notifier
        .texts_to(CUSTOMER)
        .iter()
        .any(|t| t.contains("accepted")));

    let stats = engine.stats().await;
    assert_eq!(stats.open_sessions, 1);
    assert_eq!(stats.accepted_orders, 1);
    assert_eq!(stats.pending_orders, 0);
}

#[tokio::test]
async fn full_lifecycle_reject_accept_complete() {
    let (engine, _) = engine_with_online(&[OP_A, OP_B]).await;

    let token = engine.submit_order(CUSTOMER, details()).await.unwrap();
    assert_eq!(engine.order(token).unwrap().assigned_operator(), OP_A);

    engine.reject(token, OP_A).await.unwrap();
    assert_eq!(engine.order(token).unwrap().assigned_operator(), OP_B);

    engine.accept(token, OP_B).await.unwrap();
    assert_eq!(engine.sessions().peer_of(CUSTOMER).await, Some(OP_B));

    // Completion is owner-only.
    let err = engine.complete(token, OP_A).await;
    assert!(matches!(err, Err(DispatchError::NotAssigned(_, _))));

    let summary = engine.complete(token, OP_B).await.unwrap();
    assert_eq!(summary.token, token);
    assert_eq!(summary.customer, CUSTOMER);
    assert_eq!(summary.operator, OP_B);
    assert_eq!(summary.details.address, "12 MG Road");

    // Terminal: the order is gone and the relay is down.
    assert!(engine.order(token).is_none());
    for party in [CUSTOMER, OP_B] {
        let err = engine.relay(party, RelayPayload::Text("anyone?".into())).await;
        assert!(matches!(err, Err(DispatchError::NoSession(_))));
    }
    assert!(matches!(
        engine.accept(token, OP_B).await,
        Err(DispatchError::OrderGone(_))
    ));
    assert!(matches!(
        engine.reject(token, OP_B).await,
        Err(DispatchError::OrderGone(_))
    ));

    let stats = engine.stats().await;
    assert_eq!(stats.totals.completed, 1);
    assert_eq!(stats.open_sessions, 0);
    assert_eq!(stats.pending_orders + stats.accepted_orders, 0);
}

#[tokio::test]
async fn accept_twice_reports_order_gone() {
    let (engine, _) = engine_with_online(&[OP_A]).await;

    let token = engine.submit_order(CUSTOMER, details()).await.unwrap();
    engine.accept(token, OP_A).await.unwrap();

    assert!(matches!(
        engine.accept(token, OP_A).await,
        Err(DispatchError::OrderGone(_))
    ));
}

#[tokio::test]
async fn operator_in_a_session_cannot_accept_a_second_order() {
    let (engine, _) = engine_with_online(&[OP_A]).await;

    let first = engine.submit_order(CUSTOMER, details()).await.unwrap();
    engine.accept(first, OP_A).await.unwrap();

    let second = engine.submit_order(PartyId(5001), details()).await.unwrap();
    let err = engine.accept(second, OP_A).await;
    assert!(matches!(err, Err(DispatchError::Conflict(_))));

    // The conflicting accept left the second order pending and assignable.
    let order = engine.order(second).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.assigned_operator(), OP_A);
}

#[tokio::test]
async fn closing_the_chat_keeps_the_order_accepted() {
    let (engine, _) = engine_with_online(&[OP_A]).await;

    let token = engine.submit_order(CUSTOMER, details()).await.unwrap();
    engine.accept(token, OP_A).await.unwrap();

    assert!(engine.close_session(OP_A).await);
    assert!(!engine.close_session(OP_A).await);

    let err = engine.relay(CUSTOMER, RelayPayload::Text("hello?".into())).await;
    assert!(matches!(err, Err(DispatchError::NoSession(_))));

    // The order survives the chat and can still be completed.
    assert_eq!(engine.order(token).unwrap().status, OrderStatus::Accepted);
    assert!(engine.complete(token, OP_A).await.is_ok());
}

#[tokio::test]
async fn submissions_beyond_capacity_are_rejected() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut config = DispatchConfig::default();
    config.general.main_operator = MAIN;
    config.general.max_open_orders = 1;

    let engine = DispatchEngine::new(config, notifier).unwrap();
    {
        let mut roster = engine.operators().write().await;
        roster.register(OP_A, OperatorRole::Admin).unwrap();
        roster.set_status(OP_A, OperatorStatus::Online).unwrap();
    }

    let token = engine.submit_order(CUSTOMER, details()).await.unwrap();
    assert!(matches!(
        engine.submit_order(PartyId(5001), details()).await,
        Err(DispatchError::AtCapacity(1))
    ));

    // Completing frees the slot.
    engine.accept(token, OP_A).await.unwrap();
    engine.complete(token, OP_A).await.unwrap();
    assert!(engine.submit_order(PartyId(5001), details()).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_get_distinct_increasing_tokens() {
    let (engine, _) = engine_with_online(&[OP_A, OP_B]).await;

    let mut handles = Vec::new();
    for i in 0..24 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .submit_order(PartyId(6000 + i), details())
                .await
                .unwrap()
        }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap().0);
    }
    tokens.sort_unstable();

    // Pairwise distinct and gap-free from 1.
    assert_eq!(tokens, (1..=24).collect::<Vec<u64>>());
}
