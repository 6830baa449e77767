//! Multi-agent routing integration tests
//!
//! Exercises the hub the way concurrent agents do: parallel senders,
//! mailbox draining, correlation across tasks.

use std::sync::Arc;

use concord_core::config::HubConfig;
use concord_events::{CoordEvent, EventBus};
use concord_hub::{
    Agent, AgentRegistry, CommunicationHub, HubError, MessageContent, MessageDraft, MessageType,
    Priority,
};
use serde_json::json;

fn hub_with(names: &[&str]) -> Arc<CommunicationHub> {
    let registry = Arc::new(AgentRegistry::new());
    for name in names {
        registry.register(Agent::new(*name));
    }
    let hub = Arc::new(CommunicationHub::new(
        registry,
        EventBus::new(256),
        HubConfig::default(),
    ));
    hub.initialize().unwrap();
    hub
}

#[tokio::test]
async fn two_agents_request_and_respond() {
    let hub = hub_with(&["infra", "quality"]);
    let mut infra_rx = hub.take_mailbox("infra").unwrap();
    let mut quality_rx = hub.take_mailbox("quality").unwrap();

    let request_id = hub
        .send_message(
            MessageDraft::request(
                "infra",
                "quality",
                MessageContent::new("perf").with_data(json!({"p99_ms": 230})),
            )
            .with_priority(Priority::High),
        )
        .unwrap();

    // Responder drains its mailbox and answers
    let request = quality_rx.recv().await.unwrap();
    assert_eq!(request.msg_type, MessageType::Request);
    assert_eq!(request.priority, Priority::High);

    hub.send_message(MessageDraft::response(
        "quality",
        "infra",
        MessageContent::new("re: perf").with_data(json!({"verdict": "regression"})),
        request.id.as_str(),
    ))
    .unwrap();

    let response = infra_rx.recv().await.unwrap();
    assert_eq!(response.msg_type, MessageType::Response);
    assert_eq!(response.correlation_id.as_deref(), Some(request_id.as_str()));
    assert_eq!(response.content.data["verdict"], "regression");
}

#[tokio::test]
async fn concurrent_senders_keep_per_pair_order() {
    let hub = hub_with(&["infra", "quality", "ux", "security"]);
    let mut rx = hub.take_mailbox("security").unwrap();

    let mut handles = Vec::new();
    for sender in ["infra", "quality", "ux"] {
        let hub = Arc::clone(&hub);
        handles.push(tokio::spawn(async move {
            for i in 0..20 {
                hub.send_message(MessageDraft::notification(
                    sender,
                    "security",
                    MessageContent::new(format!("{sender}-{i}")),
                ))
                .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Interleaving across senders is arbitrary; per-sender order is not.
    let mut last_seen = std::collections::HashMap::new();
    for _ in 0..60 {
        let msg = rx.recv().await.unwrap();
        let (sender, seq) = msg.content.subject.rsplit_once('-').unwrap();
        let seq: usize = seq.parse().unwrap();
        if let Some(prev) = last_seen.insert(sender.to_string(), seq) {
            assert!(seq > prev, "out of order for {sender}: {prev} then {seq}");
        }
    }
}

#[tokio::test]
async fn deregistered_agent_fails_new_sends_keeps_history() {
    let hub = hub_with(&["infra", "quality"]);

    let id = hub
        .send_message(MessageDraft::notification(
            "infra",
            "quality",
            MessageContent::new("before"),
        ))
        .unwrap();

    hub.registry().deregister("quality");

    let err = hub
        .send_message(MessageDraft::notification(
            "infra",
            "quality",
            MessageContent::new("after"),
        ))
        .unwrap_err();
    assert!(matches!(err, HubError::UnknownAgent(name) if name == "quality"));

    // History survives the deregistration
    assert!(hub.message(&id).is_some());
    assert_eq!(hub.history_for("infra", "quality").len(), 1);
}

#[tokio::test]
async fn events_announce_sends_and_failures() {
    let hub = hub_with(&["infra", "quality"]);
    let mut events = hub.events().subscribe();

    let id = hub
        .send_message(MessageDraft::broadcast(
            "infra",
            vec!["quality".to_string(), "ghost".to_string()],
            MessageContent::new("rollout"),
        ))
        .unwrap();

    let mut saw_sent = false;
    let mut saw_failure = false;
    for _ in 0..2 {
        match events.recv().await.unwrap() {
            CoordEvent::MessageSent { message_id, .. } => {
                assert_eq!(message_id, id);
                saw_sent = true;
            }
            CoordEvent::DeliveryFailed { recipient, .. } => {
                assert_eq!(recipient, "ghost");
                saw_failure = true;
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert!(saw_sent && saw_failure);
}

#[tokio::test]
async fn late_mailbox_claim_sees_backlog() {
    let hub = hub_with(&["infra", "quality"]);

    for i in 0..3 {
        hub.send_message(MessageDraft::notification(
            "infra",
            "quality",
            MessageContent::new(format!("queued-{i}")),
        ))
        .unwrap();
    }

    // Claimed after the sends: backlog is waiting in the channel
    let mut rx = hub.take_mailbox("quality").unwrap();
    for i in 0..3 {
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.content.subject, format!("queued-{i}"));
    }

    // Second claim yields nothing
    assert!(hub.take_mailbox("quality").is_none());
}
