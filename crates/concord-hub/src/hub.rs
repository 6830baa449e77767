//! The communication hub
//!
//! Validates and routes messages between registered agents. Sends return
//! synchronously after enqueue; consumption happens when the recipient
//! drains its mailbox. One unbounded channel per recipient preserves
//! sender→recipient order; there is no ordering guarantee across pairs.

use chrono::Utc;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

use concord_events::{CoordEvent, EventBus};

use crate::{
    AgentRegistry, Availability, CollabIngress, CollaborationRequest, DeliveryLog, DeliveryRecord,
    HubError, KnowledgeIngress, KnowledgeShare, Message, MessageDraft, MessageType, Recipient,
    Result,
};

use concord_core::config::HubConfig;

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;

/// A request awaiting its response
#[derive(Debug, Clone)]
struct PendingRequest {
    sender: String,
    recipients: Vec<String>,
}

/// Routes point-to-point and broadcast messages between agents
pub struct CommunicationHub {
    registry: Arc<AgentRegistry>,
    bus: EventBus,
    config: HubConfig,
    state: AtomicU8,

    /// Per-recipient mailbox senders
    mailboxes: DashMap<String, mpsc::UnboundedSender<Message>>,

    /// Mailbox receivers not yet claimed by their consumer
    parked: DashMap<String, mpsc::UnboundedReceiver<Message>>,

    /// Requests with `requires_response` that have not been answered
    pending: DashMap<String, PendingRequest>,

    /// Bounded audit history, oldest first
    history: Mutex<VecDeque<Message>>,

    deliveries: DeliveryLog,

    knowledge: RwLock<Option<Arc<dyn KnowledgeIngress>>>,
    collab: RwLock<Option<Arc<dyn CollabIngress>>>,
}

impl CommunicationHub {
    pub fn new(registry: Arc<AgentRegistry>, bus: EventBus, config: HubConfig) -> Self {
        let deliveries = DeliveryLog::new(config.delivery_log_cap);
        Self {
            registry,
            bus,
            config,
            state: AtomicU8::new(UNINITIALIZED),
            mailboxes: DashMap::new(),
            parked: DashMap::new(),
            pending: DashMap::new(),
            history: Mutex::new(VecDeque::new()),
            deliveries,
            knowledge: RwLock::new(None),
            collab: RwLock::new(None),
        }
    }

    /// Idempotent setup of routing state
    ///
    /// A repeat call after completion is a no-op success; only a second call
    /// racing an in-flight first call is rejected.
    pub fn initialize(&self) -> Result<()> {
        match self.state.compare_exchange(
            UNINITIALIZED,
            INITIALIZING,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                self.state.store(READY, Ordering::SeqCst);
                tracing::info!("Communication hub ready");
                Ok(())
            }
            Err(READY) => Ok(()),
            Err(_) => Err(HubError::AlreadyInitialized),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::SeqCst) == READY
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Wire the knowledge exchange in as the `share_knowledge` delegate
    pub fn wire_knowledge(&self, ingress: Arc<dyn KnowledgeIngress>) {
        *self.knowledge.write().expect("ingress lock poisoned") = Some(ingress);
    }

    /// Wire the collaboration engine in as the `request_collaboration` delegate
    pub fn wire_collab(&self, ingress: Arc<dyn CollabIngress>) {
        *self.collab.write().expect("ingress lock poisoned") = Some(ingress);
    }

    /// Validate, record, and enqueue a message; returns its id synchronously
    ///
    /// Delivery to the recipient is asynchronous: enqueue order per
    /// sender→recipient pair is consumption order. Fan-out failures are
    /// recorded per recipient in the delivery log and never abort the send.
    pub fn send_message(&self, draft: MessageDraft) -> Result<String> {
        self.ensure_ready()?;

        if !self.registry.exists(&draft.sender) {
            return Err(HubError::UnknownAgent(draft.sender.clone()));
        }

        let recipients = draft.recipient.names();
        if recipients.is_empty() {
            return Err(HubError::invalid("recipient group is empty"));
        }

        // Point-to-point sends validate the recipient up front; group
        // fan-out records unknown members individually instead.
        if let Recipient::Agent(name) = &draft.recipient {
            if !self.registry.exists(name) {
                return Err(HubError::UnknownAgent(name.clone()));
            }
        }

        match draft.msg_type {
            MessageType::Response => {
                if matches!(draft.recipient, Recipient::Group(_)) {
                    return Err(HubError::invalid("a response must target a single agent"));
                }
                let correlation = draft
                    .correlation_id
                    .as_deref()
                    .ok_or_else(|| HubError::invalid("a response requires a correlation id"))?;
                // Consume the pending entry last so failed validation above
                // leaves it intact for a later, well-formed response.
                if self.pending.remove(correlation).is_none() {
                    return Err(HubError::DanglingCorrelation(correlation.to_string()));
                }
            }
            _ => {
                if draft.correlation_id.is_some() {
                    return Err(HubError::invalid(
                        "correlation ids are only valid on responses",
                    ));
                }
            }
        }

        let message = Message::seal(draft);

        if message.requires_response {
            self.pending.insert(
                message.id.clone(),
                PendingRequest {
                    sender: message.sender.clone(),
                    recipients: recipients.clone(),
                },
            );
        }

        if let (MessageType::Response, Some(correlation)) =
            (message.msg_type, message.correlation_id.as_deref())
        {
            self.bus
                .emit(CoordEvent::response_matched(correlation, message.id.clone()));
        }

        self.push_history(message.clone());
        self.fan_out(&message, &recipients);

        self.bus.emit(CoordEvent::message_sent(
            message.id.clone(),
            message.sender.clone(),
            recipients,
            message.msg_type.as_str(),
        ));

        tracing::debug!(
            "Routed {} message {} from {}",
            message.msg_type.as_str(),
            message.id,
            message.sender
        );

        Ok(message.id)
    }

    /// Claim the mailbox receiver for an agent
    ///
    /// Messages sent before the claim are waiting in the channel. Returns
    /// `None` if the mailbox was already claimed.
    pub fn take_mailbox(&self, agent: &str) -> Option<mpsc::UnboundedReceiver<Message>> {
        self.mailbox_sender(agent);
        self.parked.remove(agent).map(|(_, rx)| rx)
    }

    /// Unified ingress: delegate a knowledge share to the exchange
    pub async fn share_knowledge(&self, share: KnowledgeShare) -> Result<String> {
        self.ensure_ready()?;
        let ingress = self
            .knowledge
            .read()
            .expect("ingress lock poisoned")
            .clone()
            .ok_or_else(|| HubError::not_ready("knowledge exchange"))?;
        ingress.ingest_knowledge(share).await
    }

    /// Unified ingress: delegate a collaboration proposal to the engine
    pub async fn request_collaboration(&self, request: CollaborationRequest) -> Result<String> {
        self.ensure_ready()?;
        let ingress = self
            .collab
            .read()
            .expect("ingress lock poisoned")
            .clone()
            .ok_or_else(|| HubError::not_ready("collaboration engine"))?;
        ingress.ingest_collaboration(request).await
    }

    /// Messages from `sender` to `recipient`, in send order
    pub fn history_for(&self, sender: &str, recipient: &str) -> Vec<Message> {
        self.history
            .lock()
            .expect("history lock poisoned")
            .iter()
            .filter(|m| m.sender == sender && m.recipient.contains(recipient))
            .cloned()
            .collect()
    }

    /// Look up one retained message by id
    pub fn message(&self, id: &str) -> Option<Message> {
        self.history
            .lock()
            .expect("history lock poisoned")
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    /// True while a `requires_response` request is unanswered
    pub fn is_awaiting_response(&self, message_id: &str) -> bool {
        self.pending.contains_key(message_id)
    }

    /// Unanswered request ids addressed to `agent`
    pub fn pending_requests_for(&self, agent: &str) -> Vec<String> {
        self.pending
            .iter()
            .filter(|e| e.value().recipients.iter().any(|r| r == agent))
            .map(|e| e.key().clone())
            .collect()
    }

    /// Sender of an unanswered request, if still pending
    pub fn pending_request_sender(&self, message_id: &str) -> Option<String> {
        self.pending.get(message_id).map(|p| p.sender.clone())
    }

    pub fn delivery_log(&self) -> &DeliveryLog {
        &self.deliveries
    }

    /// Drop retained messages older than the retention window
    pub fn prune_history(&self) -> usize {
        let cutoff = Utc::now() - chrono::Duration::seconds(self.config.retention_secs as i64);
        let mut history = self.history.lock().expect("history lock poisoned");
        let before = history.len();
        while history.front().is_some_and(|m| m.timestamp < cutoff) {
            history.pop_front();
        }
        before - history.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().expect("history lock poisoned").len()
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(HubError::not_ready("communication hub"))
        }
    }

    fn mailbox_sender(&self, agent: &str) -> mpsc::UnboundedSender<Message> {
        self.mailboxes
            .entry(agent.to_string())
            .or_insert_with(|| {
                let (tx, rx) = mpsc::unbounded_channel();
                self.parked.insert(agent.to_string(), rx);
                tx
            })
            .clone()
    }

    fn push_history(&self, message: Message) {
        let cutoff = Utc::now() - chrono::Duration::seconds(self.config.retention_secs as i64);
        let mut history = self.history.lock().expect("history lock poisoned");
        while history.front().is_some_and(|m| m.timestamp < cutoff) {
            history.pop_front();
        }
        if history.len() == self.config.history_cap {
            history.pop_front();
        }
        history.push_back(message);
    }

    fn fan_out(&self, message: &Message, recipients: &[String]) {
        let is_group = matches!(message.recipient, Recipient::Group(_));

        for name in recipients {
            let agent = match self.registry.get(name) {
                Some(agent) => agent,
                None => {
                    self.record_failure(message, name, "unknown agent");
                    continue;
                }
            };

            // Availability is advisory: broadcasts skip offline members,
            // a direct send still enqueues for later draining.
            if is_group && agent.availability == Availability::Offline {
                self.record_failure(message, name, "agent offline");
                continue;
            }

            match self.mailbox_sender(name).send(message.clone()) {
                Ok(()) => self
                    .deliveries
                    .record(DeliveryRecord::delivered(message.id.clone(), name.clone())),
                Err(_) => self.record_failure(message, name, "mailbox closed"),
            }
        }
    }

    fn record_failure(&self, message: &Message, recipient: &str, reason: &str) {
        tracing::warn!(
            "Delivery of {} to {} failed: {}",
            message.id,
            recipient,
            reason
        );
        self.deliveries.record(DeliveryRecord::failed(
            message.id.clone(),
            recipient,
            reason,
        ));
        self.bus.emit(CoordEvent::delivery_failed(
            message.id.clone(),
            recipient,
            reason,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Agent, MessageContent};
    use serde_json::json;

    fn ready_hub() -> CommunicationHub {
        let registry = Arc::new(AgentRegistry::new());
        registry.register(Agent::new("infra"));
        registry.register(Agent::new("quality"));
        registry.register(Agent::new("ux"));

        let hub = CommunicationHub::new(registry, EventBus::new(64), HubConfig::default());
        hub.initialize().unwrap();
        hub
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let registry = Arc::new(AgentRegistry::new());
        let hub = CommunicationHub::new(registry, EventBus::new(4), HubConfig::default());

        assert!(!hub.is_ready());
        hub.initialize().unwrap();
        hub.initialize().unwrap();
        assert!(hub.is_ready());
    }

    #[test]
    fn test_send_requires_ready() {
        let registry = Arc::new(AgentRegistry::new());
        registry.register(Agent::new("infra"));
        registry.register(Agent::new("quality"));
        let hub = CommunicationHub::new(registry, EventBus::new(4), HubConfig::default());

        let draft = MessageDraft::request("infra", "quality", MessageContent::new("perf"));
        assert!(matches!(
            hub.send_message(draft),
            Err(HubError::DependencyNotReady(_))
        ));
    }

    #[tokio::test]
    async fn test_send_and_receive() {
        let hub = ready_hub();
        let mut rx = hub.take_mailbox("quality").unwrap();

        let draft = MessageDraft::request(
            "infra",
            "quality",
            MessageContent::new("perf").with_data(json!({"subject": "perf"})),
        );
        let id = hub.send_message(draft).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, id);
        assert_eq!(received.sender, "infra");
        assert!(received.requires_response);
    }

    #[test]
    fn test_unknown_sender_and_recipient() {
        let hub = ready_hub();

        let draft = MessageDraft::notification("ghost", "quality", MessageContent::new("hi"));
        assert!(matches!(
            hub.send_message(draft),
            Err(HubError::UnknownAgent(name)) if name == "ghost"
        ));

        let draft = MessageDraft::notification("infra", "ghost", MessageContent::new("hi"));
        assert!(matches!(
            hub.send_message(draft),
            Err(HubError::UnknownAgent(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_response_correlation_lifecycle() {
        let hub = ready_hub();

        let request = MessageDraft::request("infra", "quality", MessageContent::new("perf"));
        let request_id = hub.send_message(request).unwrap();
        assert!(hub.is_awaiting_response(&request_id));

        let response = MessageDraft::response(
            "quality",
            "infra",
            MessageContent::new("re: perf"),
            request_id.as_str(),
        );
        hub.send_message(response).unwrap();
        assert!(!hub.is_awaiting_response(&request_id));

        // Second answer to the same request dangles
        let duplicate = MessageDraft::response(
            "quality",
            "infra",
            MessageContent::new("re: perf again"),
            request_id.as_str(),
        );
        assert!(matches!(
            hub.send_message(duplicate),
            Err(HubError::DanglingCorrelation(id)) if id == request_id
        ));
    }

    #[test]
    fn test_response_to_unknown_request_dangles() {
        let hub = ready_hub();

        let response =
            MessageDraft::response("quality", "infra", MessageContent::new("re: ?"), "no-such-id");
        assert!(matches!(
            hub.send_message(response),
            Err(HubError::DanglingCorrelation(_))
        ));
    }

    #[test]
    fn test_response_without_correlation_is_invalid() {
        let hub = ready_hub();

        let mut draft = MessageDraft::response("quality", "infra", MessageContent::new("re"), "x");
        draft.correlation_id = None;
        assert!(matches!(
            hub.send_message(draft),
            Err(HubError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_correlation_on_non_response_is_invalid() {
        let hub = ready_hub();

        let mut draft = MessageDraft::notification("infra", "quality", MessageContent::new("hi"));
        draft.correlation_id = Some("m-1".to_string());
        assert!(matches!(
            hub.send_message(draft),
            Err(HubError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_failed_response_keeps_request_pending() {
        let hub = ready_hub();

        let request_id = hub
            .send_message(MessageDraft::request(
                "infra",
                "quality",
                MessageContent::new("perf"),
            ))
            .unwrap();

        // Unknown responder fails before the pending entry is consumed
        let bad = MessageDraft::response(
            "ghost",
            "infra",
            MessageContent::new("re"),
            request_id.as_str(),
        );
        assert!(hub.send_message(bad).is_err());
        assert!(hub.is_awaiting_response(&request_id));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        let hub = ready_hub();
        let mut quality_rx = hub.take_mailbox("quality").unwrap();

        let draft = MessageDraft::broadcast(
            "infra",
            vec!["quality".to_string(), "ghost".to_string()],
            MessageContent::new("rollout"),
        );
        let id = hub.send_message(draft).unwrap();

        // Live recipient still got it
        assert_eq!(quality_rx.recv().await.unwrap().id, id);

        let outcomes = hub.delivery_log().for_message(&id);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes.iter().filter(|r| r.is_failure()).count(), 1);
        assert_eq!(outcomes.iter().find(|r| r.is_failure()).unwrap().recipient, "ghost");
    }

    #[tokio::test]
    async fn test_broadcast_skips_offline() {
        let hub = ready_hub();
        hub.registry().set_availability("ux", Availability::Offline);

        let draft = MessageDraft::broadcast(
            "infra",
            vec!["quality".to_string(), "ux".to_string()],
            MessageContent::new("standup"),
        );
        let id = hub.send_message(draft).unwrap();

        let failures: Vec<_> = hub
            .delivery_log()
            .for_message(&id)
            .into_iter()
            .filter(|r| r.is_failure())
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].recipient, "ux");
        assert_eq!(failures[0].reason.as_deref(), Some("agent offline"));
    }

    #[test]
    fn test_empty_group_is_invalid() {
        let hub = ready_hub();
        let draft = MessageDraft::broadcast("infra", vec![], MessageContent::new("void"));
        assert!(matches!(
            hub.send_message(draft),
            Err(HubError::InvalidMessage(_))
        ));
    }

    #[tokio::test]
    async fn test_per_pair_ordering() {
        let hub = ready_hub();
        let mut rx = hub.take_mailbox("quality").unwrap();

        let mut sent = Vec::new();
        for i in 0..5 {
            let draft = MessageDraft::notification(
                "infra",
                "quality",
                MessageContent::new(format!("msg-{i}")),
            );
            sent.push(hub.send_message(draft).unwrap());
        }

        for expected in &sent {
            assert_eq!(&rx.recv().await.unwrap().id, expected);
        }

        // History reflects the same order
        let history = hub.history_for("infra", "quality");
        let ids: Vec<_> = history.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, sent);
    }

    #[test]
    fn test_history_cap() {
        let registry = Arc::new(AgentRegistry::new());
        registry.register(Agent::new("infra"));
        registry.register(Agent::new("quality"));

        let config = HubConfig {
            history_cap: 3,
            ..HubConfig::default()
        };
        let hub = CommunicationHub::new(registry, EventBus::new(16), config);
        hub.initialize().unwrap();

        for i in 0..5 {
            hub.send_message(MessageDraft::notification(
                "infra",
                "quality",
                MessageContent::new(format!("n-{i}")),
            ))
            .unwrap();
        }

        assert_eq!(hub.history_len(), 3);
        let retained = hub.history_for("infra", "quality");
        assert_eq!(retained[0].content.subject, "n-2");
    }

    #[test]
    fn test_message_ids_are_unique() {
        let hub = ready_hub();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..50 {
            let id = hub
                .send_message(MessageDraft::notification(
                    "infra",
                    "quality",
                    MessageContent::new("tick"),
                ))
                .unwrap();
            assert!(ids.insert(id));
        }
    }

    #[tokio::test]
    async fn test_ingress_unwired() {
        let hub = ready_hub();

        let share = KnowledgeShare::new("infra", "optimization", "Cache Pattern");
        assert!(matches!(
            hub.share_knowledge(share).await,
            Err(HubError::DependencyNotReady(_))
        ));

        let request = CollaborationRequest::new("infra", vec!["quality".to_string()], "perf");
        assert!(matches!(
            hub.request_collaboration(request).await,
            Err(HubError::DependencyNotReady(_))
        ));
    }

    #[test]
    fn test_pending_requests_for_agent() {
        let hub = ready_hub();
        let id = hub
            .send_message(MessageDraft::request(
                "infra",
                "quality",
                MessageContent::new("perf"),
            ))
            .unwrap();

        assert_eq!(hub.pending_requests_for("quality"), vec![id.clone()]);
        assert_eq!(hub.pending_request_sender(&id).as_deref(), Some("infra"));
        assert!(hub.pending_requests_for("ux").is_empty());
    }
}
