//! The orchestrator facade

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};

use concord_collab::{
    CollaborationEngine, CollaborationSession, ProblemDefinition, ResourceBudget, SessionStatus,
    Team, TeamStatus,
};
use concord_core::CoordConfig;
use concord_events::{CoordEvent, EventBus};
use concord_hub::{
    Agent, AgentRegistry, Availability, CommunicationHub, DeliveryRecord, Message, MessageDraft,
};
use concord_knowledge::{
    InMemoryKnowledgeStore, KnowledgeDraft, KnowledgeExchange, KnowledgeFilter, KnowledgeItem,
    KnowledgeStore,
};

use crate::{InitStage, OrchestratorError, Result};

const STAGES: [InitStage; 4] = [
    InitStage::Registry,
    InitStage::Hub,
    InitStage::Knowledge,
    InitStage::Collaboration,
];

/// Top-level facade over the coordination core
///
/// Owns every component and passes references explicitly; there is no
/// module-level shared state. Either all four stages are ready or every
/// boundary operation reports `NotReady`.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    bus: EventBus,
    hub: Arc<CommunicationHub>,
    knowledge: Arc<KnowledgeExchange>,
    collab: Arc<CollaborationEngine>,

    /// Index of the next stage to run; a failed attempt resumes here
    next_stage: Mutex<usize>,
    ready: AtomicBool,
}

impl Orchestrator {
    /// Build the component graph with the in-memory knowledge store
    pub fn new(config: CoordConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryKnowledgeStore::new()))
    }

    /// Build the component graph writing knowledge through `store`
    pub fn with_store(config: CoordConfig, store: Arc<dyn KnowledgeStore>) -> Self {
        let registry = Arc::new(AgentRegistry::new());
        let bus = EventBus::new(config.hub.event_capacity);

        let hub = Arc::new(CommunicationHub::new(
            Arc::clone(&registry),
            bus.clone(),
            config.hub.clone(),
        ));

        let knowledge = Arc::new(KnowledgeExchange::new(
            Arc::clone(&hub),
            store,
            config.knowledge.clone(),
        ));

        let collab = Arc::new(CollaborationEngine::new(
            Arc::clone(&hub),
            Arc::clone(&knowledge),
            config.collab.clone(),
        ));

        // The hub's unified-ingress conveniences delegate to the components
        // built on top of it.
        hub.wire_knowledge(Arc::clone(&knowledge) as Arc<dyn concord_hub::KnowledgeIngress>);
        hub.wire_collab(Arc::clone(&collab) as Arc<dyn concord_hub::CollabIngress>);

        Self {
            registry,
            bus,
            hub,
            knowledge,
            collab,
            next_stage: Mutex::new(0),
            ready: AtomicBool::new(false),
        }
    }

    /// Cascade initialization through registry → hub → knowledge → collaboration
    ///
    /// Aborts at the first failing stage; a retry resumes from that stage.
    /// Repeat calls after success are no-ops.
    pub fn initialize(&self) -> Result<()> {
        let mut next = self.next_stage.lock().expect("init lock poisoned");

        while *next < STAGES.len() {
            let stage = STAGES[*next];
            match stage {
                InitStage::Registry => {
                    tracing::debug!("Registry ready with {} agents", self.registry.count());
                }
                InitStage::Hub => self
                    .hub
                    .initialize()
                    .map_err(|e| OrchestratorError::stage(stage, e))?,
                InitStage::Knowledge => self
                    .knowledge
                    .initialize()
                    .map_err(|e| OrchestratorError::stage(stage, e))?,
                InitStage::Collaboration => self
                    .collab
                    .initialize()
                    .map_err(|e| OrchestratorError::stage(stage, e))?,
            }
            *next += 1;
        }

        self.ready.store(true, Ordering::SeqCst);
        tracing::info!("Coordination core initialized");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    // --- Registry admin -------------------------------------------------
    //
    // Membership mutates only through here (or a component's own tests).
    // Bootstrap registration is allowed before initialize.

    pub fn register_agent(&self, agent: Agent) {
        let name = agent.name.clone();
        self.registry.register(agent);
        self.bus.emit(CoordEvent::agent_registered(name));
    }

    pub fn deregister_agent(&self, name: &str) -> bool {
        let removed = self.registry.deregister(name);
        if removed {
            self.bus.emit(CoordEvent::agent_deregistered(name));
        }
        removed
    }

    pub fn set_availability(&self, name: &str, availability: Availability) -> bool {
        self.registry.set_availability(name, availability)
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    // --- Boundary operations --------------------------------------------

    /// Route a message; returns its id synchronously after enqueue
    pub fn send_message(&self, draft: MessageDraft) -> Result<String> {
        self.ensure_ready()?;
        Ok(self.hub.send_message(draft)?)
    }

    /// Share a knowledge item; returns its id
    pub async fn share_knowledge(&self, draft: KnowledgeDraft) -> Result<String> {
        self.ensure_ready()?;
        Ok(self.knowledge.share(draft).await?)
    }

    /// Propose a collaboration session; returns its id without blocking
    pub fn request_collaboration(
        &self,
        initiator: impl Into<String>,
        participants: Vec<String>,
        goal: impl Into<String>,
        context: Value,
    ) -> Result<String> {
        self.ensure_ready()?;
        Ok(self
            .collab
            .request_collaboration(initiator, participants, goal, context)?)
    }

    /// Form a team; returns its id without waiting for confirmations
    pub fn form_team(
        &self,
        purpose: impl Into<String>,
        members: Vec<String>,
        problem: ProblemDefinition,
        deadline: DateTime<Utc>,
        resources: ResourceBudget,
    ) -> Result<String> {
        self.ensure_ready()?;
        Ok(self
            .collab
            .form_team(purpose, members, problem, deadline, resources)?)
    }

    // --- Query surface --------------------------------------------------

    pub async fn query_knowledge(&self, filter: &KnowledgeFilter) -> Result<Vec<KnowledgeItem>> {
        self.ensure_ready()?;
        Ok(self.knowledge.query(filter).await?)
    }

    pub async fn related_knowledge(
        &self,
        id: &str,
        depth: Option<usize>,
    ) -> Result<Vec<KnowledgeItem>> {
        self.ensure_ready()?;
        Ok(self.knowledge.related_to(id, depth).await?)
    }

    pub fn session_status(&self, id: &str) -> Result<SessionStatus> {
        self.ensure_ready()?;
        Ok(self.collab.session(id)?.status)
    }

    pub fn session(&self, id: &str) -> Result<CollaborationSession> {
        self.ensure_ready()?;
        Ok(self.collab.session(id)?)
    }

    pub fn team_status(&self, id: &str) -> Result<TeamStatus> {
        self.ensure_ready()?;
        Ok(self.collab.team(id)?.status)
    }

    pub fn team(&self, id: &str) -> Result<Team> {
        self.ensure_ready()?;
        Ok(self.collab.team(id)?)
    }

    pub fn message(&self, id: &str) -> Result<Option<Message>> {
        self.ensure_ready()?;
        Ok(self.hub.message(id))
    }

    pub fn delivery_log_for(&self, message_id: &str) -> Vec<DeliveryRecord> {
        self.hub.delivery_log().for_message(message_id)
    }

    // --- Lifecycle pass-throughs ----------------------------------------

    pub fn acknowledge_session(&self, id: &str, agent: &str) -> Result<()> {
        self.ensure_ready()?;
        Ok(self.collab.acknowledge_session(id, agent)?)
    }

    pub fn resolve_session(&self, id: &str, outcome: impl Into<String>) -> Result<()> {
        self.ensure_ready()?;
        Ok(self.collab.resolve_session(id, outcome)?)
    }

    pub fn confirm_member(&self, team_id: &str, agent: &str) -> Result<()> {
        self.ensure_ready()?;
        Ok(self.collab.confirm_member(team_id, agent)?)
    }

    // --- Subscriptions and component access ------------------------------

    /// Claim an agent's mailbox receiver; usable before initialize so
    /// consumers can be in place when traffic starts
    pub fn take_mailbox(&self, agent: &str) -> Option<mpsc::UnboundedReceiver<Message>> {
        self.hub.take_mailbox(agent)
    }

    /// Subscribe to coordination events
    pub fn subscribe_events(&self) -> broadcast::Receiver<CoordEvent> {
        self.bus.subscribe()
    }

    pub fn hub(&self) -> &Arc<CommunicationHub> {
        &self.hub
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeExchange> {
        &self.knowledge
    }

    pub fn collab(&self) -> &Arc<CollaborationEngine> {
        &self.collab
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(OrchestratorError::NotReady)
        }
    }
}
