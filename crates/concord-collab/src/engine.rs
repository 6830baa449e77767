//! The collaboration engine
//!
//! Session proposals and team formations validate synchronously, store the
//! new entity, and fan invitation requests out through the hub. The caller
//! gets the id back immediately; activation is driven by explicit
//! acknowledgments arriving later.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use concord_core::config::{AckPolicy, CollabConfig};
use concord_events::CoordEvent;
use concord_hub::{
    CollabIngress, CollaborationRequest, CommunicationHub, HubError, MessageContent, MessageDraft,
    Priority,
};
use concord_knowledge::KnowledgeExchange;

use crate::{
    CollabError, CollaborationSession, ProblemDefinition, ResourceBudget, Result, SessionStatus,
    Team, TeamStatus,
};

/// Brokers collaboration sessions and forms teams
pub struct CollaborationEngine {
    hub: Arc<CommunicationHub>,
    knowledge: Arc<KnowledgeExchange>,
    config: CollabConfig,

    sessions: DashMap<String, CollaborationSession>,
    teams: DashMap<String, Team>,

    initialized: AtomicBool,
}

impl CollaborationEngine {
    pub fn new(
        hub: Arc<CommunicationHub>,
        knowledge: Arc<KnowledgeExchange>,
        config: CollabConfig,
    ) -> Self {
        Self {
            hub,
            knowledge,
            config,
            sessions: DashMap::new(),
            teams: DashMap::new(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Idempotent; requires the hub and the knowledge exchange to be ready
    pub fn initialize(&self) -> Result<()> {
        if !self.hub.is_ready() {
            return Err(CollabError::not_ready("communication hub"));
        }
        if !self.knowledge.is_ready() {
            return Err(CollabError::not_ready("knowledge exchange"));
        }
        if !self.initialized.swap(true, Ordering::SeqCst) {
            tracing::info!("Collaboration engine ready");
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Propose a collaboration session
    ///
    /// Creates the session in `Proposed` status and sends one request
    /// message (response required) per participant. Returns the session id
    /// without waiting for any response.
    pub fn request_collaboration(
        &self,
        initiator: impl Into<String>,
        participants: Vec<String>,
        goal: impl Into<String>,
        context: Value,
    ) -> Result<String> {
        self.ensure_ready()?;
        let initiator = initiator.into();
        let goal = goal.into();

        if participants.is_empty() {
            return Err(CollabError::invalid("participant list is empty"));
        }
        if goal.trim().is_empty() {
            return Err(CollabError::invalid("goal must not be empty"));
        }
        if !self.hub.registry().exists(&initiator) {
            return Err(CollabError::UnknownAgent(initiator));
        }

        let mut seen = HashSet::new();
        for participant in &participants {
            if participant == &initiator {
                return Err(CollabError::DuplicateParticipant(participant.clone()));
            }
            if !seen.insert(participant.clone()) {
                return Err(CollabError::DuplicateParticipant(participant.clone()));
            }
            if !self.hub.registry().exists(participant) {
                return Err(CollabError::UnknownAgent(participant.clone()));
            }
        }

        let session = CollaborationSession::propose(
            initiator.clone(),
            participants.clone(),
            goal.clone(),
            context.clone(),
        );
        let id = session.id.clone();
        self.sessions.insert(id.clone(), session);

        for participant in &participants {
            let invite = MessageDraft::request(
                initiator.as_str(),
                participant.as_str(),
                MessageContent::new(format!("collaboration request: {goal}")).with_data(json!({
                    "session_id": id,
                    "goal": goal,
                    "context": context,
                })),
            )
            .with_priority(Priority::High);

            // Participants were validated above; a failure here is a fault
            // worth logging, not a reason to roll the proposal back.
            if let Err(e) = self.hub.send_message(invite) {
                tracing::warn!("Session {} invite to {} failed: {}", id, participant, e);
            }
        }

        self.hub.events().emit(CoordEvent::SessionProposed {
            session_id: id.clone(),
            initiator: initiator.clone(),
            timestamp: Utc::now(),
        });

        tracing::info!(
            "Session {} proposed by {} with {} participants",
            id,
            initiator,
            participants.len()
        );

        Ok(id)
    }

    /// Record a participant's acknowledgment of a proposal
    ///
    /// Activation follows the configured policy: the first acknowledgment
    /// (default) or all of them.
    pub fn acknowledge_session(&self, id: &str, agent: &str) -> Result<()> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| CollabError::SessionNotFound(id.to_string()))?;

        if session.status.is_terminal() {
            return Err(CollabError::transition(format!(
                "session {id} is {:?}",
                session.status
            )));
        }
        if !session.has_participant(agent) {
            return Err(CollabError::NotParticipant(agent.to_string()));
        }

        if !session.has_acknowledged(agent) {
            session.acknowledged.push(agent.to_string());
        }

        let activate = match self.config.ack_policy {
            AckPolicy::FirstAck => true,
            AckPolicy::AllAcks => session.acknowledged.len() == session.participants.len(),
        };

        if session.status == SessionStatus::Proposed && activate {
            session.status = SessionStatus::Active;
            self.hub.events().emit(CoordEvent::SessionActivated {
                session_id: id.to_string(),
                acknowledged_by: agent.to_string(),
                timestamp: Utc::now(),
            });
            tracing::info!("Session {} active (acknowledged by {})", id, agent);
        }

        Ok(())
    }

    /// Resolve an active session with an outcome summary
    pub fn resolve_session(&self, id: &str, outcome: impl Into<String>) -> Result<()> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| CollabError::SessionNotFound(id.to_string()))?;

        if session.status != SessionStatus::Active {
            return Err(CollabError::transition(format!(
                "cannot resolve a session in {:?} status",
                session.status
            )));
        }

        let outcome = outcome.into();
        session.status = SessionStatus::Resolved;
        session.outcome = Some(outcome.clone());
        session.resolved_at = Some(Utc::now());

        self.hub.events().emit(CoordEvent::SessionResolved {
            session_id: id.to_string(),
            outcome,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Abandon a proposed or active session
    pub fn abandon_session(&self, id: &str) -> Result<()> {
        let mut session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| CollabError::SessionNotFound(id.to_string()))?;

        if session.status.is_terminal() {
            return Err(CollabError::transition(format!(
                "session {id} is already {:?}",
                session.status
            )));
        }

        session.status = SessionStatus::Abandoned;
        session.resolved_at = Some(Utc::now());

        self.hub.events().emit(CoordEvent::SessionAbandoned {
            session_id: id.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Cancel a proposal before it activates; initiator only
    pub fn cancel_session(&self, id: &str, by: &str) -> Result<()> {
        {
            let session = self
                .sessions
                .get(id)
                .ok_or_else(|| CollabError::SessionNotFound(id.to_string()))?;

            if session.initiator != by {
                return Err(CollabError::NotInitiator(by.to_string()));
            }
            if session.status != SessionStatus::Proposed {
                return Err(CollabError::transition(
                    "only proposed sessions can be cancelled; resolve or abandon instead",
                ));
            }
        }
        self.abandon_session(id)
    }

    pub fn session(&self, id: &str) -> Result<CollaborationSession> {
        self.sessions
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| CollabError::SessionNotFound(id.to_string()))
    }

    /// Age of a proposal, for caller-side timeout enforcement
    pub fn session_elapsed(&self, id: &str) -> Result<chrono::Duration> {
        self.sessions
            .get(id)
            .map(|s| s.elapsed())
            .ok_or_else(|| CollabError::SessionNotFound(id.to_string()))
    }

    pub fn list_sessions(&self) -> Vec<CollaborationSession> {
        self.sessions.iter().map(|e| e.value().clone()).collect()
    }

    /// Form a team around a problem definition
    ///
    /// The first listed member organizes the team and is confirmed from the
    /// start; the others receive a formation request (response required).
    /// Returns the team id without waiting for confirmations.
    pub fn form_team(
        &self,
        purpose: impl Into<String>,
        members: Vec<String>,
        problem: ProblemDefinition,
        deadline: DateTime<Utc>,
        resources: ResourceBudget,
    ) -> Result<String> {
        self.ensure_ready()?;
        let purpose = purpose.into();

        if purpose.trim().is_empty() {
            return Err(CollabError::invalid("team purpose must not be empty"));
        }
        if purpose.len() > self.config.max_purpose_len {
            return Err(CollabError::invalid(format!(
                "team purpose exceeds {} characters",
                self.config.max_purpose_len
            )));
        }
        if members.is_empty() {
            return Err(CollabError::invalid("a team needs at least one member"));
        }

        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.clone()) {
                return Err(CollabError::DuplicateParticipant(member.clone()));
            }
            if !self.hub.registry().exists(member) {
                return Err(CollabError::UnknownAgent(member.clone()));
            }
        }

        let now = Utc::now();
        if deadline <= now {
            return Err(CollabError::InvalidDeadline(format!(
                "deadline {deadline} is not after {now}"
            )));
        }
        if !resources.is_valid() {
            return Err(CollabError::InvalidBudget(format!(
                "funds {} / compute credits {} must be non-negative",
                resources.funds, resources.compute_credits
            )));
        }

        let team = Team::form(purpose.clone(), members.clone(), problem, deadline, resources);
        let id = team.id.clone();
        let organizer = team.organizer().to_string();
        self.teams.insert(id.clone(), team);

        for member in members.iter().filter(|m| **m != organizer) {
            let invite = MessageDraft::request(
                organizer.as_str(),
                member.as_str(),
                MessageContent::new(format!("team formation: {purpose}")).with_data(json!({
                    "team_id": id,
                    "purpose": purpose,
                    "deadline": deadline,
                    "funds": resources.funds,
                    "compute_credits": resources.compute_credits,
                })),
            )
            .with_priority(Priority::High);

            if let Err(e) = self.hub.send_message(invite) {
                tracing::warn!("Team {} invite to {} failed: {}", id, member, e);
            }
        }

        self.hub.events().emit(CoordEvent::TeamFormed {
            team_id: id.clone(),
            purpose,
            member_count: members.len(),
            timestamp: Utc::now(),
        });

        tracing::info!("Team {} forming with {} members", id, members.len());
        Ok(id)
    }

    /// Record a member's confirmation; all confirmations activate the team
    pub fn confirm_member(&self, team_id: &str, agent: &str) -> Result<()> {
        let mut team = self
            .teams
            .get_mut(team_id)
            .ok_or_else(|| CollabError::TeamNotFound(team_id.to_string()))?;

        if team.status.is_terminal() {
            return Err(CollabError::transition(format!(
                "team {team_id} is {:?}",
                team.status
            )));
        }
        if !team.has_member(agent) {
            return Err(CollabError::NotParticipant(agent.to_string()));
        }

        if !team.has_confirmed(agent) {
            team.confirmed.push(agent.to_string());
        }

        if team.status == TeamStatus::Forming && team.all_confirmed() {
            team.status = TeamStatus::Active;
            self.hub.events().emit(CoordEvent::TeamActivated {
                team_id: team_id.to_string(),
                timestamp: Utc::now(),
            });
            tracing::info!("Team {} active", team_id);
        }

        Ok(())
    }

    /// Complete an active team
    pub fn complete_team(&self, team_id: &str) -> Result<()> {
        let mut team = self
            .teams
            .get_mut(team_id)
            .ok_or_else(|| CollabError::TeamNotFound(team_id.to_string()))?;

        if team.status != TeamStatus::Active {
            return Err(CollabError::transition(format!(
                "cannot complete a team in {:?} status",
                team.status
            )));
        }

        team.status = TeamStatus::Completed;
        self.hub.events().emit(CoordEvent::TeamCompleted {
            team_id: team_id.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Dissolve a forming or active team
    pub fn dissolve_team(&self, team_id: &str) -> Result<()> {
        let mut team = self
            .teams
            .get_mut(team_id)
            .ok_or_else(|| CollabError::TeamNotFound(team_id.to_string()))?;

        if team.status.is_terminal() {
            return Err(CollabError::transition(format!(
                "team {team_id} is already {:?}",
                team.status
            )));
        }

        team.status = TeamStatus::Dissolved;
        self.hub.events().emit(CoordEvent::TeamDissolved {
            team_id: team_id.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Cancel a forming team; organizer only
    pub fn cancel_team(&self, team_id: &str, by: &str) -> Result<()> {
        {
            let team = self
                .teams
                .get(team_id)
                .ok_or_else(|| CollabError::TeamNotFound(team_id.to_string()))?;

            if team.organizer() != by {
                return Err(CollabError::NotInitiator(by.to_string()));
            }
            if team.status != TeamStatus::Forming {
                return Err(CollabError::transition(
                    "only forming teams can be cancelled; dissolve instead",
                ));
            }
        }
        self.dissolve_team(team_id)
    }

    pub fn team(&self, id: &str) -> Result<Team> {
        self.teams
            .get(id)
            .map(|t| t.clone())
            .ok_or_else(|| CollabError::TeamNotFound(id.to_string()))
    }

    pub fn list_teams(&self) -> Vec<Team> {
        self.teams.iter().map(|e| e.value().clone()).collect()
    }

    /// The knowledge exchange this engine consults
    pub fn knowledge(&self) -> &Arc<KnowledgeExchange> {
        &self.knowledge
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(CollabError::not_ready("collaboration engine"))
        }
    }
}

#[async_trait]
impl CollabIngress for CollaborationEngine {
    async fn ingest_collaboration(&self, request: CollaborationRequest) -> concord_hub::Result<String> {
        self.request_collaboration(
            request.initiator,
            request.participants,
            request.goal,
            request.context,
        )
        .map_err(|e| match e {
            CollabError::Hub(hub) => hub,
            CollabError::UnknownAgent(name) => HubError::UnknownAgent(name),
            CollabError::DependencyNotReady(component) => HubError::not_ready(component),
            other => HubError::other(other.to_string()),
        })
    }
}
