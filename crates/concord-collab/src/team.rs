//! Task-scoped teams

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Complexity tier of the problem a team is formed around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
    Extreme,
}

/// What the team is solving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDefinition {
    /// Problem kind, e.g. `incident`, `feature`, `migration`
    pub kind: String,

    pub complexity: Complexity,

    /// Free-form attributes of the problem
    #[serde(default)]
    pub attributes: Value,
}

impl ProblemDefinition {
    pub fn new(kind: impl Into<String>, complexity: Complexity) -> Self {
        Self {
            kind: kind.into(),
            complexity,
            attributes: Value::Null,
        }
    }

    pub fn with_attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Resource envelope granted to a team
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceBudget {
    /// Monetary budget
    pub funds: f64,

    /// Compute-credit budget
    pub compute_credits: f64,
}

impl ResourceBudget {
    pub fn new(funds: f64, compute_credits: f64) -> Self {
        Self {
            funds,
            compute_credits,
        }
    }

    /// Budget fields must be finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.funds.is_finite()
            && self.compute_credits.is_finite()
            && self.funds >= 0.0
            && self.compute_credits >= 0.0
    }
}

/// Team lifecycle state
///
/// `Forming` → `Active` → `Completed` or `Dissolved`; terminal states
/// reject every further transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Forming,
    Active,
    Completed,
    Dissolved,
}

impl TeamStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Dissolved)
    }
}

/// A resource- and deadline-bound group executing a defined problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique id assigned at formation
    pub id: String,

    /// Purpose label
    pub purpose: String,

    /// Distinct members, at least one; the first listed member organized
    /// the team and is confirmed from the start
    pub members: Vec<String>,

    pub problem: ProblemDefinition,

    /// Strictly in the future at formation; expiry enforcement is the
    /// caller's job, queried against team status
    pub deadline: DateTime<Utc>,

    pub resources: ResourceBudget,
    pub status: TeamStatus,

    /// Members that have confirmed; the team activates when all have
    #[serde(default)]
    pub confirmed: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl Team {
    pub(crate) fn form(
        purpose: String,
        members: Vec<String>,
        problem: ProblemDefinition,
        deadline: DateTime<Utc>,
        resources: ResourceBudget,
    ) -> Self {
        let organizer = members[0].clone();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            purpose,
            members,
            problem,
            deadline,
            resources,
            status: TeamStatus::Forming,
            confirmed: vec![organizer],
            created_at: Utc::now(),
        }
    }

    /// The agent on whose behalf the team was formed
    pub fn organizer(&self) -> &str {
        &self.members[0]
    }

    pub fn has_member(&self, agent: &str) -> bool {
        self.members.iter().any(|m| m == agent)
    }

    pub fn has_confirmed(&self, agent: &str) -> bool {
        self.confirmed.iter().any(|c| c == agent)
    }

    pub fn all_confirmed(&self) -> bool {
        self.members.iter().all(|m| self.has_confirmed(m))
    }

    /// Whether the deadline has passed at the time of the call
    pub fn is_past_deadline(&self) -> bool {
        Utc::now() > self.deadline
    }
}
