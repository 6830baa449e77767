//! Error types for the orchestrator facade

use concord_collab::CollabError;
use concord_hub::HubError;
use concord_knowledge::KnowledgeError;

/// Result type for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Initialization stage, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    Registry,
    Hub,
    Knowledge,
    Collaboration,
}

impl std::fmt::Display for InitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Registry => "registry",
            Self::Hub => "hub",
            Self::Knowledge => "knowledge exchange",
            Self::Collaboration => "collaboration engine",
        };
        f.write_str(name)
    }
}

/// Errors at the orchestrator boundary
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Initialization has not completed successfully
    #[error("Coordination core is not ready")]
    NotReady,

    /// Initialization aborted; a retry restarts from this stage
    #[error("Initialization failed at the {stage} stage: {source}")]
    Stage {
        stage: InitStage,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Hub operation failure
    #[error(transparent)]
    Hub(#[from] HubError),

    /// Knowledge exchange failure
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    /// Collaboration engine failure
    #[error(transparent)]
    Collab(#[from] CollabError),
}

impl OrchestratorError {
    pub(crate) fn stage<E>(stage: InitStage, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Stage {
            stage,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        let err = OrchestratorError::stage(InitStage::Knowledge, HubError::not_ready("hub"));
        assert_eq!(
            err.to_string(),
            "Initialization failed at the knowledge exchange stage: Dependency not ready: hub"
        );
    }
}
