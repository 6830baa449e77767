//! Agent registry for discovery
//!
//! Shared-read by every component; membership is mutated only through the
//! orchestrator's admin surface.

use dashmap::DashMap;
use std::sync::Arc;

use crate::{Agent, Availability};

/// Registry of participant agents with a capability-tag index
#[derive(Clone)]
pub struct AgentRegistry {
    agents: Arc<DashMap<String, Agent>>,
    capabilities: Arc<DashMap<String, Vec<String>>>, // tag -> agent names
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: Arc::new(DashMap::new()),
            capabilities: Arc::new(DashMap::new()),
        }
    }

    /// Register an agent, replacing any previous registration of the name
    pub fn register(&self, agent: Agent) {
        if let Some(previous) = self.agents.get(&agent.name) {
            let stale = previous.capabilities.clone();
            drop(previous);
            self.unindex(&agent.name, &stale);
        }

        for tag in &agent.capabilities {
            let mut names = self.capabilities.entry(tag.clone()).or_insert_with(Vec::new);
            if !names.contains(&agent.name) {
                names.push(agent.name.clone());
            }
        }

        tracing::debug!("Registered agent: {}", agent.name);
        self.agents.insert(agent.name.clone(), agent);
    }

    /// Remove an agent; returns false if the name was unknown
    ///
    /// History referencing the name is untouched; later sends to it fail.
    pub fn deregister(&self, name: &str) -> bool {
        match self.agents.remove(name) {
            Some((_, agent)) => {
                self.unindex(name, &agent.capabilities);
                tracing::debug!("Deregistered agent: {}", name);
                true
            }
            None => false,
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Agent> {
        self.agents.get(name).map(|a| a.clone())
    }

    pub fn list(&self) -> Vec<Agent> {
        self.agents.iter().map(|e| e.value().clone()).collect()
    }

    pub fn list_by_capability(&self, tag: &str) -> Vec<Agent> {
        self.capabilities
            .get(tag)
            .map(|names| names.iter().filter_map(|n| self.get(n)).collect())
            .unwrap_or_default()
    }

    /// Agents whose name or capability tags intersect the given tags
    ///
    /// A `"*"` entry in `tags` matches every registered agent.
    pub fn matching_tags(&self, tags: &[String]) -> Vec<Agent> {
        if tags.iter().any(|t| t == "*") {
            return self.list();
        }

        self.agents
            .iter()
            .filter(|entry| {
                let agent = entry.value();
                tags.iter()
                    .any(|t| *t == agent.name || agent.has_capability(t))
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Update an agent's availability; returns false if the name is unknown
    pub fn set_availability(&self, name: &str, availability: Availability) -> bool {
        match self.agents.get_mut(name) {
            Some(mut agent) => {
                agent.availability = availability;
                tracing::debug!("Agent {} is now {:?}", name, availability);
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.agents.len()
    }

    fn unindex(&self, name: &str, tags: &[String]) {
        for tag in tags {
            if let Some(mut names) = self.capabilities.get_mut(tag) {
                names.retain(|n| n != name);
            }
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = AgentRegistry::new();
        registry.register(Agent::new("infra").with_capability("deployment"));

        assert!(registry.exists("infra"));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get("infra").unwrap().name, "infra");
    }

    #[test]
    fn test_capability_index() {
        let registry = AgentRegistry::new();
        registry.register(Agent::new("infra").with_capability("monitoring"));
        registry.register(Agent::new("quality").with_capability("monitoring"));
        registry.register(Agent::new("ux").with_capability("design"));

        let monitors = registry.list_by_capability("monitoring");
        assert_eq!(monitors.len(), 2);

        let designers = registry.list_by_capability("design");
        assert_eq!(designers.len(), 1);
        assert_eq!(designers[0].name, "ux");
    }

    #[test]
    fn test_deregister_clears_index() {
        let registry = AgentRegistry::new();
        registry.register(Agent::new("infra").with_capability("deployment"));

        assert!(registry.deregister("infra"));
        assert!(!registry.exists("infra"));
        assert!(registry.list_by_capability("deployment").is_empty());
        assert!(!registry.deregister("infra"));
    }

    #[test]
    fn test_reregister_replaces_tags() {
        let registry = AgentRegistry::new();
        registry.register(Agent::new("infra").with_capability("deployment"));
        registry.register(Agent::new("infra").with_capability("monitoring"));

        assert!(registry.list_by_capability("deployment").is_empty());
        assert_eq!(registry.list_by_capability("monitoring").len(), 1);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_matching_tags() {
        let registry = AgentRegistry::new();
        registry.register(Agent::new("infra").with_capability("optimization"));
        registry.register(Agent::new("quality"));
        registry.register(Agent::new("ux"));

        // By name and by capability
        let matched = registry.matching_tags(&["quality".to_string(), "optimization".to_string()]);
        let mut names: Vec<_> = matched.iter().map(|a| a.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["infra", "quality"]);

        // Wildcard reaches everyone
        assert_eq!(registry.matching_tags(&["*".to_string()]).len(), 3);
    }

    #[test]
    fn test_set_availability() {
        let registry = AgentRegistry::new();
        registry.register(Agent::new("security"));

        assert!(registry.set_availability("security", Availability::Offline));
        assert_eq!(
            registry.get("security").unwrap().availability,
            Availability::Offline
        );
        assert!(!registry.set_availability("ghost", Availability::Busy));
    }
}
