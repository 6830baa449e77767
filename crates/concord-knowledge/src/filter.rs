//! Query filters over the knowledge base

use serde::{Deserialize, Serialize};

use crate::KnowledgeItem;

/// Filter for knowledge queries; unset fields match everything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeFilter {
    /// Exact category match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Lower confidence bound, inclusive; must lie in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,

    /// Applicability tag (agent name or capability; `"*"` items always match)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Source agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Case-insensitive substring over title and description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl KnowledgeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn min_confidence(mut self, bound: f64) -> Self {
        self.min_confidence = Some(bound);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn text(mut self, needle: impl Into<String>) -> Self {
        self.text = Some(needle.into());
        self
    }

    /// Whether an item satisfies every set field
    pub fn matches(&self, item: &KnowledgeItem) -> bool {
        if let Some(category) = &self.category {
            if &item.category != category {
                return false;
            }
        }

        if let Some(bound) = self.min_confidence {
            if item.confidence < bound {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            let applies = item.is_global() || item.applicability.iter().any(|t| t == tag);
            if !applies {
                return false;
            }
        }

        if let Some(source) = &self.source {
            if &item.source != source {
                return false;
            }
        }

        if let Some(needle) = &self.text {
            let needle = needle.to_lowercase();
            let hit = item.title.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KnowledgeDraft;

    fn sample() -> KnowledgeItem {
        KnowledgeItem::seal(
            KnowledgeDraft::new("infra", "optimization", "Cache Pattern")
                .with_description("Cache read-heavy endpoints behind a TTL")
                .with_confidence(0.9)
                .applicable_to(vec!["infra".to_string(), "quality".to_string()]),
        )
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert!(KnowledgeFilter::new().matches(&sample()));
    }

    #[test]
    fn test_category_and_confidence() {
        let item = sample();
        assert!(KnowledgeFilter::new()
            .category("optimization")
            .min_confidence(0.5)
            .matches(&item));
        assert!(!KnowledgeFilter::new().category("security").matches(&item));
        assert!(!KnowledgeFilter::new().min_confidence(0.95).matches(&item));
    }

    #[test]
    fn test_tag_matching() {
        let item = sample();
        assert!(KnowledgeFilter::new().tag("quality").matches(&item));
        assert!(!KnowledgeFilter::new().tag("ux").matches(&item));

        let global = KnowledgeItem::seal(KnowledgeDraft::new("infra", "process", "Retro notes"));
        assert!(KnowledgeFilter::new().tag("ux").matches(&global));
    }

    #[test]
    fn test_text_search_is_case_insensitive() {
        let item = sample();
        assert!(KnowledgeFilter::new().text("cache").matches(&item));
        assert!(KnowledgeFilter::new().text("TTL").matches(&item));
        assert!(!KnowledgeFilter::new().text("kafka").matches(&item));
    }

    #[test]
    fn test_source_filter() {
        let item = sample();
        assert!(KnowledgeFilter::new().source("infra").matches(&item));
        assert!(!KnowledgeFilter::new().source("quality").matches(&item));
    }
}
