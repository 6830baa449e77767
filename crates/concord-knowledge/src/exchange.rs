//! The knowledge exchange
//!
//! Validates and stores shared knowledge, then propagates a notification
//! through the hub to every agent the item is relevant to.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use concord_core::config::KnowledgeConfig;
use concord_events::CoordEvent;
use concord_hub::{
    CommunicationHub, HubError, KnowledgeIngress, KnowledgeShare, MessageContent, MessageDraft,
};

use crate::{
    KnowledgeDraft, KnowledgeError, KnowledgeFilter, KnowledgeItem, KnowledgeStore, Result,
};

/// Shared, queryable knowledge base with hub-propagated notifications
pub struct KnowledgeExchange {
    hub: Arc<CommunicationHub>,
    store: Arc<dyn KnowledgeStore>,
    config: KnowledgeConfig,

    /// Categories seen so far; filters naming anything else are invalid
    categories: DashMap<String, usize>,

    initialized: AtomicBool,
}

impl KnowledgeExchange {
    pub fn new(
        hub: Arc<CommunicationHub>,
        store: Arc<dyn KnowledgeStore>,
        config: KnowledgeConfig,
    ) -> Self {
        Self {
            hub,
            store,
            config,
            categories: DashMap::new(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Idempotent; requires the hub to be initialized first
    pub fn initialize(&self) -> Result<()> {
        if !self.hub.is_ready() {
            return Err(KnowledgeError::not_ready("communication hub"));
        }
        if !self.initialized.swap(true, Ordering::SeqCst) {
            tracing::info!("Knowledge exchange ready (store: {})", self.store.name());
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Validate and store an item, then notify applicable agents
    ///
    /// Confidence is clamped to [0, 1]. The notification broadcast reaches
    /// every registered agent (except the source) whose name or capability
    /// tags intersect the item's applicability; `"*"` reaches everyone.
    pub async fn share(&self, draft: KnowledgeDraft) -> Result<String> {
        self.ensure_ready()?;

        if !self.hub.registry().exists(&draft.source) {
            return Err(KnowledgeError::UnknownAgent(draft.source.clone()));
        }
        if draft.applicability.is_empty() {
            return Err(KnowledgeError::invalid_item(
                "applicability must name at least one agent or tag",
            ));
        }
        if draft.category.trim().is_empty() {
            return Err(KnowledgeError::invalid_item("category must not be empty"));
        }
        if draft.title.trim().is_empty() {
            return Err(KnowledgeError::invalid_item("title must not be empty"));
        }

        let item = KnowledgeItem::seal(draft);
        let id = item.id.clone();

        let recipients: Vec<String> = self
            .hub
            .registry()
            .matching_tags(&item.applicability)
            .into_iter()
            .map(|a| a.name)
            .filter(|name| name != &item.source)
            .collect();

        self.store.insert(item.clone()).await?;
        *self.categories.entry(item.category.clone()).or_insert(0) += 1;

        if !recipients.is_empty() {
            let notice = MessageDraft::broadcast(
                item.source.clone(),
                recipients,
                MessageContent::new(format!("knowledge shared: {}", item.title)).with_data(json!({
                    "knowledge_id": id,
                    "category": item.category,
                    "confidence": item.confidence,
                    "source": item.source,
                })),
            );
            // Per-recipient outcomes land in the hub's delivery log; a
            // propagation fault must not roll back the stored item.
            if let Err(e) = self.hub.send_message(notice) {
                tracing::warn!("Knowledge notification for {} not propagated: {}", id, e);
            }
        }

        self.hub.events().emit(CoordEvent::knowledge_shared(
            id.clone(),
            item.source.clone(),
            item.category.clone(),
        ));

        tracing::debug!(
            "Shared knowledge {} ({}, confidence {:.2})",
            id,
            item.category,
            item.confidence
        );

        Ok(id)
    }

    /// Query stored items
    ///
    /// Results are a restartable snapshot ordered by descending confidence,
    /// ties broken by most-recent first. A confidence bound outside [0, 1]
    /// or a category no item has ever used is an invalid filter; any other
    /// non-matching query returns an empty vec.
    pub async fn query(&self, filter: &KnowledgeFilter) -> Result<Vec<KnowledgeItem>> {
        self.ensure_ready()?;

        if let Some(bound) = filter.min_confidence {
            if bound.is_nan() || !(0.0..=1.0).contains(&bound) {
                return Err(KnowledgeError::invalid_filter(format!(
                    "confidence bound {bound} outside [0, 1]"
                )));
            }
        }
        if let Some(category) = &filter.category {
            if !self.categories.contains_key(category) {
                return Err(KnowledgeError::invalid_filter(format!(
                    "unknown category: {category}"
                )));
            }
        }

        let mut items: Vec<KnowledgeItem> = self
            .store
            .all()
            .await?
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect();

        items.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(CmpOrdering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(items)
    }

    /// Items transitively reachable through `related` references
    ///
    /// Bounded by `depth` (default from config), deduplicated against a
    /// visited set so reference cycles terminate. An unknown root id yields
    /// an empty vec.
    pub async fn related_to(&self, id: &str, depth: Option<usize>) -> Result<Vec<KnowledgeItem>> {
        self.ensure_ready()?;

        let max_depth = depth.unwrap_or(self.config.related_depth);

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(id.to_string());

        let mut frontier = match self.store.get(id).await? {
            Some(root) => root.related,
            None => return Ok(Vec::new()),
        };

        let mut result = Vec::new();
        let mut remaining = max_depth;

        while remaining > 0 && !frontier.is_empty() {
            let mut next = Vec::new();
            for related_id in frontier {
                if !visited.insert(related_id.clone()) {
                    continue;
                }
                // Dangling references are skipped, not errors
                if let Some(item) = self.store.get(&related_id).await? {
                    next.extend(item.related.iter().cloned());
                    result.push(item);
                }
            }
            frontier = next;
            remaining -= 1;
        }

        Ok(result)
    }

    /// Fetch one item by id
    pub async fn get(&self, id: &str) -> Result<Option<KnowledgeItem>> {
        self.ensure_ready()?;
        self.store.get(id).await
    }

    /// Categories that have been used so far
    pub fn known_categories(&self) -> Vec<String> {
        self.categories.iter().map(|e| e.key().clone()).collect()
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(KnowledgeError::not_ready("knowledge exchange"))
        }
    }
}

#[async_trait]
impl KnowledgeIngress for KnowledgeExchange {
    async fn ingest_knowledge(&self, share: KnowledgeShare) -> concord_hub::Result<String> {
        let draft = KnowledgeDraft {
            source: share.source,
            category: share.category,
            title: share.title,
            description: share.description,
            data: share.data,
            confidence: share.confidence,
            applicability: share.applicability,
            related: share.related,
        };

        self.share(draft).await.map_err(|e| match e {
            KnowledgeError::Hub(hub) => hub,
            KnowledgeError::UnknownAgent(name) => HubError::UnknownAgent(name),
            KnowledgeError::DependencyNotReady(component) => HubError::not_ready(component),
            other => HubError::other(other.to_string()),
        })
    }
}
