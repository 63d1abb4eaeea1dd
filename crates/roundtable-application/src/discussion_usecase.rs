//! Discussion use case implementation.
//!
//! `DiscussionUseCase` ties the repositories to the scheduler: it creates
//! discussions, opens them into running [`SchedulerHandle`]s, and keeps at
//! most one runtime per discussion alive.

use std::sync::Arc;

use anyhow::{Context, Result};
use roundtable_core::Roundtable;
use roundtable_core::RoundtableError;
use roundtable_core::backend::ModelBackend;
use roundtable_core::config::RoundtableConfig;
use roundtable_core::discussion::{CreateDiscussionRequest, Discussion, DiscussionRepository};
use roundtable_core::participant::{
    CharacterRepository, Participant, builtin_characters, refresh_roster,
};
use roundtable_interaction::ResponseGenerator;

use crate::runtime_cache::RuntimeCache;
use crate::scheduler::SchedulerHandle;

pub struct DiscussionUseCase {
    discussions: Arc<dyn DiscussionRepository>,
    characters: Arc<dyn CharacterRepository>,
    generator: Arc<ResponseGenerator>,
    config: RoundtableConfig,
    runtimes: RuntimeCache,
}

impl DiscussionUseCase {
    pub fn new(
        discussions: Arc<dyn DiscussionRepository>,
        characters: Arc<dyn CharacterRepository>,
        backend: Arc<dyn ModelBackend>,
        config: RoundtableConfig,
    ) -> Self {
        let generator = Arc::new(ResponseGenerator::from_config(backend, &config));
        Self {
            discussions,
            characters,
            generator,
            config,
            runtimes: RuntimeCache::new(),
        }
    }

    /// Built-in characters followed by the user's own.
    ///
    /// A user character with a built-in's id replaces it.
    pub async fn available_characters(&self) -> Result<Vec<Participant>> {
        let custom = self
            .characters
            .get_all()
            .await
            .context("Failed to load custom characters")?;
        let mut all: Vec<Participant> = builtin_characters()
            .into_iter()
            .filter(|b| !custom.iter().any(|c| c.id == b.id))
            .collect();
        all.extend(custom);
        Ok(all)
    }

    /// Looks characters up by id, keeping the given order.
    pub async fn find_characters(&self, ids: &[String]) -> Result<Vec<Participant>> {
        let available = self.available_characters().await?;
        ids.iter()
            .map(|id| {
                available
                    .iter()
                    .find(|c| &c.id == id)
                    .cloned()
                    .ok_or_else(|| RoundtableError::not_found("Character", id.clone()).into())
            })
            .collect()
    }

    /// Validates the request, opens it with the host line and saves it.
    pub async fn create(&self, request: CreateDiscussionRequest) -> Result<Discussion> {
        let mut discussion = request.into_discussion()?;

        let mut table = Roundtable::new(discussion.clone());
        if let Some(opening) = table.open() {
            discussion.turns.push(opening);
        }

        self.discussions
            .save(&discussion)
            .await
            .with_context(|| format!("Failed to save discussion {}", discussion.id))?;
        tracing::info!(discussion_id = %discussion.id, mode = %discussion.mode, "Created discussion");
        Ok(discussion)
    }

    pub async fn find(&self, discussion_id: &str) -> Result<Discussion> {
        Ok(self
            .discussions
            .find_by_id(discussion_id)
            .await?
            .ok_or_else(|| RoundtableError::not_found("Discussion", discussion_id))?)
    }

    pub async fn list(&self) -> Result<Vec<Discussion>> {
        Ok(self.discussions.list_all().await?)
    }

    /// Returns the running scheduler for a discussion, loading it first if
    /// needed.
    ///
    /// On load, generative participants pick up the current bindings of
    /// their custom character definitions, and the session state is
    /// replayed from the stored turns. The returned loop is not started.
    pub async fn open_discussion(&self, discussion_id: &str) -> Result<SchedulerHandle> {
        if let Some(handle) = self.runtimes.get(discussion_id).await {
            return Ok(handle);
        }

        let mut discussion = self
            .discussions
            .find_by_id(discussion_id)
            .await?
            .ok_or_else(|| RoundtableError::not_found("Discussion", discussion_id))?;

        match self.characters.get_all().await {
            Ok(definitions) => {
                let refreshed = refresh_roster(&mut discussion.roster, &definitions);
                if refreshed > 0 {
                    tracing::info!(discussion_id, refreshed, "Refreshed model bindings from character definitions");
                    if let Err(e) = self.discussions.save(&discussion).await {
                        tracing::error!(discussion_id, "Failed to save refreshed roster: {}", e);
                    }
                }
            }
            Err(e) => tracing::warn!("Failed to load character definitions: {}", e),
        }

        let mut table = Roundtable::new(discussion)
            .with_history_window(self.config.scheduler.context_window);
        if let Some(opening) = table.open() {
            if let Err(e) = self.discussions.append_turn(discussion_id, &opening).await {
                tracing::error!(discussion_id, "Failed to persist opening line: {}", e);
            }
        }

        let handle = SchedulerHandle::spawn(
            table,
            Arc::clone(&self.generator),
            Arc::clone(&self.discussions),
            self.config.scheduler.clone(),
        );
        let cached = self.runtimes.get_or_insert(handle.clone()).await;
        if !cached.is_same_runtime(&handle) {
            // another caller opened it first
            handle.shutdown().await;
        }
        Ok(cached)
    }

    /// Shuts the running scheduler down, if any.
    pub async fn close_discussion(&self, discussion_id: &str) {
        if let Some(handle) = self.runtimes.remove(discussion_id).await {
            handle.shutdown().await;
        }
    }

    pub async fn delete(&self, discussion_id: &str) -> Result<()> {
        self.close_discussion(discussion_id).await;
        self.discussions
            .delete(discussion_id)
            .await
            .with_context(|| format!("Failed to delete discussion {}", discussion_id))?;
        tracing::info!(discussion_id, "Deleted discussion");
        Ok(())
    }

    /// Shuts down every running discussion.
    pub async fn shutdown_all(&self) {
        for handle in self.runtimes.drain().await {
            handle.shutdown().await;
        }
    }
}
