//! Application state: problem catalog, per-chat sessions, prompts, and OpenAI client.
//!
//! This module owns:
//!   - the validated problem catalog (config bank + built-in seeds)
//!   - the session store (registered chats and each chat's open problem)
//!   - the prompts struct (from TOML or defaults)
//!   - optional OpenAI client
//!   - the daily push schedule

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::catalog::Catalog;
use crate::config::{load_trainer_config_from_env, Prompts, Schedule};
use crate::domain::{ChatId, Problem};
use crate::openai::OpenAI;
use crate::seeds::seed_problems;

/// Registered chats and the single active problem per chat.
#[derive(Default)]
pub struct Sessions {
    registered: RwLock<HashSet<ChatId>>,
    open: RwLock<HashMap<ChatId, Problem>>,
}

impl Sessions {
    /// Returns true if the chat was not registered before.
    pub async fn register(&self, chat: ChatId) -> bool {
        self.registered.write().await.insert(chat)
    }

    /// Unregister and drop the chat's open problem.
    pub async fn unregister(&self, chat: ChatId) -> bool {
        let removed = self.registered.write().await.remove(&chat);
        self.close(chat).await;
        removed
    }

    pub async fn is_registered(&self, chat: ChatId) -> bool {
        self.registered.read().await.contains(&chat)
    }

    /// Snapshot of registered chats, sorted.
    pub async fn registered(&self) -> Vec<ChatId> {
        let mut chats: Vec<ChatId> = self.registered.read().await.iter().copied().collect();
        chats.sort_unstable();
        chats
    }

    /// Replace the chat's active problem.
    pub async fn open(&self, chat: ChatId, problem: Problem) {
        self.open.write().await.insert(chat, problem);
    }

    pub async fn current(&self, chat: ChatId) -> Option<Problem> {
        self.open.read().await.get(&chat).cloned()
    }

    /// Drop the chat's active problem, keeping its registration.
    pub async fn close(&self, chat: ChatId) -> Option<Problem> {
        self.open.write().await.remove(&chat)
    }
}

pub struct AppState {
    pub catalog: Catalog,
    pub sessions: Sessions,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub schedule: Schedule,
}

impl AppState {
    /// Build state from env: load config, validate the problem bank, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + optional local bank).
        let cfg = load_trainer_config_from_env().unwrap_or_default();
        let catalog = Catalog::load(&cfg.problems, &seed_problems());

        // Build optional OpenAI client (if API key present).
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "algo_trainer", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "algo_trainer", "OpenAI disabled (no OPENAI_API_KEY). Using local approach judge.");
        }

        let schedule = Schedule::from_env();
        info!(target: "algo_trainer", hour = schedule.hour, minute = schedule.minute, "Daily push schedule");

        Self::with_parts(catalog, openai, cfg.prompts, schedule)
    }

    pub fn with_parts(catalog: Catalog, openai: Option<OpenAI>, prompts: Prompts, schedule: Schedule) -> Self {
        Self {
            catalog,
            sessions: Sessions::default(),
            openai,
            prompts,
            schedule,
        }
    }

    /// State with the built-in catalog and no external services.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::with_parts(
            Catalog::load(&[], &seed_problems()),
            None,
            Prompts::default(),
            Schedule::default(),
        )
    }
}
