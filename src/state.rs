//! Application state: the lesson catalog, live sessions, advisor client,
//! prompts, and the progress store.
//!
//! This module owns:
//!   - the immutable catalog (built-in or config-supplied)
//!   - the session map (by session id)
//!   - the optional advisor client
//!   - the progress store used to rehydrate and persist sessions

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::advisor::Advisor;
use crate::catalog::Catalog;
use crate::config::{load_app_config_from_env, Prompts};
use crate::i18n::Locale;
use crate::progress::{store_from_env, ProgressStore};
use crate::session::Session;

pub struct AppState {
    pub catalog: Catalog,
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub advisor: Option<Advisor>,
    pub prompts: Prompts,
    pub store: Box<dyn ProgressStore>,
}

impl AppState {
    /// Build state from env: load config, pick the catalog, init the advisor
    /// and the progress store.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_app_config_from_env();
        let prompts = cfg_opt
            .as_ref()
            .map(|c| c.prompts.clone())
            .unwrap_or_default();

        // A config bank replaces the built-in catalog only when it satisfies
        // the dense-id invariant; otherwise it is rejected wholesale.
        let catalog = match cfg_opt.filter(|c| !c.lessons.is_empty()) {
            Some(cfg) => {
                let lessons = cfg.lessons.into_iter().map(|l| l.into_lesson()).collect();
                match Catalog::from_lessons(lessons) {
                    Ok(cat) => {
                        info!(target: "lesson", count = cat.len(), "Using config-supplied lesson bank");
                        cat
                    }
                    Err(e) => {
                        error!(target: "lesson", error = %e, "Config lesson bank rejected; using built-ins");
                        Catalog::builtin()
                    }
                }
            }
            None => Catalog::builtin(),
        };
        info!(target: "lesson", count = catalog.len(), "Lesson catalog ready");

        let advisor = Advisor::from_env();
        if let Some(a) = &advisor {
            info!(target: "pylingo_backend", base_url = %a.base_url, model = %a.model, "Advisor enabled.");
        } else {
            info!(target: "pylingo_backend", "Advisor disabled (no OPENAI_API_KEY). Failed submissions fall back to static hints.");
        }

        Self::assemble(catalog, prompts, advisor, store_from_env())
    }

    /// Assemble state from explicit parts. Used by `new` and by tests that
    /// need a custom store or a disabled advisor.
    pub fn assemble(
        catalog: Catalog,
        prompts: Prompts,
        advisor: Option<Advisor>,
        store: Box<dyn ProgressStore>,
    ) -> Self {
        Self {
            catalog,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            advisor,
            prompts,
            store,
        }
    }

    /// Open a session: resume a live one, rehydrate a persisted one, or
    /// create a fresh one. Returns a snapshot of the session.
    #[instrument(level = "info", skip(self), fields(requested = ?requested_id, locale = ?locale))]
    pub async fn open_session(&self, requested_id: Option<String>, locale: Locale) -> Session {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = requested_id {
            if let Some(existing) = sessions.get(&id) {
                info!(target: "pylingo_backend", session = %id, "Resumed live session");
                return existing.clone();
            }
            let session = match self.store.load(&id) {
                Some(record) => {
                    info!(target: "pylingo_backend", session = %id, "Rehydrated session from progress store");
                    Session::from_record(id.clone(), locale, record, &self.catalog)
                }
                None => Session::new(id.clone(), locale, &self.catalog),
            };
            sessions.insert(id, session.clone());
            self.store.save(&session.id, &session.to_record());
            return session;
        }

        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), locale, &self.catalog);
        sessions.insert(id, session.clone());
        self.store.save(&session.id, &session.to_record());
        info!(target: "pylingo_backend", session = %session.id, "Opened fresh session");
        session
    }

    /// Read-only snapshot of a session by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }
}
