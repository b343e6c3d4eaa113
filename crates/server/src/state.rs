//! Application state
//!
//! Shared state across all handlers. Every collaborator is injected;
//! handlers own nothing.

use std::sync::Arc;

use niyati_agent::Orchestrator;
use niyati_config::Settings;
use niyati_core::MemoryStore;

use crate::session::SessionManager;
use crate::telegram::TelegramGateway;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn MemoryStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub sessions: Arc<SessionManager>,
    pub gateway: Arc<TelegramGateway>,
}

impl AppState {
    pub fn new(
        settings: Arc<Settings>,
        store: Arc<dyn MemoryStore>,
        orchestrator: Arc<Orchestrator>,
        sessions: Arc<SessionManager>,
        gateway: Arc<TelegramGateway>,
    ) -> Self {
        Self {
            settings,
            store,
            orchestrator,
            sessions,
            gateway,
        }
    }
}
