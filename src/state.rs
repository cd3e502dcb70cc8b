use axum::extract::FromRef;

use crate::{config::Config, services::quiz_engine::QuizEngine, store::DynStore};

#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub config: Config,
}

impl AppState {
    pub fn new(store: DynStore, config: Config) -> Self {
        Self { store, config }
    }

    pub fn engine(&self) -> QuizEngine {
        QuizEngine::new(self.store.clone())
    }
}

impl FromRef<AppState> for DynStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
