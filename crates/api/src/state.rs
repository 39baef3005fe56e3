use std::sync::Arc;

use mangaledger_history::HistoryWalker;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// History walker over the content gateway and the anchor event log.
    pub walker: HistoryWalker,
}
