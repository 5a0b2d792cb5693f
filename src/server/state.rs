//! Shared state handed to every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::schema::RecordSchema;

/// Loaded once at startup and never mutated, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub schema: Arc<RecordSchema>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(schema: RecordSchema, config: Config) -> Self {
        Self {
            schema: Arc::new(schema),
            config: Arc::new(config),
        }
    }
}
