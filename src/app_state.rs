use crate::cli::CommandLineArgs;
use crate::sled_store::SledHistoryStore;
use crate::store::{HistoryStore, MemoryHistoryStore, StoreError};

use std::sync::Arc;
use std::time::Duration;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// History store.
    pub store: Arc<dyn HistoryStore>,

    /// Maximum time to wait for the history store.
    pub store_timeout: Duration,
}

impl AppState {
    /// Create and return an [AppState] with the given store.
    pub fn new(store: Arc<dyn HistoryStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Create and return an [AppState] configured from command line arguments.
    ///
    /// Opens the sled history database if a path is given, otherwise keeps history in memory.
    pub fn from_args(args: &CommandLineArgs) -> Result<Self, StoreError> {
        let store: Arc<dyn HistoryStore> = match &args.history_path {
            Some(path) => {
                tracing::info!("opening history database at {}", path);
                Arc::new(SledHistoryStore::open(path)?)
            }
            None => {
                tracing::warn!("no history path configured, history will not persist");
                Arc::new(MemoryHistoryStore::new())
            }
        };
        Ok(Self::new(store, Duration::from_secs(args.store_timeout)))
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn from_args_memory() {
        let args = CommandLineArgs::try_parse_from(["calculator"]).unwrap();
        let state = AppState::from_args(&args).unwrap();
        assert_eq!(Duration::from_secs(10), state.store_timeout);
    }

    #[test]
    fn from_args_unopenable_path() {
        let args =
            CommandLineArgs::try_parse_from(["calculator", "--history-path", "/dev/null/history"])
                .unwrap();
        assert!(matches!(
            AppState::from_args(&args),
            Err(StoreError::Sled(_))
        ));
    }
}
