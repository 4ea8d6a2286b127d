use std::sync::Arc;

use quotekeeper_core::quotes::{
    default_quotes, ConflictQueue, LocalStore, Quote, QuoteSyncEngine, QuoteSyncEngineTrait,
    QuoteSyncError, RemoteQuoteSource,
};
use quotekeeper_remote::HttpQuoteSource;
use quotekeeper_storage_json::JsonFileStore;
use tokio::sync::{Mutex, RwLock};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ConflictPolicy, Config};
use crate::events::{EventBus, ServerEvent, QUOTES_CHANGED};
use crate::notifications::NotificationLog;

pub struct AppState {
    pub store: Arc<dyn LocalStore>,
    /// The collection as the UI sees it. Every committed change is persisted
    /// before it becomes visible here.
    pub quotes: RwLock<Vec<Quote>>,
    pub remote: Option<Arc<dyn RemoteQuoteSource>>,
    pub sync_engine: Option<Arc<dyn QuoteSyncEngineTrait>>,
    pub conflicts: Mutex<ConflictQueue>,
    pub notifications: Arc<NotificationLog>,
    pub event_bus: EventBus,
    pub conflict_policy: ConflictPolicy,
}

impl AppState {
    /// Loads the persisted collection, seeding the starter quotes into an
    /// empty store. Sync is disabled when `remote` is None.
    pub fn new(
        store: Arc<dyn LocalStore>,
        remote: Option<Arc<dyn RemoteQuoteSource>>,
        conflict_policy: ConflictPolicy,
    ) -> anyhow::Result<Self> {
        let mut quotes = store.load()?;
        if quotes.is_empty() {
            quotes = default_quotes();
            store.save(&quotes)?;
            tracing::info!("Seeded {} starter quotes", quotes.len());
        }

        let sync_engine = remote.clone().map(|remote| {
            Arc::new(QuoteSyncEngine::new(remote)) as Arc<dyn QuoteSyncEngineTrait>
        });

        let event_bus = EventBus::new(256);
        let notifications = Arc::new(NotificationLog::new(event_bus.clone()));

        Ok(Self {
            store,
            quotes: RwLock::new(quotes),
            remote,
            sync_engine,
            conflicts: Mutex::new(ConflictQueue::new()),
            notifications,
            event_bus,
            conflict_policy,
        })
    }

    /// Persists `quotes` and makes them the current collection.
    ///
    /// Takes the already-locked collection so the read-modify-write stays
    /// under one write lock.
    pub fn commit(
        &self,
        current: &mut Vec<Quote>,
        quotes: Vec<Quote>,
    ) -> Result<(), QuoteSyncError> {
        self.store.save(&quotes)?;
        *current = quotes;
        self.event_bus.publish(ServerEvent::new(QUOTES_CHANGED));
        Ok(())
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("QK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = JsonFileStore::open(&config.data_dir)?;
    tracing::info!("Data directory in use: {}", store.dir().display());

    let remote: Option<Arc<dyn RemoteQuoteSource>> = match &config.remote_url {
        Some(url) => {
            let mut source = HttpQuoteSource::with_timeout(url, config.request_timeout)?;
            if let Some(token) = &config.remote_token {
                source = source.with_token(token.clone());
            }
            tracing::info!("Syncing quotes with {}", source.base_url());
            Some(Arc::new(source))
        }
        None => {
            tracing::info!("QK_REMOTE_URL not set, running without sync");
            None
        }
    };

    let state = AppState::new(Arc::new(store), remote, config.conflict_policy)?;
    Ok(Arc::new(state))
}
