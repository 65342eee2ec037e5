//! Watch one board live
//!
//! Hydrates a board over REST, opens the realtime channel with store sync and
//! logs every store change until Ctrl+C.
//!
//! Usage: `taskboard-watch [BOARD_ID]` (falls back to `board_id` in the config)

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use realtime::ChannelEvent;
use std::sync::Arc;
use std::time::Duration;
use taskboard_client::bin_common::{load_config_from_env, parse_args, BinaryRunner, ConfigType, RunConfig};
use taskboard_client::taskboard::{
    connect_realtime, init_tracing_with_level, ApiClient, ApiError, BoardChannel, BoardSession, BoardStore,
    RecordingNavigator, ShutdownManager, StoreEvent, StoreListener, SyncMode, TaskboardConfig, TokenStore,
};
use tracing::{error, info, warn};

/// Logs store changes and counts them for the shutdown summary
#[derive(Default)]
struct ChangeLog {
    changes: Mutex<u64>,
}

impl StoreListener for ChangeLog {
    fn on_change(&self, event: &StoreEvent) {
        *self.changes.lock() += 1;
        match event {
            StoreEvent::TaskChanged { task_id, column_id } => info!("Task {} now in column {}", task_id, column_id),
            StoreEvent::TaskRemoved { task_id } => info!("Task {} removed", task_id),
            StoreEvent::NotificationsChanged => info!("Notifications updated"),
            other => info!("{:?}", other),
        }
    }
}

struct Watcher {
    run_config: RunConfig,
    config: TaskboardConfig,
    board_id: String,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<RecordingNavigator>,
    session: BoardSession,
    changes: Arc<ChangeLog>,
    shutdown: ShutdownManager,
}

impl Watcher {
    fn new(config: TaskboardConfig, board_id: String) -> Result<Self> {
        let tokens = config.token_store();
        let navigator = Arc::new(RecordingNavigator::new());
        let api = ApiClient::with_timeout(
            config.api_url.clone(),
            config.request_timeout(),
            Arc::clone(&tokens),
            navigator.clone(),
        )?;

        let store = BoardStore::shared();
        let changes = Arc::new(ChangeLog::default());
        store.write().add_listener(changes.clone());

        Ok(Self {
            run_config: RunConfig::new("taskboard-watch"),
            config,
            board_id,
            tokens,
            navigator,
            session: BoardSession::new(Arc::new(api), store),
            changes,
            shutdown: ShutdownManager::new(),
        })
    }

    async fn hydrate(&self) -> Result<()> {
        match self.session.hydrate_board(&self.board_id).await {
            Ok(()) => {}
            Err(ApiError::Unauthorized) => {
                bail!(
                    "session expired (redirected to {}); store a fresh token and retry",
                    self.navigator.last_route().unwrap_or_default()
                );
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("failed to load board {}", self.board_id)));
            }
        }

        match self.session.load_notifications().await {
            Ok(unread) => info!("{} unread notifications", unread),
            Err(e) => warn!("Notifications unavailable: {}", e.user_message()),
        }
        Ok(())
    }

    fn log_status(&self, channel: &BoardChannel) {
        let metrics = channel.metrics();
        let store = self.session.store().read();
        info!(
            "Status: channel {} | {} tasks on board | {} unread | {} received, {} parse failures",
            metrics.connection_state,
            store.board_tasks(&self.board_id).len(),
            store.notifications().unread_count(),
            metrics.messages_received,
            metrics.parse_failures
        );
    }
}

impl BinaryRunner for Watcher {
    async fn run(&mut self) -> Result<()> {
        self.shutdown.spawn_signal_handler();
        self.hydrate().await?;

        let channel = connect_realtime(
            &self.config.channel_settings(),
            Arc::clone(&self.tokens),
            SyncMode::Store(Arc::clone(self.session.store())),
            Some(self.shutdown.flag()),
        )
        .await?;

        let status_interval = Duration::from_secs(self.run_config.status_interval_secs);
        loop {
            tokio::select! {
                _ = self.shutdown.wait() => break,
                event = channel.next_event(status_interval) => match event {
                    Some(ChannelEvent::Closed) => {
                        warn!("Realtime channel closed; restart to reconnect");
                        break;
                    }
                    Some(ChannelEvent::Error(e)) => error!("Realtime error: {}", e),
                    Some(event) => info!("Realtime: {:?}", event),
                    None => self.log_status(&channel),
                },
            }
        }

        self.log_status(&channel);
        channel.close().await?;
        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    fn summary(&self) -> Option<String> {
        Some(format!("{} store changes observed", *self.changes.changes.lock()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config_path = load_config_from_env(ConfigType::Taskboard);
    let config = TaskboardConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    init_tracing_with_level(&config.log_level);
    config.log();

    let board_id = match parse_args().into_iter().next().or_else(|| config.board_id.clone()) {
        Some(id) => id,
        None => bail!("no board id given; pass one as the first argument or set board_id in the config"),
    };

    let mut watcher = Watcher::new(config, board_id)?;
    watcher.execute().await
}
