/// Feed session: connection lifecycle, subscription handshake and batch merge
///
/// One `FeedSession` owns one WebSocket connection, the shared record store
/// it merges into, the connectivity flag and the candle countdown. There are
/// no ambient globals; constructing a session starts everything, dropping it
/// cancels everything.
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FeedConfig;
use crate::countdown::CandleCountdown;
use crate::error::Result;
use crate::store::RecordStore;
use crate::types::{ClientRequest, CoinRecord, Timeframe};

/// Connection lifecycle states observable by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

/// Live subscription to the ticker feed for one timeframe
pub struct FeedSession {
    config: FeedConfig,
    timeframe: Timeframe,
    store: Arc<RwLock<RecordStore>>,
    state_rx: watch::Receiver<ConnectionState>,
    countdown: CandleCountdown,
    task: JoinHandle<()>,
}

impl FeedSession {
    /// Open a connection and subscribe to `timeframe`
    ///
    /// Returns as soon as the feed task is spawned; connection progress is
    /// observable through `connection_state`. A handshake that never
    /// completes leaves the session in `Connecting` indefinitely; the
    /// periodic full refresh is the fallback for that case.
    pub fn connect(config: FeedConfig, timeframe: Timeframe) -> Result<Self> {
        Url::parse(&config.url)?;
        let subscribe = encode_subscription(timeframe)?;
        let store = Arc::new(RwLock::new(RecordStore::new()));
        Ok(Self::start(
            config,
            subscribe,
            timeframe,
            store,
            ConnectionState::Idle,
        ))
    }

    /// Tear down the current connection and re-subscribe with `timeframe`
    ///
    /// This is a hard replacement, not a graceful drain: the old feed task
    /// and countdown are cancelled before the new ones start, and the state
    /// machine passes through `Closed` before the replacement dials. The
    /// record store is carried over, so rows from the previous timeframe
    /// stay visible until the new subscription overwrites them.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> Result<()> {
        if timeframe == self.timeframe {
            return Ok(());
        }
        // Encode before tearing anything down, so a failure here leaves the
        // running session untouched.
        let subscribe = encode_subscription(timeframe)?;
        info!("switching timeframe {} -> {}", self.timeframe, timeframe);
        self.task.abort();

        // Old countdown task aborts when the previous value drops here
        *self = Self::start(
            self.config.clone(),
            subscribe,
            timeframe,
            self.store.clone(),
            ConnectionState::Closed,
        );
        Ok(())
    }

    fn start(
        config: FeedConfig,
        subscribe: String,
        timeframe: Timeframe,
        store: Arc<RwLock<RecordStore>>,
        initial: ConnectionState,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(initial);

        let url = config.url.clone();
        let feed_store = store.clone();
        let task = tokio::spawn(async move {
            if let Err(error) = run_feed(&url, subscribe, feed_store, &state_tx).await {
                warn!("feed connection to {url} ended: {error}");
            }
            // Transport failure and remote close both just flip the flag;
            // recovery is a timeframe change or the periodic full refresh.
            let _ = state_tx.send(ConnectionState::Closed);
        });

        let countdown = CandleCountdown::spawn(timeframe);

        Self {
            config,
            timeframe,
            store,
            state_rx,
            countdown,
            task,
        }
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state().is_open()
    }

    /// Ordered snapshot of the record store
    pub fn entries(&self) -> Vec<CoinRecord> {
        self.store.read().entries()
    }

    /// Current candle countdown as `MM:SS`
    pub fn countdown(&self) -> String {
        self.countdown.display()
    }
}

impl Drop for FeedSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn encode_subscription(timeframe: Timeframe) -> Result<String> {
    Ok(serde_json::to_string(&ClientRequest::SetTimeframe {
        timeframe,
    })?)
}

/// Dial the feed, send the subscription handshake, then merge batches until
/// the connection ends. No automatic reconnect is attempted here.
async fn run_feed(
    url: &str,
    subscribe: String,
    store: Arc<RwLock<RecordStore>>,
    state_tx: &watch::Sender<ConnectionState>,
) -> Result<()> {
    let _ = state_tx.send(ConnectionState::Connecting);

    let (ws_stream, _) = connect_async(url).await?;
    info!("connected to feed at {url}");
    let (mut write, mut read) = ws_stream.split();

    write.send(Message::Text(subscribe.into())).await?;
    let _ = state_tx.send(ConnectionState::Open);

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                // A batch is an ordered array of records; anything else is
                // dropped without touching the connection.
                match serde_json::from_str::<Vec<CoinRecord>>(&text) {
                    Ok(batch) => {
                        debug!("merging batch of {} records", batch.len());
                        store.write().merge(batch);
                    }
                    Err(error) => {
                        warn!("dropping malformed feed message: {error}");
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("feed closed the connection");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Heartbeats are handled by tungstenite
            }
            Ok(_) => {}
            Err(error) => return Err(error.into()),
        }
    }

    Ok(())
}
