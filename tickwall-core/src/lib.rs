/// Tickwall Core - Real-Time Ticker State Synchronisation
///
/// This library holds the client-side state logic behind the tickwall
/// dashboard:
/// - WebSocket feed session with a per-timeframe subscription handshake
/// - Insertion-ordered record store merging inbound update batches
/// - Deterministic change/volume classification into display buckets
/// - Wall-clock-aligned candle countdown
/// - Debounced symbol-search buffer
///
/// Rendering is deliberately out of scope; a UI consumes the derived state
/// exposed here (see the `tickwall-tui` binary crate).
pub mod classify;
pub mod config;
pub mod countdown;
pub mod error;
pub mod search;
pub mod session;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use classify::{change_bucket, volume_bucket, ChangeBucket, VolumeBucket};
pub use config::FeedConfig;
pub use countdown::{format_remaining, remaining_ms, CandleCountdown};
pub use error::{Error, Result};
pub use search::SearchBuffer;
pub use session::{ConnectionState, FeedSession};
pub use store::RecordStore;
pub use types::{ClientRequest, CoinRecord, Direction, Timeframe};
