/// Error taxonomy for the feed session
///
/// Transport failures are non-fatal at the session level: they flip the
/// connectivity flag and are left for the periodic full refresh or a user
/// timeframe change to recover. Only setup-time failures (bad URL,
/// unserialisable handshake) surface through `Result`.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid feed url: {0}")]
    Url(#[from] url::ParseError),

    #[error("websocket transport: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("encode subscription request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unknown timeframe: {0}")]
    UnknownTimeframe(String),
}
