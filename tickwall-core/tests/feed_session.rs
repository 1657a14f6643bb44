//! End-to-end feed session tests against a loopback WebSocket server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use tickwall_core::{ClientRequest, CoinRecord, Direction, FeedConfig, FeedSession, Timeframe};

const BATCH_ONE: &str = r#"[
    {"symbol":"BTCUSDT","open":64100.0,"close":64900.0,"change":1.25,"direction":"up","isHot":false,"volume24h":250000000.0},
    {"symbol":"ETHUSDT","open":3000.0,"close":2955.0,"change":-1.5,"direction":"down","isHot":true,"volume24h":90000000.0}
]"#;

const BATCH_TWO: &str = r#"[
    {"symbol":"BTCUSDT","open":64100.0,"close":65100.0,"change":1.56,"direction":"up","isHot":true,"volume24h":260000000.0}
]"#;

async fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not met within 5s");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Accept connections forever, forwarding every parsed handshake.
fn spawn_server(
    listener: TcpListener,
    handshake_tx: mpsc::UnboundedSender<ClientRequest>,
    connections: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            connections.fetch_add(1, Ordering::SeqCst);
            let tx = handshake_tx.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Text(text) = msg {
                        if let Ok(request) = serde_json::from_str::<ClientRequest>(&text) {
                            let _ = tx.send(request);
                        }
                    }
                }
            });
        }
    });
}

#[tokio::test]
async fn subscribes_merges_and_tolerates_malformed_messages() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (handshake_tx, mut handshake_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        if let Some(Ok(Message::Text(text))) = ws.next().await {
            let request: ClientRequest = serde_json::from_str(&text).unwrap();
            let _ = handshake_tx.send(request);
        }

        ws.send(Message::Text(BATCH_ONE.into())).await.unwrap();
        // Not a batch; the client must drop it and keep the connection
        ws.send(Message::Text(r#"{"type":"welcome"}"#.into()))
            .await
            .unwrap();
        ws.send(Message::Text(BATCH_TWO.into())).await.unwrap();

        // Hold the socket open while the client asserts
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let session =
        FeedSession::connect(FeedConfig::new(format!("ws://{addr}")), Timeframe::M5).unwrap();

    let request = tokio::time::timeout(Duration::from_secs(5), handshake_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        request,
        ClientRequest::SetTimeframe {
            timeframe: Timeframe::M5
        }
    );

    wait_for(|| {
        session
            .entries()
            .iter()
            .any(|r| r.symbol == "BTCUSDT" && r.close == 65100.0)
    })
    .await;

    let entries = session.entries();
    assert_eq!(entries.len(), 2);
    // First-seen order survives the update
    assert_eq!(entries[0].symbol, "BTCUSDT");
    assert_eq!(entries[1].symbol, "ETHUSDT");
    // The update replaced the whole record
    assert!(entries[0].is_hot);
    assert_eq!(entries[0].volume_24h, Some(260000000.0));
    assert!(session.is_connected());
}

#[tokio::test]
async fn timeframe_change_reconnects_with_new_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (handshake_tx, mut handshake_rx) = mpsc::unbounded_channel();
    let connections = Arc::new(AtomicUsize::new(0));
    spawn_server(listener, handshake_tx, connections.clone());

    let mut session =
        FeedSession::connect(FeedConfig::new(format!("ws://{addr}")), Timeframe::M1).unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), handshake_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        first,
        ClientRequest::SetTimeframe {
            timeframe: Timeframe::M1
        }
    );

    session.set_timeframe(Timeframe::M15).unwrap();
    assert_eq!(session.timeframe(), Timeframe::M15);

    let second = tokio::time::timeout(Duration::from_secs(5), handshake_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        second,
        ClientRequest::SetTimeframe {
            timeframe: Timeframe::M15
        }
    );

    // Exactly one handshake per connection, nothing queued behind it
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(handshake_rx.try_recv().is_err());
    assert_eq!(connections.load(Ordering::SeqCst), 2);

    // Selecting the already-active timeframe must not reconnect
    session.set_timeframe(Timeframe::M15).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}

/// One batch where every record carries the same close value, used as a
/// per-batch marker.
fn marker_batch(symbols: usize, close: f64) -> String {
    let records: Vec<CoinRecord> = (0..symbols)
        .map(|i| CoinRecord {
            symbol: format!("SYM{i:02}USDT"),
            open: 100.0,
            close,
            change: 1.0,
            direction: Direction::Up,
            is_hot: false,
            volume_24h: Some(5_000_000.0),
        })
        .collect();
    serde_json::to_string(&records).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn readers_never_observe_a_partially_merged_batch() {
    const SYMBOLS: usize = 50;
    const BATCHES: usize = 30;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _ = ws.next().await;
        for k in 1..=BATCHES {
            let batch = marker_batch(SYMBOLS, 1_000.0 + k as f64);
            ws.send(Message::Text(batch.into())).await.unwrap();
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let session =
        FeedSession::connect(FeedConfig::new(format!("ws://{addr}")), Timeframe::M1).unwrap();

    // Poll snapshots while the feed task merges on another worker. Every
    // batch rewrites all symbols with one marker value, so a snapshot must
    // be either empty or one whole batch, never a mix of two.
    let final_marker = 1_000.0 + BATCHES as f64;
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let entries = session.entries();
        assert!(
            entries.is_empty() || entries.len() == SYMBOLS,
            "partially merged batch visible: {} of {SYMBOLS} records",
            entries.len()
        );
        if let Some(first) = entries.first() {
            assert!(
                entries.iter().all(|r| r.close == first.close),
                "snapshot mixes records from two batches"
            );
            if first.close == final_marker {
                break;
            }
        }
        assert!(Instant::now() < deadline, "feed never delivered the last batch");
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn remote_close_flips_connectivity_without_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let server_connections = connections.clone();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            server_connections.fetch_add(1, Ordering::SeqCst);
            let Ok(mut ws) = accept_async(stream).await else {
                continue;
            };
            // Consume the handshake, deliver one batch, then hang up
            let _ = ws.next().await;
            let _ = ws.send(Message::Text(BATCH_ONE.into())).await;
            let _ = ws.close(None).await;
        }
    });

    let session =
        FeedSession::connect(FeedConfig::new(format!("ws://{addr}")), Timeframe::M1).unwrap();

    wait_for(|| session.entries().len() == 2).await;
    wait_for(|| !session.is_connected()).await;

    // The merged rows survive the disconnect, and no reconnect is attempted
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(session.entries().len(), 2);
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}
