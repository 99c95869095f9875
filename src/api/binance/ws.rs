use std::time::Instant;

use futures_util::{SinkExt, Stream, StreamExt};
use log::{error, info, warn};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{self, protocol::Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::types::SubscribeRequest;
use crate::error::PriceWatchError;
use crate::monitor::notifier::MessageSender;
use crate::monitor::pipeline::AlertPipeline;
use crate::monitor::targets::TargetTable;

pub const BINANCE_WS_URL: &str = "wss://stream.binance.com:9443/ws";

pub type TradeStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedExit {
    Shutdown,
    Closed,
    Failed,
}

pub fn subscription_url(base_url: &str, streams: &[String]) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), streams.join("/"))
}

/// Opens the combined trade stream and sends the `SUBSCRIBE` request.
/// Either step failing is returned to the caller; there is no retry.
pub async fn connect_to_trades(
    base_url: &str,
    targets: &TargetTable,
) -> Result<TradeStream, PriceWatchError> {
    let streams = targets.stream_names();
    let url = subscription_url(base_url, &streams);

    info!("Connecting to Binance WebSocket: {}", url);

    let (mut ws_stream, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Connection error: {}", e);
            return Err(e.into());
        }
    };
    info!("Successfully connected to WebSocket");

    let request = SubscribeRequest::new(streams);
    ws_stream
        .send(Message::Text(serde_json::to_string(&request)?))
        .await?;
    info!(
        "Subscribed to {} streams (request {}): {:?}",
        request.params.len(),
        request.id,
        request.params
    );

    Ok(ws_stream)
}

/// Feeds every text frame from `read` through `pipeline` until the stream
/// ends, errors, or `shutdown` fires. Shutdown also cancels a frame that is
/// still being handled, including any alert delivery in flight.
pub async fn read_trades<R, S>(
    read: &mut R,
    pipeline: &mut AlertPipeline<S>,
    shutdown: &mut watch::Receiver<bool>,
) -> FeedExit
where
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
    S: MessageSender,
{
    loop {
        tokio::select! {
            message = read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        tokio::select! {
                            _ = pipeline.handle_text(&text, Instant::now()) => {}
                            _ = shutdown.changed() => {
                                warn!("Shutdown while handling a frame, dropping pending alerts");
                                return FeedExit::Shutdown;
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        match frame {
                            Some(frame) => info!(
                                "WebSocket connection closed with code {}: {}",
                                frame.code, frame.reason
                            ),
                            None => info!("WebSocket connection closed"),
                        }
                        return FeedExit::Closed;
                    }
                    // pings are answered by tungstenite
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        return FeedExit::Failed;
                    }
                    None => {
                        info!("WebSocket stream ended");
                        return FeedExit::Closed;
                    }
                }
            }
            _ = shutdown.changed() => {
                return FeedExit::Shutdown;
            }
        }
    }
}

/// Runs the feed on an established connection. On shutdown a Close frame is
/// sent before the socket is dropped.
pub async fn run_feed<S: MessageSender>(
    ws_stream: TradeStream,
    mut pipeline: AlertPipeline<S>,
    mut shutdown: watch::Receiver<bool>,
) -> FeedExit {
    let (mut write, mut read) = ws_stream.split();

    let exit = read_trades(&mut read, &mut pipeline, &mut shutdown).await;

    if exit == FeedExit::Shutdown {
        if let Err(e) = write.send(Message::Close(None)).await {
            warn!("Failed to close WebSocket cleanly: {}", e);
        }
    }

    exit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_streams_with_slashes() {
        let streams = vec!["linkusdt@trade".to_string(), "solusdt@trade".to_string()];
        assert_eq!(
            subscription_url(BINANCE_WS_URL, &streams),
            "wss://stream.binance.com:9443/ws/linkusdt@trade/solusdt@trade"
        );
        assert_eq!(
            subscription_url("wss://example.test/ws/", &streams[..1]),
            "wss://example.test/ws/linkusdt@trade"
        );
    }
}
