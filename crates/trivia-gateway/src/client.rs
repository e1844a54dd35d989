//! Connection lifecycle
//!
//! Opens the WebSocket, splits it into a spawned writer task fed by a
//! channel and a read loop, and multiplexes inbound frames with game-timer
//! ticks onto the single dispatch context. Transport failures trigger a
//! bounded fixed-delay reconnect; the entity cache and active games survive
//! a reconnect.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use trivia_common::BotConfig;
use trivia_core::{CustomScriptStore, MessageSender, QuestionStore, SandboxFactory, ScoreStore};
use trivia_game::GameTick;

use crate::commands::CommandRouter;
use crate::engine::{ConnectionState, GatewayEngine};
use crate::error::GatewayError;
use crate::protocol::GatewayMessage;

/// Buffered outbound messages per connection
const OUTBOUND_BUFFER: usize = 100;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// External collaborators handed to the client at startup
pub struct GatewayDeps {
    pub sender: Arc<dyn MessageSender>,
    pub questions: Arc<dyn QuestionStore>,
    pub scores: Arc<dyn ScoreStore>,
    pub scripts: Arc<dyn CustomScriptStore>,
    pub sandboxes: Arc<dyn SandboxFactory>,
}

/// Run the gateway client until the reconnect budget is exhausted
pub async fn run(config: BotConfig, deps: GatewayDeps) -> Result<(), GatewayError> {
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();

    let mut router = CommandRouter::new(
        config.command_prefix.clone(),
        config.default_question_count,
        config.default_hint_interval(),
        tick_tx,
        deps.sender,
        deps.questions,
        deps.scores,
        deps.scripts,
        deps.sandboxes,
    );
    router.load_custom_commands().await;

    let mut engine = GatewayEngine::new(config.token.clone(), router);
    let mut attempts: u32 = 0;

    loop {
        engine.set_state(ConnectionState::Connecting);
        match connect_async(config.gateway_url.as_str()).await {
            Ok((stream, response)) => {
                tracing::info!(status = %response.status(), "Gateway connection opened");
                attempts = 0;

                let (sink, read) = stream.split();
                let (out_tx, out_rx) = mpsc::channel(OUTBOUND_BUFFER);
                engine.attach_connection(out_tx);
                let writer = tokio::spawn(write_loop(sink, out_rx));

                read_loop(&mut engine, read, &mut tick_rx).await;

                engine.detach_connection();
                writer.abort();
                let _ = writer.await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open gateway connection");
            }
        }

        attempts += 1;
        if attempts > config.reconnect_attempts {
            engine.set_state(ConnectionState::Terminated);
            return Err(GatewayError::ReconnectExhausted {
                attempts: config.reconnect_attempts,
            });
        }
        engine.set_state(ConnectionState::Reconnecting);
        tracing::info!(
            attempt = attempts,
            delay_ms = config.reconnect_delay.as_millis() as u64,
            "Reconnecting after delay"
        );
        tokio::time::sleep(config.reconnect_delay).await;
    }
}

/// Serialize inbound frames and game ticks onto the dispatch context
async fn read_loop(
    engine: &mut GatewayEngine,
    mut read: WsStream,
    tick_rx: &mut mpsc::UnboundedReceiver<GameTick>,
) {
    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Err(e) = engine.handle_frame(&text).await {
                        // one bad frame never tears the connection down
                        tracing::warn!(error = %e, "Skipping malformed frame");
                    }
                }
                Some(Ok(WsMessage::Binary(payload))) => {
                    tracing::warn!(len = payload.len(), "Non-text frame ignored");
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Ok(WsMessage::Close(frame))) => {
                    tracing::info!(frame = ?frame, "Server closed the connection");
                    return;
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Transport error");
                    return;
                }
                None => {
                    tracing::info!("Gateway stream ended");
                    return;
                }
            },
            Some(tick) = tick_rx.recv() => engine.handle_tick(tick).await,
        }
    }
}

/// Drain the outbound channel into the socket
async fn write_loop(mut sink: WsSink, mut rx: mpsc::Receiver<GatewayMessage>) {
    while let Some(message) = rx.recv().await {
        match message.to_json() {
            Ok(json) => {
                if sink.send(WsMessage::Text(json)).await.is_err() {
                    tracing::warn!("Write failed, stopping writer");
                    break;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not serialize outbound message"),
        }
    }
    let _ = sink.close().await;
}
