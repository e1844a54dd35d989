//! End-to-end dispatch: raw frames through the protocol engine into the
//! cache, router, game, and back out through the sender

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use integration_tests::doubles::{
    EchoSandboxFactory, FixedQuestionStore, MemoryScoreStore, MemoryScriptStore, RecordingSender,
};
use trivia_core::Snowflake;
use trivia_gateway::commands::CommandRouter;
use trivia_gateway::engine::{ConnectionState, GatewayEngine};
use trivia_gateway::protocol::OpCode;

fn frame(value: serde_json::Value) -> String {
    value.to_string()
}

fn dispatch(t: &str, s: u64, d: serde_json::Value) -> String {
    frame(serde_json::json!({"op": 0, "t": t, "s": s, "d": d}))
}

async fn flush() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

async fn build_engine(
    sender: Arc<RecordingSender>,
) -> (GatewayEngine, mpsc::Receiver<trivia_gateway::protocol::GatewayMessage>) {
    let (tick_tx, _tick_rx) = mpsc::unbounded_channel();
    let mut router = CommandRouter::new(
        "`".to_string(),
        10,
        Duration::from_secs(10),
        tick_tx,
        sender,
        FixedQuestionStore::paris(),
        MemoryScoreStore::new(),
        MemoryScriptStore::with_script(Snowflake::new(100), "greet", "reply()"),
        Arc::new(EchoSandboxFactory),
    );
    router.load_custom_commands().await;
    let mut engine = GatewayEngine::new("test-token".to_string(), router);
    let (out_tx, out_rx) = mpsc::channel(16);
    engine.attach_connection(out_tx);
    (engine, out_rx)
}

#[tokio::test(start_paused = true)]
async fn full_session_from_hello_to_game_over() {
    let sender = RecordingSender::new();
    let (mut engine, mut out_rx) = build_engine(Arc::clone(&sender)).await;

    // Hello: heartbeat starts, identify goes out
    engine
        .handle_frame(&frame(serde_json::json!({"op": 10, "d": {"heartbeat_interval": 41250}})))
        .await
        .unwrap();
    assert_eq!(engine.state(), ConnectionState::Identifying);
    assert_eq!(out_rx.recv().await.unwrap().op, OpCode::Identify);

    // READY and GUILD_CREATE populate the cache
    engine
        .handle_frame(&dispatch(
            "READY",
            1,
            serde_json::json!({"user": {"id": "9", "username": "quizbot", "discriminator": "0009", "bot": true}}),
        ))
        .await
        .unwrap();
    assert_eq!(engine.state(), ConnectionState::Active);

    engine
        .handle_frame(&dispatch(
            "GUILD_CREATE",
            2,
            serde_json::json!({
                "id": "100", "name": "Home", "owner_id": "1",
                "channels": [{"id": "10", "name": "general", "type": "text"}],
                "members": [{"user": {"id": "1", "username": "alice", "discriminator": "0001"}}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(engine.cache().guild_count(), 1);

    // a chat command starts a one-question game
    engine
        .handle_frame(&dispatch(
            "MESSAGE_CREATE",
            3,
            serde_json::json!({
                "channel_id": "10", "content": "`trivia 1",
                "author": {"id": "1", "username": "alice", "discriminator": "0001"}
            }),
        ))
        .await
        .unwrap();

    // a wrong answer changes nothing, the right one ends the game
    engine
        .handle_frame(&dispatch(
            "MESSAGE_CREATE",
            4,
            serde_json::json!({
                "channel_id": "10", "content": "London",
                "author": {"id": "1", "username": "alice", "discriminator": "0001"}
            }),
        ))
        .await
        .unwrap();
    engine
        .handle_frame(&dispatch(
            "MESSAGE_CREATE",
            5,
            serde_json::json!({
                "channel_id": "10", "content": "Paris",
                "author": {"id": "1", "username": "alice", "discriminator": "0001"}
            }),
        ))
        .await
        .unwrap();
    flush().await;

    assert_eq!(engine.last_seq(), 5);

    let log = sender.log();
    assert!(log.iter().any(|(_, m)| m.contains("Capital") || m.contains("capital")));
    assert!(log.iter().any(|(_, m)| m.contains("You got it!")));
    assert!(log.iter().any(|(_, m)| m.contains("Game over")));
    // everything went to the game channel
    assert!(log.iter().all(|(c, _)| *c == Snowflake::new(10)));
}

#[tokio::test(start_paused = true)]
async fn malformed_frames_do_not_disturb_a_session() {
    let sender = RecordingSender::new();
    let (mut engine, _out_rx) = build_engine(Arc::clone(&sender)).await;

    engine
        .handle_frame(&dispatch(
            "GUILD_CREATE",
            1,
            serde_json::json!({"id": "100", "name": "Home", "owner_id": "1"}),
        ))
        .await
        .unwrap();

    // garbage, missing fields, unknown ops - all logged-and-skipped
    assert!(engine.handle_frame("garbage").await.is_err());
    assert!(engine.handle_frame(r#"{"op":0,"d":{}}"#).await.is_err());
    engine.handle_frame(r#"{"op":7}"#).await.unwrap();

    // the session carries on
    engine
        .handle_frame(&dispatch(
            "CHANNEL_CREATE",
            2,
            serde_json::json!({"id": "11", "guild_id": "100", "name": "news", "type": "text"}),
        ))
        .await
        .unwrap();
    assert_eq!(engine.cache().channel_count(), 1);
    assert_eq!(engine.last_seq(), 2);
}

#[tokio::test(start_paused = true)]
async fn custom_command_round_trip_through_the_sandbox() {
    let sender = RecordingSender::new();
    let (mut engine, _out_rx) = build_engine(Arc::clone(&sender)).await;

    engine
        .handle_frame(&dispatch(
            "GUILD_CREATE",
            1,
            serde_json::json!({
                "id": "100", "name": "Home", "owner_id": "1",
                "channels": [{"id": "10", "name": "general", "type": "text"}],
                "members": [{"user": {"id": "1", "username": "alice", "discriminator": "0001"}}]
            }),
        ))
        .await
        .unwrap();

    engine
        .handle_frame(&dispatch(
            "MESSAGE_CREATE",
            2,
            serde_json::json!({
                "channel_id": "10", "content": "`greet there",
                "author": {"id": "1", "username": "alice", "discriminator": "0001"}
            }),
        ))
        .await
        .unwrap();
    flush().await;

    let log = sender.log();
    assert!(
        log.iter().any(|(_, m)| m.contains("ran `reply()` with args `there`")),
        "{log:?}"
    );
}
