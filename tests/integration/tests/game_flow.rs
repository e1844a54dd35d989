//! Game lifecycle through the command router: hints, stop semantics, and
//! end-of-game persistence

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use integration_tests::doubles::{
    EchoSandboxFactory, FixedQuestionStore, MemoryScoreStore, MemoryScriptStore, RecordingSender,
};
use integration_tests::fixtures;
use trivia_cache::EntityCache;
use trivia_core::{QuestionStore, ScoreRecord, ScoreStore, Snowflake};
use trivia_game::GameTick;
use trivia_gateway::commands::CommandRouter;

fn build_router(
    sender: Arc<RecordingSender>,
    questions: Arc<dyn QuestionStore>,
    scores: Arc<dyn ScoreStore>,
) -> (CommandRouter, mpsc::UnboundedReceiver<GameTick>) {
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let router = CommandRouter::new(
        "`".to_string(),
        10,
        Duration::from_secs(10),
        tick_tx,
        sender,
        questions,
        scores,
        MemoryScriptStore::new(),
        Arc::new(EchoSandboxFactory),
    );
    (router, tick_rx)
}

fn seeded_cache() -> EntityCache {
    let mut cache = EntityCache::new();
    cache.apply_guild_create(&fixtures::guild(1, &[1, 2]));
    cache
}

/// Let spawned send/persist tasks run to completion
async fn flush() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

const CHANNEL: Snowflake = Snowflake::new(10);

#[tokio::test(start_paused = true)]
async fn hint_cycle_masks_reveals_then_fails_the_question() {
    let sender = RecordingSender::new();
    let (mut router, mut ticks) =
        build_router(Arc::clone(&sender), FixedQuestionStore::paris(), MemoryScoreStore::new());
    let cache = seeded_cache();

    router.route(&cache, &fixtures::message(10, 1, "`trivia 1 1")).await;
    assert!(router.has_game(CHANNEL));

    // four hint ticks plus the failure tick; the paused clock advances to
    // each armed timer automatically
    for _ in 0..5 {
        let tick = ticks.recv().await.expect("hint timer should fire");
        router.handle_tick(tick).await;
    }
    flush().await;

    let log = sender.log();
    let hints: Vec<&String> = log.iter().map(|(_, m)| m).filter(|m| m.contains("Hint:")).collect();

    // first hint is the fully masked answer
    assert!(hints[0].contains("#####"), "first hint was {}", hints[0]);
    // later hints reveal progressively (strictly fewer masked characters)
    let masked_counts: Vec<usize> = hints
        .iter()
        .map(|m| m.chars().filter(|c| *c == '#').count())
        .collect();
    assert!(masked_counts.windows(2).all(|w| w[1] < w[0]), "{masked_counts:?}");

    // the failure tick announces the case-folded answer
    assert!(log.iter().any(|(_, m)| m.contains("Question failed") && m.contains("paris")));

    // single-question game: the failure ended it
    assert!(!router.has_game(CHANNEL));
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_pending_hint_timer() {
    let sender = RecordingSender::new();
    let (mut router, mut ticks) =
        build_router(Arc::clone(&sender), FixedQuestionStore::paris(), MemoryScoreStore::new());
    let cache = seeded_cache();

    router.route(&cache, &fixtures::message(10, 1, "`trivia 5 1")).await;
    router.route(&cache, &fixtures::message(10, 1, "`s")).await;
    flush().await;

    assert!(!router.has_game(CHANNEL));
    let after_stop = sender.count();

    // no hint timer survives the stop: waiting well past several intervals
    // produces no tick
    let waited = tokio::time::timeout(Duration::from_secs(30), ticks.recv()).await;
    assert!(waited.is_err(), "a timer fired after stop");

    flush().await;
    let log = sender.log();
    assert!(log.iter().all(|(_, m)| !m.contains("Hint:")));
    assert_eq!(sender.count(), after_stop, "messages arrived after the stop reply");

    // no scores were recorded, so the summary is a plain cancellation notice
    assert!(log.iter().any(|(_, m)| m.contains("No correct answers")));
}

#[tokio::test(start_paused = true)]
async fn tick_queued_before_stop_is_dropped_after_it() {
    let sender = RecordingSender::new();
    let (mut router, mut ticks) =
        build_router(Arc::clone(&sender), FixedQuestionStore::paris(), MemoryScoreStore::new());
    let cache = seeded_cache();

    router.route(&cache, &fixtures::message(10, 1, "`trivia 5 1")).await;

    // the timer fires and its tick sits in the queue...
    let tick = ticks.recv().await.expect("hint timer should fire");

    // ...but a stop lands first in dispatch order
    router.route(&cache, &fixtures::message(10, 1, "`s")).await;
    flush().await;
    sender.take();

    router.handle_tick(tick).await;
    flush().await;
    assert!(sender.take().is_empty(), "stale tick produced output");
}

#[tokio::test(start_paused = true)]
async fn finished_game_merges_scores_into_the_store() {
    let sender = RecordingSender::new();
    let scores = MemoryScoreStore::new();
    scores.seed(ScoreRecord {
        user_id: Snowflake::new(1),
        total_score: 3,
        average_time_ms: 1000,
    });

    let (mut router, _ticks) = build_router(
        Arc::clone(&sender),
        FixedQuestionStore::paris(),
        Arc::clone(&scores) as Arc<dyn ScoreStore>,
    );
    let cache = seeded_cache();

    router.route(&cache, &fixtures::message(10, 1, "`trivia 1")).await;
    router.route(&cache, &fixtures::message(10, 1, "Paris")).await;
    flush().await;
    // the persistence merge runs off the dispatch path
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert!(!router.has_game(CHANNEL));

    let log = sender.log();
    assert!(log.iter().any(|(_, m)| m.contains("You got it!")));
    assert!(log.iter().any(|(_, m)| m.contains("Game over")));

    let merged = scores.record(Snowflake::new(1)).expect("record must exist");
    assert_eq!(merged.total_score, 4, "3 prior + 1 this session");
    // the cumulative average moved toward the (near-instant) session answer
    assert!(merged.average_time_ms < 1000);
}

#[tokio::test(start_paused = true)]
async fn new_player_gets_a_fresh_score_record() {
    let sender = RecordingSender::new();
    let scores = MemoryScoreStore::new();
    let (mut router, _ticks) = build_router(
        Arc::clone(&sender),
        FixedQuestionStore::paris(),
        Arc::clone(&scores) as Arc<dyn ScoreStore>,
    );
    let cache = seeded_cache();

    router.route(&cache, &fixtures::message(10, 2, "`trivia 1")).await;
    router.route(&cache, &fixtures::message(10, 2, "paris")).await;
    flush().await;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let record = scores.record(Snowflake::new(2)).expect("record inserted");
    assert_eq!(record.total_score, 1);
}
