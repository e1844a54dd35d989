//! The per-channel game state machine
//!
//! A game lives in the channel-keyed active-games map and is only ever
//! touched from the serialized dispatch context. Its hint timer is a single
//! cancellable task that does nothing but sleep and enqueue an epoch-tagged
//! tick back into that context; a tick whose epoch no longer matches the
//! game's is stale and ignored.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use trivia_core::{MessageSender, Question, QuestionStore, ScoreRecord, ScoreStore, Snowflake};

use crate::hints;

/// Hints revealed per question before the answer is announced
const HINT_LIMIT: u8 = 4;

/// Timer wake-up delivered through the dispatch queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTick {
    pub channel_id: Snowflake,
    pub epoch: u64,
}

/// Sender half of the dispatch queue's tick channel
pub type TickSender = mpsc::UnboundedSender<GameTick>;

/// Whether the game survives the event that was just handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    InProgress,
    Finished,
}

/// Errors fatal to a single game instance (never to the process)
#[derive(Debug, Error)]
pub enum GameError {
    #[error("question store failed: {0}")]
    Store(#[from] trivia_core::StoreError),

    #[error("drawn question has no usable answers")]
    NoAnswers,
}

/// The question currently on the table
struct CurrentQuestion {
    /// Case-folded accepted answers
    answers: HashSet<String>,
    /// First accepted answer; drives the hint mask
    primary: String,
    /// Masked hint state, empty until the first hint fires
    hint: String,
    hints_given: u8,
    started: Instant,
}

/// One trivia game bound to one channel
pub struct TriviaGame {
    channel_id: Snowflake,
    total_questions: u32,
    hint_interval: std::time::Duration,
    questions_asked: u32,
    current: Option<CurrentQuestion>,
    scores: HashMap<Snowflake, u64>,
    average_times: HashMap<Snowflake, u64>,
    /// Bumped whenever the question changes or the game stops; stale ticks
    /// carry an older value and are dropped
    epoch: u64,
    hint_timer: Option<JoinHandle<()>>,
    ticks: TickSender,
    sender: Arc<dyn MessageSender>,
    questions: Arc<dyn QuestionStore>,
    score_store: Arc<dyn ScoreStore>,
}

impl TriviaGame {
    pub fn new(
        channel_id: Snowflake,
        total_questions: u32,
        hint_interval: std::time::Duration,
        ticks: TickSender,
        sender: Arc<dyn MessageSender>,
        questions: Arc<dyn QuestionStore>,
        score_store: Arc<dyn ScoreStore>,
    ) -> Self {
        Self {
            channel_id,
            total_questions,
            hint_interval,
            questions_asked: 0,
            current: None,
            scores: HashMap::new(),
            average_times: HashMap::new(),
            epoch: 0,
            hint_timer: None,
            ticks,
            sender,
            questions,
            score_store,
        }
    }

    pub fn channel_id(&self) -> Snowflake {
        self.channel_id
    }

    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub fn score(&self, user_id: Snowflake) -> u64 {
        self.scores.get(&user_id).copied().unwrap_or(0)
    }

    pub fn average_time_ms(&self, user_id: Snowflake) -> Option<u64> {
        self.average_times.get(&user_id).copied()
    }

    /// The masked hint for the current question, if one has been revealed
    pub fn current_hint(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|q| !q.hint.is_empty())
            .map(|q| q.hint.as_str())
    }

    /// Ask the first question; an error here ends the game before it starts
    pub async fn begin(&mut self) -> Result<(), GameError> {
        self.next_question().await
    }

    /// Handle a hint-timer wake-up delivered through the dispatch queue
    pub async fn on_tick(&mut self, epoch: u64) -> GameOutcome {
        if epoch != self.epoch {
            tracing::trace!(channel_id = %self.channel_id, "Stale hint tick dropped");
            return GameOutcome::InProgress;
        }
        let Some(question) = self.current.as_mut() else {
            return GameOutcome::InProgress;
        };

        if question.hints_given < HINT_LIMIT {
            let (next_hint, changed) = if question.hints_given == 0 {
                (hints::mask_answer(&question.primary), true)
            } else {
                hints::reveal_one(&question.hint, &question.primary)
            };
            question.hint = next_hint;
            question.hints_given += 1;

            if changed {
                let hint = question.hint.clone();
                self.post(format!(":small_orange_diamond: Hint: **`{hint}`**"));
            }
            self.arm_hint_timer();
            GameOutcome::InProgress
        } else {
            // hint budget exhausted; this wake-up announces the answer
            let answer = question.primary.clone();
            self.post(format!(
                ":exclamation: Question failed. Answer: **`{answer}`**"
            ));
            self.advance_or_finish().await
        }
    }

    /// Evaluate a candidate answer from a channel message
    pub async fn handle_answer(&mut self, user_id: Snowflake, content: &str) -> GameOutcome {
        let folded = content.trim().to_lowercase();
        let Some(question) = self.current.as_ref() else {
            return GameOutcome::InProgress;
        };
        if !question.answers.contains(&folded) {
            return GameOutcome::InProgress;
        }

        // correct: silence the timer before touching any state it captured
        self.cancel_hint_timer().await;

        let elapsed_ms = self
            .current
            .as_ref()
            .map_or(0, |q| q.started.elapsed().as_millis() as u64);
        self.record_correct_answer(user_id, elapsed_ms);

        self.post(format!(
            ":heavy_check_mark: <@!{user_id}> You got it! ({:.3} seconds)",
            elapsed_ms as f64 / 1000.0
        ));

        self.advance_or_finish().await
    }

    /// Stop the game immediately (user command)
    pub async fn stop(&mut self) {
        self.cancel_hint_timer().await;
        self.epoch += 1;
        self.current = None;
        self.finish().await;
    }

    /// Record a correct answer: bump the score and fold the elapsed time
    /// into the running average `avg' = (avg * (n - 1) + elapsed) / n`
    pub fn record_correct_answer(&mut self, user_id: Snowflake, elapsed_ms: u64) {
        let score = self.scores.entry(user_id).or_insert(0);
        *score += 1;
        let n = *score;

        let average = self.average_times.entry(user_id).or_insert(0);
        *average = if n == 1 {
            elapsed_ms
        } else {
            (*average * (n - 1) + elapsed_ms) / n
        };
    }

    async fn next_question(&mut self) -> Result<(), GameError> {
        self.cancel_hint_timer().await;
        self.epoch += 1;

        let question = self.questions.random_question().await?;
        let accepted = question.accepted_answers();
        let Some(primary) = accepted.first().cloned() else {
            return Err(GameError::NoAnswers);
        };

        self.questions_asked += 1;
        self.post(format_question(
            self.questions_asked,
            self.total_questions,
            &question,
        ));

        self.current = Some(CurrentQuestion {
            answers: accepted.into_iter().collect(),
            primary,
            hint: String::new(),
            hints_given: 0,
            started: Instant::now(),
        });
        self.arm_hint_timer();
        Ok(())
    }

    async fn advance_or_finish(&mut self) -> GameOutcome {
        self.current = None;
        if self.questions_asked < self.total_questions {
            match self.next_question().await {
                Ok(()) => GameOutcome::InProgress,
                Err(e) => {
                    tracing::error!(
                        channel_id = %self.channel_id,
                        error = %e,
                        "Question draw failed, ending game"
                    );
                    self.finish().await;
                    GameOutcome::Finished
                }
            }
        } else {
            self.finish().await;
            GameOutcome::Finished
        }
    }

    /// Send the end-of-game summary and merge session scores into the store
    async fn finish(&mut self) {
        if self.scores.is_empty() {
            self.post(":red_circle: Game stopped. No correct answers were recorded.".to_string());
            return;
        }

        // sort participants by score, highest first
        let mut standings: Vec<(Snowflake, u64)> =
            self.scores.iter().map(|(&u, &s)| (u, s)).collect();
        standings.sort_by(|a, b| b.1.cmp(&a.1));

        let mut message = format!(
            ":red_circle: **({}/{})** Game over! **Scores:**\n",
            self.questions_asked, self.total_questions
        );
        for (user_id, score) in &standings {
            let average = self.average_times.get(user_id).copied().unwrap_or(0);
            message.push_str(&format!(
                ":small_blue_diamond: <@!{user_id}>: {score} (Avg: {:.3} seconds)\n",
                average as f64 / 1000.0
            ));
        }
        self.post(message);

        self.persist_scores();
    }

    /// Merge this session into the persistent records off the dispatch path
    fn persist_scores(&self) {
        let session: Vec<ScoreRecord> = self
            .scores
            .iter()
            .map(|(&user_id, &total_score)| ScoreRecord {
                user_id,
                total_score,
                average_time_ms: self.average_times.get(&user_id).copied().unwrap_or(0),
            })
            .collect();
        let store = Arc::clone(&self.score_store);
        let channel_id = self.channel_id;

        tokio::spawn(async move {
            for record in session {
                let result = match store.get(record.user_id).await {
                    Ok(Some(prior)) => store.update(&merge_score(&prior, &record)).await,
                    Ok(None) => store.insert(&record).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    tracing::warn!(
                        channel_id = %channel_id,
                        user_id = %record.user_id,
                        error = %e,
                        "Score merge failed"
                    );
                }
            }
        });
    }

    fn arm_hint_timer(&mut self) {
        if let Some(handle) = self.hint_timer.take() {
            handle.abort();
        }
        let ticks = self.ticks.clone();
        let tick = GameTick {
            channel_id: self.channel_id,
            epoch: self.epoch,
        };
        let delay = self.hint_interval;
        self.hint_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = ticks.send(tick);
        }));
    }

    /// Abort the pending hint timer and wait for the cancellation to land
    async fn cancel_hint_timer(&mut self) {
        if let Some(handle) = self.hint_timer.take() {
            handle.abort();
            let _ = handle.await;
        }
    }

    fn post(&self, content: String) {
        let sender = Arc::clone(&self.sender);
        let channel_id = self.channel_id;
        tokio::spawn(async move {
            if let Err(e) = sender.send_message(channel_id, &content).await {
                tracing::warn!(channel_id = %channel_id, error = %e, "Message delivery failed");
            }
        });
    }
}

impl std::fmt::Debug for TriviaGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriviaGame")
            .field("channel_id", &self.channel_id)
            .field("questions_asked", &self.questions_asked)
            .field("total_questions", &self.total_questions)
            .field("participants", &self.scores.len())
            .finish()
    }
}

fn format_question(asked: u32, total: u32, question: &Question) -> String {
    format!(
        ":question: **({asked}/{total})** [{}] **{}**",
        question.category, question.text
    )
}

/// Fold a finished session into a prior persisted record
///
/// `new_avg = (prior_total * prior_avg + session_total * session_avg)
///            / (prior_total + session_total)`
pub fn merge_score(prior: &ScoreRecord, session: &ScoreRecord) -> ScoreRecord {
    let total = prior.total_score + session.total_score;
    let weighted = prior.total_score * prior.average_time_ms
        + session.total_score * session.average_time_ms;
    ScoreRecord {
        user_id: prior.user_id,
        total_score: total,
        average_time_ms: if total == 0 { 0 } else { weighted / total },
    }
}
