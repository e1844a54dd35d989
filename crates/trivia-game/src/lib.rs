//! # trivia-game
//!
//! The per-channel trivia game engine: a state machine driven by the
//! serialized dispatch context, with a single cancellable hint-reveal timer
//! per active game, score accumulation, and an end-of-game persistence merge.

pub mod game;
pub mod hints;

pub use game::{merge_score, GameError, GameOutcome, GameTick, TickSender, TriviaGame};
pub use hints::{mask_answer, reveal_one, HIDE_CHAR};
