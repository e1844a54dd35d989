//! Hint masking and reveal
//!
//! The first hint is the answer with every alphanumeric character hidden.
//! Each later hint picks, for every word that still has more than one hidden
//! character, exactly one hidden position uniformly at random and restores
//! the true character there. A word never reveals its final hidden character.

use rand::Rng;

/// Placeholder glyph for not-yet-revealed answer characters
pub const HIDE_CHAR: char = '#';

/// Build the initial fully-masked hint for an answer
///
/// Alphanumeric characters are replaced by [`HIDE_CHAR`]; spacing and
/// punctuation stay visible so the word shape reads through.
pub fn mask_answer(answer: &str) -> String {
    answer
        .chars()
        .map(|c| if c.is_alphanumeric() { HIDE_CHAR } else { c })
        .collect()
}

/// Reveal one hidden character per still-maskable word
///
/// Returns the next hint and whether anything changed. When every word is
/// down to a single hidden character nothing changes and no hint should be
/// sent.
pub fn reveal_one(hint: &str, answer: &str) -> (String, bool) {
    reveal_one_with(hint, answer, &mut rand::thread_rng())
}

/// [`reveal_one`] with an explicit RNG, for deterministic tests
pub fn reveal_one_with<R: Rng>(hint: &str, answer: &str, rng: &mut R) -> (String, bool) {
    let answer_words: Vec<Vec<char>> = answer.split(' ').map(|w| w.chars().collect()).collect();
    let mut changed = false;

    let words: Vec<String> = hint
        .split(' ')
        .enumerate()
        .map(|(word_index, word)| {
            let mut chars: Vec<char> = word.chars().collect();
            let hidden: Vec<usize> = chars
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == HIDE_CHAR)
                .map(|(i, _)| i)
                .collect();

            if hidden.len() > 1 {
                if let Some(answer_word) = answer_words.get(word_index) {
                    let pick = hidden[rng.gen_range(0..hidden.len())];
                    if let Some(&true_char) = answer_word.get(pick) {
                        chars[pick] = true_char;
                        changed = true;
                    }
                }
            }

            chars.into_iter().collect()
        })
        .collect();

    (words.join(" "), changed)
}
