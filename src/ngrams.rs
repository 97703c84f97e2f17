//! Normalization and 3-gram extraction over commit messages
//!
//! This is the only algorithmic part of the pipeline, and it is a pure
//! function over a single commit message. It can therefore be applied across
//! commits in any order with no synchronization, which the parallel row
//! extraction pass relies on.

/// Number of words per gram
const GRAM_WORDS: usize = 3;

/// Number of overlapping gram windows taken from the start of the message
///
/// Only the windows at token offsets 0, 1 and 2 are produced, no matter how
/// many more tokens the message has. Longer messages do not yield more
/// windows, they only provide more context for the third one.
const NUM_WINDOWS: usize = 3;

/// Minimum token count for a message to qualify
///
/// The last window starts at token offset `NUM_WINDOWS - 1` and spans
/// `GRAM_WORDS` tokens, so this many tokens is exactly enough.
pub const MIN_TOKENS: usize = NUM_WINDOWS - 1 + GRAM_WORDS;

/// Separator used when joining the words of a gram
const GRAM_DELIMITER: &str = " ";

/// The three overlapping 3-grams taken from the start of a commit message
pub type ThreeGrams = [Box<str>; NUM_WINDOWS];

/// Extract the leading 3-grams of a commit message
///
/// The message is stripped of punctuation, lowercased and split into words.
/// Returns `None` when fewer than [`MIN_TOKENS`] words remain, in which case
/// the commit contributes no output row.
pub fn three_grams(message: &str) -> Option<ThreeGrams> {
    let normalized = normalize(message);
    let words = tokenize(&normalized);
    if words.len() < MIN_TOKENS {
        return None;
    }
    Some(std::array::from_fn(|offset| {
        words[offset..offset + GRAM_WORDS]
            .join(GRAM_DELIMITER)
            .into_boxed_str()
    }))
}

/// Strip punctuation from a raw commit message and lowercase it
///
/// Characters that are neither ASCII whitespace, nor a letter from any
/// script, nor an ASCII digit are removed. This discards punctuation marks,
/// symbols and emoji while preserving words in all languages. Newlines are
/// then removed outright rather than kept as separators, so a word that a
/// commit message wraps across two lines fuses into a single token.
fn normalize(message: &str) -> String {
    message
        .chars()
        .filter(|&c| is_word_or_space(c))
        .filter(|&c| c != '\n')
        .collect::<String>()
        .to_lowercase()
}

/// Truth that a character survives punctuation stripping
fn is_word_or_space(c: char) -> bool {
    is_ascii_space(c) || c.is_alphabetic() || c.is_ascii_digit()
}

/// ASCII whitespace: space, tab, line feed, vertical tab, form feed, CR
///
/// Notably excludes the Unicode-only whitespace characters, which are
/// stripped along with punctuation.
fn is_ascii_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Split a normalized message into words
///
/// This is a literal split on the single ASCII space character, not a
/// whitespace-collapsing split: runs of spaces produce empty fragments, and
/// fragments made of other whitespace can appear. Both kinds of blank
/// fragment are dropped, preserving the relative order of the real words.
fn tokenize(normalized: &str) -> Vec<&str> {
    normalized
        .split(' ')
        .filter(|word| !word.trim().is_empty())
        .collect()
}
