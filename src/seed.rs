//! Seed phrase input rules
//!
//! Validation and autocomplete for typing a mnemonic seed phrase when
//! importing a wallet, independent of any widget toolkit.

/// Inputs must be longer than this to be submittable
const MIN_SEED_CHARS: usize = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SeedError {
    #[error("Seed phrase is required")]
    Required,
}

/// Whether the current input can be submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedInputState {
    /// Contains something other than letters and spaces
    InvalidCharacters,
    /// Too short to be a seed phrase
    TooShort,
    /// Submittable
    Ready,
}

/// Result of checking the seed phrase input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAnalysis {
    pub state: SeedInputState,
    pub word_count: usize,
    /// The word being typed, used for suggestions
    pub last_word: Option<String>,
}

impl SeedAnalysis {
    pub fn can_submit(&self) -> bool {
        self.state == SeedInputState::Ready
    }
}

/// Check seed phrase input as it is typed
pub fn analyze(text: &str) -> SeedAnalysis {
    let state = if text.chars().any(|c| !(c.is_ascii_alphabetic() || c == ' ')) {
        SeedInputState::InvalidCharacters
    } else if text.chars().count() > MIN_SEED_CHARS {
        SeedInputState::Ready
    } else {
        SeedInputState::TooShort
    };

    SeedAnalysis {
        state,
        word_count: text.split_whitespace().count(),
        last_word: last_word(text).map(str::to_string),
    }
}

/// The word currently being typed: text after the final space
///
/// None for single-character input or when the text ends in whitespace.
pub fn last_word(text: &str) -> Option<&str> {
    if text.chars().count() <= 1 {
        return None;
    }
    let word = match text.rfind(' ') {
        Some(pos) => &text[pos + 1..],
        None => text,
    };
    if word.trim().is_empty() {
        None
    } else {
        Some(word)
    }
}

/// Append an accepted suggestion to the input
pub fn accept_suggestion(text: &mut String, word: &str) {
    text.push_str(word);
    text.push(' ');
}

/// Dictionary of seed words offered as suggestions
#[derive(Debug, Clone, Default)]
pub struct SuggestionList {
    words: Vec<String>,
}

impl SuggestionList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Words starting with `prefix`
    pub fn filter(&self, prefix: &str) -> Vec<&str> {
        self.words
            .iter()
            .map(String::as_str)
            .filter(|w| w.starts_with(prefix))
            .collect()
    }

    /// Suggestions for the current input: all words matching the word being
    /// typed, or the whole list when no word is being typed
    pub fn suggestions_for(&self, text: &str) -> Vec<&str> {
        match last_word(text) {
            Some(word) => self.filter(word),
            None => self.words.iter().map(String::as_str).collect(),
        }
    }
}

/// Receiver of a submitted seed phrase
///
/// `Context` is whatever the caller needs to continue the import flow.
pub trait SeedImportListener {
    type Context;

    fn on_seed(&self, mnemonic: &str, context: &Self::Context);
}

/// Submit the seed phrase to the listener
///
/// Empty input is rejected; anything else is passed through unchanged for the
/// listener to validate against the wallet.
pub fn submit<L: SeedImportListener>(
    text: &str,
    listener: &L,
    context: &L::Context,
) -> Result<(), SeedError> {
    if text.is_empty() {
        return Err(SeedError::Required);
    }
    listener.on_seed(text, context);
    Ok(())
}
