use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

pub const GENERATED_WORD_COUNT: usize = 24;
const ACCEPTED_WORD_COUNTS: [usize; 2] = [12, 24];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhraseError {
    #[error("expected 12 or 24 words, got {0}")]
    WrongWordCount(usize),
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
    #[error("invalid mnemonic: {0}")]
    Invalid(String),
}

/// A recovery phrase held in memory that is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoveryPhrase(Zeroizing<String>);

impl RecoveryPhrase {
    pub fn generate() -> Result<Self, PhraseError> {
        let mut entropy = Zeroizing::new([0u8; 32]);
        getrandom::getrandom(&mut *entropy).map_err(|e| PhraseError::Entropy(e.to_string()))?;
        let mnemonic = bip39::Mnemonic::from_entropy(&*entropy)
            .map_err(|e| PhraseError::Invalid(e.to_string()))?;
        Ok(Self(Zeroizing::new(mnemonic.to_string())))
    }

    /// Normalizes whitespace and case, then checks the word count only.
    /// Checksum validation is left to the engine.
    pub fn parse(input: &str) -> Result<Self, PhraseError> {
        let normalized = Zeroizing::new(
            input
                .split_whitespace()
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join(" "),
        );
        let count = normalized.split(' ').filter(|word| !word.is_empty()).count();
        if !ACCEPTED_WORD_COUNTS.contains(&count) {
            return Err(PhraseError::WrongWordCount(count));
        }
        Ok(Self(normalized))
    }

    pub fn has_valid_checksum(&self) -> bool {
        bip39::Mnemonic::parse_normalized(&self.0).is_ok()
    }

    pub fn words(&self) -> Vec<&str> {
        self.0.split(' ').collect()
    }

    pub fn word_count(&self) -> usize {
        self.words().len()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoveryPhrase([{} words redacted])", self.word_count())
    }
}
