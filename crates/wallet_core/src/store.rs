use anyhow::Result;
use async_trait::async_trait;
use storage::Storage;
use tokio::sync::Mutex;

use crate::mnemonic::RecoveryPhrase;

const MNEMONIC_KEY: &str = "wallet.mnemonic";

/// Client-side persistence for the single recovery phrase.
#[async_trait]
pub trait PhraseStore: Send + Sync {
    async fn load_phrase(&self) -> Result<Option<RecoveryPhrase>>;
    async fn save_phrase(&self, phrase: &RecoveryPhrase) -> Result<()>;
    async fn clear_phrase(&self) -> Result<()>;
}

#[async_trait]
impl PhraseStore for Storage {
    async fn load_phrase(&self) -> Result<Option<RecoveryPhrase>> {
        let Some(raw) = self.get_value(MNEMONIC_KEY).await? else {
            return Ok(None);
        };
        match RecoveryPhrase::parse(&raw) {
            Ok(phrase) => Ok(Some(phrase)),
            Err(err) => {
                tracing::warn!("discarding unreadable stored recovery phrase: {err}");
                self.delete_value(MNEMONIC_KEY).await?;
                Ok(None)
            }
        }
    }

    async fn save_phrase(&self, phrase: &RecoveryPhrase) -> Result<()> {
        self.put_value(MNEMONIC_KEY, phrase.expose()).await
    }

    async fn clear_phrase(&self) -> Result<()> {
        self.delete_value(MNEMONIC_KEY).await?;
        Ok(())
    }
}

/// Process-local store, for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryPhraseStore {
    phrase: Mutex<Option<RecoveryPhrase>>,
}

impl MemoryPhraseStore {
    pub fn with_phrase(phrase: RecoveryPhrase) -> Self {
        Self {
            phrase: Mutex::new(Some(phrase)),
        }
    }
}

#[async_trait]
impl PhraseStore for MemoryPhraseStore {
    async fn load_phrase(&self) -> Result<Option<RecoveryPhrase>> {
        Ok(self.phrase.lock().await.clone())
    }

    async fn save_phrase(&self, phrase: &RecoveryPhrase) -> Result<()> {
        *self.phrase.lock().await = Some(phrase.clone());
        Ok(())
    }

    async fn clear_phrase(&self) -> Result<()> {
        self.phrase.lock().await.take();
        Ok(())
    }
}
