use crate::ai::{AiProvider, CommandResult, SystemMetadata};
use crate::error::{CmdfyError, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Per-provider deadline in comparison mode
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Outcome of one provider in comparison mode
#[derive(Debug)]
pub struct ProviderResult {
    /// Provider name
    pub name: String,
    /// Generated pipeline, or why there is none
    pub outcome: Result<CommandResult>,
}

impl ProviderResult {
    pub fn success(name: &str, result: CommandResult) -> Self {
        Self {
            name: name.to_string(),
            outcome: Ok(result),
        }
    }

    pub fn failure(name: &str, error: CmdfyError) -> Self {
        Self {
            name: name.to_string(),
            outcome: Err(error),
        }
    }

    pub fn result(&self) -> Option<&CommandResult> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&CmdfyError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Fans one query out to several providers at once.
///
/// Every provider gets its own task and its own deadline. The engine waits
/// for all of them; a failure or timeout in one never cancels another.
pub struct ComparisonEngine {
    deadline: Duration,
}

impl ComparisonEngine {
    pub fn new() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_deadline(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `query` against every provider and collect one result per provider.
    ///
    /// Results come back in launch order; callers that need a display order
    /// sort them themselves.
    ///
    /// # Errors
    /// * `CmdfyError::NoEligibleProviders` if `providers` is empty
    pub async fn compare(
        &self,
        providers: Vec<Arc<dyn AiProvider>>,
        query: &str,
        meta: Arc<SystemMetadata>,
    ) -> Result<Vec<ProviderResult>> {
        if providers.is_empty() {
            return Err(CmdfyError::NoEligibleProviders);
        }

        let started = Instant::now();
        let query: Arc<str> = Arc::from(query);
        let deadline = self.deadline;

        info!(count = providers.len(), deadline_secs = deadline.as_secs(), "comparing providers");

        let (names, handles): (Vec<String>, Vec<_>) = providers
            .into_iter()
            .map(|provider| {
                let name = provider.name().to_string();
                let query = Arc::clone(&query);
                let meta = Arc::clone(&meta);

                let handle = tokio::spawn(async move {
                    let call_started = Instant::now();
                    let outcome = match timeout(deadline, provider.generate(&query, &meta)).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(CmdfyError::Timeout {
                            provider: provider.name().to_string(),
                            after: deadline,
                        }),
                    };

                    debug!(
                        provider = provider.name(),
                        ok = outcome.is_ok(),
                        elapsed_ms = call_started.elapsed().as_millis() as u64,
                        "provider finished"
                    );
                    outcome
                });

                (name, handle)
            })
            .unzip();

        // Join barrier: nothing is read until every task has finished.
        let joined = join_all(handles).await;

        let results: Vec<ProviderResult> = names
            .into_iter()
            .zip(joined)
            .map(|(name, joined)| match joined {
                Ok(outcome) => ProviderResult { name, outcome },
                Err(e) => {
                    warn!(provider = %name, error = %e, "provider task aborted");
                    let error = CmdfyError::generation(&name, format!("task failed: {}", e));
                    ProviderResult::failure(&name, error)
                }
            })
            .collect();

        info!(
            succeeded = results.iter().filter(|r| r.is_success()).count(),
            total = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "comparison finished"
        );

        Ok(results)
    }
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new()
    }
}
