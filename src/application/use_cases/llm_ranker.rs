use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::match_parser::{parse_match_response, MatchParseError};
use super::shortlist_prompt::ShortlistPrompt;
use crate::application::ChatClient;
use crate::domain::{DomainError, MatchResult, RankingConfig};

/// Why a ranking call produced nothing usable.
#[derive(Debug, Error)]
pub enum RankFailure {
    #[error("reasoning model did not answer within {0:?}")]
    Timeout(Duration),

    #[error("reasoning model call failed: {0}")]
    Transport(#[from] DomainError),

    #[error("reasoning model response was unusable: {0}")]
    Malformed(#[from] MatchParseError),
}

/// Sends a shortlist prompt to the reasoning model and validates the answer.
///
/// Each attempt is bounded by `timeout`. Timeouts and transport errors are
/// retried up to `max_attempts` in total with exponential backoff; a malformed
/// response is not retried. Dropping the returned future cancels the
/// in-flight request.
pub struct LlmRanker {
    chat_client: Arc<dyn ChatClient>,
    timeout: Duration,
    max_attempts: u32,
    backoff: Duration,
    failures: AtomicU64,
}

impl LlmRanker {
    pub fn new(chat_client: Arc<dyn ChatClient>, config: &RankingConfig) -> Self {
        Self {
            chat_client,
            timeout: config.ranker_timeout(),
            max_attempts: config.ranker_max_attempts(),
            backoff: config.ranker_backoff(),
            failures: AtomicU64::new(0),
        }
    }

    pub fn model_name(&self) -> &str {
        self.chat_client.model_name()
    }

    /// Number of ranking calls that ended in a [`RankFailure`].
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub async fn rank(&self, prompt: &ShortlistPrompt) -> Result<Vec<MatchResult>, RankFailure> {
        let result = self.try_rank(prompt).await;
        if result.is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    async fn try_rank(&self, prompt: &ShortlistPrompt) -> Result<Vec<MatchResult>, RankFailure> {
        let raw = self.complete_with_retry(prompt).await?;
        debug!("Reasoning model raw response: {}", raw);

        let known_ids: HashSet<&str> = prompt.listing_ids().iter().map(String::as_str).collect();
        match parse_match_response(&raw, &known_ids) {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!("Unusable reasoning model response ({}): {}", e, raw);
                Err(RankFailure::Malformed(e))
            }
        }
    }

    async fn complete_with_retry(&self, prompt: &ShortlistPrompt) -> Result<String, RankFailure> {
        let mut last_failure = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = backoff_delay(self.backoff, attempt);
                warn!(
                    "Ranking attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let call = self.chat_client.complete(prompt.system(), prompt.user());
            match tokio::time::timeout(self.timeout, call).await {
                Ok(Ok(text)) => {
                    info!(
                        "Reasoning model {} answered on attempt {}",
                        self.model_name(),
                        attempt + 1
                    );
                    return Ok(text);
                }
                Ok(Err(e)) => {
                    warn!("Reasoning model call failed: {}", e);
                    last_failure = Some(RankFailure::Transport(e));
                }
                Err(_) => {
                    warn!("Reasoning model timed out after {:?}", self.timeout);
                    last_failure = Some(RankFailure::Timeout(self.timeout));
                }
            }
        }

        Err(last_failure.unwrap_or(RankFailure::Timeout(self.timeout)))
    }
}

/// Delay before retry number `attempt` (1-based): `base`, then doubling.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::ShortlistPromptBuilder;
    use crate::domain::{Listing, RawListing};

    /// Replays scripted responses, one per call; the last one repeats.
    struct ScriptedChat {
        responses: Mutex<Vec<Result<String, String>>>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedChat {
        fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::new(vec![Ok("[]".to_string())])
            }
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChat {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut responses = self.responses.lock().unwrap();
            let next = if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses[0].clone()
            };
            next.map_err(DomainError::reasoning)
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn prompt_for(listings: &[Listing]) -> ShortlistPrompt {
        let refs: Vec<&Listing> = listings.iter().collect();
        ShortlistPromptBuilder::new(&RankingConfig::default()).build("resume", &refs)
    }

    fn listing(title: &str) -> Listing {
        Listing::from_raw(&RawListing::new(title, "Acme", "", format!("https://a.b/{title}")))
    }

    fn fast_config() -> RankingConfig {
        RankingConfig::default()
            .with_ranker_backoff(Duration::ZERO)
            .with_ranker_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_rank_returns_validated_results() {
        let listings = vec![listing("a")];
        let response = format!(
            r#"[{{"job_id":"{}","match_score":77,"reason":"fit"}}]"#,
            listings[0].id()
        );
        let chat = Arc::new(ScriptedChat::new(vec![Ok(response)]));
        let ranker = LlmRanker::new(chat, &fast_config());

        let results = ranker.rank(&prompt_for(&listings)).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score(), 77);
        assert_eq!(ranker.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_errors_are_retried() {
        let chat = Arc::new(ScriptedChat::new(vec![
            Err("connection reset".to_string()),
            Ok("[]".to_string()),
        ]));
        let ranker = LlmRanker::new(chat.clone(), &fast_config().with_ranker_max_attempts(3));

        let results = ranker.rank(&prompt_for(&[listing("a")])).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(chat.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail() {
        let chat = Arc::new(ScriptedChat::new(vec![Err("down".to_string())]));
        let ranker = LlmRanker::new(chat.clone(), &fast_config().with_ranker_max_attempts(2));

        let err = ranker.rank(&prompt_for(&[listing("a")])).await.unwrap_err();

        assert!(matches!(err, RankFailure::Transport(_)));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 2);
        assert_eq!(ranker.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_retried() {
        let chat = Arc::new(ScriptedChat::new(vec![Ok("I think job A is best".to_string())]));
        let ranker = LlmRanker::new(chat.clone(), &fast_config().with_ranker_max_attempts(3));

        let err = ranker.rank(&prompt_for(&[listing("a")])).await.unwrap_err();

        assert!(matches!(err, RankFailure::Malformed(_)));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        assert_eq!(backoff_delay(Duration::from_secs(1), 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(Duration::from_secs(1), 3), Duration::from_secs(4));
        assert_eq!(backoff_delay(Duration::MAX, 2), Duration::MAX);
        assert_eq!(backoff_delay(Duration::from_secs(u64::MAX / 2), 40), Duration::MAX);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let chat = Arc::new(ScriptedChat::slow(Duration::from_secs(10)));
        let config = fast_config()
            .with_ranker_timeout(Duration::from_millis(20))
            .with_ranker_max_attempts(1);
        let ranker = LlmRanker::new(chat, &config);

        let err = ranker.rank(&prompt_for(&[listing("a")])).await.unwrap_err();

        assert!(matches!(err, RankFailure::Timeout(_)));
    }
}
