use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_K_FILTER: usize = 30;
pub const DEFAULT_TOP_N_RESULT: usize = 5;
pub const DEFAULT_MAX_DESCRIPTION_CHARS: usize = 1_500;
pub const DEFAULT_MAX_RESUME_CHARS: usize = 12_000;
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 60_000;
pub const DEFAULT_RANKER_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_RANKER_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_RANKER_BACKOFF: Duration = Duration::from_secs(1);

/// Knobs for the two-stage matching pipeline.
///
/// `top_k_filter` bounds how many listings survive the embedding filter and
/// reach the reasoning model; `top_n_result` bounds what the caller gets back.
/// The character limits keep the prompt size bounded regardless of how long
/// scraped descriptions or resumes are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    top_k_filter: usize,
    top_n_result: usize,
    max_description_chars: usize,
    max_resume_chars: usize,
    max_prompt_chars: usize,
    ranker_timeout: Duration,
    ranker_max_attempts: u32,
    ranker_backoff: Duration,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k_filter: DEFAULT_TOP_K_FILTER,
            top_n_result: DEFAULT_TOP_N_RESULT,
            max_description_chars: DEFAULT_MAX_DESCRIPTION_CHARS,
            max_resume_chars: DEFAULT_MAX_RESUME_CHARS,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            ranker_timeout: DEFAULT_RANKER_TIMEOUT,
            ranker_max_attempts: DEFAULT_RANKER_MAX_ATTEMPTS,
            ranker_backoff: DEFAULT_RANKER_BACKOFF,
        }
    }
}

impl RankingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k_filter(mut self, top_k: usize) -> Self {
        self.top_k_filter = top_k;
        self
    }

    pub fn with_top_n_result(mut self, top_n: usize) -> Self {
        self.top_n_result = top_n;
        self
    }

    pub fn with_max_description_chars(mut self, chars: usize) -> Self {
        self.max_description_chars = chars;
        self
    }

    pub fn with_max_resume_chars(mut self, chars: usize) -> Self {
        self.max_resume_chars = chars;
        self
    }

    pub fn with_max_prompt_chars(mut self, chars: usize) -> Self {
        self.max_prompt_chars = chars;
        self
    }

    pub fn with_ranker_timeout(mut self, timeout: Duration) -> Self {
        self.ranker_timeout = timeout;
        self
    }

    /// At least one attempt is always made.
    pub fn with_ranker_max_attempts(mut self, attempts: u32) -> Self {
        self.ranker_max_attempts = attempts.max(1);
        self
    }

    pub fn with_ranker_backoff(mut self, backoff: Duration) -> Self {
        self.ranker_backoff = backoff;
        self
    }

    pub fn top_k_filter(&self) -> usize {
        self.top_k_filter
    }

    pub fn top_n_result(&self) -> usize {
        self.top_n_result
    }

    pub fn max_description_chars(&self) -> usize {
        self.max_description_chars
    }

    pub fn max_resume_chars(&self) -> usize {
        self.max_resume_chars
    }

    pub fn max_prompt_chars(&self) -> usize {
        self.max_prompt_chars
    }

    pub fn ranker_timeout(&self) -> Duration {
        self.ranker_timeout
    }

    pub fn ranker_max_attempts(&self) -> u32 {
        self.ranker_max_attempts
    }

    pub fn ranker_backoff(&self) -> Duration {
        self.ranker_backoff
    }
}
