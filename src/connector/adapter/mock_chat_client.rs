use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use serde_json::json;

use crate::application::ChatClient;
use crate::domain::DomainError;

const JOB_ID_PREFIX: &str = "Job ID: ";

/// Offline stand-in for the reasoning model.
///
/// Picks up every `Job ID:` line in the prompt, gives each a score derived
/// from a hash of the prompt and the identifier, and answers with a fenced
/// JSON array of the best `TOP N` of them. Same prompt, same answer.
pub struct MockChatClient;

impl MockChatClient {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

fn requested_top_n(prompt: &str) -> Option<usize> {
    let rest = &prompt[prompt.find("TOP ")? + 4..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn score_for(prompt_hash: u64, job_id: &str) -> u8 {
    let mut hasher = DefaultHasher::new();
    prompt_hash.hash(&mut hasher);
    job_id.hash(&mut hasher);
    (hasher.finish() % 101) as u8
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, DomainError> {
        let prompt_hash = {
            let mut hasher = DefaultHasher::new();
            user.hash(&mut hasher);
            hasher.finish()
        };

        let mut scored: Vec<(&str, u8)> = user
            .lines()
            .filter_map(|line| line.strip_prefix(JOB_ID_PREFIX))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| (id, score_for(prompt_hash, id)))
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(n) = requested_top_n(user) {
            scored.truncate(n);
        }

        let entries: Vec<_> = scored
            .into_iter()
            .map(|(id, score)| {
                json!({
                    "job_id": id,
                    "match_score": score,
                    "reason": format!("Mock assessment scored this posting {score}/100."),
                })
            })
            .collect();

        let body = serde_json::to_string_pretty(&entries)
            .map_err(|e| DomainError::internal(format!("Failed to encode mock response: {}", e)))?;
        Ok(format!("```json\n{body}\n```"))
    }

    fn model_name(&self) -> &str {
        "mock-chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "Return the TOP 2 matches.\n\n\
        Job ID: a\nTitle: A\n\n\
        Job ID: b\nTitle: B\n\n\
        Job ID: c\nTitle: C\n";

    #[tokio::test]
    async fn test_mock_chat_is_deterministic() {
        let client = MockChatClient::new();
        let first = client.complete("s", PROMPT).await.unwrap();
        let second = client.complete("s", PROMPT).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_mock_chat_answers_only_with_prompt_ids() {
        let client = MockChatClient::new();
        let raw = client.complete("s", PROMPT).await.unwrap();
        let body = raw
            .trim_start_matches("```json\n")
            .trim_end_matches("\n```");
        let entries: Vec<serde_json::Value> = serde_json::from_str(body).unwrap();

        assert_eq!(entries.len(), 2);
        for entry in &entries {
            let id = entry["job_id"].as_str().unwrap();
            assert!(["a", "b", "c"].contains(&id));
            assert!(entry["match_score"].as_u64().unwrap() <= 100);
        }
    }

    #[test]
    fn test_requested_top_n() {
        assert_eq!(requested_top_n("return the TOP 5 matches"), Some(5));
        assert_eq!(requested_top_n("no limit here"), None);
    }
}
