//! Intent classification and fan-out to per-topic specialists.
//!
//! A [`Classifier`] labels a free-text query with a comma-separated list of
//! topic tokens. The [`Dispatcher`] normalizes those tokens, calls the
//! [`Specialist`] bound to each recognized topic and returns one
//! [`DispatchEntry`] per token, in the order the classifier produced them.

use async_trait::async_trait;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SkillHubError};

#[cfg(test)]
use mockall::automock;

/// Labels a query with zero or more comma-separated topic tokens
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, query: &str) -> Result<String>;
}

/// Answers a query on behalf of one topic
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Specialist: Send + Sync {
    async fn answer(&self, topic: &str, query: &str) -> Result<String>;
}

/// A routable label, stored lower-cased
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEntry {
    Answer { topic: Topic, text: String },
    /// The specialist for `topic` failed; the rest of the dispatch went on
    Failed { topic: Topic, reason: String },
    Unrecognized { token: String },
}

impl DispatchEntry {
    /// The classifier token this entry was produced for
    pub fn token(&self) -> &str {
        match self {
            DispatchEntry::Answer { topic, .. } | DispatchEntry::Failed { topic, .. } => {
                topic.as_str()
            }
            DispatchEntry::Unrecognized { token } => token,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    #[default]
    Sequential,
    /// Specialist calls run together; results keep classifier order
    Concurrent,
}

/// Split a classifier reply into normalized tokens.
///
/// Tokens are trimmed and lower-cased. Every comma-separated piece yields a
/// token, so an empty reply gives one empty token. Duplicates are kept.
pub fn parse_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| token.trim().to_lowercase())
        .collect()
}

pub struct Dispatcher {
    classifier: Arc<dyn Classifier>,
    bindings: Vec<(Topic, Arc<dyn Specialist>)>,
    mode: DispatchMode,
}

impl Dispatcher {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            bindings: Vec::new(),
            mode: DispatchMode::default(),
        }
    }

    /// Bind `specialist` to `topic`. Binding the same specialist to several
    /// topics forms a fallback group.
    pub fn bind(mut self, topic: &str, specialist: Arc<dyn Specialist>) -> Self {
        let topic = Topic::new(topic);
        self.bindings.retain(|(t, _)| *t != topic);
        self.bindings.push((topic, specialist));
        self
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.bindings.iter().map(|(t, _)| t)
    }

    fn specialist_for(&self, token: &str) -> Option<(&Topic, &Arc<dyn Specialist>)> {
        self.bindings
            .iter()
            .find(|(t, _)| t.as_str() == token)
            .map(|(t, s)| (t, s))
    }

    pub async fn dispatch(&self, query: &str) -> Result<Vec<DispatchEntry>> {
        let raw = self.classifier.classify(query).await.map_err(|e| {
            tracing::warn!("Classifier failed for query '{}': {}", query, e);
            SkillHubError::classification(e)
        })?;

        let tokens = parse_topics(&raw);
        tracing::info!("Classified query '{}' as [{}]", query, tokens.join(", "));

        match self.mode {
            DispatchMode::Sequential => {
                let mut entries = Vec::with_capacity(tokens.len());
                for token in &tokens {
                    entries.push(self.resolve(token, query).await);
                }
                Ok(entries)
            }
            DispatchMode::Concurrent => {
                Ok(join_all(tokens.iter().map(|token| self.resolve(token, query))).await)
            }
        }
    }

    async fn resolve(&self, token: &str, query: &str) -> DispatchEntry {
        let Some((topic, specialist)) = self.specialist_for(token) else {
            tracing::warn!("Unrecognized topic token: '{}'", token);
            return DispatchEntry::Unrecognized {
                token: token.to_string(),
            };
        };

        match specialist.answer(topic.as_str(), query).await {
            Ok(text) => DispatchEntry::Answer {
                topic: topic.clone(),
                text,
            },
            Err(e) => {
                tracing::warn!("Specialist for '{}' failed: {}", topic, e);
                DispatchEntry::Failed {
                    topic: topic.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
