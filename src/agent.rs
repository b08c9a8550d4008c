use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::dispatch::{Classifier, Specialist};
use crate::error::{Result, SkillHubError};
use crate::models::{ChatMessage, ChatRequest};
use crate::transport::Transport;

/// A named system prompt bound to a model, answering one input at a time
pub struct Agent {
    name: String,
    instructions: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    tx: Arc<dyn Transport>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        tx: Arc<dyn Transport>,
        llm: &LlmConfig,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: llm.model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            tx,
        }
    }

    pub async fn run(&self, input: &str) -> Result<String> {
        tracing::debug!("Running agent '{}' on: {}", self.name, input);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.instructions.clone()),
                ChatMessage::user(input),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.tx.chat(&request).await?;

        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.trim().to_string()),
            None => Err(SkillHubError::EmptyCompletion),
        }
    }
}

#[async_trait]
impl Classifier for Agent {
    async fn classify(&self, query: &str) -> Result<String> {
        self.run(query).await
    }
}

#[async_trait]
impl Specialist for Agent {
    async fn answer(&self, _topic: &str, query: &str) -> Result<String> {
        self.run(query).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::error::{Result, SkillHubError};
    use crate::models::{ChatMessage, ChatRequest, ChatResponse, Choice};
    use crate::transport::Transport;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned replies in order and records every request it sees
    pub(crate) struct MockTransport {
        replies: Mutex<Vec<Result<String>>>,
        pub(crate) requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockTransport {
        pub(crate) fn new(replies: Vec<Result<String>>) -> Self {
            let mut replies = replies;
            replies.reverse();
            MockTransport {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
            self.requests
                .lock()
                .expect("Mock transport mutex should not be poisoned")
                .push(req.clone());
            let next = self
                .replies
                .lock()
                .expect("Mock transport mutex should not be poisoned")
                .pop();
            match next {
                Some(Ok(content)) => Ok(ChatResponse {
                    choices: vec![Choice {
                        message: ChatMessage {
                            role: "assistant".to_string(),
                            content,
                        },
                    }],
                }),
                Some(Err(e)) => Err(e),
                None => Err(SkillHubError::Internal("No more mock responses".to_string())),
            }
        }
    }
}
