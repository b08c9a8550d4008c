use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::DispatchMode;
use crate::error::{Result, SkillHubError};
use crate::events::{DisplayEvent, EventKind, MenuAction};
use crate::retry::RetryPolicy;
use crate::skills::{CountrySkill, MoodSkill, ProductSkill, Skill};
use crate::translate::{GoogleTranslator, Translator};
use crate::transport::{ChatTransport, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Product,
    Mood,
    Country,
}

impl SessionMode {
    pub const ALL: [SessionMode; 3] = [SessionMode::Product, SessionMode::Mood, SessionMode::Country];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Product => "product",
            SessionMode::Mood => "mood",
            SessionMode::Country => "country",
        }
    }

    fn menu_label(&self) -> &'static str {
        match self {
            SessionMode::Product => "🛒 OTC Product Suggester",
            SessionMode::Mood => "💬 Mood Analyzer",
            SessionMode::Country => "🌍 Country Info Assistant",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user picked from a menu button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Menu,
    Mode(SessionMode),
}

impl FromStr for MenuChoice {
    type Err = SkillHubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "menu" => Ok(MenuChoice::Menu),
            "product" => Ok(MenuChoice::Mode(SessionMode::Product)),
            "mood" => Ok(MenuChoice::Mode(SessionMode::Mood)),
            "country" => Ok(MenuChoice::Mode(SessionMode::Country)),
            other => Err(SkillHubError::Internal(format!("Unknown menu choice '{other}'"))),
        }
    }
}

/// Per-conversation state, owned by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: Option<SessionMode>,
}

/// Routes menu choices and user messages to the active skill
pub struct Hub {
    product: Arc<dyn Skill>,
    mood: Arc<dyn Skill>,
    country: Arc<dyn Skill>,
}

impl Hub {
    pub fn new(product: Arc<dyn Skill>, mood: Arc<dyn Skill>, country: Arc<dyn Skill>) -> Self {
        Self {
            product,
            mood,
            country,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        tracing::info!("Hub::from_config() - model {} at {}", cfg.llm.model, cfg.llm.base_url);
        let tx: Arc<dyn Transport> =
            Arc::new(ChatTransport::new(&cfg.llm, RetryPolicy::from(&cfg.retry))?);

        let translator: Option<Arc<dyn Translator>> = if cfg.translator.enabled {
            Some(Arc::new(GoogleTranslator::new(&cfg.translator)))
        } else {
            tracing::info!("Hub::from_config() - input translation disabled");
            None
        };

        let mode = if cfg.dispatch.concurrent {
            DispatchMode::Concurrent
        } else {
            DispatchMode::Sequential
        };

        Ok(Self::new(
            Arc::new(ProductSkill::from_transport(tx.clone(), &cfg.llm, translator)),
            Arc::new(MoodSkill::from_transport(tx.clone(), &cfg.llm, mode)),
            Arc::new(CountrySkill::from_transport(tx, &cfg.llm, mode)),
        ))
    }

    fn skill(&self, mode: SessionMode) -> &dyn Skill {
        match mode {
            SessionMode::Product => self.product.as_ref(),
            SessionMode::Mood => self.mood.as_ref(),
            SessionMode::Country => self.country.as_ref(),
        }
    }

    /// Opening events of a new conversation
    pub fn start(&self) -> Vec<DisplayEvent> {
        vec![
            DisplayEvent::new(
                EventKind::Banner,
                "# 🤖AI Agent Assignment Hub\n\n\
                 Explore different projects powered by specialized AI agents.\n\n---\n",
            ),
            Self::main_menu(),
        ]
    }

    pub fn main_menu() -> DisplayEvent {
        SessionMode::ALL.iter().fold(
            DisplayEvent::new(EventKind::Menu, "## 🧭 Choose a Project Below:"),
            |event, mode| event.with_action(MenuAction::new(mode.menu_label(), mode.as_str())),
        )
    }

    pub fn select(&self, state: SessionState, choice: MenuChoice) -> (SessionState, Vec<DisplayEvent>) {
        match choice {
            MenuChoice::Menu => (state, vec![Self::main_menu()]),
            MenuChoice::Mode(mode) => {
                tracing::info!("Switching session mode to {}", mode);
                (SessionState { mode: Some(mode) }, self.skill(mode).intro())
            }
        }
    }

    pub async fn handle_user_message(
        &self,
        state: SessionState,
        text: &str,
    ) -> (SessionState, Vec<DisplayEvent>) {
        let Some(mode) = state.mode else {
            return (
                state,
                vec![DisplayEvent::diagnostic(
                    "⚠️ Please select a project from the menu first.",
                )],
            );
        };

        let skill = self.skill(mode);
        let mut events = match skill.handle(text).await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("{} skill failed: {}", mode, e);
                vec![DisplayEvent::new(
                    EventKind::Error,
                    format!("⚠️ **Oops! Something went wrong:**\n```{e}```"),
                )]
            }
        };
        events.push(skill.ready());

        (state, events)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::dispatch::{Dispatcher, MockClassifier, MockSpecialist};

    /// A hub whose skills answer from canned classifier and specialist replies
    pub(crate) fn stub_hub(classifier_reply: Option<&'static str>) -> Hub {
        let stub_classifier = move || {
            let mut classifier = MockClassifier::new();
            classifier.expect_classify().returning(move |_| match classifier_reply {
                Some(reply) => Ok(reply.to_string()),
                None => Err(SkillHubError::Internal("model unavailable".to_string())),
            });
            Arc::new(classifier)
        };
        let stub_specialist = || {
            let mut specialist = MockSpecialist::new();
            specialist
                .expect_answer()
                .returning(|topic, _| Ok(format!("answer for {topic}")));
            Arc::new(specialist)
        };

        let country = CountrySkill::new(
            Dispatcher::new(stub_classifier())
                .bind("capital", stub_specialist())
                .bind("language", stub_specialist())
                .bind("population", stub_specialist()),
        );
        let mood = MoodSkill::new(stub_classifier(), stub_specialist());
        let product = ProductSkill::new(stub_specialist(), None);

        Hub::new(Arc::new(product), Arc::new(mood), Arc::new(country))
    }
}
