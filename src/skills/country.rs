use async_trait::async_trait;
use std::sync::Arc;

use crate::agent::Agent;
use crate::config::LlmConfig;
use crate::dispatch::{DispatchEntry, DispatchMode, Dispatcher};
use crate::error::Result;
use crate::events::{DisplayEvent, EventKind};
use crate::skills::Skill;
use crate::transport::Transport;

const AUTHOR: &str = "🌍 Country Info Bot";

const ORCHESTRATOR_PROMPT: &str = r#"You are an orchestrator. Given a user query, decide which of the following 3 categories are being asked about:

- capital
- language
- population

Respond with one or more of these keywords as a comma-separated list.
Do NOT explain. Just output: e.g., "capital, language", or "population""#;

const CAPITAL_PROMPT: &str = "You are a capital expert. Given a country name, return its capital city only. Just the name, no explanation.";
const LANGUAGE_PROMPT: &str = "You are a language expert. Given a country name, return the official or primary language spoken. Just the name, no explanation.";
const POPULATION_PROMPT: &str = "You are a population expert. Given a country name, return the population as of the most recent estimate. Keep it short.";

/// Capital, language and population lookups for a country
pub struct CountrySkill {
    dispatcher: Dispatcher,
}

impl CountrySkill {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn from_transport(tx: Arc<dyn Transport>, llm: &LlmConfig, mode: DispatchMode) -> Self {
        let agent = |name: &str, prompt: &str| Arc::new(Agent::new(name, prompt, tx.clone(), llm));

        let dispatcher = Dispatcher::new(agent("Orchestrator", ORCHESTRATOR_PROMPT))
            .bind("capital", agent("Capital Finder", CAPITAL_PROMPT))
            .bind("language", agent("Language Finder", LANGUAGE_PROMPT))
            .bind("population", agent("Population Finder", POPULATION_PROMPT))
            .with_mode(mode);

        Self::new(dispatcher)
    }
}

fn render_entry(entry: &DispatchEntry) -> DisplayEvent {
    match entry {
        DispatchEntry::Answer { topic, text } => {
            let line = match topic.as_str() {
                "capital" => format!("🏛️ Capital: **{text}**"),
                "language" => format!("🗣️ Language: **{text}**"),
                "population" => format!("👥 Population: **{text}**"),
                other => format!("{other}: **{text}**"),
            };
            DisplayEvent::result(line)
        }
        DispatchEntry::Failed { topic, reason } => {
            DisplayEvent::diagnostic(format!("⚠️ Could not look up {topic}: {reason}"))
        }
        DispatchEntry::Unrecognized { token } => {
            DisplayEvent::diagnostic(format!("⚠️ Unrecognized task: `{token}`"))
        }
    }
}

#[async_trait]
impl Skill for CountrySkill {
    fn intro(&self) -> Vec<DisplayEvent> {
        vec![
            DisplayEvent::new(
                EventKind::Intro,
                "# 🌐 Country Info Assistant\n\
                 Ask me anything about a country's **capital**, **language**, or **population**.\n\n\
                 Examples:\n\
                 - What is the capital of Japan?\n\
                 - Language spoken in Brazil?\n\
                 - Population of Canada?\n",
            )
            .by(AUTHOR),
        ]
    }

    fn ready(&self) -> DisplayEvent {
        DisplayEvent::ready(
            "🌍 Country Info Ready! Ask about a country’s capital, language, or population.",
        )
    }

    async fn handle(&self, text: &str) -> Result<Vec<DisplayEvent>> {
        let question = text.trim();

        let mut events = vec![DisplayEvent::status("🤔 Figuring out what you want to know...")];

        let entries = self.dispatcher.dispatch(question).await?;

        let asked: Vec<&str> = entries.iter().map(DispatchEntry::token).collect();
        events.push(DisplayEvent::result(format!(
            "🔍 You asked about: **{}**",
            asked.join(", ")
        )));
        events.extend(entries.iter().map(render_entry));

        Ok(events)
    }
}
