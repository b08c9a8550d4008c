use async_trait::async_trait;
use std::sync::Arc;

use crate::agent::Agent;
use crate::config::LlmConfig;
use crate::dispatch::Specialist;
use crate::error::Result;
use crate::events::{DisplayEvent, EventKind};
use crate::skills::Skill;
use crate::translate::{Translator, normalize_input};
use crate::transport::Transport;

const ADVISOR_PROMPT: &str = "You're a helpful health assistant. When a user describes symptoms (e.g., 'fever', 'headache'), reply with the symptom only, in a few lowercase words. No explanation.";

/// Checked in order; the first keyword contained in the symptom wins
const SUGGESTIONS: [(&str, &str); 7] = [
    ("headache", "💊 You might try ibuprofen or paracetamol."),
    ("fever", "🌡️ Paracetamol or ibuprofen can help reduce fever."),
    (
        "vomiting",
        "🤢 Try an antiemetic like dimenhydrinate (Gravol) or consult a pharmacist.",
    ),
    (
        "bloating",
        "😣 Simethicone (Gas-X) or activated charcoal may help with bloating.",
    ),
    (
        "toothache",
        "🦷 You can use a topical anesthetic gel like Orajel or take ibuprofen for pain.",
    ),
    (
        "foot pain",
        "🦶 Ibuprofen or a topical pain relief cream may help with foot pain.",
    ),
    (
        "stomach ache",
        "🤒 Antacids like Pepto-Bismol or omeprazole can be useful.",
    ),
];

/// Map a symptom description to an over-the-counter suggestion
pub fn suggest_product(symptom: &str) -> String {
    let symptom = symptom.to_lowercase();

    for (keyword, suggestion) in SUGGESTIONS {
        if symptom.contains(keyword) {
            return suggestion.to_string();
        }
    }

    format!(
        "For '**{symptom}**', you might try a common OTC product like paracetamol. If symptoms continue, please consult a healthcare provider. 🩺"
    )
}

/// Extracts the symptom with the model, then looks it up in the product table
pub struct SymptomAdvisor {
    extractor: Agent,
}

impl SymptomAdvisor {
    pub fn new(extractor: Agent) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl Specialist for SymptomAdvisor {
    async fn answer(&self, _topic: &str, query: &str) -> Result<String> {
        let symptom = self.extractor.run(query).await?;
        tracing::info!("Extracted symptom '{}'", symptom);
        Ok(suggest_product(&symptom))
    }
}

pub struct ProductSkill {
    advisor: Arc<dyn Specialist>,
    translator: Option<Arc<dyn Translator>>,
}

impl ProductSkill {
    pub fn new(advisor: Arc<dyn Specialist>, translator: Option<Arc<dyn Translator>>) -> Self {
        Self {
            advisor,
            translator,
        }
    }

    pub fn from_transport(
        tx: Arc<dyn Transport>,
        llm: &LlmConfig,
        translator: Option<Arc<dyn Translator>>,
    ) -> Self {
        let extractor = Agent::new("Smart Store Assistant 🛒", ADVISOR_PROMPT, tx, llm);
        Self::new(Arc::new(SymptomAdvisor::new(extractor)), translator)
    }
}

#[async_trait]
impl Skill for ProductSkill {
    fn intro(&self) -> Vec<DisplayEvent> {
        vec![DisplayEvent::new(
            EventKind::Intro,
            "## 👋 Welcome to Smart Store Assistant!\n\
             I’m your virtual health helper. Just tell me how you're feeling, and I’ll suggest an OTC product that might help.\n\n\
             **You can try messages like:**\n\
             - 🤕 *I have a headache*\n\
             - 🤢 *I'm vomiting a lot*\n\
             - 🤧 *I feel bloated and uncomfortable*\n\n\
             💬 **Go ahead, type your symptom below!**",
        )]
    }

    fn ready(&self) -> DisplayEvent {
        DisplayEvent::ready("🛒 Product Suggester Ready! What symptom are you experiencing?")
    }

    async fn handle(&self, text: &str) -> Result<Vec<DisplayEvent>> {
        let mut events = vec![DisplayEvent::status(
            "⏳ Let me check the best suggestion for you...",
        )];

        let symptom = normalize_input(self.translator.as_deref(), text).await;

        match self.advisor.answer("symptom", &symptom).await {
            Ok(suggestion) => {
                events.push(DisplayEvent::result(format!(
                    "✅ **Suggestion:**\n{}",
                    suggestion.trim()
                )));
            }
            Err(e) => {
                tracing::warn!("Product suggestion failed: {}", e);
                events.push(DisplayEvent::diagnostic(format!(
                    "⚠️ **Oops! Something went wrong:**\n```{e}```"
                )));
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::MockTransport;
    use crate::config::Config;
    use crate::dispatch::MockSpecialist;
    use crate::error::SkillHubError;
    use crate::translate::MockTranslator;
    use mockall::predicate::eq;

    #[test]
    fn test_suggest_product_matches_keywords() {
        assert_eq!(
            suggest_product("Bad HEADACHE since morning"),
            "💊 You might try ibuprofen or paracetamol."
        );
        assert_eq!(
            suggest_product("foot pain after running"),
            "🦶 Ibuprofen or a topical pain relief cream may help with foot pain."
        );
    }

    #[test]
    fn test_suggest_product_first_keyword_wins() {
        // "headache" precedes "fever" in the table
        assert_eq!(
            suggest_product("fever and headache"),
            "💊 You might try ibuprofen or paracetamol."
        );
    }

    #[test]
    fn test_suggest_product_fallback_quotes_symptom() {
        let reply = suggest_product("Sore Throat");
        assert!(reply.starts_with("For '**sore throat**'"));
        assert!(reply.contains("consult a healthcare provider"));
    }

    #[tokio::test]
    async fn test_advisor_maps_extracted_symptom() {
        let cfg = Config::default();
        let tx = Arc::new(MockTransport::replying(&["bloating"]));
        let advisor = SymptomAdvisor::new(Agent::new("advisor", ADVISOR_PROMPT, tx, &cfg.llm));

        let reply = advisor
            .answer("symptom", "I feel bloated and uncomfortable")
            .await
            .unwrap();
        assert!(reply.contains("Simethicone"));
    }

    #[tokio::test]
    async fn test_handle_translates_before_advising() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .with(eq("Tengo fiebre"))
            .returning(|_| Ok("I have a fever".to_string()));
        let mut advisor = MockSpecialist::new();
        advisor
            .expect_answer()
            .with(eq("symptom"), eq("I have a fever"))
            .times(1)
            .returning(|_, q| Ok(suggest_product(q)));

        let skill = ProductSkill::new(Arc::new(advisor), Some(Arc::new(translator)));
        let events = skill.handle("Tengo fiebre").await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::Status);
        assert_eq!(
            events[1].content,
            "✅ **Suggestion:**\n🌡️ Paracetamol or ibuprofen can help reduce fever."
        );
    }

    #[tokio::test]
    async fn test_handle_reports_advisor_failure() {
        let mut advisor = MockSpecialist::new();
        advisor
            .expect_answer()
            .times(1)
            .returning(|_, _| Err(SkillHubError::Api {
                status: 401,
                body: "invalid key".to_string(),
            }));

        let skill = ProductSkill::new(Arc::new(advisor), None);
        let events = skill.handle("toothache").await.unwrap();

        assert_eq!(events[1].kind, EventKind::Diagnostic);
        assert!(events[1].content.starts_with("⚠️ **Oops! Something went wrong:**"));
        assert!(events[1].content.contains("invalid key"));
    }

    #[tokio::test]
    async fn test_handle_survives_translation_failure() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|_| Err(SkillHubError::Translation("offline".to_string())));
        let mut advisor = MockSpecialist::new();
        advisor
            .expect_answer()
            .with(eq("symptom"), eq("vomiting"))
            .times(1)
            .returning(|_, q| Ok(suggest_product(q)));

        let skill = ProductSkill::new(Arc::new(advisor), Some(Arc::new(translator)));
        let events = skill.handle("vomiting").await.unwrap();
        assert!(events[1].content.contains("Gravol"));
    }
}
