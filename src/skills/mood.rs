use async_trait::async_trait;
use std::sync::Arc;

use crate::agent::Agent;
use crate::config::LlmConfig;
use crate::dispatch::{Classifier, DispatchEntry, DispatchMode, Dispatcher, Specialist};
use crate::error::Result;
use crate::events::{DisplayEvent, EventKind};
use crate::skills::Skill;
use crate::transport::Transport;

const DETECTOR: &str = "🧠 Mood Detector";
const COACH: &str = "🧘‍♀️ Activity Coach";
const CHEERLEADER: &str = "🎉 Mood Agent";

const DETECTOR_PROMPT: &str = "Detect the user's mood (happy, sad, stressed, angry, excited) from their message. Return ONLY the mood as one word.";
const COACH_PROMPT: &str = "Suggest a positive activity if the user is feeling sad or stressed. Be kind and empathetic.";

const ENCOURAGEMENT: &str = "🎉 You're doing great! Keep enjoying your awesome mood. 💖";

/// Moods that get an activity suggestion
pub const COACHED_MOODS: [&str; 2] = ["sad", "stressed"];
/// Moods that get encouragement
pub const ENCOURAGED_MOODS: [&str; 3] = ["happy", "angry", "excited"];

/// Suggests an activity for a detected mood
pub struct ActivityCoach {
    agent: Agent,
}

impl ActivityCoach {
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Specialist for ActivityCoach {
    async fn answer(&self, topic: &str, _query: &str) -> Result<String> {
        self.agent.run(&format!("I'm feeling {topic}")).await
    }
}

/// Fixed reply, no model call
pub struct StaticReply(pub String);

#[async_trait]
impl Specialist for StaticReply {
    async fn answer(&self, _topic: &str, _query: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

pub struct MoodSkill {
    dispatcher: Dispatcher,
}

impl MoodSkill {
    /// Bind `coach` to the coached moods and the encouragement to the rest
    pub fn new(detector: Arc<dyn Classifier>, coach: Arc<dyn Specialist>) -> Self {
        let cheer: Arc<dyn Specialist> = Arc::new(StaticReply(ENCOURAGEMENT.to_string()));

        let mut dispatcher = Dispatcher::new(detector);
        for mood in COACHED_MOODS {
            dispatcher = dispatcher.bind(mood, coach.clone());
        }
        for mood in ENCOURAGED_MOODS {
            dispatcher = dispatcher.bind(mood, cheer.clone());
        }

        Self { dispatcher }
    }

    pub fn from_transport(tx: Arc<dyn Transport>, llm: &LlmConfig, mode: DispatchMode) -> Self {
        let detector = Arc::new(Agent::new("Mood Detector", DETECTOR_PROMPT, tx.clone(), llm));
        let coach = Arc::new(ActivityCoach::new(Agent::new(
            "Activity Suggester",
            COACH_PROMPT,
            tx,
            llm,
        )));
        let mut skill = Self::new(detector, coach);
        skill.dispatcher = skill.dispatcher.with_mode(mode);
        skill
    }
}

fn encouragement() -> DisplayEvent {
    DisplayEvent::result(ENCOURAGEMENT).by(CHEERLEADER)
}

#[async_trait]
impl Skill for MoodSkill {
    fn intro(&self) -> Vec<DisplayEvent> {
        vec![
            DisplayEvent::new(
                EventKind::Intro,
                "# 💬 Mood Analyzer with Agent Handoff\n\
                 Welcome! Let me understand how you're feeling and give suggestions if needed.\n\n\
                 **Please type your current feeling or emotion.**\n",
            )
            .by("🎯 Mood Analyzer"),
            self.ready(),
        ]
    }

    fn ready(&self) -> DisplayEvent {
        DisplayEvent::ready("💬 Mood Analyzer Ready! How are you feeling today?")
    }

    async fn handle(&self, text: &str) -> Result<Vec<DisplayEvent>> {
        let mut events = vec![DisplayEvent::status("🔍 *Analyzing your mood...*").by(DETECTOR)];

        let entries = self.dispatcher.dispatch(text).await?;

        let detected: Vec<&str> = entries.iter().map(DispatchEntry::token).collect();
        events.push(
            DisplayEvent::result(format!("### 😌 Detected mood: **`{}`**", detected.join(", ")))
                .by(DETECTOR),
        );

        for entry in &entries {
            match entry {
                DispatchEntry::Answer { topic, text } if COACHED_MOODS.contains(&topic.as_str()) => {
                    events.push(
                        DisplayEvent::status("💡 *Thinking of something comforting for you...*")
                            .by("🤝 Activity Coach"),
                    );
                    events.push(
                        DisplayEvent::result(format!("### 🌈 Suggestion for You:\n{text}")).by(COACH),
                    );
                }
                DispatchEntry::Answer { text, .. } => {
                    events.push(DisplayEvent::result(text.clone()).by(CHEERLEADER));
                }
                DispatchEntry::Failed { topic, reason } => {
                    events.push(
                        DisplayEvent::diagnostic(format!(
                            "⚠️ Couldn't come up with a suggestion for feeling {topic}: {reason}"
                        ))
                        .by(COACH),
                    );
                }
                // Any mood outside the known set is treated like a good one
                DispatchEntry::Unrecognized { .. } => events.push(encouragement()),
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
    use crate::dispatch::{MockClassifier, MockSpecialist};
    use crate::error::SkillHubError;

    fn detector(reply: &'static str) -> Arc<MockClassifier> {
        let mut detector = MockClassifier::new();
        detector
            .expect_classify()
            .times(1)
            .returning(move |_| Ok(reply.to_string()));
        Arc::new(detector)
    }

    #[tokio::test]
    async fn test_stressed_user_gets_a_suggestion() {
        let tx = Arc::new(MockTransport::replying(&[" Stressed\n", "Try a short walk outside."]));
        let cfg = Config::default();
        let skill = MoodSkill::from_transport(tx.clone(), &cfg.llm, DispatchMode::Sequential);

        let events = skill.handle("Deadlines everywhere, I can't breathe").await.unwrap();

        assert_eq!(events[1].content, "### 😌 Detected mood: **`stressed`**");
        assert_eq!(events[2].kind, EventKind::Status);
        assert_eq!(
            events[3].content,
            "### 🌈 Suggestion for You:\nTry a short walk outside."
        );
        assert_eq!(events[3].author.as_deref(), Some(COACH));

        let requests = tx.requests.lock().unwrap();
        assert_eq!(requests[1].messages[1].content, "I'm feeling stressed");
    }

    #[tokio::test]
    async fn test_happy_user_is_encouraged_without_coach() {
        let mut coach = MockSpecialist::new();
        coach.expect_answer().never();

        let skill = MoodSkill::new(detector("happy"), Arc::new(coach));
        let events = skill.handle("Best day ever!").await.unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[2].content, ENCOURAGEMENT);
        assert_eq!(events[2].author.as_deref(), Some(CHEERLEADER));
    }

    #[tokio::test]
    async fn test_unknown_mood_is_encouraged() {
        let mut coach = MockSpecialist::new();
        coach.expect_answer().never();

        let skill = MoodSkill::new(detector("tired"), Arc::new(coach));
        let events = skill.handle("meh").await.unwrap();

        assert_eq!(events[1].content, "### 😌 Detected mood: **`tired`**");
        assert_eq!(events[2].content, ENCOURAGEMENT);
    }

    #[tokio::test]
    async fn test_empty_detection_is_encouraged() {
        let mut coach = MockSpecialist::new();
        coach.expect_answer().never();

        let skill = MoodSkill::new(detector("  "), Arc::new(coach));
        let events = skill.handle("...").await.unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].content, "### 😌 Detected mood: **``**");
        assert_eq!(events[2].content, ENCOURAGEMENT);
    }

    #[tokio::test]
    async fn test_coach_failure_is_a_diagnostic() {
        let mut coach = MockSpecialist::new();
        coach
            .expect_answer()
            .times(1)
            .returning(|_, _| Err(SkillHubError::Internal("rate limited".to_string())));

        let skill = MoodSkill::new(detector("sad"), Arc::new(coach));
        let events = skill.handle("I miss home").await.unwrap();

        let last = events.last().unwrap();
        assert_eq!(last.kind, EventKind::Diagnostic);
        assert!(last.content.contains("rate limited"));
    }

    #[test]
    fn test_intro_ends_with_ready_notice() {
        let skill = MoodSkill::new(detector_unused(), Arc::new(MockSpecialist::new()));
        let intro = skill.intro();
        assert_eq!(intro.last().unwrap().kind, EventKind::Ready);
    }

    fn detector_unused() -> Arc<MockClassifier> {
        Arc::new(MockClassifier::new())
    }
}
