use serde::Serialize;

/// What a display event is for; front-ends style each kind differently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Banner,
    Intro,
    /// Transient progress notice, superseded by what follows it
    Status,
    Result,
    Diagnostic,
    Error,
    Ready,
    Menu,
}

/// A button the user can press; `value` is a menu choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuAction {
    pub label: String,
    pub value: String,
}

impl MenuAction {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn back_to_menu() -> Self {
        Self::new("🔙 Back to Menu", "menu")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEvent {
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<MenuAction>,
}

impl DisplayEvent {
    pub fn new(kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            author: None,
            content: content.into(),
            actions: Vec::new(),
        }
    }

    pub fn status(content: impl Into<String>) -> Self {
        Self::new(EventKind::Status, content)
    }

    pub fn result(content: impl Into<String>) -> Self {
        Self::new(EventKind::Result, content)
    }

    pub fn diagnostic(content: impl Into<String>) -> Self {
        Self::new(EventKind::Diagnostic, content)
    }

    /// The trailing notice of a turn, offering a way back to the main menu
    pub fn ready(content: impl Into<String>) -> Self {
        Self::new(EventKind::Ready, content).with_action(MenuAction::back_to_menu())
    }

    pub fn by(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_action(mut self, action: MenuAction) -> Self {
        self.actions.push(action);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_event_offers_menu() {
        let event = DisplayEvent::ready("Ready!");
        assert_eq!(event.kind, EventKind::Ready);
        assert_eq!(event.actions, vec![MenuAction::new("🔙 Back to Menu", "menu")]);
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_value(DisplayEvent::status("thinking")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "status", "content": "thinking"}));

        let json = serde_json::to_value(DisplayEvent::result("ok").by("Bot")).unwrap();
        assert_eq!(json["author"], "Bot");
    }
}
