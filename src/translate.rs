use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::TranslatorConfig;
use crate::error::{Result, SkillHubError};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Google's public web-translate endpoint with source-language autodetection
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(cfg: &TranslatorConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: cfg.endpoint.clone(),
            target: cfg.target_language.clone(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SkillHubError::Translation(format!(
                "translate endpoint returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        parse_translation(&body)
    }
}

/// Join the translated segments of a `translate_a/single` reply.
///
/// The reply is a nested array whose first element lists
/// `[translated, original, ...]` segments.
fn parse_translation(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| SkillHubError::Translation(format!("unexpected reply shape: {body}")))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(SkillHubError::Translation("empty translation".to_string()));
    }
    Ok(translated)
}

/// Translate `text` when a translator is configured, falling back to the
/// original text on any failure.
pub async fn normalize_input(translator: Option<&dyn Translator>, text: &str) -> String {
    let Some(translator) = translator else {
        return text.to_string();
    };

    match translator.translate(text).await {
        Ok(translated) => translated,
        Err(e) => {
            tracing::warn!("Translation error: {} - using original text", e);
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_translation_joins_segments() {
        let body = json!([
            [
                ["I have a headache. ", "Tengo dolor de cabeza. ", null, null, 10],
                ["And fever.", "Y fiebre.", null, null, 10]
            ],
            null,
            "es"
        ]);
        assert_eq!(
            parse_translation(&body).unwrap(),
            "I have a headache. And fever."
        );
    }

    #[test]
    fn test_parse_translation_rejects_unexpected_shape() {
        assert!(parse_translation(&json!({"error": "quota"})).is_err());
        assert!(parse_translation(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_normalize_input_uses_translation() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .returning(|_| Ok("I have a headache".to_string()));

        let out = normalize_input(Some(&translator as &dyn Translator), "J'ai mal à la tête").await;
        assert_eq!(out, "I have a headache");
    }

    #[tokio::test]
    async fn test_normalize_input_falls_back_on_failure() {
        let mut translator = MockTranslator::new();
        translator
            .expect_translate()
            .times(1)
            .returning(|_| Err(SkillHubError::Translation("offline".to_string())));

        let out = normalize_input(Some(&translator as &dyn Translator), "Me duele la cabeza").await;
        assert_eq!(out, "Me duele la cabeza");
    }

    #[tokio::test]
    async fn test_normalize_input_without_translator_is_identity() {
        assert_eq!(normalize_input(None, "fever").await, "fever");
    }
}
