//! AI gateway - one POST endpoint for meals, full days, workouts, reviews,
//! shopping lists and kcal estimates
//!
//! Replies are `{ ok, text?, structured?, error? }`. Structured payloads are
//! preferred; free text is mined for JSON by `parse`.

pub mod parse;
pub mod prompts;

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{info, warn};

use crate::metrics::Intensity;
use crate::plan::{DayOverride, Language, MealKey, MealSlot, PlanDay};
use crate::store::ShoppingItem;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI credentials are not configured")]
    MissingCredentials,
    #[error("AI endpoint is not configured")]
    MissingEndpoint,
    #[error("AI request timed out")]
    Timeout,
    #[error("AI request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("AI endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("AI endpoint reported an error: {0}")]
    Remote(String),
    #[error("AI reply could not be understood: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else {
            AiError::Http(e)
        }
    }
}

/// Localized alert text for a failed generation
pub fn error_message(err: &AiError, lang: Language) -> &'static str {
    match (err, lang) {
        (AiError::MissingCredentials | AiError::MissingEndpoint, Language::Es) => {
            "Configura tu usuario y contraseña de IA en Ajustes."
        }
        (AiError::MissingCredentials | AiError::MissingEndpoint, Language::En) => {
            "Set your AI user and password in Settings."
        }
        (AiError::Timeout, Language::Es) => "La IA tardó demasiado. Inténtalo más tarde.",
        (AiError::Timeout, Language::En) => "The AI took too long. Try again later.",
        (_, Language::Es) => "Error de IA. Inténtalo más tarde.",
        (_, Language::En) => "AI error. Please try again later.",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    /// Both parts must be non-blank. The password is sent exactly as given.
    pub fn from_parts(user: Option<&str>, pass: Option<&str>) -> Option<Self> {
        let user = user.map(str::trim).filter(|u| !u.is_empty())?;
        let pass = pass.filter(|p| !p.trim().is_empty())?;
        Some(Self {
            user: user.to_string(),
            pass: pass.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AiReply {
    #[serde(default)]
    pub ok: bool,
    pub text: Option<String>,
    pub structured: Option<Value>,
    pub error: Option<String>,
}

impl AiReply {
    fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub name: String,
    #[serde(default)]
    pub sets: Option<u32>,
    /// Reps or duration as free text ("12", "40 s")
    #[serde(default)]
    pub reps: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub title: String,
    pub minutes: u32,
    pub intensity: Intensity,
    pub exercises: Vec<WorkoutExercise>,
    #[serde(default)]
    pub notes: String,
}

/// Parameters for a single-meal generation
#[derive(Debug, Clone)]
pub struct MealRequest<'a> {
    pub meal: MealKey,
    pub kcal: i32,
    pub current: Option<&'a MealSlot>,
    pub prefs: &'a str,
}

/// Client for the remote AI endpoint
pub struct AiClient {
    http: Client,
    endpoint: String,
    credentials: Option<Credentials>,
    lang: Language,
}

impl AiClient {
    pub fn new(
        endpoint: impl Into<String>,
        credentials: Option<Credentials>,
        timeout: Duration,
        lang: Language,
    ) -> Result<Self, AiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            credentials,
            lang,
        })
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    /// Request body: mode, lang and credentials plus the mode's own fields
    pub fn request_body(&self, mode: &str, fields: Value) -> Result<Value, AiError> {
        let creds = self.credentials.as_ref().ok_or(AiError::MissingCredentials)?;

        let mut body = Map::new();
        body.insert("mode".into(), json!(mode));
        body.insert("lang".into(), json!(self.lang.code()));
        body.insert("user".into(), json!(creds.user));
        body.insert("pass".into(), json!(creds.pass));
        if let Value::Object(extra) = fields {
            body.extend(extra);
        }
        Ok(Value::Object(body))
    }

    async fn call(&self, mode: &str, fields: Value) -> Result<AiReply, AiError> {
        let body = self.request_body(mode, fields)?;
        if self.endpoint.trim().is_empty() {
            return Err(AiError::MissingEndpoint);
        }

        let started = Instant::now();
        let resp = self.http.post(&self.endpoint).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(mode, status = status.as_u16(), "AI request rejected");
            return Err(AiError::Status { status: status.as_u16(), body });
        }

        let raw = resp.text().await?;
        let reply: AiReply =
            serde_json::from_str(&raw).map_err(|e| AiError::Malformed(e.to_string()))?;

        if !reply.ok {
            let msg = reply.error.clone().unwrap_or_else(|| "unknown error".to_string());
            warn!(mode, error = %msg, "AI endpoint returned ok=false");
            return Err(AiError::Remote(msg));
        }

        info!(mode, elapsed_ms = started.elapsed().as_millis() as u64, "AI request completed");
        Ok(reply)
    }

    /// Generate one meal slot
    pub async fn generate_meal(&self, req: &MealRequest<'_>) -> Result<MealSlot, AiError> {
        let prompt = prompts::meal_prompt(req, self.lang);
        let reply = self
            .call(
                "meal",
                json!({
                    "prompt": prompt,
                    "kcal": req.kcal,
                    "meal": req.meal.as_str(),
                    "prefs": req.prefs
                }),
            )
            .await?;

        parse::meal_from_reply(reply.structured.as_ref(), reply.text())
            .ok_or_else(|| AiError::Malformed("no meal in reply".to_string()))
    }

    /// Generate all five slots of a day; missing slots stay empty
    pub async fn generate_full_day(&self, kcal: i32, prefs: &str) -> Result<DayOverride, AiError> {
        let prompt = prompts::full_day_prompt(kcal, prefs, self.lang);
        let reply = self
            .call("full-day", json!({ "prompt": prompt, "kcal": kcal, "prefs": prefs }))
            .await?;

        Ok(parse::day_from_reply(reply.structured.as_ref(), reply.text()))
    }

    pub async fn generate_workout(
        &self,
        intensity: Intensity,
        minutes: u32,
        prefs: &str,
    ) -> Result<Workout, AiError> {
        let prompt = prompts::workout_prompt(intensity, minutes, prefs, self.lang);
        let reply = self
            .call(
                "workout",
                json!({
                    "prompt": prompt,
                    "intensity": intensity.as_str(),
                    "minutes": minutes,
                    "prefs": prefs
                }),
            )
            .await?;

        Ok(parse::workout_from_reply(reply.structured.as_ref(), reply.text(), intensity, minutes))
    }

    /// Free-text feedback on a day's adherence
    pub async fn review_day(&self, summary: &str) -> Result<String, AiError> {
        let prompt = prompts::review_prompt(summary, self.lang);
        let reply = self.call("review", json!({ "prompt": prompt })).await?;
        Ok(reply.text().trim().to_string())
    }

    pub async fn shopping_list(&self, days: &[PlanDay]) -> Result<Vec<ShoppingItem>, AiError> {
        let prompt = prompts::shopping_prompt(days, self.lang);
        let reply = self.call("shopping", json!({ "prompt": prompt, "days": days.len() })).await?;
        Ok(parse::shopping_from_reply(reply.structured.as_ref(), reply.text()))
    }

    /// Estimate kcal of a free-text food (extras, cheat meals)
    pub async fn estimate_kcal(&self, description: &str, portion: &str) -> Result<i32, AiError> {
        let prompt = prompts::kcal_prompt(description, portion, self.lang);
        let reply = self.call("kcal", json!({ "prompt": prompt })).await?;

        parse::kcal_from_reply(reply.structured.as_ref(), reply.text())
            .ok_or_else(|| AiError::Malformed("no kcal figure in reply".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(creds: Option<Credentials>) -> AiClient {
        AiClient::new("http://127.0.0.1:9/ai", creds, Duration::from_secs(1), Language::En).unwrap()
    }

    fn gateway_client(server: &MockServer, timeout: Duration) -> AiClient {
        AiClient::new(
            format!("{}/ai", server.uri()),
            Credentials::from_parts(Some("ana"), Some("pw")),
            timeout,
            Language::Es,
        )
        .unwrap()
    }

    async fn gateway_replying(response: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai"))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_credentials_require_both_parts() {
        assert!(Credentials::from_parts(Some("ana"), Some("secret")).is_some());
        assert!(Credentials::from_parts(Some("ana"), None).is_none());
        assert!(Credentials::from_parts(Some("  "), Some("secret")).is_none());
        assert!(Credentials::from_parts(None, Some("secret")).is_none());
        assert!(Credentials::from_parts(Some("ana"), Some("   ")).is_none());
    }

    #[test]
    fn test_password_whitespace_preserved() {
        let creds = Credentials::from_parts(Some(" ana "), Some("  pass phrase ")).unwrap();
        assert_eq!(creds.user, "ana");
        assert_eq!(creds.pass, "  pass phrase ");
    }

    #[test]
    fn test_request_body_shape() {
        let c = client(Credentials::from_parts(Some("ana"), Some("pw")));
        let body = c.request_body("meal", json!({ "kcal": 400, "prefs": "sin cerdo" })).unwrap();
        assert_eq!(body["mode"], "meal");
        assert_eq!(body["lang"], "en");
        assert_eq!(body["user"], "ana");
        assert_eq!(body["pass"], "pw");
        assert_eq!(body["kcal"], 400);
        assert_eq!(body["prefs"], "sin cerdo");
    }

    #[test]
    fn test_request_body_without_credentials() {
        let c = client(None);
        assert!(matches!(c.request_body("meal", json!({})), Err(AiError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_missing_credentials_short_circuit() {
        // Nothing listens on the endpoint; the error must come before any request
        let c = client(None);
        let err = c.review_day("summary").await.unwrap_err();
        assert!(matches!(err, AiError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_missing_endpoint() {
        let c = AiClient::new(
            "",
            Credentials::from_parts(Some("a"), Some("b")),
            Duration::from_secs(1),
            Language::Es,
        )
        .unwrap();
        let err = c.estimate_kcal("pan", "1 rebanada").await.unwrap_err();
        assert!(matches!(err, AiError::MissingEndpoint));
    }

    #[tokio::test]
    async fn test_generate_meal_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai"))
            .and(body_partial_json(json!({
                "mode": "meal",
                "lang": "es",
                "user": "ana",
                "pass": "pw",
                "meal": "desayuno",
                "kcal": 400
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "structured": {
                    "nombre": "Tortilla de espinacas",
                    "qty": "3 huevos, 50 g espinacas"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let c = gateway_client(&server, Duration::from_secs(5));
        let req = MealRequest { meal: MealKey::Desayuno, kcal: 400, current: None, prefs: "" };
        let slot = c.generate_meal(&req).await.unwrap();
        assert_eq!(slot.name, "Tortilla de espinacas");
        assert_eq!(slot.qty, "3 huevos, 50 g espinacas");
        assert!(slot.is_ai);
    }

    #[tokio::test]
    async fn test_kcal_estimate_from_text_reply() {
        let server = gateway_replying(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "text": "Unas 1.200 kcal." })),
        )
        .await;
        let c = gateway_client(&server, Duration::from_secs(5));
        assert_eq!(c.estimate_kcal("pizza", "mediana").await.unwrap(), 1200);
    }

    #[tokio::test]
    async fn test_http_error_maps_to_status() {
        let down = ResponseTemplate::new(503).set_body_string("down for maintenance");
        let server = gateway_replying(down).await;
        let c = gateway_client(&server, Duration::from_secs(5));

        match c.review_day("summary").await.unwrap_err() {
            AiError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "down for maintenance");
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ok_false_maps_to_remote() {
        let server = gateway_replying(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "quota exceeded" })),
        )
        .await;
        let c = gateway_client(&server, Duration::from_secs(5));

        let err = c.review_day("summary").await.unwrap_err();
        assert!(matches!(err, AiError::Remote(ref msg) if msg == "quota exceeded"));
    }

    #[tokio::test]
    async fn test_non_json_body_maps_to_malformed() {
        let server =
            gateway_replying(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
        let c = gateway_client(&server, Duration::from_secs(5));

        let err = c.estimate_kcal("pan", "1 rebanada").await.unwrap_err();
        assert!(matches!(err, AiError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_refusal_text_is_malformed_meal() {
        let server = gateway_replying(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "text": "Sorry, I can't help with that" })),
        )
        .await;
        let c = gateway_client(&server, Duration::from_secs(5));
        let req = MealRequest { meal: MealKey::Cena, kcal: 500, current: None, prefs: "" };

        assert!(matches!(c.generate_meal(&req).await.unwrap_err(), AiError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_slow_gateway_maps_to_timeout() {
        let server = gateway_replying(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true, "text": "tarde" }))
                .set_delay(Duration::from_secs(3)),
        )
        .await;
        let c = gateway_client(&server, Duration::from_millis(200));

        let err = c.review_day("summary").await.unwrap_err();
        assert!(matches!(err, AiError::Timeout), "got {:?}", err);
    }

    #[test]
    fn test_error_messages_localized() {
        assert_eq!(
            error_message(&AiError::MissingCredentials, Language::En),
            "Set your AI user and password in Settings."
        );
        assert_eq!(
            error_message(&AiError::Timeout, Language::Es),
            "La IA tardó demasiado. Inténtalo más tarde."
        );
        assert_eq!(
            error_message(&AiError::Remote("x".into()), Language::En),
            "AI error. Please try again later."
        );
    }

    #[test]
    fn test_reply_decoding() {
        let reply: AiReply = serde_json::from_str(r#"{"ok":true,"text":"hola"}"#).unwrap();
        assert!(reply.ok);
        assert_eq!(reply.text(), "hola");

        let reply: AiReply = serde_json::from_str(r#"{"error":"quota"}"#).unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.error.as_deref(), Some("quota"));
    }
}
