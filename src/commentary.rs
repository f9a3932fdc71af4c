//! Post-run commentary
//!
//! After a run ends the host asks a text-generation service for a short
//! sarcastic line about the score. The call is one-shot, time-limited and
//! abortable; any failure is replaced by a canned line, so the player never
//! sees an error.

use std::future::Future;

use futures::future::{AbortHandle, Abortable, Either, LocalBoxFuture, select};
use futures::FutureExt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canned lines used whenever the service is unavailable
pub const FALLBACK_COMMENTS: [&str; 10] = [
    "¡Esos conos tenían familia! Ten más cuidado la próxima.",
    "¿Seguro que no compraste la licencia de conducir en una caja de cereal?",
    "El auto rojo es rápido, pero tus reflejos... bueno, hay salud.",
    "¡Casi rompes el récord de... fallar estrepitosamente!",
    "Los conos están celebrando tu derrota ahora mismo.",
    "¿Viste un fantasma o por qué esquivaste los puntos?",
    "Tu estilo de manejo es 'especial', por no decir otra cosa.",
    "¡Directo al desguace con ese motor!",
    "Menos mal que los conos son de plástico, ¿verdad?",
    "¡Tus neumáticos están pidiendo clemencia a gritos!",
];

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Error)]
pub enum CommentaryError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("empty response")]
    Empty,

    #[error("timed out")]
    TimedOut,
}

/// Anything that can produce a line of commentary for a final score
pub trait CommentarySource {
    fn commentary(&self, score: u64) -> LocalBoxFuture<'_, Result<String, CommentaryError>>;
}

/// Prompt sent to the service
pub fn prompt(score: u64) -> String {
    format!(
        "Short funny sarcastic Spanish comment (max 10 words) about a driver who got {} score hitting cones with a red car.",
        score
    )
}

/// Pick a canned line uniformly at random
pub fn fallback_comment<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FALLBACK_COMMENTS[rng.random_range(0..FALLBACK_COMMENTS.len())]
}

/// Ask `source` for commentary, racing it against `timeout`.
///
/// No source, an error, blank text or the timeout all yield a fallback line.
pub async fn commentary_or_fallback<S, T, R>(
    source: Option<&S>,
    score: u64,
    timeout: T,
    rng: &mut R,
) -> String
where
    S: CommentarySource + ?Sized,
    T: Future<Output = ()>,
    R: Rng + ?Sized,
{
    let result = match source {
        Some(source) => {
            let request = source.commentary(score);
            match select(request, Box::pin(timeout)).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => Err(CommentaryError::TimedOut),
            }
        }
        None => Err(CommentaryError::MissingApiKey),
    };

    match result.map(|text| text.trim().to_string()) {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => {
            log::debug!("Commentary unavailable: {}", CommentaryError::Empty);
            fallback_comment(rng).to_string()
        }
        Err(e) => {
            log::debug!("Commentary unavailable: {}", e);
            fallback_comment(rng).to_string()
        }
    }
}

/// Wrap a commentary future so the host can cancel it.
///
/// The returned future resolves to None when aborted.
pub fn abortable<F>(request: F) -> (impl Future<Output = Option<String>>, AbortHandle)
where
    F: Future<Output = String>,
{
    let (handle, registration) = AbortHandle::new_pair();
    let task = Abortable::new(request, registration).map(|result| result.ok());
    (task, handle)
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
            model,
        }
    }

    /// Client configured from the `GEMINI_API_KEY` set at build time
    pub fn from_build_env() -> Result<Self, CommentaryError> {
        let api_key = option_env!("GEMINI_API_KEY")
            .filter(|k| !k.is_empty())
            .ok_or(CommentaryError::MissingApiKey)?;
        let model = option_env!("GEMINI_MODEL").unwrap_or(DEFAULT_MODEL);
        Ok(Self::new(
            api_key.to_string(),
            DEFAULT_API_URL.to_string(),
            model.to_string(),
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    async fn generate(&self, score: u64) -> Result<String, CommentaryError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt(score) }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CommentaryError::Status { status, body });
        }

        let completion: GenerateResponse = response.json().await?;
        completion.into_text()
    }
}

impl CommentarySource for GeminiClient {
    fn commentary(&self, score: u64) -> LocalBoxFuture<'_, Result<String, CommentaryError>> {
        self.generate(score).boxed_local()
    }
}

// Gemini API format
#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// First candidate's first text part, trimmed
    fn into_text(self) -> Result<String, CommentaryError> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(CommentaryError::Empty)
    }
}

/// Resolve after `ms` milliseconds (browser `setTimeout`)
#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::{pending, ready};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    enum Stub {
        Reply(&'static str),
        Fail,
        Hang,
    }

    impl CommentarySource for Stub {
        fn commentary(&self, _score: u64) -> LocalBoxFuture<'_, Result<String, CommentaryError>> {
            match self {
                Stub::Reply(text) => ready(Ok(text.to_string())).boxed_local(),
                Stub::Fail => ready(Err(CommentaryError::Status {
                    status: 500,
                    body: "boom".into(),
                }))
                .boxed_local(),
                Stub::Hang => pending().boxed_local(),
            }
        }
    }

    fn is_fallback(text: &str) -> bool {
        FALLBACK_COMMENTS.contains(&text)
    }

    #[test]
    fn test_reply_is_trimmed() {
        let mut rng = Pcg32::seed_from_u64(1);
        let text = block_on(commentary_or_fallback(
            Some(&Stub::Reply("  ¡Qué desastre!  ")),
            12,
            pending(),
            &mut rng,
        ));
        assert_eq!(text, "¡Qué desastre!");
    }

    #[test]
    fn test_failure_uses_fallback() {
        let mut rng = Pcg32::seed_from_u64(1);
        let text = block_on(commentary_or_fallback(
            Some(&Stub::Fail),
            12,
            pending(),
            &mut rng,
        ));
        assert!(is_fallback(&text));
    }

    #[test]
    fn test_blank_reply_uses_fallback() {
        let mut rng = Pcg32::seed_from_u64(1);
        let text = block_on(commentary_or_fallback(
            Some(&Stub::Reply("   ")),
            0,
            pending(),
            &mut rng,
        ));
        assert!(is_fallback(&text));
    }

    #[test]
    fn test_timeout_uses_fallback() {
        let mut rng = Pcg32::seed_from_u64(1);
        let text = block_on(commentary_or_fallback(
            Some(&Stub::Hang),
            12,
            ready(()),
            &mut rng,
        ));
        assert!(is_fallback(&text));
    }

    #[test]
    fn test_no_source_uses_fallback() {
        let mut rng = Pcg32::seed_from_u64(1);
        let text = block_on(commentary_or_fallback::<Stub, _, _>(
            None,
            12,
            pending(),
            &mut rng,
        ));
        assert!(is_fallback(&text));
    }

    #[test]
    fn test_fallback_covers_whole_pool() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(fallback_comment(&mut rng));
        }
        assert_eq!(seen.len(), FALLBACK_COMMENTS.len());
    }

    #[test]
    fn test_aborted_request_resolves_to_none() {
        let (task, handle) = abortable(pending::<String>());
        handle.abort();
        assert_eq!(block_on(task), None);

        let (task, _handle) = abortable(ready("hola".to_string()));
        assert_eq!(block_on(task), Some("hola".to_string()));
    }

    #[test]
    fn test_prompt_mentions_score() {
        assert!(prompt(27).contains("got 27 score"));
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":" Frena un poco \n"}],"role":"model"}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "Frena un poco");

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(empty.into_text(), Err(CommentaryError::Empty)));

        let no_field: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(no_field.into_text(), Err(CommentaryError::Empty)));
    }

    #[test]
    fn test_endpoint_format() {
        let client = GeminiClient::new("k".into(), "https://api.example.com/v1".into(), "m".into());
        assert_eq!(
            client.endpoint(),
            "https://api.example.com/v1/models/m:generateContent"
        );
    }
}
