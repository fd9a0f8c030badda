use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::{
    prompt::{build_prompt, clean_announcement},
    retry::fetch_with_retry,
    wire::{GeneratedText, InferenceRequest},
    AnnounceError, ClientOptions, PromptContext, Result, RetryRequest,
};

/// Hosted model used when no endpoint is configured.
pub const DEFAULT_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-Nemo-Instruct-2407";

/// Environment variable holding the inference API token.
pub const API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

/// Environment variable overriding [`DEFAULT_MODEL_URL`].
pub const MODEL_URL_ENV: &str = "ANNOUNCE_MODEL_URL";

#[derive(Clone)]
/// Drafts announcements through a hosted text-generation endpoint.
pub struct AnnouncementClient {
    http: reqwest::Client,
    model_url: String,
    authorization: String,
    options: ClientOptions,
    prompt: PromptContext,
}

impl fmt::Debug for AnnouncementClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnouncementClient")
            .field("model_url", &self.model_url)
            .field("authorization", &"<redacted>")
            .field("options", &self.options)
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl AnnouncementClient {
    /// Creates a client from a bearer token.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added automatically.
    pub fn new(model_url: impl Into<String>, token: impl AsRef<str>) -> Self {
        let authorization = normalize_bearer_authorization(token.as_ref());
        Self::new_raw_auth(model_url, authorization)
    }

    /// Creates a client with a full raw authorization value.
    pub fn new_raw_auth(model_url: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            model_url: model_url.into(),
            authorization: authorization.into(),
            options: ClientOptions::default(),
            prompt: PromptContext::default(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `HUGGINGFACE_API_KEY` — access token (Bearer prefix optional)
    /// - `ANNOUNCE_MODEL_URL` — optional endpoint, defaults to [`DEFAULT_MODEL_URL`]
    ///
    /// # Example
    ///
    /// ```no_run
    /// use announce_ai::AnnouncementClient;
    ///
    /// let client = AnnouncementClient::from_env().expect("missing HUGGINGFACE_API_KEY");
    /// ```
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(API_KEY_ENV)
            .map_err(|_| AnnounceError::Config(format!("missing {API_KEY_ENV} environment variable")))?;
        if token.trim().is_empty() {
            return Err(AnnounceError::Config(format!("{API_KEY_ENV} is set but empty")));
        }
        let model_url = std::env::var(MODEL_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_URL.to_owned());
        Ok(Self::new(model_url, token))
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the requester, audience and date used in the prompt.
    pub fn with_prompt_context(mut self, prompt: PromptContext) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn model_url(&self) -> &str {
        &self.model_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Generates an announcement body from free-form request details.
    pub async fn generate(&self, details: &str) -> Result<String> {
        self.generate_with_cancel(details, &CancellationToken::new())
            .await
    }

    /// Same as [`AnnouncementClient::generate`], aborting with
    /// [`AnnounceError::Cancelled`] once `cancel` fires.
    pub async fn generate_with_cancel(
        &self,
        details: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let prompt = build_prompt(&self.prompt, details);
        let request = RetryRequest::post_json(
            &self.model_url,
            &self.authorization,
            &InferenceRequest { inputs: &prompt },
        )?;

        let response = fetch_with_retry(
            &self.http,
            &request,
            &self.options.retry,
            self.options.timeout(),
            cancel,
        )
        .await?;

        let body = response.text().await.map_err(AnnounceError::Transport)?;
        let generated = serde_json::from_str::<Vec<GeneratedText>>(&body).map_err(|err| {
            AnnounceError::Decode(format!(
                "invalid text-generation response JSON: {err}; body: {body}"
            ))
        })?;

        let text = generated
            .into_iter()
            .next()
            .and_then(|item| item.generated_text)
            .filter(|text| !text.is_empty())
            .ok_or(AnnounceError::EmptyGeneration)?;
        tracing::debug!(generated = text.as_str(), "generated AI response");

        let cleaned = clean_announcement(&text);
        tracing::debug!(cleaned = cleaned.as_str(), "cleaned AI response");
        Ok(cleaned)
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
