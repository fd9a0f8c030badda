//! `announce-ai` drafts school announcements with a hosted text-generation
//! model.
//!
//! The outbound call goes through [`fetch_with_retry`], which waits out model
//! cold starts and retries transport failures with exponential backoff:
//! - [`AnnouncementClient::generate`]
//! - [`AnnouncementDraft::validate`]
//! - [`server::router`] (with the `server` feature)

mod client;
mod error;
mod options;
mod request;
mod wire;

pub mod draft;
pub mod prompt;
pub mod retry;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use client::{AnnouncementClient, API_KEY_ENV, DEFAULT_MODEL_URL, MODEL_URL_ENV};
pub use draft::{AnnouncementDraft, FieldError, ValidAnnouncement};
pub use error::{AnnounceError, AttemptError};
pub use options::{ClientOptions, RetryPolicy};
pub use prompt::PromptContext;
pub use request::RetryRequest;
pub use retry::fetch_with_retry;
pub use wire::{ErrorBody, GenerateRequest, GenerateResponse, UpstreamErrorShape};

#[cfg(feature = "server")]
pub use config::ServerConfig;

pub type Result<T> = std::result::Result<T, AnnounceError>;
