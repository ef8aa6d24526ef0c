use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>>;

/// Wire-level role. `System` exists only here; the conversation log never
/// stores a system turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
}

/// One entry of the `messages` array sent to the completion endpoint.
/// Role and content only; timestamps and suggestions are never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: WireRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request timed out")]
    Timeout,
    #[error("completion provider request failed: {0}")]
    ProviderFailure(String),
    #[error("completion provider returned an invalid payload: {0}")]
    InvalidPayload(String),
}

/// The external chat-completion service, seen from the widget.
///
/// Implementations resolve to the raw assistant text of the first choice;
/// interpreting that text against the structured-reply contract is the
/// widget's concern, not the transport's.
pub trait CompletionGateway: Send + Sync {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a>;
}
