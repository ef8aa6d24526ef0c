use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::completion::{CompletionError, CompletionGateway, CompletionRequest};
use crate::context::assemble_request;
use crate::contract::{ReplyShape, interpret_reply};
use crate::conversation::{Conversation, Turn};
use crate::prompts::ERROR_REPLY_TEXT;

/// Observable side effect the embedding shell must reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEffect {
    ScrollToLatest,
    FocusInput,
}

/// Why a submission attempt was rejected without any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Draft is empty after trimming; rejected silently, no turn, no call.
    EmptyDraft,
    /// A request is already in flight; rejected, never queued.
    RequestInFlight,
}

/// The chat widget controller: owns the conversation, the draft input, the
/// single-flight pending guard, and the open/closed visibility state.
///
/// One instance per mounted widget; all mutation goes through `&mut self`,
/// so transitions are serialized by construction. The submission state
/// machine is split-phase: [`begin_submit`](Self::begin_submit) performs the
/// Idle -> Submitting transition and yields the request to send,
/// [`complete_submit`](Self::complete_submit) applies the outcome and
/// returns to Idle. [`submit`](Self::submit) drives both phases through the
/// configured gateway.
pub struct ChatController {
    widget_id: Uuid,
    conversation: Conversation,
    draft: String,
    pending: bool,
    open: bool,
    effects: Vec<ShellEffect>,
    gateway: Arc<dyn CompletionGateway>,
}

impl ChatController {
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        let widget_id = Uuid::new_v4();
        info!(widget_id = %widget_id, "chat widget controller created");

        Self {
            widget_id,
            conversation: Conversation::new(),
            draft: String::new(),
            pending: false,
            open: false,
            effects: vec![ShellEffect::ScrollToLatest],
            gateway,
        }
    }

    pub fn widget_id(&self) -> Uuid {
        self.widget_id
    }

    /// Read-only snapshot of the conversation for rendering.
    pub fn turns(&self) -> &[Turn] {
        self.conversation.turns()
    }

    /// True while a completion request is in flight; input controls are
    /// disabled in this state.
    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft text (keystroke path).
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
        if self.open {
            self.effects.push(ShellEffect::FocusInput);
        }
    }

    /// Write a suggestion chip's text into the draft without submitting.
    ///
    /// Only the latest assistant turn's suggestions are interactive;
    /// anything else is ignored.
    pub fn select_suggestion(&mut self, text: &str) {
        let active = self.conversation.active_suggestions();
        if !active.iter().any(|suggestion| suggestion == text) {
            return;
        }

        self.draft = text.to_string();
        self.effects.push(ShellEffect::FocusInput);
    }

    /// Idle -> Submitting: validate the draft, append the user turn, clear
    /// the draft, set the pending guard, and yield the request to send.
    pub fn begin_submit(&mut self) -> Result<CompletionRequest, SubmitRejection> {
        if self.draft.trim().is_empty() {
            return Err(SubmitRejection::EmptyDraft);
        }
        if self.pending {
            return Err(SubmitRejection::RequestInFlight);
        }

        let text = std::mem::take(&mut self.draft);
        let request = assemble_request(&self.conversation, &text);
        debug!(
            widget_id = %self.widget_id,
            message_count = request.messages.len(),
            "submission accepted"
        );

        self.append_turn(Turn::user(text));
        self.pending = true;
        Ok(request)
    }

    /// Submitting -> Idle: interpret the outcome, append the resulting
    /// assistant turn, and release the pending guard. Every outcome,
    /// including transport errors and malformed payloads, releases the
    /// guard.
    pub fn complete_submit(&mut self, outcome: Result<String, CompletionError>) {
        let turn = match outcome {
            Ok(raw) => {
                let interpreted = interpret_reply(&raw);
                if interpreted.shape == ReplyShape::Unstructured {
                    warn!(
                        widget_id = %self.widget_id,
                        "completion reply fell back to plain text"
                    );
                }
                Turn::assistant(interpreted.content)
                    .with_suggestions(interpreted.suggestions)
                    .with_topic(interpreted.topic)
            }
            Err(err) => {
                warn!(widget_id = %self.widget_id, "submission failed: {err}");
                Turn::assistant(ERROR_REPLY_TEXT)
            }
        };

        self.append_turn(turn);
        self.pending = false;
    }

    /// Full submission cycle against the configured gateway.
    pub async fn submit(&mut self) -> Result<(), SubmitRejection> {
        let request = self.begin_submit()?;
        let gateway = Arc::clone(&self.gateway);
        let outcome = gateway.complete(request).await;
        self.complete_submit(outcome);
        Ok(())
    }

    /// Take the shell effects accumulated since the last drain.
    pub fn drain_effects(&mut self) -> Vec<ShellEffect> {
        std::mem::take(&mut self.effects)
    }

    fn append_turn(&mut self, turn: Turn) {
        self.conversation.append(turn);
        self.effects.push(ShellEffect::ScrollToLatest);
    }
}
