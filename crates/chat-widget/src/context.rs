use crate::completion::{CompletionRequest, WireMessage, WireRole};
use crate::conversation::{Conversation, Role};
use crate::prompts::system_prompt;

/// Assemble the ordered request payload for one submission: the fixed system
/// instructions, then every stored turn (role and content only), then the
/// new user turn. The caller has already validated that `new_user_text` is
/// non-empty after trimming.
pub fn assemble_request(conversation: &Conversation, new_user_text: &str) -> CompletionRequest {
    let mut messages = Vec::with_capacity(conversation.len() + 2);
    messages.push(WireMessage::new(WireRole::System, system_prompt()));

    for turn in conversation.turns() {
        let role = match turn.role {
            Role::User => WireRole::User,
            Role::Assistant => WireRole::Assistant,
        };
        messages.push(WireMessage::new(role, turn.content.clone()));
    }

    messages.push(WireMessage::new(WireRole::User, new_user_text));

    CompletionRequest { messages }
}
