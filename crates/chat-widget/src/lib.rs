pub mod completion;
pub mod context;
pub mod contract;
pub mod controller;
pub mod conversation;
pub mod prompts;
pub mod render;

pub use completion::{
    CompletionConfigError, CompletionError, CompletionGateway, CompletionRequest,
    HttpCompletionConfig, HttpCompletionGateway, WireMessage, WireRole,
};
pub use context::assemble_request;
pub use contract::{
    InterpretedReply, MAX_SUGGESTIONS, ReplyShape, StructuredReply, interpret_reply, reply_schema,
};
pub use controller::{ChatController, ShellEffect, SubmitRejection};
pub use conversation::{Conversation, Role, Turn};
pub use prompts::{ERROR_REPLY_TEXT, GREETING_TEXT, system_prompt};
pub use render::{ContentSpan, content_spans};
