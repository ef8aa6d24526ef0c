pub mod gateway;
pub mod http;

pub use gateway::{
    CompletionError, CompletionFuture, CompletionGateway, CompletionRequest, WireMessage, WireRole,
};
pub use http::{CompletionConfigError, HttpCompletionConfig, HttpCompletionGateway};
