use std::sync::LazyLock;

use jsonschema::JSONSchema;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Upper bound on suggestion chips carried by one assistant reply.
pub const MAX_SUGGESTIONS: usize = 4;

/// The reply shape the completion endpoint is instructed to return.
///
/// The instruction is a prompt contract, not a mechanical guarantee, so this
/// type is only the fully-conforming case. [`interpret_reply`] accepts any
/// raw payload and degrades through [`ReplyShape::Partial`] and
/// [`ReplyShape::Unstructured`] instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StructuredReply {
    pub reply: String,
    #[serde(default)]
    #[schemars(length(max = 4))]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

/// Conformance class of a raw completion payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// Valid JSON that passes the contract schema.
    Structured,
    /// Valid JSON with a usable `reply` string but schema violations elsewhere.
    Partial,
    /// Not JSON, or JSON without a usable `reply`; the raw text becomes the reply.
    Unstructured,
}

/// Interpreted assistant reply; always renderable.
#[derive(Debug, Clone)]
pub struct InterpretedReply {
    pub shape: ReplyShape,
    pub content: String,
    pub suggestions: Vec<String>,
    pub topic: Option<String>,
}

/// JSON Schema for [`StructuredReply`], embedded in the system prompt and
/// used to classify incoming payloads.
pub fn reply_schema() -> Value {
    serde_json::to_value(schema_for!(StructuredReply))
        .expect("structured reply schema should be serializable")
}

static REPLY_VALIDATOR: LazyLock<Result<JSONSchema, String>> =
    LazyLock::new(|| JSONSchema::compile(&reply_schema()).map_err(|err| err.to_string()));

/// Interpret the raw text returned by the completion endpoint.
///
/// Never fails: a payload that is not the contractual JSON object degrades to
/// a plain-text reply with no suggestions and no topic.
pub fn interpret_reply(raw: &str) -> InterpretedReply {
    let Ok(payload) = serde_json::from_str::<Value>(raw) else {
        return unstructured(raw);
    };

    let Some(reply) = payload.get("reply").and_then(Value::as_str) else {
        return unstructured(raw);
    };

    let shape = classify(&payload);
    if shape == ReplyShape::Partial {
        warn!("completion payload has a usable reply but violates the contract schema");
    }

    InterpretedReply {
        shape,
        content: reply.to_string(),
        suggestions: extract_suggestions(&payload),
        topic: payload
            .get("topic")
            .and_then(Value::as_str)
            .map(ToString::to_string),
    }
}

fn classify(payload: &Value) -> ReplyShape {
    match &*REPLY_VALIDATOR {
        Ok(validator) if validator.is_valid(payload) => ReplyShape::Structured,
        Ok(_) => ReplyShape::Partial,
        Err(message) => {
            warn!("reply schema failed to compile, classifying as partial: {message}");
            ReplyShape::Partial
        }
    }
}

fn extract_suggestions(payload: &Value) -> Vec<String> {
    let Some(items) = payload.get("suggestions").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_str)
        .map(ToString::to_string)
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn unstructured(raw: &str) -> InterpretedReply {
    InterpretedReply {
        shape: ReplyShape::Unstructured,
        content: raw.to_string(),
        suggestions: Vec::new(),
        topic: None,
    }
}
