use serde::Deserialize;
use serde_json::Value;

use crate::models::hook::lenient_u64;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct MessageUsage {
    #[serde(deserialize_with = "lenient_u64")]
    pub input_tokens: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub output_tokens: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub cache_read_input_tokens: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct MessageObj {
    pub usage: Option<MessageUsage>,
    pub timestamp: Option<Value>,
    pub created_at: Option<Value>,
}

/// One line of a session log
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LogRecord {
    pub r#type: Option<String>,
    pub usage: Option<MessageUsage>,
    pub message: Option<MessageObj>,
    pub timestamp: Option<Value>,
    pub created_at: Option<Value>,
}

impl LogRecord {
    /// Usage object at the top level, else the one nested under `message`
    pub fn usage(&self) -> Option<&MessageUsage> {
        self.usage
            .as_ref()
            .or_else(|| self.message.as_ref().and_then(|m| m.usage.as_ref()))
    }

    /// Untyped records count when they carry usage; typed ones only when
    /// they are assistant turns.
    pub fn counts_toward_usage(&self) -> bool {
        match self.r#type.as_deref() {
            Some(t) => t == "assistant",
            None => self.usage().is_some(),
        }
    }

    pub fn raw_timestamp(&self) -> Option<&Value> {
        let nested = self.message.as_ref();
        self.timestamp
            .as_ref()
            .or(self.created_at.as_ref())
            .or_else(|| nested.and_then(|m| m.timestamp.as_ref()))
            .or_else(|| nested.and_then(|m| m.created_at.as_ref()))
    }
}

/// Whole-file transcript document written by older host versions
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LegacyTranscript {
    pub messages: Vec<LegacyMessage>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LegacyMessage {
    #[serde(rename = "inputTokens", deserialize_with = "lenient_u64")]
    pub input_tokens: Option<u64>,
}
