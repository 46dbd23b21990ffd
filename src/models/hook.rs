use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::snapshot::{ModelInfo, UsageSnapshot};
use crate::utils::value_as_u64;

/// Accepts integers, floats and numeric strings; anything else becomes `None`
/// instead of failing the whole payload.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(value_as_u64))
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct HookModel {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

/// Aggregate context counters some host versions send alongside the model
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct HookContextWindow {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_input_tokens: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_output_tokens: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub context_window_size: Option<u64>,
}

/// Statusline payload delivered on stdin. Unknown keys are ignored.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct HookJson {
    pub session_id: Option<String>,
    pub transcript_path: Option<String>,
    pub model: Option<HookModel>,
    #[serde(deserialize_with = "lenient_u64")]
    pub current_tokens: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub expected_total_tokens: Option<u64>,
    #[serde(rename = "inputTokens", deserialize_with = "lenient_u64")]
    pub input_tokens: Option<u64>,
    pub context_window: Option<HookContextWindow>,
}

impl HookJson {
    pub fn model_info(&self) -> Option<ModelInfo> {
        let m = self.model.as_ref()?;
        Some(ModelInfo {
            id: m.id.clone().unwrap_or_default(),
            display_name: m.display_name.clone().unwrap_or_default(),
        })
    }

    /// First non-zero direct token field, in priority order, with the name of
    /// the field it came from.
    pub fn direct_usage(&self) -> Option<(UsageSnapshot, &'static str)> {
        let scalar = [
            (self.current_tokens, "current_tokens"),
            (self.expected_total_tokens, "expected_total_tokens"),
            (self.input_tokens, "inputTokens"),
        ];
        for (value, name) in scalar {
            if let Some(n) = value.filter(|n| *n > 0) {
                return Some((UsageSnapshot::from_total(n), name));
            }
        }
        let cw = self.context_window.as_ref()?;
        let snapshot = UsageSnapshot {
            input_tokens: cw.total_input_tokens.unwrap_or(0),
            output_tokens: cw.total_output_tokens.unwrap_or(0),
            ..UsageSnapshot::default()
        };
        if snapshot.total() > 0 {
            Some((snapshot, "context_window"))
        } else {
            None
        }
    }

    /// Host-declared context size; zero is treated as absent.
    pub fn context_window_size(&self) -> Option<u64> {
        self.context_window
            .as_ref()
            .and_then(|cw| cw.context_window_size)
            .filter(|n| *n > 0)
    }

    pub fn transcript_path(&self) -> Option<&str> {
        self.transcript_path
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
