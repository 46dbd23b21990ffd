use crate::models::message::MessageUsage;

/// Token counters gathered for one rendering pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    /// Informational only; never part of `total()`
    pub cache_read_tokens: u64,
}

impl UsageSnapshot {
    /// Snapshot for sources that only report one aggregate number
    pub fn from_total(total: u64) -> Self {
        Self {
            input_tokens: total,
            ..Self::default()
        }
    }

    /// Tokens counted against the context budget
    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn add_usage(&mut self, usage: &MessageUsage) {
        self.input_tokens = self
            .input_tokens
            .saturating_add(usage.input_tokens.unwrap_or(0));
        self.output_tokens = self
            .output_tokens
            .saturating_add(usage.output_tokens.unwrap_or(0));
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(usage.cache_creation_input_tokens.unwrap_or(0));
        self.cache_read_tokens = self
            .cache_read_tokens
            .saturating_add(usage.cache_read_input_tokens.unwrap_or(0));
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: String,
}

impl ModelInfo {
    /// Case-insensitive substring match against id or display name
    pub fn matches(&self, pattern: &str) -> bool {
        let needle = pattern.to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.id.to_lowercase().contains(&needle)
            || self.display_name.to_lowercase().contains(&needle)
    }
}
