pub mod hook;
pub mod message;
pub mod snapshot;

pub use hook::HookJson;
pub use message::{LegacyTranscript, LogRecord, MessageUsage};
pub use snapshot::{ModelInfo, UsageSnapshot};
