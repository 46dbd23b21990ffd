//! # Usage Module
//!
//! Turns a [`UsageSnapshot`] into a clamped integer percentage of the model's
//! context limit, and resolves the model's limit and plan label from
//! configurable substring tables.

use serde::Deserialize;

use crate::models::{ModelInfo, UsageSnapshot};

pub const DEFAULT_CONTEXT_LIMIT: u64 = 200_000;
/// Default for the large-context family; overridable through the config file
pub const LARGE_CONTEXT_LIMIT: u64 = 1_000_000;

/// floor(total * 100 / limit), clamped to [0, 100]. `limit <= 0` yields 0.
pub fn percentage(snapshot: &UsageSnapshot, limit: i64) -> u32 {
    if limit <= 0 {
        return 0;
    }
    let pct = u128::from(snapshot.total()) * 100 / limit as u128;
    pct.min(100) as u32
}

/// `percentage` for limits held as unsigned configuration values
pub fn percentage_of(snapshot: &UsageSnapshot, limit: u64) -> u32 {
    percentage(snapshot, i64::try_from(limit).unwrap_or(i64::MAX))
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LimitRule {
    pub pattern: String,
    pub limit: u64,
}

/// Model → context limit. First matching rule wins.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ContextLimits {
    pub default: u64,
    pub rules: Vec<LimitRule>,
}

impl Default for ContextLimits {
    fn default() -> Self {
        let rule = |pattern: &str| LimitRule {
            pattern: pattern.to_string(),
            limit: LARGE_CONTEXT_LIMIT,
        };
        Self {
            default: DEFAULT_CONTEXT_LIMIT,
            rules: vec![rule("sonnet-4-5"), rule("sonnet 4.5"), rule("[1m]")],
        }
    }
}

impl ContextLimits {
    pub fn limit_for(&self, model: Option<&ModelInfo>) -> u64 {
        model
            .and_then(|m| self.rules.iter().find(|r| m.matches(&r.pattern)))
            .map(|r| r.limit)
            .unwrap_or(self.default)
    }

    /// Set the limit of every large-context rule
    pub fn set_large_limit(&mut self, limit: u64) {
        for rule in self.rules.iter_mut() {
            if rule.limit > self.default {
                rule.limit = limit;
            }
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlanRule {
    pub pattern: String,
    pub plan: String,
}

/// Model → plan label shown when there is no usage data
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PlanTable {
    pub default: String,
    pub rules: Vec<PlanRule>,
}

impl Default for PlanTable {
    fn default() -> Self {
        let rule = |pattern: &str, plan: &str| PlanRule {
            pattern: pattern.to_string(),
            plan: plan.to_string(),
        };
        Self {
            default: "Free".to_string(),
            rules: vec![
                rule("opus", "Pro"),
                rule("sonnet", "Pro"),
                rule("haiku", "Free"),
            ],
        }
    }
}

impl PlanTable {
    pub fn plan_for(&self, model: Option<&ModelInfo>) -> &str {
        model
            .and_then(|m| self.rules.iter().find(|r| m.matches(&r.pattern)))
            .map(|r| r.plan.as_str())
            .unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(input: u64, output: u64, create: u64, read: u64) -> UsageSnapshot {
        UsageSnapshot {
            input_tokens: input,
            output_tokens: output,
            cache_creation_tokens: create,
            cache_read_tokens: read,
        }
    }

    fn model(id: &str, display_name: &str) -> ModelInfo {
        ModelInfo {
            id: id.to_string(),
            display_name: display_name.to_string(),
        }
    }

    #[test]
    fn percentage_floors_and_clamps() {
        assert_eq!(percentage(&snap(1999, 0, 0, 0), 200_000), 0);
        assert_eq!(percentage(&snap(2000, 0, 0, 0), 200_000), 1);
        assert_eq!(percentage(&snap(149_999, 0, 0, 0), 200_000), 74);
        assert_eq!(percentage(&snap(200_000, 0, 0, 0), 200_000), 100);
        assert_eq!(percentage(&snap(u64::MAX, u64::MAX, u64::MAX, 0), 1), 100);
    }

    #[test]
    fn non_positive_limits_yield_zero() {
        assert_eq!(percentage(&snap(500, 0, 0, 0), 0), 0);
        assert_eq!(percentage(&snap(500, 0, 0, 0), -10), 0);
    }

    #[test]
    fn percentage_ignores_cache_reads() {
        let base = snap(100, 50, 10, 0);
        for read in [0, 1, 999, 10_000_000] {
            assert_eq!(
                percentage(&snap(100, 50, 10, read), 1_000),
                percentage(&base, 1_000)
            );
        }
    }

    #[test]
    fn percentage_is_monotonic_in_total() {
        let mut last = 0;
        for total in (0..=450_000u64).step_by(1_337) {
            let pct = percentage(&snap(total, 0, 0, 0), 400_000);
            assert!(pct >= last);
            assert!(pct <= 100);
            last = pct;
        }
    }

    #[test]
    fn large_context_family_is_detected_from_id_or_display_name() {
        let limits = ContextLimits::default();
        assert_eq!(
            limits.limit_for(Some(&model("claude-sonnet-4-5-20250929", ""))),
            LARGE_CONTEXT_LIMIT
        );
        assert_eq!(
            limits.limit_for(Some(&model("x", "Sonnet 4.5"))),
            LARGE_CONTEXT_LIMIT
        );
        assert_eq!(
            limits.limit_for(Some(&model("claude-opus-4-1", "Opus 4.1"))),
            DEFAULT_CONTEXT_LIMIT
        );
        assert_eq!(limits.limit_for(None), DEFAULT_CONTEXT_LIMIT);
    }

    #[test]
    fn large_limit_can_be_reconfigured() {
        let mut limits = ContextLimits::default();
        limits.set_large_limit(1_700_000);
        assert_eq!(
            limits.limit_for(Some(&model("claude-sonnet-4-5", ""))),
            1_700_000
        );
        assert_eq!(limits.default, DEFAULT_CONTEXT_LIMIT);
    }

    #[test]
    fn plan_labels() {
        let plans = PlanTable::default();
        assert_eq!(plans.plan_for(Some(&model("claude-opus-4", ""))), "Pro");
        assert_eq!(plans.plan_for(Some(&model("", "Claude Sonnet 4"))), "Pro");
        assert_eq!(plans.plan_for(Some(&model("claude-3-5-haiku", ""))), "Free");
        assert_eq!(plans.plan_for(Some(&model("gpt-oss", ""))), "Free");
        assert_eq!(plans.plan_for(None), "Free");
    }
}
