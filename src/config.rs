use serde::Deserialize;

use crate::error::ClientError;

pub const DEFAULT_POLL_INTERVAL_MS: u32 = 5000;
pub const DEFAULT_REPOLL_DELAY_MS: u32 = 1000;
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 1000;
pub const DEFAULT_MIN_QUEUE_SLOTS: usize = 2;
pub const MAX_QUEUE_SLOTS: usize = 64;

/// Tuning for a mounted view. Every key is optional in the JSON form.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Prefix for `/api/...` paths; empty means same origin.
    pub api_base: String,
    pub poll_interval_ms: u32,
    /// Delay before re-polling after an accepted upgrade.
    pub repoll_delay_ms: u32,
    /// Local bar production period in the trainer demo.
    pub tick_interval_ms: u32,
    pub min_queue_slots: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            api_base: String::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            repoll_delay_ms: DEFAULT_REPOLL_DELAY_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            min_queue_slots: DEFAULT_MIN_QUEUE_SLOTS,
        }
    }
}

impl ViewConfig {
    pub fn from_json(json: &str) -> Result<ViewConfig, ClientError> {
        let mut cfg: ViewConfig =
            serde_json::from_str(json).map_err(|e| ClientError::Config(e.to_string()))?;
        cfg.api_base = cfg.api_base.trim_end_matches('/').to_string();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Entry points pass `None` or an empty string for defaults.
    pub fn from_optional_json(json: Option<String>) -> Result<ViewConfig, ClientError> {
        match json {
            Some(json) if !json.trim().is_empty() => ViewConfig::from_json(&json),
            _ => Ok(ViewConfig::default()),
        }
    }

    fn validate(&self) -> Result<(), ClientError> {
        // Browser timers take an i32 millisecond count.
        let max = i32::MAX as u32;
        for (key, value) in [
            ("pollIntervalMs", self.poll_interval_ms),
            ("tickIntervalMs", self.tick_interval_ms),
        ] {
            if value == 0 {
                return Err(ClientError::Config(format!("{} must be positive", key)));
            }
            if value > max {
                return Err(ClientError::Config(format!("{} is too large", key)));
            }
        }
        if self.repoll_delay_ms > max {
            return Err(ClientError::Config("repollDelayMs is too large".to_string()));
        }
        if self.min_queue_slots > MAX_QUEUE_SLOTS {
            return Err(ClientError::Config(format!(
                "minQueueSlots must be at most {}",
                MAX_QUEUE_SLOTS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_cadence() {
        let cfg = ViewConfig::from_optional_json(None).unwrap();
        assert_eq!(cfg.poll_interval_ms, 5000);
        assert_eq!(cfg.repoll_delay_ms, 1000);
        assert_eq!(cfg.tick_interval_ms, 1000);
        assert_eq!(cfg.min_queue_slots, 2);
        assert_eq!(ViewConfig::from_optional_json(Some("  ".into())).unwrap(), cfg);
    }

    #[test]
    fn partial_json_overrides_only_given_keys() {
        let cfg = ViewConfig::from_json(r#"{"apiBase": "http://localhost:8080/", "repollDelayMs": 250}"#)
            .unwrap();
        assert_eq!(cfg.api_base, "http://localhost:8080");
        assert_eq!(cfg.repoll_delay_ms, 250);
        assert_eq!(cfg.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn rejects_zero_interval_and_unknown_keys() {
        assert!(matches!(
            ViewConfig::from_json(r#"{"pollIntervalMs": 0}"#),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ViewConfig::from_json(r#"{"pollIntervalSeconds": 5}"#),
            Err(ClientError::Config(_))
        ));
        assert!(ViewConfig::from_json(r#"{"repollDelayMs": 0}"#).is_ok());
    }

    #[test]
    fn queue_slot_padding_is_capped() {
        assert!(ViewConfig::from_json(r#"{"minQueueSlots": 64}"#).is_ok());
        assert!(matches!(
            ViewConfig::from_json(r#"{"minQueueSlots": 65}"#),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ViewConfig::from_json(r#"{"minQueueSlots": 1000000000000000000}"#),
            Err(ClientError::Config(_))
        ));
    }
}
