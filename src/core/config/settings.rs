use std::path::PathBuf;

use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_environment, parse_f64, parse_u64,
};
use super::types::{
    ConfigError, DedupSettings, IngestSettings, RuntimeSettings, Settings, TelemetrySettings,
};

const DEFAULT_EVENTS_PATH: &str = "attempt_events.json";
/// One year.
const MAX_WINDOW_MINUTES: u64 = 365 * 24 * 60;

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment = parse_environment(
            env_optional("ASSESSMENT_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("ASSESSMENT_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let log_level = env_or_default("ASSESSMENT_LOG_LEVEL", "info");
        let json = env_optional("ASSESSMENT_LOG_JSON")
            .map(|value| parse_bool(&value))
            .unwrap_or_else(|| environment.is_production());
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let window_minutes =
            parse_u64("DEDUP_WINDOW_MINUTES", env_or_default("DEDUP_WINDOW_MINUTES", "7"))?;
        let similarity_threshold = parse_f64(
            "DEDUP_SIMILARITY_THRESHOLD",
            env_or_default("DEDUP_SIMILARITY_THRESHOLD", "0.92"),
        )?;

        let explicit_events_path = env_optional("ATTEMPT_EVENTS_PATH");
        let events_path_explicit = explicit_events_path.is_some();
        let events_path =
            PathBuf::from(explicit_events_path.unwrap_or_else(|| DEFAULT_EVENTS_PATH.to_string()));
        let report_path = env_optional("ASSESSMENT_REPORT_PATH").map(PathBuf::from);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
            dedup: DedupSettings { window_minutes, similarity_threshold },
            ingest: IngestSettings { events_path, events_path_explicit, report_path },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn dedup(&self) -> &DedupSettings {
        &self.dedup
    }

    pub(crate) fn ingest(&self) -> &IngestSettings {
        &self.ingest
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dedup.window_minutes == 0 || self.dedup.window_minutes > MAX_WINDOW_MINUTES {
            return Err(ConfigError::InvalidValue {
                field: "DEDUP_WINDOW_MINUTES",
                value: self.dedup.window_minutes.to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.dedup.similarity_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "DEDUP_SIMILARITY_THRESHOLD",
                value: self.dedup.similarity_threshold.to_string(),
            });
        }

        if !self.runtime.strict_config {
            return Ok(());
        }

        if !self.ingest.events_path_explicit {
            return Err(ConfigError::MissingSetting("ATTEMPT_EVENTS_PATH"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::types::Environment;
    use crate::test_support;

    #[test]
    fn load_uses_defaults() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.runtime().environment, Environment::Test);
        assert!(!settings.runtime().strict_config);
        assert_eq!(settings.dedup().window_minutes, 7);
        assert_eq!(settings.dedup().similarity_threshold, 0.92);
        assert_eq!(settings.ingest().events_path, PathBuf::from(DEFAULT_EVENTS_PATH));
        assert!(settings.ingest().report_path.is_none());
        assert!(!settings.telemetry().json);
    }

    #[test]
    fn load_reads_dedup_overrides() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();
        std::env::set_var("DEDUP_WINDOW_MINUTES", "15");
        std::env::set_var("DEDUP_SIMILARITY_THRESHOLD", "0.8");

        let settings = Settings::load();
        test_support::set_test_env();

        let settings = settings.expect("settings");
        assert_eq!(settings.dedup().window_minutes, 15);
        assert_eq!(settings.dedup().similarity_threshold, 0.8);
    }

    #[test]
    fn load_rejects_threshold_out_of_range() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();
        std::env::set_var("DEDUP_SIMILARITY_THRESHOLD", "1.5");

        let result = Settings::load();
        test_support::set_test_env();

        let err = result.expect_err("threshold above one");
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "DEDUP_SIMILARITY_THRESHOLD", .. }
        ));
    }

    #[test]
    fn load_rejects_zero_window() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();
        std::env::set_var("DEDUP_WINDOW_MINUTES", "0");

        let result = Settings::load();
        test_support::set_test_env();

        assert!(result.is_err());
    }

    #[test]
    fn load_rejects_window_beyond_a_year() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();
        std::env::set_var("DEDUP_WINDOW_MINUTES", "200000000000000000");
        let oversized = Settings::load();
        std::env::set_var("DEDUP_WINDOW_MINUTES", MAX_WINDOW_MINUTES.to_string());
        let at_cap = Settings::load();
        test_support::set_test_env();

        assert!(matches!(
            oversized,
            Err(ConfigError::InvalidValue { field: "DEDUP_WINDOW_MINUTES", .. })
        ));
        let at_cap = at_cap.expect("one year window");
        let policy = crate::services::dedup::DedupPolicy::from_settings(&at_cap);
        assert_eq!(policy.window, time::Duration::minutes(525_600));
    }

    #[test]
    fn strict_config_requires_events_path() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();
        std::env::set_var("ASSESSMENT_STRICT_CONFIG", "1");

        let missing = Settings::load();
        std::env::set_var("ATTEMPT_EVENTS_PATH", "/var/lib/assessment/events.json");
        let present = Settings::load();
        test_support::set_test_env();

        assert!(matches!(missing, Err(ConfigError::MissingSetting("ATTEMPT_EVENTS_PATH"))));
        let present = present.expect("strict settings");
        assert_eq!(
            present.ingest().events_path,
            PathBuf::from("/var/lib/assessment/events.json")
        );
    }

    #[test]
    fn production_turns_on_json_logs() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();
        std::env::set_var("ASSESSMENT_ENV", "prod");
        std::env::set_var("ATTEMPT_EVENTS_PATH", "events.json");

        let result = Settings::load();
        test_support::set_test_env();

        let settings = result.expect("production settings");
        assert!(settings.runtime().strict_config);
        assert!(settings.telemetry().json);
        assert_eq!(settings.runtime().environment.as_str(), "production");
    }
}
