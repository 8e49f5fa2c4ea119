use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub reminders: ReminderConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReminderConfig {
    /// Hours a Pending attestation may sit unreminded before it becomes
    /// eligible again.
    pub threshold_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    pub csv_filename: String,
    pub zip_filename: String,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .set_default("database.path", "compliance.db")?
            .set_default("reminders.threshold_hours", 48i64)?
            .set_default("export.csv_filename", "claims_with_issues.csv")?
            .set_default("export.zip_filename", "provider_attestations.zip")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("SCRUB").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Render a starter config file, written by `init` when none exists.
    pub fn starter_toml() -> String {
        let table = toml::toml! {
            [database]
            path = "compliance.db"

            [reminders]
            threshold_hours = 48

            [export]
            csv_filename = "claims_with_issues.csv"
            zip_filename = "provider_attestations.zip"
        };
        toml::to_string_pretty(&table).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load("does/not/exist").unwrap();
        assert_eq!(cfg.database.path, "compliance.db");
        assert_eq!(cfg.reminders.threshold_hours, 48);
    }

    #[test]
    fn test_starter_toml_parses_back() {
        let rendered = Config::starter_toml();
        let parsed: toml::Table = rendered.parse().unwrap();
        assert!(parsed.contains_key("database"));
        assert!(parsed.contains_key("reminders"));
    }
}
