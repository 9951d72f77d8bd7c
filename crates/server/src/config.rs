use std::{collections::HashMap, fs};

pub const SETTINGS_FILE: &str = "dashboard.toml";

pub const DEFAULT_AUTOMOBILE_DATA: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMDeveloperSkillsNetwork-DV0101EN-SkillsNetwork/Data%20Files/historical_automobile_sales.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_bind: String,
    /// Path or http(s) URL of the launch records CSV.
    pub launch_data: String,
    /// Path or http(s) URL of the automobile sales CSV.
    pub automobile_data: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8050".into(),
            launch_data: "./data/spacex_launch_dash.csv".into(),
            automobile_data: DEFAULT_AUTOMOBILE_DATA.into(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// Applies flat `key = "value"` pairs from a settings file. Unreadable
    /// files are ignored.
    fn apply_file(&mut self, raw: &str) {
        let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
            return;
        };
        if let Some(v) = file_cfg.get("bind_addr") {
            self.server_bind = v.clone();
        }
        if let Some(v) = file_cfg.get("launch_data") {
            self.launch_data = v.clone();
        }
        if let Some(v) = file_cfg.get("automobile_data") {
            self.automobile_data = v.clone();
        }
        if let Some(v) = file_cfg.get("log_filter") {
            self.log_filter = v.clone();
        }
    }

    /// Applies environment overrides; `APP__*` names win over the short ones.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SERVER_BIND") {
            self.server_bind = v;
        }
        if let Some(v) = lookup("APP__BIND_ADDR") {
            self.server_bind = v;
        }
        if let Some(v) = lookup("APP__LAUNCH_DATA") {
            self.launch_data = v;
        }
        if let Some(v) = lookup("APP__AUTOMOBILE_DATA") {
            self.automobile_data = v;
        }
        if let Some(v) = lookup("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        settings.apply_file(&raw);
    }
    settings.apply_env(|name| std::env::var(name).ok());
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        settings.apply_file(
            r#"
bind_addr = "0.0.0.0:9000"
launch_data = "/srv/launches.csv"
"#,
        );
        assert_eq!(settings.server_bind, "0.0.0.0:9000");
        assert_eq!(settings.launch_data, "/srv/launches.csv");
        assert_eq!(settings.automobile_data, DEFAULT_AUTOMOBILE_DATA);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_file("bind_addr = [");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn prefixed_env_wins_over_short_name() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SERVER_BIND", "127.0.0.1:1"),
            ("APP__BIND_ADDR", "127.0.0.1:2"),
            ("APP__AUTOMOBILE_DATA", "./sales.csv"),
        ]);
        let mut settings = Settings::default();
        settings.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(settings.server_bind, "127.0.0.1:2");
        assert_eq!(settings.automobile_data, "./sales.csv");
        assert_eq!(settings.log_filter, "info");
    }
}
