use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub source: SourceSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Logical address of the sensor feed in the realtime store.
    #[serde(default = "default_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_auto_refresh_secs")]
    pub auto_refresh_secs: u64,
}

fn default_path() -> String {
    "WaterQuality".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_auto_refresh_secs() -> u64 {
    30
}

pub fn load_source_config() -> anyhow::Result<SourceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/source"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_settings_defaults() {
        let settings: SourceSettings = serde_json::from_value(serde_json::json!({
            "base_url": "https://store.example.com"
        }))
        .unwrap();

        assert_eq!(settings.path, "WaterQuality");
        assert!(settings.auth_token.is_none());
    }

    #[test]
    fn test_dashboard_settings_defaults() {
        let settings: DashboardSettings =
            serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(settings.listen_addr, "0.0.0.0:8080");
        assert_eq!(settings.auto_refresh_secs, 30);
    }
}
