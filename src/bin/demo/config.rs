use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;

/// Chooser criteria for the demo, read from `config.toml` in the standard
/// config directory. Missing file or keys fall back to open criteria.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub mime_types: Vec<String>,
    pub filter_term: String,
    pub use_regex: bool,
}

impl Config {
    pub fn get() -> &'static Self {
        static CONFIG: Lazy<Config> = Lazy::new(Config::load);
        &CONFIG
    }

    fn load() -> Self {
        let dirs = match ProjectDirs::from("", "", "app-chooser") {
            Some(dirs) => dirs,
            None => return Self::default(),
        };
        let config_path = dirs.config_dir().join("config.toml");
        let config_str = std::fs::read(&config_path).unwrap_or_default();
        match toml::from_slice(&config_str) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("invalid config at {}: {}", config_path.display(), err);
                Self::default()
            }
        }
    }
}
