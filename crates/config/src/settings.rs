use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub meeting: MeetingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<String>,
    pub cors_origins: Vec<String>,
}

/// Server-side defaults applied to every meeting record on lazy creation.
#[derive(Debug, Deserialize, Clone)]
pub struct MeetingSettings {
    pub waiting_room_enabled: bool,
    pub mute_on_entry: bool,
    pub welcome_message: Option<String>,
    pub rename_max_len: usize,
    pub max_waiting_participants: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("HUDDLE"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.static_dir", None::<String>)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("meeting.waiting_room_enabled", false)?
            .set_default("meeting.mute_on_entry", false)?
            .set_default("meeting.welcome_message", None::<String>)?
            .set_default("meeting.rename_max_len", 50)?
            .set_default("meeting.max_waiting_participants", 100)?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
