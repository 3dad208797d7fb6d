mod app_config;

pub use app_config::{APP_NAME, AppConfig, CharacterUnlocks, DEFAULT_AUTO_SAVE_MINUTES};
