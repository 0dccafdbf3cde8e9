pub mod doctor;
pub mod init;
pub mod inspect;
pub mod research;
pub mod store;

use satscout_config::AppConfig;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}
