//! INI parsing logic for converting `Ini` → `ConfigFile`.

use std::path::PathBuf;

use ini::Ini;

use super::file::ConfigFileError;
use super::keys::{ConfigKey, ConfigKeyError};
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the
/// INI. Empty values keep the default; unknown keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    for key in ConfigKey::all() {
        let Some(value) = ini
            .section(Some(key.section()))
            .and_then(|section| section.get(key.key_name()))
        else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }

        key.set(&mut config, value)
            .map_err(|e| ConfigFileError::InvalidValue {
                section: key.section().to_string(),
                key: key.key_name().to_string(),
                value: value.to_string(),
                reason: match e {
                    ConfigKeyError::ValidationFailed { reason, .. } => reason,
                    other => other.to_string(),
                },
            })?;
    }

    config.validate()?;
    Ok(config)
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
