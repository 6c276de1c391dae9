//! Configuration management CLI commands.
//!
//! `config get`, `config set`, `config list` and `config path` read and
//! edit `~/.fieldtile/config.ini` one `section.key` at a time.

use clap::Subcommand;
use console::style;
use fieldtile::config::{ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name as section.key (e.g., download.max_zoom)
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name as section.key (e.g., download.max_zoom)
        key: String,

        /// New value
        value: String,
    },

    /// Print every setting, marking the ones changed from the defaults
    List,

    /// Print the configuration file path, writing a default file if none exists
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load()?;
            println!("{}", display_value(&key.get(&config)));
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)
                .map_err(|e| CliError::Config(e.to_string()))?;
            config.validate()?;
            config.save()?;
            println!("{} = {}", key.name(), display_value(&key.get(&config)));
        }
        ConfigCommands::List => list(&ConfigFile::load()?),
        ConfigCommands::Path => println!("{}", ConfigFile::ensure_exists()?.display()),
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Run 'fieldtile config list' for the valid keys.",
            key
        ))
    })
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn list(config: &ConfigFile) {
    let defaults = ConfigFile::default();
    let mut section = None;

    for key in ConfigKey::all() {
        if section != Some(key.section()) {
            if section.is_some() {
                println!();
            }
            println!("{}", style(format!("[{}]", key.section())).bold());
            section = Some(key.section());
        }

        let value = key.get(config);
        let marker = if value != key.get(&defaults) {
            style("*").yellow().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {} = {}", marker, key.key_name(), display_value(&value));
    }

    println!();
    println!("* changed from default");
}
