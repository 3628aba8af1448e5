use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::store::{self, KeyValueStore};

const CONFIG_KEY: &str = "config";

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Clone)]
#[command(author, version, about = "🐶 beagle - Shake for some motivation!")]
pub struct Args {
    /// Where quotes, settings and reminders are kept
    #[arg(short, long, default_value = "beagle")]
    pub data_dir: PathBuf,
    #[arg(short = 't', long)]
    pub theme: Option<String>,
    #[arg(long)]
    pub no_sound: bool,
    /// Deny notification permission; reminders are not scheduled
    #[arg(long)]
    pub no_notifications: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Command {
    /// Print one random quote and exit
    Quote,
    /// List the scheduled motivation reminders
    Reminders,
    /// Deliver reminders without the terminal UI
    Daemon,
}

// ============================================================================
// Config
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    pub sound_enabled: bool,
    pub notifications_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "meadow".into(),
            sound_enabled: true,
            notifications_enabled: true,
        }
    }
}

impl Config {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        store::load_or_default(store, CONFIG_KEY)
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> crate::error::Result<()> {
        store::save(store, CONFIG_KEY, self)
    }

    /// CLI flags win over the saved file.
    pub fn apply(&mut self, args: &Args) {
        if let Some(t) = &args.theme { self.theme = t.clone(); }
        if args.no_sound { self.sound_enabled = false; }
        if args.no_notifications { self.notifications_enabled = false; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn cli_overrides_saved_config() {
        let store = MemoryStore::default();
        Config { theme: "nord".into(), ..Config::default() }.save(&store).unwrap();

        let args = Args::parse_from(["beagle", "--no-sound", "reminders"]);
        let mut config = Config::load(&store);
        config.apply(&args);

        assert_eq!(config.theme, "nord");
        assert!(!config.sound_enabled);
        assert!(config.notifications_enabled);
        assert_eq!(args.command, Some(Command::Reminders));
        assert_eq!(args.data_dir, PathBuf::from("beagle"));
    }

    #[test]
    fn partial_config_file_fills_in_defaults() {
        let store = MemoryStore::default();
        store.set(CONFIG_KEY, br#"{"theme":"dracula"}"#).unwrap();

        let config = Config::load(&store);
        assert_eq!(config.theme, "dracula");
        assert!(config.sound_enabled);
    }
}
