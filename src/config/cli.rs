use std::path::PathBuf;

use clap::Parser;

use super::AppConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "lyric-deck")]
#[command(about = "Keep a lyrics library and build presentation decks from it")]
pub struct Cli {
    #[arg(long, value_name = "PATH", help = "Read settings from PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Use the song database at PATH")]
    pub database: Option<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Write the generated script to PATH instead of running it"
    )]
    pub dry_run: Option<PathBuf>,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

impl Cli {
    /// Command line flags win over the config file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(database) = &self.database {
            config.database_path = Some(database.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_parse_to_defaults() {
        let cli = Cli::try_parse_from(["lyric-deck"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.dry_run.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn database_flag_overrides_config() {
        let cli = Cli::try_parse_from(["lyric-deck", "--database", "/tmp/s.sqlite3", "-v"])
            .unwrap();
        let mut config = AppConfig {
            database_path: Some(PathBuf::from("/elsewhere.sqlite3")),
            ..AppConfig::default()
        };

        cli.apply(&mut config);

        assert!(cli.verbose);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/s.sqlite3")));
    }
}
