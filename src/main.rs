//! Binary entry point: read settings, open the song database, and drive the
//! terminal UI until the user quits or a deck has been generated.
use anyhow::Context;
use clap::Parser;
use lyric_deck::form::default_filename;
use lyric_deck::logger::init_file_logger;
use lyric_deck::{
    run_app, App, AppConfig, Cli, DeckGenerator, Osascript, ScriptFile, SelectionForm, SongStore,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load settings")?;
    cli.apply(&mut config);

    let log_path = config.log_path()?;
    init_file_logger(&log_path, cli.verbose).context("failed to open log file")?;
    tracing::info!("starting lyric-deck");

    let db_path = config.database_path()?;
    let store = SongStore::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    let form = SelectionForm::new(store, default_filename())?;

    let generator = match &cli.dry_run {
        Some(path) => {
            tracing::info!(path = %path.display(), "dry run: scripts are written, not executed");
            DeckGenerator::new(config.deck.clone(), ScriptFile::new(path))
        }
        None => DeckGenerator::new(config.deck.clone(), Osascript::default()),
    };

    let mut app = App::new(form, generator)
        .reveal_output(config.open_after_generate && cli.dry_run.is_none());
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!("{err:#}");
    }
    result
}
