//! This crate contains the source code for the binary of the maze game.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use clap::Parser as _;
use color_eyre::{
    eyre::{Result, WrapErr as _},
    install,
};
use gridmaze::{
    cli::Args,
    engine::Engine,
    logging,
    store::{StateFile, Store},
    App,
};

fn main() -> Result<()> {
    install()?;

    let args = Args::parse();
    logging::init(args.log_file.as_deref())?;

    let store = Store::open(StateFile::new(&args.state_file)).wrap_err_with(|| {
        format!(
            "failed to load saved games from {}",
            args.state_file.display()
        )
    })?;
    let engine =
        Engine::new(args.engine_config(), store).wrap_err("invalid engine configuration")?;
    let mut app = App::new(engine, args.player_id());

    let mut terminal = ratatui::init();
    let outcome = app.run(&mut terminal);
    ratatui::restore();

    outcome
}
