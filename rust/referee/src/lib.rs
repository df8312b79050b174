//! # triboard-referee
//!
//! The authoritative match process for triple-board heads-up hold'em.
//! It builds and launches two external player bots, referees the rounds
//! through the engine crate's game tree, enforces each player's game clock,
//! and writes the match transcript and per-player output logs.
//!
//! ## Module Organization
//!
//! - **`config`**: match configuration (TOML file + env overrides)
//! - **`connector`**: one player subprocess + socket + game clock
//! - **`driver`**: the round loop and match orchestration
//! - **`gamelog`**: the prose transcript
//! - **`error`**: orchestration error type

pub mod config;
pub mod connector;
pub mod driver;
pub mod error;
pub mod gamelog;

use std::path::Path;

use connector::{Connector, PlayerSession};
use driver::Game;
pub use error::RefereeError;

/// Runs a full match from configuration to written logs.
///
/// Player faults never propagate out of here; a broken bot just loses its
/// remaining boards by default. Only configuration and log-file I/O errors
/// abort the match.
pub fn run(config_path: Option<&Path>) -> Result<(), RefereeError> {
    let config = config::load(config_path)?;
    let mut players = [
        Connector::new(&config.player_1_name, &config.player_1_path, &config),
        Connector::new(&config.player_2_name, &config.player_2_path, &config),
    ];
    for player in players.iter_mut() {
        player.build();
        player.run();
    }
    let mut game = Game::new(&config)?;
    game.run(&mut players);
    for player in players.iter_mut() {
        player.stop();
    }
    game.write_game_log()?;
    Ok(())
}
