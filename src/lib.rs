//! This crate contains a maze minigame engine and the terminal front end that plays it.
//!
//! The engine keeps one game per player: it generates random perfect mazes, validates moves,
//! grows the maze on every level and fogs the board on dark levels. Every change is mirrored to a
//! JSON state file so games survive a restart. [`engine::Engine`] is the entry point; [`App`]
//! drives it from a terminal for a single local player.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
mod events;
pub mod generator;
pub mod grid;
pub mod logging;
pub mod pathfinding;
pub mod store;
#[cfg(test)]
mod testing;
pub mod types;
mod ui;
pub mod visibility;

pub use app::App;
