//! Penalty Dash - gameplay core for a dribble-and-shoot arcade soccer mini-game

pub mod app;
pub mod config;
pub mod game;
pub mod util;
