//! Rules engine for a Ticket to Ride game.
//!
//! A [`manager::Manager`] owns everything about one game: the [`map::Map`] of routes,
//! the [`card::CardDealer`] and its train cards, and the [`player::Player`]s.
//! Front ends (terminal, web server...) call into it one action at a time, and render
//! the [`manager::GameState`] it returns.
//!
//! The engine does no I/O: map data and configuration are handed in already decoded.

pub mod card;
pub mod city;
pub mod config;
pub mod error;
pub mod manager;
pub mod map;
pub mod player;
pub mod turn;
