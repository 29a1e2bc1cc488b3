//! # sunset-clock
//!
//! Internal library for the sunset-clock binary: a terminal countdown to the
//! next local sunset.
//!
//! ## Architecture
//!
//! - **Entry point**: [`clock::SunsetClock`] runs the countdown with lock,
//!   signal and terminal management
//! - **Engine**: [`core::SunsetEngine`] decides which sunset to show and when
//!   to fetch, backed by the on-disk [`state::SunsetCache`]
//! - **Resolution**: [`geo`] finds the location, [`sunset`] turns it into a
//!   sunset instant via the remote service
//! - **Configuration**: [`config`] for the TOML settings file
//! - **Commands**: [`commands`] for one-shot CLI actions (refresh, stop, status, cache)
//! - **Infrastructure**: [`io`] for the lock file and signals, [`logger`] for output

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod clock;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod geo;
pub mod io;
pub mod state;
pub mod sunset;
pub mod time_source;

pub use clock::SunsetClock;
pub use core::SunsetEngine;
pub use error::SunsetError;
