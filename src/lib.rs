//! tunebox - a terminal Spotify client
//!
//! The binary in `main.rs` wires these modules to the terminal.

pub mod api;
pub mod appearance;
pub mod audio;
pub mod auth;
pub mod config;
pub mod controller;
pub mod logging;
pub mod model;
pub mod storage;
pub mod theme;
pub mod view;
