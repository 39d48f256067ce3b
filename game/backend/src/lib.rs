//! Pairs: a memory-matching card game served to a browser client.
//!
//! The [`game`] module holds the rules and timing; [`ws`] and [`http`] expose
//! them over a WebSocket and a small HTTP surface.

pub mod config;
pub mod game;
pub mod http;
pub mod room;
pub mod telemetry;
pub mod ws;
