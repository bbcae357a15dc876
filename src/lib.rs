//! Client-side session engine for the Love Paths story mini-app.
//!
//! The [`engine::session::Session`] owns the single server-issued
//! [`model::game_state::GameState`] snapshot and exposes the named
//! operations (load, choose, buy item, debug grant, age confirmation,
//! restart, purchase). [`engine::engine::SessionHandle`] runs it on a worker
//! thread and is what a renderer talks to.
pub mod config;
pub mod engine;
pub mod model;
