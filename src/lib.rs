//! Multi-room WebSocket chat server library.
//!
//! Clients create and join named rooms over HTTP, then exchange messages over
//! a persistent WebSocket. Each room runs as a single-writer event loop that
//! serializes membership changes and broadcast fan-out; per-connection
//! bridges move data between the socket and the room's channels.

pub mod server;

// shared library
pub mod common;
