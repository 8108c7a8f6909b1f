//! Multi-room WebSocket chat server.

pub mod bridge;
pub mod error;
pub mod handler;
pub mod hub;
pub mod message;
pub mod room;
pub mod runner;
pub mod service;
mod signal;
pub mod state;

pub use runner::{build_router, run_server};
