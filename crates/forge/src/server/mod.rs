//! WebSocket transport.
//!
//! This module contains the server structure and the per-connection
//! handling that feeds client lines into the session service.

pub mod core;
pub mod handlers;

pub use core::ForgeServer;
