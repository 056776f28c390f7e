//! Source RCON client for sending commands to a game server console.
//!
//! One session per message: [`broadcast`] connects, authenticates, sends a
//! single `say`, and drops the connection. There is no persistent session to
//! coordinate.
//!
//! # Wire format
//!
//! See the [`wire`] module for the packet layout.

pub mod client;
pub mod error;
pub mod wire;

pub use client::{RconClient, RconConfig, broadcast};
pub use error::RconError;
pub use wire::Packet;

use std::time::Duration;

/// Timeout for the TCP connection attempt.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for one request/response round trip (auth or command).
pub const ROUND_TRIP_TIMEOUT: Duration = Duration::from_secs(5);
