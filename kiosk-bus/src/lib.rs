//! # kiosk-bus
//!
//! Hardware bus library - low-level transport to the kiosk daemons only.
//!
//! ## Scope
//!
//! This crate handles HOW to talk to the hardware:
//! - MQTT connection with automatic reconnect on the next poll
//! - Connection-readiness wait before commands
//! - QoS 2 (exactly-once) `{"cmd": ...}` command publishing
//! - Raw event delivery with per-connection re-subscription
//!
//! Business logic (WHAT the events mean) stays in application code:
//! - Event decoding → shared
//! - Reacting to scans and inserted cash → atm-server
//!
//! ## Example
//!
//! ```ignore
//! use kiosk_bus::{BusConfig, Command};
//!
//! let config = BusConfig::new("localhost", 1883, "atm-server")
//!     .with_topics(vec!["events".to_string()]);
//! let (client, mut events) = kiosk_bus::connect(&config)?;
//!
//! tokio::spawn(async move {
//!     while let Ok(msg) = events.next_message().await {
//!         println!("{}: {} bytes", msg.topic, msg.payload.len());
//!     }
//! });
//!
//! client.send_command("codescannerd", Command::Start).await?;
//! ```

mod client;
mod command;
mod error;

// Re-exports
pub use client::{BusClient, BusConfig, BusEventLoop, BusMessage, connect};
pub use command::Command;
pub use error::{BusError, BusResult};
