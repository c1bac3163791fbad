//! Shared types for the kiosk backend
//!
//! Wire types used by atm-server, the kiosk frontend and the hardware
//! daemons, plus the unified error system.

pub mod error;
pub mod message;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use message::{HardwareEvent, HardwareService, Notification, UiCommand, Update};
pub use serde::{Deserialize, Serialize};
