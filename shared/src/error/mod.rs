//! Unified error system for the kiosk backend
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 4xxx: Session errors
//! - 5xxx: Payment errors
//! - 6xxx: Hardware errors
//! - 7xxx: Pricing errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::PaymentServiceUnavailable);
//! let err = AppError::transfer_failed("not enough money").with_detail("amount", 42);
//! assert_eq!(err.code, ErrorCode::TransferFailed);
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
