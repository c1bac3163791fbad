//! Unified error codes for the kiosk backend
//!
//! Error codes are organized by category:
//! - 4xxx: Session errors
//! - 5xxx: Payment errors
//! - 6xxx: Hardware errors
//! - 7xxx: Pricing errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 4xxx: Session ====================
    /// Command not allowed in the current session state
    InvalidTransition = 4001,
    /// Scanned address failed validation
    AddressInvalid = 4002,
    /// Balance could not be converted to XMR
    ConversionFailed = 4003,

    // ==================== 5xxx: Payment ====================
    /// Transfer was rejected by the payment service
    TransferFailed = 5001,
    /// Payment service is unreachable or unhealthy
    PaymentServiceUnavailable = 5002,
    /// Payment service returned an unreadable response
    PaymentInvalidResponse = 5003,

    // ==================== 6xxx: Hardware ====================
    /// Hardware bus is not connected
    HardwareBusUnavailable = 6001,
    /// Hardware command could not be delivered
    HardwareCommandFailed = 6002,

    // ==================== 7xxx: Pricing ====================
    /// Exchange rate could not be fetched
    RateUnavailable = 7001,
    /// No cross-rate is known for the currency
    CrossRateMissing = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Network error
    NetworkError = 9002,
    /// Operation timed out
    TimeoutError = 9003,
    /// Configuration error
    ConfigError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // Session
            ErrorCode::InvalidTransition => "Command not allowed in the current state",
            ErrorCode::AddressInvalid => "Invalid address",
            ErrorCode::ConversionFailed => "Failed to convert balance to XMR",

            // Payment
            ErrorCode::TransferFailed => "Transfer failed",
            ErrorCode::PaymentServiceUnavailable => "Payment service unavailable",
            ErrorCode::PaymentInvalidResponse => "Invalid response from payment service",

            // Hardware
            ErrorCode::HardwareBusUnavailable => "Hardware bus is not connected",
            ErrorCode::HardwareCommandFailed => "Hardware command failed",

            // Pricing
            ErrorCode::RateUnavailable => "Exchange rate unavailable",
            ErrorCode::CrossRateMissing => "No cross-rate for currency",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // Session
            4001 => Ok(ErrorCode::InvalidTransition),
            4002 => Ok(ErrorCode::AddressInvalid),
            4003 => Ok(ErrorCode::ConversionFailed),

            // Payment
            5001 => Ok(ErrorCode::TransferFailed),
            5002 => Ok(ErrorCode::PaymentServiceUnavailable),
            5003 => Ok(ErrorCode::PaymentInvalidResponse),

            // Hardware
            6001 => Ok(ErrorCode::HardwareBusUnavailable),
            6002 => Ok(ErrorCode::HardwareCommandFailed),

            // Pricing
            7001 => Ok(ErrorCode::RateUnavailable),
            7002 => Ok(ErrorCode::CrossRateMissing),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::NetworkError),
            9003 => Ok(ErrorCode::TimeoutError),
            9004 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::InvalidTransition,
            ErrorCode::AddressInvalid,
            ErrorCode::TransferFailed,
            ErrorCode::HardwareCommandFailed,
            ErrorCode::CrossRateMissing,
            ErrorCode::ConfigError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TransferFailed).unwrap();
        assert_eq!(json, "5001");
    }
}
