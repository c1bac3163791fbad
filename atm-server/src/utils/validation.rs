//! Monero address validation
//!
//! Scanned QR codes arrive either as a bare address or as a payment URI
//! (`monero:<address>?tx_amount=...`). Only the address body is kept.

use shared::{AppError, ErrorCode};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a standard (non-integrated) Monero address
pub const ADDRESS_LEN: usize = 95;

/// Network the kiosk pays out on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Stagenet,
}

impl Network {
    /// Allowed first characters: standard address and subaddress
    pub fn lead_chars(&self) -> [char; 2] {
        match self {
            Network::Mainnet => ['4', '8'],
            Network::Stagenet => ['5', '7'],
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Stagenet => write!(f, "stagenet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "stagenet" | "test" => Ok(Network::Stagenet),
            other => Err(format!("unknown network {other:?}, expected mainnet or stagenet")),
        }
    }
}

/// Rejected scan, the message is shown on the kiosk as-is
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Invalid address length")]
    InvalidLength(usize),

    #[error("Invalid {0} address")]
    WrongNetwork(Network),
}

impl From<AddressError> for AppError {
    fn from(e: AddressError) -> Self {
        AppError::with_message(ErrorCode::AddressInvalid, e.to_string())
    }
}

/// Strip a URI scheme and query string from scanned text
///
/// Each step applies on its own: text without `:` keeps its head, text
/// without `?` keeps its tail.
pub fn normalize_address(raw: &str) -> &str {
    let body = raw.split_once(':').map_or(raw, |(_, rest)| rest);
    body.split_once('?').map_or(body, |(address, _)| address)
}

/// Check length and network prefix of a normalized address
pub fn validate_address(address: &str, network: Network) -> Result<(), AddressError> {
    let len = address.chars().count();
    if len != ADDRESS_LEN {
        return Err(AddressError::InvalidLength(len));
    }

    match address.chars().next() {
        Some(lead) if network.lead_chars().contains(&lead) => Ok(()),
        _ => Err(AddressError::WrongNetwork(network)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(lead: char) -> String {
        let mut addr = String::with_capacity(ADDRESS_LEN);
        addr.push(lead);
        addr.push_str(&"A".repeat(ADDRESS_LEN - 1));
        addr
    }

    #[test]
    fn test_normalize_payment_uri() {
        let addr = address('4');
        let uri = format!("monero:{addr}?tx_amount=1");
        assert_eq!(normalize_address(&uri), addr);
    }

    #[test]
    fn test_normalize_bare_address_unchanged() {
        let addr = address('8');
        assert_eq!(normalize_address(&addr), addr);
    }

    #[test]
    fn test_normalize_steps_are_independent() {
        let addr = address('4');
        assert_eq!(normalize_address(&format!("monero:{addr}")), addr);
        assert_eq!(normalize_address(&format!("{addr}?amount=2")), addr);
    }

    #[test]
    fn test_surrounding_whitespace_fails_length_check() {
        let addr = address('4');
        for raw in [format!(" {addr}"), format!("{addr}\n")] {
            let normalized = normalize_address(&raw);
            assert_eq!(normalized, raw);
            assert_eq!(
                validate_address(normalized, Network::Mainnet),
                Err(AddressError::InvalidLength(ADDRESS_LEN + 1))
            );
        }
    }

    #[test]
    fn test_validate_length() {
        let short = &address('4')[..ADDRESS_LEN - 1];
        assert_eq!(
            validate_address(short, Network::Mainnet),
            Err(AddressError::InvalidLength(ADDRESS_LEN - 1))
        );
        let long = format!("{}A", address('4'));
        assert!(validate_address(&long, Network::Mainnet).is_err());
        assert!(validate_address("", Network::Mainnet).is_err());
    }

    #[test]
    fn test_validate_network_prefix() {
        assert!(validate_address(&address('4'), Network::Mainnet).is_ok());
        assert!(validate_address(&address('8'), Network::Mainnet).is_ok());
        assert_eq!(
            validate_address(&address('5'), Network::Mainnet),
            Err(AddressError::WrongNetwork(Network::Mainnet))
        );

        assert!(validate_address(&address('5'), Network::Stagenet).is_ok());
        assert!(validate_address(&address('7'), Network::Stagenet).is_ok());
        assert!(validate_address(&address('4'), Network::Stagenet).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AddressError::InvalidLength(3).to_string(),
            "Invalid address length"
        );
        assert_eq!(
            AddressError::WrongNetwork(Network::Stagenet).to_string(),
            "Invalid stagenet address"
        );
    }

    #[test]
    fn test_into_app_error() {
        let err = AppError::from(AddressError::InvalidLength(10));
        assert_eq!(err.code, ErrorCode::AddressInvalid);
        assert_eq!(err.message, "Invalid address length");
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("stagenet".parse::<Network>().unwrap(), Network::Stagenet);
        assert!("regtest".parse::<Network>().is_err());
    }
}
