//! 法币余额 -> XMR 换算

use shared::util::PICONERO_PER_XMR;
use shared::{AppError, ErrorCode};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// 余额里有币种，但从未收到过它的价格
    #[error("No exchange rate available for {0}")]
    MissingRate(String),
}

impl From<ConversionError> for AppError {
    fn from(e: ConversionError) -> Self {
        AppError::with_message(ErrorCode::ConversionFailed, e.to_string())
    }
}

/// 计算应付 piconero
///
/// 逐币种求 `余额 / 价格` 之和，整体乘以 10^12 后截断。
/// 先求和、再统一缩放、最后截断，保证结果可复现。
pub fn xmr_amount(
    balance: &BTreeMap<String, u64>,
    rates: &HashMap<String, f64>,
) -> Result<u64, ConversionError> {
    let mut xmr = 0.0_f64;
    for (currency, &amount) in balance {
        let rate = rates
            .get(currency)
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| ConversionError::MissingRate(currency.clone()))?;
        xmr += amount as f64 / rate;
    }

    // `as` truncates toward zero
    Ok((xmr * PICONERO_PER_XMR as f64) as u64)
}
