/// 皮科（piconero）与 XMR 的换算比例
pub const PICONERO_PER_XMR: u64 = 1_000_000_000_000;

/// 将皮科金额格式化为 12 位小数的 XMR 字符串
///
/// 使用整数运算，不经过浮点：`1_500_000_000_000` → `"1.500000000000"`
pub fn xmr_to_decimal(piconero: u64) -> String {
    format!(
        "{}.{:012}",
        piconero / PICONERO_PER_XMR,
        piconero % PICONERO_PER_XMR
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xmr_to_decimal() {
        assert_eq!(xmr_to_decimal(0), "0.000000000000");
        assert_eq!(xmr_to_decimal(1), "0.000000000001");
        assert_eq!(xmr_to_decimal(1_500_000_000_000), "1.500000000000");
        assert_eq!(xmr_to_decimal(42_000_000_000_123), "42.000000000123");
    }
}
