/// Monetary amounts are carried as integer minor units (cents).
pub type Cents = i64;

/// Renders an amount of cents as a decimal string, e.g. `12500` -> `"125.00"`.
pub fn format_cents(amount: Cents) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(12500), "125.00");
        assert_eq!(format_cents(2505), "25.05");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-150), "-1.50");
    }
}
