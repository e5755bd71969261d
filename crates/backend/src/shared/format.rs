use rust_decimal::Decimal;

/// Formats a number with thousands separators (commas)
///
/// # Examples
/// ```
/// use backend::shared::format::format_number;
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Formats a cent-precision amount with exactly two decimals.
/// Rounding is the caller's business, see `Product::price_with_tax_rounded`.
pub fn format_price(amount: Decimal) -> String {
    let mut cents = amount;
    cents.rescale(2);
    cents.to_string()
}
