//! Numeric display formatting.

/// Fixed decimals without grouping: `1234.5` with 2 decimals is `1234.50`.
pub fn format_fixed(value: f64, decimals: u32) -> String {
    format!("{value:.prec$}", prec = decimals as usize)
}

/// Fixed decimals with `,` thousands grouping, followed by a space and the
/// currency code: `1234.5` is `1,234.50 EUR`.
pub fn format_currency(value: f64, decimals: u32, currency: &str) -> String {
    format!("{} {currency}", group_thousands(&format_fixed(value, decimals)))
}

/// Insert `,` between groups of three integer digits of a plain decimal string.
pub fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (integer, fraction) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };
    if !integer.bytes().all(|byte| byte.is_ascii_digit()) {
        return number.to_string();
    }

    let mut grouped = String::with_capacity(number.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push_str(fraction);
    grouped
}
