//! Display formatting for money and percentages.

/// `$1,234.56`, `-$12.30`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

/// Two decimals with an explicit `+` for gains. Non-finite input shows as `0.00%`.
pub fn format_percentage(percentage: f64) -> String {
    if !percentage.is_finite() {
        return "0.00%".to_string();
    }
    let sign = if percentage > 0.0 { "+" } else { "" };
    format!("{sign}{percentage:.2}%")
}
