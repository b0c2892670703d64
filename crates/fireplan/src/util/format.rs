/// Group the digits of a whole number with commas
fn with_thousands(dollars: i64) -> String {
    let dollars_str = dollars.to_string();
    let mut result = String::new();
    for (i, c) in dollars_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a currency value without cents
pub fn format_currency(value: f64) -> String {
    let dollars = with_thousands(value.abs().round() as i64);
    if value >= 0.0 {
        format!("${}", dollars)
    } else {
        format!("-${}", dollars)
    }
}

/// Format a decimal fraction as a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Format a currency value in compact form (e.g., $2.1M, $450K, $50)
pub fn format_compact_currency(value: f64) -> String {
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{}${:.0}K", sign, abs_value / 1_000.0)
    } else {
        format!("{}${:.0}", sign, abs_value)
    }
}

/// An age, or "never" when a milestone is not reached
pub fn format_age(age: Option<u32>) -> String {
    age.map_or_else(|| "never".to_string(), |age| age.to_string())
}
