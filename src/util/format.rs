//! Number formatting utilities.

/// Format a cost in USD.
#[must_use]
pub fn format_cost(value: f64) -> String {
    format!("${value:.2}")
}

/// Format a count with thousands separators ("1650" -> "1,650").
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
