//! Currency rendering helpers for tables and summaries.

/// Formats a dollar amount with thousands grouping, e.g. `$1,234.56`.
/// Negative amounts render with a leading sign: `-$12.00`.
pub fn format_amount(value: f64) -> String {
    let body = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (body.as_str(), "00"),
    };
    let grouped = group_digits(int_part, ',');
    if value < 0.0 {
        format!("-${}.{}", grouped, frac_part)
    } else {
        format!("${}.{}", grouped, frac_part)
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    let mut count = 0;
    for ch in digits.chars().rev() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
        count += 1;
    }
    grouped
}
