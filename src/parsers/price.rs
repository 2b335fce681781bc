use regex::Regex;
use std::sync::OnceLock;

fn non_numeric() -> &'static Regex {
    static NON_NUMERIC: OnceLock<Regex> = OnceLock::new();
    NON_NUMERIC.get_or_init(|| Regex::new(r"[^\d.]").expect("static pattern is valid"))
}

/// Extracts a price from display text
///
/// Every character that is not an ASCII digit or `.` is removed before
/// parsing, so `"US $1,234.56"` becomes `1234.56`. Text that does not reduce
/// to a number parses to `0.0` instead of failing.
///
/// Ranges collapse into one run of digits (`"$10 to $20"` reads as `1020`),
/// and separators other than `.` are dropped rather than interpreted.
pub fn extract_price(text: &str) -> f64 {
    let clean = non_numeric().replace_all(text, "");
    match clean.parse::<f64>() {
        Ok(price) => price,
        Err(_) => {
            ::log::trace!("Could not parse price from {:?}", text);
            0.0
        }
    }
}

/// True iff `0 < price <= max_price`
pub fn is_price_valid(price: f64, max_price: f64) -> bool {
    price > 0.0 && price <= max_price
}
