// 🔢 Field Primitives - Dates, weights and money from untrusted text
// Total functions: garbage in, zero/None out, never a panic

use chrono::NaiveDate;

// ============================================================================
// DATES
// ============================================================================

/// Parse a month/day/year date from free text.
///
/// Accepts `MM/DD/YYYY`, `M-D-YY`, `MM.DD.YY` and ISO `YYYY-MM-DD`.
/// Digit runs are tokenized over `/`, `-` and `.` separators; any other
/// character is ignored. Two-digit years get century inference:
/// 00-79 -> 2000s, 80-99 -> 1900s. Years outside 1900-2100 are rejected.
pub fn parse_mdy_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // ISO pass-through
    let b = s.as_bytes();
    if s.len() == 10 && b[4] == b'-' && b[7] == b'-' {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(d);
        }
    }

    let mut parts: Vec<String> = Vec::new();
    let mut cur = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            cur.push(ch);
        } else if matches!(ch, '/' | '-' | '.') {
            if !cur.is_empty() {
                parts.push(std::mem::take(&mut cur));
            }
        }
    }
    if !cur.is_empty() {
        parts.push(cur);
    }
    if parts.len() != 3 {
        return None;
    }

    let month: u32 = parts[0].parse().ok()?;
    let day: u32 = parts[1].parse().ok()?;
    let year: i32 = if parts[2].len() == 2 {
        let n: i32 = parts[2].parse().ok()?;
        infer_century(n)
    } else {
        parts[2].parse().ok()?
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) || !(1900..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Century inference for two-digit years: 00-79 -> 2000s, 80-99 -> 1900s.
pub fn infer_century(two_digit_year: i32) -> i32 {
    if two_digit_year <= 79 {
        2000 + two_digit_year
    } else {
        1900 + two_digit_year
    }
}

/// Render a date as `MM/DD/YYYY` for operator-facing output.
pub fn format_mdy(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

// ============================================================================
// NUMBERS
// ============================================================================

/// Parse a plain number, keeping digits, dot and minus; 0.0 on garbage.
pub fn parse_number(s: &str) -> f64 {
    let filtered: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    parse_float_prefix(&filtered)
}

/// Parse a monetary value: strip currency symbol and thousands commas.
///
/// A run of bare digits stays a run of bare digits - no implied decimal
/// point is ever inserted; that guess is too ambiguous to automate.
pub fn parse_money(s: &str) -> f64 {
    let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    parse_number(cleaned.trim())
}

/// Longest leading `[-]digits[.digits]` prefix, or 0.0.
fn parse_float_prefix(s: &str) -> f64 {
    let b = s.as_bytes();
    let mut i = 0;
    if i < b.len() && b[i] == b'-' {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;
    let mut frac_digits = 0;
    let mut end = i;
    if i < b.len() && b[i] == b'.' {
        let mut j = i + 1;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        frac_digits = j - i - 1;
        end = j;
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0.0;
    }
    s[..end].parse().unwrap_or(0.0)
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(n: f64) -> f64 {
    if n.is_finite() {
        (n * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Clamp to >= 0, mapping non-finite values to 0.
pub fn clamp_non_negative(n: f64) -> f64 {
    if n.is_finite() {
        n.max(0.0)
    } else {
        0.0
    }
}

/// Price per pound, rounded to cents; 0 when pounds is not positive.
pub fn price_per_pound(pounds: f64, amount: f64) -> f64 {
    let p = clamp_non_negative(pounds);
    let a = if amount.is_finite() { amount } else { 0.0 };
    if p > 0.0 {
        round2(a / p)
    } else {
        0.0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_mdy_four_digit_year() {
        assert_eq!(parse_mdy_date("01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_mdy_date("1-5-2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_mdy_date("12.31.1999"), Some(ymd(1999, 12, 31)));
    }

    #[test]
    fn test_parse_mdy_iso_passthrough() {
        assert_eq!(parse_mdy_date("2024-01-15"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_century_inference() {
        assert_eq!(parse_mdy_date("01/15/05"), Some(ymd(2005, 1, 15)));
        assert_eq!(parse_mdy_date("01/15/85"), Some(ymd(1985, 1, 15)));
        // boundary: 79 is the last year mapped to the 2000s
        assert_eq!(parse_mdy_date("01/15/79"), Some(ymd(2079, 1, 15)));
        assert_eq!(parse_mdy_date("01/15/80"), Some(ymd(1980, 1, 15)));
    }

    #[test]
    fn test_parse_mdy_rejects_invalid() {
        assert_eq!(parse_mdy_date(""), None);
        assert_eq!(parse_mdy_date("not a date"), None);
        assert_eq!(parse_mdy_date("13/01/2024"), None);
        assert_eq!(parse_mdy_date("02/30/2024"), None);
        assert_eq!(parse_mdy_date("01/15/1899"), None);
        assert_eq!(parse_mdy_date("01/15"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("43.5"), 43.5);
        assert_eq!(parse_number("  1,234.50 lbs"), 1234.5);
        assert_eq!(parse_number("garbage"), 0.0);
        assert_eq!(parse_number("-12.25"), -12.25);
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("$152.25"), 152.25);
        assert_eq!(parse_money("$1,500.00"), 1500.0);
        assert_eq!(parse_money("152.25"), 152.25);
        assert_eq!(parse_money(""), 0.0);
    }

    #[test]
    fn test_parse_money_never_infers_decimal_point() {
        // A bare digit run is NOT cents
        assert_eq!(parse_money("15225"), 15225.0);
        assert_eq!(parse_money("$15225"), 15225.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(43.556), 43.56);
        assert_eq!(round2(43.554), 43.55);
        assert_eq!(round2(f64::NAN), 0.0);
    }

    #[test]
    fn test_price_per_pound() {
        assert_eq!(price_per_pound(43.5, 152.25), 3.5);
        assert_eq!(price_per_pound(0.0, 152.25), 0.0);
        assert_eq!(price_per_pound(-5.0, 152.25), 0.0);
    }
}
