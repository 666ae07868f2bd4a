// Parsing and display helpers.
//
// Raw log values stay as text until something needs a number; everything that
// turns text into numbers (and numbers back into text) lives here.
use num_format::{Locale, ToFormattedString};

/// Sentinel shown for values that are missing or not numeric.
pub const NOT_AVAILABLE: &str = "N/A";

/// Length of the leading decimal literal in `s`: optional sign, digits with
/// an optional fraction, and an exponent only when digits follow it.
fn numeric_prefix_len(s: &str, allow_fraction: bool) -> usize {
    let b = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut i = 0;
    if matches!(b.first(), Some(b'+') | Some(b'-')) {
        i = 1;
    }
    let int_end = digits_from(i);
    let mut end = int_end;
    let mut seen_digit = int_end > i;
    if allow_fraction && b.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        seen_digit |= frac_end > end + 1;
        end = frac_end;
    }
    if !seen_digit {
        return 0;
    }
    if allow_fraction && matches!(b.get(end), Some(b'e') | Some(b'E')) {
        let mut j = end + 1;
        if matches!(b.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            end = exp_end;
        }
    }
    end
}

/// Parse the leading number of a log value, ignoring whatever trails it.
///
/// `"85%"` is 85, `"1e3"` is 1000 and `"1,5"` is 1. Text without a leading
/// number, and non-finite results, are `None`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim_start();
    let len = numeric_prefix_len(s, true);
    if len == 0 {
        return None;
    }
    s[..len].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Leading integer of a value; `"2024.0"` is 2024.
pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim_start();
    let len = numeric_prefix_len(s, false);
    if len == 0 {
        return None;
    }
    s[..len].parse::<i32>().ok()
}

/// `actual / target`, or 0 when the target is not positive.
pub fn safe_ratio(actual: f64, target: f64) -> f64 {
    if target > 0.0 {
        actual / target
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Render a KPI value the way the dashboard shows it.
///
/// Shares and rates get one decimal and a percent sign, frequency-style
/// KPIs one decimal, everything else a rounded integer with separators.
/// `compact` abbreviates large values for axis labels (`12K`, `1.5K`).
pub fn format_value(kpi: &str, value: Option<f64>, compact: bool) -> String {
    let Some(num) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    let lower = kpi.to_lowercase();
    if lower.contains("share") || lower.contains("rate") {
        return format!("{:.1}%", num);
    }
    if lower.contains("frequency") || lower.contains("uc per order") {
        return format!("{:.1}", num);
    }
    if compact && num >= 1000.0 {
        let decimals = if num >= 10_000.0 { 0 } else { 1 };
        return format!("{:.*}K", decimals, num / 1000.0);
    }
    format_number(num, 0)
}

/// Ratio as a whole percentage, e.g. `0.871` -> `87%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}
