use std::time::{SystemTime, UNIX_EPOCH};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use rand::Rng;

use crate::error::{Result, VisError};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// `fooBarBaz` / `FooBar` to `foo_bar_baz` / `foo_bar`. Acronyms stay grouped,
/// so `parseHTTPResponse` becomes `parse_http_response`.
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

pub fn snake_to_camel(name: &str) -> String {
    let mut parts = name.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

/// Shortens `text` to at most `max_len` characters, ending with `suffix` when
/// anything was cut.
pub fn truncate(text: &str, max_len: usize, suffix: &str) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let keep = max_len.saturating_sub(suffix.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(suffix);
    out
}

fn trim_fixed(value: f64, precision: usize) -> String {
    let formatted = format!("{value:.precision$}");
    if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        formatted
    }
}

/// Compact number formatting: `1500` becomes `1.5K`, `2_000_000` becomes `2M`.
pub fn format_number(value: f64, precision: usize) -> String {
    let mut scaled = value;
    for suffix in ["", "K", "M", "B", "T"] {
        if scaled.abs() < 1000.0 {
            return format!("{}{suffix}", trim_fixed(scaled, precision));
        }
        scaled /= 1000.0;
    }
    format!("{}Q", trim_fixed(scaled, precision))
}

/// Linearly rescales `values` into `out_min..=out_max`. Bounds default to the
/// data's own extent; a zero-width input range maps everything to `out_min`.
pub fn normalize(
    values: &[f64],
    min: Option<f64>,
    max: Option<f64>,
    out_min: f64,
    out_max: f64,
) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = min.unwrap_or_else(|| values.iter().copied().fold(f64::INFINITY, f64::min));
    let max = max.unwrap_or_else(|| values.iter().copied().fold(f64::NEG_INFINITY, f64::max));

    if (max - min).abs() < f64::EPSILON {
        return vec![out_min; values.len()];
    }

    values
        .iter()
        .map(|v| out_min + (out_max - out_min) * (v - min) / (max - min))
        .collect()
}

/// Maps values to marker sizes on a square-root scale, which keeps small
/// values distinguishable.
pub fn normalize_for_display(values: &[f64], min_size: f64, max_size: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (hi - lo).abs() < f64::EPSILON {
        return vec![min_size + (max_size - min_size) / 2.0; values.len()];
    }

    values
        .iter()
        .map(|v| min_size + (max_size - min_size) * ((v - lo) / (hi - lo)).sqrt())
        .collect()
}

/// Splits a CSS length such as `100px` or `50%` into number and unit. A bare
/// number is taken as pixels; anything unparsable is `(0.0, "px")`.
pub fn parse_css_size(size: &str) -> (f64, String) {
    let size = size.trim();
    let split = size
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(size.len());
    let (number, unit) = size.split_at(split);

    let unit_ok = unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%');
    match number.parse::<f64>() {
        Ok(value) if unit_ok && !number.starts_with('.') && !number.ends_with('.') => {
            let unit = if unit.is_empty() { "px" } else { unit };
            (value, unit.to_string())
        }
        _ => (0.0, "px".to_string()),
    }
}

/// DOM id of the form `{prefix}_{unix millis}_{six random digits}`.
pub fn generate_unique_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("{prefix}_{millis}_{suffix}")
}

/// Formats `date` with a strftime pattern such as [`DEFAULT_DATE_FORMAT`].
pub fn format_date(date: &NaiveDateTime, format: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(VisError::invalid(format!("invalid date format `{format}`")));
    }
    Ok(date.format_with_items(items.iter()).to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn converts_between_cases() {
        assert_eq!(camel_to_snake("backgroundColor"), "background_color");
        assert_eq!(camel_to_snake("ChartType"), "chart_type");
        assert_eq!(camel_to_snake("parseHTTPResponse"), "parse_http_response");
        assert_eq!(snake_to_camel("point_hover_radius"), "pointHoverRadius");
        assert_eq!(snake_to_camel("plain"), "plain");
    }

    #[test]
    fn truncates_with_suffix() {
        assert_eq!(truncate("abcdefghij", 5, "..."), "ab...");
        assert_eq!(truncate("short", 30, "..."), "short");
        assert_eq!(truncate("abcdef", 2, "..."), "...");
    }

    #[test]
    fn formats_numbers_with_suffixes() {
        assert_eq!(format_number(12.5, 2), "12.5");
        assert_eq!(format_number(999.0, 2), "999");
        assert_eq!(format_number(1500.0, 2), "1.5K");
        assert_eq!(format_number(2_000_000.0, 2), "2M");
        assert_eq!(format_number(-3_210_000_000.0, 1), "-3.2B");
    }

    #[test]
    fn normalizes_into_range() {
        assert_eq!(normalize(&[0.0, 5.0, 10.0], None, None, 0.0, 1.0), vec![0.0, 0.5, 1.0]);
        assert_eq!(normalize(&[3.0, 3.0], None, None, 1.0, 2.0), vec![1.0, 1.0]);
        assert!(normalize(&[], None, None, 0.0, 1.0).is_empty());
    }

    #[test]
    fn display_sizes_use_square_root() {
        let sizes = normalize_for_display(&[0.0, 25.0, 100.0], 0.0, 10.0);
        assert_eq!(sizes, vec![0.0, 5.0, 10.0]);
        assert_eq!(normalize_for_display(&[4.0, 4.0], 5.0, 50.0), vec![27.5, 27.5]);
    }

    #[test]
    fn parses_css_sizes() {
        assert_eq!(parse_css_size("100px"), (100.0, "px".to_string()));
        assert_eq!(parse_css_size("50%"), (50.0, "%".to_string()));
        assert_eq!(parse_css_size("12.5em"), (12.5, "em".to_string()));
        assert_eq!(parse_css_size("640"), (640.0, "px".to_string()));
        assert_eq!(parse_css_size("auto"), (0.0, "px".to_string()));
    }

    #[test]
    fn unique_ids_carry_prefix() {
        let id = generate_unique_id("llamavis-container");
        let parts: Vec<&str> = id.rsplitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2], "llamavis-container");
        assert_eq!(parts[0].len(), 6);
        assert_ne!(id, generate_unique_id("llamavis-container"));
    }

    #[test]
    fn formats_dates_with_strftime_patterns() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(14, 5, 0))
            .unwrap();
        assert_eq!(format_date(&date, DEFAULT_DATE_FORMAT).unwrap(), "2024-03-09");
        assert_eq!(format_date(&date, "%d %b %Y %H:%M").unwrap(), "09 Mar 2024 14:05");
        assert!(format_date(&date, "%Q").is_err());
    }
}
