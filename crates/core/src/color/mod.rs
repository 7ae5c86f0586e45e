//! Color helpers used to build palettes for the chart templates.
//!
//! Colors travel through the crate as `#rrggbb` strings because that is what
//! the JavaScript libraries consume. Conversions go through `(u8, u8, u8)`
//! tuples and HSV triples in the `0.0..=1.0` range.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{Result, VisError};

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;
const MAX_DISTANCE_ATTEMPTS: usize = 100;

/// Parses `#rgb` or `#rrggbb` (the leading `#` is optional).
pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(VisError::invalid(format!("`{hex}` is not a hex color"))),
    };

    let channel = |range: std::ops::Range<usize>| {
        expanded
            .get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
            .ok_or_else(|| VisError::invalid(format!("`{hex}` is not a hex color")))
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub fn rgb_to_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// CSS `rgba(...)` string for a hex color.
pub fn hex_to_rgba(hex: &str, alpha: f64) -> Result<String> {
    let (r, g, b) = hex_to_rgb(hex)?;
    Ok(format!("rgba({r}, {g}, {b}, {alpha})"))
}

pub fn rgb_to_hsv((r, g, b): (u8, u8, u8)) -> (f64, f64, f64) {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, v);
    }

    let s = (max - min) / max;
    let rc = (max - r) / (max - min);
    let gc = (max - g) / (max - min);
    let bc = (max - b) / (max - min);
    let h = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    ((h / 6.0).rem_euclid(1.0), s, v)
}

pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let to_byte = |channel: f64| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;

    if s <= 0.0 {
        return (to_byte(v), to_byte(v), to_byte(v));
    }

    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    (to_byte(r), to_byte(g), to_byte(b))
}

/// Interpolates `steps` colors from `from` to `to` in HSV space, taking the
/// shorter way around the hue circle. Both endpoints are included.
pub fn interpolate_colors(from: &str, to: &str, steps: usize) -> Result<Vec<String>> {
    if steps < 2 {
        return Ok(vec![from.to_string()]);
    }

    let (mut h1, s1, v1) = rgb_to_hsv(hex_to_rgb(from)?);
    let (mut h2, s2, v2) = rgb_to_hsv(hex_to_rgb(to)?);

    if (h2 - h1).abs() > 0.5 {
        if h1 > h2 {
            h2 += 1.0;
        } else {
            h1 += 1.0;
        }
    }

    let last = (steps - 1) as f64;
    Ok((0..steps)
        .map(|i| {
            let t = i as f64 / last;
            let h = (h1 * (1.0 - t) + h2 * t).rem_euclid(1.0);
            let s = s1 * (1.0 - t) + s2 * t;
            let v = v1 * (1.0 - t) + v2 * t;
            rgb_to_hex(hsv_to_rgb(h, s, v))
        })
        .collect())
}

/// Base colors for [`generate_color_scale`].
pub fn scheme_colors(scheme: &str) -> Option<&'static [&'static str]> {
    let colors: &'static [&'static str] = match scheme {
        "spectrum" => &[
            "#ff0000", "#ff7f00", "#ffff00", "#00ff00", "#0000ff", "#4b0082", "#9400d3",
        ],
        "rainbow" => &["#ff0000", "#ff7f00", "#ffff00", "#00ff00", "#00ffff", "#0000ff", "#8b00ff"],
        "warm" => &["#ff0000", "#ff4500", "#ff8c00", "#ffa500", "#ffd700", "#ffff00"],
        "cool" => &["#0000ff", "#4169e1", "#00bfff", "#00ffff", "#00fa9a", "#00ff00"],
        "grayscale" => &["#000000", "#333333", "#666666", "#999999", "#cccccc", "#ffffff"],
        "llamasearch" => &[
            "#5ba0d0", "#8ecae6", "#219ebc", "#023047", "#ffb703", "#fd9e02", "#fb8500",
        ],
        _ => return None,
    };
    Some(colors)
}

/// Produces exactly `count` colors from a named scheme.
///
/// The `gradient` scheme interpolates between `start` and `end`; unknown
/// schemes use `spectrum`. When more colors are requested than the scheme
/// holds, consecutive base colors are interpolated.
pub fn generate_color_scale(
    count: usize,
    scheme: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<String>> {
    if count == 0 {
        return Ok(Vec::new());
    }

    if let ("gradient", Some(start), Some(end)) = (scheme, start, end) {
        return interpolate_colors(start, end, count);
    }

    let base = scheme_colors(scheme).unwrap_or_else(|| {
        tracing::debug!(scheme, "unknown color scheme, using spectrum");
        scheme_colors("spectrum").unwrap_or_default()
    });

    if count <= base.len() {
        return Ok(base[..count].iter().map(|c| c.to_string()).collect());
    }

    // Spread the colors between the base stops; the final stop is appended
    // once at the end.
    let segments = base.len() - 1;
    let slots = count - 1;
    let per_segment = slots / segments;
    let remainder = slots % segments;

    let mut colors = Vec::with_capacity(count);
    for (i, pair) in base.windows(2).enumerate() {
        let segment_len = per_segment + usize::from(i < remainder);
        let mut segment = interpolate_colors(pair[0], pair[1], segment_len + 1)?;
        segment.pop();
        colors.extend(segment);
    }
    if let Some(last) = base.last() {
        colors.push(last.to_string());
    }

    Ok(colors)
}

/// Ramps the brightness of `base` toward white (`lighten`) or black over
/// `steps` colors, optionally shifting saturation by `saturation_adjust`.
pub fn shade_scale(
    base: &str,
    steps: usize,
    lighten: bool,
    saturation_adjust: f64,
) -> Result<Vec<String>> {
    let (h, s, v) = rgb_to_hsv(hex_to_rgb(base)?);
    let s = (s + saturation_adjust).clamp(0.0, 1.0);
    if steps == 0 {
        return Ok(Vec::new());
    }
    let last = steps.saturating_sub(1).max(1) as f64;

    Ok((0..steps)
        .map(|i| {
            let t = i as f64 / last;
            let value = if lighten {
                (v + (1.0 - v) * t).min(1.0)
            } else {
                (v * (1.0 - t)).max(0.0)
            };
            rgb_to_hex(hsv_to_rgb(h, s, value))
        })
        .collect())
}

/// Picks `count` visually distinct colors by walking the hue circle with the
/// golden ratio. A fixed `seed` makes the output reproducible.
pub fn generate_contrasting_colors(
    count: usize,
    seed: Option<u64>,
    min_distance: f64,
) -> Vec<String> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut accepted: Vec<(f64, f64, f64)> = Vec::with_capacity(count);
    let mut h: f64 = rng.gen();

    for _ in 0..count {
        h = (h + GOLDEN_RATIO_CONJUGATE) % 1.0;
        let mut s = 0.65 + rng.gen::<f64>() * 0.3;
        let mut v = 0.65 + rng.gen::<f64>() * 0.3;

        for attempt in 0..MAX_DISTANCE_ATTEMPTS {
            let too_close = accepted.iter().any(|&(eh, es, ev)| {
                let hue_distance = (h - eh).abs().min(1.0 - (h - eh).abs());
                hue_distance < min_distance
                    && (s - es).abs() < min_distance
                    && (v - ev).abs() < min_distance
            });
            if !too_close || attempt == MAX_DISTANCE_ATTEMPTS - 1 {
                break;
            }
            h = (h + 0.1) % 1.0;
            s = 0.65 + rng.gen::<f64>() * 0.3;
            v = 0.65 + rng.gen::<f64>() * 0.3;
        }

        accepted.push((h, s, v));
    }

    accepted
        .into_iter()
        .map(|(h, s, v)| rgb_to_hex(hsv_to_rgb(h, s, v)))
        .collect()
}

/// Uses perceived luminance (ITU-R BT.601 weights).
pub fn is_dark_color(hex: &str) -> Result<bool> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let luminance = (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0;
    Ok(luminance < 0.5)
}

/// Black or white, whichever reads better on `background`.
pub fn contrasting_text_color(background: &str) -> Result<&'static str> {
    Ok(if is_dark_color(background)? {
        "#ffffff"
    } else {
        "#000000"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(hex_to_rgb("#ff0000").unwrap(), (255, 0, 0));
        assert_eq!(hex_to_rgb("#f00").unwrap(), (255, 0, 0));
        assert_eq!(hex_to_rgb("08306b").unwrap(), (8, 48, 107));
        assert!(hex_to_rgb("#12345").is_err());
        assert!(hex_to_rgb("#gggggg").is_err());
    }

    #[test]
    fn formats_hex_and_rgba() {
        assert_eq!(rgb_to_hex((255, 0, 0)), "#ff0000");
        assert_eq!(hex_to_rgba("#ff0000", 0.5).unwrap(), "rgba(255, 0, 0, 0.5)");
    }

    #[test]
    fn hsv_round_trips_primaries() {
        for rgb in [(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 255), (0, 0, 0)] {
            let (h, s, v) = rgb_to_hsv(rgb);
            assert_eq!(hsv_to_rgb(h, s, v), rgb);
        }
    }

    #[test]
    fn interpolation_keeps_endpoints() {
        let colors = interpolate_colors("#ff0000", "#0000ff", 5).unwrap();
        assert_eq!(colors.len(), 5);
        assert_eq!(colors.first().map(String::as_str), Some("#ff0000"));
        assert_eq!(colors.last().map(String::as_str), Some("#0000ff"));
        // Red to blue wraps through magenta, so green stays at zero.
        let (_, g, _) = hex_to_rgb(&colors[2]).unwrap();
        assert_eq!(g, 0);
    }

    #[test]
    fn interpolation_with_one_step_returns_start() {
        assert_eq!(interpolate_colors("#123456", "#ffffff", 1).unwrap(), vec!["#123456"]);
    }

    #[test]
    fn color_scale_returns_requested_count() {
        assert_eq!(generate_color_scale(0, "warm", None, None).unwrap().len(), 0);
        assert_eq!(
            generate_color_scale(3, "warm", None, None).unwrap(),
            vec!["#ff0000", "#ff4500", "#ff8c00"]
        );
        for count in [7, 8, 13, 20] {
            let colors = generate_color_scale(count, "spectrum", None, None).unwrap();
            assert_eq!(colors.len(), count);
            assert_eq!(colors[0], "#ff0000");
        }
    }

    #[test]
    fn gradient_scale_uses_endpoints() {
        let colors = generate_color_scale(4, "gradient", Some("#000000"), Some("#ffffff")).unwrap();
        assert_eq!(colors.first().map(String::as_str), Some("#000000"));
        assert_eq!(colors.last().map(String::as_str), Some("#ffffff"));
    }

    #[test]
    fn shade_scale_lightens_toward_white() {
        let shades = shade_scale("#800000", 3, true, 0.0).unwrap();
        assert_eq!(shades.len(), 3);
        assert_eq!(shades[0], "#800000");
        let (_, _, v) = rgb_to_hsv(hex_to_rgb(&shades[2]).unwrap());
        assert!((v - 1.0).abs() < 1e-9);

        let darker = shade_scale("#800000", 3, false, 0.0).unwrap();
        assert_eq!(darker[2], "#000000");
    }

    #[test]
    fn contrasting_colors_are_reproducible() {
        let first = generate_contrasting_colors(6, Some(42), 0.25);
        let second = generate_contrasting_colors(6, Some(42), 0.25);
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert!(first.iter().all(|c| hex_to_rgb(c).is_ok()));
    }

    #[test]
    fn text_color_contrasts_background() {
        assert_eq!(contrasting_text_color("#1a1a1a").unwrap(), "#ffffff");
        assert_eq!(contrasting_text_color("#f6f6f9").unwrap(), "#000000");
    }
}
