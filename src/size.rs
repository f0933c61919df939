/// Megabytes per gigabyte in size expressions.
const MB_PER_GB: f64 = 1024.0;

/// Parses a human size expression (`512`, `512M`, `1G`, `1.5g`) into whole
/// megabytes.
///
/// The number must be plain decimal digits with an optional fractional part;
/// the unit is `M` or `G` (case-insensitive) and defaults to megabytes.
/// Fractions are truncated toward zero after unit conversion, so `1.5G` is
/// 1536 and `512.9` is 512. Returns `None` for anything else.
pub fn parse_size(text: &str) -> Option<u64> {
    let text = text.trim().to_uppercase();

    let (number, unit) = match text.char_indices().last() {
        Some((i, c @ ('M' | 'G'))) => (&text[..i], c),
        Some(_) => (text.as_str(), 'M'),
        None => return None,
    };

    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (number, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.map_or(true, all_digits) {
        return None;
    }

    let value: f64 = number.parse().ok()?;
    let mb = if unit == 'G' { value * MB_PER_GB } else { value };

    // 2^64 and up does not fit; below that `as` truncates toward zero.
    if mb >= u64::MAX as f64 {
        return None;
    }
    Some(mb as u64)
}

/// One-line hint shown after an unparsable size.
pub const SIZE_HINT: &str =
    "Please enter a number followed by optional M or G (e.g., 512M, 1G, or just 512)";
