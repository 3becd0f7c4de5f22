// src/color.rs
// Hex color validation, repair and channel-shift helpers used by the
// analysis repair step and the fallback palette generator.

/// Returns true for a fully normalized `#RRGGBB` code.
pub fn is_valid_hex(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Repair a hex code the way the analysis pipeline tolerates them:
/// a missing `#` is prepended and a 3-digit shorthand (`#abc`) is
/// expanded to the doubled form (`#aabbcc`). Anything that still does
/// not parse as `#RRGGBB` afterwards is rejected with `None`.
pub fn normalize_hex(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    let expanded = if digits.len() == 3 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        digits.chars().flat_map(|c| [c, c]).collect::<String>()
    } else {
        digits.to_string()
    };

    let candidate = format!("#{}", expanded);
    if is_valid_hex(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Parse a normalized `#RRGGBB` code into channels.
pub fn parse_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let normalized = normalize_hex(hex)?;
    let digits = &normalized[1..];

    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

fn shift_channels(hex: &str, delta: i16) -> Option<String> {
    let (r, g, b) = parse_rgb(hex)?;
    let shift = |c: u8| (c as i16 + delta).clamp(0, 255) as u8;
    Some(format!("#{:02X}{:02X}{:02X}", shift(r), shift(g), shift(b)))
}

/// Lighten by adding `amount` to every channel, clamped to 255.
pub fn lighten(hex: &str, amount: u8) -> Option<String> {
    shift_channels(hex, amount as i16)
}

/// Darken by subtracting `amount` from every channel, clamped to 0.
pub fn darken(hex: &str, amount: u8) -> Option<String> {
    shift_channels(hex, -(amount as i16))
}
