//! RGBA colour conversion for decoder style payloads.
//!
//! Formats produce colours either as 8-bit channels or as unit floats.
//! Both are converted to lowercase `rrggbbaa` hex without a leading `#`.

use crate::error::DecodeError;

/// Converts four 8-bit channels to hex.
///
/// Fails with [`DecodeError::BadColor`] unless there are exactly four
/// channels, each within `[0, 255]`.
pub fn rgba_to_hex(rgba: &[i64]) -> Result<String, DecodeError> {
    if rgba.len() != 4 || rgba.iter().any(|c| !(0..=255).contains(c)) {
        return Err(DecodeError::BadColor);
    }
    Ok(rgba.iter().map(|c| format!("{c:02x}")).collect())
}

/// Converts four unit-float channels to hex.
///
/// Fails with [`DecodeError::BadColor`] unless there are exactly four
/// channels, each within `[0, 1]`.
pub fn rgba_float_to_hex(rgba: &[f64]) -> Result<String, DecodeError> {
    if rgba.len() != 4 || rgba.iter().any(|c| !(0.0..=1.0).contains(c)) {
        return Err(DecodeError::BadColor);
    }
    let channels: Vec<i64> = rgba.iter().map(|c| (c * 255.0).round() as i64).collect();
    rgba_to_hex(&channels)
}
