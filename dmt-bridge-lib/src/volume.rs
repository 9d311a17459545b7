//! Conversions between panel volume values and amplifier gain.
//!
//! The amplifier's native control unit is a gain in `[0.0, 1.0]`. The panel
//! works in a linear 0-100 level. The two are related by
//! `gain = 2^(level/10) / 1000`, with level 0 pinned to gain 0.0 (not
//! `2^0/1000`) and level 100 pinned to gain 1.0.
//!
//! Two wire encodings of the level coexist on the panel side:
//! - **packed**: the level sits in the high byte of the 16-bit variable value
//!   (`0x3200` is level 50), low byte unused;
//! - **raw linear**: the full 16-bit value maps linearly across the window
//!   `[0x100, 0x164]` onto 0-100.

/// Lowest raw variable value of the linear window.
pub const VP_WINDOW_MIN: u16 = 0x100;

/// Highest raw variable value of the linear window. The window spans exactly
/// 100 units.
pub const VP_WINDOW_MAX: u16 = 0x164;

/// Convert a 0-100 level to amplifier gain.
///
/// Level 0 is a hard floor at gain 0.0; levels at or above 100 saturate to
/// gain 1.0.
pub fn level_to_gain(level: u8) -> f64 {
    if level == 0 {
        return 0.0;
    }
    if level >= 100 {
        return 1.0;
    }
    ((level as f64 / 10.0).exp2() / 1000.0).min(1.0)
}

/// Convert an amplifier gain back to the nearest 0-100 level.
///
/// Gains at or below 0.0 map to level 0 and gains at or above 1.0 map to
/// level 100 exactly; everything else is `10 * log2(gain * 1000)` rounded.
pub fn gain_to_level(gain: f64) -> u8 {
    if gain <= 0.0 {
        return 0;
    }
    if gain >= 1.0 {
        return 100;
    }
    (10.0 * (gain * 1000.0).log2()).round().clamp(0.0, 100.0) as u8
}

/// Extract the level from a packed variable value (high byte).
pub fn packed_to_level(value: u16) -> u8 {
    ((value >> 8) as u8).min(100)
}

/// Pack a level into a variable value (high byte, low byte zero).
pub fn level_to_packed(level: u8) -> u16 {
    (level.min(100) as u16) << 8
}

/// Packed variable value to gain.
pub fn packed_to_gain(value: u16) -> f64 {
    level_to_gain(packed_to_level(value))
}

/// Gain to packed variable value.
pub fn gain_to_packed(gain: f64) -> u16 {
    level_to_packed(gain_to_level(gain))
}

/// Linear map of a raw variable value across the `[0x100, 0x164]` window
/// onto 0-100. Values outside the window clamp to the nearest end.
///
/// This is also the plain linear volume percentage for call sites that skip
/// the exponential law entirely.
pub fn raw_to_level(value: u16) -> u8 {
    let clamped = value.clamp(VP_WINDOW_MIN, VP_WINDOW_MAX);
    (clamped - VP_WINDOW_MIN) as u8
}

/// Inverse of [`raw_to_level`]: place a 0-100 level back into the raw window.
pub fn level_to_raw(level: u8) -> u16 {
    VP_WINDOW_MIN + level.min(100) as u16
}

/// Raw-linear variable value to gain.
pub fn raw_to_gain(value: u16) -> f64 {
    level_to_gain(raw_to_level(value))
}

/// Gain to raw-linear variable value.
pub fn gain_to_raw(gain: f64) -> u16 {
    level_to_raw(gain_to_level(gain))
}
