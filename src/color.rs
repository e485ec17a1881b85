//! CSS color helpers shared by the generators.
//!
//! Scene colors stay CSS strings. The lenient entry points (`decay`, `shade`,
//! `interpolate`) never fail: a color that does not parse is logged and handed
//! back unchanged so a run degrades visually instead of stopping.

use crate::error::ColorError;

/// Hue shift applied by one decay step, in degrees.
pub const HUE_DECAY: f32 = 2.0;
/// Upper bound of the random lightness drop applied by one decay step.
pub const MAX_LIGHTNESS_DECAY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Degrees in `[0, 360)`.
    pub h: f32,
    /// Percent in `[0, 100]`.
    pub s: f32,
    /// Percent in `[0, 100]`.
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self {
            h: wrap_hue(h),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }

    pub fn from_rgb([r, g, b]: [u8; 3]) -> Self {
        let r = r as f32 / 255.0;
        let g = g as f32 / 255.0;
        let b = b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) * 0.5;
        let d = max - min;
        if d <= f32::EPSILON {
            return Self::new(0.0, 0.0, l * 100.0);
        }
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Self::new(h * 60.0, s * 100.0, l * 100.0)
    }

    pub fn to_rgb(self) -> [u8; 3] {
        let h = self.h / 360.0;
        let s = self.s / 100.0;
        let l = self.l / 100.0;
        if s <= 0.0 {
            let v = to_channel(l);
            return [v, v, v];
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        [
            to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            to_channel(hue_to_rgb(p, q, h)),
            to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        ]
    }

    /// One decay step: hue nudged down, lightness reduced, saturation kept.
    pub fn decay(self, lightness_drop: f32) -> Self {
        self.shade(HUE_DECAY, lightness_drop)
    }

    pub fn shade(self, hue_shift: f32, lightness_drop: f32) -> Self {
        Self::new(
            self.h - hue_shift,
            self.s,
            (self.l - lightness_drop.max(0.0)).max(0.0),
        )
    }

    /// Interpolates along the shorter hue arc. `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mut dh = other.h - self.h;
        if dh > 180.0 {
            dh -= 360.0;
        } else if dh < -180.0 {
            dh += 360.0;
        }
        Self::new(
            self.h + dh * t,
            self.s + (other.s - self.s) * t,
            self.l + (other.l - self.l) * t,
        )
    }

    pub fn to_css(self) -> String {
        format!(
            "hsl({},{}%,{}%)",
            fmt_num(self.h),
            fmt_num(self.s),
            fmt_num(self.l)
        )
    }
}

pub fn parse(color: &str) -> Result<Hsl, ColorError> {
    let raw = color.trim();
    let malformed = || ColorError::Malformed(color.to_string());

    if let Some(hex) = raw.strip_prefix('#') {
        return parse_hex(hex).map(Hsl::from_rgb).ok_or_else(malformed);
    }
    if let Some(body) = function_body(raw, "hsl") {
        let [h, s, l] = parse_triplet(body).ok_or_else(malformed)?;
        return Ok(Hsl::new(h, s, l));
    }
    if let Some(body) = function_body(raw, "rgb") {
        let [r, g, b] = parse_triplet(body).ok_or_else(malformed)?;
        if ![r, g, b].iter().all(|c| (0.0..=255.0).contains(c)) {
            return Err(malformed());
        }
        return Ok(Hsl::from_rgb([r as u8, g as u8, b as u8]));
    }
    Err(malformed())
}

pub fn parse_rgb(color: &str) -> Result<[u8; 3], ColorError> {
    parse(color).map(Hsl::to_rgb)
}

pub fn is_valid(color: &str) -> bool {
    parse(color).is_ok()
}

pub fn hex_to_hsl(hex: &str) -> Result<Hsl, ColorError> {
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    parse_hex(digits)
        .map(Hsl::from_rgb)
        .ok_or_else(|| ColorError::Malformed(hex.to_string()))
}

pub fn hsl_to_hex(hsl: Hsl) -> String {
    let [r, g, b] = hsl.to_rgb();
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Converts any supported color into its `hsl(...)` form.
pub fn to_hsl_css(color: &str) -> String {
    match parse(color) {
        Ok(hsl) => hsl.to_css(),
        Err(err) => lenient(color, err),
    }
}

/// One decay step with a random lightness drop in `[0, MAX_LIGHTNESS_DECAY)`.
pub fn decay(color: &str, rng: &mut fastrand::Rng) -> String {
    match parse(color) {
        Ok(hsl) => hsl.decay(rng.f32() * MAX_LIGHTNESS_DECAY).to_css(),
        Err(err) => lenient(color, err),
    }
}

pub fn shade(color: &str, hue_shift: f32, lightness_drop: f32) -> String {
    match parse(color) {
        Ok(hsl) => hsl.shade(hue_shift, lightness_drop).to_css(),
        Err(err) => lenient(color, err),
    }
}

pub fn interpolate(from: &str, to: &str, t: f32) -> String {
    match (parse(from), parse(to)) {
        (Ok(a), Ok(b)) => a.lerp(b, t).to_css(),
        (Err(err), _) | (_, Err(err)) => lenient(from, err),
    }
}

pub fn random_rgb(rng: &mut fastrand::Rng) -> String {
    format!(
        "rgb({},{},{})",
        rng.u8(0..255),
        rng.u8(0..255),
        rng.u8(0..255)
    )
}

pub fn random_hue(rng: &mut fastrand::Rng) -> String {
    format!("hsl({},100%,50%)", rng.u32(0..360))
}

/// Rec. 601 luma, 0..=255.
pub fn luma(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb;
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

fn lenient(color: &str, err: ColorError) -> String {
    tracing::warn!(%err, "keeping color unchanged");
    color.to_string()
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                let v = ch.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(out)
        }
        6 => Some([
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        ]),
        _ => None,
    }
}

fn function_body<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    let lower = raw.get(..name.len())?;
    if !lower.eq_ignore_ascii_case(name) {
        return None;
    }
    raw[name.len()..]
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_triplet(body: &str) -> Option<[f32; 3]> {
    let mut out = [0.0f32; 3];
    let mut parts = body.split(',');
    for slot in &mut out {
        let part = parts.next()?.trim();
        let part = part.strip_suffix('%').unwrap_or(part).trim();
        let v = part.parse::<f32>().ok()?;
        if !v.is_finite() {
            return None;
        }
        *slot = v;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn wrap_hue(h: f32) -> f32 {
    if !h.is_finite() {
        return 0.0;
    }
    let w = h.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if w >= 360.0 { 0.0 } else { w }
}

fn fmt_num(v: f32) -> String {
    let rounded = (v * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i32)
    } else {
        format!("{rounded:.1}")
    }
}
