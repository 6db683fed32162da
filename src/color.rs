use crate::error::ColorError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// An sRGB color parsed from a hex code, with an optional alpha channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: Option<u8>,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }

    /// Parse `#rgb` or `#rrggbb` (case-insensitive)
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(hex.to_string());

        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        match digits.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    rgb[i] = v * 17;
                }
                Ok(Self::rgb(rgb[0], rgb[1], rgb[2]))
            }
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_rgba(&self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a.unwrap_or(255)])
    }

    pub fn to_hex(&self) -> String {
        match self.a {
            Some(a) => format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, a),
            None => format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
        }
    }

    /// Euclidean distance in RGB space, alpha ignored
    pub fn distance(&self, rgb: [u8; 3]) -> f64 {
        let [r, g, b] = rgb;
        let dr = self.r as f64 - r as f64;
        let dg = self.g as f64 - g as f64;
        let db = self.b as f64 - b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// All integer RGB triples within `threshold` (Euclidean, inclusive) of `color`.
///
/// The result always contains the color itself.
pub fn similar_colors(color: &Color, threshold: f64) -> Result<HashSet<[u8; 3]>, ColorError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(ColorError::InvalidThreshold(threshold));
    }

    // No triple can be further than 255 per channel away
    let span = threshold.floor().min(255.0) as i32;
    let range = |c: u8| {
        let c = c as i32;
        (c - span).max(0)..=(c + span).min(255)
    };

    let mut out = HashSet::new();
    for r in range(color.r) {
        for g in range(color.g) {
            for b in range(color.b) {
                let rgb = [r as u8, g as u8, b as u8];
                if color.distance(rgb) <= threshold {
                    out.insert(rgb);
                }
            }
        }
    }

    Ok(out)
}

/// Per-channel mean of `colors`, rounded to the nearest integer.
///
/// With `keep_alpha`, a missing alpha channel counts as fully opaque.
pub fn average_color(colors: &[Color], keep_alpha: bool) -> Result<Color, ColorError> {
    let first = colors.first().ok_or(ColorError::Empty)?;

    if colors.len() == 1 {
        let mut single = *first;
        if !keep_alpha {
            single.a = None;
        }
        return Ok(single);
    }

    let n = colors.len() as f64;
    let mean = |f: fn(&Color) -> u8| {
        let sum: f64 = colors.iter().map(|c| f(c) as f64).sum();
        (sum / n).round() as u8
    };

    Ok(Color {
        r: mean(|c| c.r),
        g: mean(|c| c.g),
        b: mean(|c| c.b),
        a: keep_alpha.then(|| mean(|c| c.a.unwrap_or(255))),
    })
}

/// Average a list of hex strings, validating each entry first
pub fn average_hex<S: AsRef<str>>(colors: &[S], keep_alpha: bool) -> Result<Color, ColorError> {
    let parsed = colors
        .iter()
        .map(|c| Color::from_hex(c.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    average_color(&parsed, keep_alpha)
}
