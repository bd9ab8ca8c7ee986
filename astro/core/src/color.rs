//! Color values and named presets for Astro's tint.
//!
//! Presets are a stateless lookup: a name resolves to three 0-255 channels
//! that are forwarded verbatim to the character's `Red`/`Green`/`Blue` inputs.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An 8-bit RGB color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as numeric input values
    #[must_use]
    pub fn channels(&self) -> [f64; 3] {
        [f64::from(self.r), f64::from(self.g), f64::from(self.b)]
    }

    /// Linear mix toward `other`
    #[must_use]
    pub fn mix(&self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel =
            |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    /// `#rrggbb` representation
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #rrggbb, got '{s}'"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("invalid color '{s}': {e}"))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Named color presets
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorPresets {
    presets: BTreeMap<String, Rgb>,
}

impl Default for ColorPresets {
    fn default() -> Self {
        let presets = [
            ("default", Rgb::new(124, 92, 255)),
            ("blue", Rgb::new(64, 156, 255)),
            ("green", Rgb::new(52, 199, 89)),
            ("orange", Rgb::new(255, 149, 0)),
            ("pink", Rgb::new(255, 45, 135)),
            ("purple", Rgb::new(175, 82, 222)),
            ("red", Rgb::new(255, 59, 48)),
            ("yellow", Rgb::new(255, 204, 0)),
        ]
        .into_iter()
        .map(|(name, rgb)| (name.to_string(), rgb))
        .collect();
        Self { presets }
    }
}

impl ColorPresets {
    /// Presets with no entries
    #[must_use]
    pub fn empty() -> Self {
        Self {
            presets: BTreeMap::new(),
        }
    }

    /// Look up a preset (case-insensitive)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rgb> {
        self.presets.get(&name.trim().to_lowercase()).copied()
    }

    /// Add or replace a preset
    pub fn insert(&mut self, name: impl Into<String>, rgb: Rgb) {
        self.presets.insert(name.into().trim().to_lowercase(), rgb);
    }

    /// Preset names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Number of presets
    #[must_use]
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether no presets are defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
