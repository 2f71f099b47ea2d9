//! Value-to-color mapping for the county choropleth.
//!
//! Colors are plain sRGB triples blended channel-wise; no gamma
//! correction. Two no-data grays exist per theme and must stay
//! visually distinct: one for a county that is present in the backend
//! but has a zero/missing value, and a darker one for a county absent
//! from the backend entirely.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::OverlayResolution;

/// Base color for the poverty overlay (red-400).
pub const POVERTY_BASE: Rgb = Rgb::new(0xf8, 0x71, 0x71);
/// Base color for the healthcare-access overlay (emerald-400).
pub const HEALTHCARE_BASE: Rgb = Rgb::new(0x34, 0xd3, 0x99);
/// Base color for the pollution overlay (blue-400).
pub const POLLUTION_BASE: Rgb = Rgb::new(0x60, 0xa5, 0xfa);
/// Base color for mortality/incidence/trend overlays (violet-400).
pub const MORTALITY_BASE: Rgb = Rgb::new(0xa7, 0x8b, 0xfa);
/// Base color for the population overlay (amber-400).
pub const POPULATION_BASE: Rgb = Rgb::new(0xfb, 0xbf, 0x24);
/// Base color for carcinogen/cancer presence overlays (orange-400).
pub const EXPOSURE_BASE: Rgb = Rgb::new(0xfb, 0x92, 0x3c);
/// Negative-extreme color for diverging scales (blue-500).
pub const NEGATIVE_BASE: Rgb = Rgb::new(0x3b, 0x82, 0xf6);

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color {input:?}: expected #rrggbb")]
pub struct ParseColorError {
    /// The rejected input.
    pub input: String,
}

impl Rgb {
    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Component-wise linear blend toward `other`. `t` is clamped to
    /// `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let blend = |a: u8, b: u8| -> u8 {
            let mixed = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                mixed.round().clamp(0.0, 255.0) as u8
            }
        };
        Self {
            r: blend(self.r, other.r),
            g: blend(self.g, other.g),
            b: blend(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError {
            input: s.to_string(),
        };
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if hex.len() != 6 {
            return Err(err());
        }
        let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| err())?;
        let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| err())?;
        let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| err())?;
        Ok(Self { r, g, b })
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Display theme, matching the frontend's light/dark mode toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Light map background.
    #[default]
    Light,
    /// Dark map background.
    Dark,
}

impl Theme {
    /// Neutral background blended with the overlay base color at t=0.
    #[must_use]
    pub const fn neutral_background(self) -> Rgb {
        match self {
            Self::Light => Rgb::new(0xf1, 0xf5, 0xf9), // slate-100
            Self::Dark => Rgb::new(0x1e, 0x29, 0x3b),  // slate-800
        }
    }

    /// Fill for a county present in the backend with a zero/missing
    /// overlay value.
    #[must_use]
    pub const fn no_data_fill(self) -> Rgb {
        match self {
            Self::Light => Rgb::new(0xe2, 0xe8, 0xf0), // slate-200
            Self::Dark => Rgb::new(0x33, 0x41, 0x55),  // slate-700
        }
    }

    /// Fill for a county absent from the backend entirely. Darker
    /// than [`Self::no_data_fill`] so the two cases stay
    /// distinguishable on the map.
    #[must_use]
    pub const fn absent_fill(self) -> Rgb {
        match self {
            Self::Light => Rgb::new(0x94, 0xa3, 0xb8), // slate-400
            Self::Dark => Rgb::new(0x0f, 0x17, 0x2a),  // slate-900
        }
    }

    /// County border color.
    #[must_use]
    pub const fn stroke(self) -> Rgb {
        match self {
            Self::Light => Rgb::new(0xff, 0xff, 0xff),
            Self::Dark => Rgb::new(0x64, 0x74, 0x8b), // slate-500
        }
    }

    /// Fill when no overlay is selected.
    #[must_use]
    pub const fn neutral_fill(self) -> Rgb {
        match self {
            Self::Light => Rgb::new(0x25, 0x63, 0xeb), // blue-600
            Self::Dark => Rgb::new(0x33, 0x41, 0x55),  // slate-700
        }
    }
}

/// Maps a county's resolved overlay value to a fill color.
///
/// `value` is `None` when the county is absent from the resolved
/// mapping entirely. A present-but-zero (or NaN) value gets the
/// in-scale no-data gray instead.
///
/// Linear mode (range entirely non-negative or entirely non-positive)
/// blends the theme's neutral background toward `base`. Diverging
/// mode (`min < 0 < max`) blends [`NEGATIVE_BASE`] → neutral →
/// `base`, with the neutral midpoint anchored exactly at value zero
/// regardless of how lopsided the range is.
#[must_use]
pub fn fill_color(
    value: Option<f64>,
    resolution: &OverlayResolution,
    base: Rgb,
    theme: Theme,
) -> Rgb {
    let Some(value) = value else {
        return theme.absent_fill();
    };
    if value.is_nan() {
        return theme.no_data_fill();
    }

    let (min, max) = (resolution.min, resolution.max);
    let neutral = theme.neutral_background();
    let diverging = min < 0.0 && max > 0.0;

    // Zero reads as "no data" on a one-sided scale, but on a
    // diverging scale it is the meaningful midpoint.
    if value == 0.0 && !diverging {
        return theme.no_data_fill();
    }

    if diverging {
        // t computed independently on each side of zero, so the
        // midpoint lands exactly at value zero.
        if value < 0.0 {
            let t = (value - min) / (0.0 - min);
            return NEGATIVE_BASE.lerp(neutral, t);
        }
        let t = value / max;
        return neutral.lerp(base, t);
    }

    let mut t = if (max - min).abs() < f64::EPSILON {
        0.0
    } else {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    };
    if resolution.inverted {
        t = 1.0 - t;
    }
    neutral.lerp(base, t)
}

/// Per-county style record consumed by the map renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStyle {
    /// Polygon fill color.
    pub fill_color: Rgb,
    /// Polygon fill opacity, `[0, 1]`.
    pub fill_opacity: f64,
    /// Border color.
    pub stroke_color: Rgb,
    /// Border weight in pixels.
    pub stroke_weight: f64,
}

impl RegionStyle {
    /// Style when no overlay is selected.
    #[must_use]
    pub const fn neutral(theme: Theme) -> Self {
        Self {
            fill_color: theme.neutral_fill(),
            fill_opacity: 0.2,
            stroke_color: theme.stroke(),
            stroke_weight: 1.0,
        }
    }

    /// Style for a hovered county.
    #[must_use]
    pub const fn hovered() -> Self {
        let highlight = Rgb::new(0x25, 0x63, 0xeb);
        Self {
            fill_color: highlight,
            fill_opacity: 0.5,
            stroke_color: highlight,
            stroke_weight: 3.0,
        }
    }

    /// Style for a county under the active overlay.
    #[must_use]
    pub fn overlaid(value: Option<f64>, resolution: &OverlayResolution, base: Rgb, theme: Theme) -> Self {
        Self {
            fill_color: fill_color(value, resolution, base, theme),
            fill_opacity: 0.5,
            stroke_color: theme.stroke(),
            stroke_weight: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn resolution(min: f64, max: f64, inverted: bool) -> OverlayResolution {
        OverlayResolution {
            values: BTreeMap::new(),
            min,
            max,
            inverted,
        }
    }

    #[test]
    fn hex_round_trip() {
        let color: Rgb = "#f87171".parse().unwrap();
        assert_eq!(color, Rgb::new(0xf8, 0x71, 0x71));
        assert_eq!(color.to_string(), "#f87171");
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("f87171".parse::<Rgb>().is_err());
        assert!("#f871".parse::<Rgb>().is_err());
        assert!("#f87h71".parse::<Rgb>().is_err());
    }

    #[test]
    fn lerp_endpoints_and_clamping() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 2.0), b);
        assert_eq!(a.lerp(b, -1.0), a);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(100, 50, 25));
    }

    #[test]
    fn zero_value_gets_no_data_fill() {
        let res = resolution(5.0, 10.0, false);
        let c = fill_color(Some(0.0), &res, POVERTY_BASE, Theme::Light);
        assert_eq!(c, Theme::Light.no_data_fill());
    }

    #[test]
    fn absent_county_gets_darker_fill_than_no_data() {
        for theme in [Theme::Light, Theme::Dark] {
            let res = resolution(5.0, 10.0, false);
            let absent = fill_color(None, &res, POVERTY_BASE, theme);
            let no_data = fill_color(Some(0.0), &res, POVERTY_BASE, theme);
            assert_eq!(absent, theme.absent_fill());
            assert_ne!(absent, no_data);
        }
    }

    #[test]
    fn linear_scale_spans_neutral_to_base() {
        let res = resolution(10.0, 20.0, false);
        let at_min = fill_color(Some(10.0), &res, POVERTY_BASE, Theme::Light);
        let at_max = fill_color(Some(20.0), &res, POVERTY_BASE, Theme::Light);
        assert_eq!(at_min, Theme::Light.neutral_background());
        assert_eq!(at_max, POVERTY_BASE);
    }

    #[test]
    fn degenerate_range_maps_to_neutral() {
        let res = resolution(7.0, 7.0, false);
        let c = fill_color(Some(7.0), &res, POVERTY_BASE, Theme::Light);
        assert_eq!(c, Theme::Light.neutral_background());
    }

    #[test]
    fn inverted_max_matches_non_inverted_min() {
        let normal = resolution(40.0, 90.0, false);
        let inverted = resolution(40.0, 90.0, true);
        let inverted_at_max = fill_color(Some(90.0), &inverted, HEALTHCARE_BASE, Theme::Light);
        let normal_at_min = fill_color(Some(40.0), &normal, HEALTHCARE_BASE, Theme::Light);
        assert_eq!(inverted_at_max, normal_at_min);
    }

    #[test]
    fn diverging_midpoint_is_neutral_regardless_of_ratio() {
        let res = resolution(-10.0, 20.0, false);
        let neutral = Theme::Light.neutral_background();
        assert_eq!(
            fill_color(Some(0.0), &res, MORTALITY_BASE, Theme::Light),
            neutral
        );
        // A lopsided range must not move the midpoint off zero.
        let lopsided = resolution(-1.0, 1000.0, false);
        assert_eq!(
            fill_color(Some(0.0), &lopsided, MORTALITY_BASE, Theme::Light),
            neutral
        );
    }

    #[test]
    fn diverging_extremes_hit_both_bases() {
        let res = resolution(-10.0, 20.0, false);
        let at_min = fill_color(Some(-10.0), &res, MORTALITY_BASE, Theme::Light);
        let at_max = fill_color(Some(20.0), &res, MORTALITY_BASE, Theme::Light);
        assert_eq!(at_min, NEGATIVE_BASE);
        assert_eq!(at_max, MORTALITY_BASE);
    }
}
