//! Color mapping from audio features to the background color.
//!
//! Spectral centroid picks the hue (bassy content sits in indigo, mids in
//! teal, bright content in amber). Energy drives saturation and lightness so
//! louder input is both more vivid and brighter.

use std::fmt;

/// Exponent of the perceptual centroid curve; spreads out the low end
const CENTROID_CURVE: f32 = 0.7;

/// Hue at centroid 0 (indigo)
const HUE_LOW: f32 = 280.0;

/// Hue at the curve midpoint (teal)
const HUE_MID: f32 = 190.0;

/// Hue at centroid 1 (amber)
const HUE_HIGH: f32 = 30.0;

/// A color in hue (degrees), saturation (%), lightness (%) space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub const WHITE: Hsl = Hsl::new(0.0, 0.0, 100.0);

    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Convert to sRGB components in [0, 1] (CSS Color 4 algorithm)
    pub fn to_rgb(&self) -> Rgb {
        let hue = self.hue.rem_euclid(360.0);
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);
        let a = s * l.min(1.0 - l);

        let channel = |n: f32| {
            let k = (n + hue / 30.0) % 12.0;
            l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
        };

        Rgb::new(channel(0.0), channel(8.0), channel(4.0))
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue.round() as i32,
            self.saturation.round() as i32,
            self.lightness.round() as i32
        )
    }
}

/// sRGB color, components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        if t >= 1.0 {
            return other;
        }
        let t = t.max(0.0);
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Decode sRGB transfer function to linear light
    pub fn to_linear(self) -> Rgb {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Rgb::new(decode(self.r), decode(self.g), decode(self.b))
    }
}

/// Background color for one frame: either the mapped color or the
/// white strobe override
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualizerColor {
    Strobe,
    Hsl(Hsl),
}

impl VisualizerColor {
    pub fn is_strobe(&self) -> bool {
        matches!(self, VisualizerColor::Strobe)
    }

    pub fn to_hsl(&self) -> Hsl {
        match self {
            VisualizerColor::Strobe => Hsl::WHITE,
            VisualizerColor::Hsl(hsl) => *hsl,
        }
    }

    pub fn to_rgb(&self) -> Rgb {
        self.to_hsl().to_rgb()
    }
}

impl fmt::Display for VisualizerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_hsl().fmt(f)
    }
}

/// Map normalized spectral centroid (0-1) to hue in degrees.
///
/// 0 → 280 (indigo), curve midpoint → 190 (teal), 1 → 30 (amber)
pub fn centroid_to_hue(centroid: f32) -> f32 {
    let curved = centroid.clamp(0.0, 1.0).powf(CENTROID_CURVE);
    hue_from_curved(curved)
}

fn hue_from_curved(curved: f32) -> f32 {
    if curved < 0.5 {
        HUE_LOW - curved * 2.0 * (HUE_LOW - HUE_MID)
    } else {
        HUE_MID - (curved - 0.5) * 2.0 * (HUE_MID - HUE_HIGH)
    }
}

/// Map normalized energy (0-1) to (saturation %, lightness %)
pub fn energy_to_sl(energy: f32) -> (f32, f32) {
    let energy = energy.clamp(0.0, 1.0);
    let saturation = 40.0 + energy * 50.0; // 40-90%
    let lightness = 8.0 + energy * 32.0; // 8-40%
    (saturation, lightness)
}

/// Full background color for one frame. `strobe` wins over everything.
pub fn visualizer_color(centroid: f32, energy: f32, strobe: bool) -> VisualizerColor {
    if strobe {
        return VisualizerColor::Strobe;
    }

    let hue = centroid_to_hue(centroid);
    let (saturation, lightness) = energy_to_sl(energy);
    VisualizerColor::Hsl(Hsl::new(hue, saturation, lightness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strobe_overrides_features() {
        for (centroid, energy) in [(0.0, 0.0), (0.3, 0.9), (1.0, 1.0)] {
            let color = visualizer_color(centroid, energy, true);
            assert!(color.is_strobe());
            assert_eq!(color.to_string(), "hsl(0, 0%, 100%)");
        }
    }

    #[test]
    fn test_mapping_is_pure() {
        let a = visualizer_color(0.42, 0.63, false).to_string();
        let b = visualizer_color(0.42, 0.63, false).to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hue_endpoints() {
        assert_eq!(centroid_to_hue(0.0), 280.0);
        assert!((centroid_to_hue(1.0) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_hue_branches_meet_at_midpoint() {
        let low_branch = HUE_LOW - 0.5 * 2.0 * (HUE_LOW - HUE_MID);
        let high_branch = HUE_MID - (0.5 - 0.5) * 2.0 * (HUE_MID - HUE_HIGH);
        assert_eq!(low_branch, 190.0);
        assert_eq!(high_branch, 190.0);
        assert_eq!(hue_from_curved(0.5), 190.0);

        // Centroid whose curved value is exactly the midpoint
        let midpoint = 0.5f32.powf(1.0 / CENTROID_CURVE);
        assert!((centroid_to_hue(midpoint) - 190.0).abs() < 1e-3);
        assert!((hue_from_curved(0.5 - 1e-6) - 190.0).abs() < 1e-3);
    }

    #[test]
    fn test_hue_decreases_with_centroid() {
        let mut previous = centroid_to_hue(0.0);
        for i in 1..=100 {
            let hue = centroid_to_hue(i as f32 / 100.0);
            assert!(hue <= previous);
            previous = hue;
        }
    }

    #[test]
    fn test_saturation_lightness_monotonic() {
        let (mut prev_s, mut prev_l) = energy_to_sl(0.0);
        assert_eq!((prev_s, prev_l), (40.0, 8.0));

        for i in 1..=100 {
            let (s, l) = energy_to_sl(i as f32 / 100.0);
            assert!(s >= prev_s);
            assert!(l >= prev_l);
            prev_s = s;
            prev_l = l;
        }
        assert_eq!((prev_s, prev_l), (90.0, 40.0));
    }

    #[test]
    fn test_display_rounds() {
        // centroid 0 → hue 280; energy 0.5 → 65% / 24%
        assert_eq!(
            visualizer_color(0.0, 0.5, false).to_string(),
            "hsl(280, 65%, 24%)"
        );
        assert_eq!(Hsl::new(189.6, 40.4, 8.5).to_string(), "hsl(190, 40%, 9%)");
    }

    #[test]
    fn test_hsl_to_rgb() {
        let white = Hsl::WHITE.to_rgb();
        assert!((white.r - 1.0).abs() < 1e-6);
        assert!((white.g - 1.0).abs() < 1e-6);
        assert!((white.b - 1.0).abs() < 1e-6);

        let green = Hsl::new(120.0, 100.0, 50.0).to_rgb();
        assert!(green.r.abs() < 1e-6);
        assert!((green.g - 1.0).abs() < 1e-6);
        assert!(green.b.abs() < 1e-6);

        let grey = Hsl::new(0.0, 0.0, 4.0).to_rgb();
        assert!((grey.r - 0.04).abs() < 1e-6);
        assert_eq!(grey.r, grey.b);
    }

    #[test]
    fn test_rgb_lerp_clamps() {
        let black = Rgb::default();
        let white = Rgb::new(1.0, 1.0, 1.0);
        assert_eq!(black.lerp(white, 2.0), white);
        assert_eq!(black.lerp(white, -1.0), black);
        assert!((black.lerp(white, 0.25).g - 0.25).abs() < 1e-6);
    }
}
