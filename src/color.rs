use std::fmt;
use std::str::FromStr;

use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::error::InvalidSelectionError;

// ---------------------------------------------------------------------------
// Color schemes
// ---------------------------------------------------------------------------

/// A named palette mapping data values to colors. The five schemes mirror
/// the matplotlib colormaps of the same names; each is stored as sRGB
/// anchor colors and sampled by piecewise-linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Viridis,
    Magma,
    Plasma,
    Inferno,
    Cividis,
}

// Anchor colors sampled evenly across the source colormaps.

const VIRIDIS: [(u8, u8, u8); 10] = [
    (68, 1, 84),
    (72, 40, 120),
    (62, 74, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (109, 205, 89),
    (180, 222, 44),
    (253, 231, 37),
];

const MAGMA: [(u8, u8, u8); 9] = [
    (0, 0, 4),
    (28, 16, 68),
    (79, 18, 123),
    (129, 37, 129),
    (181, 54, 122),
    (229, 80, 100),
    (251, 135, 97),
    (254, 194, 135),
    (252, 253, 191),
];

const PLASMA: [(u8, u8, u8); 8] = [
    (13, 8, 135),
    (84, 2, 163),
    (139, 10, 165),
    (185, 50, 137),
    (219, 92, 104),
    (244, 136, 73),
    (254, 188, 43),
    (240, 249, 33),
];

const INFERNO: [(u8, u8, u8); 9] = [
    (0, 0, 4),
    (31, 12, 72),
    (85, 15, 109),
    (136, 34, 106),
    (186, 54, 85),
    (227, 89, 51),
    (249, 140, 10),
    (249, 201, 50),
    (252, 255, 164),
];

const CIVIDIS: [(u8, u8, u8); 10] = [
    (0, 32, 76),
    (0, 42, 102),
    (33, 62, 106),
    (66, 82, 110),
    (93, 102, 116),
    (120, 122, 119),
    (149, 143, 114),
    (181, 166, 103),
    (215, 190, 83),
    (255, 234, 70),
];

impl ColorScheme {
    /// All recognized schemes, in the order the UI shell lists them.
    pub const ALL: [ColorScheme; 5] = [
        ColorScheme::Viridis,
        ColorScheme::Magma,
        ColorScheme::Plasma,
        ColorScheme::Inferno,
        ColorScheme::Cividis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Viridis => "viridis",
            ColorScheme::Magma => "magma",
            ColorScheme::Plasma => "plasma",
            ColorScheme::Inferno => "inferno",
            ColorScheme::Cividis => "cividis",
        }
    }

    fn anchors(&self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorScheme::Viridis => &VIRIDIS,
            ColorScheme::Magma => &MAGMA,
            ColorScheme::Plasma => &PLASMA,
            ColorScheme::Inferno => &INFERNO,
            ColorScheme::Cividis => &CIVIDIS,
        }
    }

    /// Continuous sample at `t` in `[0, 1]` (clamped). Interpolates between
    /// the two nearest anchors in linear RGB.
    pub fn sample(&self, t: f64) -> RGBColor {
        let anchors = self.anchors();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };

        let pos = t * (anchors.len() - 1) as f64;
        let i = (pos.floor() as usize).min(anchors.len() - 2);
        let frac = (pos - i as f64) as f32;

        let mixed = to_linear(anchors[i]).mix(to_linear(anchors[i + 1]), frac);
        let rgb: Srgb = Srgb::from_linear(mixed);
        RGBColor(
            (rgb.red * 255.0).round() as u8,
            (rgb.green * 255.0).round() as u8,
            (rgb.blue * 255.0).round() as u8,
        )
    }

    /// `n` colors at positions `i / n`, for per-item coloring of bars,
    /// bins and boxes.
    pub fn discrete(&self, n: usize) -> Vec<RGBColor> {
        (0..n).map(|i| self.sample(i as f64 / n as f64)).collect()
    }
}

fn to_linear((r, g, b): (u8, u8, u8)) -> LinSrgb {
    Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0).into_linear()
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "viridis" => Ok(ColorScheme::Viridis),
            "magma" => Ok(ColorScheme::Magma),
            "plasma" => Ok(ColorScheme::Plasma),
            "inferno" => Ok(ColorScheme::Inferno),
            "cividis" => Ok(ColorScheme::Cividis),
            _ => Err(InvalidSelectionError::UnknownColorScheme {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("viridis".parse::<ColorScheme>().unwrap(), ColorScheme::Viridis);
        assert_eq!("Magma".parse::<ColorScheme>().unwrap(), ColorScheme::Magma);
        assert_eq!("CIVIDIS".parse::<ColorScheme>().unwrap(), ColorScheme::Cividis);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "rainbow".parse::<ColorScheme>().unwrap_err();
        assert!(matches!(
            err,
            InvalidSelectionError::UnknownColorScheme { name } if name == "rainbow"
        ));
    }

    #[test]
    fn sample_hits_the_anchor_endpoints() {
        let lo = ColorScheme::Viridis.sample(0.0);
        let hi = ColorScheme::Viridis.sample(1.0);
        // Within a rounding step of the sRGB anchors.
        assert!((lo.0 as i32 - 68).abs() <= 1 && (lo.2 as i32 - 84).abs() <= 1);
        assert!((hi.0 as i32 - 253).abs() <= 1 && (hi.2 as i32 - 37).abs() <= 1);
    }

    #[test]
    fn sample_clamps_out_of_range_inputs() {
        for scheme in ColorScheme::ALL {
            assert_eq!(scheme.sample(-1.0), scheme.sample(0.0));
            assert_eq!(scheme.sample(2.0), scheme.sample(1.0));
        }
    }

    #[test]
    fn discrete_yields_requested_count() {
        assert_eq!(ColorScheme::Plasma.discrete(7).len(), 7);
        assert!(ColorScheme::Plasma.discrete(0).is_empty());
    }

    #[test]
    fn serde_names_are_lowercase() {
        let json = serde_json::to_string(&ColorScheme::Inferno).unwrap();
        assert_eq!(json, "\"inferno\"");
        let back: ColorScheme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ColorScheme::Inferno);
    }
}
