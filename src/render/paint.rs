//! Fill colors, presets and blend state.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// 8-bit RGB color
pub type Rgb = [u8; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Solid,
    Gradient,
}

/// Particle fill as configured: `#rrggbb` hex strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub mode: ColorMode,
    pub color_a: String,
    pub color_b: String,
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self::gradient("#00f3ff", "#bc13fe")
    }
}

/// Named palettes
pub const COLOR_PRESETS: [(&str, ColorMode, &str, &str); 6] = [
    ("whiteout", ColorMode::Solid, "#ffffff", "#ffffff"),
    ("matrix", ColorMode::Solid, "#00ff00", "#00ff00"),
    ("cyberpunk", ColorMode::Gradient, "#00f3ff", "#bc13fe"),
    ("sunset", ColorMode::Gradient, "#ff512f", "#dd2476"),
    ("gold", ColorMode::Gradient, "#fdc830", "#f37335"),
    ("deep-sea", ColorMode::Gradient, "#2b5876", "#4e4376"),
];

impl ColorSpec {
    pub fn solid(color: &str) -> Self {
        Self {
            mode: ColorMode::Solid,
            color_a: color.to_string(),
            color_b: color.to_string(),
        }
    }

    pub fn gradient(from: &str, to: &str) -> Self {
        Self {
            mode: ColorMode::Gradient,
            color_a: from.to_string(),
            color_b: to.to_string(),
        }
    }

    /// Look up a named preset
    pub fn preset(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        COLOR_PRESETS
            .iter()
            .find(|(preset, ..)| *preset == name)
            .map(|&(_, mode, a, b)| Self {
                mode,
                color_a: a.to_string(),
                color_b: b.to_string(),
            })
    }

    /// Parse the hex colors into a fill
    pub fn resolve(&self) -> Result<Fill> {
        let a = parse_hex_color(&self.color_a).ok_or_else(|| ConfigError::InvalidValue {
            key: "render.color.color_a".to_string(),
            value: self.color_a.clone(),
        })?;

        match self.mode {
            ColorMode::Solid => Ok(Fill::Solid(a)),
            ColorMode::Gradient => {
                let b = parse_hex_color(&self.color_b).ok_or_else(|| ConfigError::InvalidValue {
                    key: "render.color.color_b".to_string(),
                    value: self.color_b.clone(),
                })?;
                Ok(Fill::Diagonal { from: a, to: b })
            }
        }
    }
}

/// Parse `#rrggbb`, `rrggbb` or `#rgb`
pub fn parse_hex_color(value: &str) -> Option<Rgb> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        3 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some([channel(0)?, channel(1)?, channel(2)?])
        }
        _ => None,
    }
}

/// Resolved fill style
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Rgb),
    /// Linear gradient from the top-left to the bottom-right corner
    Diagonal { from: Rgb, to: Rgb },
}

impl Fill {
    /// Fill color at pixel center `(x, y)` of a `width × height` surface
    pub fn color_at(&self, x: f32, y: f32, width: f32, height: f32) -> Rgb {
        match *self {
            Fill::Solid(color) => color,
            Fill::Diagonal { from, to } => {
                let length_sq = width * width + height * height;
                let t = if length_sq > 0.0 {
                    ((x * width + y * height) / length_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
                [lerp(from[0], to[0]), lerp(from[1], to[1]), lerp(from[2], to[2])]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Normal alpha compositing
    SourceOver,
    /// Additive, saturating at white
    Lighter,
}

/// Blend state of one frame's particle pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blend {
    pub mode: BlendMode,
    pub opacity: f32,
}

impl Blend {
    pub const NORMAL: Blend = Blend {
        mode: BlendMode::SourceOver,
        opacity: 1.0,
    };

    /// Additive glow when `glow_intensity > 0`, normal blending otherwise
    pub fn from_glow(glow_intensity: f32) -> Self {
        if glow_intensity > 0.0 {
            Blend {
                mode: BlendMode::Lighter,
                opacity: (0.5 + glow_intensity / 100.0).min(1.0),
            }
        } else {
            Self::NORMAL
        }
    }

    /// Composite `src` over `dst` at the given pixel coverage
    pub fn apply(&self, dst: &mut [u8], src: Rgb, coverage: f32) {
        let alpha = (coverage * self.opacity).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        for (d, s) in dst.iter_mut().zip(src) {
            let value = match self.mode {
                BlendMode::SourceOver => *d as f32 + (s as f32 - *d as f32) * alpha,
                BlendMode::Lighter => *d as f32 + s as f32 * alpha,
            };
            *d = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#00f3ff"), Some([0x00, 0xf3, 0xff]));
        assert_eq!(parse_hex_color("FDC830"), Some([0xfd, 0xc8, 0x30]));
        assert_eq!(parse_hex_color("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_presets_resolve() {
        for (name, ..) in COLOR_PRESETS {
            let spec = ColorSpec::preset(name).unwrap();
            assert!(spec.resolve().is_ok(), "preset {} does not resolve", name);
        }
        assert_eq!(ColorSpec::preset("Cyberpunk"), Some(ColorSpec::default()));
        assert!(ColorSpec::preset("plaid").is_none());
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let spec = ColorSpec::gradient("#000000", "not-a-color");
        assert!(spec.resolve().is_err());

        // color_b is irrelevant for solid fills
        let spec = ColorSpec {
            mode: ColorMode::Solid,
            color_a: "#101010".to_string(),
            color_b: "???".to_string(),
        };
        assert_eq!(spec.resolve().unwrap(), Fill::Solid([16, 16, 16]));
    }

    #[test]
    fn test_diagonal_gradient_endpoints() {
        let fill = Fill::Diagonal {
            from: [0, 0, 0],
            to: [200, 100, 50],
        };
        assert_eq!(fill.color_at(0.0, 0.0, 100.0, 100.0), [0, 0, 0]);
        assert_eq!(fill.color_at(100.0, 100.0, 100.0, 100.0), [200, 100, 50]);
        assert_eq!(fill.color_at(50.0, 50.0, 100.0, 100.0), [100, 50, 25]);
        // The anti-diagonal is one isoline
        assert_eq!(
            fill.color_at(100.0, 0.0, 100.0, 100.0),
            fill.color_at(0.0, 100.0, 100.0, 100.0)
        );
    }

    #[test]
    fn test_blend_from_glow() {
        assert_eq!(Blend::from_glow(0.0), Blend::NORMAL);
        let glow = Blend::from_glow(30.0);
        assert_eq!(glow.mode, BlendMode::Lighter);
        assert!((glow.opacity - 0.8).abs() < 1e-6);
        assert_eq!(Blend::from_glow(90.0).opacity, 1.0);
    }

    #[test]
    fn test_blend_apply() {
        let mut pixel = [100u8, 100, 100];
        Blend::NORMAL.apply(&mut pixel, [200, 0, 100], 1.0);
        assert_eq!(pixel, [200, 0, 100]);

        let mut pixel = [100u8, 100, 100];
        Blend::NORMAL.apply(&mut pixel, [200, 0, 100], 0.5);
        assert_eq!(pixel, [150, 50, 100]);

        let mut pixel = [200u8, 10, 0];
        Blend::from_glow(50.0).apply(&mut pixel, [100, 100, 100], 1.0);
        assert_eq!(pixel, [255, 110, 100]);
    }
}
