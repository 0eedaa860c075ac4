//! Value-to-appearance presets and label contrast
//!
//! Maps a cube's numeric value to a color preset and picks a label color
//! that stays readable against it. Values without a preset keep whatever
//! appearance they already have.

use serde::{Deserialize, Serialize};

use super::cube::Cube;

/// Linear RGB color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance (ITU-R BT.601 weights)
    #[inline]
    pub fn luminance(&self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }
}

/// Dark label color for light backgrounds
pub const LABEL_DARK: Rgb = Rgb::new(0.2, 0.2, 0.2);
/// Light label color for dark backgrounds
pub const LABEL_LIGHT: Rgb = Rgb::new(0.95, 0.95, 0.95);

/// One value -> color mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubePreset {
    pub value: u32,
    pub color: Rgb,
}

/// Label color for a given background: dark on light, light on dark.
/// Luminance of exactly 0.5 gets the light label.
#[inline]
pub fn contrast_color(background: Rgb) -> Rgb {
    if background.luminance() > 0.5 {
        LABEL_DARK
    } else {
        LABEL_LIGHT
    }
}

/// Immutable value -> preset table, built once at startup
#[derive(Debug, Clone)]
pub struct AppearanceResolver {
    presets: Vec<CubePreset>,
}

impl AppearanceResolver {
    /// Build the table from a preset list. Duplicate values keep the
    /// first-seen preset silently.
    pub fn new(presets: impl IntoIterator<Item = CubePreset>) -> Self {
        let mut table: Vec<CubePreset> = Vec::new();
        for preset in presets {
            if table.iter().any(|p| p.value == preset.value) {
                continue;
            }
            table.push(preset);
        }
        Self { presets: table }
    }

    /// Look up the preset for a value
    pub fn resolve(&self, value: u32) -> Option<&CubePreset> {
        self.presets.iter().find(|p| p.value == value)
    }

    /// Apply color and label to a cube for its current value.
    ///
    /// Missing preset is not an error: the cube keeps its prior appearance
    /// and only the label text is refreshed.
    pub fn apply_to(&self, cube: &mut Cube) {
        cube.label = cube.value.to_string();
        match self.resolve(cube.value) {
            Some(preset) => {
                cube.color = preset.color;
                cube.label_color = contrast_color(preset.color);
            }
            None => {
                log::debug!("no appearance preset for value {}", cube.value);
            }
        }
    }
}

impl Default for AppearanceResolver {
    /// Stock palette for values 2..=2048
    fn default() -> Self {
        Self::new([
            CubePreset { value: 2, color: Rgb::new(0.93, 0.89, 0.85) },
            CubePreset { value: 4, color: Rgb::new(0.93, 0.88, 0.78) },
            CubePreset { value: 8, color: Rgb::new(0.95, 0.69, 0.47) },
            CubePreset { value: 16, color: Rgb::new(0.96, 0.58, 0.39) },
            CubePreset { value: 32, color: Rgb::new(0.96, 0.49, 0.37) },
            CubePreset { value: 64, color: Rgb::new(0.96, 0.37, 0.23) },
            CubePreset { value: 128, color: Rgb::new(0.93, 0.81, 0.45) },
            CubePreset { value: 256, color: Rgb::new(0.93, 0.80, 0.38) },
            CubePreset { value: 512, color: Rgb::new(0.93, 0.78, 0.31) },
            CubePreset { value: 1024, color: Rgb::new(0.93, 0.77, 0.25) },
            CubePreset { value: 2048, color: Rgb::new(0.93, 0.76, 0.18) },
        ])
    }
}
