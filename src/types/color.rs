//! Color representation for document objects

use std::fmt;

/// An RGB color as stored in the document color table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Create a color from RGB components
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Color { red, green, blue }
    }

    pub const WHITE: Color = Color::from_rgb(255, 255, 255);
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);
    pub const RED: Color = Color::from_rgb(255, 0, 0);
    pub const GREEN: Color = Color::from_rgb(0, 255, 0);
    pub const BLUE: Color = Color::from_rgb(0, 0, 255);
    pub const CYAN: Color = Color::from_rgb(1, 160, 198);
    pub const MAGENTA: Color = Color::from_rgb(239, 4, 127);
    pub const YELLOW: Color = Color::from_rgb(255, 255, 0);
    pub const REGISTRATION: Color = Color::from_rgb(0, 0, 0);

    /// Apply a shade percentage in `[0, 1]`, mixing the color towards white.
    ///
    /// A shade of `1.0` keeps the color, `0.0` yields white. Values outside
    /// the range leave the color unchanged.
    pub fn apply_shade(&self, shade: f64) -> Color {
        if !(0.0..=1.0).contains(&shade) {
            log::debug!("Invalid shade {}", shade);
            return *self;
        }
        let tint = 1.0 - shade;
        let mix = |c: u8| -> u8 {
            let c = c as f64;
            (c + (255.0 - c) * tint).round() as u8
        };
        Color::from_rgb(mix(self.red), mix(self.green), mix(self.blue))
    }

    /// `#rrggbb` notation.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Gradient blend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GradientType {
    #[default]
    Linear,
    MidLinear,
    Rectangular,
    Diamond,
    Circular,
    FullCircular,
}

impl GradientType {
    /// Map the on-disk blend code; unknown codes fall back to linear.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x10 => Some(GradientType::Linear),
            0x18 => Some(GradientType::MidLinear),
            0x19 => Some(GradientType::Rectangular),
            0x1a => Some(GradientType::Diamond),
            0x1b => Some(GradientType::Circular),
            0x1c => Some(GradientType::FullCircular),
            _ => None,
        }
    }
}

/// A two-color blend
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gradient {
    pub gradient_type: GradientType,
    pub color1: Color,
    pub color2: Color,
    /// Angle in degrees
    pub angle: f64,
}

/// Box fill: solid color or gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Color),
    Gradient(Gradient),
}

impl Fill {
    /// The solid color, if this is a solid fill.
    pub fn solid_color(&self) -> Option<Color> {
        match self {
            Fill::Solid(c) => Some(*c),
            Fill::Gradient(_) => None,
        }
    }
}
