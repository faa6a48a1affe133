//! Material descriptors for flat, unlit effect primitives

use serde::{Deserialize, Serialize};

/// Linear RGB tint with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl Color {
    /// Pure white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a color from RGB components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Pack into a `0xRRGGBB` value
    pub fn to_hex(self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

bitflags::bitflags! {
    /// Render state flags carried by a material
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialFlags: u32 {
        /// Blend using the material opacity
        const TRANSPARENT = 1 << 0;
        /// Render both faces
        const DOUBLE_SIDED = 1 << 1;
        /// Test against the depth buffer
        const DEPTH_TEST = 1 << 2;
    }
}

/// Material description handed to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDescriptor {
    /// Tint color
    pub color: Color,
    /// Opacity in `[0, 1]`
    pub opacity: f32,
    /// Render state flags
    pub flags: MaterialFlags,
}

impl MaterialDescriptor {
    /// Transparent, double-sided, depth-tested material
    pub fn translucent(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity: opacity.clamp(0.0, 1.0),
            flags: MaterialFlags::TRANSPARENT | MaterialFlags::DOUBLE_SIDED | MaterialFlags::DEPTH_TEST,
        }
    }

    /// Copy with a different opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Copy with a different tint
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Enable or disable depth testing
    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.flags.set(MaterialFlags::DEPTH_TEST, enabled);
        self
    }
}
