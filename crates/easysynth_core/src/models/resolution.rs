//! Output image resolution with even, clamped dimensions.

pub const MIN_WIDTH: u32 = 100;
pub const MAX_WIDTH: u32 = 1920 * 2;
pub const MIN_HEIGHT: u32 = 100;
pub const MAX_HEIGHT: u32 = 1080 * 2;

/// Width and height of rendered images in pixels.
///
/// Both dimensions are always even and within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputImageResolution {
    width: u32,
    height: u32,
}

impl Default for OutputImageResolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl OutputImageResolution {
    /// Build a resolution, normalizing both dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        let mut resolution = Self::default();
        resolution.set_width(width);
        resolution.set_height(height);
        resolution
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = even_within(width, MIN_WIDTH, MAX_WIDTH);
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = even_within(height, MIN_HEIGHT, MAX_HEIGHT);
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl std::fmt::Display for OutputImageResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// Bounds are even, so rounding down after the clamp stays in range.
fn even_within(value: u32, min: u32, max: u32) -> u32 {
    value.clamp(min, max) / 2 * 2
}
