/// A meter color/category tag, packed as ABGR (`0xAABBGGRR`).
///
/// The packing matches an `R8G8B8A8_UNORM` vertex color read as a
/// little-endian `u32`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeterColor(pub u32);

impl MeterColor {
    /// Color used when a region does not pick one.
    pub const DEFAULT: Self = Self(0x80FF_00FF);
    /// Tag of the zero-length interval seeded by each rotation.
    pub const SEED: Self = Self(0);
    /// Guide lane color for even lanes.
    pub const GUIDE_DARK: Self = Self(0x8080_8080);
    /// Guide lane color for odd lanes.
    pub const GUIDE_LIGHT: Self = Self(0x80FF_FFFF);

    /// Pack 8-bit channels.
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((a as u32) << 24 | (b as u32) << 16 | (g as u32) << 8 | r as u32)
    }

    /// Unpack into `[r, g, b, a]`.
    pub const fn to_rgba(self) -> [u8; 4] {
        [
            self.0 as u8,
            (self.0 >> 8) as u8,
            (self.0 >> 16) as u8,
            (self.0 >> 24) as u8,
        ]
    }
}

impl Default for MeterColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for MeterColor {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
