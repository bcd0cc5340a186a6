//! Structural descriptions of the graphics resources the producer creates.
//!
//! The classifier never sees pixel contents; everything it knows about a
//! buffer comes from a [`ResourceDescriptor`].

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Opaque identity of a producer-owned resource.
///
/// FrameLens never dereferences or owns the resource behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(pub u64);

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Dimensionality of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceDimension {
    Buffer,
    #[serde(rename = "texture_1d")]
    Texture1D,
    #[serde(rename = "texture_2d")]
    Texture2D,
    #[serde(rename = "texture_3d")]
    Texture3D,
}

/// Pixel format classes relevant to classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    // Four-channel color.
    Rgba32Float,
    Rgba16Float,
    R11G11B10Float,
    Rgb10A2Unorm,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Typeless,
    Rgba8Typeless,
    Rgb10A2Typeless,

    // Two-channel.
    Rg32Float,
    Rg16Float,
    Rg16Snorm,
    Rg16Typeless,
    Rg8Unorm,

    // Single-channel.
    R32Float,
    R16Float,
    R8Unorm,

    // Depth and depth-compatible typeless.
    D32Float,
    D32FloatS8X24,
    D24UnormS8,
    D16Unorm,
    R32Typeless,
    R32G8X24Typeless,
    R24G8Typeless,
    R16Typeless,

    /// Block-compressed formats (never render outputs).
    BlockCompressed,
    Unknown,
}

impl PixelFormat {
    /// Formats that can only be bound as depth/stencil.
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            Self::D32Float | Self::D32FloatS8X24 | Self::D24UnormS8 | Self::D16Unorm
        )
    }

    /// Typeless formats whose interpretation is chosen per view.
    pub fn is_typeless(self) -> bool {
        matches!(
            self,
            Self::Rgba16Typeless
                | Self::Rgba8Typeless
                | Self::Rgb10A2Typeless
                | Self::Rg16Typeless
                | Self::R32Typeless
                | Self::R32G8X24Typeless
                | Self::R24G8Typeless
                | Self::R16Typeless
        )
    }

    /// Floating-point color formats.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            Self::Rgba32Float
                | Self::Rgba16Float
                | Self::R11G11B10Float
                | Self::Rg32Float
                | Self::Rg16Float
                | Self::R32Float
                | Self::R16Float
        )
    }

    /// Number of channels, or 0 when unknown.
    pub fn channel_count(self) -> u8 {
        match self {
            Self::Rgba32Float
            | Self::Rgba16Float
            | Self::Rgb10A2Unorm
            | Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb
            | Self::Rgba16Typeless
            | Self::Rgba8Typeless
            | Self::Rgb10A2Typeless => 4,
            Self::R11G11B10Float => 3,
            Self::Rg32Float
            | Self::Rg16Float
            | Self::Rg16Snorm
            | Self::Rg16Typeless
            | Self::Rg8Unorm
            | Self::D32FloatS8X24
            | Self::D24UnormS8
            | Self::R32G8X24Typeless
            | Self::R24G8Typeless => 2,
            Self::R32Float
            | Self::R16Float
            | Self::R8Unorm
            | Self::D32Float
            | Self::D16Unorm
            | Self::R32Typeless
            | Self::R16Typeless => 1,
            Self::BlockCompressed | Self::Unknown => 0,
        }
    }
}

/// Capabilities a resource was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageFlags {
    bits: u32,
}

impl UsageFlags {
    pub const NONE: Self = Self { bits: 0 };
    /// Bindable as a color render target.
    pub const RENDER_TARGET: Self = Self { bits: 1 << 0 };
    /// Bindable as a depth/stencil attachment.
    pub const DEPTH_STENCIL: Self = Self { bits: 1 << 1 };
    /// Writable from compute / pixel shaders (UAV / storage).
    pub const UNORDERED_ACCESS: Self = Self { bits: 1 << 2 };
    /// Readable from shaders.
    pub const SHADER_RESOURCE: Self = Self { bits: 1 << 3 };
    /// Shared across devices or processes.
    pub const SHARED: Self = Self { bits: 1 << 4 };

    pub const fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    pub const fn bits(self) -> u32 {
        self.bits
    }

    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        (self.bits & other.bits) == other.bits
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl BitOr for UsageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Structural descriptor of one resource, as seen at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub dimension: ResourceDimension,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    #[serde(default)]
    pub usage: UsageFlags,
    #[serde(default = "one")]
    pub sample_count: u32,
    #[serde(default = "one")]
    pub mip_levels: u32,
}

fn one() -> u32 {
    1
}

impl ResourceDescriptor {
    /// Single-sample, single-mip 2D texture.
    pub fn texture_2d(width: u32, height: u32, format: PixelFormat, usage: UsageFlags) -> Self {
        Self {
            dimension: ResourceDimension::Texture2D,
            width,
            height,
            format,
            usage,
            sample_count: 1,
            mip_levels: 1,
        }
    }

    pub fn with_samples(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn with_mips(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// 2D texture with non-zero extent.
    pub fn is_well_formed_2d(&self) -> bool {
        self.dimension == ResourceDimension::Texture2D && self.width > 0 && self.height > 0
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// The semantic meaning a classified buffer is believed to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Color,
    Depth,
    MotionVectors,
    Exposure,
}

impl Role {
    /// Roles tracked through scored candidate collections.
    pub const TRACKED: [Role; 3] = [Role::Color, Role::Depth, Role::MotionVectors];

    /// Dense index for the tracked roles.
    pub fn tracked_index(self) -> Option<usize> {
        match self {
            Role::Color => Some(0),
            Role::Depth => Some(1),
            Role::MotionVectors => Some(2),
            Role::Exposure => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Color => "color",
            Role::Depth => "depth",
            Role::MotionVectors => "motion_vectors",
            Role::Exposure => "exposure",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_flags_combine() {
        let usage = UsageFlags::RENDER_TARGET | UsageFlags::SHADER_RESOURCE;
        assert!(usage.contains(UsageFlags::RENDER_TARGET));
        assert!(usage.contains(UsageFlags::SHADER_RESOURCE));
        assert!(!usage.contains(UsageFlags::DEPTH_STENCIL));
        assert!(UsageFlags::NONE.is_empty());
    }

    #[test]
    fn test_format_classes() {
        assert!(PixelFormat::D32Float.is_depth());
        assert!(!PixelFormat::R32Typeless.is_depth());
        assert!(PixelFormat::R32Typeless.is_typeless());
        assert!(PixelFormat::Rg16Float.is_float());
        assert_eq!(PixelFormat::Rg16Float.channel_count(), 2);
        assert_eq!(PixelFormat::R11G11B10Float.channel_count(), 3);
    }

    #[test]
    fn test_descriptor_defaults_from_json() {
        let json = r#"{"dimension":"texture_2d","width":1920,"height":1080,"format":"rg16_float","usage":5}"#;
        let desc: ResourceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(desc.sample_count, 1);
        assert_eq!(desc.mip_levels, 1);
        assert!(desc.usage.contains(UsageFlags::UNORDERED_ACCESS));
        assert!(desc.is_well_formed_2d());
    }

    #[test]
    fn test_zero_extent_is_malformed() {
        let desc = ResourceDescriptor::texture_2d(0, 1080, PixelFormat::Rgba8Unorm, UsageFlags::NONE);
        assert!(!desc.is_well_formed_2d());
    }

    #[test]
    fn test_tracked_roles_have_dense_indices() {
        for (i, role) in Role::TRACKED.iter().enumerate() {
            assert_eq!(role.tracked_index(), Some(i));
        }
        assert_eq!(Role::Exposure.tracked_index(), None);
    }

    #[test]
    fn test_handle_display_is_hex() {
        assert_eq!(ResourceHandle(255).to_string(), "0xff");
    }
}
