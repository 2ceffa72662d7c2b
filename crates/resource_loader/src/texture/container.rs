//! In-memory texture container

use std::ops::Range;
use std::path::Path;

use super::format::PixelFormat;

/// Kind of texture object a container describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// Single row of texels
    Texture1D,
    /// Array of 1D rows
    Texture1DArray,
    /// Plain 2D image
    Texture2D,
    /// Array of 2D images
    Texture2DArray,
    /// Volume texture
    Texture3D,
    /// Six square faces
    Cube,
    /// Array of cubemaps
    CubeArray,
}

impl TextureTarget {
    /// Whether the target is one of the cubemap kinds
    pub const fn is_cube(self) -> bool {
        matches!(self, Self::Cube | Self::CubeArray)
    }
}

/// Source channel for one component of a sampled texel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Swizzle {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

/// Swizzle mapping that leaves every channel in place
pub const IDENTITY_SWIZZLES: [Swizzle; 4] = [Swizzle::Red, Swizzle::Green, Swizzle::Blue, Swizzle::Alpha];

/// Width, height and depth of a level in texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub struct Extent3d {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent3d {
    /// Create an extent, clamping each dimension to at least one texel
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            depth: depth.max(1),
        }
    }

    /// Extent of mip `level` below this one
    #[must_use]
    pub fn mip(self, level: usize) -> Self {
        let shift = |v: u32| u32::try_from(level).ok().and_then(|l| v.checked_shr(l)).unwrap_or(0);
        Self::new(shift(self.width), shift(self.height), shift(self.depth))
    }
}

/// Texture decoding errors
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// Failed to read the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The DDS parser rejected the data
    #[error("DDS decode error: {0}")]
    Dds(String),

    /// The KTX2 parser rejected the data
    #[error("KTX2 decode error: {0}")]
    Ktx2(String),

    /// Data does not start with a known container signature
    #[error("Not a DDS or KTX2 container")]
    UnknownContainer,

    /// Container format recognised, pixel format or layout is not
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// KTX2 supercompression (Basis, zstd, zlib) is not handled
    #[error("Supercompressed KTX2 data is not supported")]
    Supercompressed,

    /// Fewer bytes than the described levels need
    #[error("Texture data truncated: expected {expected} bytes, found {actual}")]
    Truncated {
        /// Bytes required by the header
        expected: usize,
        /// Bytes available
        actual: usize,
    },
}

const DDS_MAGIC: &[u8] = b"DDS ";
const KTX2_IDENTIFIER: [u8; 12] = [0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A];
/// More levels than a `u32` extent can halve through
const MAX_LEVELS: usize = 32;

const KTX1_IDENTIFIER: [u8; 12] = [0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A];

/// Decoded multi-level, multi-layer, multi-face image
///
/// Images are stored layer-major, then face, then level. Each
/// (layer, face, level) image is a contiguous span of `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureContainer {
    target: TextureTarget,
    format: PixelFormat,
    swizzles: [Swizzle; 4],
    extent: Extent3d,
    layers: usize,
    faces: usize,
    levels: usize,
    data: Vec<u8>,
    spans: Vec<Range<usize>>,
}

impl TextureContainer {
    /// Create a zero-filled container
    ///
    /// Fails if the described images do not fit in memory addressing.
    pub fn new(
        target: TextureTarget,
        format: PixelFormat,
        swizzles: [Swizzle; 4],
        extent: Extent3d,
        layers: usize,
        faces: usize,
        levels: usize,
    ) -> Result<Self, DecodeError> {
        let level_sizes = Self::level_sizes(format, extent, levels)?;
        let total = Self::total_size(&level_sizes, layers, faces)?;
        Ok(Self {
            target,
            format,
            swizzles,
            extent,
            layers,
            faces,
            levels,
            data: vec![0; total],
            spans: Self::spans(&level_sizes, layers, faces),
        })
    }

    /// Wrap tightly packed data laid out layer, face, level
    ///
    /// Trailing bytes past the last image are ignored.
    pub fn from_data(
        target: TextureTarget,
        format: PixelFormat,
        swizzles: [Swizzle; 4],
        extent: Extent3d,
        layers: usize,
        faces: usize,
        levels: usize,
        mut data: Vec<u8>,
    ) -> Result<Self, DecodeError> {
        let level_sizes = Self::level_sizes(format, extent, levels)?;
        let total = Self::total_size(&level_sizes, layers, faces)?;
        if data.len() < total {
            return Err(DecodeError::Truncated {
                expected: total,
                actual: data.len(),
            });
        }
        data.truncate(total);

        Ok(Self {
            target,
            format,
            swizzles,
            extent,
            layers,
            faces,
            levels,
            data,
            spans: Self::spans(&level_sizes, layers, faces),
        })
    }

    /// Decode a DDS or KTX2 file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes)
    }

    /// Decode a DDS or KTX2 container, detected by its signature
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.starts_with(DDS_MAGIC) {
            super::dds::decode(bytes)
        } else if bytes.starts_with(&KTX2_IDENTIFIER) {
            super::ktx::decode(bytes)
        } else if bytes.starts_with(&KTX1_IDENTIFIER) {
            Err(DecodeError::UnsupportedFormat("KTX 1.1 containers".to_string()))
        } else {
            Err(DecodeError::UnknownContainer)
        }
    }

    /// Byte size of one image at each mip level
    pub(super) fn level_sizes(format: PixelFormat, extent: Extent3d, levels: usize) -> Result<Vec<usize>, DecodeError> {
        if levels > MAX_LEVELS {
            return Err(DecodeError::UnsupportedFormat(format!("mip chain of {levels} levels")));
        }
        (0..levels)
            .map(|level| {
                let level_extent = extent.mip(level);
                format.level_size(level_extent).ok_or_else(|| {
                    DecodeError::UnsupportedFormat(format!(
                        "{}x{}x{} level is too large",
                        level_extent.width, level_extent.height, level_extent.depth
                    ))
                })
            })
            .collect()
    }

    fn total_size(level_sizes: &[usize], layers: usize, faces: usize) -> Result<usize, DecodeError> {
        level_sizes
            .iter()
            .try_fold(0usize, |sum, size| sum.checked_add(*size))
            .and_then(|chain| chain.checked_mul(layers))
            .and_then(|layer| layer.checked_mul(faces))
            .ok_or_else(|| DecodeError::UnsupportedFormat(format!("{layers} layers of {faces} faces are too large")))
    }

    // Only called once `total_size` succeeded, so offsets cannot overflow
    fn spans(level_sizes: &[usize], layers: usize, faces: usize) -> Vec<Range<usize>> {
        let mut spans = Vec::with_capacity(layers * faces * level_sizes.len());
        let mut offset = 0;
        for _image in 0..layers * faces {
            for size in level_sizes {
                spans.push(offset..offset + size);
                offset += size;
            }
        }
        spans
    }

    fn index(&self, layer: usize, face: usize, level: usize) -> usize {
        assert!(
            layer < self.layers && face < self.faces && level < self.levels,
            "image ({layer}, {face}, {level}) out of range"
        );
        (layer * self.faces + face) * self.levels + level
    }

    /// Target kind
    pub const fn target(&self) -> TextureTarget {
        self.target
    }

    /// Pixel format
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Channel swizzle applied when sampling
    pub const fn swizzles(&self) -> [Swizzle; 4] {
        self.swizzles
    }

    /// Number of array layers
    pub const fn layers(&self) -> usize {
        self.layers
    }

    /// Number of faces (1, or 6 for cubemaps)
    pub const fn faces(&self) -> usize {
        self.faces
    }

    /// Number of mip levels
    pub const fn levels(&self) -> usize {
        self.levels
    }

    /// Extent of the base level
    pub const fn extent(&self) -> Extent3d {
        self.extent
    }

    /// Extent of mip `level`
    pub fn level_extent(&self, level: usize) -> Extent3d {
        self.extent.mip(level)
    }

    /// Size in bytes of one image at mip `level`
    ///
    /// # Panics
    ///
    /// Panics if `level` is out of range or the container has no images.
    pub fn size(&self, level: usize) -> usize {
        self.spans[self.index(0, 0, level)].len()
    }

    /// Bytes of one image
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn data(&self, layer: usize, face: usize, level: usize) -> &[u8] {
        &self.data[self.spans[self.index(layer, face, level)].clone()]
    }

    /// Mutable bytes of one image
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn data_mut(&mut self, layer: usize, face: usize, level: usize) -> &mut [u8] {
        let span = self.spans[self.index(layer, face, level)].clone();
        &mut self.data[span]
    }

    /// Whether the container holds no images
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty() || self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_extent_clamps_to_one() {
        let extent = Extent3d::new(16, 4, 1);
        assert_eq!(extent.mip(1), Extent3d::new(8, 2, 1));
        assert_eq!(extent.mip(3), Extent3d::new(2, 1, 1));
        assert_eq!(extent.mip(40), Extent3d::new(1, 1, 1));
    }

    #[test]
    fn test_spans_are_layer_face_level_ordered() {
        let container = TextureContainer::new(
            TextureTarget::Cube,
            PixelFormat::Rgba8Unorm,
            IDENTITY_SWIZZLES,
            Extent3d::new(4, 4, 1),
            1,
            6,
            3,
        )
        .unwrap();

        // 4x4, 2x2, 1x1 RGBA8 per face
        assert_eq!(container.size(0), 64);
        assert_eq!(container.size(1), 16);
        assert_eq!(container.size(2), 4);
        assert_eq!(container.data.len(), 6 * (64 + 16 + 4));
        assert_eq!(container.spans[container.index(0, 1, 0)].start, 84);
    }

    #[test]
    fn test_from_data_rejects_short_buffer() {
        let result = TextureContainer::from_data(
            TextureTarget::Texture2D,
            PixelFormat::Bc1RgbaUnorm,
            IDENTITY_SWIZZLES,
            Extent3d::new(8, 8, 1),
            1,
            1,
            1,
            vec![0; 16],
        );

        assert!(matches!(result, Err(DecodeError::Truncated { expected: 32, actual: 16 })));
    }

    #[test]
    fn test_oversized_header_values_are_rejected() {
        let huge = TextureContainer::from_data(
            TextureTarget::Texture2D,
            PixelFormat::Bgra8Unorm,
            IDENTITY_SWIZZLES,
            Extent3d::new(u32::MAX, u32::MAX, 1),
            1,
            1,
            1,
            vec![0; 64],
        );
        assert!(matches!(huge, Err(DecodeError::UnsupportedFormat(_))));

        let deep_chain = TextureContainer::new(
            TextureTarget::Texture2D,
            PixelFormat::Rgba8Unorm,
            IDENTITY_SWIZZLES,
            Extent3d::new(4, 4, 1),
            1,
            1,
            usize::MAX,
        );
        assert!(matches!(deep_chain, Err(DecodeError::UnsupportedFormat(_))));

        let many_layers = TextureContainer::from_data(
            TextureTarget::Texture2DArray,
            PixelFormat::Rgba8Unorm,
            IDENTITY_SWIZZLES,
            Extent3d::new(1, 1, 1),
            u32::MAX as usize,
            1,
            1,
            vec![0; 64],
        );
        assert!(matches!(many_layers, Err(DecodeError::Truncated { actual: 64, .. })));

        let overflowing_layers = TextureContainer::new(
            TextureTarget::Texture2DArray,
            PixelFormat::Rgba8Unorm,
            IDENTITY_SWIZZLES,
            Extent3d::new(1, 1, 1),
            usize::MAX,
            6,
            1,
        );
        assert!(matches!(overflowing_layers, Err(DecodeError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_unknown_signature() {
        assert!(matches!(
            TextureContainer::decode(b"\x89PNG\r\n\x1a\n"),
            Err(DecodeError::UnknownContainer)
        ));
    }

    #[test]
    fn test_ktx1_is_reported_unsupported() {
        let mut bytes = KTX1_IDENTIFIER.to_vec();
        bytes.extend_from_slice(&[0; 52]);
        assert!(matches!(
            TextureContainer::decode(&bytes),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }
}
