//! KTX2 decoding through `ktx2`

use ktx2::{Format, Reader};

use super::container::{DecodeError, Extent3d, TextureContainer, TextureTarget, IDENTITY_SWIZZLES};
use super::format::PixelFormat;

pub(super) fn decode(bytes: &[u8]) -> Result<TextureContainer, DecodeError> {
    let reader = Reader::new(bytes).map_err(|e| DecodeError::Ktx2(format!("{e:?}")))?;
    let header = reader.header();

    if header.supercompression_scheme.is_some() {
        return Err(DecodeError::Supercompressed);
    }

    let format = header
        .format
        .ok_or_else(|| DecodeError::UnsupportedFormat("KTX2 without a vkFormat".to_string()))
        .and_then(pixel_format)?;

    let arrayed = header.layer_count > 0;
    let layers = header.layer_count.max(1) as usize;
    let faces = header.face_count.max(1) as usize;
    let levels = header.level_count.max(1) as usize;

    let target = if faces == 6 {
        if arrayed { TextureTarget::CubeArray } else { TextureTarget::Cube }
    } else if header.pixel_depth > 0 {
        if arrayed {
            return Err(DecodeError::UnsupportedFormat("arrays of 3D textures".to_string()));
        }
        TextureTarget::Texture3D
    } else if header.pixel_height > 0 {
        if arrayed { TextureTarget::Texture2DArray } else { TextureTarget::Texture2D }
    } else if arrayed {
        TextureTarget::Texture1DArray
    } else {
        TextureTarget::Texture1D
    };

    let extent = Extent3d::new(header.pixel_width, header.pixel_height, header.pixel_depth);
    let level_sizes = TextureContainer::level_sizes(format, extent, levels)?;
    let level_data: Vec<&[u8]> = reader.levels().take(levels).collect();
    if level_data.len() < levels {
        return Err(DecodeError::Ktx2(format!("level index lists {} of {levels} levels", level_data.len())));
    }

    // Each level holds every layer and face back to back. Check every level
    // against the file before allocating anything sized from the header.
    for (size, data) in level_sizes.iter().zip(&level_data) {
        let expected = size
            .checked_mul(layers)
            .and_then(|n| n.checked_mul(faces))
            .ok_or_else(|| DecodeError::UnsupportedFormat(format!("{layers} layers of {faces} faces are too large")))?;
        if data.len() < expected {
            return Err(DecodeError::Truncated {
                expected,
                actual: data.len(),
            });
        }
    }

    let mut texture = TextureContainer::new(target, format, IDENTITY_SWIZZLES, extent, layers, faces, levels)?;
    for (level, (size, data)) in level_sizes.iter().zip(&level_data).enumerate() {
        for layer in 0..layers {
            for face in 0..faces {
                let start = (layer * faces + face) * size;
                texture
                    .data_mut(layer, face, level)
                    .copy_from_slice(&data[start..start + size]);
            }
        }
    }

    Ok(texture)
}

fn pixel_format(format: Format) -> Result<PixelFormat, DecodeError> {
    let format = match format {
        Format::R8_UNORM => PixelFormat::R8Unorm,
        Format::R8G8_UNORM => PixelFormat::Rg8Unorm,
        Format::R8G8B8_UNORM => PixelFormat::Rgb8Unorm,
        Format::B8G8R8_UNORM => PixelFormat::Bgr8Unorm,
        Format::R8G8B8A8_UNORM => PixelFormat::Rgba8Unorm,
        Format::R8G8B8A8_SRGB => PixelFormat::Rgba8Srgb,
        Format::B8G8R8A8_UNORM => PixelFormat::Bgra8Unorm,
        Format::B8G8R8A8_SRGB => PixelFormat::Bgra8Srgb,
        Format::R16G16B16A16_SFLOAT => PixelFormat::Rgba16Float,
        Format::R32G32B32A32_SFLOAT => PixelFormat::Rgba32Float,
        Format::BC1_RGB_UNORM_BLOCK => PixelFormat::Bc1RgbUnorm,
        Format::BC1_RGBA_UNORM_BLOCK => PixelFormat::Bc1RgbaUnorm,
        Format::BC1_RGBA_SRGB_BLOCK => PixelFormat::Bc1RgbaSrgb,
        Format::BC2_UNORM_BLOCK => PixelFormat::Bc2Unorm,
        Format::BC2_SRGB_BLOCK => PixelFormat::Bc2Srgb,
        Format::BC3_UNORM_BLOCK => PixelFormat::Bc3Unorm,
        Format::BC3_SRGB_BLOCK => PixelFormat::Bc3Srgb,
        Format::BC4_UNORM_BLOCK => PixelFormat::Bc4Unorm,
        Format::BC4_SNORM_BLOCK => PixelFormat::Bc4Snorm,
        Format::BC5_UNORM_BLOCK => PixelFormat::Bc5Unorm,
        Format::BC5_SNORM_BLOCK => PixelFormat::Bc5Snorm,
        Format::BC6H_UFLOAT_BLOCK => PixelFormat::Bc6hUfloat,
        Format::BC6H_SFLOAT_BLOCK => PixelFormat::Bc6hSfloat,
        Format::BC7_UNORM_BLOCK => PixelFormat::Bc7Unorm,
        Format::BC7_SRGB_BLOCK => PixelFormat::Bc7Srgb,
        other => return Err(DecodeError::UnsupportedFormat(format!("vkFormat {other:?}"))),
    };
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTIFIER: [u8; 12] = [0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A];
    const VK_R8G8B8A8_UNORM: u32 = 37;
    const VK_BC1_RGBA_UNORM_BLOCK: u32 = 133;

    struct Header {
        vk_format: u32,
        width: u32,
        height: u32,
        depth: u32,
        layers: u32,
        faces: u32,
    }

    /// Build a KTX2 file with no DFD or key/value data
    fn ktx2_bytes(header: &Header, levels: &[Vec<u8>]) -> Vec<u8> {
        let mut out = IDENTIFIER.to_vec();
        for v in [
            header.vk_format,
            1,
            header.width,
            header.height,
            header.depth,
            header.layers,
            header.faces,
            u32::try_from(levels.len()).unwrap(),
            0,
        ] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        // dfd, kvd offsets and lengths, then sgd offset and length
        out.extend_from_slice(&[0; 16]);
        out.extend_from_slice(&[0; 16]);

        let mut offset = (out.len() + levels.len() * 24) as u64;
        for level in levels {
            let len = level.len() as u64;
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(&len.to_le_bytes());
            offset += len;
        }
        for level in levels {
            out.extend_from_slice(level);
        }
        out
    }

    #[test]
    fn test_rgba8_2d_with_mips() {
        let header = Header {
            vk_format: VK_R8G8B8A8_UNORM,
            width: 2,
            height: 2,
            depth: 0,
            layers: 0,
            faces: 1,
        };
        let bytes = ktx2_bytes(&header, &[vec![1; 16], vec![2; 4]]);

        let texture = TextureContainer::decode(&bytes).unwrap();
        assert_eq!(texture.target(), TextureTarget::Texture2D);
        assert_eq!(texture.format(), PixelFormat::Rgba8Unorm);
        assert_eq!(texture.levels(), 2);
        assert_eq!(texture.data(0, 0, 0), &[1; 16]);
        assert_eq!(texture.data(0, 0, 1), &[2; 4]);
    }

    #[test]
    fn test_array_layers_are_split() {
        let header = Header {
            vk_format: VK_BC1_RGBA_UNORM_BLOCK,
            width: 4,
            height: 4,
            depth: 0,
            layers: 3,
            faces: 1,
        };
        let level: Vec<u8> = (0..24).collect();
        let bytes = ktx2_bytes(&header, &[level]);

        let texture = TextureContainer::decode(&bytes).unwrap();
        assert_eq!(texture.target(), TextureTarget::Texture2DArray);
        assert_eq!(texture.layers(), 3);
        assert_eq!(texture.data(2, 0, 0), &(16..24).collect::<Vec<u8>>()[..]);
    }

    #[test]
    fn test_cube_and_1d_targets() {
        let cube = Header {
            vk_format: VK_R8G8B8A8_UNORM,
            width: 1,
            height: 1,
            depth: 0,
            layers: 0,
            faces: 6,
        };
        let texture = TextureContainer::decode(&ktx2_bytes(&cube, &[vec![0; 24]])).unwrap();
        assert_eq!(texture.target(), TextureTarget::Cube);
        assert_eq!(texture.faces(), 6);

        let row = Header {
            vk_format: VK_R8G8B8A8_UNORM,
            width: 8,
            height: 0,
            depth: 0,
            layers: 0,
            faces: 1,
        };
        let texture = TextureContainer::decode(&ktx2_bytes(&row, &[vec![0; 32]])).unwrap();
        assert_eq!(texture.target(), TextureTarget::Texture1D);
    }

    #[test]
    fn test_huge_header_is_checked_before_allocating() {
        let header = Header {
            vk_format: VK_R8G8B8A8_UNORM,
            width: 65_536,
            height: 65_536,
            depth: 0,
            layers: 4096,
            faces: 1,
        };
        let bytes = ktx2_bytes(&header, &[vec![0; 16]]);
        assert!(matches!(
            TextureContainer::decode(&bytes),
            Err(DecodeError::Truncated { actual: 16, .. })
        ));

        let overflowing = Header {
            width: u32::MAX,
            height: u32::MAX,
            layers: u32::MAX,
            ..header
        };
        let bytes = ktx2_bytes(&overflowing, &[vec![0; 16]]);
        assert!(matches!(
            TextureContainer::decode(&bytes),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_short_level_is_truncated() {
        let header = Header {
            vk_format: VK_R8G8B8A8_UNORM,
            width: 4,
            height: 4,
            depth: 0,
            layers: 0,
            faces: 1,
        };
        let bytes = ktx2_bytes(&header, &[vec![0; 10]]);
        assert!(matches!(
            TextureContainer::decode(&bytes),
            Err(DecodeError::Truncated { expected: 64, actual: 10 })
        ));
    }
}
