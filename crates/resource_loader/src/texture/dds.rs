//! DDS decoding through `ddsfile`

use std::io::Cursor;

use ddsfile::{Caps2, D3D10ResourceDimension, D3DFormat, Dds, DxgiFormat, MiscFlag};

use super::container::{DecodeError, Extent3d, Swizzle, TextureContainer, TextureTarget, IDENTITY_SWIZZLES};
use super::format::PixelFormat;

const OPAQUE: [Swizzle; 4] = [Swizzle::Red, Swizzle::Green, Swizzle::Blue, Swizzle::One];
const LUMINANCE: [Swizzle; 4] = [Swizzle::Red, Swizzle::Red, Swizzle::Red, Swizzle::One];
const LUMINANCE_ALPHA: [Swizzle; 4] = [Swizzle::Red, Swizzle::Red, Swizzle::Red, Swizzle::Green];
const ALPHA_ONLY: [Swizzle; 4] = [Swizzle::Zero, Swizzle::Zero, Swizzle::Zero, Swizzle::Red];

pub(super) fn decode(bytes: &[u8]) -> Result<TextureContainer, DecodeError> {
    let dds = Dds::read(&mut Cursor::new(bytes)).map_err(|e| DecodeError::Dds(format!("{e:?}")))?;

    let (format, swizzles) = pixel_format(&dds)?;
    let header = &dds.header;
    let levels = header.mip_map_count.unwrap_or(1).max(1) as usize;

    let (target, layers, faces, depth) = match &dds.header10 {
        Some(h10) => {
            let layers = h10.array_size.max(1) as usize;
            let cube = h10.misc_flag.contains(MiscFlag::TEXTURECUBE);
            match h10.resource_dimension {
                D3D10ResourceDimension::Texture1D if layers > 1 => (TextureTarget::Texture1DArray, layers, 1, 1),
                D3D10ResourceDimension::Texture1D => (TextureTarget::Texture1D, 1, 1, 1),
                D3D10ResourceDimension::Texture2D if cube && layers > 1 => (TextureTarget::CubeArray, layers, 6, 1),
                D3D10ResourceDimension::Texture2D if cube => (TextureTarget::Cube, 1, 6, 1),
                D3D10ResourceDimension::Texture2D if layers > 1 => (TextureTarget::Texture2DArray, layers, 1, 1),
                D3D10ResourceDimension::Texture2D => (TextureTarget::Texture2D, 1, 1, 1),
                D3D10ResourceDimension::Texture3D => {
                    (TextureTarget::Texture3D, 1, 1, header.depth.unwrap_or(1))
                }
                other => {
                    return Err(DecodeError::UnsupportedFormat(format!("DDS resource dimension {other:?}")));
                }
            }
        }
        None if header.caps2.contains(Caps2::CUBEMAP) => (TextureTarget::Cube, 1, 6, 1),
        None if header.caps2.contains(Caps2::VOLUME) => {
            (TextureTarget::Texture3D, 1, 1, header.depth.unwrap_or(1))
        }
        None => (TextureTarget::Texture2D, 1, 1, 1),
    };

    let extent = Extent3d::new(header.width, header.height, depth);
    let data = dds.data;
    TextureContainer::from_data(target, format, swizzles, extent, layers, faces, levels, data)
}

fn pixel_format(dds: &Dds) -> Result<(PixelFormat, [Swizzle; 4]), DecodeError> {
    if let Some(dxgi) = dds.get_dxgi_format() {
        return dxgi_format(&dxgi)
            .ok_or_else(|| DecodeError::UnsupportedFormat(format!("DXGI format {dxgi:?}")));
    }

    let d3d = dds
        .get_d3d_format()
        .ok_or_else(|| DecodeError::UnsupportedFormat("unrecognised DDS pixel format".to_string()))?;

    let format = match d3d {
        D3DFormat::DXT1 => (PixelFormat::Bc1RgbaUnorm, IDENTITY_SWIZZLES),
        D3DFormat::DXT2 | D3DFormat::DXT3 => (PixelFormat::Bc2Unorm, IDENTITY_SWIZZLES),
        D3DFormat::DXT4 | D3DFormat::DXT5 => (PixelFormat::Bc3Unorm, IDENTITY_SWIZZLES),
        D3DFormat::A8R8G8B8 => (PixelFormat::Bgra8Unorm, IDENTITY_SWIZZLES),
        D3DFormat::X8R8G8B8 => (PixelFormat::Bgra8Unorm, OPAQUE),
        D3DFormat::A8B8G8R8 => (PixelFormat::Rgba8Unorm, IDENTITY_SWIZZLES),
        D3DFormat::X8B8G8R8 => (PixelFormat::Rgba8Unorm, OPAQUE),
        D3DFormat::R8G8B8 => (PixelFormat::Bgr8Unorm, IDENTITY_SWIZZLES),
        D3DFormat::L8 => (PixelFormat::R8Unorm, LUMINANCE),
        D3DFormat::A8L8 => (PixelFormat::Rg8Unorm, LUMINANCE_ALPHA),
        D3DFormat::A8 => (PixelFormat::R8Unorm, ALPHA_ONLY),
        D3DFormat::A16B16G16R16F => (PixelFormat::Rgba16Float, IDENTITY_SWIZZLES),
        D3DFormat::A32B32G32R32F => (PixelFormat::Rgba32Float, IDENTITY_SWIZZLES),
        other => return Err(DecodeError::UnsupportedFormat(format!("D3D format {other:?}"))),
    };

    Ok(format)
}

fn dxgi_format(format: &DxgiFormat) -> Option<(PixelFormat, [Swizzle; 4])> {
    let format = match format {
        DxgiFormat::BC1_UNorm => PixelFormat::Bc1RgbaUnorm,
        DxgiFormat::BC1_UNorm_sRGB => PixelFormat::Bc1RgbaSrgb,
        DxgiFormat::BC2_UNorm => PixelFormat::Bc2Unorm,
        DxgiFormat::BC2_UNorm_sRGB => PixelFormat::Bc2Srgb,
        DxgiFormat::BC3_UNorm => PixelFormat::Bc3Unorm,
        DxgiFormat::BC3_UNorm_sRGB => PixelFormat::Bc3Srgb,
        DxgiFormat::BC4_UNorm => PixelFormat::Bc4Unorm,
        DxgiFormat::BC4_SNorm => PixelFormat::Bc4Snorm,
        DxgiFormat::BC5_UNorm => PixelFormat::Bc5Unorm,
        DxgiFormat::BC5_SNorm => PixelFormat::Bc5Snorm,
        DxgiFormat::BC6H_UF16 => PixelFormat::Bc6hUfloat,
        DxgiFormat::BC6H_SF16 => PixelFormat::Bc6hSfloat,
        DxgiFormat::BC7_UNorm => PixelFormat::Bc7Unorm,
        DxgiFormat::BC7_UNorm_sRGB => PixelFormat::Bc7Srgb,
        DxgiFormat::R8G8B8A8_UNorm => PixelFormat::Rgba8Unorm,
        DxgiFormat::R8G8B8A8_UNorm_sRGB => PixelFormat::Rgba8Srgb,
        DxgiFormat::B8G8R8A8_UNorm => PixelFormat::Bgra8Unorm,
        DxgiFormat::B8G8R8A8_UNorm_sRGB => PixelFormat::Bgra8Srgb,
        DxgiFormat::B8G8R8X8_UNorm => return Some((PixelFormat::Bgra8Unorm, OPAQUE)),
        DxgiFormat::R8_UNorm => PixelFormat::R8Unorm,
        DxgiFormat::R8G8_UNorm => PixelFormat::Rg8Unorm,
        DxgiFormat::A8_UNorm => return Some((PixelFormat::R8Unorm, ALPHA_ONLY)),
        DxgiFormat::R16G16B16A16_Float => PixelFormat::Rgba16Float,
        DxgiFormat::R32G32B32A32_Float => PixelFormat::Rgba32Float,
        _ => return None,
    };

    Some((format, IDENTITY_SWIZZLES))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DDSD_CAPS: u32 = 0x1;
    const DDSD_HEIGHT: u32 = 0x2;
    const DDSD_WIDTH: u32 = 0x4;
    const DDSD_PIXELFORMAT: u32 = 0x1000;
    const DDSD_MIPMAPCOUNT: u32 = 0x2_0000;
    const DDPF_ALPHAPIXELS: u32 = 0x1;
    const DDPF_FOURCC: u32 = 0x4;
    const DDPF_RGB: u32 = 0x40;
    const DDSCAPS_COMPLEX: u32 = 0x8;
    const DDSCAPS_TEXTURE: u32 = 0x1000;
    const DDSCAPS_MIPMAP: u32 = 0x40_0000;
    const DDSCAPS2_CUBEMAP_ALL_FACES: u32 = 0x200 | 0xFC00;

    /// Pixel format section of a legacy DDS header
    enum LegacyFormat {
        FourCC(&'static [u8; 4]),
        A8R8G8B8,
    }

    /// Build a legacy (non-DX10) DDS file
    fn dds_bytes(width: u32, height: u32, mips: u32, format: LegacyFormat, cube: bool, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + payload.len());
        let mut put = |v: u32| out.extend_from_slice(&v.to_le_bytes());

        put(u32::from_le_bytes(*b"DDS "));
        put(124);
        put(DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_MIPMAPCOUNT);
        put(height);
        put(width);
        put(0); // pitch or linear size
        put(0); // depth
        put(mips);
        for _ in 0..11 {
            put(0);
        }

        // DDS_PIXELFORMAT
        put(32);
        match format {
            LegacyFormat::FourCC(code) => {
                put(DDPF_FOURCC);
                put(u32::from_le_bytes(*code));
                for _ in 0..5 {
                    put(0);
                }
            }
            LegacyFormat::A8R8G8B8 => {
                put(DDPF_RGB | DDPF_ALPHAPIXELS);
                put(0);
                put(32);
                put(0x00FF_0000);
                put(0x0000_FF00);
                put(0x0000_00FF);
                put(0xFF00_0000);
            }
        }

        let mut caps = DDSCAPS_TEXTURE;
        if mips > 1 {
            caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
        }
        if cube {
            caps |= DDSCAPS_COMPLEX;
        }
        put(caps);
        put(if cube { DDSCAPS2_CUBEMAP_ALL_FACES } else { 0 });
        put(0);
        put(0);
        put(0);

        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn test_dxt1_mip_chain() {
        // 8x8, 4x4, 2x2, 1x1 => 32 + 8 + 8 + 8 bytes
        let payload: Vec<u8> = (0..56).collect();
        let bytes = dds_bytes(8, 8, 4, LegacyFormat::FourCC(b"DXT1"), false, &payload);

        let texture = TextureContainer::decode(&bytes).unwrap();
        assert_eq!(texture.target(), TextureTarget::Texture2D);
        assert_eq!(texture.format(), PixelFormat::Bc1RgbaUnorm);
        assert_eq!(texture.levels(), 4);
        assert_eq!(texture.data(0, 0, 0).len(), 32);
        assert_eq!(texture.data(0, 0, 1), &payload[32..40]);
        assert_eq!(texture.data(0, 0, 3), &payload[48..56]);
    }

    #[test]
    fn test_cubemap_faces() {
        let payload = vec![0x7F; 6 * 4 * 4 * 4];
        let bytes = dds_bytes(4, 4, 1, LegacyFormat::A8R8G8B8, true, &payload);

        let texture = TextureContainer::decode(&bytes).unwrap();
        assert_eq!(texture.target(), TextureTarget::Cube);
        assert_eq!(texture.faces(), 6);
        assert_eq!(texture.layers(), 1);
        assert_eq!(texture.format(), PixelFormat::Bgra8Unorm);
    }

    #[test]
    fn test_oversized_dimensions_are_an_error() {
        let bytes = dds_bytes(u32::MAX, u32::MAX, 1, LegacyFormat::A8R8G8B8, false, &[0; 64]);
        assert!(matches!(
            TextureContainer::decode(&bytes),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = dds_bytes(8, 8, 1, LegacyFormat::FourCC(b"DXT5"), false, &[0; 16]);
        assert!(matches!(
            TextureContainer::decode(&bytes),
            Err(DecodeError::Truncated { expected: 64, actual: 16 })
        ));
    }
}
