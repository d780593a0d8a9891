//! ICO container encoding.
//!
//! Layout, all little-endian:
//! - header: reserved `u16` (0), type `u16` (1 = icon), image count `u16`
//! - one 16-byte entry per image: width `u8`, height `u8` (256 is stored as
//!   0), palette size `u8`, reserved `u8`, colour planes `u16`, bits per
//!   pixel `u16`, data size `u32`, data offset `u32`
//! - image data, in entry order

use crate::error::{IconError, IconResult};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Resolutions written by default, largest first.
pub const DEFAULT_SIZES: [u32; 7] = [256, 128, 64, 48, 32, 24, 16];

const HEADER_LEN: usize = 6;
const ENTRY_LEN: usize = 16;
const ICON_TYPE: u16 = 1;
const BIT_DEPTH: u16 = 32;

/// One square resolution, PNG-encoded.
#[derive(Debug, Clone)]
pub struct IconImage {
    pub size: u32,
    pub png: Vec<u8>,
}

/// A directory entry as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconEntry {
    pub width: u8,
    pub height: u8,
    pub palette: u8,
    pub planes: u16,
    pub bit_depth: u16,
    pub size: u32,
    pub offset: u32,
}

impl IconEntry {
    /// Pixel width, decoding the 0 = 256 convention.
    pub fn pixel_width(&self) -> u32 {
        decode_dimension(self.width)
    }

    pub fn pixel_height(&self) -> u32 {
        decode_dimension(self.height)
    }
}

fn decode_dimension(stored: u8) -> u32 {
    if stored == 0 {
        256
    } else {
        stored as u32
    }
}

fn check_size(size: u32) -> IconResult<()> {
    if size == 0 || size > 256 {
        return Err(IconError::InvalidSize(size));
    }
    Ok(())
}

/// Resize `source` to each size and PNG-encode the results.
pub fn render_images(source: &DynamicImage, sizes: &[u32]) -> IconResult<Vec<IconImage>> {
    if sizes.is_empty() {
        return Err(IconError::NoSizes);
    }

    let rgba = DynamicImage::ImageRgba8(source.to_rgba8());
    sizes
        .iter()
        .map(|&size| {
            check_size(size)?;
            let resized = rgba.resize_exact(size, size, FilterType::Lanczos3);

            let mut png = Vec::new();
            resized.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
            debug!("Rendered {}x{} ({} bytes)", size, size, png.len());

            Ok(IconImage { size, png })
        })
        .collect()
}

/// Serialize images into an ICO container.
pub fn encode_ico(images: &[IconImage]) -> IconResult<Vec<u8>> {
    if images.is_empty() {
        return Err(IconError::NoSizes);
    }
    let count = u16::try_from(images.len()).map_err(|_| IconError::TooManyImages(images.len()))?;

    let data_len: usize = images.iter().map(|img| img.png.len()).sum();
    let mut out = Vec::with_capacity(HEADER_LEN + ENTRY_LEN * images.len() + data_len);

    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&ICON_TYPE.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());

    let mut offset = HEADER_LEN + ENTRY_LEN * images.len();
    for img in images {
        check_size(img.size)?;
        let dimension = if img.size == 256 { 0 } else { img.size as u8 };
        let size = u32::try_from(img.png.len())
            .map_err(|_| IconError::Malformed(format!("{}px image too large", img.size)))?;
        let entry_offset = u32::try_from(offset)
            .map_err(|_| IconError::Malformed("icon exceeds 4 GiB".to_string()))?;

        out.push(dimension);
        out.push(dimension);
        out.push(0); // palette
        out.push(0); // reserved
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&BIT_DEPTH.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&entry_offset.to_le_bytes());

        offset += img.png.len();
    }

    for img in images {
        out.extend_from_slice(&img.png);
    }

    Ok(out)
}

/// Read the directory entries of an ICO container.
pub fn parse_directory(bytes: &[u8]) -> IconResult<Vec<IconEntry>> {
    let u16_at = |pos: usize| u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
    let u32_at = |pos: usize| {
        u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
    };

    if bytes.len() < HEADER_LEN {
        return Err(IconError::Malformed("file shorter than header".to_string()));
    }
    if u16_at(0) != 0 || u16_at(2) != ICON_TYPE {
        return Err(IconError::Malformed("not an icon header".to_string()));
    }

    let count = u16_at(4) as usize;
    if bytes.len() < HEADER_LEN + ENTRY_LEN * count {
        return Err(IconError::Malformed(format!("directory of {} entries truncated", count)));
    }

    (0..count)
        .map(|i| {
            let base = HEADER_LEN + ENTRY_LEN * i;
            let entry = IconEntry {
                width: bytes[base],
                height: bytes[base + 1],
                palette: bytes[base + 2],
                planes: u16_at(base + 4),
                bit_depth: u16_at(base + 6),
                size: u32_at(base + 8),
                offset: u32_at(base + 12),
            };

            let end = entry.offset as usize + entry.size as usize;
            if end > bytes.len() {
                return Err(IconError::Malformed(format!(
                    "entry {} points past end of file",
                    i
                )));
            }
            Ok(entry)
        })
        .collect()
}

/// Read `source`, render every size and write the icon to `dest`.
pub fn pack_icon(source: &Path, dest: &Path, sizes: &[u32]) -> IconResult<usize> {
    let image = image::open(source)?;
    let images = render_images(&image, sizes)?;
    let bytes = encode_ico(&images)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, &bytes)?;

    info!(
        "Wrote {:?} with {} images ({} bytes)",
        dest,
        images.len(),
        bytes.len()
    );
    Ok(images.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn opaque(size: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(size, size, Rgba([200, 40, 90, 255])))
    }

    #[test]
    fn test_default_sizes_produce_seven_entries() {
        let images = render_images(&opaque(256), &DEFAULT_SIZES).unwrap();
        let bytes = encode_ico(&images).unwrap();
        let entries = parse_directory(&bytes).unwrap();

        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 7);
        assert_eq!(entries.len(), 7);

        let first = entries[0];
        assert_eq!((first.width, first.height), (0, 0));
        assert_eq!(first.pixel_width(), 256);
        assert_eq!(first.planes, 1);
        assert_eq!(first.bit_depth, 32);

        let widths: Vec<u32> = entries.iter().map(IconEntry::pixel_width).collect();
        assert_eq!(widths, DEFAULT_SIZES.to_vec());
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let images = render_images(&opaque(64), &[48, 32, 16]).unwrap();
        let bytes = encode_ico(&images).unwrap();
        let entries = parse_directory(&bytes).unwrap();

        let mut expected = (HEADER_LEN + ENTRY_LEN * 3) as u32;
        for (entry, img) in entries.iter().zip(&images) {
            assert_eq!(entry.offset, expected);
            assert_eq!(entry.size as usize, img.png.len());
            let start = entry.offset as usize;
            assert_eq!(&bytes[start..start + 8], b"\x89PNG\r\n\x1a\n");
            expected += entry.size;
        }
        assert_eq!(expected as usize, bytes.len());
    }

    #[test]
    fn test_embedded_png_decodes_at_size() {
        let images = render_images(&opaque(100), &[24]).unwrap();
        let decoded = image::load_from_memory(&images[0].png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (24, 24));
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(matches!(render_images(&opaque(16), &[]), Err(IconError::NoSizes)));
        assert!(matches!(
            render_images(&opaque(16), &[512]),
            Err(IconError::InvalidSize(512))
        ));
        assert!(matches!(encode_ico(&[]), Err(IconError::NoSizes)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_directory(b"\x00\x00").is_err());
        assert!(parse_directory(b"\x00\x00\x02\x00\x01\x00").is_err());
        assert!(parse_directory(b"\x00\x00\x01\x00\x05\x00").is_err());
    }

    #[test]
    fn test_pack_icon_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("logo.png");
        opaque(256).save(&src).unwrap();

        let dest = dir.path().join("out").join("app.ico");
        let count = pack_icon(&src, &dest, &DEFAULT_SIZES).unwrap();

        assert_eq!(count, 7);
        let entries = parse_directory(&std::fs::read(&dest).unwrap()).unwrap();
        assert_eq!(entries.len(), 7);
    }
}
