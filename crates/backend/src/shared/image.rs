//! Image header inspection for uploads
//!
//! Only the container headers are read: enough to tell the format and the
//! pixel size, and to refuse files whose bytes are not the image they claim.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::WebP,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
        }
    }

    /// Case-insensitive lookup of a declared content type
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let content_type = content_type.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.mime().eq_ignore_ascii_case(content_type))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("cannot identify image file")]
    Unrecognized,
    #[error("truncated {0} file")]
    Truncated(&'static str),
    #[error("corrupt {0} header")]
    Corrupt(&'static str),
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const PNG_IEND: &[u8] = b"\0\0\0\0IEND";

/// Identify the image in `bytes` and read its dimensions
pub fn read_header(bytes: &[u8]) -> Result<ImageHeader, ImageError> {
    if bytes.starts_with(PNG_SIGNATURE) {
        read_png(bytes)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        read_jpeg(bytes)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        read_gif(bytes)
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        read_webp(bytes)
    } else {
        Err(ImageError::Unrecognized)
    }
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn le_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn sized(format: ImageFormat, width: u32, height: u32, name: &'static str) -> Result<ImageHeader, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::Corrupt(name));
    }
    Ok(ImageHeader { format, width, height })
}

/// Signature, IHDR as the first chunk, IEND as the last
fn read_png(bytes: &[u8]) -> Result<ImageHeader, ImageError> {
    const NAME: &str = "PNG";
    let length = be_u32(bytes, 8).ok_or(ImageError::Truncated(NAME))?;
    if bytes.get(12..16) != Some(b"IHDR".as_slice()) || length != 13 {
        return Err(ImageError::Corrupt(NAME));
    }
    let width = be_u32(bytes, 16).ok_or(ImageError::Truncated(NAME))?;
    let height = be_u32(bytes, 20).ok_or(ImageError::Truncated(NAME))?;
    // signature + IHDR chunk + IEND chunk
    if bytes.len() < 8 + 25 + 12 || &bytes[bytes.len() - 12..bytes.len() - 4] != PNG_IEND {
        return Err(ImageError::Truncated(NAME));
    }
    sized(ImageFormat::Png, width, height, NAME)
}

/// Walk the marker segments up to the first start-of-frame
fn read_jpeg(bytes: &[u8]) -> Result<ImageHeader, ImageError> {
    const NAME: &str = "JPEG";
    let mut at = 2;
    loop {
        if bytes.get(at) != Some(&0xFF) {
            return Err(if at >= bytes.len() {
                ImageError::Truncated(NAME)
            } else {
                ImageError::Corrupt(NAME)
            });
        }
        while bytes.get(at) == Some(&0xFF) {
            at += 1;
        }
        let marker = *bytes.get(at).ok_or(ImageError::Truncated(NAME))?;
        at += 1;
        match marker {
            // Markers without a length field
            0x01 | 0xD0..=0xD7 => continue,
            // Image data or end of image before any frame header
            0xD9 | 0xDA => return Err(ImageError::Corrupt(NAME)),
            _ => {}
        }
        let length = be_u16(bytes, at).ok_or(ImageError::Truncated(NAME))? as usize;
        if length < 2 {
            return Err(ImageError::Corrupt(NAME));
        }
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let height = be_u16(bytes, at + 3).ok_or(ImageError::Truncated(NAME))?;
            let width = be_u16(bytes, at + 5).ok_or(ImageError::Truncated(NAME))?;
            return sized(ImageFormat::Jpeg, width.into(), height.into(), NAME);
        }
        at += length;
    }
}

/// Logical screen descriptor follows the 6-byte signature
fn read_gif(bytes: &[u8]) -> Result<ImageHeader, ImageError> {
    const NAME: &str = "GIF";
    if bytes.len() < 13 {
        return Err(ImageError::Truncated(NAME));
    }
    let width = le_u16(bytes, 6).ok_or(ImageError::Truncated(NAME))?;
    let height = le_u16(bytes, 8).ok_or(ImageError::Truncated(NAME))?;
    sized(ImageFormat::Gif, width.into(), height.into(), NAME)
}

/// RIFF container holding a VP8, VP8L or VP8X first chunk
fn read_webp(bytes: &[u8]) -> Result<ImageHeader, ImageError> {
    const NAME: &str = "WebP";
    let riff_size = le_u32(bytes, 4).ok_or(ImageError::Truncated(NAME))? as usize;
    if riff_size.saturating_add(8) > bytes.len() {
        return Err(ImageError::Truncated(NAME));
    }
    let chunk = bytes.get(12..16).ok_or(ImageError::Truncated(NAME))?;
    let (width, height) = match chunk {
        b"VP8 " => {
            if bytes.get(23..26) != Some([0x9D, 0x01, 0x2A].as_slice()) {
                return Err(ImageError::Corrupt(NAME));
            }
            let width = le_u16(bytes, 26).ok_or(ImageError::Truncated(NAME))? & 0x3FFF;
            let height = le_u16(bytes, 28).ok_or(ImageError::Truncated(NAME))? & 0x3FFF;
            (u32::from(width), u32::from(height))
        }
        b"VP8L" => {
            if bytes.get(20) != Some(&0x2F) {
                return Err(ImageError::Corrupt(NAME));
            }
            let bits = le_u32(bytes, 21).ok_or(ImageError::Truncated(NAME))?;
            ((bits & 0x3FFF) + 1, ((bits >> 14) & 0x3FFF) + 1)
        }
        b"VP8X" => {
            let canvas = bytes.get(24..30).ok_or(ImageError::Truncated(NAME))?;
            let width = u32::from_le_bytes([canvas[0], canvas[1], canvas[2], 0]) + 1;
            let height = u32::from_le_bytes([canvas[3], canvas[4], canvas[5], 0]) + 1;
            (width, height)
        }
        _ => return Err(ImageError::Corrupt(NAME)),
    };
    sized(ImageFormat::WebP, width, height, NAME)
}

#[cfg(test)]
pub(crate) mod samples {
    /// 1x1 grayscale PNG
    pub const PNG: &[u8] = b"\x89\x50\x4e\x47\x0d\x0a\x1a\x0a\x00\x00\x00\x0d\x49\x48\x44\x52\
\x00\x00\x00\x01\x00\x00\x00\x01\x08\x04\x00\x00\x00\xb5\x1c\x0c\x02\x00\x00\x00\x0b\x49\x44\
\x41\x54\x78\xda\x63\x64\x60\x00\x00\x00\x06\x00\x02\x30\x81\xd0\x2f\x00\x00\x00\x00\x49\x45\
\x4e\x44\xae\x42\x60\x82";

    /// SOI, JFIF APP0, baseline SOF0 for 3x2 pixels, EOI
    pub const JPEG: &[u8] = b"\xff\xd8\
\xff\xe0\x00\x10JFIF\x00\x01\x01\x00\x00\x01\x00\x01\x00\x00\
\xff\xc0\x00\x0b\x08\x00\x02\x00\x03\x01\x01\x11\x00\
\xff\xd9";

    /// 1x1 GIF89a header with trailer
    pub const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00\x3b";

    /// Lossless 1x1 WebP
    pub const WEBP: &[u8] = b"RIFF\x12\x00\x00\x00WEBPVP8L\x05\x00\x00\x00\x2f\x00\x00\x00\x00\x00";
}

#[cfg(test)]
mod tests {
    use super::samples::*;
    use super::*;

    #[test]
    fn test_reads_each_supported_format() {
        let png = read_header(PNG).unwrap();
        assert_eq!((png.format, png.width, png.height), (ImageFormat::Png, 1, 1));

        let jpeg = read_header(JPEG).unwrap();
        assert_eq!((jpeg.format, jpeg.width, jpeg.height), (ImageFormat::Jpeg, 3, 2));

        let gif = read_header(GIF).unwrap();
        assert_eq!((gif.format, gif.width, gif.height), (ImageFormat::Gif, 1, 1));

        let webp = read_header(WEBP).unwrap();
        assert_eq!((webp.format, webp.width, webp.height), (ImageFormat::WebP, 1, 1));
    }

    #[test]
    fn test_rejects_non_images() {
        assert_eq!(
            read_header(b"<html><script>alert(1)</script></html>"),
            Err(ImageError::Unrecognized)
        );
        assert_eq!(read_header(b""), Err(ImageError::Unrecognized));
        assert_eq!(read_header(b"%PDF-1.4"), Err(ImageError::Unrecognized));
    }

    #[test]
    fn test_rejects_signature_without_image() {
        assert_eq!(
            read_header(b"\x89PNG\r\n\x1a\nnot-really-pixels"),
            Err(ImageError::Corrupt("PNG"))
        );
        // Cut before IEND
        assert_eq!(read_header(&PNG[..40]), Err(ImageError::Truncated("PNG")));
        assert_eq!(read_header(&JPEG[..12]), Err(ImageError::Truncated("JPEG")));
        assert!(read_header(b"\xff\xd8\xff\xdanot-a-frame").is_err());
        assert_eq!(read_header(b"GIF89a\x01\x00"), Err(ImageError::Truncated("GIF")));
        assert_eq!(
            read_header(b"GIF89a\x00\x00\x01\x00\x00\x00\x00"),
            Err(ImageError::Corrupt("GIF"))
        );
        assert_eq!(read_header(&WEBP[..20]), Err(ImageError::Truncated("WebP")));
    }

    #[test]
    fn test_mime_lookup() {
        assert_eq!(ImageFormat::from_mime("IMAGE/WEBP"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_mime(" image/jpeg "), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("image/svg+xml"), None);
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    }
}
