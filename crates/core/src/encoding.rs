//! Photo payload encoding.
//!
//! Turns raw uploaded bytes (or a client-supplied data URI) into a
//! [`PhotoPayload`] whose format has been sniffed from the content and whose
//! pixels decode completely. All size checks run before any decoding work,
//! and decoding itself runs under [`decode_limits`].
//!
//! Full decoding is CPU-bound; async callers should run it on a blocking
//! thread.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, ImageReader, Limits};
use sha2::{Digest, Sha256};

use crate::error::AssessmentError;

/// Default upper bound for a photo, in bytes (5 MiB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Largest accepted width or height, in pixels.
pub const MAX_PHOTO_DIMENSION: u32 = 12_000;

/// Upper bound on decoder allocations for a single photo.
pub const MAX_DECODE_ALLOC_BYTES: u64 = 256 * 1024 * 1024;

/// MIME types that carry no format information and are treated as undeclared.
const GENERIC_MIME_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream"];

/// Supported photo container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Jpeg,
    Png,
    Webp,
}

impl PhotoFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Map a declared MIME type onto a supported format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    /// The matching `image` crate format.
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Webp => ImageFormat::WebP,
        }
    }
}

/// A validated photo ready for transmission to a model backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPayload {
    format: PhotoFormat,
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl PhotoPayload {
    /// Validate raw bytes and wrap them in a payload.
    ///
    /// `declared_mime` is the content type reported by the client. When
    /// present (and not a generic octet-stream) it must name a supported
    /// format and agree with the sniffed content.
    pub fn from_bytes(
        bytes: Vec<u8>,
        declared_mime: Option<&str>,
        max_bytes: usize,
    ) -> Result<Self, AssessmentError> {
        if bytes.is_empty() {
            return Err(AssessmentError::Encoding("photo is empty".into()));
        }
        if bytes.len() > max_bytes {
            return Err(AssessmentError::Encoding(format!(
                "photo is {} bytes, limit is {max_bytes} bytes",
                bytes.len()
            )));
        }

        let declared = match declared_mime.filter(|m| !is_generic_mime(m)) {
            Some(mime) => Some(PhotoFormat::from_mime(mime).ok_or_else(|| {
                AssessmentError::Encoding(format!(
                    "unsupported content type '{mime}', expected image/jpeg, image/png or image/webp"
                ))
            })?),
            None => None,
        };

        let sniffed = image::guess_format(&bytes)
            .ok()
            .and_then(PhotoFormat::from_image_format)
            .ok_or_else(|| {
                AssessmentError::Encoding("photo is not a JPEG, PNG or WEBP image".into())
            })?;

        if let Some(declared) = declared {
            if declared != sniffed {
                return Err(AssessmentError::Encoding(format!(
                    "declared content type {} does not match {} content",
                    declared.mime(),
                    sniffed.mime()
                )));
            }
        }

        let mut reader = ImageReader::with_format(Cursor::new(&bytes), sniffed.image_format());
        reader.limits(decode_limits());
        let decoded = reader
            .decode()
            .map_err(|e| AssessmentError::Encoding(format!("photo could not be decoded: {e}")))?;
        let (width, height) = (decoded.width(), decoded.height());

        Ok(Self {
            format: sniffed,
            width,
            height,
            bytes,
        })
    }

    /// Parse a `data:<mime>;base64,<data>` URI into a payload.
    pub fn from_data_uri(uri: &str, max_bytes: usize) -> Result<Self, AssessmentError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| AssessmentError::Encoding("photo is not a data URI".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| AssessmentError::Encoding("data URI has no payload".into()))?;
        let mime = header.strip_suffix(";base64").ok_or_else(|| {
            AssessmentError::Encoding("data URI must use base64 encoding".into())
        })?;

        // Reject oversized payloads before paying for the decode.
        let approx_decoded = data.len() / 4 * 3;
        if approx_decoded > max_bytes + 3 {
            return Err(AssessmentError::Encoding(format!(
                "photo is about {approx_decoded} bytes, limit is {max_bytes} bytes"
            )));
        }

        let bytes = STANDARD
            .decode(data)
            .map_err(|e| AssessmentError::Encoding(format!("data URI payload is not base64: {e}")))?;

        let declared = if mime.is_empty() { None } else { Some(mime) };
        Self::from_bytes(bytes, declared, max_bytes)
    }

    pub fn format(&self) -> PhotoFormat {
        self.format
    }

    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard (padded) base64 of the raw bytes.
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime(), self.base64())
    }

    /// Lowercase hex SHA-256 of the raw bytes.
    pub fn sha256_hex(&self) -> String {
        format!("{:x}", Sha256::digest(&self.bytes))
    }
}

/// Decoder limits applied to every photo.
pub fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_PHOTO_DIMENSION);
    limits.max_image_height = Some(MAX_PHOTO_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC_BYTES);
    limits
}

fn is_generic_mime(mime: &str) -> bool {
    let mime = mime.trim();
    mime.is_empty()
        || GENERIC_MIME_TYPES
            .iter()
            .any(|generic| generic.eq_ignore_ascii_case(mime))
}
