//! IIIF Image API URLs.
//!
//! An image request URL has the shape
//! `{prefix}/{identifier}/{region}/{size}/{rotation}/{quality}.{format}`.
//! [`ImageApiUrl`] parses the trailing four segments into typed values so the
//! region and size can be rewritten explicitly instead of by string search.

mod region;

pub use region::{Region, Size};

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

#[allow(clippy::expect_used)]
static ROTATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!?\d+(\.\d+)?$").expect("rotation regex is valid")
});

#[allow(clippy::expect_used)]
static QUALITY_FORMAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\.([A-Za-z0-9]+)$").expect("quality regex is valid")
});

/// Why a string is not an Image API request URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageUrlError {
    /// Not an absolute http(s) URL without query or fragment.
    #[error("not an absolute http(s) URL without query: {0}")]
    NotHttp(String),
    /// Fewer path segments than the Image API grammar requires.
    #[error("too few path segments for an image request: {0}")]
    TooShort(String),
    /// A segment does not follow the Image API syntax.
    #[error("invalid {segment} segment `{value}`")]
    Segment {
        /// Segment name (`region`, `size`, `rotation`, `quality`).
        segment: &'static str,
        /// Offending value.
        value: String,
    },
}

/// A parsed IIIF Image API request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageApiUrl {
    base: String,
    region: Region,
    size: Size,
    rotation: String,
    quality: String,
    format: String,
}

impl ImageApiUrl {
    /// Parses an image request URL.
    ///
    /// # Errors
    ///
    /// Returns [`ImageUrlError`] when the URL does not follow the grammar.
    pub fn parse(input: &str) -> Result<Self, ImageUrlError> {
        let parsed = Url::parse(input).map_err(|_| ImageUrlError::NotHttp(input.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https")
            || parsed.query().is_some()
            || parsed.fragment().is_some()
        {
            return Err(ImageUrlError::NotHttp(input.to_string()));
        }

        let mut segments = input.rsplitn(5, '/');
        let (Some(quality_format), Some(rotation), Some(size), Some(region), Some(base)) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(ImageUrlError::TooShort(input.to_string()));
        };

        // `base` must still hold `scheme://host/.../identifier`.
        let has_identifier = base
            .split_once("://")
            .is_some_and(|(_, rest)| rest.contains('/') && !rest.ends_with('/'));
        if !has_identifier {
            return Err(ImageUrlError::TooShort(input.to_string()));
        }

        let region = region.parse::<Region>().map_err(|()| ImageUrlError::Segment {
            segment: "region",
            value: region.to_string(),
        })?;
        let size = size.parse::<Size>().map_err(|()| ImageUrlError::Segment {
            segment: "size",
            value: size.to_string(),
        })?;
        if !ROTATION_PATTERN.is_match(rotation) {
            return Err(ImageUrlError::Segment {
                segment: "rotation",
                value: rotation.to_string(),
            });
        }
        let Some(caps) = QUALITY_FORMAT_PATTERN.captures(quality_format) else {
            return Err(ImageUrlError::Segment {
                segment: "quality",
                value: quality_format.to_string(),
            });
        };

        Ok(Self {
            base: base.to_string(),
            region,
            size,
            rotation: rotation.to_string(),
            quality: caps[1].to_string(),
            format: caps[2].to_string(),
        })
    }

    /// Requested region.
    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Requested size.
    #[must_use]
    pub fn size(&self) -> &Size {
        &self.size
    }

    /// Image format extension, without the dot.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Rewrites the request to the whole `width` x `height` image at full width.
    #[must_use]
    pub fn full_resolution(mut self, width: u32, height: u32) -> Self {
        self.region = Region::Pixels {
            x: 0,
            y: 0,
            width,
            height,
        };
        self.size = Size::Width(width);
        self
    }
}

impl fmt::Display for ImageApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}.{}",
            self.base, self.region, self.size, self.rotation, self.quality, self.format
        )
    }
}

/// First-occurrence substitution used when a thumbnail id does not parse:
/// `full` becomes `0,0,<w>,<h>` and `,150` becomes `<w>,`.
#[must_use]
pub fn literal_full_resolution(thumbnail_id: &str, width: u32, height: u32) -> String {
    thumbnail_id
        .replacen("full", &format!("0,0,{width},{height}"), 1)
        .replacen(",150", &format!("{width},"), 1)
}
