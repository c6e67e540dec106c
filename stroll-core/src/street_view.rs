//! Street-level imagery: request sizes, availability metadata and fetched
//! images.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::gateway::{GatewayError, Service};
use crate::{Coordinate, geodesy};

/// Largest edge, in pixels, the static imagery endpoint serves.
pub const MAX_IMAGE_EDGE: u16 = 640;

/// Errors returned by [`ImageSize::new`] and when parsing an [`ImageSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ImageSizeError {
    /// Width was zero or above [`MAX_IMAGE_EDGE`].
    #[error("image width must be between 1 and {MAX_IMAGE_EDGE}, got {0}")]
    Width(u16),
    /// Height was zero or above [`MAX_IMAGE_EDGE`].
    #[error("image height must be between 1 and {MAX_IMAGE_EDGE}, got {0}")]
    Height(u16),
    /// The text was not of the form `WIDTHxHEIGHT`.
    #[error("image size must be WIDTHxHEIGHT, such as 600x300")]
    Format,
}

/// Requested image dimensions in pixels.
///
/// # Examples
/// ```
/// use stroll_core::ImageSize;
///
/// let size = ImageSize::new(600, 300).expect("within limits");
/// assert_eq!(size.to_string(), "600x300");
/// assert_eq!(ImageSize::default(), size);
/// assert!(ImageSize::new(0, 300).is_err());
/// assert_eq!("600x300".parse::<ImageSize>(), Ok(size));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImageSize {
    width: u16,
    height: u16,
}

impl ImageSize {
    /// Validate and construct an image size.
    pub const fn new(width: u16, height: u16) -> Result<Self, ImageSizeError> {
        if width == 0 || width > MAX_IMAGE_EDGE {
            return Err(ImageSizeError::Width(width));
        }
        if height == 0 || height > MAX_IMAGE_EDGE {
            return Err(ImageSizeError::Height(height));
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub const fn height(&self) -> u16 {
        self.height
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 600,
            height: 300,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = ImageSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s.trim().split_once('x').ok_or(ImageSizeError::Format)?;
        let edge = |text: &str| text.parse::<u16>().map_err(|_| ImageSizeError::Format);
        Self::new(edge(width)?, edge(height)?)
    }
}

/// Provider status string meaning imagery exists at the queried location.
pub const STATUS_OK: &str = "OK";

/// Result of a street-level imagery metadata lookup.
///
/// An available panorama always carries the provider-corrected location,
/// which may sit some distance from the coordinate that was asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum StreetViewMetadata {
    /// Imagery exists; `location` is where the panorama was captured.
    Available {
        /// Provider-corrected panorama location.
        location: Coordinate,
    },
    /// No usable imagery; `status` is the provider's reason code.
    Unavailable {
        /// Provider status such as `ZERO_RESULTS` or `NOT_FOUND`.
        status: String,
    },
}

impl StreetViewMetadata {
    /// Interpret a provider status and optional location.
    ///
    /// An `"OK"` status without a location is malformed and reported as
    /// [`GatewayError::Unavailable`].
    ///
    /// # Examples
    /// ```
    /// use stroll_core::{Coordinate, StreetViewMetadata};
    ///
    /// let here = Coordinate::new(1.0, 2.0).expect("valid");
    /// let ok = StreetViewMetadata::from_status("OK", Some(here)).expect("complete metadata");
    /// assert_eq!(ok.location(), Some(here));
    ///
    /// let none = StreetViewMetadata::from_status("ZERO_RESULTS", Some(here)).expect("valid");
    /// assert!(!none.is_available());
    ///
    /// assert!(StreetViewMetadata::from_status("OK", None).is_err());
    /// ```
    pub fn from_status(
        status: impl Into<String>,
        location: Option<Coordinate>,
    ) -> Result<Self, GatewayError> {
        let status = status.into();
        if status != STATUS_OK {
            return Ok(Self::Unavailable { status });
        }
        location
            .map(|location| Self::Available { location })
            .ok_or_else(|| GatewayError::Unavailable {
                service: Service::StreetViewMetadata,
                message: "metadata status is OK but location is missing".to_owned(),
            })
    }

    /// Whether imagery can be fetched.
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    /// Corrected panorama location when available.
    pub const fn location(&self) -> Option<Coordinate> {
        match self {
            Self::Available { location } => Some(*location),
            Self::Unavailable { .. } => None,
        }
    }
}

/// A fetched street-level image.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetViewImage {
    metadata_coordinate: Coordinate,
    original_coordinate: Coordinate,
    image: Vec<u8>,
    heading: Option<f64>,
}

impl StreetViewImage {
    /// Assemble an image record.
    ///
    /// The heading is the bearing from the panorama location towards the
    /// original coordinate, or `None` when both coincide.
    pub fn new(
        metadata_coordinate: Coordinate,
        original_coordinate: Coordinate,
        image: Vec<u8>,
    ) -> Self {
        let heading = (metadata_coordinate != original_coordinate)
            .then(|| geodesy::bearing(metadata_coordinate, original_coordinate));
        Self {
            metadata_coordinate,
            original_coordinate,
            image,
            heading,
        }
    }

    /// Location where the panorama was actually captured.
    pub const fn metadata_coordinate(&self) -> Coordinate {
        self.metadata_coordinate
    }

    /// Location that was requested.
    pub const fn original_coordinate(&self) -> Coordinate {
        self.original_coordinate
    }

    /// Encoded image bytes as served by the provider.
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Camera heading in degrees pointing at the requested location.
    pub const fn heading(&self) -> Option<f64> {
        self.heading
    }
}
