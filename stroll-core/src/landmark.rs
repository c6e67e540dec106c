//! Landmarks returned by nearby-place lookups.

use thiserror::Error;

use crate::Coordinate;

/// Errors returned by [`Landmark::new`] and its builders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    /// The provider place identifier was empty.
    #[error("landmark place id must not be empty")]
    EmptyPlaceId,
    /// The display name was empty.
    #[error("landmark display name must not be empty")]
    EmptyDisplayName,
    /// A rating fell outside `0.0..=5.0`.
    #[error("landmark rating must be between 0.0 and 5.0, got {0}")]
    InvalidRating(f32),
}

/// A named place that may serve as a destination or a midpoint.
///
/// `place_id` is the provider's stable identity and is the key used to
/// deduplicate search results.
///
/// # Examples
/// ```
/// use stroll_core::{Coordinate, Landmark};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tower = Landmark::new("ChIJ-tower", "Tokyo Tower", Coordinate::new(35.6586, 139.7454)?)?
///     .with_primary_type("tourist_attraction")
///     .with_rating(4.5)?;
/// assert_eq!(tower.place_id(), "ChIJ-tower");
/// assert_eq!(tower.rating(), Some(4.5));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Landmark {
    place_id: String,
    display_name: String,
    coordinate: Coordinate,
    primary_type: Option<String>,
    types: Option<Vec<String>>,
    rating: Option<f32>,
}

impl Landmark {
    /// Validate and construct a landmark without optional attributes.
    pub fn new(
        place_id: impl Into<String>,
        display_name: impl Into<String>,
        coordinate: Coordinate,
    ) -> Result<Self, LandmarkError> {
        let place_id = place_id.into();
        if place_id.trim().is_empty() {
            return Err(LandmarkError::EmptyPlaceId);
        }
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(LandmarkError::EmptyDisplayName);
        }
        Ok(Self {
            place_id,
            display_name,
            coordinate,
            primary_type: None,
            types: None,
            rating: None,
        })
    }

    /// Attach the provider's primary place type.
    #[must_use]
    pub fn with_primary_type(mut self, primary_type: impl Into<String>) -> Self {
        self.primary_type = Some(primary_type.into());
        self
    }

    /// Attach every place type reported by the provider.
    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a user rating in `0.0..=5.0`.
    pub fn with_rating(mut self, rating: f32) -> Result<Self, LandmarkError> {
        if !(0.0..=5.0).contains(&rating) {
            return Err(LandmarkError::InvalidRating(rating));
        }
        self.rating = Some(rating);
        Ok(self)
    }

    /// Provider place identifier.
    pub fn place_id(&self) -> &str {
        &self.place_id
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Position of the place.
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Primary place type, if reported.
    pub fn primary_type(&self) -> Option<&str> {
        self.primary_type.as_deref()
    }

    /// All place types, if reported.
    pub fn types(&self) -> Option<&[String]> {
        self.types.as_deref()
    }

    /// Average user rating, if reported.
    pub const fn rating(&self) -> Option<f32> {
        self.rating
    }
}
