use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_STATUS_TEXT_LEN: usize = 280;

/// GeoJSON-style point carried by a status post.
///
/// The inner array is an ordered `[longitude, latitude]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            coordinates: vec![longitude, latitude],
        }
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.first().copied()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.get(1).copied()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.coordinates.len() != 2 {
            return Err(ValidationError::MalformedCoordinatePair {
                len: self.coordinates.len(),
            });
        }

        let longitude = self.coordinates[0];
        if !longitude.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "longitude" });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::LongitudeOutOfRange { value: longitude });
        }

        let latitude = self.coordinates[1];
        if !latitude.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "latitude" });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::LatitudeOutOfRange { value: latitude });
        }

        Ok(())
    }
}

/// Status entity exchanged with the remote REST backend.
///
/// The identifier is backend-assigned and present only after creation; a
/// post is immutable once persisted except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

impl StatusPost {
    /// Build a post ready for creation, validating text and coordinates.
    pub fn new(
        text: impl Into<String>,
        coordinates: Option<(f64, f64)>,
    ) -> Result<Self, ValidationError> {
        let post = Self {
            id: None,
            text: text.into(),
            coordinates: coordinates.map(|(longitude, latitude)| GeoPoint::new(longitude, latitude)),
        };
        post.validate()?;
        Ok(post)
    }

    /// Re-check invariants on a caller-assembled post.
    ///
    /// Fields are public, so the DAO validates again before transmitting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.is_empty() {
            return Err(ValidationError::EmptyStatusText);
        }

        let len = self.text.chars().count();
        if len > MAX_STATUS_TEXT_LEN {
            return Err(ValidationError::StatusTextTooLong {
                len,
                max: MAX_STATUS_TEXT_LEN,
            });
        }

        if let Some(point) = &self.coordinates {
            point.validate()?;
        }

        Ok(())
    }
}
