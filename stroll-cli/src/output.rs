//! JSON rendering of generated routes and street-level images.

use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use stroll_core::{Coordinate, Landmark, RouteResult, StreetViewImage};

use crate::CliError;

/// Street-level image with its bytes Base64-encoded.
///
/// Printed by `stroll street-view` and embedded in route documents.
#[derive(Debug, Serialize)]
pub(crate) struct ImageDocument {
    pub(crate) metadata_location: Coordinate,
    pub(crate) original_location: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) heading: Option<f64>,
    pub(crate) image_base64: String,
}

impl From<&StreetViewImage> for ImageDocument {
    fn from(image: &StreetViewImage) -> Self {
        Self {
            metadata_location: image.metadata_coordinate(),
            original_location: image.original_coordinate(),
            heading: image.heading(),
            image_base64: STANDARD.encode(image.image()),
        }
    }
}

/// Output document printed by `stroll generate`.
#[derive(Debug, Serialize)]
pub(crate) struct RouteDocument<'a> {
    pub(crate) departure: Coordinate,
    pub(crate) destination: Coordinate,
    pub(crate) destination_landmark: Option<&'a Landmark>,
    pub(crate) destination_image: Option<ImageDocument>,
    pub(crate) geodesic_midpoint: Coordinate,
    pub(crate) midpoint: Coordinate,
    pub(crate) midpoint_landmark: &'a Landmark,
    pub(crate) midpoint_image: ImageDocument,
    pub(crate) combined_polyline: &'a str,
    pub(crate) route_coordinates: &'a [Coordinate],
    pub(crate) route_center: Coordinate,
    pub(crate) destination_candidates: usize,
    pub(crate) midpoint_candidates: usize,
}

impl<'a> From<&'a RouteResult> for RouteDocument<'a> {
    fn from(route: &'a RouteResult) -> Self {
        Self {
            departure: route.departure,
            destination: route.destination,
            destination_landmark: route.destination_landmark.as_ref(),
            destination_image: route.destination_image.as_ref().map(ImageDocument::from),
            geodesic_midpoint: route.geodesic_midpoint,
            midpoint: route.midpoint,
            midpoint_landmark: &route.midpoint_landmark,
            midpoint_image: ImageDocument::from(&route.midpoint_image),
            combined_polyline: &route.combined_polyline,
            route_coordinates: &route.route_coordinates,
            route_center: route.route_center,
            destination_candidates: route.destination_candidates,
            midpoint_candidates: route.midpoint_candidates,
        }
    }
}

/// Write `route` to `writer` as pretty JSON followed by a newline.
pub(crate) fn write_route(writer: &mut dyn Write, route: &RouteResult) -> Result<(), CliError> {
    write_document(writer, &RouteDocument::from(route))
}

/// Write `image` to `writer` as pretty JSON followed by a newline.
pub(crate) fn write_image(writer: &mut dyn Write, image: &StreetViewImage) -> Result<(), CliError> {
    write_document(writer, &ImageDocument::from(image))
}

fn write_document(writer: &mut dyn Write, document: &impl Serialize) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(document).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
