//! Picks the first landmark that has viewable street-level imagery.
//!
//! Each candidate runs through road-snap, metadata and image download.
//! Missing imagery skips to the next candidate. Transport failures stop
//! selection immediately so outages are not mistaken for empty areas.

use thiserror::Error;

use crate::{
    Coordinate, GatewayError, ImageSize, Landmark, MapsGateway, Service, StreetViewImage,
    StreetViewMetadata,
};

/// Errors from [`ImageSelector::select`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// No candidate yielded an image.
    #[error("no street view image obtainable after trying {tried} candidates")]
    NoImage {
        /// Candidates attempted.
        tried: usize,
        /// Why the last candidate had no image; `None` when there were none.
        #[source]
        last_failure: Option<GatewayError>,
    },
    /// A transport failure aborted selection.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Fetches imagery for landmark candidates through a [`MapsGateway`].
#[derive(Debug)]
pub struct ImageSelector<'a, G: ?Sized> {
    gateway: &'a G,
    size: ImageSize,
}

impl<'a, G> ImageSelector<'a, G>
where
    G: MapsGateway + ?Sized,
{
    /// Fetch images of `size` through `gateway`.
    pub const fn new(gateway: &'a G, size: ImageSize) -> Self {
        Self { gateway, size }
    }

    /// Return the first candidate, in order, with an obtainable image.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NoImage`] when `candidates` is empty or none has
    /// imagery; [`SelectionError::Gateway`] on a transport failure.
    ///
    /// # Examples
    /// ```
    /// use stroll_core::test_support::StubGateway;
    /// use stroll_core::{Coordinate, ImageSelector, ImageSize, Landmark, SelectionError};
    ///
    /// let first = Coordinate::new(0.0, 0.0).expect("valid");
    /// let second = Coordinate::new(0.0, 0.01).expect("valid");
    /// let gateway = StubGateway::new().without_imagery_at(first);
    /// let candidates = [
    ///     Landmark::new("a", "A", first).expect("valid"),
    ///     Landmark::new("b", "B", second).expect("valid"),
    /// ];
    /// let selector = ImageSelector::new(&gateway, ImageSize::default());
    /// let (chosen, image) = selector.select(&candidates)?;
    /// assert_eq!(chosen.place_id(), "b");
    /// assert_eq!(image.original_coordinate(), second);
    /// # Ok::<(), SelectionError>(())
    /// ```
    pub fn select(
        &self,
        candidates: &[Landmark],
    ) -> Result<(Landmark, StreetViewImage), SelectionError> {
        let mut last_failure = None;
        for (attempt, candidate) in candidates.iter().enumerate() {
            log::debug!(
                "trying candidate {} of {}: {} ({})",
                attempt + 1,
                candidates.len(),
                candidate.display_name(),
                candidate.place_id()
            );
            match self.fetch_image(candidate.coordinate()) {
                Ok(image) => {
                    log::info!(
                        "selected {} after {} attempts",
                        candidate.place_id(),
                        attempt + 1
                    );
                    return Ok((candidate.clone(), image));
                }
                Err(err) if err.is_transport() => return Err(SelectionError::Gateway(err)),
                Err(err) => last_failure = Some(err),
            }
        }
        log::warn!("no imagery for any of {} candidates", candidates.len());
        Err(SelectionError::NoImage {
            tried: candidates.len(),
            last_failure,
        })
    }

    /// Fetch an image looking at `target`.
    ///
    /// # Errors
    ///
    /// A transport failure from any lookup is returned as is. When the
    /// provider has no usable imagery the error is
    /// [`GatewayError::Unavailable`]; a non-"OK" metadata status is reported
    /// that way too.
    pub fn fetch_image(&self, target: Coordinate) -> Result<StreetViewImage, GatewayError> {
        let road_point = self.snap(target)?;

        let location = match self.gateway.street_view_metadata(road_point)? {
            StreetViewMetadata::Available { location } => location,
            StreetViewMetadata::Unavailable { status } => {
                log::debug!("no imagery near {road_point}: {status}");
                return Err(GatewayError::Unavailable {
                    service: Service::StreetViewMetadata,
                    message: format!("no imagery near {road_point}: {status}"),
                });
            }
        };

        let bytes = self
            .gateway
            .street_view_image(location, self.size)
            .inspect_err(|err| log::debug!("image at {location} unavailable: {err}"))?;
        Ok(StreetViewImage::new(location, target, bytes))
    }

    fn snap(&self, target: Coordinate) -> Result<Coordinate, GatewayError> {
        match self.gateway.snap_to_road(target) {
            Ok(Some(snapped)) => {
                log::trace!("snapped {target} to {snapped}");
                Ok(snapped)
            }
            Ok(None) => Ok(target),
            Err(err) if !err.is_transport() => {
                log::debug!("road snap for {target} unusable, using it unsnapped: {err}");
                Ok(target)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{GatewayCall, StubGateway};
    use rstest::{fixture, rstest};

    #[fixture]
    fn candidates() -> Vec<Landmark> {
        (0..3)
            .map(|i| {
                let at = Coordinate::new(0.0, f64::from(i) * 0.01).expect("valid");
                Landmark::new(format!("p{i}"), format!("Place {i}"), at).expect("valid")
            })
            .collect()
    }

    fn metadata_calls(gateway: &StubGateway) -> usize {
        gateway.count_calls(|call| matches!(call, GatewayCall::StreetViewMetadata { .. }))
    }

    #[rstest]
    fn returns_first_candidate_with_imagery(candidates: Vec<Landmark>) {
        let gateway = StubGateway::new();
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let (chosen, image) = selector.select(&candidates).expect("imagery everywhere");
        assert_eq!(chosen.place_id(), "p0");
        assert_eq!(metadata_calls(&gateway), 1);
        assert_eq!(image.image(), StubGateway::image_bytes_for(chosen.coordinate()));
    }

    #[rstest]
    fn skips_candidates_without_imagery(candidates: Vec<Landmark>) {
        let gateway = StubGateway::new()
            .without_imagery_at(candidates[0].coordinate())
            .without_imagery_at(candidates[1].coordinate());
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let (chosen, _) = selector.select(&candidates).expect("third has imagery");
        assert_eq!(chosen.place_id(), "p2");
        assert_eq!(metadata_calls(&gateway), 3);
    }

    #[rstest]
    fn empty_candidate_list_fails_without_calls() {
        let gateway = StubGateway::new();
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let err = selector.select(&[]).expect_err("nothing to try");
        assert_eq!(
            err,
            SelectionError::NoImage {
                tried: 0,
                last_failure: None,
            }
        );
        assert!(gateway.calls().is_empty());
    }

    #[rstest]
    fn exhausting_candidates_reports_count(candidates: Vec<Landmark>) {
        let gateway = StubGateway::new().without_imagery();
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let err = selector.select(&candidates).expect_err("no imagery");
        match err {
            SelectionError::NoImage {
                tried,
                last_failure: Some(cause),
            } => {
                assert_eq!(tried, 3);
                assert_eq!(cause.service(), Service::StreetViewMetadata);
                assert!(!cause.is_transport());
            }
            other => panic!("expected NoImage with a cause, found {other:?}"),
        }
    }

    #[rstest]
    fn snap_timeout_aborts_selection(candidates: Vec<Landmark>) {
        let timeout = GatewayError::Timeout {
            service: Service::Roads,
            timeout_secs: 15,
        };
        let gateway = StubGateway::new().with_snap_error(timeout.clone());
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let err = selector.select(&candidates).expect_err("timeout propagates");
        assert_eq!(err, SelectionError::Gateway(timeout));
        assert_eq!(metadata_calls(&gateway), 0);
    }

    #[rstest]
    fn unusable_snap_falls_back_to_landmark(candidates: Vec<Landmark>) {
        let gateway = StubGateway::new().with_snap_error(GatewayError::Unavailable {
            service: Service::Roads,
            message: "malformed body".into(),
        });
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let (chosen, image) = selector.select(&candidates).expect("falls back");
        assert_eq!(chosen.place_id(), "p0");
        assert_eq!(image.metadata_coordinate(), chosen.coordinate());
        assert!(image.heading().is_none());
    }

    #[rstest]
    fn snapped_location_drives_metadata_and_heading(candidates: Vec<Landmark>) {
        let target = candidates[0].coordinate();
        let road = Coordinate::new(-0.001, 0.0).expect("valid");
        let gateway = StubGateway::new().with_snap(target, road);
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let image = selector.fetch_image(target).expect("imagery at road");
        assert_eq!(image.metadata_coordinate(), road);
        assert_eq!(image.original_coordinate(), target);
        let heading = image.heading().expect("camera is south of target");
        assert!(heading < 1e-6 || heading > 360.0 - 1e-6, "expected north, got {heading}");
    }

    #[rstest]
    fn metadata_server_error_aborts(candidates: Vec<Landmark>) {
        let gateway = StubGateway::new().with_metadata_error(GatewayError::Http {
            service: Service::StreetViewMetadata,
            status: 503,
            message: "unavailable".into(),
        });
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let err = selector.select(&candidates).expect_err("server error");
        assert!(matches!(err, SelectionError::Gateway(GatewayError::Http { status: 503, .. })));
    }

    #[rstest]
    fn unusable_image_skips_candidate(candidates: Vec<Landmark>) {
        let unusable = GatewayError::Unavailable {
            service: Service::StreetViewImage,
            message: "empty body".into(),
        };
        let gateway = StubGateway::new().with_image_error(unusable.clone());
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let err = selector.select(&candidates).expect_err("every image unusable");
        assert_eq!(
            err,
            SelectionError::NoImage {
                tried: 3,
                last_failure: Some(unusable),
            }
        );
        let cause = std::error::Error::source(&err).expect("cause is chained");
        assert_eq!(cause.to_string(), "street view image returned no usable data: empty body");
    }

    #[rstest]
    fn missing_imagery_is_reported_as_unavailable(candidates: Vec<Landmark>) {
        let target = candidates[0].coordinate();
        let gateway = StubGateway::new().without_imagery_at(target);
        let selector = ImageSelector::new(&gateway, ImageSize::default());
        let err = selector.fetch_image(target).expect_err("no imagery");
        assert!(matches!(
            err,
            GatewayError::Unavailable {
                service: Service::StreetViewMetadata,
                ..
            }
        ));
    }
}
