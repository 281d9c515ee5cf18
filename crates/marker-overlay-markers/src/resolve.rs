use crate::{MarkerDetection, MarkerLayout};
use marker_overlay_core::Quad;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Number of markers a layout consists of.
pub const LAYOUT_MARKER_COUNT: usize = 4;

/// Errors returned while resolving the destination quad.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("expected exactly 4 markers, found {found}")]
    InsufficientMarkers { found: usize },
    #[error("marker {id} not found")]
    MarkerNotFound { id: u32 },
    #[error("marker {id} detected {count} times")]
    AmbiguousMarkerMatch { id: u32, count: usize },
    #[error("layout lists marker {id} for more than one corner")]
    DuplicateLayoutId { id: u32 },
}

/// Pick the outer corner of each layout marker.
///
/// Requires a layout of four distinct ids and exactly four detections, each
/// expected id present exactly once.
/// For corner role `i` only corner `i` of the matching marker is used: the
/// TL corner of the top-left marker, the TR corner of the top-right marker
/// and so on. This assumes every marker is printed upright relative to the
/// card.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(detections), fields(n = detections.len()))
)]
pub fn resolve(
    detections: &[MarkerDetection],
    layout: &MarkerLayout,
) -> Result<Quad, ResolveError> {
    if let Some(id) = layout.duplicate_id() {
        return Err(ResolveError::DuplicateLayoutId { id });
    }
    if detections.len() != LAYOUT_MARKER_COUNT {
        return Err(ResolveError::InsufficientMarkers {
            found: detections.len(),
        });
    }

    let mut corners = [Point2::origin(); 4];
    for (role, id) in layout.roles() {
        let marker = find_unique(detections, id)?;
        corners[role.index()] = marker.corners[role.index()];
    }

    Ok(Quad::new(corners))
}

fn find_unique(
    detections: &[MarkerDetection],
    id: u32,
) -> Result<&MarkerDetection, ResolveError> {
    let mut matches = detections.iter().filter(|d| d.id == id);
    let first = matches.next().ok_or(ResolveError::MarkerNotFound { id })?;
    let extra = matches.count();
    if extra > 0 {
        return Err(ResolveError::AmbiguousMarkerMatch {
            id,
            count: extra + 1,
        });
    }
    Ok(first)
}
