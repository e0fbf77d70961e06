//! Upcoming-crop filtering and distance ordering.

use chrono::{Duration, NaiveDate};
use shared::Coordinates;
use tracing::warn;

use crate::models::{AnnotatedCrop, CropDefinition};

/// Default look-ahead window in days.
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Largest look-ahead accepted from configuration.
pub const MAX_HORIZON_DAYS: i64 = 366;

/// Keeps crops whose flowering window overlaps
/// `[reference, reference + horizon_days]`, annotates distances when an
/// origin is known and orders by ascending distance.
///
/// Crops with an inverted window are treated as bad data and skipped.
/// Without an origin the input order is kept.
pub fn filter_and_sort(
    crops: &[CropDefinition],
    origin: Option<Coordinates>,
    reference: NaiveDate,
    horizon_days: i64,
) -> Vec<AnnotatedCrop> {
    // Saturates at the last representable date instead of overflowing.
    let horizon_end = Duration::try_days(horizon_days)
        .and_then(|horizon| reference.checked_add_signed(horizon))
        .unwrap_or(NaiveDate::MAX);

    let mut selected: Vec<AnnotatedCrop> = crops
        .iter()
        .filter(|crop| {
            if crop.is_malformed() {
                warn!(
                    crop_id = %crop.id,
                    start = %crop.flowering_start,
                    end = %crop.flowering_end,
                    "Skipping crop with inverted flowering window"
                );
                return false;
            }
            crop.flowering_end >= reference && crop.flowering_start <= horizon_end
        })
        .map(|crop| AnnotatedCrop {
            distance_km: origin.map(|o| o.distance_to(&crop.location)),
            crop: crop.clone(),
        })
        .collect();

    if origin.is_some() {
        // sort_by is stable, so equidistant crops keep their input order
        selected.sort_by(|a, b| {
            let da = a.distance_km.unwrap_or(0.0);
            let db = b.distance_km.unwrap_or(0.0);
            da.total_cmp(&db)
        });
    }

    selected
}
