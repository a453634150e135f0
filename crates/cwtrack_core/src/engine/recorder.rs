//! Adjustment recording.
//!
//! The adjustment is `fact_interval - expected_interval` measured against the
//! same next-due value, which reduces to `performed - expected_anchor`:
//! positive when the compliance was performed later than the theoretical
//! schedule, negative when earlier.

use super::axis::DueAxis;
use super::EngineResult;
use crate::model::compliance::Compliance;

/// Writes the signed drift of axis `A` onto `latest` and returns it.
///
/// Leaves the field untouched and returns `None` when `latest` has no
/// reading on that axis.
pub fn record_adjustment<A: DueAxis>(
    latest: &mut Compliance,
    expected_anchor: A::Value,
) -> EngineResult<Option<A::Drift>> {
    let Some(performed) = A::performed(latest) else {
        return Ok(None);
    };
    let drift = A::drift(performed, expected_anchor)?;
    A::set_adjustment(latest, Some(drift));
    Ok(Some(drift))
}
