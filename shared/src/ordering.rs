//! Chronological ordering of a metric's points.

use crate::models::Point;
use crate::timestamp::{parse_timestamp, Timestamp, TimestampError};

/// A point paired with its parsed timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedPoint {
    /// Parsed `point.date`.
    pub timestamp: Timestamp,
    /// The point as submitted.
    pub point: Point,
}

/// Sorts points by ascending timestamp.
///
/// Every timestamp is parsed before anything is reordered, so a single bad
/// date fails the whole call and no partial ordering escapes. Points with
/// equal instants keep their submission order.
///
/// # Errors
///
/// Returns the first [`TimestampError`] in submission order.
pub fn order_chronologically(points: Vec<Point>) -> Result<Vec<TimedPoint>, TimestampError> {
    let mut timed = points
        .into_iter()
        .map(|point| {
            let timestamp = parse_timestamp(&point.date)?;
            Ok(TimedPoint { timestamp, point })
        })
        .collect::<Result<Vec<_>, TimestampError>>()?;

    // `sort_by_key` is stable.
    timed.sort_by_key(|p| p.timestamp);
    Ok(timed)
}
