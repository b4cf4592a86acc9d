use chrono::{DateTime, Duration, Utc};
use overbot_models::rating::{RatingSnapshot, Role};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// The rating history of one role, in capture order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleSeries {
    pub role: Role,
    pub points: Vec<(DateTime<Utc>, i32)>,
}

/// Axis ranges covering every point of a set of series.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub min: i32,
    pub max: i32,
}

/// None of the roles has a rating to plot.
#[derive(Debug)]
pub struct GraphUnavailable;

/// Splits a profile's snapshots into one series per role, leaving out roles
/// that were never rated.
///
/// # Errors
///
/// Returns [`GraphUnavailable`] if no role has any data.
pub fn series(snapshots: &[RatingSnapshot]) -> Result<Vec<RoleSeries>, GraphUnavailable> {
    let mut snapshots = snapshots.iter().collect::<Vec<_>>();
    snapshots.sort_by_key(|s| s.captured_at);

    let series = Role::ALL
        .into_iter()
        .filter_map(|role| {
            let points = snapshots
                .iter()
                .filter_map(|s| s.ratings.get(role).map(|r| (s.captured_at, r)))
                .collect::<Vec<_>>();
            (!points.is_empty()).then_some(RoleSeries { role, points })
        })
        .collect::<Vec<_>>();

    if series.is_empty() {
        return Err(GraphUnavailable);
    }
    Ok(series)
}

/// Computes the axis ranges, with a tenth of the rating spread as headroom on
/// both ends. A single capture date is widened to one day. Returns `None` for
/// an empty slice.
#[must_use]
pub fn bounds(series: &[RoleSeries]) -> Option<Bounds> {
    let mut points = series.iter().flat_map(|s| s.points.iter());
    let &(first_at, first) = points.next()?;
    let mut bounds = Bounds {
        start: first_at,
        end: first_at,
        min: first,
        max: first,
    };
    for &(at, rating) in points {
        bounds.start = bounds.start.min(at);
        bounds.end = bounds.end.max(at);
        bounds.min = bounds.min.min(rating);
        bounds.max = bounds.max.max(rating);
    }

    if bounds.end == bounds.start {
        bounds.end = bounds.start + Duration::days(1);
    }
    let pad = ((bounds.max - bounds.min) / 10).max(1);
    bounds.min = bounds.min.saturating_sub(pad);
    bounds.max = bounds.max.saturating_add(pad);
    Some(bounds)
}

impl Display for GraphUnavailable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("no role has any rating to plot")
    }
}

impl StdError for GraphUnavailable {}

#[cfg(test)]
mod tests {
    use overbot_models::{id::ProfileId, rating::Ratings};

    use super::*;

    fn snapshot(day: i64, ratings: Ratings) -> RatingSnapshot {
        RatingSnapshot {
            profile_id: ProfileId(1),
            ratings,
            captured_at: DateTime::<Utc>::UNIX_EPOCH + Duration::days(day),
        }
    }

    #[test]
    fn drops_roles_without_data() {
        let snapshots = [
            snapshot(
                2,
                Ratings {
                    tank: Some(2100),
                    support: Some(1900),
                    ..Ratings::default()
                },
            ),
            snapshot(
                1,
                Ratings {
                    tank: Some(2000),
                    ..Ratings::default()
                },
            ),
        ];

        let series = series(&snapshots).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].role, Role::Tank);
        assert_eq!(
            series[0].points.iter().map(|(_, r)| *r).collect::<Vec<_>>(),
            vec![2000, 2100]
        );
        assert_eq!(series[1].role, Role::Support);
        assert_eq!(series[1].points.len(), 1);
    }

    #[test]
    fn unranked_history_is_unavailable() {
        assert!(series(&[]).is_err());
        assert!(series(&[snapshot(1, Ratings::default())]).is_err());
    }

    #[test]
    fn bounds_are_padded() {
        let snapshots = [
            snapshot(
                1,
                Ratings {
                    offense: Some(1000),
                    ..Ratings::default()
                },
            ),
            snapshot(
                3,
                Ratings {
                    offense: Some(2000),
                    ..Ratings::default()
                },
            ),
        ];
        let bounds = bounds(&series(&snapshots).unwrap()).unwrap();

        assert_eq!(bounds.min, 900);
        assert_eq!(bounds.max, 2100);
        assert_eq!(bounds.end - bounds.start, Duration::days(2));
    }

    #[test]
    fn flat_series_still_has_height() {
        let snapshots = [snapshot(
            1,
            Ratings {
                support: Some(3000),
                ..Ratings::default()
            },
        )];
        let bounds = bounds(&series(&snapshots).unwrap()).unwrap();
        assert!(bounds.min < bounds.max);
        assert_eq!(bounds.end - bounds.start, Duration::days(1));
    }
}
