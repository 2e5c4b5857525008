use chrono::NaiveDate;

use crate::model::{ForecastDay, ForecastPoint, ForecastSeries};

/// Number of daily groups rendered by the rich widget.
pub const FORECAST_DAYS: usize = 5;

/// Reduce a multi-point series to per-day min/max.
///
/// Points are grouped by their local calendar date in first-encounter order;
/// a date that reappears later in the series joins its existing group.
/// Only the first `max_days` groups are kept. A group's condition is taken
/// from its first point in source order.
pub fn aggregate_daily(series: &ForecastSeries, max_days: usize) -> Vec<ForecastDay> {
    let mut groups: Vec<(NaiveDate, Vec<&ForecastPoint>)> = Vec::new();

    for point in &series.points {
        let date = point.at.with_timezone(&series.utc_offset).date_naive();
        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, points)) => points.push(point),
            None => groups.push((date, vec![point])),
        }
    }

    groups
        .into_iter()
        .take(max_days)
        .filter_map(|(date, points)| {
            let first = points.first()?;
            let (min, max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.temperature), hi.max(p.temperature))
            });

            Some(ForecastDay {
                date,
                min_temp: min,
                max_temp: max,
                temperature_scale: series.temperature_scale,
                condition_main: first.condition_main.clone(),
                condition_description: first.condition_description.clone(),
                condition: first.condition,
            })
        })
        .collect()
}
