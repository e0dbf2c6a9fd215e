// Synthetic historical series generation
use crate::domain::reading::Reading;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Relative jitter applied to each parameter when synthesizing a point.
const JITTER_FRACTION: f64 = 0.2;

/// Granularity selector for the historical charts and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Year,
    ];

    /// Number of buckets in the series for this range.
    pub fn bucket_count(&self) -> usize {
        match self {
            TimeRange::Day => 24,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 12,
        }
    }

    /// Spacing between consecutive buckets. Year buckets step in 30-day
    /// months rather than calendar months.
    pub fn spacing(&self) -> Duration {
        match self {
            TimeRange::Day => Duration::hours(1),
            TimeRange::Week | TimeRange::Month => Duration::days(1),
            TimeRange::Year => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }

    pub fn parse(value: &str) -> Option<TimeRange> {
        match value {
            "day" => Some(TimeRange::Day),
            "week" => Some(TimeRange::Week),
            "month" => Some(TimeRange::Month),
            "year" => Some(TimeRange::Year),
            _ => None,
        }
    }
}

/// Synthesize a historical series for one range by jittering the current
/// reading. Each parameter is jittered independently per point, pH and
/// temperature keep one decimal, TDS is rounded to a whole ppm, and every
/// point is tagged with the condition of its own jittered values. Output is
/// oldest first.
///
/// The series is a display placeholder standing in for a real history API:
/// two calls with the same inputs are expected to differ, which is why the
/// random source is passed in rather than drawn from a global.
pub fn generate<R: Rng>(
    current: Option<&Reading>,
    range: TimeRange,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Reading> {
    let Some(current) = current else {
        return Vec::new();
    };

    let spacing = range.spacing();
    let mut series = Vec::with_capacity(range.bucket_count());

    for bucket in (0..range.bucket_count() as i64).rev() {
        let timestamp = now - spacing * bucket as i32;

        let ph = round_to_tenth(jitter(current.ph, rng));
        let tds = jitter(current.tds, rng).round();
        let temperature = round_to_tenth(jitter(current.temperature, rng));

        series.push(Reading::new(ph, tds, temperature, timestamp));
    }

    series
}

/// Synthetic series for all four ranges, wholly replaced on every update.
#[derive(Debug, Clone, Default)]
pub struct HistoricalSet {
    pub day: Vec<Reading>,
    pub week: Vec<Reading>,
    pub month: Vec<Reading>,
    pub year: Vec<Reading>,
}

impl HistoricalSet {
    pub fn regenerate<R: Rng>(
        current: Option<&Reading>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        Self {
            day: generate(current, TimeRange::Day, now, rng),
            week: generate(current, TimeRange::Week, now, rng),
            month: generate(current, TimeRange::Month, now, rng),
            year: generate(current, TimeRange::Year, now, rng),
        }
    }

    pub fn series(&self, range: TimeRange) -> &[Reading] {
        match range {
            TimeRange::Day => &self.day,
            TimeRange::Week => &self.week,
            TimeRange::Month => &self.month,
            TimeRange::Year => &self.year,
        }
    }
}

fn jitter<R: Rng>(value: f64, rng: &mut R) -> f64 {
    value * (1.0 + rng.gen_range(-JITTER_FRACTION..=JITTER_FRACTION))
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reading::Condition;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_reading() -> Reading {
        Reading::new(7.2, 250.0, 18.0, Utc::now())
    }

    #[test]
    fn test_series_lengths_fixed_per_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let reading = sample_reading();
        let now = Utc::now();

        assert_eq!(generate(Some(&reading), TimeRange::Day, now, &mut rng).len(), 24);
        assert_eq!(generate(Some(&reading), TimeRange::Week, now, &mut rng).len(), 7);
        assert_eq!(generate(Some(&reading), TimeRange::Month, now, &mut rng).len(), 30);
        assert_eq!(generate(Some(&reading), TimeRange::Year, now, &mut rng).len(), 12);
    }

    #[test]
    fn test_series_is_oldest_first() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let reading = sample_reading();

        for range in TimeRange::ALL {
            let series = generate(Some(&reading), range, now, &mut rng);
            for pair in series.windows(2) {
                assert!(pair[0].captured_at < pair[1].captured_at);
            }
            assert_eq!(series.last().unwrap().captured_at, now);
        }
    }

    #[test]
    fn test_jitter_stays_within_twenty_percent() {
        let mut rng = StdRng::seed_from_u64(11);
        let reading = sample_reading();
        let series = generate(Some(&reading), TimeRange::Month, Utc::now(), &mut rng);

        for point in &series {
            assert!(point.ph >= reading.ph * 0.8 - 0.05 && point.ph <= reading.ph * 1.2 + 0.05);
            assert!(point.tds >= (reading.tds * 0.8).floor() && point.tds <= (reading.tds * 1.2).ceil());
            assert!(
                point.temperature >= reading.temperature * 0.8 - 0.05
                    && point.temperature <= reading.temperature * 1.2 + 0.05
            );
        }
    }

    #[test]
    fn test_rounding_policy() {
        let mut rng = StdRng::seed_from_u64(13);
        let reading = sample_reading();
        let series = generate(Some(&reading), TimeRange::Day, Utc::now(), &mut rng);

        for point in &series {
            assert_eq!(point.ph, (point.ph * 10.0).round() / 10.0);
            assert_eq!(point.temperature, (point.temperature * 10.0).round() / 10.0);
            assert_eq!(point.tds, point.tds.round());
        }
    }

    #[test]
    fn test_points_classified_on_own_values() {
        let mut rng = StdRng::seed_from_u64(17);
        // A borderline current reading so jitter lands points in several bands
        let reading = Reading::new(6.4, 320.0, 26.0, Utc::now());
        let series = generate(Some(&reading), TimeRange::Month, Utc::now(), &mut rng);

        for point in &series {
            assert_eq!(
                point.condition,
                Condition::from_values(point.ph, point.tds, point.temperature)
            );
        }
    }

    #[test]
    fn test_absent_reading_yields_empty_series() {
        let mut rng = StdRng::seed_from_u64(19);
        for range in TimeRange::ALL {
            assert!(generate(None, range, Utc::now(), &mut rng).is_empty());
        }
    }

    #[test]
    fn test_regenerate_fills_all_ranges() {
        let mut rng = StdRng::seed_from_u64(23);
        let reading = sample_reading();
        let set = HistoricalSet::regenerate(Some(&reading), Utc::now(), &mut rng);

        assert_eq!(set.day.len(), 24);
        assert_eq!(set.week.len(), 7);
        assert_eq!(set.month.len(), 30);
        assert_eq!(set.year.len(), 12);
        assert_eq!(set.series(TimeRange::Week).len(), 7);
    }
}
