use std::collections::BTreeMap;

use thiserror::Error;

use super::model::{AggregateRow, DelayBreakdown, DelayCause, FlightDataset};

// ---------------------------------------------------------------------------
// Year input
// ---------------------------------------------------------------------------

/// Why a year typed by the user was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearInputError {
    #[error("Enter a year")]
    Empty,
    #[error("'{0}' is not a whole-number year")]
    NotAnInteger(String),
}

/// Coerce user text into a year. Integral float spellings such as
/// `"2010.0"` are accepted, the same rule the loader applies to `Year`.
pub fn parse_year(input: &str) -> Result<i32, YearInputError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(YearInputError::Empty);
    }
    if let Ok(year) = text.parse::<i32>() {
        return Ok(year);
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .filter(|f| (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(f))
        .map(|f| f as i32)
        .ok_or_else(|| YearInputError::NotAnInteger(text.to_string()))
}

// ---------------------------------------------------------------------------
// Grouped mean
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// (month, carrier); `BTreeMap` ordering gives month-then-carrier output.
type GroupKey<'a> = (u32, &'a str);

/// Average delay minutes per (month, carrier) for each cause in `year`.
///
/// Each cause is grouped independently: a record missing one cause still
/// counts toward the other four. Groups with no value for a cause emit no
/// row for it, and a year without records yields five empty series.
/// Records without a carrier code are not grouped.
pub fn compute_info(dataset: &FlightDataset, year: i32) -> DelayBreakdown {
    let mut groups: [BTreeMap<GroupKey<'_>, Mean>; 5] = Default::default();

    let selected = dataset
        .records()
        .iter()
        .filter(|r| r.year == year && !r.reporting_airline.is_empty());

    for record in selected {
        let key = (record.month, record.reporting_airline.as_str());
        for (slot, cause) in DelayCause::ALL.into_iter().enumerate() {
            if let Some(minutes) = record.delay(cause).filter(|v| !v.is_nan()) {
                groups[slot].entry(key).or_default().add(minutes);
            }
        }
    }

    let mut breakdown = DelayBreakdown::default();
    for (cause, means) in DelayCause::ALL.into_iter().zip(groups) {
        breakdown.series_mut(cause).rows = means
            .into_iter()
            .filter_map(|((month, airline), mean)| {
                Some(AggregateRow {
                    month,
                    reporting_airline: airline.to_string(),
                    mean_delay: mean.value()?,
                })
            })
            .collect();
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::DelayRecord;
    use proptest::prelude::*;

    fn two_flight_dataset() -> FlightDataset {
        let mut first = record(2010, 1, "AA");
        first.carrier_delay = Some(10.0);
        let mut second = record(2010, 1, "AA");
        second.carrier_delay = Some(20.0);
        second.weather_delay = Some(5.0);
        FlightDataset::from_records(vec![first, second])
    }

    #[test]
    fn test_means_per_cause() {
        let out = compute_info(&two_flight_dataset(), 2010);
        assert_eq!(
            out.carrier.rows,
            vec![AggregateRow { month: 1, reporting_airline: "AA".into(), mean_delay: 15.0 }]
        );
        assert_eq!(
            out.weather.rows,
            vec![AggregateRow { month: 1, reporting_airline: "AA".into(), mean_delay: 5.0 }]
        );
        // No values at all for these causes: no rows rather than zero-filled ones.
        assert!(out.nas.is_empty());
        assert!(out.security.is_empty());
        assert!(out.late_aircraft.is_empty());
    }

    #[test]
    fn test_unknown_year_is_empty() {
        let out = compute_info(&two_flight_dataset(), 2011);
        assert!(out.is_empty());
        assert_eq!(out, DelayBreakdown::default());
    }

    #[test]
    fn test_rows_sorted_by_month_then_carrier() {
        let mut records = Vec::new();
        for (month, airline) in [(3, "UA"), (1, "UA"), (3, "AA"), (1, "DL"), (1, "AA")] {
            let mut r = record(2012, month, airline);
            r.late_aircraft_delay = Some(1.0);
            records.push(r);
        }
        let out = compute_info(&FlightDataset::from_records(records), 2012);
        let keys: Vec<_> = out
            .late_aircraft
            .rows
            .iter()
            .map(|r| (r.month, r.reporting_airline.as_str()))
            .collect();
        assert_eq!(keys, vec![(1, "AA"), (1, "DL"), (1, "UA"), (3, "AA"), (3, "UA")]);
    }

    #[test]
    fn test_blank_carrier_and_nan_are_skipped() {
        let mut blank = record(2010, 2, "");
        blank.security_delay = Some(4.0);
        let mut nan = record(2010, 2, "WN");
        nan.security_delay = Some(f64::NAN);
        nan.nas_delay = Some(8.0);
        let out = compute_info(&FlightDataset::from_records(vec![blank, nan]), 2010);
        assert!(out.security.is_empty());
        assert_eq!(out.nas.rows.len(), 1);
        assert_eq!(out.nas.rows[0].mean_delay, 8.0);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year(" 2010 "), Ok(2010));
        assert_eq!(parse_year(""), Err(YearInputError::Empty));
        assert_eq!(parse_year("   "), Err(YearInputError::Empty));
        assert_eq!(
            parse_year("20x0"),
            Err(YearInputError::NotAnInteger("20x0".into()))
        );
        assert_eq!(
            parse_year("2010.5"),
            Err(YearInputError::NotAnInteger("2010.5".into()))
        );
        assert_eq!(parse_year("2010.0"), Ok(2010));
        assert_eq!(parse_year(" 2011. "), Ok(2011));
        assert_eq!(
            parse_year("inf"),
            Err(YearInputError::NotAnInteger("inf".into()))
        );
        assert_eq!(
            parse_year("1e12"),
            Err(YearInputError::NotAnInteger("1e12".into()))
        );
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_delay() -> impl Strategy<Value = Option<f64>> + Clone {
        prop::option::weighted(0.8, 0.0f64..600.0)
    }

    fn arb_record() -> impl Strategy<Value = DelayRecord> {
        (
            2009i32..=2011,
            1u32..=12,
            prop::sample::select(vec!["AA", "DL", "UA", "WN"]),
            prop::array::uniform5(arb_delay()),
        )
            .prop_map(|(year, month, airline, delays)| {
                let mut r = record(year, month, airline);
                r.carrier_delay = delays[0];
                r.weather_delay = delays[1];
                r.nas_delay = delays[2];
                r.security_delay = delays[3];
                r.late_aircraft_delay = delays[4];
                r
            })
    }

    proptest! {
        #[test]
        fn prop_rows_are_means_of_non_missing_values(
            records in prop::collection::vec(arb_record(), 0..60),
            year in 2009i32..=2011,
        ) {
            let ds = FlightDataset::from_records(records);
            let out = compute_info(&ds, year);

            for series in out.iter() {
                for row in &series.rows {
                    prop_assert!((1..=12).contains(&row.month));
                    let values: Vec<f64> = ds
                        .records()
                        .iter()
                        .filter(|r| r.year == year
                            && r.month == row.month
                            && r.reporting_airline == row.reporting_airline)
                        .filter_map(|r| r.delay(series.cause))
                        .collect();
                    prop_assert!(!values.is_empty());
                    let expected = values.iter().sum::<f64>() / values.len() as f64;
                    prop_assert!((row.mean_delay - expected).abs() < 1e-9);
                }
            }

            // Every group that has a value for a cause shows up for that cause.
            for cause in DelayCause::ALL {
                let mut expected_keys: Vec<(u32, String)> = ds
                    .records()
                    .iter()
                    .filter(|r| r.year == year && r.delay(cause).is_some())
                    .map(|r| (r.month, r.reporting_airline.clone()))
                    .collect();
                expected_keys.sort();
                expected_keys.dedup();
                let keys: Vec<(u32, String)> = out
                    .series(cause)
                    .rows
                    .iter()
                    .map(|r| (r.month, r.reporting_airline.clone()))
                    .collect();
                prop_assert_eq!(keys, expected_keys);
            }
        }

        #[test]
        fn prop_is_idempotent(
            records in prop::collection::vec(arb_record(), 0..40),
            year in 2009i32..=2011,
        ) {
            let ds = FlightDataset::from_records(records);
            prop_assert_eq!(compute_info(&ds, year), compute_info(&ds, year));
        }

        #[test]
        fn prop_year_without_records_is_empty(
            records in prop::collection::vec(arb_record(), 0..40),
            year in 1990i32..2009,
        ) {
            let ds = FlightDataset::from_records(records);
            prop_assert!(compute_info(&ds, year).is_empty());
        }

        #[test]
        fn prop_dropping_one_cause_leaves_others_untouched(
            records in prop::collection::vec(arb_record(), 1..40),
        ) {
            let ds = FlightDataset::from_records(records.clone());
            let without_weather: Vec<_> = records
                .into_iter()
                .map(|mut r| { r.weather_delay = None; r })
                .collect();
            let stripped = FlightDataset::from_records(without_weather);

            let before = compute_info(&ds, 2010);
            let after = compute_info(&stripped, 2010);
            prop_assert!(after.weather.is_empty());
            for cause in [DelayCause::Carrier, DelayCause::Nas, DelayCause::Security, DelayCause::LateAircraft] {
                prop_assert_eq!(before.series(cause), after.series(cause));
            }
        }
    }
}
