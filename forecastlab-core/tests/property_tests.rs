//! Property tests for reconciliation invariants.
//!
//! Uses proptest to verify:
//! 1. Group ordering — lead ascending, latest issuance first on equal leads
//! 2. Rank bound — every row carries exactly `k` rank slots
//! 3. Exact deltas — `actual - rank_1` when both exist, null otherwise
//! 4. Output ordering — strictly ascending time, all inside the window
//! 5. Determinism — same input in any order gives the same output

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use forecastlab_core::engine::group;
use forecastlab_core::{
    ActualRecord, ForecastObservation, ForecastRecord, InMemoryStore, ReconciliationService,
    RunParams,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
}

/// Half-hour settlement periods over two days.
fn period_at(slot: i64) -> DateTime<Utc> {
    base() + Duration::minutes(30 * slot)
}

fn arb_price() -> impl Strategy<Value = Decimal> {
    (-5_000i64..50_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_forecast() -> impl Strategy<Value = ForecastObservation> {
    // Few distinct leads and issuance offsets so that ties actually occur.
    (0i64..96, 0i64..8, 0i64..4, arb_price(), arb_price()).prop_map(
        |(slot, lead_steps, issue_jitter, usage, export)| {
            let period = period_at(slot);
            let forecast_lead = Duration::minutes(30 * lead_steps);
            ForecastObservation {
                period,
                forecast_lead,
                forecasted_at: period - forecast_lead - Duration::minutes(5 * issue_jitter),
                usage_price: usage,
                export_price: export,
            }
        },
    )
}

fn arb_actuals() -> impl Strategy<Value = BTreeMap<i64, (Decimal, Decimal)>> {
    prop::collection::btree_map(0i64..96, (arb_price(), arb_price()), 0..40)
}

fn store_of(
    forecasts: &[ForecastObservation],
    actuals: &BTreeMap<i64, (Decimal, Decimal)>,
) -> InMemoryStore {
    InMemoryStore::new(
        forecasts.iter().map(ForecastRecord::from).collect(),
        actuals
            .iter()
            .map(|(slot, (usage, export))| ActualRecord {
                period: Some(period_at(*slot)),
                usage_price: Some(*usage),
                export_price: Some(*export),
            })
            .collect(),
    )
}

/// Reference ordering, written independently of the engine.
fn expected_ranks(
    forecasts: &[ForecastObservation],
    period: DateTime<Utc>,
    k: usize,
) -> Vec<Option<Decimal>> {
    let mut for_period: Vec<_> = forecasts.iter().filter(|f| f.period == period).collect();
    for_period.sort_by_key(|f| {
        (
            f.forecast_lead,
            Reverse(f.forecasted_at),
            f.usage_price,
            f.export_price,
        )
    });
    let mut ranks: Vec<Option<Decimal>> =
        for_period.iter().take(k).map(|f| Some(f.usage_price)).collect();
    ranks.resize(k, None);
    ranks
}

// ── 1. Group ordering ────────────────────────────────────────────────

proptest! {
    #[test]
    fn groups_are_lead_ordered_with_latest_issuance_first(
        forecasts in prop::collection::vec(arb_forecast(), 0..120),
    ) {
        let groups = group(forecasts.clone());
        let total: usize = groups.values().map(|g| g.len()).sum();
        prop_assert_eq!(total, forecasts.len());

        for (period, g) in &groups {
            prop_assert!(!g.is_empty());
            prop_assert_eq!(g.period(), *period);
            for pair in g.ordered_forecasts().windows(2) {
                prop_assert!(pair[0].forecast_lead <= pair[1].forecast_lead);
                if pair[0].forecast_lead == pair[1].forecast_lead {
                    prop_assert!(pair[0].forecasted_at >= pair[1].forecasted_at);
                }
            }
        }
    }
}

// ── 2–4. Run output ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn run_output_invariants(
        forecasts in prop::collection::vec(arb_forecast(), 0..120),
        actuals in arb_actuals(),
        now_slot in 0i64..120,
        window_slots in 1i64..96,
        k in 1usize..6,
    ) {
        let store = store_of(&forecasts, &actuals);
        let service = ReconciliationService::new(&store, &store);
        let now = period_at(now_slot);
        let window = Duration::minutes(30 * window_slots);
        let params = RunParams { window, k };

        let run = service.run(now, &params).unwrap();

        let mut seen = BTreeSet::new();
        let mut prev: Option<DateTime<Utc>> = None;
        for row in &run.rows {
            // Inside window, strictly ascending, no duplicates
            prop_assert!(row.time >= now - window);
            if let Some(p) = prev {
                prop_assert!(row.time > p);
            }
            prev = Some(row.time);
            prop_assert!(seen.insert(row.time));

            // Rank bound
            prop_assert_eq!(row.usage_forecasts.len(), k);
            prop_assert_eq!(row.export_forecasts.len(), k);

            // Ranks match the reference ordering
            prop_assert_eq!(&row.usage_forecasts, &expected_ranks(&forecasts, row.time, k));

            // Exact deltas and null propagation
            match (row.actual_usage_price, row.usage_forecast_1()) {
                (Some(a), Some(f)) => prop_assert_eq!(row.usage_delta, Some(a - f)),
                _ => prop_assert_eq!(row.usage_delta, None),
            }
            match (row.actual_export_price, row.export_forecast_1()) {
                (Some(a), Some(f)) => prop_assert_eq!(row.export_delta, Some(a - f)),
                _ => prop_assert_eq!(row.export_delta, None),
            }
        }

        // Every in-window period with data has a row
        let expected_periods: BTreeSet<_> = forecasts
            .iter()
            .map(|f| f.period)
            .chain(actuals.keys().map(|s| period_at(*s)))
            .filter(|p| *p >= now - window)
            .collect();
        prop_assert_eq!(seen, expected_periods);
    }
}

// ── 5. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn output_is_independent_of_input_order(
        forecasts in prop::collection::vec(arb_forecast(), 0..80),
        actuals in arb_actuals(),
        now_slot in 0i64..120,
    ) {
        let mut reversed = forecasts.clone();
        reversed.reverse();

        let a = store_of(&forecasts, &actuals);
        let b = store_of(&reversed, &actuals);
        let now = period_at(now_slot);

        let run_a = ReconciliationService::new(&a, &a).run(now, &RunParams::default()).unwrap();
        let run_b = ReconciliationService::new(&b, &b).run(now, &RunParams::default()).unwrap();
        let rerun_a = ReconciliationService::new(&a, &a).run(now, &RunParams::default()).unwrap();

        prop_assert_eq!(&run_a.rows, &run_b.rows);
        prop_assert_eq!(run_a.fingerprint(), rerun_a.fingerprint());
    }
}
