use chrono::{Datelike, Utc};

use crate::types::{Band, FactorContribution, FactorKind, VehicleRecord};

/// Weighted-factor risk scoring. Pure: no I/O, no hidden state beyond the
/// year the engine was constructed with.
///
/// Base score 5, five independent integer adjustments, clamped to [1, 10].
/// Higher = more market risk (vehicle likely to sit on the lot).
pub struct RiskEngine {
    /// Injected so tests can pin the age computation to a fixed year.
    current_year: i32,
}

pub const BASELINE_SCORE: i32 = 5;
pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 10;

/// Expected miles accumulated per year of vehicle age. Fixed domain
/// constant — the industry rule-of-thumb 12k miles/year.
pub const AVERAGE_MILES_PER_YEAR: f64 = 12_000.0;

/// Mileage within ±10% of the age-expected value counts as "at" the
/// average and contributes 0.
pub const MILEAGE_TOLERANCE: f64 = 0.10;

impl RiskEngine {
    pub fn new() -> Self {
        Self { current_year: Utc::now().year() }
    }

    /// Engine with a pinned calendar year, for deterministic tests.
    pub fn with_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Score a record. Returns the clamped score and the five factor
    /// contributions in presentation order. Never fails for records that
    /// passed the loader.
    pub fn assess(&self, record: &VehicleRecord) -> (u8, Vec<FactorContribution>) {
        let factors = vec![
            contribution(FactorKind::DaysOnLot, days_on_lot_adjustment(record.days_on_lot)),
            contribution(
                FactorKind::PriceToMarket,
                price_to_market_adjustment(record.price_to_market_percent),
            ),
            contribution(FactorKind::VdpViews, vdp_views_adjustment(record.total_vdps)),
            contribution(FactorKind::Mileage, self.mileage_adjustment(record)),
            contribution(
                FactorKind::SalesOpportunities,
                sales_opportunities_adjustment(record.sales_opportunities),
            ),
        ];

        let sum: i32 = factors.iter().map(|f| f.adjustment).sum();
        let score = (BASELINE_SCORE + sum).clamp(MIN_SCORE, MAX_SCORE) as u8;
        (score, factors)
    }

    /// Mileage relative to age-expected mileage:
    /// `max(current_year - year, 0) * AVERAGE_MILES_PER_YEAR`.
    ///
    /// Zero mileage is the new-vehicle special case (-1) regardless of year.
    /// A current-model-year vehicle with any mileage has expected 0 and
    /// lands above expectation (+1).
    fn mileage_adjustment(&self, record: &VehicleRecord) -> i32 {
        if record.mileage == 0 {
            return -1;
        }
        let age = (self.current_year - record.year).max(0);
        let expected = age as f64 * AVERAGE_MILES_PER_YEAR;
        let mileage = record.mileage as f64;
        if mileage < expected * (1.0 - MILEAGE_TOLERANCE) {
            -1
        } else if mileage <= expected * (1.0 + MILEAGE_TOLERANCE) {
            0
        } else {
            1
        }
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn contribution(factor: FactorKind, adjustment: i32) -> FactorContribution {
    let band = match adjustment {
        a if a < 0 => Band::Low,
        0 => Band::Neutral,
        _ => Band::High,
    };
    FactorContribution { factor, adjustment, band }
}

/// < 15 days: fresh inventory. > 45 days: stale.
fn days_on_lot_adjustment(days: u32) -> i32 {
    if days < 15 {
        -2
    } else if days <= 45 {
        0
    } else {
        2
    }
}

/// ≤ 95%: priced under market. > 105%: priced over market.
fn price_to_market_adjustment(percent: f64) -> i32 {
    if percent <= 95.0 {
        -2
    } else if percent <= 105.0 {
        0
    } else {
        2
    }
}

/// > 200 lifetime views: strong online interest. < 50: weak.
fn vdp_views_adjustment(views: u32) -> i32 {
    if views > 200 {
        -1
    } else if views >= 50 {
        0
    } else {
        1
    }
}

/// > 10 lifetime opportunities: active buyer pipeline. ≤ 2: thin.
fn sales_opportunities_adjustment(opportunities: u32) -> i32 {
    if opportunities > 10 {
        -1
    } else if opportunities >= 3 {
        0
    } else {
        1
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
