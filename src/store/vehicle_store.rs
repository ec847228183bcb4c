use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::types::{DatabaseStatistics, PriceRange, VehicleRecord, YearRange};

// ---------------------------------------------------------------------------
// VehicleStore
// ---------------------------------------------------------------------------

/// In-memory inventory table keyed by VIN. Built once by the loader and
/// immutable for the process lifetime, so concurrent handlers read it
/// through a plain `Arc` without any locking.
#[derive(Debug)]
pub struct VehicleStore {
    /// vin → record. Keys are uppercased 17-character VINs.
    vehicles: HashMap<String, VehicleRecord>,
    /// Aggregates computed at build time; never recomputed since the
    /// store cannot change underneath them.
    statistics: DatabaseStatistics,
}

impl VehicleStore {
    pub fn new(records: Vec<VehicleRecord>) -> Arc<Self> {
        let statistics = compute_statistics(&records);
        let vehicles = records.into_iter().map(|r| (r.vin.clone(), r)).collect();
        Arc::new(Self { vehicles, statistics })
    }

    /// Exact-match retrieval. The caller is responsible for VIN shape
    /// validation and uppercasing; no fuzzy matching happens here.
    pub fn lookup(&self, vin: &str) -> Option<&VehicleRecord> {
        self.vehicles.get(vin)
    }

    /// Existence check without handing out the record.
    pub fn exists(&self, vin: &str) -> bool {
        self.vehicles.contains_key(vin)
    }

    pub fn statistics(&self) -> &DatabaseStatistics {
        &self.statistics
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

fn compute_statistics(records: &[VehicleRecord]) -> DatabaseStatistics {
    let makes: BTreeSet<String> = records.iter().map(|r| r.make.clone()).collect();

    let year_range = records
        .iter()
        .map(|r| r.year)
        .fold(None::<YearRange>, |acc, year| match acc {
            None => Some(YearRange { min: year, max: year }),
            Some(range) => Some(YearRange {
                min: range.min.min(year),
                max: range.max.max(year),
            }),
        });

    // Zero-priced listings are "no price" markers, not free cars.
    let prices: Vec<f64> = records
        .iter()
        .map(|r| r.current_price)
        .filter(|&p| p > 0.0)
        .collect();
    let price_range = if prices.is_empty() {
        None
    } else {
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = prices.iter().sum::<f64>() / prices.len() as f64;
        Some(PriceRange { min, max, avg })
    };

    DatabaseStatistics {
        total_vehicles: records.len(),
        makes: makes.into_iter().collect(),
        year_range,
        price_range,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(vin: &str, make: &str, year: i32, price: f64) -> VehicleRecord {
        VehicleRecord {
            vin: vin.to_string(),
            year,
            make: make.to_string(),
            model: "MODEL".to_string(),
            current_price: price,
            price_to_market_percent: 100.0,
            days_on_lot: 20,
            mileage: 40_000,
            total_vdps: 100,
            sales_opportunities: 5,
        }
    }

    #[test]
    fn lookup_hit_returns_the_fixture_record() {
        let fixture = record("1HGCM82633A123456", "HONDA", 2020, 25_000.0);
        let store = VehicleStore::new(vec![fixture.clone()]);
        assert_eq!(store.lookup("1HGCM82633A123456"), Some(&fixture));
    }

    #[test]
    fn lookup_miss_returns_none() {
        let store = VehicleStore::new(vec![record("1HGCM82633A123456", "HONDA", 2020, 25_000.0)]);
        assert!(store.lookup("9XXXX99999X999999").is_none());
        assert!(!store.exists("9XXXX99999X999999"));
        assert!(store.exists("1HGCM82633A123456"));
    }

    #[test]
    fn statistics_over_two_records() {
        let store = VehicleStore::new(vec![
            record("1HGCM82633A123456", "HONDA", 2018, 10_000.0),
            record("2HGCM82633A123457", "TOYOTA", 2021, 20_000.0),
        ]);
        let stats = store.statistics();
        assert_eq!(stats.total_vehicles, 2);
        assert_eq!(stats.makes, vec!["HONDA".to_string(), "TOYOTA".to_string()]);
        assert_eq!(stats.year_range, Some(YearRange { min: 2018, max: 2021 }));
        let prices = stats.price_range.unwrap();
        assert_eq!(prices.min, 10_000.0);
        assert_eq!(prices.max, 20_000.0);
        assert_eq!(prices.avg, 15_000.0);
    }

    #[test]
    fn zero_priced_records_are_excluded_from_price_range() {
        let store = VehicleStore::new(vec![
            record("1HGCM82633A123456", "HONDA", 2020, 0.0),
            record("2HGCM82633A123457", "HONDA", 2020, 12_000.0),
        ]);
        let prices = store.statistics().price_range.unwrap();
        assert_eq!(prices.min, 12_000.0);
        assert_eq!(prices.avg, 12_000.0);
    }

    #[test]
    fn empty_store_has_empty_statistics() {
        let store = VehicleStore::new(Vec::new());
        let stats = store.statistics();
        assert_eq!(stats.total_vehicles, 0);
        assert!(stats.makes.is_empty());
        assert!(stats.year_range.is_none());
        assert!(stats.price_range.is_none());
    }
}
