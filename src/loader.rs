use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::store::VehicleStore;
use crate::types::VehicleRecord;

#[derive(Debug, Default)]
pub struct LoadStats {
    pub rows_total: usize,
    pub rejected_no_vin: usize,
    pub rejected_no_year: usize,
    pub rejected_no_make_model: usize,
    pub loaded: usize,
}

/// Expected CSV column headers, as exported by the inventory tool.
const COL_VIN: &str = "VIN";
const COL_YEAR: &str = "Year";
const COL_MAKE: &str = "Make";
const COL_MODEL: &str = "Model";
const COL_PRICE: &str = "Current price";
const COL_PRICE_TO_MARKET: &str = "Current price to market %";
const COL_DOL: &str = "DOL";
const COL_MILEAGE: &str = "Mileage";
const COL_VDPS: &str = "Total VDPs (lifetime)";
const COL_OPPORTUNITIES: &str = "Total sales opportunities (lifetime)";

/// Load the inventory CSV into a read-only store. Rows missing VIN, year,
/// make, or model are skipped and counted; dirty numeric fields ("$25,000",
/// "98%", "-") are cleaned to plain numbers. An unreadable file or a file
/// that yields zero records is fatal — the service must not come up with an
/// empty store.
pub fn load_store(csv_path: &str) -> Result<(Arc<VehicleStore>, LoadStats)> {
    if !Path::new(csv_path).exists() {
        return Err(AppError::StoreUnavailable(format!("CSV file not found: {csv_path}")));
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let headers = reader.headers()?.clone();
    let col = |name: &str| headers.iter().position(|h| h.trim() == name);

    let idx_vin = col(COL_VIN);
    let idx_year = col(COL_YEAR);
    let idx_make = col(COL_MAKE);
    let idx_model = col(COL_MODEL);
    let idx_price = col(COL_PRICE);
    let idx_ptm = col(COL_PRICE_TO_MARKET);
    let idx_dol = col(COL_DOL);
    let idx_mileage = col(COL_MILEAGE);
    let idx_vdps = col(COL_VDPS);
    let idx_opps = col(COL_OPPORTUNITIES);

    let mut records = Vec::new();
    let mut stats = LoadStats::default();

    for (row_num, row) in reader.records().enumerate() {
        let row = row?;
        stats.rows_total += 1;
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("").trim();

        let vin = field(idx_vin).to_uppercase();
        if vin.is_empty() {
            stats.rejected_no_vin += 1;
            warn!("skipping row {}: missing VIN", row_num + 2);
            continue;
        }

        let year = clean_integer(field(idx_year)) as i32;
        if year == 0 {
            stats.rejected_no_year += 1;
            warn!("skipping row {}: missing year", row_num + 2);
            continue;
        }

        let make = field(idx_make).to_uppercase();
        let model = field(idx_model).to_uppercase();
        if make.is_empty() || model.is_empty() {
            stats.rejected_no_make_model += 1;
            warn!("skipping row {}: missing make/model", row_num + 2);
            continue;
        }

        records.push(VehicleRecord {
            vin,
            year,
            make,
            model,
            current_price: clean_price(field(idx_price)),
            price_to_market_percent: clean_percentage(field(idx_ptm)),
            days_on_lot: clean_integer(field(idx_dol)),
            mileage: clean_integer(field(idx_mileage)),
            total_vdps: clean_integer(field(idx_vdps)),
            sales_opportunities: clean_integer(field(idx_opps)),
        });
    }

    stats.loaded = records.len();
    if records.is_empty() {
        return Err(AppError::StoreUnavailable(format!(
            "no usable vehicle rows in {csv_path} ({} rows read)",
            stats.rows_total
        )));
    }

    info!("Loaded {} vehicles from {csv_path}", stats.loaded);
    Ok((VehicleStore::new(records), stats))
}

/// "$25,000" → 25000.0. Dashes and empty cells mean no price → 0.0.
pub fn clean_price(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ',' | ' ')).collect();
    if cleaned.is_empty() || cleaned == "-" {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0).max(0.0)
}

/// "98%" → 98.0. Dashes and empty cells → 0.0.
pub fn clean_percentage(raw: &str) -> f64 {
    let cleaned = raw.trim().trim_end_matches('%').trim();
    if cleaned.is_empty() || cleaned == "-" {
        return 0.0;
    }
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// "50,000" → 50000. Anything unparseable (including negatives, which the
/// store must never contain) → 0.
pub fn clean_integer(raw: &str) -> u32 {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | ' ')).collect();
    if cleaned.is_empty() || cleaned == "-" {
        return 0;
    }
    cleaned.parse::<u32>().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
