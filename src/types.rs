use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// VehicleRecord
// ---------------------------------------------------------------------------

/// One row of the dealer inventory table, keyed by VIN.
/// Immutable after the initial CSV load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// 17-character VIN, uppercased by the loader. Unique key in the store.
    pub vin: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    /// Current asking price in USD. 0.0 means the listing carries no price.
    pub current_price: f64,
    /// Asking price as a percentage of market value (100.0 = at market).
    pub price_to_market_percent: f64,
    pub days_on_lot: u32,
    /// Odometer reading. 0 signifies a new/unused vehicle.
    pub mileage: u32,
    /// Lifetime vehicle-detail-page view count.
    pub total_vdps: u32,
    /// Lifetime sales-opportunity count.
    pub sales_opportunities: u32,
}

// ---------------------------------------------------------------------------
// Risk factors
// ---------------------------------------------------------------------------

/// The five scoring factors, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    DaysOnLot,
    PriceToMarket,
    VdpViews,
    Mileage,
    SalesOpportunities,
}

impl std::fmt::Display for FactorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FactorKind::DaysOnLot => "days on lot",
            FactorKind::PriceToMarket => "price to market",
            FactorKind::VdpViews => "VDP views",
            FactorKind::Mileage => "mileage",
            FactorKind::SalesOpportunities => "sales opportunities",
        };
        write!(f, "{s}")
    }
}

/// Qualitative band a factor fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    /// Pulls the score down — the vehicle is moving well on this dimension.
    Low,
    Neutral,
    /// Pushes the score up — a warning sign on this dimension.
    High,
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Band::Low => "low",
            Band::Neutral => "neutral",
            Band::High => "high",
        };
        write!(f, "{s}")
    }
}

/// One factor's contribution to a score. Owned by the RiskAssessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: FactorKind,
    pub adjustment: i32,
    pub band: Band,
}

// ---------------------------------------------------------------------------
// Assessment output
// ---------------------------------------------------------------------------

/// Which generator produced the summary/reasoning text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    Remote,
    Algorithmic,
}

impl std::fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GenerationSource::Remote => "remote",
            GenerationSource::Algorithmic => "algorithmic",
        };
        write!(f, "{s}")
    }
}

/// Final result of one analysis request. Built once, returned, discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub vin: String,
    /// Clamped to [1, 10].
    pub risk_score: u8,
    /// In the fixed factor presentation order.
    pub factors: Vec<FactorContribution>,
    pub summary: String,
    pub reasoning: String,
    pub source: GenerationSource,
}

// ---------------------------------------------------------------------------
// Store statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Read-only aggregate over the loaded store. Computed once at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStatistics {
    pub total_vehicles: usize,
    /// Distinct makes, sorted.
    pub makes: Vec<String>,
    pub year_range: Option<YearRange>,
    /// Over records with a positive price.
    pub price_range: Option<PriceRange>,
}
