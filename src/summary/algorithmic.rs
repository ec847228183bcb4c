use async_trait::async_trait;

use crate::error::Result;
use crate::risk::BASELINE_SCORE;
use crate::summary::{GeneratedText, SummaryGenerator};
use crate::types::{Band, FactorContribution, VehicleRecord};

/// Deterministic templated generation. The guaranteed-available terminal
/// fallback: never fails for any well-formed input.
pub struct AlgorithmicGenerator;

impl AlgorithmicGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        record: &VehicleRecord,
        score: u8,
        factors: &[FactorContribution],
    ) -> GeneratedText {
        GeneratedText {
            summary: build_summary(record, score, factors),
            reasoning: build_reasoning(score, factors),
        }
    }
}

impl Default for AlgorithmicGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryGenerator for AlgorithmicGenerator {
    async fn generate(
        &self,
        record: &VehicleRecord,
        score: u8,
        factors: &[FactorContribution],
    ) -> Result<GeneratedText> {
        Ok(self.render(record, score, factors))
    }
}

fn risk_level(score: u8) -> &'static str {
    match score {
        1..=3 => "low",
        4..=6 => "moderate",
        _ => "high",
    }
}

/// The factor(s) with the largest absolute adjustment drive the headline.
fn dominant_factors(factors: &[FactorContribution]) -> Vec<&FactorContribution> {
    let max_magnitude = factors.iter().map(|f| f.adjustment.abs()).max().unwrap_or(0);
    if max_magnitude == 0 {
        return Vec::new();
    }
    factors.iter().filter(|f| f.adjustment.abs() == max_magnitude).collect()
}

fn build_summary(record: &VehicleRecord, score: u8, factors: &[FactorContribution]) -> String {
    let vehicle = format!("{} {} {}", record.year, record.make, record.model);
    let dominant = dominant_factors(factors);

    if dominant.is_empty() {
        return format!(
            "This {vehicle} sits at a {} market risk of {score}/10, with every \
             factor in its neutral band.",
            risk_level(score)
        );
    }

    let drivers: Vec<String> = dominant
        .iter()
        .map(|f| format!("{} ({})", f.factor, f.band))
        .collect();
    format!(
        "This {vehicle} carries a {} market risk of {score}/10, driven mainly by {}.",
        risk_level(score),
        drivers.join(" and ")
    )
}

fn build_reasoning(score: u8, factors: &[FactorContribution]) -> String {
    let mut parts = vec![format!("Baseline score {BASELINE_SCORE}.")];
    for f in factors {
        let sentence = match f.band {
            Band::Neutral => format!("{} is in the neutral band (0).", capitalize(&f.factor.to_string())),
            _ => format!(
                "{} falls in the {} band ({}{}).",
                capitalize(&f.factor.to_string()),
                f.band,
                if f.adjustment > 0 { "+" } else { "" },
                f.adjustment
            ),
        };
        parts.push(sentence);
    }
    parts.push(format!("Final score clamped to {score}/10."));
    parts.join(" ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
