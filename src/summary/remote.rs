use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::{ANTHROPIC_VERSION, LLM_MAX_TOKENS};
use crate::error::{AppError, Result};
use crate::summary::{GeneratedText, SummaryGenerator};
use crate::types::{FactorContribution, VehicleRecord};

const SYSTEM_PROMPT: &str = "You are an expert automotive risk analyst. Generate a JSON \
response with a vehicle market risk assessment. Be concise and professional. \
Respond with valid JSON only, with exactly two string fields: \"summary\" and \"reasoning\".";

/// Summary generation over the Anthropic messages API.
///
/// Exactly one attempt per analysis request: the call is charged and
/// externally rate-limited, so the orchestrator never retries — any
/// network error, non-success status, timeout, or malformed/empty
/// response is a failure and the caller falls back.
pub struct RemoteGenerator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl RemoteGenerator {
    pub fn new(api_url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl SummaryGenerator for RemoteGenerator {
    async fn generate(
        &self,
        record: &VehicleRecord,
        score: u8,
        factors: &[FactorContribution],
    ) -> Result<GeneratedText> {
        let prompt = build_prompt(record, score, factors);
        debug!(vin = %record.vin, "requesting remote summary");

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": LLM_MAX_TOKENS,
            "temperature": 0.3,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Generation(format!(
                "generation API returned status {}",
                response.status()
            )));
        }

        let message: MessagesResponse = response.json().await?;
        let text = message
            .content
            .first()
            .map(|block| block.text.trim())
            .unwrap_or("");

        parse_generated_text(text)
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Structured prompt carrying the VIN, vehicle attributes, the computed
/// score, and each factor's band. The model writes prose around numbers
/// we already computed — it never re-scores.
pub fn build_prompt(record: &VehicleRecord, score: u8, factors: &[FactorContribution]) -> String {
    let mut factor_lines = String::new();
    for f in factors {
        factor_lines.push_str(&format!(
            "- {}: {} band, adjustment {}{}\n",
            f.factor,
            f.band,
            if f.adjustment > 0 { "+" } else { "" },
            f.adjustment
        ));
    }

    format!(
        "Vehicle under assessment:\n\
         - VIN: {}\n\
         - Vehicle: {} {} {}\n\
         - Current price: ${:.0}\n\
         - Price to market: {:.1}%\n\
         - Days on lot: {}\n\
         - Mileage: {}\n\
         - Lifetime VDP views: {}\n\
         - Lifetime sales opportunities: {}\n\n\
         Computed market risk score: {score}/10 (1 = low risk, 10 = high risk).\n\
         Factor contributions:\n{factor_lines}\n\
         Write a JSON object with two fields:\n\
         \"summary\": one or two sentences describing this vehicle's market position.\n\
         \"reasoning\": a short explanation of the score in terms of the factor bands above.",
        record.vin,
        record.year,
        record.make,
        record.model,
        record.current_price,
        record.price_to_market_percent,
        record.days_on_lot,
        record.mileage,
        record.total_vdps,
        record.sales_opportunities,
    )
}

/// Parse the model's text into summary/reasoning. Accepts a bare JSON
/// object, or extracts the outermost `{..}` span when the model wraps the
/// JSON in prose. Missing or empty fields are failures.
pub fn parse_generated_text(text: &str) -> Result<GeneratedText> {
    if text.is_empty() {
        return Err(AppError::Generation("empty response text".to_string()));
    }

    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            let start = text.find('{');
            let end = text.rfind('}');
            match (start, end) {
                (Some(s), Some(e)) if s < e => serde_json::from_str(&text[s..=e])
                    .map_err(|_| AppError::Generation("response is not valid JSON".to_string()))?,
                _ => {
                    return Err(AppError::Generation(
                        "no JSON object in response text".to_string(),
                    ))
                }
            }
        }
    };

    let field = |name: &str| -> Result<String> {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Generation(format!("missing '{name}' field in response")))
    };

    Ok(GeneratedText { summary: field("summary")?, reasoning: field("reasoning")? })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Band, FactorKind};

    fn record() -> VehicleRecord {
        VehicleRecord {
            vin: "1HGCM82633A123456".to_string(),
            year: 2018,
            make: "HONDA".to_string(),
            model: "ACCORD".to_string(),
            current_price: 25_000.0,
            price_to_market_percent: 95.0,
            days_on_lot: 25,
            mileage: 50_000,
            total_vdps: 150,
            sales_opportunities: 5,
        }
    }

    #[test]
    fn prompt_carries_vehicle_score_and_bands() {
        let factors = vec![FactorContribution {
            factor: FactorKind::DaysOnLot,
            adjustment: 2,
            band: Band::High,
        }];
        let prompt = build_prompt(&record(), 7, &factors);
        assert!(prompt.contains("1HGCM82633A123456"));
        assert!(prompt.contains("2018 HONDA ACCORD"));
        assert!(prompt.contains("7/10"));
        assert!(prompt.contains("days on lot: high band, adjustment +2"));
    }

    #[test]
    fn parses_strict_json() {
        let text = r#"{"summary": "Solid seller.", "reasoning": "Neutral everywhere."}"#;
        let parsed = parse_generated_text(text).unwrap();
        assert_eq!(parsed.summary, "Solid seller.");
        assert_eq!(parsed.reasoning, "Neutral everywhere.");
    }

    #[test]
    fn extracts_json_wrapped_in_prose() {
        let text = "Here is the assessment:\n{\"summary\": \"S\", \"reasoning\": \"R\"}\nHope that helps.";
        let parsed = parse_generated_text(text).unwrap();
        assert_eq!(parsed.summary, "S");
        assert_eq!(parsed.reasoning, "R");
    }

    #[test]
    fn missing_field_is_a_failure() {
        let err = parse_generated_text(r#"{"summary": "S"}"#).unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[test]
    fn empty_field_is_a_failure() {
        let err =
            parse_generated_text(r#"{"summary": "  ", "reasoning": "R"}"#).unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[test]
    fn empty_text_is_a_failure() {
        assert!(parse_generated_text("").is_err());
    }

    #[test]
    fn plain_prose_is_a_failure() {
        assert!(parse_generated_text("The vehicle looks fine to me.").is_err());
    }
}
