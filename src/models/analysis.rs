use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trading horizon tag constraining a chart analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    D1,
    W1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::D1 => "D1",
            Timeframe::W1 => "W1",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analysis variant. Each class accepts its own closed set of timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    Scalp,
    Swing,
}

impl InstrumentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentClass::Scalp => "scalp",
            InstrumentClass::Swing => "swing",
        }
    }

    pub fn allowed_timeframes(&self) -> &'static [Timeframe] {
        match self {
            InstrumentClass::Scalp => &[
                Timeframe::M1,
                Timeframe::M5,
                Timeframe::M15,
                Timeframe::M30,
                Timeframe::H1,
            ],
            InstrumentClass::Swing => &[Timeframe::H1, Timeframe::D1, Timeframe::W1],
        }
    }

    pub fn allows(&self, timeframe: Timeframe) -> bool {
        self.allowed_timeframes().contains(&timeframe)
    }
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

/// The model is asked for numbers but frequently replies with strings like
/// "75%" or "Calculated above the entry". Both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumOrText {
    Num(f64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    #[serde(rename = "RSI")]
    pub rsi: Option<NumOrText>,
    #[serde(rename = "MACD")]
    pub macd: Option<NumOrText>,
    #[serde(rename = "Moving_Average")]
    pub moving_average: Option<NumOrText>,
    #[serde(rename = "ICT_Order_Block")]
    pub ict_order_block: String,
    #[serde(rename = "ICT_Fair_Value_Gap")]
    pub ict_fair_value_gap: String,
    #[serde(rename = "ICT_Breaker_Block")]
    pub ict_breaker_block: String,
    #[serde(rename = "ICT_Trendline")]
    pub ict_trendline: String,
}

/// Typed view of the AI reply. A reply that does not deserialize into this
/// shape is a contract violation and is never returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartAnalysis {
    pub signal: Signal,
    pub confidence: NumOrText,
    pub entry: NumOrText,
    pub stop_loss: NumOrText,
    pub take_profit: NumOrText,
    pub risk_reward_ratio: String,
    pub timeframe: String,
    pub technical_analysis: TechnicalIndicators,
    pub recommendation: String,
    pub dynamic_stop_loss: NumOrText,
    pub dynamic_take_profit: NumOrText,
}

/// One persisted analysis, stored as the validated JSON blob.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub horizon: String,
    pub analysis: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ANALYSIS: &str = r#"{
        "signal": "BUY",
        "confidence": "78%",
        "entry": 3310.5,
        "stop_loss": 3290.0,
        "take_profit": 3355.0,
        "risk_reward_ratio": "1:2.2",
        "timeframe": "D1",
        "technical_analysis": {
            "RSI": 61.4,
            "MACD": "Bullish",
            "Moving_Average": "Above 50 EMA",
            "ICT_Order_Block": "Detected",
            "ICT_Fair_Value_Gap": "Detected",
            "ICT_Breaker_Block": "Not Detected",
            "ICT_Trendline": "Upward"
        },
        "recommendation": "Wait for a retest of the order block before entering.",
        "dynamic_stop_loss": 3288.0,
        "dynamic_take_profit": "Calculated above the previous swing high"
    }"#;

    #[test]
    fn timeframe_serializes_as_uppercase_token() {
        assert_eq!(serde_json::to_string(&Timeframe::D1).unwrap(), "\"D1\"");
        let tf: Timeframe = serde_json::from_str("\"M15\"").unwrap();
        assert_eq!(tf, Timeframe::M15);
    }

    #[test]
    fn scalp_and_swing_accept_disjoint_sets_apart_from_h1() {
        assert!(InstrumentClass::Scalp.allows(Timeframe::M1));
        assert!(InstrumentClass::Scalp.allows(Timeframe::H1));
        assert!(!InstrumentClass::Scalp.allows(Timeframe::D1));
        assert!(InstrumentClass::Swing.allows(Timeframe::H1));
        assert!(InstrumentClass::Swing.allows(Timeframe::W1));
        assert!(!InstrumentClass::Swing.allows(Timeframe::M5));
    }

    #[test]
    fn sample_analysis_matches_schema() {
        let analysis: ChartAnalysis = serde_json::from_str(SAMPLE_ANALYSIS).unwrap();
        assert_eq!(analysis.signal, Signal::Buy);
        assert_eq!(analysis.confidence, NumOrText::Text("78%".to_string()));
        assert_eq!(analysis.entry, NumOrText::Num(3310.5));
        assert_eq!(analysis.timeframe, "D1");
        assert_eq!(analysis.technical_analysis.ict_order_block, "Detected");
    }

    #[test]
    fn analysis_without_signal_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_ANALYSIS).unwrap();
        value.as_object_mut().unwrap().remove("signal");
        assert!(serde_json::from_value::<ChartAnalysis>(value).is_err());
    }

    #[test]
    fn analysis_with_wrong_signal_token_is_rejected() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_ANALYSIS).unwrap();
        value["signal"] = serde_json::json!("HOLD");
        assert!(serde_json::from_value::<ChartAnalysis>(value).is_err());
    }
}
