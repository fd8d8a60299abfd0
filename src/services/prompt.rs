use crate::models::{InstrumentClass, Timeframe};

/// The exact error object the model is told to emit when the chart's visible
/// timeframe does not match the requested one.
pub const TIMEFRAME_MISMATCH_ERROR: &str =
    "Provided timeframe does not match chart timeframe.";

/// One prompt template shared by every analysis variant. Earlier iterations
/// of this service duplicated the schema text per endpoint and the copies
/// drifted; keeping a single definition parameterized by timeframe and
/// instrument class is what keeps the output contract uniform.
pub fn build_analysis_prompt(timeframe: Timeframe, class: InstrumentClass) -> String {
    let style = match class {
        InstrumentClass::Scalp => "scalping",
        InstrumentClass::Swing => "swing trading",
    };
    let tf = timeframe.as_str();

    format!(
        concat!(
            "You are an expert trading chart analyst using ICT concepts, focused on {style}. ",
            "First, verify that the timeframe displayed on the chart screenshot matches the selected timeframe ({tf}). ",
            "If it does NOT match, respond ONLY with this JSON:\n",
            "{{ \"error\":\"{mismatch}\" }}\n",
            "Otherwise, based on the selected timeframe, respond ONLY with this JSON schema:\n",
            "{{",
            "\"signal\":\"BUY or SELL\", ",
            "\"confidence\":\"int %\", ",
            "\"entry\":\"price\", ",
            "\"stop_loss\":\"price\", ",
            "\"take_profit\":\"price\", ",
            "\"risk_reward_ratio\":\"R:R\", ",
            "\"timeframe\":\"{tf}\", ",
            "\"technical_analysis\":{{",
            "\"RSI\":\"num\",",
            "\"MACD\":\"Bullish/Bearish\",",
            "\"Moving_Average\":\"status\",",
            "\"ICT_Order_Block\":\"Detected/Not Detected\",",
            "\"ICT_Fair_Value_Gap\":\"Detected/Not Detected\",",
            "\"ICT_Breaker_Block\":\"Detected/Not Detected\",",
            "\"ICT_Trendline\":\"Upward/Downward/Neutral\"",
            "}}, ",
            "\"recommendation\":\"text\", ",
            "\"dynamic_stop_loss\":\"calculated based on selected timeframe\", ",
            "\"dynamic_take_profit\":\"calculated based on selected timeframe\" ",
            "}}"
        ),
        style = style,
        tf = tf,
        mismatch = TIMEFRAME_MISMATCH_ERROR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA_KEYS: [&str; 11] = [
        "signal",
        "confidence",
        "entry",
        "stop_loss",
        "take_profit",
        "risk_reward_ratio",
        "timeframe",
        "technical_analysis",
        "recommendation",
        "dynamic_stop_loss",
        "dynamic_take_profit",
    ];

    #[test]
    fn prompt_names_every_schema_key_for_every_variant() {
        for class in [InstrumentClass::Scalp, InstrumentClass::Swing] {
            for &tf in class.allowed_timeframes() {
                let prompt = build_analysis_prompt(tf, class);
                for key in SCHEMA_KEYS {
                    assert!(
                        prompt.contains(&format!("\"{}\"", key)),
                        "missing key {} for {}/{}",
                        key,
                        class,
                        tf
                    );
                }
                assert!(prompt.contains(TIMEFRAME_MISMATCH_ERROR));
                assert!(prompt.contains(&format!("({})", tf.as_str())));
                assert!(prompt.contains(&format!("\"timeframe\":\"{}\"", tf.as_str())));
            }
        }
    }

    #[test]
    fn prompt_mentions_the_instrument_class() {
        assert!(build_analysis_prompt(Timeframe::M5, InstrumentClass::Scalp)
            .contains("scalping"));
        assert!(build_analysis_prompt(Timeframe::D1, InstrumentClass::Swing)
            .contains("swing trading"));
    }
}
