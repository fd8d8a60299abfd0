pub mod chart_analyzer;
pub mod gemini;
pub mod mock_provider;
pub mod price_provider;
pub mod twelvedata;
