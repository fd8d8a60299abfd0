mod alert;
mod analysis;
mod price;

pub use alert::{AlertDirection, CreatePriceAlert, PriceAlert};
pub use analysis::{
    AnalysisRecord, ChartAnalysis, InstrumentClass, NumOrText, Signal, TechnicalIndicators,
    Timeframe,
};
pub use price::PairPrice;
