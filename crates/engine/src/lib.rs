//! Signal-detection engine: volatility regime, higher-timeframe trend,
//! EMA bounce entries, and risk levels, sequenced per instrument with a
//! cooldown.

pub mod cooldown;
pub mod entry;
pub mod error;
pub mod formatter;
pub mod indicators;
pub mod orchestrator;
pub mod regime;
pub mod risk;
pub mod scanner;
pub mod trend;

pub use cooldown::CooldownTracker;
pub use entry::{BounceSnapshot, EntryConfig, EMA_BOUNCE};
pub use error::{AnalysisError, ScanError};
pub use formatter::{SignalFormatter, QUALITY_SCALE};
pub use orchestrator::{EngineConfig, Evaluation, NoSetupReason, ScanOutcome, SignalEngine};
pub use regime::RegimeConfig;
pub use risk::{RiskCalculator, RiskTable, DEFAULT_STOP_MULTIPLIER};
pub use scanner::{InstrumentReport, PassSummary, Scanner};
pub use trend::TrendConfig;
