pub mod candle;
pub mod clock;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod signal;
pub mod traits;

pub use candle::{closes, volumes, Candle, Interval};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ExchangeConfig, RiskConfig, ScannerConfig, TelegramConfig};
pub use config_loader::ConfigLoader;
pub use error::ConfigError;
pub use signal::{
    Confidence, Direction, EntryCandidate, RegimeAssessment, RegimeState, RiskLevels,
    SignalRecord, TrendLabel,
};
pub use traits::{MarketDataProvider, MessageFormat, Notifier};
