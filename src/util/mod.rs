//! Utility modules for modmap

pub mod logging;

pub use logging::{init_logging, parse_level, LoggingConfig};
