//! Core conversion logic and abstractions

pub mod config;
pub mod controller;
pub mod conversion;
pub mod currency;
pub mod format;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use controller::{ControllerHandle, ConversionController, InputEvent, Snapshot, ViewState};
pub use conversion::{Conversion, ConversionFailed, ConversionInputs, ConversionRequest};
pub use currency::CurrencyCode;
pub use rates::{RateProvider, RateTable};
