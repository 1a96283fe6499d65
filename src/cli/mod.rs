//! Terminal front end of the converter

pub mod convert;
pub mod currencies;
pub mod interactive;
pub mod setup;
pub mod ui;
