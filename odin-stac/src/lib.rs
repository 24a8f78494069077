pub mod catalog;
#[cfg(feature = "api")]
pub mod client;
pub mod collection;
pub mod date_range;
pub mod error;
pub mod imagery;
pub mod item;
pub mod point;
pub mod source;
pub mod timeseries;
