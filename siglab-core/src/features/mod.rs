//! Indicator Engine.
//!
//! Turns a validated bar series into a [`FeatureTable`]: raw bar fields,
//! indicator columns per enabled family, derived context flags, and the
//! forward-looking label.

pub mod engine;
pub mod family;
pub mod label;
pub mod table;

pub use engine::{build_feature_table, required_bars, FeaturePlan};
pub use family::{DerivedFeature, IndicatorFamily};
pub use table::{FeatureColumn, FeatureTable, RAW_COLUMNS};
