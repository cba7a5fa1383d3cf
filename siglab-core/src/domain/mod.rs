//! Domain types: bars and run identity.

pub mod bar;
pub mod ids;

pub use bar::{validate_series, Bar, BarError};
pub use ids::{CandidateId, DataSource, DatasetHash};
