pub mod responses;

pub use responses::{KpiCounts, KpiReport};
