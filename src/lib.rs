pub mod breakdown;
pub mod fetch;
pub mod output;
pub mod records;
pub mod schedule;
pub mod stats;
