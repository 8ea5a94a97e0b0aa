pub mod frame;
pub mod range;
pub mod series;
pub mod statistics;
pub mod trend;
