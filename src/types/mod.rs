pub mod dataset;
pub mod measurement;
pub mod name_index;
pub mod sensor;
pub mod station;
