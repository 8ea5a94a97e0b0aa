mod api;
mod config;
mod error;
mod processing;
mod session;
mod store;
mod types;
mod utils;

#[cfg(test)]
mod test_support;

pub use config::*;
pub use error::{ErrorKind, GiosError};

pub use api::client::ApiClient;
pub use api::error::ApiError;
pub use api::payload::{RawPayload, SensorList};
pub use api::status::{RequestKind, StatusEvent};

pub use store::error::StoreError;
pub use store::file_name::{dataset_file_name, sanitize_timestamp, CacheFileName};
pub use store::local_store::*;

pub use processing::frame::SeriesLazyFrame;
pub use processing::range::{map_range_to_timestamps, RangeSelection};
pub use processing::series::parse_series;
pub use processing::statistics::{compute_statistics, Statistics, Summary};
pub use processing::trend::{classify_trend, Trend, STABLE_RELATIVE_DELTA};

pub use session::controller::SessionController;
pub use session::state::{RequestTicket, SensorHandle, SessionState};

pub use types::dataset::{DatasetOrigin, SensorDataset};
pub use types::measurement::{Measurement, MeasurementSeries, RawMeasurementPayload, API_DATE_FORMAT};
pub use types::name_index::NameIndex;
pub use types::sensor::Sensor;
pub use types::station::Station;
