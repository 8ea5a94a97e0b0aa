use crate::api::error::ApiError;
use crate::api::payload::RawPayload;
use crate::api::status::{RequestKind, StatusEvent};
use crate::config::GiosConfig;
use crate::types::measurement::RawMeasurementPayload;
use crate::types::sensor::Sensor;
use crate::types::station::Station;
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::Value;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Async client for the three read-only GIOŚ endpoints.
///
/// Every request resolves to exactly one `Ok` payload or `Err`; progress
/// strings go to the optional status channel. Requests are never retried.
/// Cloning is cheap and clones share the connection pool, so several requests
/// can be in flight at once; they are not coalesced.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    probe_host: String,
    probe_port: u16,
    probe_timeout: Duration,
    status_tx: Option<UnboundedSender<StatusEvent>>,
}

impl ApiClient {
    pub fn new(config: &GiosConfig) -> Self {
        ApiClient {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            probe_host: config.probe_host.clone(),
            probe_port: config.probe_port,
            probe_timeout: config.probe_timeout,
            status_tx: None,
        }
    }

    /// Like [`ApiClient::new`], plus the receiving end of the status stream.
    pub fn with_status_channel(config: &GiosConfig) -> (Self, UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut client = Self::new(config);
        client.status_tx = Some(tx);
        (client, rx)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn status(&self, request: RequestKind, message: String) {
        debug!("{}", message);
        if let Some(tx) = &self.status_tx {
            // A dropped receiver only means nobody is listening anymore.
            let _ = tx.send(StatusEvent { request, message });
        }
    }

    /// `GET /station/findAll`, flattened into [`Station`]s.
    pub async fn fetch_all_stations(&self) -> Result<Vec<Station>, ApiError> {
        let request = RequestKind::Stations;
        self.status(request, "Fetching station list...".to_string());

        let url = format!("{}/station/findAll", self.base_url);
        let stations = self
            .get_payload(&url)
            .await?
            .into_station_list()
            .map_err(|reason| ApiError::UnexpectedShape { url, reason })?;

        info!("Fetched {} stations", stations.len());
        self.status(request, format!("Fetched {} stations", stations.len()));
        Ok(stations)
    }

    /// `GET /station/sensors/{id}`. Array and `{data: [...]}` responses are
    /// both accepted.
    pub async fn fetch_station_sensors(&self, station_id: i64) -> Result<Vec<Sensor>, ApiError> {
        let request = RequestKind::StationSensors(station_id);
        self.status(request, format!("Searching sensors of station {}...", station_id));

        let url = format!("{}/station/sensors/{}", self.base_url, station_id);
        let sensors = self
            .get_payload(&url)
            .await?
            .into_sensor_list()
            .map_err(|reason| ApiError::UnexpectedShape { url, reason })?
            .data;

        self.status(
            request,
            format!("Found {} sensors of station {}", sensors.len(), station_id),
        );
        Ok(sensors)
    }

    /// `GET /data/getData/{id}`, returned verbatim apart from shape normalization.
    pub async fn fetch_sensor_measurements(
        &self,
        sensor_id: i64,
    ) -> Result<RawMeasurementPayload, ApiError> {
        let request = RequestKind::SensorData(sensor_id);
        self.status(request, format!("Searching data of sensor {}...", sensor_id));

        let url = format!("{}/data/getData/{}", self.base_url, sensor_id);
        let payload = self
            .get_payload(&url)
            .await?
            .into_measurements()
            .map_err(|reason| ApiError::UnexpectedShape { url, reason })?;

        self.status(
            request,
            format!(
                "Fetched {} records of sensor {}",
                payload.values.len(),
                sensor_id
            ),
        );
        Ok(payload)
    }

    async fn get_payload(&self, url: &str) -> Result<RawPayload, ApiError> {
        info!("Requesting {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::network(url, e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    ApiError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    ApiError::network(url, e)
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(url, e))?;

        let value: Value = serde_json::from_slice(&body).map_err(|source| ApiError::JsonParse {
            url: url.to_string(),
            source,
        })?;

        RawPayload::try_from(value).map_err(|reason| ApiError::UnexpectedShape {
            url: url.to_string(),
            reason,
        })
    }

    /// Opens a plain TCP connection to the probe host to tell whether the
    /// network is reachable at all. Blocks for at most the probe timeout
    /// (plus name resolution) and never touches the API.
    pub fn check_connection(&self) -> bool {
        let deadline = Instant::now() + self.probe_timeout;
        let addrs = match (self.probe_host.as_str(), self.probe_port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                warn!("Could not resolve {}: {}", self.probe_host, e);
                return false;
            }
        };

        for addr in addrs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if TcpStream::connect_timeout(&addr, remaining).is_ok() {
                return true;
            }
        }
        warn!(
            "No connection to {}:{} within {:?}",
            self.probe_host, self.probe_port, self.probe_timeout
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{closed_base_url, MockApi};
    use serde_json::json;

    fn config_for(base_url: String) -> GiosConfig {
        GiosConfig::builder().base_url(base_url).build()
    }

    #[tokio::test]
    async fn test_fetch_all_stations_flattens() -> Result<(), ApiError> {
        let api = MockApi::start(vec![(
            "/station/findAll",
            200,
            json!([
                {"id": 1, "stationName": "ul. A", "city": {"commune": {
                    "communeName": "Gdańsk", "districtName": "Gdańsk", "provinceName": "POMORSKIE"}}},
                {"id": 2, "stationName": "ul. B"}
            ])
            .to_string(),
        )])
        .await;
        let (client, mut status) = ApiClient::with_status_channel(&config_for(api.base_url()));

        let stations = client.fetch_all_stations().await?;
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].city, "Gdańsk");
        assert_eq!(stations[1].id, 2);
        assert_eq!(stations[1].city, "");

        assert_eq!(status.recv().await.map(|e| e.request), Some(RequestKind::Stations));
        assert_eq!(status.recv().await.map(|e| e.message), Some("Fetched 2 stations".to_string()));
        assert!(status.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_stations_object_is_format_error() {
        let api = MockApi::start(vec![("/station/findAll", 200, json!({"a": 1}).to_string())]).await;
        let client = ApiClient::new(&config_for(api.base_url()));
        let err = client.fetch_all_stations().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let api = MockApi::start(vec![("/station/findAll", 200, "<html>".to_string())]).await;
        let client = ApiClient::new(&config_for(api.base_url()));
        let err = client.fetch_all_stations().await.unwrap_err();
        assert!(matches!(err, ApiError::JsonParse { .. }));
        assert!(err.to_string().starts_with("Format error"));
    }

    #[tokio::test]
    async fn test_sensors_array_and_object() -> Result<(), ApiError> {
        let sensors = json!([{"id": 5, "param": {"paramName": "benzen", "paramCode": "C6H6"}}]);
        let api = MockApi::start(vec![
            ("/station/sensors/1", 200, sensors.to_string()),
            ("/station/sensors/2", 200, json!({ "data": sensors }).to_string()),
            ("/station/sensors/3", 200, json!("nope").to_string()),
        ])
        .await;
        let client = ApiClient::new(&config_for(api.base_url()));

        let from_array = client.fetch_station_sensors(1).await?;
        let from_object = client.fetch_station_sensors(2).await?;
        assert_eq!(from_array, from_object);
        assert_eq!(from_array[0].param_code, "C6H6");

        let err = client.fetch_station_sensors(3).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        Ok(())
    }

    #[tokio::test]
    async fn test_measurements_and_status_sequence() -> Result<(), ApiError> {
        let body = json!({
            "key": "PM10",
            "values": [
                {"date": "2024-01-02 11:00:00", "value": null},
                {"date": "2024-01-02 10:00:00", "value": 31.2}
            ]
        });
        let api = MockApi::start(vec![("/data/getData/92", 200, body.to_string())]).await;
        let (client, mut status) = ApiClient::with_status_channel(&config_for(api.base_url()));

        let payload = client.fetch_sensor_measurements(92).await?;
        assert_eq!(payload.key, "PM10");
        assert_eq!(serde_json::to_value(&payload.values).unwrap(), body["values"]);

        let first = status.recv().await.unwrap();
        assert_eq!(first.request, RequestKind::SensorData(92));
        assert_eq!(first.message, "Searching data of sensor 92...");
        let second = status.recv().await.unwrap();
        assert_eq!(second.message, "Fetched 2 records of sensor 92");
        Ok(())
    }

    #[tokio::test]
    async fn test_http_error_and_unreachable_host() {
        let api = MockApi::start(vec![]).await;
        let (client, mut status) = ApiClient::with_status_channel(&config_for(api.base_url()));
        let err = client.fetch_sensor_measurements(1).await.unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status, .. } if status.as_u16() == 404));
        assert_eq!(err.kind(), ErrorKind::Network);
        // Only the "searching" status, no success status.
        assert!(status.recv().await.is_some());
        assert!(status.try_recv().is_err());

        let client = ApiClient::new(&config_for(closed_base_url()));
        let err = client.fetch_all_stations().await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkRequest { .. }));
        assert!(err.to_string().starts_with("Network error for"));
    }

    #[tokio::test]
    async fn test_network_error_names_transport_cause() {
        let client = ApiClient::new(&config_for(closed_base_url()));
        let err = client.fetch_all_stations().await.unwrap_err();

        let root_cause = std::iter::successors(std::error::Error::source(&err), |e| e.source())
            .last()
            .map(|e| e.to_string())
            .expect("request error has a source");

        let message = err.to_string();
        assert!(
            message.contains(&root_cause),
            "'{}' does not mention '{}'",
            message,
            root_cause
        );
        assert!(message.to_lowercase().contains("refused"), "{}", message);
    }

    #[test]
    fn test_check_connection() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let reachable = GiosConfig::builder()
            .probe_host("127.0.0.1")
            .probe_port(port)
            .probe_timeout(Duration::from_secs(1))
            .build();
        assert!(ApiClient::new(&reachable).check_connection());

        drop(listener);
        assert!(!ApiClient::new(&reachable).check_connection());
    }
}
