//! The session controller drives the stations → sensors → data sequence on
//! behalf of a front end, and owns everything a front end displays: the
//! station name index, the sensor list of the selected station and the
//! current dataset.

use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::status::RequestKind;
use crate::config::GiosConfig;
use crate::error::GiosError;
use crate::processing::statistics::{compute_statistics, Statistics};
use crate::processing::trend::{classify_trend, Trend};
use crate::session::state::{RequestTicket, SensorHandle, SessionState};
use crate::store::local_store::{LocalStore, SaveOutcome};
use crate::types::dataset::{DatasetOrigin, SensorDataset};
use crate::types::measurement::RawMeasurementPayload;
use crate::types::name_index::NameIndex;
use crate::types::sensor::Sensor;
use crate::types::station::Station;
use bon::bon;
use chrono::NaiveDateTime;
use log::{info, warn};
use std::path::PathBuf;

/// Stateful entry point of the crate.
///
/// Every request can be run in one go with the async methods
/// ([`SessionController::start`], [`SessionController::select_city`],
/// [`SessionController::select_sensor`]), or split into a `begin_*` call that
/// returns a [`RequestTicket`] and a `complete_*` call that applies the
/// result. The split form lets a front end keep several requests in flight;
/// whichever completes last wins.
///
/// Failed requests move the session into [`SessionState::Error`] and leave
/// the previously loaded data untouched.
///
/// # Examples
///
/// ```rust,no_run
/// # use gios::{GiosError, SessionController};
/// # async fn run() -> Result<(), GiosError> {
/// let mut session = SessionController::new()?;
/// session.start().await?;
///
/// let name = session.name_index().names()[0].clone();
/// session.select_city(&name).await?;
///
/// let (handle, _sensor) = session.sensor_handles().next().unwrap();
/// session.select_sensor(handle).await?;
/// println!("{}", session.statistics().call());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionController {
    client: ApiClient,
    store: LocalStore,
    state: SessionState,
    last_ready: SessionState,
    online: Option<bool>,
    name_index: NameIndex,
    location: String,
    sensors: Vec<Sensor>,
    sensor_generation: u64,
    dataset: Option<SensorDataset>,
    next_ticket: u64,
}

#[bon]
impl SessionController {
    /// Creates a controller with the production API and the default data
    /// directory (`dirs::data_dir()` joined with the application folder).
    ///
    /// # Errors
    ///
    /// Returns [`GiosError::Store`] if the data directory cannot be resolved
    /// or created.
    pub fn new() -> Result<Self, GiosError> {
        Self::from_config(GiosConfig::default())
    }

    /// Creates a controller that keeps its cache files under `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, GiosError> {
        Self::from_config(GiosConfig::builder().data_dir(data_dir).build())
    }

    /// Creates a controller from an explicit configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - API base URL, data directory and connectivity check
    ///   settings. See [`GiosConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`GiosError::Store`] if the data directory or its `db`
    /// subdirectory cannot be resolved or created.
    pub fn from_config(config: GiosConfig) -> Result<Self, GiosError> {
        let store = LocalStore::open(&config)?;
        Ok(Self::with_parts(ApiClient::new(&config), store))
    }

    /// Assembles a controller from an existing client, e.g. one created with
    /// [`ApiClient::with_status_channel`].
    ///
    /// # Arguments
    ///
    /// * `client` - The client all requests go through. Its status channel,
    ///   if any, keeps reporting progress.
    /// * `store` - The local store used for the station cache and datasets.
    pub fn with_parts(client: ApiClient, store: LocalStore) -> Self {
        SessionController {
            client,
            store,
            state: SessionState::Idle,
            last_ready: SessionState::Idle,
            online: None,
            name_index: NameIndex::default(),
            location: String::new(),
            sensors: Vec::new(),
            sensor_generation: 0,
            dataset: None,
            next_ticket: 0,
        }
    }

    /// Probes the network, then loads the station index.
    ///
    /// A non-empty station cache file is used as is. Otherwise the station
    /// list is fetched, written to the cache file, and the index is rebuilt
    /// from that file.
    ///
    /// The probe result is only recorded (see [`SessionController::is_online`]);
    /// an offline session still tries the API when there is no cache.
    ///
    /// # Errors
    ///
    /// Returns [`GiosError::Api`] if the station list had to be fetched and the
    /// request failed.
    pub async fn start(&mut self) -> Result<(), GiosError> {
        let client = self.client.clone();
        let online = tokio::task::spawn_blocking(move || client.check_connection()).await?;
        if !online {
            warn!("No internet connection");
        }
        self.online = Some(online);

        let index = LocalStore::load_location_index(&self.store.station_cache_path());
        if !index.is_empty() {
            info!("Using cached station list with {} locations", index.len());
            self.name_index = index;
            self.set_ready(SessionState::StationsReady);
            return Ok(());
        }

        self.refresh_stations().await
    }

    /// Fetches the station list even if a cache file exists and replaces the
    /// index with the fresh one.
    pub async fn refresh_stations(&mut self) -> Result<(), GiosError> {
        let ticket = self.begin_station_refresh();
        let result = self.client.fetch_all_stations().await;
        self.complete_station_refresh(ticket, result)?;
        Ok(())
    }

    /// Validates `name` against the station index and fetches that station's
    /// sensors.
    ///
    /// # Errors
    ///
    /// * [`GiosError::UnknownStation`] if `name` is not a known display string.
    ///   The session state does not change.
    /// * [`GiosError::Api`] if the request fails.
    pub async fn select_city(&mut self, name: &str) -> Result<&[Sensor], GiosError> {
        let ticket = self.begin_select_city(name)?;
        let station_id = match ticket.request {
            RequestKind::StationSensors(id) => id,
            other => return Err(GiosError::TicketMismatch(other)),
        };
        let result = self.client.fetch_station_sensors(station_id).await;
        self.complete_select_city(ticket, result)
    }

    /// Fetches the full measurement history of the sensor behind `handle`.
    ///
    /// # Errors
    ///
    /// * [`GiosError::InvalidSensorHandle`] if the handle belongs to an older
    ///   sensor list.
    /// * [`GiosError::Api`] if the request fails.
    pub async fn select_sensor(&mut self, handle: SensorHandle) -> Result<&SensorDataset, GiosError> {
        let ticket = self.begin_select_sensor(handle)?;
        let sensor_id = match ticket.request {
            RequestKind::SensorData(id) => id,
            other => return Err(GiosError::TicketMismatch(other)),
        };
        let result = self.client.fetch_sensor_measurements(sensor_id).await;
        self.complete_select_sensor(ticket, result)
    }

    /// Starts a station-list request and moves to
    /// [`SessionState::StationsLoading`].
    ///
    /// Fetch with [`ApiClient::fetch_all_stations`] and hand the result to
    /// [`SessionController::complete_station_refresh`] together with the
    /// returned ticket.
    pub fn begin_station_refresh(&mut self) -> RequestTicket {
        self.state = SessionState::StationsLoading;
        self.ticket(RequestKind::Stations, String::new(), String::new())
    }

    /// Applies the result of a station-list request.
    ///
    /// On success the list is written to the station cache file and the name
    /// index is rebuilt from that file (or from the list itself if the file
    /// could not be written). The session moves to
    /// [`SessionState::StationsReady`].
    ///
    /// # Arguments
    ///
    /// * `ticket` - The ticket from [`SessionController::begin_station_refresh`].
    /// * `result` - The outcome of [`ApiClient::fetch_all_stations`].
    ///
    /// # Errors
    ///
    /// * [`GiosError::TicketMismatch`] if `ticket` belongs to another kind of
    ///   request. Nothing changes.
    /// * [`GiosError::Api`] if `result` is an error. The session enters
    ///   [`SessionState::Error`] and keeps the previous index.
    pub fn complete_station_refresh(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<Station>, ApiError>,
    ) -> Result<&NameIndex, GiosError> {
        if ticket.request != RequestKind::Stations {
            return Err(GiosError::TicketMismatch(ticket.request));
        }
        let stations = self.settle(result)?;

        let index = match self.store.save_station_list(&stations) {
            Ok(path) => LocalStore::load_location_index(&path),
            Err(e) => {
                warn!("Station list not cached: {}", e);
                NameIndex::from_stations(&stations)
            }
        };
        info!(
            "Station index rebuilt with {} locations ({} name collisions)",
            index.len(),
            index.collisions()
        );
        self.name_index = index;
        self.set_ready(SessionState::StationsReady);
        Ok(&self.name_index)
    }

    /// Validates `name` and starts a sensor-list request for that station,
    /// moving to [`SessionState::SensorsLoading`].
    ///
    /// The ticket's [`RequestTicket::request`] carries the station id to pass
    /// to [`ApiClient::fetch_station_sensors`].
    ///
    /// # Arguments
    ///
    /// * `name` - A display string exactly as listed by
    ///   [`NameIndex::names`].
    ///
    /// # Errors
    ///
    /// Returns [`GiosError::UnknownStation`] if `name` is not in the index or
    /// maps to id `0`. The session state does not change.
    pub fn begin_select_city(&mut self, name: &str) -> Result<RequestTicket, GiosError> {
        let station_id = self
            .name_index
            .lookup(name)
            .ok_or_else(|| GiosError::UnknownStation(name.to_string()))?;
        self.state = SessionState::SensorsLoading;
        Ok(self.ticket(
            RequestKind::StationSensors(station_id),
            name.to_string(),
            String::new(),
        ))
    }

    /// Applies the result of a sensor-list request.
    ///
    /// On success the sensor list is replaced wholesale, the current dataset is
    /// dropped and the session moves to [`SessionState::SensorsReady`].
    /// Handles issued for the previous list stop working.
    ///
    /// # Arguments
    ///
    /// * `ticket` - The ticket from [`SessionController::begin_select_city`].
    /// * `result` - The outcome of [`ApiClient::fetch_station_sensors`].
    ///
    /// # Errors
    ///
    /// * [`GiosError::TicketMismatch`] if `ticket` is not a sensor-list ticket.
    /// * [`GiosError::Api`] if `result` is an error. The session enters
    ///   [`SessionState::Error`]; sensors and dataset stay as they were.
    pub fn complete_select_city(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<Sensor>, ApiError>,
    ) -> Result<&[Sensor], GiosError> {
        if !matches!(ticket.request, RequestKind::StationSensors(_)) {
            return Err(GiosError::TicketMismatch(ticket.request));
        }
        let sensors = self.settle(result)?;

        self.sensors = sensors;
        self.sensor_generation += 1;
        self.location = ticket.location;
        self.dataset = None;
        self.set_ready(SessionState::SensorsReady);
        Ok(&self.sensors)
    }

    /// Starts a measurement request for the sensor behind `handle`, moving to
    /// [`SessionState::DataLoading`].
    ///
    /// The ticket's [`RequestTicket::request`] carries the sensor id to pass to
    /// [`ApiClient::fetch_sensor_measurements`].
    ///
    /// # Arguments
    ///
    /// * `handle` - One of the handles from
    ///   [`SessionController::sensor_handles`].
    ///
    /// # Errors
    ///
    /// Returns [`GiosError::InvalidSensorHandle`] if the handle was issued for
    /// an older sensor list or is out of range. The session state does not
    /// change.
    pub fn begin_select_sensor(&mut self, handle: SensorHandle) -> Result<RequestTicket, GiosError> {
        let sensor = self
            .sensor(handle)
            .ok_or(GiosError::InvalidSensorHandle)?;
        let request = RequestKind::SensorData(sensor.id);
        let param_code = sensor.param_code.clone();
        self.state = SessionState::DataLoading;
        Ok(self.ticket(request, self.location.clone(), param_code))
    }

    /// Applies the result of a measurement request.
    ///
    /// On success the payload becomes the current dataset with origin
    /// [`DatasetOrigin::Fetched`] and the session moves to
    /// [`SessionState::DataReady`]. A payload without a key is named after the
    /// sensor's parameter code.
    ///
    /// # Arguments
    ///
    /// * `ticket` - The ticket from [`SessionController::begin_select_sensor`].
    /// * `result` - The outcome of [`ApiClient::fetch_sensor_measurements`].
    ///
    /// # Errors
    ///
    /// * [`GiosError::TicketMismatch`] if `ticket` is not a measurement ticket.
    /// * [`GiosError::Api`] if `result` is an error. The session enters
    ///   [`SessionState::Error`] and keeps the previous dataset.
    pub fn complete_select_sensor(
        &mut self,
        ticket: RequestTicket,
        result: Result<RawMeasurementPayload, ApiError>,
    ) -> Result<&SensorDataset, GiosError> {
        if !matches!(ticket.request, RequestKind::SensorData(_)) {
            return Err(GiosError::TicketMismatch(ticket.request));
        }
        let mut payload = self.settle(result)?;
        if payload.key.is_empty() {
            payload.key = ticket.param_code;
        }

        let dataset = SensorDataset::new(payload, ticket.location, DatasetOrigin::Fetched);
        info!(
            "Dataset '{}' of {} has {} usable measurements",
            dataset.key,
            dataset.source_location,
            dataset.series.len()
        );
        self.set_ready(SessionState::DataReady);
        Ok(&*self.dataset.insert(dataset))
    }

    /// Makes a dataset from the local store the current one. No network
    /// access; the result cannot be saved again.
    ///
    /// # Errors
    ///
    /// Returns [`GiosError::Store`] if the file cannot be read or decoded. The
    /// session state does not change in that case.
    pub fn open_cached_dataset(
        &mut self,
        location: &str,
        file_name: &str,
    ) -> Result<&SensorDataset, GiosError> {
        let dataset = self.store.load_cached_dataset(location, file_name)?;
        self.set_ready(SessionState::DataReady);
        Ok(&*self.dataset.insert(dataset))
    }

    /// True only while freshly fetched data is shown.
    pub fn can_save(&self) -> bool {
        self.state == SessionState::DataReady
            && self
                .dataset
                .as_ref()
                .is_some_and(|d| d.origin == DatasetOrigin::Fetched)
    }

    /// Writes the current dataset to the local store.
    ///
    /// # Errors
    ///
    /// Returns [`GiosError::SaveUnavailable`] when [`SessionController::can_save`]
    /// is false. Problems while writing are not errors; they show up in the
    /// returned [`SaveOutcome`].
    pub fn save_current_dataset(&self) -> Result<SaveOutcome, GiosError> {
        match &self.dataset {
            Some(dataset) if self.can_save() => Ok(self.store.save_sensor_dataset(dataset)),
            _ => Err(GiosError::SaveUnavailable),
        }
    }

    /// Leaves the error state for the Ready state the session was in before the
    /// failed request.
    pub fn dismiss_error(&mut self) {
        let resume = match &self.state {
            SessionState::Error { resume, .. } => (**resume).clone(),
            _ => return,
        };
        self.state = resume;
    }

    /// Min/max/mean/count of the current dataset.
    ///
    /// `start` and `end` bound a closed range; a missing bound is open. Without
    /// a dataset, or with no measurement in range, the result is
    /// [`Statistics::InsufficientData`].
    #[builder]
    pub fn statistics(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Statistics {
        match &self.dataset {
            Some(dataset) => compute_statistics(&dataset.series, resolve_range(start, end)),
            None => Statistics::InsufficientData,
        }
    }

    /// Trend between the first and the last measurement in range.
    #[builder]
    pub fn trend(&self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Trend {
        let Some(dataset) = &self.dataset else {
            return Trend::InsufficientData;
        };
        match resolve_range(start, end) {
            Some((start, end)) => classify_trend(dataset.series.within(start, end)),
            None => classify_trend(dataset.series.as_slice()),
        }
    }

    /// The current step of the session.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Result of the connectivity probe, once [`SessionController::start`] ran.
    pub fn is_online(&self) -> Option<bool> {
        self.online
    }

    /// Display string → station id for every known station, e.g. for
    /// autocompletion via [`NameIndex::suggestions`].
    pub fn name_index(&self) -> &NameIndex {
        &self.name_index
    }

    /// Display string of the station whose sensors are listed.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Sensors of the station at [`SessionController::location`].
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Each listed sensor with the handle that selects it. The handles stay
    /// valid until another station's sensors are loaded.
    pub fn sensor_handles(&self) -> impl Iterator<Item = (SensorHandle, &Sensor)> + '_ {
        let generation = self.sensor_generation;
        self.sensors
            .iter()
            .enumerate()
            .map(move |(index, sensor)| (SensorHandle { generation, index }, sensor))
    }

    /// The sensor behind `handle`, or `None` for a stale handle.
    pub fn sensor(&self, handle: SensorHandle) -> Option<&Sensor> {
        if handle.generation != self.sensor_generation {
            return None;
        }
        self.sensors.get(handle.index)
    }

    /// The dataset shown, fetched or loaded from the store.
    pub fn dataset(&self) -> Option<&SensorDataset> {
        self.dataset.as_ref()
    }

    /// The local store, e.g. to browse cached locations and files.
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// The API client, for front ends driving the `begin_*`/`complete_*`
    /// requests themselves.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn ticket(&mut self, request: RequestKind, location: String, param_code: String) -> RequestTicket {
        self.next_ticket += 1;
        RequestTicket {
            id: self.next_ticket,
            request,
            location,
            param_code,
        }
    }

    fn set_ready(&mut self, state: SessionState) {
        self.state = state.clone();
        self.last_ready = state;
    }

    /// Unwraps a request result, moving into the error state on failure.
    fn settle<T>(&mut self, result: Result<T, ApiError>) -> Result<T, GiosError> {
        result.map_err(|e| {
            warn!("Request failed: {}", e);
            self.state = SessionState::Error {
                message: e.to_string(),
                resume: Box::new(self.last_ready.clone()),
            };
            GiosError::from(e)
        })
    }
}

fn resolve_range(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    if start.is_none() && end.is_none() {
        return None;
    }
    Some((
        start.unwrap_or(NaiveDateTime::MIN),
        end.unwrap_or(NaiveDateTime::MAX),
    ))
}
