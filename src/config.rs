//! Runtime configuration of the client and the local store.

use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.gios.gov.pl/pjp-api/rest";
pub const DEFAULT_APP_NAME: &str = "gios_air_quality";

/// Settings shared by [`crate::ApiClient`], [`crate::LocalStore`] and
/// [`crate::SessionController`].
///
/// `GiosConfig::default()` gives the production values; use the builder to
/// override single fields:
///
/// ```
/// use gios::GiosConfig;
/// use std::time::Duration;
///
/// let config = GiosConfig::builder()
///     .data_dir("/tmp/gios")
///     .probe_timeout(Duration::from_secs(1))
///     .build();
/// assert_eq!(config.base_url, gios::DEFAULT_BASE_URL);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct GiosConfig {
    /// Root of the REST API, without a trailing slash.
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,

    /// Application-data directory. When unset it is resolved with `dirs::data_dir()`.
    #[builder(into)]
    pub data_dir: Option<PathBuf>,

    /// Folder created under the platform data directory when `data_dir` is unset.
    #[builder(into, default = DEFAULT_APP_NAME.to_string())]
    pub app_name: String,

    /// Host the connectivity probe connects to.
    #[builder(into, default = "google.com".to_string())]
    pub probe_host: String,

    #[builder(default = 80)]
    pub probe_port: u16,

    #[builder(default = Duration::from_secs(4))]
    pub probe_timeout: Duration,
}

impl Default for GiosConfig {
    fn default() -> Self {
        GiosConfig::builder().build()
    }
}
