//! Scanner configuration.
//!
//! Configuration is an immutable snapshot consumed once when the
//! `Scanner` is built. There is no ambient/global configuration access:
//! the host application constructs a `ScannerConfig` from its own
//! settings store and passes it in.

use secrecy::SecretString;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Minimum accepted HTTP API request timeout, in seconds.
pub const API_TIMEOUT_MIN_SECS: u32 = 30;

/// Maximum accepted HTTP API request timeout, in seconds.
pub const API_TIMEOUT_MAX_SECS: u32 = 300;

/// Granularity of the HTTP API request timeout, in seconds.
pub const API_TIMEOUT_STEP_SECS: u32 = 10;

/// Default deadline applied to daemon connect/write/read steps.
///
/// The daemon protocol itself has no timeout; without a deadline a stalled
/// daemon would block a scan indefinitely.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Which backend performs scans.
///
/// The mapping from mode to backend implementation is 1:1 and fixed for
/// the lifetime of a `Scanner` instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// HTTP API backend: multipart upload to a remote scanning service.
    Api,

    /// clamd daemon reached over TCP (host + port).
    DaemonTcp,

    /// clamd daemon reached over a Unix domain socket.
    DaemonUnixSocket,
}

/// What to do with files the backend could not check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutageAction {
    /// Unchecked files are blocked (deleted or rejected upstream).
    #[default]
    BlockUnchecked,

    /// Unchecked files are allowed through, logged at notice level.
    AllowUnchecked,
}

/// Verdict reported by the HTTP API backend when the request itself fails.
///
/// `FailClosed` deliberately conflates transport failures with an
/// infected result: a file that could not be uploaded is treated as if
/// the scan had found something. `Unchecked` separates the two cases and
/// lets [`OutageAction`] decide what happens to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiOutageVerdict {
    /// Report transport failures as `Infected` (fail-closed posture).
    #[default]
    FailClosed,

    /// Report transport failures as `Unchecked`.
    Unchecked,
}

/// Connection parameters for the daemon-over-TCP backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonTcpConfig {
    /// Daemon hostname or IP address.
    pub hostname: String,

    /// Daemon TCP port.
    pub port: u16,
}

impl DaemonTcpConfig {
    /// Creates TCP daemon parameters.
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
        }
    }

    /// Returns the `host:port` form used in log events.
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

/// Connection parameters for the daemon-over-Unix-socket backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonUnixSocketConfig {
    /// Filesystem path of the daemon socket.
    pub socket_path: PathBuf,
}

impl DaemonUnixSocketConfig {
    /// Creates Unix socket daemon parameters.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }
}

/// Connection parameters for the HTTP API backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the scanning API.
    pub endpoint: String,

    /// API key sent in the `Apikey` header (kept secret).
    pub api_key: SecretString,

    // Kept private so the clamp invariant cannot be bypassed: always
    // within [API_TIMEOUT_MIN_SECS, API_TIMEOUT_MAX_SECS] and a multiple
    // of API_TIMEOUT_STEP_SECS.
    timeout_secs: u32,
}

impl ApiConfig {
    /// Creates API parameters for the default Cloudmersive endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: "https://api.cloudmersive.com".to_string(),
            api_key: SecretString::from(api_key.into()),
            timeout_secs: API_TIMEOUT_MIN_SECS,
        }
    }

    /// Sets the API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the request timeout, clamped to the accepted range and step.
    pub fn with_timeout_secs(mut self, secs: u32) -> Self {
        self.timeout_secs = clamp_api_timeout(secs);
        self
    }

    /// Returns the total request timeout in seconds.
    ///
    /// Always within [`API_TIMEOUT_MIN_SECS`, `API_TIMEOUT_MAX_SECS`]
    /// and a multiple of [`API_TIMEOUT_STEP_SECS`].
    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }
}

/// Clamps a timeout to [30, 300] seconds, rounded down to a step of 10.
fn clamp_api_timeout(secs: u32) -> u32 {
    let clamped = secs.clamp(API_TIMEOUT_MIN_SECS, API_TIMEOUT_MAX_SECS);
    clamped - clamped % API_TIMEOUT_STEP_SECS
}

/// Immutable configuration snapshot for a [`Scanner`](crate::Scanner).
///
/// # Examples
///
/// ```rust
/// use virusgate::core::{DaemonTcpConfig, ScanMode, ScannerConfig};
///
/// let config = ScannerConfig::new(ScanMode::DaemonTcp)
///     .with_daemon_tcp(DaemonTcpConfig::new("localhost", 3310))
///     .with_verbose(true);
/// assert!(config.enabled);
/// ```
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Whether scanning is enabled at all.
    pub enabled: bool,

    /// Which backend performs scans.
    pub mode: ScanMode,

    /// What to do with files that could not be checked.
    pub outage_action: OutageAction,

    /// Whether clean and blocked-unchecked results are logged too.
    pub verbose: bool,

    /// Parameters for `ScanMode::DaemonTcp`.
    pub daemon_tcp: Option<DaemonTcpConfig>,

    /// Parameters for `ScanMode::DaemonUnixSocket`.
    pub daemon_unix_socket: Option<DaemonUnixSocketConfig>,

    /// Parameters for `ScanMode::Api`.
    pub api: Option<ApiConfig>,

    /// How the HTTP API backend reports transport failures.
    pub api_outage_verdict: ApiOutageVerdict,

    /// Deadline applied to each daemon connect/write/read step.
    pub io_timeout: Duration,

    /// Schemes whose default scannability is flipped.
    pub overridden_schemes: HashSet<String>,
}

impl ScannerConfig {
    /// Creates an enabled configuration for the given scan mode.
    pub fn new(mode: ScanMode) -> Self {
        Self {
            enabled: true,
            mode,
            outage_action: OutageAction::default(),
            verbose: false,
            daemon_tcp: None,
            daemon_unix_socket: None,
            api: None,
            api_outage_verdict: ApiOutageVerdict::default(),
            io_timeout: DEFAULT_IO_TIMEOUT,
            overridden_schemes: HashSet::new(),
        }
    }

    /// Enables or disables scanning.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the outage action.
    pub fn with_outage_action(mut self, action: OutageAction) -> Self {
        self.outage_action = action;
        self
    }

    /// Enables or disables verbose logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the TCP daemon parameters.
    pub fn with_daemon_tcp(mut self, params: DaemonTcpConfig) -> Self {
        self.daemon_tcp = Some(params);
        self
    }

    /// Sets the Unix socket daemon parameters.
    pub fn with_daemon_unix_socket(mut self, params: DaemonUnixSocketConfig) -> Self {
        self.daemon_unix_socket = Some(params);
        self
    }

    /// Sets the HTTP API parameters.
    pub fn with_api(mut self, params: ApiConfig) -> Self {
        self.api = Some(params);
        self
    }

    /// Sets the HTTP API transport-failure verdict.
    pub fn with_api_outage_verdict(mut self, verdict: ApiOutageVerdict) -> Self {
        self.api_outage_verdict = verdict;
        self
    }

    /// Sets the daemon I/O deadline.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Flips the default scannability of a scheme.
    ///
    /// Membership in the override set is what matters; overriding the
    /// same scheme twice is idempotent.
    pub fn with_overridden_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.overridden_schemes.insert(scheme.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_timeout_clamped_to_range() {
        let api = ApiConfig::new("key").with_timeout_secs(5);
        assert_eq!(api.timeout_secs(), 30);

        let api = ApiConfig::new("key").with_timeout_secs(900);
        assert_eq!(api.timeout_secs(), 300);
    }

    #[test]
    fn test_api_timeout_rounded_to_step() {
        let api = ApiConfig::new("key").with_timeout_secs(95);
        assert_eq!(api.timeout_secs(), 90);

        let api = ApiConfig::new("key").with_timeout_secs(60);
        assert_eq!(api.timeout_secs(), 60);
    }

    #[test]
    fn test_default_api_timeout() {
        let api = ApiConfig::new("key");
        assert_eq!(api.timeout_secs(), 30);
    }

    #[test]
    fn test_api_timeout_invariant_holds_for_any_input() {
        for secs in [0, 1, 29, 30, 31, 100, 299, 300, 301, u32::MAX] {
            let timeout = ApiConfig::new("key").with_timeout_secs(secs).timeout_secs();
            assert!((API_TIMEOUT_MIN_SECS..=API_TIMEOUT_MAX_SECS).contains(&timeout));
            assert_eq!(timeout % API_TIMEOUT_STEP_SECS, 0);
        }
    }

    #[test]
    fn test_overridden_scheme_is_set_membership() {
        let config = ScannerConfig::new(ScanMode::DaemonTcp)
            .with_overridden_scheme("public")
            .with_overridden_scheme("public");
        assert_eq!(config.overridden_schemes.len(), 1);
    }

    #[test]
    fn test_tcp_address_format() {
        let params = DaemonTcpConfig::new("clamd.internal", 3310);
        assert_eq!(params.address(), "clamd.internal:3310");
    }
}
