//! The scanner facade.
//!
//! Ties the pieces together: backend selection from configuration,
//! scannability policy and hooks, and verdict logging under the
//! configured outage action. This is the type host applications hold.

use crate::audit::{EventLevel, EventSink, ScanEvent, TracingSink};
use crate::backends::Backend;
use crate::core::{ConfigError, FileReference, OutageAction, ScanVerdict, ScannerConfig};
use crate::policy::{
    ScanOpinion, ScannabilityHook, ScannabilityPolicy, SchemeClassifier, StaticSchemeClassifier,
};

use std::sync::Arc;

/// Builder for a [`Scanner`].
///
/// The configuration snapshot, scheme classifier, scannability hooks,
/// and event sink are all injected here; the scanner never reaches for
/// ambient globals.
pub struct ScannerBuilder {
    config: ScannerConfig,
    classifier: Option<Arc<dyn SchemeClassifier>>,
    hooks: Vec<Arc<dyn ScannabilityHook>>,
    events: Option<Arc<dyn EventSink>>,
    backend: Option<Backend>,
}

impl ScannerBuilder {
    /// Creates a builder from a configuration snapshot.
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            classifier: None,
            hooks: Vec::new(),
            events: None,
            backend: None,
        }
    }

    /// Sets the scheme classifier provided by the host environment.
    ///
    /// Without one, every scheme is treated as remote and only
    /// scheme-less files are scannable by default.
    pub fn with_classifier(mut self, classifier: Arc<dyn SchemeClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Registers a scannability hook.
    ///
    /// Hooks are consulted in registration order; the last one with an
    /// opinion wins.
    pub fn add_hook(mut self, hook: Arc<dyn ScannabilityHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Sets the event sink. Defaults to [`TracingSink`].
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Overrides the backend instead of building one from the
    /// configuration's scan mode.
    ///
    /// Intended for stubs in tests and for embedding engines this crate
    /// does not ship (via [`Backend::Custom`]).
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Builds the scanner.
    ///
    /// Fails with [`ConfigError`] if the configured scan mode is
    /// missing its connection parameters.
    pub fn build(self) -> Result<Scanner, ConfigError> {
        let events = self
            .events
            .unwrap_or_else(|| Arc::new(TracingSink) as Arc<dyn EventSink>);

        let backend = match self.backend {
            Some(backend) => backend,
            None => Backend::from_config(&self.config, events.clone())?,
        };

        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(StaticSchemeClassifier::new()) as Arc<dyn SchemeClassifier>);

        let policy = ScannabilityPolicy::new(classifier, self.config.overridden_schemes.clone());

        Ok(Scanner {
            config: self.config,
            backend,
            policy,
            hooks: self.hooks,
            events,
        })
    }
}

/// The scanner facade.
///
/// Exposes a uniform `scan`/`version` contract regardless of which
/// backend was selected, applies the scannability policy, and logs
/// verdicts under the configured outage action. `scan` always returns a
/// verdict; backend failures surface as `Unchecked`, never as errors.
///
/// # Examples
///
/// ```rust,no_run
/// use virusgate::core::{DaemonTcpConfig, FileReference, ScanMode, ScannerConfig};
/// use virusgate::Scanner;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ScannerConfig::new(ScanMode::DaemonTcp)
///     .with_daemon_tcp(DaemonTcpConfig::new("localhost", 3310));
/// let scanner = Scanner::builder(config).build()?;
///
/// let file = FileReference::from_path("/srv/uploads/report.pdf")?;
/// if scanner.is_enabled() && scanner.is_scannable(&file) {
///     let verdict = scanner.scan(&file).await;
///     println!("verdict: {verdict}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Scanner {
    config: ScannerConfig,
    backend: Backend,
    policy: ScannabilityPolicy,
    hooks: Vec<Arc<dyn ScannabilityHook>>,
    events: Arc<dyn EventSink>,
}

impl Scanner {
    /// Creates a builder from a configuration snapshot.
    pub fn builder(config: ScannerConfig) -> ScannerBuilder {
        ScannerBuilder::new(config)
    }

    /// Returns `true` if anti-virus checks are enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Returns `true` if files that could not be checked may pass
    /// through.
    pub fn allow_unchecked_files(&self) -> bool {
        self.config.outage_action == OutageAction::AllowUnchecked
    }

    /// Returns `true` if clean and blocked-unchecked results are logged
    /// too.
    pub fn is_verbose_mode_enabled(&self) -> bool {
        self.config.verbose
    }

    /// Determines whether files of the given scheme should be scanned.
    pub fn is_scheme_scannable(&self, scheme: Option<&str>) -> bool {
        self.policy.is_scheme_scannable(scheme)
    }

    /// Determines whether a specific file should be scanned.
    ///
    /// Starts from the scheme policy, then lets registered hooks veto
    /// or force the result; the last non-`NoOpinion` answer wins.
    /// Typical exclusions: image files, very large files, uploads by
    /// trusted administrators, or deliberate virus-database uploads.
    pub fn is_scannable(&self, file: &FileReference) -> bool {
        let mut scannable = self.policy.is_scheme_scannable(file.scheme());

        for hook in &self.hooks {
            match hook.opinion(file) {
                ScanOpinion::Scannable => scannable = true,
                ScanOpinion::NotScannable => scannable = false,
                ScanOpinion::NoOpinion => {}
            }
        }

        scannable
    }

    /// Scans a file for viruses.
    ///
    /// Zero-byte files are never infected: they yield `Clean` without
    /// contacting the backend and without logging. Every other file is
    /// handed to the selected backend, the verdict is logged under the
    /// configured policy, and returned unchanged; logging never alters
    /// the verdict.
    pub async fn scan(&self, file: &FileReference) -> ScanVerdict {
        if file.size() == 0 {
            return ScanVerdict::Clean;
        }

        let verdict = self.backend.scan(file).await;
        self.log_verdict(file, &verdict);
        verdict
    }

    /// Returns the scanning engine's version, or `None` if it cannot be
    /// determined.
    pub async fn version(&self) -> Option<String> {
        self.backend.version().await
    }

    fn log_verdict(&self, file: &FileReference, verdict: &ScanVerdict) {
        match verdict {
            // Every infected file is logged.
            ScanVerdict::Infected { virus_name } => {
                let mut event = ScanEvent::new(
                    EventLevel::Error,
                    format!(
                        "Virus {} detected in uploaded file {}",
                        virus_name.as_deref().unwrap_or("(unnamed)"),
                        file.uri()
                    ),
                )
                .with_file(file)
                .with_backend(self.backend.name());
                if let Some(name) = virus_name {
                    event = event.with_virus_name(name.clone());
                }
                self.events.emit(&event);
            }

            // Clean files are logged in verbose mode only.
            ScanVerdict::Clean => {
                if self.config.verbose {
                    self.events.emit(
                        &ScanEvent::new(
                            EventLevel::Info,
                            format!("Uploaded file {} checked and found clean", file.uri()),
                        )
                        .with_file(file)
                        .with_backend(self.backend.name()),
                    );
                }
            }

            // Unchecked files are logged when they are let through, or
            // in verbose mode when they are blocked instead.
            ScanVerdict::Unchecked => {
                if self.allow_unchecked_files() {
                    self.events.emit(
                        &ScanEvent::new(
                            EventLevel::Notice,
                            format!(
                                "Uploaded file {} could not be checked, and was uploaded without checking",
                                file.uri()
                            ),
                        )
                        .with_file(file)
                        .with_backend(self.backend.name()),
                    );
                } else if self.config.verbose {
                    self.events.emit(
                        &ScanEvent::new(
                            EventLevel::Info,
                            format!(
                                "Uploaded file {} could not be checked, and was deleted",
                                file.uri()
                            ),
                        )
                        .with_file(file)
                        .with_backend(self.backend.name()),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::CollectingSink;
    use crate::backends::MockBackend;
    use crate::core::ScanMode;

    fn mock_scanner(
        config: ScannerConfig,
        verdict: ScanVerdict,
    ) -> (Scanner, Arc<MockBackend>, Arc<CollectingSink>) {
        let mock = Arc::new(MockBackend::new(verdict));
        let sink = Arc::new(CollectingSink::new());
        let scanner = Scanner::builder(config)
            .with_backend(Backend::Custom(mock.clone()))
            .with_event_sink(sink.clone())
            .build()
            .unwrap();
        (scanner, mock, sink)
    }

    fn config() -> ScannerConfig {
        ScannerConfig::new(ScanMode::DaemonTcp)
    }

    #[tokio::test]
    async fn test_zero_byte_file_is_clean_without_backend_or_events() {
        let (scanner, mock, sink) = mock_scanner(config(), ScanVerdict::infected("X"));
        let file = FileReference::new("public://empty.txt", "/srv/empty.txt", 0);

        let verdict = scanner.scan(&file).await;
        assert_eq!(verdict, ScanVerdict::Clean);
        assert_eq!(mock.scan_count(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_infected_logged_at_error_level() {
        let (scanner, _, sink) = mock_scanner(config(), ScanVerdict::infected("Eicar-Test-Signature"));
        let file = FileReference::new("public://bad.exe", "/srv/bad.exe", 10);

        let verdict = scanner.scan(&file).await;
        assert!(verdict.is_infected());
        assert_eq!(sink.count_level(EventLevel::Error), 1);
        assert_eq!(sink.len(), 1);

        let event = &sink.events()[0];
        assert_eq!(event.virus_name.as_deref(), Some("Eicar-Test-Signature"));
        assert_eq!(event.file_uri.as_deref(), Some("public://bad.exe"));
    }

    #[tokio::test]
    async fn test_clean_silent_unless_verbose() {
        let (scanner, _, sink) = mock_scanner(config(), ScanVerdict::Clean);
        let file = FileReference::new("public://ok.txt", "/srv/ok.txt", 10);

        scanner.scan(&file).await;
        assert!(sink.is_empty());

        let (scanner, _, sink) = mock_scanner(config().with_verbose(true), ScanVerdict::Clean);
        scanner.scan(&file).await;
        assert_eq!(sink.count_level(EventLevel::Info), 1);
    }

    #[tokio::test]
    async fn test_unchecked_allowed_logs_one_notice() {
        let (scanner, _, sink) = mock_scanner(
            config().with_outage_action(OutageAction::AllowUnchecked),
            ScanVerdict::Unchecked,
        );
        let file = FileReference::new("public://f.bin", "/srv/f.bin", 10);

        let verdict = scanner.scan(&file).await;
        assert_eq!(verdict, ScanVerdict::Unchecked);
        assert_eq!(sink.count_level(EventLevel::Notice), 1);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_unchecked_blocked_silent_unless_verbose() {
        let (scanner, _, sink) = mock_scanner(
            config().with_outage_action(OutageAction::BlockUnchecked),
            ScanVerdict::Unchecked,
        );
        let file = FileReference::new("public://f.bin", "/srv/f.bin", 10);

        scanner.scan(&file).await;
        assert!(sink.is_empty());

        let (scanner, _, sink) = mock_scanner(
            config()
                .with_outage_action(OutageAction::BlockUnchecked)
                .with_verbose(true),
            ScanVerdict::Unchecked,
        );
        scanner.scan(&file).await;
        assert_eq!(sink.count_level(EventLevel::Info), 1);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_config_passthroughs() {
        let (scanner, _, _) = mock_scanner(
            config()
                .with_enabled(false)
                .with_outage_action(OutageAction::AllowUnchecked)
                .with_verbose(true),
            ScanVerdict::Clean,
        );
        assert!(!scanner.is_enabled());
        assert!(scanner.allow_unchecked_files());
        assert!(scanner.is_verbose_mode_enabled());
    }

    #[tokio::test]
    async fn test_version_passthrough() {
        let mock = Arc::new(MockBackend::new_clean().with_version(Some("engine 9".into())));
        let scanner = Scanner::builder(config())
            .with_backend(Backend::Custom(mock))
            .build()
            .unwrap();
        assert_eq!(scanner.version().await.as_deref(), Some("engine 9"));
    }

    #[test]
    fn test_build_fails_fast_on_missing_parameters() {
        let result = Scanner::builder(ScannerConfig::new(ScanMode::DaemonTcp)).build();
        assert!(matches!(result, Err(ConfigError::MissingParameters { .. })));
    }

    mod hooks {
        use super::*;

        #[derive(Debug)]
        struct FixedHook(ScanOpinion);

        impl ScannabilityHook for FixedHook {
            fn opinion(&self, _file: &FileReference) -> ScanOpinion {
                self.0
            }
        }

        fn scanner_with_hooks(hooks: Vec<ScanOpinion>) -> Scanner {
            let mut builder = Scanner::builder(config())
                .with_backend(Backend::Custom(Arc::new(MockBackend::new_clean())))
                .with_classifier(Arc::new(
                    StaticSchemeClassifier::new().with_local("public"),
                ));
            for opinion in hooks {
                builder = builder.add_hook(Arc::new(FixedHook(opinion)));
            }
            builder.build().unwrap()
        }

        #[test]
        fn test_no_hooks_uses_scheme_policy() {
            let scanner = scanner_with_hooks(vec![]);
            let local = FileReference::new("public://a", "/srv/a", 1);
            let remote = FileReference::new("s3://b", "/srv/b", 1);
            assert!(scanner.is_scannable(&local));
            assert!(!scanner.is_scannable(&remote));
        }

        #[test]
        fn test_hook_can_veto() {
            let scanner = scanner_with_hooks(vec![ScanOpinion::NotScannable]);
            let local = FileReference::new("public://a", "/srv/a", 1);
            assert!(!scanner.is_scannable(&local));
        }

        #[test]
        fn test_hook_can_force() {
            let scanner = scanner_with_hooks(vec![ScanOpinion::Scannable]);
            let remote = FileReference::new("s3://b", "/srv/b", 1);
            assert!(scanner.is_scannable(&remote));
        }

        #[test]
        fn test_last_opinion_wins() {
            let scanner = scanner_with_hooks(vec![
                ScanOpinion::NotScannable,
                ScanOpinion::Scannable,
                ScanOpinion::NoOpinion,
            ]);
            let local = FileReference::new("public://a", "/srv/a", 1);
            assert!(scanner.is_scannable(&local));
        }

        #[test]
        fn test_scheme_less_file_scannable_by_default() {
            let scanner = scanner_with_hooks(vec![]);
            let file = FileReference::new("/tmp/plain.txt", "/tmp/plain.txt", 1);
            assert!(scanner.is_scannable(&file));
        }
    }
}
