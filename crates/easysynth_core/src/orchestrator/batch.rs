//! Batch orchestrator: renders every sequence of a folder, one at a time.
//!
//! The orchestrator never waits on the renderer. `start_batch` returns once
//! the first job is accepted; the host then feeds each `RenderingFinished`
//! event into `on_rendering_finished`, which either starts the next job or
//! finishes the batch. All calls happen on one thread.

use std::path::PathBuf;
use std::sync::Arc;

use crate::jobs::{discover_sequences, AssetRegistry, SequenceRenderJob};
use crate::logging::{BatchLogger, GuiLogCallback, LogConfig};
use crate::models::{OutputImageResolution, TargetConfiguration};
use crate::render::RenderDriver;

use super::hooks::{InterJobHook, ReclaimAndSettle};
use super::notify::{Notification, Notifier};
use super::types::{AbortReason, BatchOutcome, BatchPhase, BatchRequest, StartRejected, Transition};

/// Callback receiving each batch log line (e.g. a log pane).
pub type SharedLogCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Name reported when a failure cannot be tied to a job.
const UNKNOWN_SEQUENCE: &str = "Unknown";

/// Drives a batch of sequence renders through a [`RenderDriver`].
pub struct BatchOrchestrator {
    driver: Box<dyn RenderDriver>,
    registry: Box<dyn AssetRegistry>,
    notifier: Box<dyn Notifier>,
    hook: Box<dyn InterJobHook>,

    /// Jobs of the active batch, in discovery order.
    jobs: Vec<SequenceRenderJob>,
    /// Index of the job in flight; `None` when no batch is active.
    cursor: Option<usize>,
    phase: BatchPhase,
    base_output_directory: PathBuf,
    config: TargetConfiguration,
    resolution: OutputImageResolution,
    last_outcome: Option<BatchOutcome>,

    log_dir: Option<PathBuf>,
    log_config: LogConfig,
    log_callback: Option<SharedLogCallback>,
    logger: Option<BatchLogger>,
}

impl BatchOrchestrator {
    /// Create an orchestrator with the default cleanup hook.
    pub fn new(
        driver: Box<dyn RenderDriver>,
        registry: Box<dyn AssetRegistry>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            driver,
            registry,
            notifier,
            hook: Box::new(ReclaimAndSettle::default()),
            jobs: Vec::new(),
            cursor: None,
            phase: BatchPhase::Idle,
            base_output_directory: PathBuf::new(),
            config: TargetConfiguration::default(),
            resolution: OutputImageResolution::default(),
            last_outcome: None,
            log_dir: None,
            log_config: LogConfig::default(),
            log_callback: None,
            logger: None,
        }
    }

    /// Replace the between-sequence hook.
    pub fn with_hook(mut self, hook: Box<dyn InterJobHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Write one log file per batch into `log_dir`.
    pub fn with_batch_logs(mut self, log_dir: impl Into<PathBuf>, config: LogConfig) -> Self {
        self.log_dir = Some(log_dir.into());
        self.log_config = config;
        self
    }

    /// Forward batch log lines to a callback.
    pub fn with_log_callback(mut self, callback: SharedLogCallback) -> Self {
        self.log_callback = Some(callback);
        self
    }

    /// Whether the renderer is busy.
    pub fn is_rendering(&self) -> bool {
        self.driver.is_rendering()
    }

    /// Whether a batch is in progress.
    pub fn is_active(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn jobs(&self) -> &[SequenceRenderJob] {
        &self.jobs
    }

    /// Job currently in flight.
    pub fn current_job(&self) -> Option<&SequenceRenderJob> {
        self.cursor.and_then(|i| self.jobs.get(i))
    }

    /// How the most recent batch ended, if one has.
    pub fn last_outcome(&self) -> Option<&BatchOutcome> {
        self.last_outcome.as_ref()
    }

    /// Check the render gate without touching any state.
    pub fn can_start(&self, request: &BatchRequest) -> Result<(), StartRejected> {
        if request.sequences_folder.as_os_str().is_empty() {
            return Err(StartRejected::NoFolderSelected);
        }
        if !request.config.any_selected() {
            return Err(StartRejected::NoTargetsSelected);
        }
        if self.is_active() {
            return Err(StartRejected::BatchActive);
        }
        if self.driver.is_rendering() {
            return Err(StartRejected::RendererBusy);
        }
        Ok(())
    }

    /// Discover the sequences of a folder and start rendering the first.
    ///
    /// A rejected request leaves the orchestrator untouched. Folder and
    /// discovery problems are reported through the notifier and returned as
    /// [`Transition::Aborted`].
    pub fn start_batch(&mut self, request: BatchRequest) -> Result<Transition, StartRejected> {
        if let Err(rejected) = self.can_start(&request) {
            tracing::debug!("Batch start rejected: {}", rejected);
            return Err(rejected);
        }

        self.reset();
        self.phase = BatchPhase::Discovering;
        self.open_logger();
        self.log_info(&format!(
            "Scanning {} for level sequences",
            request.sequences_folder.display()
        ));

        let package = match self.registry.resolve_folder(&request.sequences_folder) {
            Ok(package) => package,
            Err(e) => {
                self.log_error(&format!("Could not resolve folder: {}", e));
                self.notifier.notify(Notification::InvalidFolder);
                return Ok(self.abort(AbortReason::InvalidFolder(e)));
            }
        };

        let jobs = discover_sequences(&*self.registry, &package, &request.output_directory);
        if jobs.is_empty() {
            self.log_error(&format!("No level sequences found in {}", package));
            self.notifier.notify(Notification::NoSequencesFound);
            return Ok(self.abort(AbortReason::NoSequencesFound));
        }

        let total = jobs.len();
        self.jobs = jobs;
        self.base_output_directory = request.output_directory;
        self.config = request.config;
        self.resolution = request.resolution;
        self.cursor = Some(0);

        self.log_info(&format!(
            "Rendering {} sequences into {} at {}",
            total,
            self.base_output_directory.display(),
            self.resolution
        ));

        match self.start_current() {
            Ok(()) => Ok(Transition::Started { total }),
            Err(reason) => Ok(self.abort(reason)),
        }
    }

    /// Handle the renderer's completion signal.
    pub fn on_rendering_finished(&mut self, success: bool) -> Transition {
        let Some(index) = self.cursor.filter(|i| *i < self.jobs.len()) else {
            return self.finish_without_batch(success);
        };

        if !success {
            let sequence = self.jobs[index].name().to_string();
            let error = self.driver.error_message();
            self.log_error(&format!("Sequence '{}' failed: {}", sequence, error));
            self.notifier.notify(Notification::RenderingFailed {
                sequence: sequence.clone(),
                error: error.clone(),
            });
            return self.abort(AbortReason::RenderFailed { sequence, error });
        }

        let total = self.jobs.len();
        self.log_success(&format!(
            "Sequence {}/{} finished: {}",
            index + 1,
            total,
            self.jobs[index].name()
        ));

        let next = index + 1;
        if next < total {
            self.phase = BatchPhase::CleaningUp(index);
            self.hook
                .between_jobs(self.driver.as_mut(), index, next, total);

            self.cursor = Some(next);
            return match self.start_current() {
                Ok(()) => Transition::Advanced { index: next, total },
                Err(reason) => self.abort(reason),
            };
        }

        self.log_success(&format!("Batch complete: {} sequences rendered", total));
        self.notifier
            .notify(Notification::BatchRenderingComplete { count: total });
        self.reset();
        self.last_outcome = Some(BatchOutcome::Completed { count: total });
        Transition::Completed { count: total }
    }

    /// Start the job under the cursor.
    fn start_current(&mut self) -> Result<(), AbortReason> {
        let Some(index) = self.cursor.filter(|i| *i < self.jobs.len()) else {
            return Ok(());
        };
        let total = self.jobs.len();
        let job = &self.jobs[index];

        tracing::info!(
            "Rendering sequence {}/{}: {}",
            index + 1,
            total,
            job.name()
        );
        if let Some(logger) = &self.logger {
            logger.sequence(&format!("{}/{} {}", index + 1, total, job.name()));
            logger.debug(&format!("Output: {}", job.output_directory().display()));
        }

        match self.driver.start_render(job, &self.config, self.resolution) {
            Ok(()) => {
                self.phase = BatchPhase::Rendering(index);
                Ok(())
            }
            Err(e) => {
                let sequence = job.name().to_string();
                let message = e.to_string();
                self.log_error(&format!("Could not start '{}': {}", sequence, message));
                self.notifier.notify(Notification::CouldNotStartRendering {
                    message: message.clone(),
                });
                Err(AbortReason::StartFailed { sequence, message })
            }
        }
    }

    /// Completion with no batch context: report it plainly.
    fn finish_without_batch(&mut self, success: bool) -> Transition {
        if success {
            tracing::info!("Rendering finished outside of a batch");
            self.notifier.notify(Notification::RenderingSucceeded);
        } else {
            let error = self.driver.error_message();
            tracing::error!("Rendering failed outside of a batch: {}", error);
            self.notifier.notify(Notification::RenderingFailed {
                sequence: UNKNOWN_SEQUENCE.to_string(),
                error,
            });
        }
        self.reset();
        Transition::SingleRenderFinished { success }
    }

    fn abort(&mut self, reason: AbortReason) -> Transition {
        tracing::warn!("Batch aborted: {}", reason);
        self.reset();
        self.last_outcome = Some(BatchOutcome::Aborted(reason.clone()));
        Transition::Aborted(reason)
    }

    /// Empty the job list and clear the cursor.
    fn reset(&mut self) {
        self.jobs.clear();
        self.cursor = None;
        self.phase = BatchPhase::Idle;
        if let Some(logger) = self.logger.take() {
            logger.close();
        }
    }

    fn open_logger(&mut self) {
        let logger = match &self.log_dir {
            Some(dir) => match BatchLogger::new(dir, self.log_config.clone(), self.gui_callback()) {
                Ok(logger) => logger,
                Err(e) => {
                    tracing::warn!("Failed to create batch log in {}: {}", dir.display(), e);
                    BatchLogger::without_file(self.log_config.clone(), self.gui_callback())
                }
            },
            None => BatchLogger::without_file(self.log_config.clone(), self.gui_callback()),
        };
        if let Some(path) = logger.log_path() {
            tracing::info!("Batch log: {}", path.display());
        }
        self.logger = Some(logger);
    }

    fn gui_callback(&self) -> Option<GuiLogCallback> {
        self.log_callback.clone().map(|cb| {
            let boxed: GuiLogCallback = Box::new(move |line: &str| cb(line));
            boxed
        })
    }

    fn log_info(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.info(message),
            None => tracing::info!("{}", message),
        }
    }

    fn log_success(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.done(message),
            None => tracing::info!("{}", message),
        }
    }

    fn log_error(&self, message: &str) {
        match &self.logger {
            Some(logger) => logger.error(message),
            None => tracing::error!("{}", message),
        }
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("phase", &self.phase)
            .field("cursor", &self.cursor)
            .field("jobs", &self.jobs.len())
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{AssetCatalog, FolderResolver, ResolveError};
    use crate::models::{AssetKind, AssetRef, PackagePath, RenderTargetKind};
    use crate::render::StartError;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    #[derive(Default)]
    struct DriverState {
        started: Vec<(String, PathBuf)>,
        rendering: bool,
        fail_start_at: Option<usize>,
        error: String,
        reclaimed: usize,
    }

    #[derive(Clone, Default)]
    struct MockDriver(Rc<RefCell<DriverState>>);

    impl RenderDriver for MockDriver {
        fn start_render(
            &mut self,
            job: &SequenceRenderJob,
            _config: &TargetConfiguration,
            _resolution: OutputImageResolution,
        ) -> Result<(), StartError> {
            let mut state = self.0.borrow_mut();
            if state.rendering {
                return Err(StartError::Busy);
            }
            if state.fail_start_at == Some(state.started.len()) {
                return Err(StartError::other("level failed to load"));
            }
            state
                .started
                .push((job.name().to_string(), job.output_directory().to_path_buf()));
            state.rendering = true;
            Ok(())
        }

        fn is_rendering(&self) -> bool {
            self.0.borrow().rendering
        }

        fn error_message(&self) -> String {
            self.0.borrow().error.clone()
        }

        fn reclaim_memory(&mut self) {
            self.0.borrow_mut().reclaimed += 1;
        }
    }

    struct MemoryRegistry {
        assets: Vec<AssetRef>,
    }

    impl MemoryRegistry {
        fn with_sequences(names: &[&str]) -> Self {
            let package = PackagePath::new("/Game/Shots");
            let mut assets = vec![AssetRef::new(&package, "M_Wall", AssetKind::Material)];
            assets.extend(
                names
                    .iter()
                    .map(|n| AssetRef::new(&package, *n, AssetKind::LevelSequence)),
            );
            Self { assets }
        }
    }

    impl FolderResolver for MemoryRegistry {
        fn resolve_folder(&self, folder: &Path) -> Result<PackagePath, ResolveError> {
            if folder == Path::new("/project/Content/Shots") {
                Ok(PackagePath::new("/Game/Shots"))
            } else {
                Err(ResolveError::OutsideContent(folder.display().to_string()))
            }
        }
    }

    impl AssetCatalog for MemoryRegistry {
        fn list_assets(&self, _package: &PackagePath) -> Vec<AssetRef> {
            self.assets.clone()
        }
    }

    struct CountingHook(Rc<RefCell<Vec<(usize, usize)>>>);

    impl InterJobHook for CountingHook {
        fn between_jobs(
            &mut self,
            driver: &mut dyn RenderDriver,
            finished: usize,
            next: usize,
            _total: usize,
        ) {
            driver.reclaim_memory();
            self.0.borrow_mut().push((finished, next));
        }
    }

    struct Harness {
        orchestrator: BatchOrchestrator,
        driver: MockDriver,
        notes: Rc<RefCell<Vec<Notification>>>,
        hook_calls: Rc<RefCell<Vec<(usize, usize)>>>,
    }

    impl Harness {
        fn new(sequences: &[&str]) -> Self {
            let driver = MockDriver::default();
            let notes = Rc::new(RefCell::new(Vec::new()));
            let hook_calls = Rc::new(RefCell::new(Vec::new()));

            let sink = Rc::clone(&notes);
            let orchestrator = BatchOrchestrator::new(
                Box::new(driver.clone()),
                Box::new(MemoryRegistry::with_sequences(sequences)),
                Box::new(move |n: Notification| sink.borrow_mut().push(n)),
            )
            .with_hook(Box::new(CountingHook(Rc::clone(&hook_calls))));

            Self {
                orchestrator,
                driver,
                notes,
                hook_calls,
            }
        }

        /// Renderer reports completion of the job in flight.
        fn finish(&mut self, success: bool) -> Transition {
            self.driver.0.borrow_mut().rendering = false;
            self.orchestrator.on_rendering_finished(success)
        }

        fn started(&self) -> Vec<String> {
            self.driver
                .0
                .borrow()
                .started
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }
    }

    fn request() -> BatchRequest {
        let mut config = TargetConfiguration::default();
        config.set_selected(RenderTargetKind::ColorImage, true);
        BatchRequest {
            sequences_folder: PathBuf::from("/project/Content/Shots"),
            output_directory: PathBuf::from("/renders"),
            config,
            resolution: OutputImageResolution::default(),
        }
    }

    #[test]
    fn renders_every_sequence_in_order() {
        crate::logging::init_test_tracing();
        let mut h = Harness::new(&["Shot010", "Shot020", "Shot030"]);

        let t = h.orchestrator.start_batch(request()).unwrap();
        assert_eq!(t, Transition::Started { total: 3 });
        assert_eq!(h.orchestrator.cursor(), Some(0));
        assert_eq!(h.orchestrator.phase(), BatchPhase::Rendering(0));

        assert_eq!(h.orchestrator.current_job().unwrap().name(), "Shot010");

        assert_eq!(h.finish(true), Transition::Advanced { index: 1, total: 3 });
        assert_eq!(h.orchestrator.current_job().unwrap().name(), "Shot020");
        assert_eq!(h.finish(true), Transition::Advanced { index: 2, total: 3 });
        assert_eq!(h.finish(true), Transition::Completed { count: 3 });
        assert!(h.orchestrator.current_job().is_none());

        assert_eq!(h.started(), ["Shot010", "Shot020", "Shot030"]);
        let outputs: Vec<PathBuf> = h
            .driver
            .0
            .borrow()
            .started
            .iter()
            .map(|(_, dir)| dir.clone())
            .collect();
        assert_eq!(outputs[1], PathBuf::from("/renders/Shot020"));

        assert_eq!(
            *h.notes.borrow(),
            vec![Notification::BatchRenderingComplete { count: 3 }]
        );
        assert!(!h.orchestrator.is_active());
        assert!(h.orchestrator.jobs().is_empty());
        assert_eq!(
            h.orchestrator.last_outcome(),
            Some(&BatchOutcome::Completed { count: 3 })
        );
    }

    #[test]
    fn hook_runs_between_sequences_only() {
        let mut h = Harness::new(&["A", "B", "C", "D"]);
        h.orchestrator.start_batch(request()).unwrap();
        for _ in 0..4 {
            h.finish(true);
        }

        assert_eq!(*h.hook_calls.borrow(), vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(h.driver.0.borrow().reclaimed, 3);
    }

    #[test]
    fn single_sequence_batch_skips_hook() {
        let mut h = Harness::new(&["Only"]);
        h.orchestrator.start_batch(request()).unwrap();
        assert_eq!(h.finish(true), Transition::Completed { count: 1 });
        assert!(h.hook_calls.borrow().is_empty());
    }

    #[test]
    fn failure_aborts_remaining_sequences() {
        let mut h = Harness::new(&["Shot010", "Shot020", "Shot030"]);
        h.orchestrator.start_batch(request()).unwrap();
        h.finish(true);

        h.driver.0.borrow_mut().error = "GPU device lost".to_string();
        let t = h.finish(false);

        let reason = AbortReason::RenderFailed {
            sequence: "Shot020".to_string(),
            error: "GPU device lost".to_string(),
        };
        assert_eq!(t, Transition::Aborted(reason.clone()));
        assert_eq!(h.started(), ["Shot010", "Shot020"]);
        assert_eq!(
            *h.notes.borrow(),
            vec![Notification::RenderingFailed {
                sequence: "Shot020".to_string(),
                error: "GPU device lost".to_string(),
            }]
        );
        assert_eq!(h.orchestrator.cursor(), None);
        assert_eq!(h.orchestrator.last_outcome(), Some(&BatchOutcome::Aborted(reason)));
    }

    #[test]
    fn empty_folder_reports_no_sequences() {
        let mut h = Harness::new(&[]);
        let t = h.orchestrator.start_batch(request()).unwrap();

        assert_eq!(t, Transition::Aborted(AbortReason::NoSequencesFound));
        assert_eq!(*h.notes.borrow(), vec![Notification::NoSequencesFound]);
        assert!(h.started().is_empty());
        assert!(!h.orchestrator.is_active());
    }

    #[test]
    fn folder_outside_content_is_rejected() {
        let mut h = Harness::new(&["Shot010"]);
        let mut req = request();
        req.sequences_folder = PathBuf::from("/tmp/elsewhere");

        let t = h.orchestrator.start_batch(req).unwrap();
        assert!(matches!(
            t,
            Transition::Aborted(AbortReason::InvalidFolder(ResolveError::OutsideContent(_)))
        ));
        assert_eq!(*h.notes.borrow(), vec![Notification::InvalidFolder]);
        assert!(h.started().is_empty());
    }

    #[test]
    fn start_failure_mid_batch_aborts() {
        let mut h = Harness::new(&["Shot010", "Shot020"]);
        h.driver.0.borrow_mut().fail_start_at = Some(1);
        h.orchestrator.start_batch(request()).unwrap();

        let t = h.finish(true);
        assert_eq!(
            t,
            Transition::Aborted(AbortReason::StartFailed {
                sequence: "Shot020".to_string(),
                message: "level failed to load".to_string(),
            })
        );
        assert_eq!(
            *h.notes.borrow(),
            vec![Notification::CouldNotStartRendering {
                message: "level failed to load".to_string(),
            }]
        );
        assert!(!h.orchestrator.is_active());
    }

    #[test]
    fn start_failure_on_first_sequence_aborts() {
        let mut h = Harness::new(&["Shot010"]);
        h.driver.0.borrow_mut().fail_start_at = Some(0);

        let t = h.orchestrator.start_batch(request()).unwrap();
        assert!(matches!(t, Transition::Aborted(AbortReason::StartFailed { .. })));
        assert_eq!(h.orchestrator.phase(), BatchPhase::Idle);
    }

    #[test]
    fn rejects_start_while_rendering() {
        let mut h = Harness::new(&["Shot010", "Shot020"]);
        h.driver.0.borrow_mut().rendering = true;

        let err = h.orchestrator.start_batch(request()).unwrap_err();
        assert_eq!(err, StartRejected::RendererBusy);
        assert!(h.started().is_empty());
        assert!(h.notes.borrow().is_empty());
        assert_eq!(h.orchestrator.cursor(), None);
    }

    #[test]
    fn rejects_second_batch_while_one_is_active() {
        let mut h = Harness::new(&["Shot010", "Shot020"]);
        h.orchestrator.start_batch(request()).unwrap();
        h.driver.0.borrow_mut().rendering = false;

        let err = h.orchestrator.start_batch(request()).unwrap_err();
        assert_eq!(err, StartRejected::BatchActive);
        assert_eq!(h.orchestrator.cursor(), Some(0));
        assert_eq!(h.orchestrator.jobs().len(), 2);
    }

    #[test]
    fn gate_requires_folder_and_targets() {
        let mut h = Harness::new(&["Shot010"]);

        let mut no_folder = request();
        no_folder.sequences_folder = PathBuf::new();
        assert_eq!(
            h.orchestrator.start_batch(no_folder).unwrap_err(),
            StartRejected::NoFolderSelected
        );

        let mut no_targets = request();
        for kind in RenderTargetKind::all() {
            no_targets.config.set_selected(*kind, false);
        }
        assert_eq!(
            h.orchestrator.start_batch(no_targets).unwrap_err(),
            StartRejected::NoTargetsSelected
        );
        assert!(h.started().is_empty());
    }

    #[test]
    fn completion_without_batch_reports_plainly() {
        let mut h = Harness::new(&[]);

        assert_eq!(h.finish(true), Transition::SingleRenderFinished { success: true });

        h.driver.0.borrow_mut().error = "crashed".to_string();
        assert_eq!(h.finish(false), Transition::SingleRenderFinished { success: false });

        assert_eq!(
            *h.notes.borrow(),
            vec![
                Notification::RenderingSucceeded,
                Notification::RenderingFailed {
                    sequence: "Unknown".to_string(),
                    error: "crashed".to_string(),
                },
            ]
        );
    }

    #[test]
    fn batch_log_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let lines = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&lines);

        let mut h = Harness::new(&["Shot010"]);
        h.orchestrator = h
            .orchestrator
            .with_batch_logs(dir.path(), LogConfig::default())
            .with_log_callback(Arc::new(move |line: &str| sink.lock().push(line.to_string())));

        h.orchestrator.start_batch(request()).unwrap();
        h.finish(true);

        let logs: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(logs.len(), 1);
        assert!(lines.lock().iter().any(|l| l.contains("Shot010")));
    }
}
