//! Batch rendering orchestration.
//!
//! This module provides:
//! - `BatchOrchestrator`: sequential state machine over one folder of sequences
//! - `InterJobHook`: work run between two sequences (memory reclaim + settle)
//! - `Notification` / `Notifier`: terminal and error dialogs
//!
//! # Example
//!
//! ```no_run
//! use easysynth_core::jobs::FsContentDirectory;
//! use easysynth_core::orchestrator::{BatchOrchestrator, BatchRequest, Notification};
//! # use easysynth_core::render::RenderDriver;
//! # fn driver() -> Box<dyn RenderDriver> { unimplemented!() }
//!
//! let registry = FsContentDirectory::new("/project/Content");
//! let mut orchestrator = BatchOrchestrator::new(
//!     driver(),
//!     Box::new(registry),
//!     Box::new(|n: Notification| eprintln!("{}", n)),
//! );
//! # let request: BatchRequest = unimplemented!();
//! orchestrator.start_batch(request).unwrap();
//! // later, for every completion event from the renderer:
//! orchestrator.on_rendering_finished(true);
//! ```

mod batch;
mod hooks;
mod notify;
mod types;

pub use batch::{BatchOrchestrator, SharedLogCallback};
pub use hooks::{InterJobHook, NoCleanup, ReclaimAndSettle};
pub use notify::{Notification, Notifier};
pub use types::{AbortReason, BatchOutcome, BatchPhase, BatchRequest, StartRejected, Transition};
