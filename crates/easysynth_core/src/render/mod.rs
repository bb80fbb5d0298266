//! Render job driver abstraction.
//!
//! The renderer itself is an external collaborator. This module defines the
//! trait the orchestrator drives and the completion event it reacts to.

mod driver;

pub use driver::{RenderDriver, RenderingFinished, StartError};
