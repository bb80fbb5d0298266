//! Control panel session.

mod session;

pub use session::ControlPanel;
