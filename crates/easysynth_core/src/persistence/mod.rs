//! Panel state persistence.
//!
//! `PersistenceBridge` maps [`PanelState`] onto a flat `PanelStateRecord`
//! held by a `RecordStore`. `TomlRecordStore` keeps records as TOML files and
//! writes them atomically.

mod bridge;
mod record;
mod store;

pub use bridge::{PanelState, PersistenceBridge, PANEL_STATE_RECORD};
pub use record::PanelStateRecord;
pub use store::{PersistenceError, PersistenceResult, RecordStore, TomlRecordStore};
