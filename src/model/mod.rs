//! Data model for status-time accounting.
//!
//! - [`StatusEvent`]: a timestamped ENTERED/LEFT transition
//! - [`Item`]: creation/closure instants plus its event sequence
//! - [`StatusSet`]: the configured statuses of interest
//! - [`StatusDurations`]: per-status accumulated time, with explicit absence

pub mod event;
pub mod item;
pub mod status;

pub use event::*;
pub use item::*;
pub use status::*;
