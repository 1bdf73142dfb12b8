//! Run configuration
//!
//! Every knob is a command-line flag with an environment-variable fallback,
//! matching the environment names the tool has historically used in CI. Raw
//! values are resolved into a [`Settings`] snapshot once, at startup; bad
//! integers and unparseable dates fall back to the persisted store rather
//! than aborting the run.

mod settings;

pub use settings::{Settings, StatsArgs};
