//! The Scheduler Loop.
//!
//! Each open discussion gets one actor task that owns its [`Roundtable`]
//! exclusively. Triggers arrive as commands, model calls run as detached
//! tasks that report back on a channel, and every turn is handed to an
//! ordered persistence writer.
//!
//! [`Roundtable`]: roundtable_core::Roundtable

mod actor;
mod handle;
mod persistence;
mod status;
mod timer;

pub use handle::SchedulerHandle;
pub use status::RuntimeStatus;
