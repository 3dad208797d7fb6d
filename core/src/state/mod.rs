//! Runtime bookkeeping that is never persisted

mod autosave;
mod seen;

pub use autosave::{AutoSaveScheduler, AutoSaveTick};
pub use seen::RecentlySeenCache;
