//! Background Tasks Module
//!
//! Contains background tasks that run alongside a cache.
//!
//! # Tasks
//! - Reaper: Removes expired cache entries at a configured interval

mod reaper;

pub use reaper::{Reaper, ReaperState};
