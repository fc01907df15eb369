//! Thread-safe hash map and set containers guarded by a reader-writer lock.

pub mod map;
pub mod set;

pub use map::SyncMap;
pub use set::SyncSet;
