// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod classify;
pub mod ingest;
pub mod metrics;
pub mod store;

pub use crate::api::{router, AppState};
pub use crate::classify::{classify, Category, Classification};
pub use crate::ingest::{IngestJob, IngestReport};
pub use crate::store::{Announcement, AnnouncementStore, MemoryStore, NewAnnouncement};
