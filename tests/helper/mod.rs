#![allow(dead_code)]

mod clock;
mod fetcher;

pub use clock::ManualClock;
pub use fetcher::{FakeFetcher, RecordingObserver, release};
