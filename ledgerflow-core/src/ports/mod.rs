//! Ports - trait seams between the core and its callers

mod observer;

pub use observer::{FailureNotice, FailureObserver, NullObserver};
