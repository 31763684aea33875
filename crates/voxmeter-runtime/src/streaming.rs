pub mod watcher;

pub use watcher::{SessionWatcher, StreamEvent};
