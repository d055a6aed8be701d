pub mod event_source;
pub mod snapshot_sink;
