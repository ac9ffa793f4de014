pub mod index;
pub mod store;
pub mod subscription;
pub mod watch_entry;
