pub mod configuration;
pub mod http_client;
pub mod non_empty_string;
pub mod string_key;
pub mod tracing;
pub mod train_number;
