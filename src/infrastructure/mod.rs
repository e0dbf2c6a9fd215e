// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod json_stream;
pub mod memory_session;
pub mod realtime_source;
pub mod translations;
