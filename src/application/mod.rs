// Application layer - Use cases and ports
pub mod dashboard_service;
pub mod export_service;
pub mod live_feed;
pub mod reading_source;
pub mod session;
pub mod translator;
