// Domain layer - Pure data and classification logic
pub mod dashboard;
pub mod history;
pub mod reading;
pub mod thresholds;
pub mod timefmt;
