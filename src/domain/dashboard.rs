// Dashboard view models
use crate::domain::history::TimeRange;
use crate::domain::reading::Reading;
use crate::domain::thresholds::{ConditionTier, UsageLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle phase of the dashboard. `Idle` doubles as the "not monitoring"
/// state when the source is reachable but holds no payload yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardPhase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// One parameter tile on the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTile {
    pub parameter: &'static str,
    pub value: Option<f64>,
    pub unit: &'static str,
    pub tier: ConditionTier,
    pub status_text: String,
    pub usage_level: Option<UsageLevel>,
}

/// One plotted point: the bucket label for the axis, the long label for the
/// tooltip, and a flag for points outside the optimal band.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub long_label: String,
    pub sort_key: i64,
    pub value: f64,
    pub out_of_range: bool,
}

/// Chart for one parameter over the selected range, with its optimal band
/// for reference lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub parameter: &'static str,
    pub unit: &'static str,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub parameter: &'static str,
    pub text: String,
}

/// Everything a dashboard render pass needs, assembled from the live feed
/// state in one pass. Receivers get this by value; none of them retain
/// their own copy of the underlying readings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub phase: DashboardPhase,
    pub user: Option<String>,
    pub overall_tier: ConditionTier,
    pub overall_status: String,
    pub current: Option<Reading>,
    pub widgets: Vec<WidgetTile>,
    pub alerts: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub range: TimeRange,
    pub charts: Vec<ChartSeries>,
    pub auto_refresh: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
}
