// Dashboard orchestrator - refresh cadence, range selection, view assembly
use crate::application::export_service::{self, CsvDownload, ExportError};
use crate::application::live_feed::{FeedState, LiveFeed};
use crate::application::session::SessionProvider;
use crate::application::translator::{Language, Translator};
use crate::domain::dashboard::{
    ChartPoint, ChartSeries, DashboardPhase, DashboardView, Recommendation, WidgetTile,
};
use crate::domain::history::TimeRange;
use crate::domain::reading::{Parameter, Reading};
use crate::domain::thresholds::{self, ConditionTier};
use crate::domain::timefmt;
use chrono::Utc;
use futures::{Stream, StreamExt};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

struct AutoRefresh {
    enabled: bool,
    task: Option<JoinHandle<()>>,
}

/// Owns the presentation-facing dashboard state: the selected time range
/// and the auto-refresh timer. The session handle and translator come in
/// through the constructor; nothing here reads ambient globals.
pub struct DashboardService {
    feed: Arc<LiveFeed>,
    translator: Arc<dyn Translator>,
    sessions: Arc<dyn SessionProvider>,
    refresh_period: Duration,
    selected_range: RwLock<TimeRange>,
    auto_refresh: Mutex<AutoRefresh>,
}

impl DashboardService {
    pub fn new(
        feed: Arc<LiveFeed>,
        translator: Arc<dyn Translator>,
        sessions: Arc<dyn SessionProvider>,
        refresh_period: Duration,
    ) -> Arc<Self> {
        let service = Arc::new(Self {
            feed,
            translator,
            sessions,
            refresh_period,
            selected_range: RwLock::new(TimeRange::Day),
            auto_refresh: Mutex::new(AutoRefresh {
                enabled: false,
                task: None,
            }),
        });
        // Auto-refresh starts enabled, mirroring the dashboard default.
        service.set_auto_refresh(true);
        service
    }

    pub fn range(&self) -> TimeRange {
        *self.selected_range.read().unwrap()
    }

    /// Switching range only changes which already-computed series is
    /// displayed; it never re-enters the loading phase.
    pub fn set_range(&self, range: TimeRange) {
        *self.selected_range.write().unwrap() = range;
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        self.auto_refresh.lock().unwrap().enabled
    }

    /// Toggle the recurring refresh timer. Enabling always schedules from
    /// now: the first tick lands a full period after the toggle, with no
    /// leftover partial period from an earlier schedule.
    pub fn set_auto_refresh(&self, enabled: bool) {
        let mut guard = self.auto_refresh.lock().unwrap();
        if let Some(task) = guard.task.take() {
            task.abort();
        }
        guard.enabled = enabled;

        if enabled {
            let feed = self.feed.clone();
            let period = self.refresh_period;
            guard.task = Some(tokio::spawn(async move {
                loop {
                    tokio::time::sleep(period).await;
                    tracing::debug!("auto-refresh tick");
                    feed.refetch().await;
                }
            }));
        }
    }

    /// Manual refresh. Returns whether the pull succeeded.
    pub async fn refresh(&self) -> bool {
        self.feed.refetch().await
    }

    pub async fn view(
        &self,
        language: Language,
        token: Option<&str>,
        range_override: Option<TimeRange>,
    ) -> DashboardView {
        let user = match token {
            Some(token) => self.sessions.current_user(token).await,
            None => None,
        };
        let state = self.feed.state();
        self.assemble(&state, language, user, range_override)
    }

    /// Stream of views, one per feed update, starting with the current
    /// state. Backs the chunked streaming endpoint.
    pub fn view_stream(
        self: Arc<Self>,
        language: Language,
        user: Option<String>,
        range_override: Option<TimeRange>,
    ) -> impl Stream<Item = DashboardView> + Send + 'static {
        let states = self.feed.watch();
        WatchStream::new(states)
            .map(move |state| self.assemble(&state, language, user.clone(), range_override))
    }

    pub fn export_parameter(
        &self,
        parameter: Parameter,
        range: Option<TimeRange>,
    ) -> Result<CsvDownload, ExportError> {
        let range = range.unwrap_or_else(|| self.range());
        let state = self.feed.state();
        export_service::single_parameter_csv(
            state.historical.series(range),
            parameter,
            range,
            Utc::now().date_naive(),
        )
    }

    pub fn export_all(&self, range: Option<TimeRange>) -> Result<CsvDownload, ExportError> {
        let range = range.unwrap_or_else(|| self.range());
        let state = self.feed.state();
        export_service::all_parameters_csv(
            state.historical.series(range),
            range,
            Utc::now().date_naive(),
        )
    }

    pub async fn shutdown(&self) {
        self.set_auto_refresh(false);
        self.feed.shutdown().await;
    }

    fn assemble(
        &self,
        state: &FeedState,
        language: Language,
        user: Option<String>,
        range_override: Option<TimeRange>,
    ) -> DashboardView {
        let range = range_override.unwrap_or_else(|| self.range());
        let current = state.current.as_ref();

        let (overall_tier, overall_status) = match current {
            Some(reading) => {
                let tier = thresholds::overall(reading);
                (tier, self.translate(language, overall_status_key(tier)))
            }
            None => (
                ConditionTier::Neutral,
                self.translate(language, "notMonitoring"),
            ),
        };

        DashboardView {
            phase: phase(state),
            user,
            overall_tier,
            overall_status,
            current: state.current.clone(),
            widgets: self.widget_tiles(current, language),
            alerts: current
                .map(|reading| self.alerts(reading, language))
                .unwrap_or_default(),
            recommendations: current
                .map(|reading| self.recommendations(reading, language))
                .unwrap_or_default(),
            range,
            charts: charts(state, range),
            auto_refresh: self.auto_refresh_enabled(),
            last_updated: current.map(|reading| reading.captured_at),
            error: state.error.as_ref().map(|e| {
                format!(
                    "{} ({})",
                    self.translate(language, "errorLoadingWaterQualityData"),
                    e
                )
            }),
        }
    }

    fn widget_tiles(&self, current: Option<&Reading>, language: Language) -> Vec<WidgetTile> {
        Parameter::ALL
            .iter()
            .map(|&parameter| match current {
                Some(reading) => {
                    let value = reading.value(parameter);
                    let tier = thresholds::classify(parameter, value);
                    WidgetTile {
                        parameter: parameter.wire_name(),
                        value: Some(value),
                        unit: parameter.unit(),
                        tier,
                        status_text: self.translate(language, tier.status_key()),
                        usage_level: Some(thresholds::usage_level(parameter, value)),
                    }
                }
                None => WidgetTile {
                    parameter: parameter.wire_name(),
                    value: None,
                    unit: parameter.unit(),
                    tier: ConditionTier::Neutral,
                    status_text: self
                        .translate(language, ConditionTier::Neutral.status_key()),
                    usage_level: None,
                },
            })
            .collect()
    }

    fn alerts(&self, reading: &Reading, language: Language) -> Vec<String> {
        let t = |key: &str| self.translate(language, key);
        let mut alerts = Vec::new();

        if reading.ph < 6.5 || reading.ph > 8.5 {
            alerts.push(format!(
                "{} ({}) {}",
                t("pH"),
                reading.ph,
                t("alertPhOutsideRange")
            ));
        }

        if reading.tds >= 600.0 {
            alerts.push(format!(
                "{} ({} ppm) {}",
                t("TDS"),
                reading.tds,
                t("alertTdsHigh")
            ));
        } else if reading.tds >= 300.0 {
            alerts.push(format!(
                "{} ({} ppm) {}",
                t("TDS"),
                reading.tds,
                t("alertTdsModerate")
            ));
        }

        if reading.temperature < 10.0 || reading.temperature > 25.0 {
            alerts.push(format!(
                "{} ({}°C) {}",
                t("Temperature"),
                reading.temperature,
                t("alertTemperatureOutsideRange")
            ));
        }

        alerts
    }

    fn recommendations(&self, reading: &Reading, language: Language) -> Vec<Recommendation> {
        Parameter::ALL
            .iter()
            .map(|&parameter| {
                let key = recommendation_key(parameter, reading.value(parameter));
                Recommendation {
                    parameter: parameter.wire_name(),
                    text: self.translate(language, key),
                }
            })
            .collect()
    }

    fn translate(&self, language: Language, key: &str) -> String {
        self.translator.translate(language, key)
    }
}

impl Drop for DashboardService {
    fn drop(&mut self) {
        if let Some(task) = self.auto_refresh.lock().unwrap().task.take() {
            task.abort();
        }
    }
}

fn phase(state: &FeedState) -> DashboardPhase {
    if state.current.is_some() {
        // A failed refresh on top of good data stays Ready; the error is
        // an overlay, not a state replacing the data.
        DashboardPhase::Ready
    } else if state.loading {
        DashboardPhase::Loading
    } else if state.error.is_some() {
        DashboardPhase::Error
    } else {
        DashboardPhase::Idle
    }
}

fn overall_status_key(tier: ConditionTier) -> &'static str {
    match tier {
        ConditionTier::Good => "good",
        ConditionTier::Moderate => "moderate",
        ConditionTier::Poor => "poor",
        ConditionTier::Neutral => "notMonitoring",
    }
}

fn recommendation_key(parameter: Parameter, value: f64) -> &'static str {
    match parameter {
        Parameter::Ph => {
            if value < 6.5 {
                "pHRecommendationAcidic"
            } else if value > 8.5 {
                "pHRecommendationAlkaline"
            } else {
                "pHRecommendationNormal"
            }
        }
        Parameter::Tds => {
            if value < 300.0 {
                "tdsRecommendationLow"
            } else if value < 600.0 {
                "tdsRecommendationModerate"
            } else {
                "tdsRecommendationHigh"
            }
        }
        Parameter::Temperature => {
            if value < 10.0 {
                "tempRecommendationLow"
            } else if value > 25.0 {
                "tempRecommendationHigh"
            } else {
                "tempRecommendationNormal"
            }
        }
    }
}

fn charts(state: &FeedState, range: TimeRange) -> Vec<ChartSeries> {
    let series = state.historical.series(range);

    Parameter::ALL
        .iter()
        .map(|&parameter| {
            let (optimal_min, optimal_max) = thresholds::optimal_range(parameter);
            let points = series
                .iter()
                .map(|point| {
                    let value = point.value(parameter);
                    ChartPoint {
                        label: timefmt::bucket_label(point.captured_at, range),
                        long_label: timefmt::long_label(point.captured_at, range),
                        sort_key: timefmt::sort_key(point.captured_at),
                        value,
                        out_of_range: value < optimal_min || value > optimal_max,
                    }
                })
                .collect();

            ChartSeries {
                parameter: parameter.wire_name(),
                unit: parameter.unit(),
                optimal_min,
                optimal_max,
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::reading_source::{ReadingSource, SourceError, SourceItem};
    use crate::application::session::SessionProvider;
    use crate::domain::reading::RawReading;
    use crate::infrastructure::translations::StaticTranslations;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    struct FakeSource {
        push_rx: Mutex<Option<mpsc::Receiver<SourceItem>>>,
        fetch_results: Mutex<VecDeque<SourceItem>>,
        fetch_calls: AtomicUsize,
    }

    impl FakeSource {
        fn new() -> (Arc<Self>, mpsc::Sender<SourceItem>) {
            let (push_tx, push_rx) = mpsc::channel(8);
            let source = Arc::new(Self {
                push_rx: Mutex::new(Some(push_rx)),
                fetch_results: Mutex::new(VecDeque::new()),
                fetch_calls: AtomicUsize::new(0),
            });
            (source, push_tx)
        }

        fn queue_fetch(&self, item: SourceItem) {
            self.fetch_results.lock().unwrap().push_back(item);
        }

        fn fetch_count(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadingSource for FakeSource {
        async fn fetch_current(&self) -> SourceItem {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.fetch_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(None))
        }

        async fn subscribe(&self) -> mpsc::Receiver<SourceItem> {
            self.push_rx
                .lock()
                .unwrap()
                .take()
                .expect("subscribed more than once")
        }
    }

    struct NoSessions;

    #[async_trait]
    impl SessionProvider for NoSessions {
        async fn login(&self, _email: &str, _password: &str) -> anyhow::Result<String> {
            anyhow::bail!("not supported")
        }

        async fn signup(&self, _email: &str, _password: &str) -> anyhow::Result<String> {
            anyhow::bail!("not supported")
        }

        async fn logout(&self, _token: &str) {}

        async fn current_user(&self, token: &str) -> Option<String> {
            (token == "valid").then(|| "ops@example.com".to_string())
        }
    }

    fn raw(ph: f64, tds: f64, temperature: f64) -> RawReading {
        RawReading {
            ph,
            tds,
            temperature,
        }
    }

    fn service_with_period(
        source: Arc<FakeSource>,
        period: Duration,
    ) -> (Arc<DashboardService>, Arc<LiveFeed>) {
        let feed = Arc::new(LiveFeed::spawn_with_rng(source, StdRng::seed_from_u64(42)));
        let service = DashboardService::new(
            feed.clone(),
            Arc::new(StaticTranslations),
            Arc::new(NoSessions),
            period,
        );
        (service, feed)
    }

    async fn wait_for_current(feed: &LiveFeed) {
        let mut rx = feed.watch();
        tokio::time::timeout(Duration::from_secs(5), async {
            while rx.borrow().current.is_none() {
                rx.changed().await.expect("feed task gone");
            }
        })
        .await
        .expect("reading never arrived");
    }

    #[tokio::test]
    async fn test_view_starts_loading_then_idles_without_data() {
        let (source, push_tx) = FakeSource::new();
        let (service, feed) = service_with_period(source, Duration::from_secs(3600));
        service.set_auto_refresh(false);

        let view = service.view(Language::English, None, None).await;
        assert_eq!(view.phase, DashboardPhase::Loading);

        push_tx.send(Ok(None)).await.unwrap();
        let mut rx = feed.watch();
        tokio::time::timeout(Duration::from_secs(5), async {
            while rx.borrow().loading {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        let view = service.view(Language::English, None, None).await;
        assert_eq!(view.phase, DashboardPhase::Idle);
        assert_eq!(view.overall_tier, ConditionTier::Neutral);
        assert_eq!(view.overall_status, "Not monitoring");
        assert!(view.widgets.iter().all(|w| w.tier == ConditionTier::Neutral));
        assert!(view.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_view_with_out_of_band_reading() {
        let (source, push_tx) = FakeSource::new();
        let (service, feed) = service_with_period(source, Duration::from_secs(3600));
        service.set_auto_refresh(false);

        push_tx.send(Ok(Some(raw(9.5, 650.0, 28.0)))).await.unwrap();
        wait_for_current(&feed).await;

        let view = service.view(Language::English, Some("valid"), None).await;
        assert_eq!(view.phase, DashboardPhase::Ready);
        assert_eq!(view.user.as_deref(), Some("ops@example.com"));
        assert_eq!(view.overall_tier, ConditionTier::Poor);
        assert_eq!(view.alerts.len(), 3);
        assert!(view.alerts[0].contains("pH Level (9.5)"));
        assert!(view.alerts[1].contains("650 ppm"));

        let texts: Vec<&str> = view
            .recommendations
            .iter()
            .map(|r| r.text.as_str())
            .collect();
        assert!(texts[0].contains("too alkaline"));
        assert!(texts[1].contains("high"));
        assert!(texts[2].contains("high"));

        assert_eq!(view.charts.len(), 3);
        assert_eq!(view.charts[0].points.len(), 24);
        assert!(view.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_range_switch_stays_ready() {
        let (source, push_tx) = FakeSource::new();
        let (service, feed) = service_with_period(source, Duration::from_secs(3600));
        service.set_auto_refresh(false);

        push_tx.send(Ok(Some(raw(7.2, 250.0, 18.0)))).await.unwrap();
        wait_for_current(&feed).await;

        service.set_range(TimeRange::Week);
        let view = service.view(Language::English, None, None).await;
        assert_eq!(view.phase, DashboardPhase::Ready);
        assert_eq!(view.range, TimeRange::Week);
        assert_eq!(view.charts[0].points.len(), 7);

        // A per-request override does not disturb the sticky selection
        let view = service
            .view(Language::English, None, Some(TimeRange::Year))
            .await;
        assert_eq!(view.charts[0].points.len(), 12);
        assert_eq!(service.range(), TimeRange::Week);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_an_overlay_not_a_state() {
        let (source, push_tx) = FakeSource::new();
        let (service, feed) = service_with_period(source.clone(), Duration::from_secs(3600));
        service.set_auto_refresh(false);

        push_tx.send(Ok(Some(raw(7.2, 250.0, 18.0)))).await.unwrap();
        wait_for_current(&feed).await;

        source.queue_fetch(Err(SourceError::Unavailable("gateway timeout".into())));
        assert!(!service.refresh().await);

        let mut rx = feed.watch();
        tokio::time::timeout(Duration::from_secs(5), async {
            while rx.borrow().error.is_none() {
                rx.changed().await.unwrap();
            }
        })
        .await
        .unwrap();

        let view = service.view(Language::English, None, None).await;
        assert_eq!(view.phase, DashboardPhase::Ready);
        assert!(view.current.is_some());
        assert!(view.error.as_ref().unwrap().contains("gateway timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_toggle_resets_the_period() {
        let (source, _push_tx) = FakeSource::new();
        let (service, _feed) = service_with_period(source.clone(), Duration::from_secs(30));

        let settle = || async {
            for _ in 0..50 {
                tokio::task::yield_now().await;
            }
        };
        settle().await;

        tokio::time::advance(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(source.fetch_count(), 0);

        // Toggling off then on discards the almost-elapsed period
        service.set_auto_refresh(false);
        service.set_auto_refresh(true);
        settle().await;

        tokio::time::advance(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(source.fetch_count(), 0);

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_view_stream_emits_on_feed_updates() {
        let (source, push_tx) = FakeSource::new();
        let (service, _feed) = service_with_period(source, Duration::from_secs(3600));
        service.set_auto_refresh(false);

        let mut views = Box::pin(
            service
                .clone()
                .view_stream(Language::English, None, Some(TimeRange::Week)),
        );

        // WatchStream yields the state at subscription time first
        let first = views.next().await.unwrap();
        assert_eq!(first.phase, DashboardPhase::Loading);

        push_tx.send(Ok(Some(raw(7.2, 250.0, 18.0)))).await.unwrap();

        let updated = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let view = views.next().await.unwrap();
                if view.current.is_some() {
                    return view;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(updated.phase, DashboardPhase::Ready);
        assert_eq!(updated.range, TimeRange::Week);
        assert_eq!(updated.charts[0].points.len(), 7);
    }

    #[tokio::test]
    async fn test_export_selected_series() {
        let (source, push_tx) = FakeSource::new();
        let (service, feed) = service_with_period(source, Duration::from_secs(3600));
        service.set_auto_refresh(false);

        assert_eq!(
            service.export_all(Some(TimeRange::Day)),
            Err(ExportError::EmptySeries)
        );

        push_tx.send(Ok(Some(raw(7.2, 250.0, 18.0)))).await.unwrap();
        wait_for_current(&feed).await;

        let download = service
            .export_parameter(Parameter::Ph, Some(TimeRange::Day))
            .unwrap();
        assert!(download.filename.starts_with("clearwater_ph_day_"));
        assert_eq!(download.content.split('\n').count(), 25);

        let download = service.export_all(Some(TimeRange::Week)).unwrap();
        assert!(download.filename.starts_with("clearwater_all_parameters_week_"));
        assert_eq!(download.content.split('\n').count(), 8);

        service.shutdown().await;
    }
}
