//! Coordinates all fetch activity and owns the session state.
//!
//! All mutation funnels through the orchestrator (single-writer discipline);
//! the renderer and analytics read cloned snapshots. The state lock is never
//! held across a network await, so concurrent operations interleave only at
//! suspension points and consistency across pair changes rests on the
//! staleness tag checked before every selection-scoped write.

use crate::core::connection::ConnectionStatus;
use crate::core::model::{Forecast, HistoricalPoint, NewsArticle, RateQuote};
use crate::core::pair::CurrencyPair;
use crate::core::source::{
    ForecastParams, ForecastSource, HistoryParams, HistorySource, NewsSource, RateSource,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The aggregate of all currently valid market data. `history`, `news` and
/// `forecast` always correspond to `tracked_pair` at the moment they are
/// read.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub rates_by_pair: HashMap<CurrencyPair, RateQuote>,
    pub tracked_pair: CurrencyPair,
    pub history: Vec<HistoricalPoint>,
    pub news: Vec<NewsArticle>,
    pub forecast: Option<Forecast>,
    pub connection: ConnectionStatus,
    pub last_rate_fetch: Option<DateTime<Utc>>,
    pub loading: bool,
}

impl SessionState {
    fn new(tracked_pair: CurrencyPair) -> Self {
        SessionState {
            rates_by_pair: HashMap::new(),
            tracked_pair,
            history: Vec::new(),
            news: Vec::new(),
            forecast: None,
            connection: ConnectionStatus::default(),
            last_rate_fetch: None,
            loading: false,
        }
    }

    /// Quote for the currently tracked pair, if any fetch has completed.
    pub fn tracked_quote(&self) -> Option<&RateQuote> {
        self.rates_by_pair.get(&self.tracked_pair)
    }
}

/// The four data sources the orchestrator pulls from.
pub struct SourceSet {
    pub rates: Arc<dyn RateSource>,
    pub history: Arc<dyn HistorySource>,
    pub news: Arc<dyn NewsSource>,
    pub forecast: Arc<dyn ForecastSource>,
}

pub struct SyncOrchestrator {
    sources: SourceSet,
    history_params: HistoryParams,
    forecast_params: ForecastParams,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionState>,
}

impl SyncOrchestrator {
    pub fn new(
        sources: SourceSet,
        history_params: HistoryParams,
        forecast_params: ForecastParams,
        tracked_pair: CurrencyPair,
    ) -> Self {
        let initial = SessionState::new(tracked_pair);
        let (updates, _) = watch::channel(initial.clone());
        SyncOrchestrator {
            sources,
            history_params,
            forecast_params,
            state: Mutex::new(initial),
            updates,
        }
    }

    /// Full startup fetch: rates first, then the selection-scoped sources for
    /// whichever pair is tracked once rates have landed. Never gets stuck in
    /// loading; sources resolve to fallback data instead of failing.
    pub async fn initialize(&self) {
        info!("Initializing market data session");
        {
            let mut state = self.state.lock().await;
            state.loading = true;
            self.publish(&state);
        }

        self.refresh_rates().await;

        // Read the pair after the rates fetch so a selection made during
        // startup is honored by the initial pair-scoped fetch.
        let pair = { self.state.lock().await.tracked_pair };
        self.refresh_pair_data(pair).await;

        let mut state = self.state.lock().await;
        state.loading = false;
        self.publish(&state);
    }

    /// Changes the tracked pair and re-fetches its history, news and
    /// forecast. During initialization only the selection is recorded; the
    /// startup sequence picks it up.
    pub async fn select_pair(&self, pair: CurrencyPair) {
        let initializing = {
            let mut state = self.state.lock().await;
            state.tracked_pair = pair;
            self.publish(&state);
            state.loading
        };
        if initializing {
            debug!("Pair changed to {pair} during startup, deferring to the initial fetch");
            return;
        }
        self.refresh_pair_data(pair).await;
    }

    /// Re-fetches live rates only. Driven by the periodic timer and the
    /// manual refresh intent; overlapping invocations are safe because the
    /// rates map is replaced as a whole (last write wins).
    pub async fn refresh_rates(&self) {
        {
            let mut state = self.state.lock().await;
            state.connection.begin_attempt();
            self.publish(&state);
        }

        let result = self.sources.rates.fetch_rates().await;

        let mut state = self.state.lock().await;
        let complete = CurrencyPair::all()
            .iter()
            .all(|pair| result.data.contains_key(pair));
        if complete {
            if !result.live {
                debug!("Rates populated from fallback data");
            }
            state.rates_by_pair = result.data;
            state.last_rate_fetch = Some(Utc::now());
            state.connection.complete_attempt();
        } else {
            // Even the fallback path failed to cover every pair; the
            // generator broke its contract. Keep the previous map intact.
            warn!("Rates result is missing tracked pairs, flagging connection error");
            state.connection.fault();
        }
        self.publish(&state);
    }

    /// Fetches the three selection-scoped sources for `pair` concurrently and
    /// applies the writes only if `pair` is still the tracked selection when
    /// they resolve. Last-selected-pair wins; late results for an abandoned
    /// pair are discarded.
    async fn refresh_pair_data(&self, pair: CurrencyPair) {
        debug!("Fetching history, news and forecast for {pair}");
        let (history, news, forecast) = futures::join!(
            self.sources.history.fetch_history(pair, &self.history_params),
            self.sources.news.fetch_news(pair),
            self.sources.forecast.fetch_forecast(pair, &self.forecast_params),
        );

        let mut state = self.state.lock().await;
        if state.tracked_pair != pair {
            debug!(
                "Discarding stale results for {pair}, selection moved to {}",
                state.tracked_pair
            );
            return;
        }
        state.history = history.data;
        state.news = news.data;
        state.forecast = Some(forecast.data);
        self.publish(&state);
    }

    /// Read-only copy of the current session state.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Change notifications for the renderer; the receiver observes the
    /// snapshot published after every state mutation.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.clone());
    }

    /// Starts the periodic rates refresh. The task runs until the returned
    /// handle is stopped or dropped; refreshes cannot fail (sources resolve
    /// to fallback data), so the loop cannot crash.
    pub fn spawn_refresh_task(self: &Arc<Self>, period: Duration) -> RefreshHandle {
        let orchestrator = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately and initialize() has
            // already fetched.
            interval.tick().await;
            loop {
                interval.tick().await;
                debug!("Periodic rates refresh");
                orchestrator.refresh_rates().await;
            }
        });
        RefreshHandle { task }
    }
}

/// Lifecycle handle for the periodic refresh task.
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{HistoricalPoint, NewsArticle, Sentiment};
    use crate::core::source::SourceResult;
    use crate::providers::fallback::FallbackGenerator;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockRateSource {
        delay_ms: u64,
        partial: bool,
    }

    #[async_trait]
    impl RateSource for MockRateSource {
        async fn fetch_rates(&self) -> SourceResult<HashMap<CurrencyPair, RateQuote>> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            let mut rates = FallbackGenerator::new().rates();
            if self.partial {
                rates.remove(&CurrencyPair::GbpJpy);
                return SourceResult::fallback(rates);
            }
            SourceResult::live(rates)
        }
    }

    struct MockHistorySource {
        delays_ms: HashMap<CurrencyPair, u64>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl HistorySource for MockHistorySource {
        async fn fetch_history(
            &self,
            pair: CurrencyPair,
            _params: &HistoryParams,
        ) -> SourceResult<Vec<HistoricalPoint>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays_ms.get(&pair) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            // Rate encodes the pair so tests can tell whose data landed.
            SourceResult::live(vec![HistoricalPoint {
                timestamp: Utc::now(),
                rate: FallbackGenerator::seed_rate(pair),
                volume: 1_000_000,
            }])
        }
    }

    struct MockNewsSource {
        delays_ms: HashMap<CurrencyPair, u64>,
    }

    #[async_trait]
    impl NewsSource for MockNewsSource {
        async fn fetch_news(&self, pair: CurrencyPair) -> SourceResult<Vec<NewsArticle>> {
            if let Some(delay) = self.delays_ms.get(&pair) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            SourceResult::live(vec![NewsArticle {
                id: pair.to_string(),
                title: "headline".to_string(),
                content: "body".to_string(),
                source: "wire".to_string(),
                timestamp: Utc::now(),
                sentiment: Sentiment::neutral(),
            }])
        }
    }

    struct MockForecastSource {
        delays_ms: HashMap<CurrencyPair, u64>,
    }

    #[async_trait]
    impl ForecastSource for MockForecastSource {
        async fn fetch_forecast(
            &self,
            pair: CurrencyPair,
            params: &ForecastParams,
        ) -> SourceResult<Forecast> {
            if let Some(delay) = self.delays_ms.get(&pair) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            SourceResult::live(FallbackGenerator::new().forecast(pair, params.horizon, None))
        }
    }

    struct Fixture {
        orchestrator: Arc<SyncOrchestrator>,
        history_calls: Arc<AtomicUsize>,
    }

    fn fixture(rate_delay_ms: u64, pair_delays_ms: &[(CurrencyPair, u64)]) -> Fixture {
        let delays: HashMap<CurrencyPair, u64> = pair_delays_ms.iter().copied().collect();
        let history_calls = Arc::new(AtomicUsize::new(0));
        let sources = SourceSet {
            rates: Arc::new(MockRateSource {
                delay_ms: rate_delay_ms,
                partial: false,
            }),
            history: Arc::new(MockHistorySource {
                delays_ms: delays.clone(),
                calls: Arc::clone(&history_calls),
            }),
            news: Arc::new(MockNewsSource {
                delays_ms: delays.clone(),
            }),
            forecast: Arc::new(MockForecastSource { delays_ms: delays }),
        };
        Fixture {
            orchestrator: Arc::new(SyncOrchestrator::new(
                sources,
                HistoryParams::default(),
                ForecastParams::default(),
                CurrencyPair::UsdEur,
            )),
            history_calls,
        }
    }

    #[tokio::test]
    async fn test_initialize_populates_every_slice() {
        let fixture = fixture(0, &[]);
        fixture.orchestrator.initialize().await;

        let state = fixture.orchestrator.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.connection, ConnectionStatus::Connected);
        assert!(state.last_rate_fetch.is_some());
        for pair in CurrencyPair::all() {
            assert!(state.rates_by_pair.contains_key(&pair), "missing {pair}");
        }
        assert!(!state.history.is_empty());
        assert!(!state.news.is_empty());
        assert_eq!(state.forecast.unwrap().pair, CurrencyPair::UsdEur);
    }

    // Last-selected-pair wins: a slow in-flight fetch for the old pair must
    // not overwrite data after a newer selection has resolved.
    #[tokio::test]
    async fn test_stale_selection_results_are_discarded() {
        let fixture = fixture(
            0,
            &[(CurrencyPair::UsdEur, 100), (CurrencyPair::UsdGbp, 5)],
        );
        let orchestrator = Arc::clone(&fixture.orchestrator);

        let slow = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.select_pair(CurrencyPair::UsdEur).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        orchestrator.select_pair(CurrencyPair::UsdGbp).await;
        slow.await.unwrap();

        let state = orchestrator.snapshot().await;
        assert_eq!(state.tracked_pair, CurrencyPair::UsdGbp);
        assert_eq!(
            state.history[0].rate,
            FallbackGenerator::seed_rate(CurrencyPair::UsdGbp)
        );
        assert_eq!(state.news[0].id, "USD/GBP");
        assert_eq!(state.forecast.unwrap().pair, CurrencyPair::UsdGbp);
    }

    #[tokio::test]
    async fn test_selection_during_startup_is_deferred_to_initial_fetch() {
        let fixture = fixture(50, &[]);
        let orchestrator = Arc::clone(&fixture.orchestrator);

        let init = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.initialize().await })
        };
        // Arrives while initialize() is still awaiting the rates fetch.
        tokio::time::sleep(Duration::from_millis(10)).await;
        orchestrator.select_pair(CurrencyPair::EurJpy).await;
        init.await.unwrap();

        let state = orchestrator.snapshot().await;
        assert_eq!(state.tracked_pair, CurrencyPair::EurJpy);
        assert_eq!(state.forecast.unwrap().pair, CurrencyPair::EurJpy);
        // The deferred selection did not issue its own fetch; only the
        // startup sequence fetched, once, for the new pair.
        assert_eq!(fixture.history_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            state.history[0].rate,
            FallbackGenerator::seed_rate(CurrencyPair::EurJpy)
        );
    }

    #[tokio::test]
    async fn test_overlapping_rate_refreshes_leave_valid_state() {
        let fixture = fixture(20, &[]);
        let orchestrator = &fixture.orchestrator;

        futures::join!(orchestrator.refresh_rates(), orchestrator.refresh_rates());

        let state = orchestrator.snapshot().await;
        assert_eq!(state.connection, ConnectionStatus::Connected);
        assert_eq!(state.rates_by_pair.len(), 6);
        for pair in CurrencyPair::all() {
            assert_eq!(state.rates_by_pair.get(&pair).unwrap().pair, pair);
        }
    }

    #[tokio::test]
    async fn test_incomplete_rates_result_faults_and_preserves_state() {
        let history_calls = Arc::new(AtomicUsize::new(0));
        let sources = SourceSet {
            rates: Arc::new(MockRateSource {
                delay_ms: 0,
                partial: true,
            }),
            history: Arc::new(MockHistorySource {
                delays_ms: HashMap::new(),
                calls: history_calls,
            }),
            news: Arc::new(MockNewsSource {
                delays_ms: HashMap::new(),
            }),
            forecast: Arc::new(MockForecastSource {
                delays_ms: HashMap::new(),
            }),
        };
        let orchestrator = SyncOrchestrator::new(
            sources,
            HistoryParams::default(),
            ForecastParams::default(),
            CurrencyPair::UsdEur,
        );

        orchestrator.refresh_rates().await;

        let state = orchestrator.snapshot().await;
        assert_eq!(state.connection, ConnectionStatus::Error);
        // The incomplete map was not installed.
        assert!(state.rates_by_pair.is_empty());
        assert!(state.last_rate_fetch.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_observe_every_mutation() {
        let fixture = fixture(0, &[]);
        let orchestrator = &fixture.orchestrator;
        let mut updates = orchestrator.subscribe();

        orchestrator.select_pair(CurrencyPair::GbpJpy).await;

        assert!(updates.has_changed().unwrap());
        let state = updates.borrow_and_update().clone();
        assert_eq!(state.tracked_pair, CurrencyPair::GbpJpy);
    }

    #[tokio::test]
    async fn test_periodic_task_refreshes_rates_and_stops() {
        let fixture = fixture(0, &[]);
        let orchestrator = Arc::clone(&fixture.orchestrator);

        let handle = orchestrator.spawn_refresh_task(Duration::from_millis(25));
        tokio::time::sleep(Duration::from_millis(70)).await;
        handle.stop();

        let state = orchestrator.snapshot().await;
        assert_eq!(state.connection, ConnectionStatus::Connected);
        assert_eq!(state.rates_by_pair.len(), 6);

        // No further refreshes after stop.
        let last = state.last_rate_fetch;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(orchestrator.snapshot().await.last_rate_fetch, last);
    }
}
