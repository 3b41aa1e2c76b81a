//! Search-to-forecast pipeline
//!
//! [`SearchSession`] owns the user-facing state (input text, suggestions,
//! loading flag, current bundle) and drives the pipeline stages through an
//! explicit [`PipelineState`] machine:
//!
//! `Idle → Suggesting → Resolving → FetchingForecast → Ready | Failed`
//!
//! Every stage catches its own errors, logs them and reports an outcome value;
//! nothing is propagated to the caller and a failure never touches the
//! current bundle. Overlapping runs are ordered by a monotonically increasing
//! [`RunId`]: only the latest run may commit its bundle. Suggestion lookups are
//! ordered the same way by an input generation counter.

use crate::config::WeatherSiteConfig;
use crate::models::{ForecastBundle, GeoPoint, Suggestion};
use crate::normalize;
use crate::places::PlaceProvider;
use crate::weather::ForecastProvider;
use crate::{Result, WeatherSiteError};
use chrono::Locale;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Identifier of one pipeline run, increasing with every selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pipeline stage names used in failure reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Suggestion,
    Resolution,
    Forecast,
    Normalization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Suggestion => "suggestion",
            Stage::Resolution => "place resolution",
            Stage::Forecast => "forecast retrieval",
            Stage::Normalization => "forecast normalization",
        };
        f.write_str(name)
    }
}

/// Where the pipeline currently is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PipelineState {
    /// Nothing in flight
    Idle,
    /// Autocomplete lookup for `query` in flight
    Suggesting { query: String },
    /// Place details lookup for the selected suggestion
    Resolving { run: RunId, suggestion: Suggestion },
    /// Forecast lookup for resolved coordinates
    FetchingForecast { run: RunId, point: GeoPoint },
    /// Run committed a new bundle
    Ready { run: RunId, location_name: String },
    /// Run aborted; the previous bundle is still shown
    Failed {
        run: RunId,
        stage: Stage,
        message: String,
    },
}

impl PipelineState {
    /// Run id carried by run states
    #[must_use]
    pub fn run(&self) -> Option<RunId> {
        match self {
            PipelineState::Idle | PipelineState::Suggesting { .. } => None,
            PipelineState::Resolving { run, .. }
            | PipelineState::FetchingForecast { run, .. }
            | PipelineState::Ready { run, .. }
            | PipelineState::Failed { run, .. } => Some(*run),
        }
    }

    /// Whether a selection is being resolved or fetched
    #[must_use]
    pub fn is_run_in_progress(&self) -> bool {
        matches!(
            self,
            PipelineState::Resolving { .. } | PipelineState::FetchingForecast { .. }
        )
    }
}

/// Result of an input change
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestOutcome {
    /// Input was empty; suggestions cleared without a lookup
    Cleared,
    /// Suggestion list replaced with this many entries
    Updated(usize),
    /// Newer input arrived first; the response was discarded
    Superseded,
    /// Lookup failed; previous suggestions kept
    Failed(WeatherSiteError),
}

/// Result of a selection
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Bundle committed
    Ready(RunId),
    /// A newer run started; the result was discarded
    Superseded(RunId),
    /// Run aborted at `stage`; bundle untouched
    Failed {
        run: RunId,
        stage: Stage,
        error: WeatherSiteError,
    },
}

/// Settings the pipeline needs besides its providers
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Daily records requested from the forecast provider
    pub forecast_days: u8,
    /// Locale for weekday names
    pub locale: Locale,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            forecast_days: 7,
            locale: Locale::en_US,
        }
    }
}

impl PipelineSettings {
    /// Settings from validated configuration
    pub fn from_config(config: &WeatherSiteConfig) -> anyhow::Result<Self> {
        Ok(Self {
            forecast_days: config.forecast.days,
            locale: config.locale()?,
        })
    }
}

#[derive(Debug)]
struct SessionState {
    input: String,
    suggestions: Vec<Suggestion>,
    input_generation: u64,
    lookups_in_flight: usize,
    runs_started: u64,
    latest_run: Option<RunId>,
    pipeline: PipelineState,
    bundle: Option<ForecastBundle>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            input: String::new(),
            suggestions: Vec::new(),
            input_generation: 0,
            lookups_in_flight: 0,
            runs_started: 0,
            latest_run: None,
            pipeline: PipelineState::Idle,
            bundle: None,
        }
    }
}

/// Search session driving the pipeline for one user
///
/// Cloning is cheap and clones share state, so stages may run on spawned
/// tasks while the front end reads the current state.
#[derive(Clone)]
pub struct SearchSession {
    places: Arc<dyn PlaceProvider>,
    forecasts: Arc<dyn ForecastProvider>,
    settings: PipelineSettings,
    state: Arc<Mutex<SessionState>>,
}

impl SearchSession {
    /// Create a session over the given providers
    pub fn new(
        places: Arc<dyn PlaceProvider>,
        forecasts: Arc<dyn ForecastProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            places,
            forecasts,
            settings,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Current input text
    #[must_use]
    pub fn input(&self) -> String {
        self.state.lock().input.clone()
    }

    /// Current suggestion list
    #[must_use]
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.state.lock().suggestions.clone()
    }

    /// Whether a suggestion lookup is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.lock().lookups_in_flight > 0
    }

    /// Current pipeline state
    #[must_use]
    pub fn pipeline_state(&self) -> PipelineState {
        self.state.lock().pipeline.clone()
    }

    /// Last committed bundle
    #[must_use]
    pub fn bundle(&self) -> Option<ForecastBundle> {
        self.state.lock().bundle.clone()
    }

    /// Empty input and suggestions without any lookup
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.input.clear();
        state.suggestions.clear();
        state.input_generation += 1;
        if matches!(state.pipeline, PipelineState::Suggesting { .. }) {
            state.pipeline = PipelineState::Idle;
        }
    }

    /// Query input stage: store `text` and look up suggestions when non-empty
    #[instrument(skip(self))]
    pub async fn on_input(&self, text: &str) -> SuggestOutcome {
        let generation = {
            let mut state = self.state.lock();
            state.input = text.to_string();
            state.input_generation += 1;
            if text.is_empty() {
                state.suggestions.clear();
                if matches!(state.pipeline, PipelineState::Suggesting { .. }) {
                    state.pipeline = PipelineState::Idle;
                }
                debug!("Empty input, suggestions cleared");
                return SuggestOutcome::Cleared;
            }
            state.lookups_in_flight += 1;
            if !state.pipeline.is_run_in_progress() {
                state.pipeline = PipelineState::Suggesting {
                    query: text.to_string(),
                };
            }
            state.input_generation
        };

        let result = self.places.autocomplete(text).await;

        let mut state = self.state.lock();
        state.lookups_in_flight = state.lookups_in_flight.saturating_sub(1);
        if matches!(&state.pipeline, PipelineState::Suggesting { query } if query == text) {
            state.pipeline = PipelineState::Idle;
        }

        match result {
            Ok(suggestions) if state.input_generation == generation => {
                let count = suggestions.len();
                state.suggestions = suggestions;
                SuggestOutcome::Updated(count)
            }
            Ok(_) => {
                debug!("Discarding suggestions for stale input '{}'", text);
                SuggestOutcome::Superseded
            }
            Err(e) => {
                error!("Error fetching suggestions for '{}': {}", text, e);
                SuggestOutcome::Failed(e)
            }
        }
    }

    /// Place resolution, forecast retrieval and normalization for `suggestion`
    #[instrument(skip(self), fields(place_id = %suggestion.id))]
    pub async fn select(&self, suggestion: &Suggestion) -> RunOutcome {
        let run = {
            let mut state = self.state.lock();
            // Allocated under the lock so the newest id is always the latest run
            state.runs_started += 1;
            let run = RunId(state.runs_started);
            state.input.clear();
            state.suggestions.clear();
            state.input_generation += 1;
            state.latest_run = Some(run);
            state.pipeline = PipelineState::Resolving {
                run,
                suggestion: suggestion.clone(),
            };
            run
        };
        info!("Run {} started for '{}'", run, suggestion.description);

        let point = match self.places.resolve(&suggestion.id).await {
            Ok(point) => point,
            Err(e) => return self.fail(run, Stage::Resolution, e),
        };

        if !self.advance(run, PipelineState::FetchingForecast { run, point }) {
            return RunOutcome::Superseded(run);
        }

        let raw = match self
            .forecasts
            .daily_forecast(point, self.settings.forecast_days)
            .await
        {
            Ok(raw) => raw,
            Err(e) => return self.fail(run, Stage::Forecast, e),
        };

        let bundle = match self.normalize(&raw, point) {
            Ok(bundle) => bundle,
            Err(e) => return self.fail(run, Stage::Normalization, e),
        };

        self.commit(run, bundle)
    }

    fn normalize(
        &self,
        raw: &crate::weather::RawForecast,
        point: GeoPoint,
    ) -> Result<ForecastBundle> {
        normalize::build_bundle(raw, point, self.settings.locale)?
            .ok_or_else(|| WeatherSiteError::shape("Forecast provider returned no days"))
    }

    /// Move a still-current run to its next state
    fn advance(&self, run: RunId, next: PipelineState) -> bool {
        let mut state = self.state.lock();
        if state.latest_run != Some(run) {
            debug!("Run {} superseded by {:?}", run, state.latest_run);
            return false;
        }
        state.pipeline = next;
        true
    }

    fn commit(&self, run: RunId, bundle: ForecastBundle) -> RunOutcome {
        let mut state = self.state.lock();
        if state.latest_run != Some(run) {
            warn!(
                "Discarding forecast of run {}, newer run {:?} started",
                run, state.latest_run
            );
            return RunOutcome::Superseded(run);
        }
        info!(
            "Run {} ready: {} with {} upcoming days",
            run,
            bundle.location.display_name(),
            bundle.upcoming.len()
        );
        state.pipeline = PipelineState::Ready {
            run,
            location_name: bundle.location.name.clone(),
        };
        state.bundle = Some(bundle);
        RunOutcome::Ready(run)
    }

    fn fail(&self, run: RunId, stage: Stage, err: WeatherSiteError) -> RunOutcome {
        let mut state = self.state.lock();
        if state.latest_run != Some(run) {
            debug!(
                "Ignoring {} failure of run {}, superseded by {:?}: {}",
                stage, run, state.latest_run, err
            );
            return RunOutcome::Superseded(run);
        }
        error!("Run {} failed during {}: {}", run, stage, err);
        state.pipeline = PipelineState::Failed {
            run,
            stage,
            message: err.to_string(),
        };
        RunOutcome::Failed {
            run,
            stage,
            error: err,
        }
    }
}
