use time::Date;
use tracing::{info, instrument, warn};

use crate::auth::AuthSession;
use crate::backend::NutritionBackend;
use crate::error::{CoreError, CoreResult};
use crate::flight::Flight;
use crate::goals::dto::{Dashboard, DailySummary, Goals, MacroProgress, Preset};

/// Percentage of `target` reached, capped at 100. A missing or zero
/// target yields 0.
pub fn progress(current: f64, target: Option<f64>) -> f64 {
    match target {
        Some(t) if t != 0.0 => (current / t * 100.0).min(100.0),
        _ => 0.0,
    }
}

fn track(current: f64, target: f64) -> MacroProgress {
    MacroProgress {
        current,
        target,
        percent: progress(current, Some(target)),
    }
}

/// Targets plus the latest daily summary. Goals start at the maintenance
/// defaults until the first successful load.
#[derive(Debug)]
pub struct GoalTracker {
    goals: Goals,
    loaded: bool,
    summary: Option<DailySummary>,
    sync: Flight,
    summary_flight: Flight,
}

impl Default for GoalTracker {
    fn default() -> Self {
        Self {
            goals: Goals::default(),
            loaded: false,
            summary: None,
            sync: Flight::new("goal sync"),
            summary_flight: Flight::new("summary fetch"),
        }
    }
}

impl GoalTracker {
    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.is_busy()
    }

    pub fn summary(&self) -> Option<&DailySummary> {
        self.summary.as_ref()
    }

    /// Local edit, nothing is sent until [`GoalTracker::update`]. Every
    /// target must be a finite, non-negative number; otherwise nothing changes.
    pub fn set(&mut self, goals: Goals) -> CoreResult<()> {
        let values = [goals.calories, goals.protein_g, goals.carbs_g, goals.fat_g];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(CoreError::validation(
                "Goals must be non-negative numbers",
            ));
        }
        self.goals = goals;
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.goals = preset.goals();
    }

    #[instrument(skip(self, backend, auth))]
    pub async fn load(&mut self, backend: &dyn NutritionBackend, auth: &AuthSession) -> CoreResult<()> {
        let ticket = self.sync.begin()?;
        let outcome = backend.get_goals(auth).await;
        self.sync.finish(ticket);
        let goals = outcome.inspect_err(|e| warn!(error = %e, "loading goals failed"))?;
        self.goals = goals;
        self.loaded = true;
        Ok(())
    }

    /// Sends all four targets in one request.
    #[instrument(skip(self, backend, auth))]
    pub async fn update(&mut self, backend: &dyn NutritionBackend, auth: &AuthSession) -> CoreResult<()> {
        let ticket = self.sync.begin()?;
        let snapshot = self.goals;
        let outcome = backend.set_goals(auth, &snapshot).await;
        self.sync.finish(ticket);
        match outcome {
            Ok(()) => {
                info!(calories = snapshot.calories, "goals updated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "updating goals failed");
                Err(e)
            }
        }
    }

    /// Re-reads the day's totals, e.g. after a meal or chat action changed them.
    #[instrument(skip(self, backend, auth))]
    pub async fn refresh_summary(
        &mut self,
        backend: &dyn NutritionBackend,
        auth: &AuthSession,
        date: Option<Date>,
    ) -> CoreResult<&DailySummary> {
        let ticket = self.summary_flight.begin()?;
        let outcome = backend.get_summary(auth, date).await;
        self.summary_flight.finish(ticket);
        let summary = outcome.inspect_err(|e| warn!(error = %e, "summary fetch failed"))?;
        Ok(self.summary.insert(summary))
    }

    pub fn dashboard(&self, summary: &DailySummary) -> Dashboard {
        let current = summary.macros();
        let target = self.goals.as_macros();
        Dashboard {
            calories: track(current.calories, target.calories),
            protein: track(current.protein, target.protein),
            carbs: track(current.carbs, target.carbs),
            fat: track(current.fat, target.fat),
        }
    }
}
