//! Step-by-step collection of the six readings.
//!
//! A [`WizardSession`] is created when an interactive session starts, passed by
//! reference to every action, and dropped when the session ends. Nothing outlives it.

pub mod prompt;

use crate::catalog::{FeatureCatalog, Quantity};
use crate::input::{Readings, TimeOfDay};
use crate::model::Regressor;
use crate::pipeline::{PredictError, Prediction, run_prediction};

/// Number of collection steps before `Final`.
pub const COLLECTION_STEPS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WizardStep {
    #[default]
    Step0,
    Step1,
    Step2,
    Step3,
    Step4,
    Step5,
    Final,
}

/// What a collection step asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepField {
    Time,
    Reading(Quantity),
}

/// Value committed by an `advance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepValue {
    Time(TimeOfDay),
    Reading(Option<f64>),
}

impl WizardStep {
    pub const ALL: [WizardStep; COLLECTION_STEPS + 1] = [
        WizardStep::Step0,
        WizardStep::Step1,
        WizardStep::Step2,
        WizardStep::Step3,
        WizardStep::Step4,
        WizardStep::Step5,
        WizardStep::Final,
    ];

    pub fn index(self) -> usize {
        match self {
            WizardStep::Step0 => 0,
            WizardStep::Step1 => 1,
            WizardStep::Step2 => 2,
            WizardStep::Step3 => 3,
            WizardStep::Step4 => 4,
            WizardStep::Step5 => 5,
            WizardStep::Final => 6,
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        WizardStep::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(self) -> Option<WizardStep> {
        self.index()
            .checked_sub(1)
            .and_then(|i| WizardStep::ALL.get(i).copied())
    }

    pub fn field(self) -> Option<StepField> {
        match self {
            WizardStep::Step0 => Some(StepField::Time),
            WizardStep::Step1 => Some(StepField::Reading(Quantity::Sunlight)),
            WizardStep::Step2 => Some(StepField::Reading(Quantity::Temperature)),
            WizardStep::Step3 => Some(StepField::Reading(Quantity::Humidity)),
            WizardStep::Step4 => Some(StepField::Reading(Quantity::Co2)),
            WizardStep::Step5 => Some(StepField::Reading(Quantity::AccumulatedSunlight)),
            WizardStep::Final => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self.field() {
            Some(StepField::Time) => "Current time",
            Some(StepField::Reading(q)) => q.label(),
            None => "Final check and prediction",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("already at the first step")]
    AtFirstStep,
    #[error("all readings are collected; only prediction is possible now")]
    AlreadyFinal,
    #[error("prediction is only possible after the last step")]
    NotFinal,
    #[error("step {step:?} does not accept this kind of value")]
    WrongValue { step: WizardStep },
    #[error(transparent)]
    Predict(#[from] PredictError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WizardSession {
    step: WizardStep,
    readings: Readings,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    pub fn is_final(&self) -> bool {
        self.step == WizardStep::Final
    }

    /// `(completed, total)` for the progress line.
    pub fn progress(&self) -> (usize, usize) {
        (self.step.index(), COLLECTION_STEPS)
    }

    pub fn progress_label(&self) -> String {
        let (done, total) = self.progress();
        format!("step {} / {} complete", done, total)
    }

    /// Value already committed for the current step, if any.
    pub fn committed(&self) -> Option<StepValue> {
        match self.step.field()? {
            StepField::Time => self.readings.time.map(StepValue::Time),
            StepField::Reading(q) => Some(StepValue::Reading(self.readings.get(q))),
        }
    }

    /// Commits `value` for the current step and moves forward. Absent readings are
    /// accepted as-is.
    pub fn advance(&mut self, value: StepValue) -> Result<WizardStep, WizardError> {
        let field = self.step.field().ok_or(WizardError::AlreadyFinal)?;
        match (field, value) {
            (StepField::Time, StepValue::Time(t)) => self.readings.time = Some(t),
            (StepField::Reading(q), StepValue::Reading(v)) => self.readings.set(q, v),
            _ => return Err(WizardError::WrongValue { step: self.step }),
        }
        self.step = self.step.next().ok_or(WizardError::AlreadyFinal)?;
        tracing::debug!(step = self.step.index(), "wizard advanced");
        Ok(self.step)
    }

    /// Moves back one step; committed readings are kept.
    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        self.step = self.step.prev().ok_or(WizardError::AtFirstStep)?;
        tracing::debug!(step = self.step.index(), "wizard retreated");
        Ok(self.step)
    }

    pub fn predict(
        &self,
        catalog: &FeatureCatalog,
        regressor: &Regressor,
    ) -> Result<Prediction, WizardError> {
        if !self.is_final() {
            return Err(WizardError::NotFinal);
        }
        Ok(run_prediction(&self.readings, catalog, regressor)?)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/wizard/tests.rs"]
mod tests;
