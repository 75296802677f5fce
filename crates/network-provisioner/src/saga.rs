//! Ordered remote actions with compensation
//!
//! A [`Saga`] runs its steps in order against a shared state value. When a
//! `FailFast` step fails, every step that already completed is undone in
//! reverse order and the step's error is returned. A `BestEffort` step that
//! fails is logged and skipped.

use crate::error::ProvisionError;
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// What a step failure does to the rest of the saga
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Abort and compensate completed steps
    FailFast,
    /// Log and continue with the next step
    BestEffort,
}

/// One remote action and its compensation
#[async_trait]
pub trait SagaStep<S: Send>: Send + Sync {
    /// Human-readable step name, used in logs and policy listings
    fn name(&self) -> String;

    fn policy(&self) -> StepPolicy {
        StepPolicy::FailFast
    }

    async fn action(&self, state: &mut S) -> Result<(), ProvisionError>;

    /// Reverse a completed `action`; steps without side effects keep the default
    async fn undo(&self, _state: &mut S) -> Result<(), ProvisionError> {
        Ok(())
    }
}

/// A named, ordered list of steps
pub struct Saga<'a, S: Send> {
    name: String,
    steps: Vec<Box<dyn SagaStep<S> + 'a>>,
}

impl<S: Send> std::fmt::Debug for Saga<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Saga")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl<'a, S: Send> Saga<'a, S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn push(&mut self, step: impl SagaStep<S> + 'a) {
        self.steps.push(Box::new(step));
    }

    /// Append a step, builder style
    pub fn step(mut self, step: impl SagaStep<S> + 'a) -> Self {
        self.push(step);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names and policies, in execution order
    pub fn policies(&self) -> Vec<(String, StepPolicy)> {
        self.steps.iter().map(|s| (s.name(), s.policy())).collect()
    }

    /// Run every step against `state`
    ///
    /// # Returns
    /// * `Ok(())` - Every `FailFast` step succeeded
    /// * `Err(ProvisionError)` - The error of the first failed `FailFast`
    ///   step, after completed steps were undone. Undo failures are logged
    ///   and never replace it.
    pub async fn execute(&self, state: &mut S) -> Result<(), ProvisionError> {
        let mut completed: Vec<&(dyn SagaStep<S> + 'a)> = Vec::new();

        for step in &self.steps {
            let step = step.as_ref();
            debug!("Saga {}: running step {}", self.name, step.name());

            match step.action(state).await {
                Ok(()) => completed.push(step),
                Err(e) if step.policy() == StepPolicy::BestEffort => {
                    warn!("Saga {}: best-effort step {} failed, continuing: {}", self.name, step.name(), e);
                }
                Err(e) => {
                    error!("Saga {}: step {} failed: {}", self.name, step.name(), e);
                    for done in completed.iter().rev() {
                        debug!("Saga {}: undoing step {}", self.name, done.name());
                        if let Err(undo_err) = done.undo(state).await {
                            error!(
                                "Saga {}: failed to undo step {}: {}",
                                self.name,
                                done.name(),
                                undo_err
                            );
                        }
                    }
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}
