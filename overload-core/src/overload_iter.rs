//! Batches of independent overload runs ("what-if" studies), serial or parallel.
use crate::imports::*;
use crate::load_cycle::LoadCycle;
use crate::overload::{OverloadModel, RunOptions, RunSummary};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One model run against one cycle with its options
pub struct OverloadScenario {
    pub model: OverloadModel,
    pub cycle: LoadCycle,
    #[serde(default)]
    pub options: RunOptions,
}

impl OverloadScenario {
    pub fn new(model: OverloadModel, cycle: LoadCycle, options: RunOptions) -> Self {
        Self {
            model,
            cycle,
            options,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverloadRunVec(pub Vec<OverloadScenario>);

impl SerdeAPI for OverloadRunVec {
    fn init(&mut self) -> anyhow::Result<()> {
        self.0.iter_mut().enumerate().try_for_each(|(i, scenario)| {
            scenario
                .model
                .init()
                .with_context(|| format!("scenario idx: {}", i))
        })
    }
}

impl OverloadRunVec {
    /// Calls `do_overload_calculations` for each scenario, storing each
    /// result in its model. Returns whether each run was accepted.
    /// # Arguments:
    /// * parallelize: whether to parallelize the runs, defaults to `true`
    pub fn run(&mut self, parallelize: Option<bool>) -> Vec<bool> {
        let run_one = |scenario: &mut OverloadScenario| {
            scenario
                .model
                .do_overload_calculations(&scenario.cycle, &scenario.options)
                .is_some()
        };
        if parallelize.unwrap_or(true) {
            self.0.par_iter_mut().map(run_one).collect()
        } else {
            self.0.iter_mut().map(run_one).collect()
        }
    }

    /// Summaries of the most recent runs, `None` where a cycle was rejected
    /// or no run has happened
    pub fn summaries(&self) -> Vec<Option<&RunSummary>> {
        self.0.iter().map(|s| s.model.last_run.as_ref()).collect()
    }

    pub fn push(&mut self, scenario: OverloadScenario) {
        self.0.push(scenario)
    }

    pub fn pop(&mut self) -> Option<OverloadScenario> {
        self.0.pop()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
