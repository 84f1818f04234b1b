use serde::Serialize;

use crate::events::SimTime;
use crate::oracle::Complexity;

/// Final record for one completed call. Durations are minutes.
#[derive(Clone, Debug, Serialize)]
pub struct CallOutcome {
    pub call: usize,
    pub original_priority: u8,
    pub complexity: Complexity,
    pub arrived_at: f64,
    pub wait: f64,
    pub service: f64,
    pub handling: f64,
}

/// Running tallies for one scenario, written incrementally by the processes.
#[derive(Debug, Default)]
pub struct ScenarioStats {
    pub total_calls: usize,
    pub simple_calls: usize,
    pub complex_calls: usize,
    pub dropped_calls: usize,
    pub outcomes: Vec<CallOutcome>,
}

impl ScenarioStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrival(&mut self) {
        self.total_calls += 1;
    }

    pub fn record_triage(&mut self, complexity: Complexity) {
        match complexity {
            Complexity::Simple => self.simple_calls += 1,
            Complexity::Complex => self.complex_calls += 1,
        }
    }

    pub fn record_dropped(&mut self) {
        self.dropped_calls += 1;
    }

    pub fn record_outcome(&mut self, outcome: CallOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn into_result(self, capacity: u32, seed: u64, makespan: SimTime, events: u64) -> ScenarioResult {
        debug_assert_eq!(
            self.simple_calls + self.complex_calls + self.dropped_calls,
            self.total_calls,
            "every arrived call is triaged or dropped once the queue drains"
        );
        debug_assert_eq!(self.outcomes.len(), self.simple_calls + self.complex_calls);
        ScenarioResult {
            capacity,
            seed,
            total_calls: self.total_calls,
            simple_calls: self.simple_calls,
            complex_calls: self.complex_calls,
            dropped_calls: self.dropped_calls,
            makespan: makespan.minutes(),
            events,
            outcomes: self.outcomes,
        }
    }
}

/// Everything measured for one staffing scenario. Outcomes are in completion
/// order; dropped calls are counted but never appear in `outcomes`.
#[derive(Clone, Debug, Serialize)]
pub struct ScenarioResult {
    pub capacity: u32,
    pub seed: u64,
    pub total_calls: usize,
    pub simple_calls: usize,
    pub complex_calls: usize,
    pub dropped_calls: usize,
    pub makespan: f64,
    pub events: u64,
    pub outcomes: Vec<CallOutcome>,
}

impl ScenarioResult {
    pub fn handled_calls(&self) -> usize {
        self.outcomes.len()
    }

    pub fn wait_times(&self) -> Vec<f64> {
        self.outcomes.iter().map(|outcome| outcome.wait).collect()
    }

    pub fn service_times(&self) -> Vec<f64> {
        self.outcomes.iter().map(|outcome| outcome.service).collect()
    }

    pub fn handling_times(&self) -> Vec<f64> {
        self.outcomes.iter().map(|outcome| outcome.handling).collect()
    }

    pub fn mean_wait(&self) -> f64 {
        self.mean_of(|outcome| outcome.wait)
    }

    pub fn mean_service(&self) -> f64 {
        self.mean_of(|outcome| outcome.service)
    }

    pub fn mean_handling(&self) -> f64 {
        self.mean_of(|outcome| outcome.handling)
    }

    fn mean_of(&self, value: impl Fn(&CallOutcome) -> f64) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes.iter().map(value).sum::<f64>() / self.outcomes.len() as f64
    }
}
