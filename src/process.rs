use log::{debug, trace};
use rand::rngs::StdRng;

use crate::calibrate::Samplers;
use crate::events::SimTime;
use crate::oracle::{ClassifierOracle, Complexity};
use crate::stats::{CallOutcome, ScenarioStats};

/// Everything a process can touch while it runs: the scenario's private
/// random stream and tallies plus the shared read-only inputs.
pub struct ScenarioEnv<'a> {
    pub rng: StdRng,
    pub samplers: &'a Samplers,
    pub oracle: &'a dyn ClassifierOracle,
    pub calls: &'a [String],
    pub simple_triage_factor: f64,
    pub stats: ScenarioStats,
}

/// What a process asks the scheduler to do next.
///
/// `Timeout` and an unsatisfiable `Acquire` suspend the process; the other
/// requests complete at the current instant and the scheduler keeps
/// stepping the same process.
#[derive(Debug)]
pub enum Action {
    Timeout(f64),
    Acquire(u8),
    Release,
    Spawn(CallProcess),
    Finished,
}

#[derive(Debug)]
pub enum Process {
    Source(ArrivalSource),
    Call(CallProcess),
}

impl Process {
    pub fn resume(&mut self, now: SimTime, env: &mut ScenarioEnv<'_>) -> Action {
        match self {
            Process::Source(source) => source.resume(now, env),
            Process::Call(call) => call.resume(now, env),
        }
    }
}

/// Spawns the scenario's calls: the first at scenario start, each later one
/// after a freshly sampled inter-arrival gap.
#[derive(Debug)]
pub struct ArrivalSource {
    total: usize,
    next: usize,
    due: bool,
}

impl ArrivalSource {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            next: 0,
            due: total > 0,
        }
    }

    fn resume(&mut self, now: SimTime, env: &mut ScenarioEnv<'_>) -> Action {
        if self.due {
            self.due = false;
            let call = self.next;
            self.next += 1;
            return Action::Spawn(CallProcess::new(call));
        }
        if self.next < self.total {
            self.due = true;
            let gap = env.samplers.arrivals.sample(&mut env.rng);
            trace!("source: next call in {gap:.3} min (t={now})");
            Action::Timeout(gap)
        } else {
            trace!("source: all {} calls spawned (t={now})", self.total);
            Action::Finished
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum CallPhase {
    Arrived,
    Triaged {
        original_priority: u8,
        complexity: Complexity,
    },
    Queued {
        original_priority: u8,
        complexity: Complexity,
        queued_at: SimTime,
    },
    InService {
        original_priority: u8,
        complexity: Complexity,
        wait: f64,
        service: f64,
    },
    Completed {
        original_priority: u8,
        complexity: Complexity,
        wait: f64,
        service: f64,
    },
}

/// One emergency call moving through triage, the dispatch queue, service,
/// and completion.
#[derive(Debug)]
pub struct CallProcess {
    call: usize,
    arrived_at: SimTime,
    phase: CallPhase,
}

impl CallProcess {
    pub fn new(call: usize) -> Self {
        Self {
            call,
            arrived_at: SimTime::ZERO,
            phase: CallPhase::Arrived,
        }
    }

    fn resume(&mut self, now: SimTime, env: &mut ScenarioEnv<'_>) -> Action {
        match self.phase {
            CallPhase::Arrived => {
                self.arrived_at = now;
                env.stats.record_arrival();
                let text = &env.calls[self.call];
                let classification = match env.oracle.classify(self.call, text) {
                    Ok(classification) => classification,
                    Err(err) => {
                        env.stats.record_dropped();
                        debug!("call {} dropped at t={now}: {err}", self.call);
                        return Action::Finished;
                    }
                };
                if !(1..=3).contains(&classification.original_priority) {
                    env.stats.record_dropped();
                    debug!(
                        "call {} dropped at t={now}: priority {} outside 1..=3",
                        self.call, classification.original_priority
                    );
                    return Action::Finished;
                }

                let complexity = classification.complexity;
                env.stats.record_triage(complexity);
                let operator = env.samplers.triage.sample(&mut env.rng);
                let triage = match complexity {
                    Complexity::Simple => operator * env.simple_triage_factor,
                    Complexity::Complex => operator,
                };
                trace!(
                    "call {} arrived at t={now}: {} priority {} ({complexity}), triage {triage:.3} min",
                    self.call,
                    classification.call_type,
                    classification.original_priority
                );
                self.phase = CallPhase::Triaged {
                    original_priority: classification.original_priority,
                    complexity,
                };
                Action::Timeout(triage)
            }
            CallPhase::Triaged {
                original_priority,
                complexity,
            } => {
                // most urgent (3) maps to queue priority 0
                let priority = 3 - original_priority;
                trace!(
                    "call {} queued at t={now} with queue priority {priority}",
                    self.call
                );
                self.phase = CallPhase::Queued {
                    original_priority,
                    complexity,
                    queued_at: now,
                };
                Action::Acquire(priority)
            }
            CallPhase::Queued {
                original_priority,
                complexity,
                queued_at,
            } => {
                let wait = now - queued_at;
                let service = env.samplers.service.sample(&mut env.rng);
                trace!(
                    "call {} dispatched at t={now} after {wait:.3} min, on scene {service:.3} min",
                    self.call
                );
                self.phase = CallPhase::InService {
                    original_priority,
                    complexity,
                    wait,
                    service,
                };
                Action::Timeout(service)
            }
            CallPhase::InService {
                original_priority,
                complexity,
                wait,
                service,
            } => {
                self.phase = CallPhase::Completed {
                    original_priority,
                    complexity,
                    wait,
                    service,
                };
                Action::Release
            }
            CallPhase::Completed {
                original_priority,
                complexity,
                wait,
                service,
            } => {
                let handling = now - self.arrived_at;
                trace!(
                    "call {} completed at t={now}, handling {handling:.3} min",
                    self.call
                );
                env.stats.record_outcome(CallOutcome {
                    call: self.call,
                    original_priority,
                    complexity,
                    arrived_at: self.arrived_at.minutes(),
                    wait,
                    service,
                    handling,
                });
                Action::Finished
            }
        }
    }
}
