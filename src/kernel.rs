use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};
use crate::events::{ProcessId, ScheduledEvent, SimTime};
use crate::process::{Action, Process, ScenarioEnv};
use crate::resource::{Grant, UnitPool};

/// Discrete-event scheduler: a virtual clock, the pending-event heap, and
/// the process table for one scenario.
///
/// Time only moves when an event is popped, and simultaneous events fire in
/// scheduling order, so a run is fully determined by its inputs and seed.
pub struct Scheduler {
    now: SimTime,
    next_seq: u64,
    queue: BinaryHeap<Reverse<ScheduledEvent>>,
    slots: Vec<Option<Process>>,
    pool: UnitPool,
}

impl Scheduler {
    pub fn new(pool: UnitPool) -> Self {
        Self {
            now: SimTime::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
            slots: Vec::new(),
            pool,
        }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn pool(&self) -> &UnitPool {
        &self.pool
    }

    pub fn spawn(&mut self, process: Process, at: SimTime) -> ProcessId {
        let pid = ProcessId(self.slots.len());
        self.slots.push(Some(process));
        self.schedule(at, pid);
        pid
    }

    fn schedule(&mut self, at: SimTime, pid: ProcessId) {
        debug_assert!(at >= self.now, "events are never scheduled in the past");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(ScheduledEvent::new(at, seq, pid)));
    }

    /// Drains the event heap, stepping each woken process until it suspends
    /// again. `max_events` caps the number of processed events so a wedged
    /// scenario fails loudly instead of spinning.
    pub fn run(&mut self, env: &mut ScenarioEnv<'_>, max_events: u64) -> Result<u64> {
        let mut processed = 0_u64;
        while let Some(Reverse(event)) = self.queue.pop() {
            processed += 1;
            if processed > max_events {
                return Err(Error::EventBudget {
                    capacity: self.pool.capacity() as u32,
                    processed,
                });
            }
            debug_assert!(event.at >= self.now);
            self.now = event.at;
            self.step(event.pid, env);
        }
        Ok(processed)
    }

    fn step(&mut self, pid: ProcessId, env: &mut ScenarioEnv<'_>) {
        let mut process = match self.slots[pid.0].take() {
            Some(process) => process,
            None => return,
        };
        loop {
            match process.resume(self.now, env) {
                Action::Timeout(minutes) => {
                    self.schedule(self.now + minutes, pid);
                    break;
                }
                Action::Acquire(priority) => match self.pool.request(pid, priority) {
                    Grant::Immediate => continue,
                    // parked in the pool; the matching release schedules
                    // the wake-up
                    Grant::Queued => break,
                },
                Action::Release => {
                    if let Some(waiter) = self.pool.release() {
                        self.schedule(self.now, waiter);
                    }
                    continue;
                }
                Action::Spawn(call) => {
                    self.spawn(Process::Call(call), self.now);
                    continue;
                }
                Action::Finished => return,
            }
        }
        self.slots[pid.0] = Some(process);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::Samplers;
    use crate::oracle::KeywordOracle;
    use crate::process::ArrivalSource;
    use crate::stats::ScenarioStats;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn env<'a>(samplers: &'a Samplers, calls: &'a [String]) -> ScenarioEnv<'a> {
        ScenarioEnv {
            rng: StdRng::seed_from_u64(0),
            samplers,
            oracle: &KeywordOracle,
            calls,
            simple_triage_factor: 0.5,
            stats: ScenarioStats::new(),
        }
    }

    #[test]
    fn empty_source_drains_in_one_event() {
        let samplers = Samplers::fixed(1.0, 0.0, 5.0);
        let calls: Vec<String> = Vec::new();
        let mut env = env(&samplers, &calls);
        let mut scheduler = Scheduler::new(UnitPool::new(1));
        scheduler.spawn(Process::Source(ArrivalSource::new(0)), SimTime::ZERO);

        let processed = scheduler.run(&mut env, 10).expect("run should finish");
        assert_eq!(processed, 1);
        assert_eq!(scheduler.now(), SimTime::ZERO);
        assert_eq!(scheduler.pool().busy(), 0);
    }

    #[test]
    fn exhausted_event_budget_is_an_error() {
        let samplers = Samplers::fixed(1.0, 0.0, 5.0);
        let calls: Vec<String> = vec![
            "alarm sounding".to_string(),
            "alarm sounding".to_string(),
            "alarm sounding".to_string(),
        ];
        let mut env = env(&samplers, &calls);
        let mut scheduler = Scheduler::new(UnitPool::new(1));
        scheduler.spawn(Process::Source(ArrivalSource::new(3)), SimTime::ZERO);

        let result = scheduler.run(&mut env, 2);
        assert!(matches!(result, Err(Error::EventBudget { capacity: 1, .. })));
    }
}
