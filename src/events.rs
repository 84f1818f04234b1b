use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// Simulated time in minutes since scenario start.
///
/// Durations entering the clock are clamped to finite non-negative values,
/// so `total_cmp` agrees with the ordinary float ordering here while still
/// giving us a total order for the event heap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    pub fn minutes(self) -> f64 {
        self.0
    }
}

impl Eq for SimTime {}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;

    fn add(self, minutes: f64) -> SimTime {
        SimTime(self.0 + minutes)
    }
}

impl Sub for SimTime {
    type Output = f64;

    fn sub(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Handle to a process slot owned by the scheduler.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProcessId(pub usize);

/// A pending wake-up for one process.
///
/// Events are ordered by trigger time, then by insertion sequence, so
/// simultaneous events fire in the order they were scheduled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScheduledEvent {
    pub at: SimTime,
    pub seq: u64,
    pub pid: ProcessId,
}

impl ScheduledEvent {
    pub fn new(at: SimTime, seq: u64, pid: ProcessId) -> Self {
        Self { at, seq, pid }
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .cmp(&other.at)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    #[test]
    fn earlier_time_pops_first() {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(ScheduledEvent::new(SimTime(3.0), 0, ProcessId(0))));
        heap.push(Reverse(ScheduledEvent::new(SimTime(1.5), 1, ProcessId(1))));
        heap.push(Reverse(ScheduledEvent::new(SimTime(2.0), 2, ProcessId(2))));

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|Reverse(e)| e.pid.0))
            .collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn equal_times_pop_in_insertion_order() {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(ScheduledEvent::new(SimTime(5.0), 7, ProcessId(7))));
        heap.push(Reverse(ScheduledEvent::new(SimTime(5.0), 8, ProcessId(8))));
        heap.push(Reverse(ScheduledEvent::new(SimTime(5.0), 9, ProcessId(9))));

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|Reverse(e)| e.pid.0))
            .collect();
        assert_eq!(order, vec![7, 8, 9]);
    }

    #[test]
    fn sim_time_arithmetic() {
        let t = SimTime::ZERO + 2.5;
        assert_eq!(t, SimTime(2.5));
        assert!((t + 1.0 - t - 1.0).abs() < 1e-12);
        assert_eq!(format!("{}", SimTime(3.14159)), "3.14");
    }
}
