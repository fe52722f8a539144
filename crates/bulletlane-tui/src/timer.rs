//! Frame-driven timers.
//!
//! Nothing fires on its own: the render loop calls [`FrameTimer::tick`] once per
//! frame with the time elapsed since it started, and gets back the payloads of
//! every timer that came due. The same timer drives the terminal UI on wall
//! time and the headless runner on virtual time.

use std::time::Duration;

/// Opaque handle returned when scheduling, used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    handle: TimerHandle,
    due: Duration,
    /// Set for repeating timers
    interval: Option<Duration>,
    payload: T,
}

#[derive(Debug)]
pub struct FrameTimer<T> {
    now: Duration,
    next_handle: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for FrameTimer<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> FrameTimer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `payload` once, `delay` after the last tick
    pub fn after(&mut self, delay: Duration, payload: T) -> TimerHandle {
        self.schedule(delay, None, payload)
    }

    /// Fire `payload` every `interval`, first one `interval` after the last tick.
    ///
    /// A zero interval would fire on every frame forever, so it is clamped to one millisecond.
    pub fn every(&mut self, interval: Duration, payload: T) -> TimerHandle {
        let interval = interval.max(Duration::from_millis(1));
        self.schedule(interval, Some(interval), payload)
    }

    /// Returns false if the handle was unknown or had already fired
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Advance to `now` and collect due payloads in due order.
    ///
    /// A repeating timer that fell several intervals behind fires once per
    /// missed interval so that nothing is silently dropped after a stall.
    pub fn tick(&mut self, now: Duration) -> Vec<T> {
        if now > self.now {
            self.now = now;
        }

        let mut fired: Vec<(Duration, u64, T)> = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            let entry = &mut self.entries[index];
            if entry.due > self.now {
                index += 1;
                continue;
            }
            let interval = entry.interval;
            match interval {
                Some(interval) => {
                    while entry.due <= self.now {
                        fired.push((entry.due, entry.handle.0, entry.payload.clone()));
                        entry.due += interval;
                    }
                    index += 1;
                }
                None => {
                    let entry = self.entries.swap_remove(index);
                    fired.push((entry.due, entry.handle.0, entry.payload));
                }
            }
        }

        fired.sort_by_key(|(due, handle, _)| (*due, *handle));
        fired.into_iter().map(|(_, _, payload)| payload).collect()
    }

    fn schedule(&mut self, delay: Duration, interval: Option<Duration>, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry {
            handle,
            due: self.now + delay,
            interval,
            payload,
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_after_fires_once() {
        let mut timer = FrameTimer::new();
        timer.after(ms(100), "once");
        assert!(timer.tick(ms(50)).is_empty());
        assert_eq!(timer.tick(ms(100)), vec!["once"]);
        assert!(timer.tick(ms(500)).is_empty());
        assert_eq!(timer.pending(), 0);
    }

    #[test]
    fn test_every_repeats_and_catches_up() {
        let mut timer = FrameTimer::new();
        timer.every(ms(100), 'x');
        assert_eq!(timer.tick(ms(100)), vec!['x']);
        // stalled frame: three intervals elapsed
        assert_eq!(timer.tick(ms(400)), vec!['x', 'x', 'x']);
        assert_eq!(timer.pending(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut timer = FrameTimer::new();
        let repeat = timer.every(ms(10), 1);
        let once = timer.after(ms(10), 2);
        assert!(timer.cancel(repeat));
        assert!(!timer.cancel(repeat));
        assert_eq!(timer.tick(ms(20)), vec![2]);
        assert!(!timer.cancel(once));
    }

    #[test]
    fn test_due_order_across_timers() {
        let mut timer = FrameTimer::new();
        timer.after(ms(30), "late");
        timer.after(ms(10), "early");
        timer.every(ms(20), "tick");
        assert_eq!(timer.tick(ms(40)), vec!["early", "tick", "late", "tick"]);
    }

    #[test]
    fn test_scheduling_is_relative_to_last_tick() {
        let mut timer = FrameTimer::new();
        timer.tick(ms(1000));
        timer.after(ms(5), ());
        assert!(timer.tick(ms(1004)).is_empty());
        assert_eq!(timer.tick(ms(1005)).len(), 1);
    }
}
