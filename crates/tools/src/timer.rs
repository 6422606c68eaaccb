use std::collections::VecDeque;
use std::time::Duration;

const DEFAULT_WINDOW: usize = 120;

/// Rolling window of frame durations for the fps readout.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: usize,
    frames: VecDeque<Duration>,
    total: Duration,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl FrameTimer {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            frames: VecDeque::with_capacity(window),
            total: Duration::ZERO,
        }
    }

    pub fn record(&mut self, frame: Duration) {
        if self.frames.len() == self.window {
            if let Some(oldest) = self.frames.pop_front() {
                self.total -= oldest;
            }
        }
        self.frames.push_back(frame);
        self.total += frame;
    }

    pub fn average(&self) -> Option<Duration> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.total / self.frames.len() as u32)
        }
    }

    /// Frames per second over the window; 0 before any frame is recorded.
    pub fn fps(&self) -> f32 {
        match self.average() {
            Some(avg) if !avg.is_zero() => 1.0 / avg.as_secs_f32(),
            _ => 0.0,
        }
    }

    /// Recorded frame times in milliseconds, oldest first.
    pub fn history_ms(&self) -> impl Iterator<Item = f32> + '_ {
        self.frames.iter().map(|d| d.as_secs_f32() * 1000.0)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timer_reports_zero() {
        let timer = FrameTimer::default();
        assert!(timer.is_empty());
        assert_eq!(timer.fps(), 0.0);
        assert!(timer.average().is_none());
    }

    #[test]
    fn steady_frames() {
        let mut timer = FrameTimer::new(10);
        for _ in 0..5 {
            timer.record(Duration::from_millis(20));
        }
        assert!((timer.fps() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn window_drops_oldest() {
        let mut timer = FrameTimer::new(2);
        timer.record(Duration::from_millis(100));
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(10));
        assert_eq!(timer.len(), 2);
        assert_eq!(timer.average(), Some(Duration::from_millis(10)));
        let history: Vec<f32> = timer.history_ms().collect();
        assert_eq!(history.len(), 2);
        assert!((history[0] - 10.0).abs() < 1e-3);
    }
}
