//! Render loop bookkeeping: frame counting and the exit predicate.

use std::time::{Duration, Instant};

const FPS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    CloseRequested,
    FrameLimit(u64),
}

pub struct RunState {
    pub frame_count: u64,
    max_frames: Option<u64>,
    exit_reason: Option<ExitReason>,
    frames_since_print: u32,
    last_fps_print: Instant,
    last_fps: u32,
}

impl RunState {
    pub fn new(max_frames: Option<u64>) -> Self {
        Self {
            frame_count: 0,
            max_frames,
            exit_reason: None,
            frames_since_print: 0,
            last_fps_print: Instant::now(),
            last_fps: 0,
        }
    }

    pub fn request_exit(&mut self, reason: ExitReason) {
        self.exit_reason.get_or_insert(reason);
    }

    /// Counts a presented frame. Returns the frame rate once per second.
    pub fn record_frame(&mut self) -> Option<u32> {
        self.record_frame_at(Instant::now())
    }

    fn record_frame_at(&mut self, now: Instant) -> Option<u32> {
        self.frame_count += 1;
        self.frames_since_print += 1;

        if let Some(limit) = self.max_frames {
            if self.frame_count >= limit {
                self.request_exit(ExitReason::FrameLimit(limit));
            }
        }

        if now.duration_since(self.last_fps_print) >= FPS_INTERVAL {
            self.last_fps = self.frames_since_print;
            self.frames_since_print = 0;
            self.last_fps_print = now;
            Some(self.last_fps)
        } else {
            None
        }
    }

    pub fn should_exit(&self) -> bool {
        self.exit_reason.is_some()
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit_reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_until_asked() {
        let mut state = RunState::new(None);
        for _ in 0..1000 {
            state.record_frame();
        }
        assert!(!state.should_exit());

        state.request_exit(ExitReason::CloseRequested);
        assert_eq!(state.exit_reason(), Some(ExitReason::CloseRequested));
    }

    #[test]
    fn frame_limit_stops_the_loop() {
        let mut state = RunState::new(Some(3));
        state.record_frame();
        state.record_frame();
        assert!(!state.should_exit());
        state.record_frame();
        assert_eq!(state.exit_reason(), Some(ExitReason::FrameLimit(3)));
    }

    #[test]
    fn first_exit_reason_wins() {
        let mut state = RunState::new(Some(1));
        state.request_exit(ExitReason::CloseRequested);
        state.record_frame();
        assert_eq!(state.exit_reason(), Some(ExitReason::CloseRequested));
    }

    #[test]
    fn fps_reported_once_per_interval() {
        let mut state = RunState::new(None);
        let start = state.last_fps_print;
        assert_eq!(state.record_frame_at(start + Duration::from_millis(100)), None);
        assert_eq!(state.record_frame_at(start + Duration::from_millis(500)), None);
        assert_eq!(state.record_frame_at(start + Duration::from_millis(1000)), Some(3));
        assert_eq!(state.last_fps, 3);
        assert_eq!(state.record_frame_at(start + Duration::from_millis(1100)), None);
    }
}
