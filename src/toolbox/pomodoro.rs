//! Pomodoro schedule
//!
//! Work and break phases alternate; every `sessions_before_long_break`-th
//! break is a long one. The timer only tracks the sequence, the caller
//! runs the countdown.

use std::time::Duration;

/// Phase of a Pomodoro cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

/// Phase lengths in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PomodoroConfig {
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub sessions_before_long_break: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 20,
            sessions_before_long_break: 4,
        }
    }
}

/// Sequence state of a Pomodoro timer
#[derive(Debug, Clone, Default)]
pub struct PomodoroTimer {
    config: PomodoroConfig,
    reps: u32,
}

impl PomodoroTimer {
    pub fn new(config: PomodoroConfig) -> Self {
        Self { config, reps: 0 }
    }

    /// Start the next phase and return it
    pub fn next(&mut self) -> Phase {
        self.reps = self.reps.wrapping_add(1);
        let cycle = u64::from(self.config.sessions_before_long_break.max(1)) * 2;

        if u64::from(self.reps) % cycle == 0 {
            Phase::LongBreak
        } else if self.reps % 2 == 1 {
            Phase::Work
        } else {
            Phase::ShortBreak
        }
    }

    /// Length of a phase
    pub fn duration(&self, phase: Phase) -> Duration {
        let minutes = match phase {
            Phase::Work => self.config.work_minutes,
            Phase::ShortBreak => self.config.short_break_minutes,
            Phase::LongBreak => self.config.long_break_minutes,
        };
        Duration::from_secs(u64::from(minutes) * 60)
    }

    /// Phases started so far
    pub fn reps(&self) -> u32 {
        self.reps
    }

    /// Work sessions finished (a session counts once its break starts)
    pub fn completed_sessions(&self) -> u32 {
        self.reps / 2
    }

    /// One check mark per finished work session
    pub fn checkmarks(&self) -> String {
        "✔".repeat(self.completed_sessions() as usize)
    }

    pub fn reset(&mut self) {
        self.reps = 0;
    }
}

/// Format seconds as `MM:SS`; minutes grow past 59 instead of wrapping
pub fn format_countdown(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
