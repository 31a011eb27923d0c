// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use std::time::{Duration, Instant};

use crate::{Color, Pair};

/// Per-player time budgets. Time is charged to the mover at each turn
/// boundary.
#[derive(Debug, Clone)]
pub struct Clock {
    remaining: Pair<Duration>,
    turn_started: Instant,
}

impl Clock {
    pub fn new(budget: Duration) -> Self {
        Self {
            remaining: Pair::new(budget, budget),
            turn_started: Instant::now(),
        }
    }

    pub fn remaining(&self, color: Color) -> Duration {
        self.remaining[color]
    }

    /// Wall-clock time since the last turn boundary.
    pub fn elapsed(&self) -> Duration {
        self.turn_started.elapsed()
    }

    /// Charges `elapsed` to `color` and starts the next turn. Returns
    /// `false` once that budget is used up.
    pub fn charge(&mut self, color: Color, elapsed: Duration) -> bool {
        let remaining = &mut self.remaining[color];
        *remaining = remaining.saturating_sub(elapsed);
        self.turn_started = Instant::now();
        !remaining.is_zero()
    }

    /// Starts a new turn without charging anyone.
    pub fn restart_turn(&mut self) {
        self.turn_started = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Color::*;

    #[test]
    fn test_charge() {
        let mut clock = Clock::new(Duration::from_secs(60));
        assert!(clock.charge(White, Duration::from_secs(15)));
        assert_eq!(clock.remaining(White), Duration::from_secs(45));
        assert_eq!(clock.remaining(Black), Duration::from_secs(60));
        assert!(clock.charge(Black, Duration::from_millis(59_999)));
        assert_eq!(clock.remaining(Black), Duration::from_millis(1));
        assert!(!clock.remaining(Black).is_zero());
    }

    #[test]
    fn test_budget_runs_out() {
        let mut clock = Clock::new(Duration::from_secs(5));
        assert!(!clock.charge(White, Duration::from_secs(5)));
        assert_eq!(clock.remaining(White), Duration::ZERO);
        assert!(!clock.charge(Black, Duration::from_secs(30)));
        assert_eq!(clock.remaining(Black), Duration::ZERO);
    }

    #[test]
    fn test_restart_turn() {
        let mut clock = Clock::new(Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(50));
        assert!(clock.elapsed() >= Duration::from_millis(50));
        clock.restart_turn();
        assert!(clock.elapsed() < Duration::from_millis(50));
        assert_eq!(clock.remaining(White), Duration::from_secs(60));
        assert_eq!(clock.remaining(Black), Duration::from_secs(60));
    }
}
