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

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartPosition {
    /// The engine's opening array, with White's f-pawn on f4.
    Default,
    Classical,
    /// White king and rook against a lone king, placed at random.
    Endgame,
}

impl Default for StartPosition {
    fn default() -> Self {
        Self::Default
    }
}

/// Settings for a game session. Fields missing from a serialized config
/// take their default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Budget per player in seconds; `None` disables time control.
    pub clock_seconds: Option<u64>,
    pub start: StartPosition,
    pub rules: RuleSet,
}

impl GameConfig {
    pub fn timed(seconds: u64) -> Self {
        Self {
            clock_seconds: Some(seconds),
            ..Default::default()
        }
    }

    pub fn endgame() -> Self {
        Self {
            start: StartPosition::Endgame,
            ..Default::default()
        }
    }

    pub fn clock_budget(&self) -> Option<Duration> {
        self.clock_seconds.map(Duration::from_secs)
    }
}
