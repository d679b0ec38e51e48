//! Run records and the aggregated batch report.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SimError;
use crate::numbers::{count_to_f64, percent_of};
use crate::resolver::ResolvedNode;

/// Outcome of one wave in one run. `player_hp_remaining == 0` means the player
/// died in this wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveSnapshot {
    pub wave_id: String,
    pub wave_label: String,
    pub wave_index: u32,
    pub player_hp_remaining: f64,
    pub player_hp_max: f64,
    pub survived: bool,
}

impl WaveSnapshot {
    #[must_use]
    pub fn hp_pct(&self) -> f64 {
        percent_of(self.player_hp_remaining, self.player_hp_max)
    }
}

/// One full playthrough. Waves after a loss are not recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub won: bool,
    pub total_turns: u32,
    pub waves: Vec<WaveSnapshot>,
}

/// Cross-run aggregate for one wave index. Percentages are in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveStat {
    pub wave_id: String,
    pub wave_label: String,
    pub wave_index: u32,
    pub runs_reached: u32,
    pub survival_rate: f64,
    pub avg_hp_pct: f64,
    pub min_hp_pct: f64,
    pub max_hp_pct: f64,
    pub avg_hp_raw: f64,
}

/// Final batch output: plain data, safe to persist or transmit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub chapter_id: String,
    pub chapter_name: String,
    pub node_id: String,
    pub node_name: String,
    pub iterations: u32,
    pub actual_runs: u32,
    pub overall_win_rate: f64,
    pub avg_turns: f64,
    pub wave_stats: Vec<WaveStat>,
    pub completion_rate: f64,
}

/// Incremental mean with min/max tracking.
#[derive(Debug, Clone, Copy)]
struct RunningStats {
    count: u32,
    mean: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / count_to_f64(self.count);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean.clamp(self.min, self.max)
        }
    }

    fn min(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.min }
    }

    fn max(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.max }
    }
}

#[derive(Debug, Clone)]
struct WaveAccumulator {
    wave_id: String,
    wave_label: String,
    wave_index: u32,
    reached: u32,
    survived: u32,
    hp_pct: RunningStats,
    hp_raw: RunningStats,
}

impl WaveAccumulator {
    fn new(snapshot: &WaveSnapshot) -> Self {
        Self {
            wave_id: snapshot.wave_id.clone(),
            wave_label: snapshot.wave_label.clone(),
            wave_index: snapshot.wave_index,
            reached: 0,
            survived: 0,
            hp_pct: RunningStats::default(),
            hp_raw: RunningStats::default(),
        }
    }

    fn ingest(&mut self, snapshot: &WaveSnapshot) {
        self.reached += 1;
        if snapshot.survived {
            self.survived += 1;
        }
        self.hp_pct.add(snapshot.hp_pct());
        self.hp_raw.add(snapshot.player_hp_remaining.max(0.0));
    }

    fn finish(self) -> WaveStat {
        WaveStat {
            wave_id: self.wave_id,
            wave_label: self.wave_label,
            wave_index: self.wave_index,
            runs_reached: self.reached,
            survival_rate: percent_of(count_to_f64(self.survived), count_to_f64(self.reached)),
            avg_hp_pct: self.hp_pct.mean(),
            min_hp_pct: self.hp_pct.min(),
            max_hp_pct: self.hp_pct.max(),
            avg_hp_raw: self.hp_raw.mean(),
        }
    }
}

/// Folds completed runs into a [`SimulationReport`].
///
/// Waves that no run reached never get an accumulator and are therefore
/// omitted from `wave_stats`.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    chapter_id: String,
    chapter_name: String,
    node_id: String,
    node_name: String,
    iterations: u32,
    actual_runs: u32,
    abandoned_runs: u32,
    wins: u32,
    turns: RunningStats,
    waves: BTreeMap<u32, WaveAccumulator>,
}

impl ReportAggregator {
    #[must_use]
    pub fn new(node: &ResolvedNode, iterations: u32) -> Self {
        Self {
            chapter_id: node.chapter_id.clone(),
            chapter_name: node.chapter_name.clone(),
            node_id: node.node_id.clone(),
            node_name: node.node_name.clone(),
            iterations,
            actual_runs: 0,
            abandoned_runs: 0,
            wins: 0,
            turns: RunningStats::default(),
            waves: BTreeMap::new(),
        }
    }

    pub fn ingest(&mut self, run: &SimulationRun) {
        self.actual_runs += 1;
        if run.won {
            self.wins += 1;
        }
        self.turns.add(count_to_f64(run.total_turns));
        for snapshot in &run.waves {
            self.waves
                .entry(snapshot.wave_index)
                .or_insert_with(|| WaveAccumulator::new(snapshot))
                .ingest(snapshot);
        }
    }

    pub fn record_abandoned(&mut self) {
        self.abandoned_runs += 1;
    }

    #[must_use]
    pub const fn actual_runs(&self) -> u32 {
        self.actual_runs
    }

    #[must_use]
    pub const fn abandoned_runs(&self) -> u32 {
        self.abandoned_runs
    }

    /// Produce the report.
    ///
    /// # Errors
    ///
    /// Returns `SimError::NoValidRuns` when every run was abandoned.
    pub fn finish(self) -> Result<SimulationReport, SimError> {
        if self.actual_runs == 0 {
            return Err(SimError::NoValidRuns {
                iterations: self.iterations,
            });
        }
        let runs = count_to_f64(self.actual_runs);
        Ok(SimulationReport {
            chapter_id: self.chapter_id,
            chapter_name: self.chapter_name,
            node_id: self.node_id,
            node_name: self.node_name,
            iterations: self.iterations,
            actual_runs: self.actual_runs,
            overall_win_rate: percent_of(count_to_f64(self.wins), runs),
            avg_turns: self.turns.mean(),
            wave_stats: self
                .waves
                .into_values()
                .map(WaveAccumulator::finish)
                .collect(),
            completion_rate: percent_of(runs, count_to_f64(self.iterations)),
        })
    }
}
