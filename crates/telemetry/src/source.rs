//! Sample sources: where each tick's raw pose comes from.

use std::collections::VecDeque;
use std::time::Instant;

use posecore::RawSample;

use crate::table::{keys, qualified_key, TelemetryTable};

/// Non-blocking provider of the latest raw sample.
pub trait SampleSource {
    /// Latest sample, or `None` while nothing usable has been published
    /// (not yet connected, or the transport dropped). Never blocks.
    fn poll(&mut self) -> Option<RawSample>;
}

/// Reads pose samples out of a [`TelemetryTable`].
///
/// The sample timestamp is the write time of the newest required key, so
/// polling the same publication twice yields the same timestamp.
#[derive(Debug, Clone)]
pub struct TableSource {
    table: TelemetryTable,
    keys: [String; 6],
    epoch: Instant,
}

impl TableSource {
    pub fn new(table: TelemetryTable, namespace: &str) -> Self {
        Self::with_epoch(table, namespace, Instant::now())
    }

    /// Source whose timestamps count seconds from `epoch`
    pub fn with_epoch(table: TelemetryTable, namespace: &str, epoch: Instant) -> Self {
        let keys = [keys::X, keys::Y, keys::THETA, keys::VX, keys::VY, keys::OMEGA]
            .map(|name| qualified_key(namespace, name));
        Self { table, keys, epoch }
    }

    pub fn table(&self) -> &TelemetryTable {
        &self.table
    }
}

impl SampleSource for TableSource {
    fn poll(&mut self) -> Option<RawSample> {
        if !self.table.is_connected() {
            return None;
        }

        let snapshot = self.table.entries(&self.keys);
        let (x, y, theta) = (snapshot[0]?, snapshot[1]?, snapshot[2]?);
        let updated = x.updated.max(y.updated).max(theta.updated);

        Some(RawSample {
            x: x.value,
            y: y.value,
            theta: theta.value,
            vx: snapshot[3].map(|e| e.value),
            vy: snapshot[4].map(|e| e.value),
            omega: snapshot[5].map(|e| e.value),
            timestamp: updated.saturating_duration_since(self.epoch).as_secs_f64(),
        })
    }
}

/// Replays a fixed script of poll results, then reports `None` forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: VecDeque<Option<RawSample>>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Option<RawSample>>) -> Self {
        Self { script: script.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SampleSource for ScriptedSource {
    fn poll(&mut self) -> Option<RawSample> {
        self.script.pop_front().flatten()
    }
}
