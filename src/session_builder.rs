//! # Session Builder Module
//!
//! Reconstructs discrete traffic sessions from per-key volume time series
//!
//! ## Key Components
//! - [`SessionRecord`] - One contiguous burst of traffic for one key
//! - [`SessionAccumulator`] - Idle-gap state machine fed response by response
//! - [`normalize_key`] - Make Kentik dimension keys CSV-safe

use std::collections::HashMap;

use crate::api_client::{FlowSample, TopxResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub key: String,
    pub start: i64,
    /// None while the session is still open.
    pub end: Option<i64>,
    pub last_seen: i64,
    pub total_kilobytes: u64,
}

/// Builds session records across windows. Records are append-only; at most
/// one record per key is open at a time, tracked through the `open` map.
pub struct SessionAccumulator {
    max_idle_secs: i64,
    open: HashMap<String, usize>,
    records: Vec<SessionRecord>,
}

impl SessionAccumulator {
    pub fn new(max_idle_secs: i64) -> Self {
        Self {
            max_idle_secs,
            open: HashMap::new(),
            records: Vec::new(),
        }
    }

    /// Feed every keyed series of one response through the state machine.
    pub fn ingest_response(&mut self, response: &TopxResponse) {
        for result in &response.results {
            for series in &result.data {
                if let Some(time_series) = &series.time_series {
                    self.ingest_series(&series.key, &time_series.both_bits_per_sec.flow);
                }
            }
        }
    }

    /// Run one key's samples through the state machine in timestamp order.
    pub fn ingest_series(&mut self, raw_key: &str, samples: &[FlowSample]) {
        let key = normalize_key(raw_key);

        // The API returns buckets in order, but sort anyway so a scrambled
        // series cannot corrupt the start/end bookkeeping.
        let mut ordered: Vec<FlowSample> = samples.to_vec();
        ordered.sort_by_key(|sample| sample.timestamp_secs());

        for sample in ordered {
            self.observe(&key, sample);
        }
    }

    fn observe(&mut self, key: &str, sample: FlowSample) {
        let timestamp = sample.timestamp_secs();
        let kilobytes = sample.kilobytes();

        if kilobytes > 0 {
            let index = match self.open.get(key) {
                Some(&index) => index,
                None => {
                    // First traffic for this key since the last closure.
                    self.records.push(SessionRecord {
                        key: key.to_string(),
                        start: timestamp,
                        end: None,
                        last_seen: timestamp,
                        total_kilobytes: 0,
                    });
                    let index = self.records.len() - 1;
                    self.open.insert(key.to_string(), index);
                    index
                }
            };
            let record = &mut self.records[index];
            record.last_seen = timestamp;
            record.total_kilobytes += kilobytes;
        } else if let Some(&index) = self.open.get(key) {
            let record = &mut self.records[index];
            if timestamp - record.last_seen > self.max_idle_secs {
                // The flow went quiet for longer than the idle allowance.
                record.end = Some(record.last_seen + sample.duration_secs());
                self.open.remove(key);
            }
        }
    }

    /// Close every record still open at the end of the query range.
    pub fn finalize(mut self, range_end: i64) -> Vec<SessionRecord> {
        for index in self.open.values() {
            self.records[*index].end = Some(range_end);
        }
        self.records
    }
}

/// Make a Kentik dimension key CSV-safe: " ---- " separators become "|",
/// commas become spaces.
pub fn normalize_key(raw: &str) -> String {
    raw.replace(" ---- ", "|").replace(',', " ")
}
