use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::cards::Card;

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One board's outcome within a [`RoundRecord`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoardRecord {
    /// The community cards that were in play when the board ended.
    pub community: Vec<Card>,
    /// Whether the board reached a showdown reveal.
    pub revealed: bool,
    /// Chip payout per seat from this board.
    pub winnings: [u32; 2],
}

/// One action taken during a round, in order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Seat that acted (0 or 1)
    pub seat: usize,
    /// Street code when the action was taken (0, 3, 4, 5)
    pub street: u8,
    /// 1-based board number
    pub board: usize,
    pub action: Action,
}

/// Structured record of one full round, serialized as one JSONL line.
/// Complements the prose game log with a replayable history.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number from 1 to the configured round count
    pub round_num: u32,
    pub boards: Vec<BoardRecord>,
    /// Chronological action list across all boards
    pub actions: Vec<ActionEntry>,
    /// Net chip deltas for the round, per seat
    pub deltas: [i32; 2],
    /// Bankrolls after the round, per seat
    pub bankrolls: [i64; 2],
    /// Timestamp when the round finished (RFC3339)
    #[serde(default)]
    pub ts: Option<String>,
}

/// JSONL writer for round records. A logger created with
/// [`RoundLogger::disabled`] swallows writes, so callers never branch.
pub struct RoundLogger {
    writer: Option<BufWriter<File>>,
}

impl RoundLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                let _ = create_dir_all(parent);
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
        })
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn write(&mut self, record: &RoundRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
