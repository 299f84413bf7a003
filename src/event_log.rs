//! Newline-delimited JSON log of spawns and commands from a headless run.

use anyhow::{Context, Result};
use serde::Serialize;
use shinymobs_core::SimTick;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct EventLine<'a> {
    tick: SimTick,
    kind: &'a str,
    payload: &'a str,
}

pub struct EventLog {
    writer: BufWriter<File>,
}

impl EventLog {
    /// Create (or truncate) the log at `path`, creating parent dirs if needed.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create log dir {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("create event log {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn record(&mut self, tick: SimTick, kind: &str, payload: &str) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &EventLine { tick, kind, payload })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flush event log")
    }
}
