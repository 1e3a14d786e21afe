use std::io::Write;

use serde::Serialize;
use trend_calculator::{TrendCalculator, TrendState};

use crate::trace::TraceEvent;

/// The filter's output after ingesting one trace event.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayRow {
    pub now_ms: u64,
    pub sample: u32,
    pub value: u32,
    pub highest_value: u32,
    pub state: TrendState,
    pub forced: bool,
}

pub fn replay(calc: &mut TrendCalculator, events: &[TraceEvent]) -> Vec<ReplayRow> {
    events
        .iter()
        .map(|event| {
            if event.forced {
                calc.force_update(event.sample, event.now_ms);
            } else {
                calc.update(event.sample, event.now_ms);
            }
            ReplayRow {
                now_ms: event.now_ms,
                sample: event.sample,
                value: calc.value(),
                highest_value: calc.highest_value(),
                state: calc.state(),
                forced: event.forced,
            }
        })
        .collect()
}

pub fn write_rows(mut out: impl Write, rows: &[ReplayRow], json: bool) -> anyhow::Result<()> {
    for row in rows {
        if json {
            serde_json::to_writer(&mut out, row)?;
            writeln!(out)?;
        } else {
            writeln!(
                out,
                "{} {} {} {}",
                row.now_ms, row.sample, row.value, row.state
            )?;
        }
    }
    out.flush()?;
    Ok(())
}
