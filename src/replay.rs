//! Timestamped recording and paced replay of line streams.
//!
//! A recording holds one entry per input line, `<ms> <line>`, where `ms` counts milliseconds
//! since recording started. Playback sleeps until each entry's offset and writes the rest of the
//! line, so a live session (`stewie ds3 | stewie record session.txt | platform-solver`) can be
//! fed to the solver again later.

use std::io::BufRead;
use std::time::Duration;

use crate::foundation::clock::Clock;
use crate::foundation::error::{StewieError, StewieResult};
use crate::runtime::Runtime;
use crate::sink::TransformSink;

/// Stamps lines with the time elapsed since it was started.
#[derive(Clone, Copy, Debug)]
pub struct Recorder {
    started: Duration,
    lines: u64,
}

impl Recorder {
    pub fn start<C: Clock, S: TransformSink>(rt: &Runtime<C, S>) -> Self {
        Self {
            started: rt.now(),
            lines: 0,
        }
    }

    /// Lines recorded so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn record_line<C: Clock, S: TransformSink>(
        &mut self,
        rt: &mut Runtime<C, S>,
        line: &str,
    ) -> StewieResult<()> {
        let ms = rt.now().saturating_sub(self.started).as_millis();
        rt.emit_line(&format!("{ms} {line}"))?;
        self.lines += 1;
        Ok(())
    }
}

/// Read `input` to the end, writing each line stamped to the runtime's sink and, when given,
/// the line unchanged to `echo`. Returns the number of lines recorded.
#[tracing::instrument(level = "debug", skip_all)]
pub fn record<C, S, R>(
    rt: &mut Runtime<C, S>,
    mut input: R,
    mut echo: Option<&mut dyn TransformSink>,
) -> StewieResult<u64>
where
    C: Clock,
    S: TransformSink,
    R: BufRead,
{
    let mut recorder = Recorder::start(rt);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(recorder.lines());
        }
        rt.check_cancelled()?;
        let text = String::from_utf8_lossy(&raw);
        let line = text.trim_end_matches(['\r', '\n']);
        recorder.record_line(rt, line)?;
        if let Some(echo) = &mut echo {
            echo.emit_line(line)?;
        }
    }
}

/// Timing summary of one playback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub lines: u64,
    /// Entries whose offset had already passed when they were read.
    pub late: u64,
    pub max_behind: Duration,
}

fn parse_entry(text: &str, line_no: u64) -> StewieResult<(u64, &str)> {
    let malformed =
        || StewieError::parse(format!("recording line {line_no}: expected `<ms> <line>`"));
    let (ms, rest) = text.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let ms = ms.parse::<u64>().map_err(|_| malformed())?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return Err(malformed());
    }
    Ok((ms, rest))
}

/// Replay a recording through the runtime's sink.
///
/// Offsets are measured from the start of playback, so an overslept entry does not delay the
/// ones after it. Entries that are already due are written at once and counted as late. Blank
/// lines are skipped; a malformed line stops playback with [`StewieError::Parse`].
#[tracing::instrument(level = "debug", skip_all)]
pub fn playback<C, S, R>(rt: &mut Runtime<C, S>, mut input: R) -> StewieResult<PlaybackStats>
where
    C: Clock,
    S: TransformSink,
    R: BufRead,
{
    let start = rt.now();
    let mut stats = PlaybackStats::default();
    let mut raw = Vec::new();
    let mut line_no = 0u64;
    loop {
        raw.clear();
        if input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(stats);
        }
        line_no += 1;
        let text = String::from_utf8_lossy(&raw);
        let text = text.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            continue;
        }
        let (ms, rest) = parse_entry(text.trim_start(), line_no)?;

        rt.check_cancelled()?;
        let due = Duration::from_millis(ms);
        let elapsed = rt.now().saturating_sub(start);
        if elapsed > due {
            let behind = elapsed - due;
            tracing::warn!(
                line = line_no,
                behind_ms = behind.as_millis() as u64,
                "playback can't keep up"
            );
            stats.late += 1;
            stats.max_behind = stats.max_behind.max(behind);
        } else if due > elapsed {
            rt.sleep(due - elapsed);
        }

        rt.emit_line(rest)?;
        stats.lines += 1;
    }
}
