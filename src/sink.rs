//! Line-oriented transform sinks.
//!
//! Every emitted transform becomes exactly one line: numeric slots rounded to two decimals,
//! labels verbatim, joined by single spaces.

use std::io::{self, Write};

use crate::foundation::core::{Component, Transform};
use crate::foundation::error::StewieResult;

/// Round to two decimals, ties toward positive infinity.
///
/// Negative zero collapses to `0` so it never prints as `-0`.
pub fn round2(v: f64) -> f64 {
    let r = (v * 100.0 + 0.5).floor() / 100.0;
    if r == 0.0 { 0.0 } else { r }
}

/// Render one slot. Integral results print without a fractional part (`1`, not `1.00`).
pub fn format_component(c: &Component) -> String {
    match c {
        Component::Num(v) => round2(*v).to_string(),
        Component::Label(s) => s.clone(),
    }
}

/// Render a whole transform as one output line (no trailing newline).
pub fn format_line(t: &Transform) -> String {
    t.iter()
        .map(format_component)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Consumer of transform lines, called once per tick in emission order.
pub trait TransformSink {
    /// Write one pre-formatted line.
    fn emit_line(&mut self, line: &str) -> StewieResult<()>;

    /// Format and write one transform.
    fn emit(&mut self, transform: &Transform) -> StewieResult<()> {
        self.emit_line(&format_line(transform))
    }
}

impl<S: TransformSink + ?Sized> TransformSink for &mut S {
    fn emit_line(&mut self, line: &str) -> StewieResult<()> {
        (**self).emit_line(line)
    }

    fn emit(&mut self, transform: &Transform) -> StewieResult<()> {
        (**self).emit(transform)
    }
}

/// Writes each line to `W` and flushes immediately, so a downstream reader sees every tick.
#[derive(Debug)]
pub struct LineSink<W: Write> {
    out: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl LineSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TransformSink for LineSink<W> {
    fn emit_line(&mut self, line: &str) -> StewieResult<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Forwards to `inner` and mirrors every emitted transform to a diagnostic writer.
///
/// Literal lines such as `connected` go to `inner` only.
#[derive(Debug)]
pub struct TeeSink<S, W: Write> {
    inner: S,
    mirror: W,
}

impl<S: TransformSink, W: Write> TeeSink<S, W> {
    pub fn new(inner: S, mirror: W) -> Self {
        Self { inner, mirror }
    }

    pub fn into_parts(self) -> (S, W) {
        (self.inner, self.mirror)
    }
}

impl<S: TransformSink, W: Write> TransformSink for TeeSink<S, W> {
    fn emit_line(&mut self, line: &str) -> StewieResult<()> {
        self.inner.emit_line(line)
    }

    fn emit(&mut self, transform: &Transform) -> StewieResult<()> {
        self.inner.emit(transform)?;
        writeln!(self.mirror, "{}", format_line(transform))?;
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    lines: Vec<String>,
    transforms: Vec<Transform>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line in emission order, including literal marker lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Unrounded transforms in emission order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn last(&self) -> Option<&Transform> {
        self.transforms.last()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.transforms.clear();
    }
}

impl TransformSink for InMemorySink {
    fn emit_line(&mut self, line: &str) -> StewieResult<()> {
        self.lines.push(line.to_owned());
        Ok(())
    }

    fn emit(&mut self, transform: &Transform) -> StewieResult<()> {
        self.transforms.push(transform.clone());
        self.emit_line(&format_line(transform))
    }
}
