//! Status reporting for maintenance operations.
//!
//! Operations report each completed step as a `(kind, name, verb)` tuple
//! and free-form warnings. [`PrintSink`] renders them for humans;
//! [`MemorySink`] keeps them for inspection.

use std::io::Write;

use crate::error::DrainResult;

pub trait StatusSink {
    fn success(&mut self, kind: &str, name: &str, verb: &str) -> DrainResult<()>;

    fn warning(&mut self, message: &str) -> DrainResult<()>;
}

/// Writes `kind "name" verb` lines and `WARNING: ...` lines to a writer.
pub struct PrintSink<W: Write> {
    out: W,
}

impl<W: Write> PrintSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StatusSink for PrintSink<W> {
    fn success(&mut self, kind: &str, name: &str, verb: &str) -> DrainResult<()> {
        writeln!(self.out, "{kind} \"{name}\" {verb}")?;
        Ok(())
    }

    fn warning(&mut self, message: &str) -> DrainResult<()> {
        writeln!(self.out, "WARNING: {message}")?;
        Ok(())
    }
}

/// A single reported event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Success {
        kind: String,
        name: String,
        verb: String,
    },
    Warning(String),
}

/// Records every event in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<StatusEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verbs reported for the given resource, in order.
    pub fn verbs_for(&self, kind: &str, name: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                StatusEvent::Success { kind: k, name: n, verb } if k == kind && n == name => {
                    Some(verb.as_str())
                }
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                StatusEvent::Warning(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl StatusSink for MemorySink {
    fn success(&mut self, kind: &str, name: &str, verb: &str) -> DrainResult<()> {
        self.events.push(StatusEvent::Success {
            kind: kind.to_string(),
            name: name.to_string(),
            verb: verb.to_string(),
        });
        Ok(())
    }

    fn warning(&mut self, message: &str) -> DrainResult<()> {
        self.events.push(StatusEvent::Warning(message.to_string()));
        Ok(())
    }
}
