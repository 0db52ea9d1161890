//! The evaluator's view of the outside world.

use std::collections::VecDeque;
use std::io;

/// Line-oriented output sink and blocking input source.
pub trait Host {
    /// Emit one line of program output.
    fn output(&mut self, text: &str) -> io::Result<()>;

    /// Block until one line of input is available; the trailing newline is
    /// stripped.
    fn input(&mut self) -> io::Result<String>;
}

/// In-memory host: input comes from a queue, output is captured.
#[derive(Debug, Default, Clone)]
pub struct ScriptedHost {
    input: VecDeque<String>,
    output: Vec<String>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose input yields `lines` in order.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: Vec::new(),
        }
    }

    pub fn push_input(&mut self, line: impl Into<String>) {
        self.input.push_back(line.into());
    }

    /// Lines emitted so far.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn into_output(self) -> Vec<String> {
        self.output
    }
}

impl Host for ScriptedHost {
    fn output(&mut self, text: &str) -> io::Result<()> {
        self.output.push(text.to_string());
        Ok(())
    }

    fn input(&mut self) -> io::Result<String> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input lines"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_host_queues_input() {
        let mut host = ScriptedHost::with_input(["1", "two"]);
        host.push_input("3");
        assert_eq!(host.input().unwrap(), "1");
        assert_eq!(host.input().unwrap(), "two");
        assert_eq!(host.input().unwrap(), "3");
        let err = host.input().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_scripted_host_captures_output() {
        let mut host = ScriptedHost::new();
        Host::output(&mut host, "a").unwrap();
        Host::output(&mut host, "b").unwrap();
        assert_eq!(host.output(), ["a", "b"]);
        assert_eq!(host.into_output(), vec!["a".to_string(), "b".to_string()]);
    }
}
