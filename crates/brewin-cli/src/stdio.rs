//! Terminal host: program output to stdout, input lines from stdin.

use brewin_eval::Host;
use std::io::{self, BufRead, Write};

pub struct StdioHost {
    stdin: io::StdinLock<'static>,
    stdout: io::StdoutLock<'static>,
}

impl StdioHost {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
            stdout: io::stdout().lock(),
        }
    }
}

impl Host for StdioHost {
    fn output(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.stdout, "{text}")?;
        // Prompts must be visible before the next blocking read.
        self.stdout.flush()
    }

    fn input(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.stdin.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input reached",
            ));
        }
        Ok(strip_line_ending(line))
    }
}

fn strip_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::strip_line_ending;

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending("42\n".into()), "42");
        assert_eq!(strip_line_ending("42\r\n".into()), "42");
        assert_eq!(strip_line_ending("  x ".into()), "  x ");
    }
}
