//! Line-oriented prompting
//!
//! `Prompter` wraps an input and an output stream so the interactive
//! menu can be driven by stdin/stdout or, in tests, by in-memory buffers.

use anyhow::Result;
use std::io::{self, BufRead, Write};

/// Reads answers from `input` after writing prompts to `output`
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write a prompt and read one line
    ///
    /// Returns `None` at end of input. The line ending is stripped.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    /// Ask a yes/no question; anything but "y"/"yes" is no
    ///
    /// Returns `None` at end of input.
    pub fn confirm(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        let answer = self.ask(&format!("{} [y/N] ", prompt))?;
        Ok(answer.map(|a| is_yes(&a)))
    }

    /// Write one line of output
    pub fn say(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", line.as_ref())
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

/// Prompt for confirmation on the terminal
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    Ok(prompter.confirm(prompt)?.unwrap_or(false))
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}
