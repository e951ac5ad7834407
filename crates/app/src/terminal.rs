use std::io::{self, BufRead, Write};

/// Line-based prompts over any reader/writer pair.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", line.as_ref())
    }

    /// Read one trimmed line. `None` on end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    /// Ask until the answer is yes or no. `None` on end of input.
    pub fn ask_yes_no(&mut self, question: &str) -> io::Result<Option<bool>> {
        loop {
            write!(self.output, "{question} [y/n] ")?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }

    /// Show numbered options and return the 0-based pick. `None` on end of input.
    pub fn choose(&mut self, options: &[String]) -> io::Result<Option<usize>> {
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {option}", i + 1)?;
        }
        loop {
            write!(self.output, "Choice [1-{}]: ", options.len())?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => self.say("Pick one of the listed numbers.")?,
            }
        }
    }

    /// Block until the user presses enter. `false` on end of input.
    pub fn wait_for_enter(&mut self, prompt: &str) -> io::Result<bool> {
        write!(self.output, "{prompt}")?;
        Ok(self.read_line()?.is_some())
    }
}
