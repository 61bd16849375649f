use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, queue};

use crate::config::setup::Prompter;

/// Line-based prompts on a reader/writer pair, usually stdin and stdout.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    /// Read passwords key by key in raw mode instead of as a visible line.
    masked_passwords: bool,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let masked = stdin.is_terminal();
        Self {
            input: stdin.lock(),
            output: io::stdout(),
            masked_passwords: masked,
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            masked_passwords: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, message: &str, hint: &str) -> Result<()> {
        queue!(
            self.output,
            SetForegroundColor(Color::Green),
            Print("? "),
            ResetColor,
            Print(message),
            SetForegroundColor(Color::DarkGrey),
            Print(hint),
            ResetColor,
            Print(" ")
        )?;
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed while waiting for an answer");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_masked(&mut self) -> Result<String> {
        let _raw = RawMode::enable()?;
        let mut secret = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    bail!("interrupted");
                }
                KeyCode::Backspace => {
                    if secret.pop().is_some() {
                        execute!(self.output, Print("\u{8} \u{8}"))?;
                    }
                }
                KeyCode::Char(c) => {
                    secret.push(c);
                    execute!(self.output, Print('*'))?;
                }
                _ => {}
            }
        }
        execute!(self.output, Print("\r\n"))?;
        Ok(secret)
    }

    /// Ask whether to start another session. Enter continues, `q` quits.
    pub fn continue_or_quit(&mut self) -> Result<bool> {
        self.ask("Press Enter to start the next session", " (q to quit)")?;
        let answer = self.read_line()?;
        Ok(!answer.trim().eq_ignore_ascii_case("q"))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { " (Y/n)" } else { " (y/N)" };
        loop {
            self.ask(message, hint)?;
            match self.read_line()?.trim().to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }

    fn text(&mut self, message: &str) -> Result<String> {
        self.ask(message, "")?;
        self.read_line()
    }

    fn password(&mut self, message: &str) -> Result<String> {
        self.ask(message, "")?;
        if self.masked_passwords {
            self.read_masked()
        } else {
            self.read_line()
        }
    }

    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize> {
        if choices.is_empty() {
            bail!("nothing to select from");
        }
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {choice}", i + 1)?;
        }
        loop {
            self.ask(message, &format!(" [1-{}]", choices.len()))?;
            match self.read_line()?.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.output, "Enter a number between 1 and {}.", choices.len())?,
            }
        }
    }
}

struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}
