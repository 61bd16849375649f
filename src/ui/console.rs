use std::io::{self, Write};
use std::path::Path;

use crossterm::cursor;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use tracing::debug;

use crate::session::solver::SolveObserver;
use crate::session::tracker::{QuestionOutcome, Summary};

const ARROW: &str = " ➡ ";
const NOT_IN_STORAGE: &str = "Not in storage";
const BOX_PADDING: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Label,
    Good,
    Bad,
    Dim,
    Warn,
}

impl Tone {
    fn color(self) -> Option<Color> {
        match self {
            Tone::Plain => None,
            Tone::Label => Some(Color::Cyan),
            Tone::Good => Some(Color::Green),
            Tone::Bad => Some(Color::Red),
            Tone::Dim => Some(Color::DarkGrey),
            Tone::Warn => Some(Color::Yellow),
        }
    }
}

/// One terminal line that is redrawn in place.
pub struct StatusLine<W: Write> {
    out: W,
}

impl<W: Write> StatusLine<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Clear the line and draw `segments` from column zero.
    pub fn redraw(&mut self, segments: &[(Tone, &str)]) -> io::Result<()> {
        queue!(self.out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        self.append(segments)
    }

    pub fn append(&mut self, segments: &[(Tone, &str)]) -> io::Result<()> {
        for (tone, text) in segments {
            match tone.color() {
                Some(color) => queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)?,
                None => queue!(self.out, Print(text))?,
            }
        }
        self.out.flush()
    }

    /// Park the cursor `columns` characters left of where drawing ended.
    pub fn rewind(&mut self, columns: usize) -> io::Result<()> {
        if columns > 0 {
            let columns = u16::try_from(columns).unwrap_or(u16::MAX);
            queue!(self.out, cursor::MoveLeft(columns))?;
        }
        self.out.flush()
    }

    /// Typed text in `tone`, with the untyped rest of `target` dimmed after it.
    pub fn echo(&mut self, prefix: &[(Tone, &str)], typed: &str, target: &str, tone: Tone) -> io::Result<()> {
        let rest = untyped_rest(typed, target);
        let mut segments = prefix.to_vec();
        segments.push((tone, typed));
        segments.push((Tone::Dim, rest));
        self.redraw(&segments)?;
        self.rewind(rest.chars().count())
    }

    pub fn finish(&mut self) -> io::Result<()> {
        queue!(self.out, cursor::MoveToColumn(0), Print("\n"))?;
        self.out.flush()
    }
}

/// Part of `target` past the number of characters already typed.
pub fn untyped_rest<'a>(typed: &str, target: &'a str) -> &'a str {
    let typed_len = typed.chars().count();
    match target.char_indices().nth(typed_len) {
        Some((at, _)) => &target[at..],
        None => "",
    }
}

/// Renders question progress as `translation ➡ answer` lines.
pub struct ConsoleObserver<W: Write> {
    line: StatusLine<W>,
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            line: StatusLine::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.line.into_inner()
    }

    fn draw(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            debug!(error = %e, "failed to draw progress line");
        }
    }
}

impl ConsoleObserver<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> SolveObserver for ConsoleObserver<W> {
    fn question(&mut self, translation: &str, cached: Option<&str>) {
        let result = match cached {
            Some(answer) => self
                .line
                .redraw(&[(Tone::Label, translation), (Tone::Plain, ARROW), (Tone::Dim, answer)])
                .and_then(|_| self.line.rewind(answer.chars().count())),
            None => self.line.redraw(&[
                (Tone::Label, translation),
                (Tone::Plain, ARROW),
                (Tone::Warn, NOT_IN_STORAGE),
            ]),
        };
        self.draw(result);
    }

    fn keystroke(&mut self, translation: &str, typed: &str, target: &str, intentional: bool) {
        let tone = if intentional { Tone::Bad } else { Tone::Good };
        let result = self.line.echo(
            &[(Tone::Label, translation), (Tone::Plain, ARROW)],
            typed,
            target,
            tone,
        );
        self.draw(result);
    }

    fn answered(&mut self, translation: &str, outcome: QuestionOutcome, correct: &str) {
        let result = match outcome {
            QuestionOutcome::Learned => self.line.redraw(&[
                (Tone::Label, translation),
                (Tone::Plain, ARROW),
                (Tone::Warn, NOT_IN_STORAGE),
                (Tone::Plain, " ["),
                (Tone::Good, correct),
                (Tone::Plain, "]"),
            ]),
            QuestionOutcome::Corrected => {
                self.line
                    .append(&[(Tone::Plain, " ["), (Tone::Warn, correct), (Tone::Plain, "]")])
            }
            QuestionOutcome::Correct | QuestionOutcome::IntentionalError => Ok(()),
        };
        let result = result.and_then(|_| self.line.finish());
        self.draw(result);
    }
}

/// Plain-text rows of a bordered box, title set into the top border.
pub fn boxed(title: &str, rows: &[String]) -> Vec<String> {
    let content_width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let title_width = title.chars().count() + 2;
    let inner = (content_width + BOX_PADDING * 2).max(title_width + 2);
    let pad = " ".repeat(BOX_PADDING);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "┌ {title} {}┐",
        "─".repeat(inner - title_width)
    ));
    for row in rows {
        let fill = inner - BOX_PADDING * 2 - row.chars().count();
        lines.push(format!("│{pad}{row}{}{pad}│", " ".repeat(fill)));
    }
    lines.push(format!("└{}┘", "─".repeat(inner)));
    lines
}

/// `Label:   value` rows with the numbers right-aligned in one column.
pub fn summary_rows(summary: &Summary) -> Vec<String> {
    let rows = summary.rows();
    let label_width = rows.iter().map(|(label, _)| label.len() + 1).max().unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.to_string().len())
        .max()
        .unwrap_or(1);

    rows.iter()
        .map(|(label, value)| {
            format!(
                "{:<label_width$}  {:>value_width$}",
                format!("{label}:"),
                value
            )
        })
        .collect()
}

pub fn print_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    queue!(out, Print("\n"), SetForegroundColor(Color::Green))?;
    for line in boxed("Done - Summary", &summary_rows(summary)) {
        queue!(out, Print(line), Print("\n"))?;
    }
    queue!(out, ResetColor)?;
    out.flush()
}

/// `[ CRITICAL ] message` on stderr, for errors that end the program.
pub fn print_critical(message: &str) {
    let mut err = io::stderr();
    let result = queue!(
        err,
        Print("[ "),
        SetForegroundColor(Color::Magenta),
        Print("CRITICAL"),
        ResetColor,
        Print(" ] "),
        Print(message),
        Print("\n")
    )
    .and_then(|_| err.flush());
    if let Err(e) = result {
        debug!(error = %e, "failed to print critical message");
    }
}

/// Display form of `path` with the home directory folded into `~`.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return Path::new("~").join(rest).display().to_string();
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_untyped_rest_counts_chars() {
        assert_eq!(untyped_rest("", "żółw"), "żółw");
        assert_eq!(untyped_rest("żó", "żółw"), "łw");
        assert_eq!(untyped_rest("żółw", "żółw"), "");
        assert_eq!(untyped_rest("żółwie", "żółw"), "");
    }

    #[test]
    fn test_observer_shows_missing_answer_then_disclosure() {
        let mut observer = ConsoleObserver::new(Vec::new());
        observer.question("pies", None);
        observer.answered("pies", QuestionOutcome::Learned, "dog");

        let out = rendered(observer.into_inner());
        assert!(out.contains("pies"));
        assert!(out.contains(NOT_IN_STORAGE));
        assert!(out.contains("dog"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_observer_echoes_typed_text() {
        let mut observer = ConsoleObserver::new(Vec::new());
        observer.question("kot", Some("cat"));
        observer.keystroke("kot", "c", "cat", false);
        observer.keystroke("kot", "ca", "cat", false);
        observer.answered("kot", QuestionOutcome::Correct, "cat");

        let out = rendered(observer.into_inner());
        assert!(out.contains("ca"));
        assert!(!out.contains(NOT_IN_STORAGE));
    }

    #[test]
    fn test_summary_rows_align_values() {
        let summary = Summary {
            total_questions: 120,
            unique_questions: 40,
            first_time_correct: 7,
            ..Summary::default()
        };
        let rows = summary_rows(&summary);
        assert_eq!(rows.len(), 6);
        let widths: Vec<usize> = rows.iter().map(|r| r.len()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
        assert!(rows[0].starts_with("Total questions:"));
        assert!(rows[0].ends_with("120"));
        assert!(rows[2].ends_with("  7"));
    }

    #[test]
    fn test_boxed_lines_share_width() {
        let lines = boxed("Done - Summary", &["a: 1".to_string(), "bbbbbb: 22".to_string()]);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Done - Summary"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{lines:?}");
    }

    #[test]
    fn test_display_path_outside_home_is_unchanged() {
        assert_eq!(display_path(Path::new("/definitely/not/home")), "/definitely/not/home");
    }
}
