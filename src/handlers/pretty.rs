//! Human-readable terminal handler

use crate::core::{
    Attribute, Handler, LifecycleEvent, LogLevel, LoggerIdentity, Record, Result,
    TimestampFormat, Value,
};
use colored::Color;
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

/// Indentation of the attribute tree under a header line
const ATTRIBUTE_PADDING: &str = "                     ";

/// Writes each record as a colored header line followed by its attributes
///
/// ```text
/// 2025/01/08 10:30:45 INF <src/main.rs:12> server started
///                      ├─ port: 8080
///                      └─ tls
///                          └─ enabled: true
/// ```
///
/// Lifecycle events produce no output.
pub struct PrettyHandler<W: Write + Send + Sync> {
    writer: W,
    level: LogLevel,
    use_colors: bool,
    timestamp_format: TimestampFormat,
    project_root: PathBuf,
}

impl<W: Write + Send + Sync> PrettyHandler<W> {
    /// Create a handler over any writer, without colors
    pub fn new(writer: W, level: LogLevel) -> Self {
        Self {
            writer,
            level,
            use_colors: false,
            timestamp_format: TimestampFormat::Console,
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Caller paths are printed relative to this directory
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn uses_colors(&self) -> bool {
        self.use_colors
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Wrap `text` in SGR escapes
    ///
    /// Codes are written directly so `with_colors` is the only switch;
    /// `colored`'s process-wide override does not apply here.
    fn paint(&self, text: &str, fg: Color, bg: Option<Color>) -> String {
        if !self.use_colors {
            return text.to_string();
        }
        match bg {
            Some(bg) => format!("\x1b[{};{}m{}\x1b[0m", fg.to_fg_str(), bg.to_bg_str(), text),
            None => format!("\x1b[{}m{}\x1b[0m", fg.to_fg_str(), text),
        }
    }

    /// Render a record, header and attribute tree
    pub fn format_record(&self, record: &Record) -> String {
        let mut out = String::new();

        let (fg, bg) = record.level.color_code();
        let _ = write!(
            out,
            "{} {} ",
            self.timestamp_format.format(&record.timestamp),
            self.paint(record.level.short_code(), fg, bg)
        );

        let location = record.caller.as_ref().and_then(|caller| {
            let file = caller.relative_file(&self.project_root)?;
            Some(match caller.line {
                Some(line) => format!("<{}:{}> ", file.display(), line),
                None => format!("<{}> ", file.display()),
            })
        });
        let location = location.unwrap_or_else(|| "<UNKNOWN CALLER> ".to_string());
        out.push_str(&self.paint(&location, Color::BrightBlack, None));

        out.push_str(&escape_newlines(&record.message));
        out.push('\n');

        self.format_attributes(&mut out, &record.attributes, ATTRIBUTE_PADDING);
        out
    }

    fn format_attributes(&self, out: &mut String, attributes: &[Attribute], padding: &str) {
        for (i, attribute) in attributes.iter().enumerate() {
            let is_last = i + 1 == attributes.len();

            out.push_str(padding);
            out.push_str(if is_last { "└─ " } else { "├─ " });

            let key = self.paint(&attribute.key, Color::BrightBlack, None);
            match &attribute.value {
                Value::Group(children) => {
                    let _ = writeln!(out, "{}", key);
                    let nested = format!("{}{}", padding, if is_last { "    " } else { "│   " });
                    self.format_attributes(out, children, &nested);
                }
                value => {
                    let _ = writeln!(out, "{}: {}", key, escape_newlines(&value.to_string()));
                }
            }
        }
    }
}

impl PrettyHandler<io::Stdout> {
    /// Write to stdout, with colors if it is a terminal and `NO_COLOR` is unset
    pub fn stdout(level: LogLevel) -> Self {
        let stdout = io::stdout();
        let use_colors = stdout.is_terminal() && !no_color();
        Self::new(stdout, level).with_colors(use_colors)
    }
}

impl PrettyHandler<io::Stderr> {
    /// Write to stderr, with colors if it is a terminal and `NO_COLOR` is unset
    pub fn stderr(level: LogLevel) -> Self {
        let stderr = io::stderr();
        let use_colors = stderr.is_terminal() && !no_color();
        Self::new(stderr, level).with_colors(use_colors)
    }
}

/// `NO_COLOR` set to a non-empty value
fn no_color() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

fn escape_newlines(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

impl<W: Write + Send + Sync> Handler for PrettyHandler<W> {
    fn on_created(&mut self, _event: &LifecycleEvent) {}

    fn on_closed(&mut self, _event: &LifecycleEvent) -> Result<()> {
        Ok(())
    }

    fn handle_record(&mut self, _logger: &LoggerIdentity, record: &Record) -> Result<()> {
        if record.level < self.level {
            return Ok(());
        }

        let output = self.format_record(record);
        self.writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "pretty"
    }
}
