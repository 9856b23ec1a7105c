//! Logging the lines of a reader
//!
//! Useful for relaying the output of a child process or a pipe.

use super::{
    attribute::Value,
    error::{join, Result},
    log_level::LogLevel,
    logger::Logger,
};
use std::io::BufRead;

impl Logger {
    /// Log every line of `reader` at `level`, with the same attributes each time
    ///
    /// Stops at the first read error and returns it. Dispatch failures for
    /// individual lines do not stop the loop; they are returned together
    /// once the reader is exhausted.
    pub fn log_lines<R>(&self, reader: R, level: LogLevel, args: &[Value]) -> Result<()>
    where
        R: BufRead,
    {
        self.log_lines_with(reader, level, |line| line.to_string(), args)
    }

    /// Like [`Logger::log_lines`], building each message with `format`
    pub fn log_lines_with<R, F>(
        &self,
        reader: R,
        level: LogLevel,
        mut format: F,
        args: &[Value],
    ) -> Result<()>
    where
        R: BufRead,
        F: FnMut(&str) -> String,
    {
        let mut errors = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let message = format(&line);

            if let Err(e) = self.log(level, message, args.to_vec()) {
                errors.push(e);
            }
        }

        join(errors)
    }
}
