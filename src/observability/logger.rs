//! Structured JSON logger
//!
//! One log line = one event. Output is synchronous and unbuffered, with the
//! severity and event name first and the remaining fields in caller order,
//! so a batch transcript reads top to bottom as the operator's remediation
//! record.

use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info = 0,
    /// Recoverable issues; the batch continues
    Warn = 1,
    /// A promotion unit aborted
    Error = 2,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronous structured logger.
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity >= Severity::Warn {
            Self::log_to_writer(severity, event, fields, &mut io::stderr());
        } else {
            Self::log_to_writer(severity, event, fields, &mut io::stdout());
        }
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        // Built by hand so the line shape is stable: severity, event, then
        // fields in caller order.
        let mut output = String::with_capacity(128);
        output.push('{');
        output.push_str("\"severity\":\"");
        output.push_str(severity.as_str());
        output.push_str("\",\"event\":\"");
        Self::escape_into(&mut output, event);
        output.push('"');
        for (key, value) in fields {
            output.push_str(",\"");
            Self::escape_into(&mut output, key);
            output.push_str("\":\"");
            Self::escape_into(&mut output, value);
            output.push('"');
        }
        output.push_str("}\n");

        // A logging failure must never take down the batch.
        let _ = writer.write_all(output.as_bytes());
        let _ = writer.flush();
    }

    fn escape_into(output: &mut String, text: &str) {
        for c in text.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }
}
