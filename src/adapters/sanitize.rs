//! Log sanitization for patient identifiers.
//!
//! Patient records carry clinical values only, but callers sometimes attach
//! identifiers to the input file name or to error context. Every formatted log
//! line passes through [`SanitizingMakeWriter`], which redacts:
//! - Medical record numbers (`MRN 1234567`, `MRN:12345678`)
//! - SSN-like numbers
//! - Email addresses and phone numbers
//! - UUIDs (encounter and patient IDs)
//! - Dates of birth given as `DOB` / `date_of_birth`
//!
//! Input is capped at `POSTPARTUM_SANITIZE_MAX_BYTES` (default 16 KiB) per call.

use std::io::Write;
use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;
const MAX_BYTES_ENV: &str = "POSTPARTUM_SANITIZE_MAX_BYTES";

const RULES: &[(&str, &str)] = &[
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-UUID]",
    ),
    (r"(?i)\bMRN[#:\s]*\d{6,10}\b", "[REDACTED-MRN]"),
    (
        r"(?i)\b(?:DOB|date[_ ]of[_ ]birth)\b\s*[:=]?\s*\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}",
        "[REDACTED-DOB]",
    ),
    (r"\b\d{3}-\d{2}-\d{4}\b", "[REDACTED-SSN]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}\b",
        "[REDACTED-PHONE]",
    ),
];

struct Patterns {
    set: RegexSet,
    rules: Vec<(Regex, &'static str)>,
}

static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();

/// Compiled rules, or `None` if compilation failed (then lines are dropped).
fn patterns() -> Option<&'static Patterns> {
    PATTERNS
        .get_or_init(|| {
            let set = RegexSet::new(RULES.iter().map(|(p, _)| *p)).ok()?;
            let rules = RULES
                .iter()
                .map(|(p, r)| Regex::new(p).map(|re| (re, *r)))
                .collect::<Result<Vec<_>, _>>()
                .ok()?;
            Some(Patterns { set, rules })
        })
        .as_ref()
}

fn max_sanitize_bytes() -> usize {
    std::env::var(MAX_BYTES_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Redact patient identifiers from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut out = match patterns() {
        Some(patterns) => {
            let mut result = prefix.to_string();
            for idx in patterns.set.matches(prefix).iter() {
                let (regex, replacement) = &patterns.rules[idx];
                result = regex.replace_all(&result, *replacement).into_owned();
            }
            result
        }
        None => "[REDACTED-LINE]".to_string(),
    };

    if truncated {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// A `tracing_subscriber` writer that sanitizes each formatted line before
/// it reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: Write> Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single line larger than twice the cap is flushed truncated.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_mrn() {
        let sanitized = sanitize("Scoring MRN:12345678 for review");
        assert!(sanitized.contains("[REDACTED-MRN]"));
        assert!(!sanitized.contains("12345678"));

        let sanitized = sanitize("mrn 0042424242");
        assert!(sanitized.contains("[REDACTED-MRN]"));
    }

    #[test]
    fn test_sanitize_uuid_and_ssn() {
        let sanitized = sanitize("encounter 550e8400-e29b-41d4-a716-446655440000 ssn 123-45-6789");
        assert!(sanitized.contains("[REDACTED-UUID]"));
        assert!(sanitized.contains("[REDACTED-SSN]"));
        assert!(!sanitized.contains("550e8400"));
        assert!(!sanitized.contains("6789"));
    }

    #[test]
    fn test_sanitize_contact_details() {
        let sanitized = sanitize("Contact jane.doe@hospital.org or (555) 867-5309");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_sanitize_date_of_birth() {
        let sanitized = sanitize("DOB: 1994-03-17 parsed");
        assert!(sanitized.contains("[REDACTED-DOB]"));
        assert!(!sanitized.contains("1994"));
    }

    #[test]
    fn test_clinical_values_pass_through() {
        let line = "Scored pph_outcome: 0.7931 (high), estimated_blood_loss_ml=1200";
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("é".repeat(20).as_str(), 9);
        assert!(sanitized.ends_with(" [TRUNCATED]"));
        assert!(sanitized.starts_with("éééé"));
    }

    #[test]
    fn test_writer_sanitizes_each_line() {
        let mut sink = Vec::new();
        {
            let mut writer = SanitizingWriter {
                inner: &mut sink,
                buffer: Vec::new(),
            };
            writer.write_all(b"first MRN:1234567\nsecond ").expect("write");
            writer.write_all(b"line\n").expect("write");
        }
        let text = String::from_utf8(sink).expect("utf8");
        assert_eq!(text, "first [REDACTED-MRN]\nsecond line\n");
    }
}
