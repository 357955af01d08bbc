use std::io::{self, Write};
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ConsoleCounts, LineKind, LineTags};

static ERROR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Ee]rror[:\s].*$").expect("error pattern is valid"));
static WARNING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*[Ww]arning:\s.*$").expect("warning pattern is valid"));

/// Classify one line of Doxygen output, terminator already removed.
pub fn classify(line: &str) -> LineTags {
    LineTags {
        error: ERROR_LINE.is_match(line),
        warning: WARNING_LINE.is_match(line),
    }
}

/// How matched lines are marked in the forwarded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteStyle {
    /// Write `ESC[8m` `doxygen:<tag>` `ESC[0m` ahead of the line. Terminals
    /// hide it; log renderers can pick it up for highlighting.
    #[default]
    Concealed,
    /// Forward lines only.
    Off,
}

/// Line-transforming writer over Doxygen's standard output.
///
/// Bytes written are split into lines, each line is classified and forwarded
/// to the inner sink unchanged, terminator included. Error and warning totals
/// accumulate for the lifetime of the parser.
#[derive(Debug)]
pub struct ConsoleParser<W: Write> {
    out: W,
    notes: NoteStyle,
    pending: Vec<u8>,
    counts: ConsoleCounts,
}

impl<W: Write> ConsoleParser<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            notes: NoteStyle::default(),
            pending: Vec::new(),
            counts: ConsoleCounts::default(),
        }
    }

    pub fn notes(mut self, notes: NoteStyle) -> Self {
        self.notes = notes;
        self
    }

    pub fn error_count(&self) -> usize {
        self.counts.errors
    }

    pub fn warning_count(&self) -> usize {
        self.counts.warnings
    }

    pub fn counts(&self) -> ConsoleCounts {
        self.counts
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Classify and forward one complete line, terminator included if present.
    pub fn on_line(&mut self, line: &[u8]) -> io::Result<LineTags> {
        let text = String::from_utf8_lossy(trim_eol(line));
        let tags = classify(&text);

        for kind in tags.kinds() {
            match kind {
                LineKind::Error => self.counts.errors += 1,
                LineKind::Warning => self.counts.warnings += 1,
                LineKind::Normal => {}
            }
            self.write_note(kind)?;
        }

        self.out.write_all(line)?;
        Ok(tags)
    }

    /// Forward any trailing line that never saw a terminator, then hand back
    /// the sink with the final totals.
    pub fn finish(mut self) -> io::Result<(W, ConsoleCounts)> {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.on_line(&line)?;
        }
        self.out.flush()?;
        Ok((self.out, self.counts))
    }

    fn write_note(&mut self, kind: LineKind) -> io::Result<()> {
        match self.notes {
            NoteStyle::Concealed => write!(self.out, "\x1b[8mdoxygen:{}\x1b[0m", kind.as_str()),
            NoteStyle::Off => Ok(()),
        }
    }
}

impl<W: Write> Write for ConsoleParser<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut rest = buf;
        while let Some(pos) = rest.iter().position(|byte| *byte == b'\n') {
            let (head, tail) = rest.split_at(pos + 1);
            if self.pending.is_empty() {
                self.on_line(head)?;
            } else {
                self.pending.extend_from_slice(head);
                let line = std::mem::take(&mut self.pending);
                self.on_line(&line)?;
            }
            rest = tail;
        }
        self.pending.extend_from_slice(rest);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn trim_eol(mut line: &[u8]) -> &[u8] {
    while let [head @ .., b'\n' | b'\r'] = line {
        line = head;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_error_lines() {
        assert!(classify("Error: something broke").error);
        assert!(classify("error: lowercase too").error);
        assert!(classify("Error something without colon").error);
        assert!(!classify("ERROR: shouting is not matched").error);
        assert!(!classify("  Error: indented").error);
        assert!(!classify("Errors: plural").error);
    }

    #[test]
    fn classifies_warning_lines() {
        assert!(classify("file.h:10: warning: unused variable").warning);
        assert!(classify("Warning: at start").warning);
        assert!(!classify("warning without colon").warning);
        assert!(!classify("file.h:10: warning:nospace").warning);
    }

    #[test]
    fn a_line_can_be_both() {
        let tags = classify("error: a warning: inside");
        assert!(tags.error);
        assert!(tags.warning);
    }

    #[test]
    fn normal_lines_are_untagged() {
        assert!(classify("Generating docs for compound Foo...").is_normal());
        assert!(classify("").is_normal());
    }

    #[test]
    fn trims_any_trailing_terminators() {
        assert_eq!(trim_eol(b"abc\r\n"), b"abc");
        assert_eq!(trim_eol(b"abc\n"), b"abc");
        assert_eq!(trim_eol(b"abc"), b"abc");
        assert_eq!(trim_eol(b"\r\n"), b"");
    }

    #[test]
    fn error_line_is_counted_and_forwarded_verbatim() {
        let mut parser = ConsoleParser::new(Vec::new()).notes(NoteStyle::Off);
        parser
            .write_all(b"Error: something broke\n")
            .expect("write should succeed");
        let (out, counts) = parser.finish().expect("finish should succeed");

        assert_eq!(counts, ConsoleCounts { errors: 1, warnings: 0 });
        assert_eq!(out, b"Error: something broke\n");
    }

    #[test]
    fn concealed_note_precedes_line() {
        let mut parser = ConsoleParser::new(Vec::new());
        parser
            .on_line(b"a.h:1: warning: x\r\n")
            .expect("line should forward");

        assert_eq!(parser.warning_count(), 1);
        assert_eq!(
            parser.get_mut().as_slice(),
            b"\x1b[8mdoxygen:warning\x1b[0ma.h:1: warning: x\r\n"
        );
    }

    #[test]
    fn invalid_utf8_is_forwarded_untouched() {
        let mut parser = ConsoleParser::new(Vec::new()).notes(NoteStyle::Off);
        let line = b"warning: caf\xe9 \n";
        parser.write_all(line).expect("write should succeed");
        let (out, counts) = parser.finish().expect("finish should succeed");

        assert_eq!(counts.warnings, 1);
        assert_eq!(out, line);
    }
}
