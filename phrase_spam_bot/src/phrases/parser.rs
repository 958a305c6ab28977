use std::io::{BufRead, Error, ErrorKind};

/// Reads phrase sources line by line.
///
/// A plain source has one phrase per line. A combined source has `language:phrase` lines.
/// Blank lines and lines starting with `#` are skipped in both.
#[derive(Debug)]
pub struct Parser<R> {
    reader: Option<R>,
    buffer: Vec<u8>,
    line_counter: usize,
    combined: bool,
}

impl<R: BufRead> Parser<R> {
    /// Parser for a source of a single language.
    pub fn plain(reader: R) -> Self {
        Self::new(reader, false)
    }

    /// Parser for a source with `language:phrase` lines.
    pub fn combined(reader: R) -> Self {
        Self::new(reader, true)
    }

    fn new(reader: R, combined: bool) -> Self {
        Self {
            reader: Some(reader),
            buffer: Vec::with_capacity(256),
            line_counter: 0,
            combined,
        }
    }

    /// Parse the next line.
    ///
    /// If [`None`] is returned, this means the source has ended.
    ///
    /// If `Some(Ok(None))` returned, this means that the line is empty or a comment.
    ///
    /// A line that isn't valid UTF-8 gives an error, and parsing can continue after it.
    /// A read error also gives an error, but ends the source.
    pub fn next_line(&mut self) -> Option<Result<Option<Line>, Error>> {
        let Some(reader) = &mut self.reader else {
            return None;
        };

        self.buffer.clear();
        let bytes_read = match reader.read_until(b'\n', &mut self.buffer) {
            Ok(b) => b,
            Err(e) => {
                // Don't get stuck re-reading a broken source forever.
                self.reader = None;
                return Some(Err(Error::new(
                    e.kind(),
                    format!(
                        "Read failed after line {}, skipping the rest: {}",
                        self.line_counter, e
                    ),
                )));
            }
        };

        if bytes_read == 0 {
            self.reader = None;
            return None;
        }

        self.line_counter += 1;

        let Ok(line) = std::str::from_utf8(&self.buffer) else {
            return Some(Err(Error::new(
                ErrorKind::InvalidData,
                format!("Line {} is not valid UTF-8", self.line_counter),
            )));
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Some(Ok(None));
        }

        if !self.combined {
            return Some(Ok(Some(Line {
                language: None,
                phrase: line.to_lowercase(),
            })));
        }

        let Some((language, phrase)) = line.split_once(':') else {
            return Some(Err(Error::new(
                ErrorKind::InvalidData,
                format!("No \"language:\" prefix in line {}: {}", self.line_counter, line),
            )));
        };

        let language = language.trim().to_lowercase();
        let phrase = phrase.trim().to_lowercase();

        if language.is_empty() || phrase.is_empty() {
            return Some(Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "Empty language or phrase in line {}: {}",
                    self.line_counter, line
                ),
            )));
        }

        Some(Ok(Some(Line {
            language: Some(language),
            phrase,
        })))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Only present in combined sources.
    pub language: Option<String>,
    pub phrase: String,
}
