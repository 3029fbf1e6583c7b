use std::error::Error;
use std::fmt;
use std::mem;

use crate::dialect::{Dialect, NullFieldPolicy};
use crate::record::Record;

/// A line ended inside a quoted region when no continuation was allowed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UnterminatedQuoteError(());

impl UnterminatedQuoteError {
    pub(crate) fn new() -> UnterminatedQuoteError {
        UnterminatedQuoteError(())
    }
}

impl fmt::Display for UnterminatedQuoteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unterminated quoted field at end of line")
    }
}

impl Error for UnterminatedQuoteError {}

/// Splits logical lines into field arrays.
///
/// Implemented by the permissive [`Tokenizer`] and the strict
/// [`StrictTokenizer`](crate::StrictTokenizer); record readers drive the
/// trait so a caller can substitute its own scanner.
pub trait Tokenize {
    /// Tokenize a line that is known to contain a whole record.
    ///
    /// Fails when the line ends inside a quoted region. Any carry-over
    /// from an earlier multi-line call is discarded first.
    fn tokenize_line(
        &mut self,
        line: &str,
    ) -> Result<Record, UnterminatedQuoteError>;

    /// Tokenize a line that may be continued by further lines.
    ///
    /// Returns the fields completed on this line, which may be none when
    /// the line opens (or continues) a quoted region. The open field is
    /// parked internally; feed the next line to resume it.
    fn tokenize_multi(
        &mut self,
        line: &str,
    ) -> Result<Record, UnterminatedQuoteError>;

    /// Whether a partial field is parked from a previous multi-line call.
    fn is_pending(&self) -> bool {
        false
    }

    /// Drain a parked partial field as a one-field record.
    ///
    /// This is the end-of-input behavior: with no more lines to feed, a
    /// carry-over becomes the sole field of a final record. Returns
    /// `None` when nothing was parked.
    fn finish(&mut self) -> Option<Record> {
        None
    }
}

/// The permissive field tokenizer.
///
/// This scanner has grown to accept most of the malformed CSV seen in the
/// wild rather than reject it: quotes may appear in the middle of
/// unquoted fields, escapes work inside and outside quotes, and quoted
/// fields may span lines. Use
/// [`StrictTokenizer`](crate::StrictTokenizer) for input known to follow
/// RFC 4180.
///
/// # Example
///
/// ```
/// use laxcsv_core::{Dialect, Tokenize, Tokenizer};
///
/// let mut tok = Tokenizer::new(Dialect::default());
/// let record = tok.tokenize_line("a,\"b,b\",c").unwrap();
/// assert_eq!(record, vec!["a", "b,b", "c"]);
/// ```
#[derive(Clone, Debug)]
pub struct Tokenizer {
    dialect: Dialect,
    /// Carry-over of a quoted field that spans lines. Owned exclusively
    /// by the tokenizer; callers observe it through `is_pending` only.
    pending: Option<String>,
    /// Whether the current field has already received data characters.
    /// Survives across lines of one record.
    in_field: bool,
}

impl Tokenizer {
    /// Create a tokenizer for the given dialect.
    pub fn new(dialect: Dialect) -> Tokenizer {
        Tokenizer { dialect, pending: None, in_field: false }
    }

    /// The dialect this tokenizer was built with.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    fn tokenize(
        &mut self,
        line: &str,
        multi: bool,
    ) -> Result<Record, UnterminatedQuoteError> {
        // A single-line call means the caller gave up on any record in
        // flight, so the carry-over is dropped.
        if !multi && self.pending.is_some() {
            self.pending = None;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut fields = Record::new();
        let mut buf = String::with_capacity(line.len() + 16);
        let mut in_quotes = false;
        let mut from_quoted = false;
        if let Some(pending) = self.pending.take() {
            buf.push_str(&pending);
            in_quotes = !self.dialect.ignore_quotations();
        }

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if Some(c) == self.dialect.escape() {
                if self.quoted_context(in_quotes)
                    && i + 1 < chars.len()
                    && self.escapable(chars[i + 1])
                {
                    buf.push(chars[i + 1]);
                    i += 1;
                }
                // Otherwise the escape is dropped silently.
            } else if Some(c) == self.dialect.quote() {
                if self.quoted_context(in_quotes)
                    && i + 1 < chars.len()
                    && Some(chars[i + 1]) == self.dialect.quote()
                {
                    // A doubled quote is one literal quote.
                    buf.push(chars[i + 1]);
                    i += 1;
                } else {
                    in_quotes = !in_quotes;
                    if buf.is_empty() {
                        from_quoted = true;
                    }
                    // The tricky case of a quote embedded in the middle
                    // of a field: a,bc"d"ef,g parses as one field
                    // bc"d"ef. The quote is kept as data when it is past
                    // the start of the line and flanked by non-separator
                    // characters.
                    if !self.dialect.strict_quotes()
                        && i > 2
                        && chars[i - 1] != self.dialect.separator()
                        && chars.len() > i + 1
                        && chars[i + 1] != self.dialect.separator()
                    {
                        if self.dialect.ignore_leading_whitespace()
                            && !buf.is_empty()
                            && buf.chars().all(char::is_whitespace)
                        {
                            buf.clear();
                        } else {
                            buf.push(c);
                        }
                    }
                }
                self.in_field = !self.in_field;
            } else if c == self.dialect.separator()
                && !(in_quotes && !self.dialect.ignore_quotations())
            {
                fields.push(self.null_policy(mem::take(&mut buf), from_quoted));
                from_quoted = false;
                self.in_field = false;
            } else if !self.dialect.strict_quotes()
                || (in_quotes && !self.dialect.ignore_quotations())
            {
                buf.push(c);
                self.in_field = true;
                from_quoted = true;
            }
            i += 1;
        }

        if in_quotes && !self.dialect.ignore_quotations() {
            if !multi {
                return Err(UnterminatedQuoteError::new());
            }
            // Continuing a quoted region: restore the line break the
            // line source removed and park the partial field.
            buf.push('\n');
            self.pending = Some(buf);
        } else {
            self.in_field = false;
            fields.push(self.null_policy(buf, from_quoted));
        }
        Ok(fields)
    }

    /// Whether escapes and doubled quotes are interpreted here: inside a
    /// quoted region, or anywhere within a field that already has data.
    fn quoted_context(&self, in_quotes: bool) -> bool {
        (in_quotes && !self.dialect.ignore_quotations()) || self.in_field
    }

    fn escapable(&self, c: char) -> bool {
        Some(c) == self.dialect.quote() || Some(c) == self.dialect.escape()
    }

    fn null_policy(&self, field: String, from_quoted: bool) -> Option<String> {
        let absent = field.is_empty()
            && match self.dialect.null_field_policy() {
                NullFieldPolicy::Both => true,
                NullFieldPolicy::EmptySeparators => !from_quoted,
                NullFieldPolicy::EmptyQuotes => from_quoted,
                NullFieldPolicy::Neither => false,
            };
        if absent {
            None
        } else {
            Some(field)
        }
    }
}

impl Tokenize for Tokenizer {
    fn tokenize_line(
        &mut self,
        line: &str,
    ) -> Result<Record, UnterminatedQuoteError> {
        self.tokenize(line, false)
    }

    fn tokenize_multi(
        &mut self,
        line: &str,
    ) -> Result<Record, UnterminatedQuoteError> {
        self.tokenize(line, true)
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn finish(&mut self) -> Option<Record> {
        self.pending.take().map(|s| Record::from(vec![Some(s)]))
    }
}
