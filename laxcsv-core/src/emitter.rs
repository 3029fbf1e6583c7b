use std::error::Error;
use std::fmt;

/// The quoting style to use when emitting fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuoteStyle {
    /// This puts quotes around every field. Always.
    Always,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when fields contain a quote, separator, escape
    /// or line break.
    ///
    /// This is the default.
    Necessary,
    /// This *never* writes quotes.
    ///
    /// If a field requires quotes, emitting it is an error.
    Never,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// A field needed quoting, but the configuration forbids it.
///
/// Raised either under [`QuoteStyle::Never`] or when no quote character
/// is configured at all.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuoteRequiredError {
    field: String,
}

impl QuoteRequiredError {
    fn new(field: &str) -> QuoteRequiredError {
        QuoteRequiredError { field: field.to_string() }
    }

    /// The offending field.
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for QuoteRequiredError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "field requires quotes, but quoting is disabled: {:?}",
            self.field
        )
    }
}

impl Error for QuoteRequiredError {}

/// The string-level inverse of the tokenizers.
///
/// An emitter turns one field into its delimited representation,
/// appending to a caller-owned buffer. It knows nothing about I/O, line
/// endings or absent fields; the `laxcsv` writer layers those on top.
///
/// # Example
///
/// ```
/// use laxcsv_core::{Emitter, QuoteStyle};
///
/// let emitter = Emitter::new(',', Some('"'), None, QuoteStyle::Necessary);
/// let mut line = String::new();
/// emitter.emit_field("say \"hi\"", &mut line).unwrap();
/// assert_eq!(line, "\"say \"\"hi\"\"\"");
/// ```
#[derive(Clone, Debug)]
pub struct Emitter {
    separator: char,
    quote: Option<char>,
    escape: Option<char>,
    style: QuoteStyle,
}

impl Emitter {
    /// Create an emitter.
    ///
    /// With an escape character configured, interior quotes and escapes
    /// are escaped with it; without one, interior quotes are doubled.
    pub fn new(
        separator: char,
        quote: Option<char>,
        escape: Option<char>,
        style: QuoteStyle,
    ) -> Emitter {
        Emitter { separator, quote, escape, style }
    }

    /// Append the delimited representation of `field` to `out`.
    pub fn emit_field(
        &self,
        field: &str,
        out: &mut String,
    ) -> Result<(), QuoteRequiredError> {
        let needs = self.needs_quotes(field);
        let quote = match self.style {
            QuoteStyle::Never => None,
            _ => self.quote,
        };
        match quote {
            None if needs => Err(QuoteRequiredError::new(field)),
            None => {
                out.push_str(field);
                Ok(())
            }
            Some(q) if needs || self.style == QuoteStyle::Always => {
                self.push_quoted(field, q, out);
                Ok(())
            }
            Some(_) => {
                out.push_str(field);
                Ok(())
            }
        }
    }

    /// Whether the field cannot survive a round trip unquoted.
    fn needs_quotes(&self, field: &str) -> bool {
        field.chars().any(|c| {
            c == self.separator
                || Some(c) == self.quote
                || Some(c) == self.escape
                || c == '\r'
                || c == '\n'
        })
    }

    fn push_quoted(&self, field: &str, quote: char, out: &mut String) {
        out.push(quote);
        for c in field.chars() {
            if c == quote {
                match self.escape {
                    Some(e) => {
                        out.push(e);
                        out.push(c);
                    }
                    None => {
                        out.push(c);
                        out.push(c);
                    }
                }
            } else if Some(c) == self.escape {
                // The escape character escapes itself so the tokenizer
                // does not eat it.
                out.push(c);
                out.push(c);
            } else {
                out.push(c);
            }
        }
        out.push(quote);
    }
}
