use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use laxcsv_core::{Dialect, Emitter, QuoteRequiredError, QuoteStyle, Record};

use crate::error::{Error, Result};

/// Builds a CSV writer with various configuration knobs.
///
/// The separator, quote and escape characters obey the same
/// distinctness rules as a reader dialect, so building can fail.
///
/// # Example
///
/// ```
/// use laxcsv::{QuoteStyle, WriterBuilder};
///
/// let mut wtr = WriterBuilder::new()
///     .quote_style(QuoteStyle::Always)
///     .from_writer(vec![])
///     .unwrap();
/// wtr.write_fields(vec!["a", "b"]).unwrap();
/// assert_eq!(wtr.into_inner().unwrap(), b"\"a\",\"b\"\n");
/// ```
#[derive(Debug)]
pub struct WriterBuilder {
    separator: char,
    quote: Option<char>,
    escape: Option<char>,
    style: QuoteStyle,
    line_end: String,
    null_token: String,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder {
            separator: ',',
            quote: Some('"'),
            escape: None,
            style: QuoteStyle::default(),
            line_end: "\n".to_string(),
            null_token: String::new(),
        }
    }
}

impl WriterBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Copy the separator, quote and escape characters from a reader
    /// dialect, so output round-trips through that dialect.
    pub fn dialect(&mut self, dialect: &Dialect) -> &mut WriterBuilder {
        self.separator = dialect.separator();
        self.quote = dialect.quote();
        self.escape = dialect.escape();
        self
    }

    /// The field delimiter to use. The default is `,`.
    pub fn separator(&mut self, separator: char) -> &mut WriterBuilder {
        self.separator = separator;
        self
    }

    /// The quote character, or `None` to disable quoting entirely.
    /// The default is `"`.
    pub fn quote(&mut self, quote: Option<char>) -> &mut WriterBuilder {
        self.quote = quote;
        self
    }

    /// The escape character used for interior quotes.
    ///
    /// When unset (the default), interior quotes are doubled instead.
    pub fn escape(&mut self, escape: Option<char>) -> &mut WriterBuilder {
        self.escape = escape;
        self
    }

    /// When to put quotes around fields. The default is
    /// [`QuoteStyle::Necessary`].
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.style = style;
        self
    }

    /// The line ending appended after each record. The default is `\n`.
    pub fn line_end(&mut self, line_end: &str) -> &mut WriterBuilder {
        self.line_end = line_end.to_string();
        self
    }

    /// The literal token written for an absent field. The default is
    /// the empty string.
    pub fn null_token(&mut self, token: &str) -> &mut WriterBuilder {
        self.null_token = token.to_string();
        self
    }

    /// Build a writer from this configuration and an underlying writer.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Result<Writer<W>> {
        Dialect::validate(self.separator, self.quote, self.escape)?;
        Ok(Writer {
            wtr: BufWriter::new(wtr),
            emitter: Emitter::new(
                self.separator,
                self.quote,
                self.escape,
                self.style,
            ),
            separator: self.separator,
            line_end: self.line_end.clone(),
            null_token: self.null_token.clone(),
        })
    }

    /// Build a writer from this configuration and a file path.
    ///
    /// The file is created if it does not exist and truncated otherwise.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        self.from_writer(File::create(path)?)
    }
}

/// A CSV record writer.
///
/// Produces one delimited line per record, quoting and escaping fields
/// so that output round-trips through a reader with a matching dialect.
/// The underlying writer is buffered; call [`Writer::flush`] (or drop
/// the writer) to push everything out.
///
/// # Example
///
/// ```
/// use laxcsv::Writer;
///
/// let mut wtr = Writer::from_writer(vec![]);
/// wtr.write_fields(vec!["a", "b,with,commas"]).unwrap();
/// assert_eq!(wtr.into_inner().unwrap(), b"a,\"b,with,commas\"\n");
/// ```
pub struct Writer<W: io::Write> {
    wtr: BufWriter<W>,
    emitter: Emitter,
    separator: char,
    line_end: String,
    null_token: String,
}

impl<W: io::Write> Writer<W> {
    /// Create a writer with the default configuration.
    pub fn from_writer(wtr: W) -> Writer<W> {
        Writer {
            wtr: BufWriter::new(wtr),
            emitter: Emitter::new(',', Some('"'), None, QuoteStyle::default()),
            separator: ',',
            line_end: "\n".to_string(),
            null_token: String::new(),
        }
    }

    /// Write one record, absent fields rendered as the null token.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let mut line = String::new();
        for (i, field) in record.iter().enumerate() {
            if i > 0 {
                line.push(self.separator);
            }
            match field {
                None => line.push_str(&self.null_token),
                Some(field) => self
                    .emitter
                    .emit_field(field, &mut line)
                    .map_err(quote_required)?,
            }
        }
        line.push_str(&self.line_end);
        self.wtr.write_all(line.as_bytes()).map_err(Error::Io)
    }

    /// Write one record given as any collection of strings.
    pub fn write_fields<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                line.push(self.separator);
            }
            self.emitter
                .emit_field(field.as_ref(), &mut line)
                .map_err(quote_required)?;
        }
        line.push_str(&self.line_end);
        self.wtr.write_all(line.as_bytes()).map_err(Error::Io)
    }

    /// Write a batch of records.
    pub fn write_all_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush().map_err(Error::Io)
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.wtr.into_inner().map_err(|err| Error::Io(err.into_error()))
    }
}

fn quote_required(err: QuoteRequiredError) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::InvalidInput, err))
}
