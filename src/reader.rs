use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use log::{debug, trace};

use laxcsv_core::{
    Dialect, DialectBuilder, NullFieldPolicy, Record, StrictTokenizer,
    Tokenize, Tokenizer,
};

use crate::error::{Error, Result};
use crate::line_reader::{LineReadError, LineReader};

/// Builds a CSV reader with various configuration knobs.
///
/// Dialect options are forwarded to an underlying
/// [`DialectBuilder`](crate::DialectBuilder), so building can fail when
/// the configured characters clash.
///
/// # Example
///
/// ```
/// use laxcsv::ReaderBuilder;
///
/// let mut rdr = ReaderBuilder::new()
///     .separator(';')
///     .skip_lines(1)
///     .from_reader("prelude\na;b\n".as_bytes())
///     .unwrap();
/// let record = rdr.read_next().unwrap().unwrap();
/// assert_eq!(record, vec!["a", "b"]);
/// ```
#[derive(Debug)]
pub struct ReaderBuilder {
    dialect: DialectBuilder,
    strict_4180: bool,
    skip_lines: u64,
    keep_cr: bool,
    verify: bool,
    max_record_lines: u64,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder {
            dialect: DialectBuilder::new(),
            strict_4180: false,
            skip_lines: 0,
            keep_cr: false,
            verify: true,
            max_record_lines: 10_000,
        }
    }
}

impl ReaderBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// The field delimiter to use. The default is `,`.
    pub fn separator(&mut self, separator: char) -> &mut ReaderBuilder {
        self.dialect.separator(separator);
        self
    }

    /// The quote character, or `None` to disable quoting. The default
    /// is `"`.
    pub fn quote(&mut self, quote: Option<char>) -> &mut ReaderBuilder {
        self.dialect.quote(quote);
        self
    }

    /// The escape character, or `None` to disable escaping. The default
    /// is `\`.
    pub fn escape(&mut self, escape: Option<char>) -> &mut ReaderBuilder {
        self.dialect.escape(escape);
        self
    }

    /// Discard characters outside quoted regions. Disabled by default.
    pub fn strict_quotes(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.dialect.strict_quotes(yes);
        self
    }

    /// Drop whitespace leading up to a quote. Enabled by default.
    pub fn ignore_leading_whitespace(
        &mut self,
        yes: bool,
    ) -> &mut ReaderBuilder {
        self.dialect.ignore_leading_whitespace(yes);
        self
    }

    /// Treat the quote character as ordinary data. Disabled by default.
    pub fn ignore_quotations(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.dialect.ignore_quotations(yes);
        self
    }

    /// Which empty-field shapes read back as absent. The default is
    /// [`NullFieldPolicy::Neither`].
    pub fn null_field_policy(
        &mut self,
        policy: NullFieldPolicy,
    ) -> &mut ReaderBuilder {
        self.dialect.null_field_policy(policy);
        self
    }

    /// Use the strict RFC 4180 tokenizer instead of the permissive one.
    ///
    /// Only the separator and quote settings apply to it, and quoted
    /// fields cannot span lines. Disabled by default.
    pub fn strict_4180(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.strict_4180 = yes;
        self
    }

    /// The number of prelude lines to discard before the first record.
    /// The default is 0.
    pub fn skip_lines(&mut self, lines: u64) -> &mut ReaderBuilder {
        self.skip_lines = lines;
        self
    }

    /// Keep carriage returns as data instead of treating them as line
    /// terminators. Disabled by default.
    pub fn keep_cr(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.keep_cr = yes;
        self
    }

    /// Probe the source for end-of-stream before each read.
    ///
    /// Disable this for sources that cannot be peeked without blocking.
    /// Enabled by default.
    pub fn verify_reader(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.verify = yes;
        self
    }

    /// The most physical lines one record may span before reading fails
    /// with [`Error::RunawayQuotedField`]. The default is 10 000.
    pub fn max_record_lines(&mut self, lines: u64) -> &mut ReaderBuilder {
        self.max_record_lines = lines;
        self
    }

    /// Build a reader from this configuration and an underlying reader.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Result<Reader<R>> {
        let dialect = self.dialect.build()?;
        let tokenizer: Box<dyn Tokenize> = if self.strict_4180 {
            Box::new(StrictTokenizer::new(&dialect))
        } else {
            Box::new(Tokenizer::new(dialect))
        };
        Ok(Reader::make(self, tokenizer, rdr))
    }

    /// Build a reader from this configuration and a file path.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<File>> {
        self.from_reader(File::open(path)?)
    }

    /// Build a reader that drives a caller-supplied tokenizer, for
    /// dialects this crate does not know about.
    pub fn from_reader_with_tokenizer<R: io::Read, T>(
        &self,
        tokenizer: T,
        rdr: R,
    ) -> Reader<R>
    where
        T: Tokenize + 'static,
    {
        Reader::make(self, Box::new(tokenizer), rdr)
    }
}

/// A CSV record reader.
///
/// The reader pulls logical lines from its source, feeds them to the
/// configured tokenizer, and assembles complete records, stitching
/// together quoted fields that span lines. Records are produced in
/// input order.
///
/// A reader is single-owner state; to read in parallel, give each thread
/// its own reader.
///
/// # Example
///
/// ```
/// use laxcsv::Reader;
///
/// let data = "a,b\n\"multi\nline\",d\n";
/// let mut rdr = Reader::from_reader(data.as_bytes());
/// assert_eq!(rdr.read_next().unwrap().unwrap(), vec!["a", "b"]);
/// assert_eq!(rdr.read_next().unwrap().unwrap(), vec!["multi\nline", "d"]);
/// assert!(rdr.read_next().unwrap().is_none());
/// ```
pub struct Reader<R> {
    line_reader: LineReader<BufReader<R>>,
    tokenizer: Box<dyn Tokenize>,
    skip_lines: u64,
    lines_skipped: bool,
    has_next: bool,
    verify: bool,
    max_record_lines: u64,
    lines_read: u64,
    records_read: u64,
}

impl<R: io::Read> Reader<R> {
    /// Create a reader with the default dialect.
    pub fn from_reader(rdr: R) -> Reader<R> {
        let builder = ReaderBuilder::new();
        let tokenizer = Box::new(Tokenizer::new(Dialect::default()));
        Reader::make(&builder, tokenizer, rdr)
    }

    fn make(
        builder: &ReaderBuilder,
        tokenizer: Box<dyn Tokenize>,
        rdr: R,
    ) -> Reader<R> {
        Reader {
            line_reader: LineReader::new(
                BufReader::new(rdr),
                builder.keep_cr,
            ),
            tokenizer,
            skip_lines: builder.skip_lines,
            lines_skipped: false,
            has_next: true,
            verify: builder.verify,
            max_record_lines: builder.max_record_lines,
            lines_read: 0,
            records_read: 0,
        }
    }
}

impl Reader<File> {
    /// Create a reader with the default dialect for the file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        Ok(Reader::from_reader(File::open(path)?))
    }
}

impl<R: io::Read> Reader<R> {
    /// Read the next record, stitching multi-line fields together.
    ///
    /// Returns `Ok(None)` at end of stream. End of stream in the middle
    /// of a quoted field fails with [`Error::UnterminatedQuote`].
    pub fn read_next(&mut self) -> Result<Option<Record>> {
        let mut result: Option<Record> = None;
        let mut record_lines: u64 = 0;
        loop {
            let line = match self.next_line()? {
                None => {
                    if self.tokenizer.is_pending() {
                        return Err(Error::UnterminatedQuote {
                            line: self.lines_read,
                        });
                    }
                    return Ok(self.finish_record(result));
                }
                Some(line) => line,
            };
            record_lines += 1;
            if record_lines > self.max_record_lines {
                return Err(Error::RunawayQuotedField {
                    line: self.lines_read,
                    limit: self.max_record_lines,
                });
            }
            let fields =
                self.tokenizer.tokenize_multi(&line).map_err(|_| {
                    Error::UnterminatedQuote { line: self.lines_read }
                })?;
            if !fields.is_empty() {
                match result {
                    None => result = Some(fields),
                    Some(ref mut rec) => rec.extend_from(fields),
                }
            }
            if !self.tokenizer.is_pending() {
                break;
            }
            trace!(
                "quoted field continues past line {}",
                self.lines_read
            );
        }
        Ok(self.finish_record(result))
    }

    /// Read every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut all = Vec::new();
        while self.has_next {
            if let Some(record) = self.read_next()? {
                all.push(record);
            }
        }
        Ok(all)
    }

    /// An iterator over the remaining records.
    ///
    /// The iterator stops after the first error.
    pub fn records(&mut self) -> Records<R> {
        Records { rdr: self, done: false }
    }

    /// The number of physical lines consumed so far, including skipped
    /// prelude lines and every line of multi-line records.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// The number of records returned so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Whether the reader may still produce records.
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    fn finish_record(&mut self, result: Option<Record>) -> Option<Record> {
        if result.is_some() {
            self.records_read += 1;
        }
        result
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if !self.has_next {
            return Ok(None);
        }
        if self.verify && self.line_reader.is_closed() {
            self.has_next = false;
            return Ok(None);
        }
        if !self.lines_skipped {
            for _ in 0..self.skip_lines {
                let _ = self.read_raw_line()?;
                self.lines_read += 1;
            }
            self.lines_skipped = true;
            if self.skip_lines > 0 {
                debug!("skipped {} prelude line(s)", self.skip_lines);
            }
        }
        match self.read_raw_line()? {
            None => {
                self.has_next = false;
                Ok(None)
            }
            Some(line) => {
                self.lines_read += 1;
                Ok(Some(line))
            }
        }
    }

    fn read_raw_line(&mut self) -> Result<Option<String>> {
        match self.line_reader.read_line_impl() {
            Ok(line) => Ok(line),
            Err(LineReadError::Io(err)) => Err(Error::Io(err)),
            Err(LineReadError::Utf8(err)) => {
                Err(Error::Utf8 { line: self.lines_read + 1, err })
            }
        }
    }
}

/// An iterator over the records of a [`Reader`].
pub struct Records<'r, R> {
    rdr: &'r mut Reader<R>,
    done: bool,
}

impl<'r, R: io::Read> Iterator for Records<'r, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if self.done {
            return None;
        }
        match self.rdr.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
