use std::io::{self, BufRead};
use std::str;

/// Why a line could not be produced.
#[derive(Debug)]
pub(crate) enum LineReadError {
    Io(io::Error),
    Utf8(str::Utf8Error),
}

/// A source of logical lines over any `BufRead`.
///
/// A line terminates on LF, CRLF or end of stream. In the default
/// strip-CR mode, a trailing CR is removed and a lone CR also terminates
/// the line; in keep-CR mode only LF terminates and any CR stays in the
/// data. End of stream after at least one character yields one final
/// line; end of stream on an empty buffer yields `None`.
///
/// # Example
///
/// ```
/// use laxcsv::LineReader;
///
/// let mut lines = LineReader::new("one\r\ntwo\rthree".as_bytes(), false);
/// assert_eq!(lines.read_line().unwrap(), Some("one".to_string()));
/// assert_eq!(lines.read_line().unwrap(), Some("two".to_string()));
/// assert_eq!(lines.read_line().unwrap(), Some("three".to_string()));
/// assert_eq!(lines.read_line().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct LineReader<B> {
    rdr: B,
    keep_cr: bool,
}

enum Terminator {
    Eof,
    Lf,
    Cr,
    None,
}

impl<B: BufRead> LineReader<B> {
    /// Create a line reader. With `keep_cr` set, carriage returns are
    /// data rather than line terminators.
    pub fn new(rdr: B, keep_cr: bool) -> LineReader<B> {
        LineReader { rdr, keep_cr }
    }

    /// Read the next logical line, without its terminator.
    ///
    /// Returns `Ok(None)` at end of stream; an empty line comes back as
    /// `Ok(Some(""))`, so the two are never confused.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.read_line_impl() {
            Ok(v) => Ok(v),
            Err(LineReadError::Io(err)) => Err(err),
            Err(LineReadError::Utf8(err)) => {
                Err(io::Error::new(io::ErrorKind::InvalidData, err))
            }
        }
    }

    pub(crate) fn read_line_impl(
        &mut self,
    ) -> Result<Option<String>, LineReadError> {
        let keep_cr = self.keep_cr;
        let mut out: Vec<u8> = Vec::new();
        loop {
            let (term, used) = {
                let buf =
                    self.rdr.fill_buf().map_err(LineReadError::Io)?;
                let terminator = buf
                    .iter()
                    .position(|&b| b == b'\n' || (!keep_cr && b == b'\r'));
                if buf.is_empty() {
                    (Terminator::Eof, 0)
                } else if let Some(pos) = terminator {
                    out.extend_from_slice(&buf[..pos]);
                    let term = if buf[pos] == b'\r' {
                        Terminator::Cr
                    } else {
                        Terminator::Lf
                    };
                    (term, pos + 1)
                } else {
                    out.extend_from_slice(buf);
                    (Terminator::None, buf.len())
                }
            };
            self.rdr.consume(used);
            match term {
                Terminator::Eof => {
                    return if out.is_empty() {
                        Ok(None)
                    } else {
                        into_line(out).map(Some)
                    };
                }
                Terminator::Lf => return into_line(out).map(Some),
                Terminator::Cr => {
                    // CRLF is a single terminator, and the LF may sit in
                    // the next buffered chunk.
                    let lf_follows = {
                        let buf = self
                            .rdr
                            .fill_buf()
                            .map_err(LineReadError::Io)?;
                        buf.first() == Some(&b'\n')
                    };
                    if lf_follows {
                        self.rdr.consume(1);
                    }
                    return into_line(out).map(Some);
                }
                Terminator::None => {}
            }
        }
    }

    /// Whether the underlying stream has no more data to give.
    ///
    /// Peeks without consuming. An I/O failure during the peek reports
    /// the stream as closed.
    pub fn is_closed(&mut self) -> bool {
        match self.rdr.fill_buf() {
            Ok(buf) => buf.is_empty(),
            Err(_) => true,
        }
    }
}

fn into_line(bytes: Vec<u8>) -> Result<String, LineReadError> {
    String::from_utf8(bytes)
        .map_err(|err| LineReadError::Utf8(err.utf8_error()))
}
