use std::error;
use std::fmt;
use std::io;
use std::result;
use std::str;

use laxcsv_core::InvalidDialect;

/// A type alias for `Result<T, laxcsv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing delimited data.
///
/// Structured variants carry the position information that was available
/// where the error arose: the physical line number for tokenizing
/// errors, the record ordinal and field name for binding errors.
#[derive(Debug)]
pub enum Error {
    /// The dialect or writer configuration is unusable. Raised at
    /// construction, never during processing.
    Config(InvalidDialect),
    /// An I/O error from the underlying character source or sink.
    Io(io::Error),
    /// The byte stream is not valid UTF-8.
    Utf8 {
        /// The physical line on which decoding failed, 1-based.
        line: u64,
        /// The underlying UTF-8 error.
        err: str::Utf8Error,
    },
    /// The input ended inside a quoted region.
    UnterminatedQuote {
        /// The last physical line read, 1-based.
        line: u64,
    },
    /// A quoted field spanned more physical lines than the configured
    /// cap allows. Almost always a stray quote rather than a legitimate
    /// record.
    RunawayQuotedField {
        /// The last physical line read, 1-based.
        line: u64,
        /// The configured cap.
        limit: u64,
    },
    /// A field value could not be converted to the declared target type.
    DataTypeMismatch {
        /// The source text that failed to convert.
        value: String,
        /// The name of the target type.
        target: String,
        /// The field the handler was bound to.
        field: String,
        /// The data-record ordinal, 1-based, when known.
        record: Option<u64>,
        /// The underlying conversion error, when one exists.
        cause: Option<Box<dyn error::Error + Send + Sync>>,
    },
    /// A field marked required held no value.
    RequiredFieldEmpty {
        /// The type being bound.
        tuple: &'static str,
        /// The field that was empty.
        field: String,
        /// The data-record ordinal, 1-based, when known.
        record: Option<u64>,
    },
    /// A custom converter rejected a value on domain grounds.
    ConstraintViolation {
        /// The field whose converter objected.
        field: String,
        /// The data-record ordinal, 1-based, when known.
        record: Option<u64>,
        /// The converter's explanation.
        message: String,
    },
    /// The schema descriptor could not access a declared slot.
    Introspection {
        /// The type being bound.
        tuple: &'static str,
        /// The slot that was not accessible.
        field: String,
        /// What went wrong.
        message: String,
    },
}

impl Error {
    /// Attach a data-record ordinal to a binding error that does not
    /// have one yet. Other variants pass through untouched.
    pub(crate) fn with_record(self, record: u64) -> Error {
        match self {
            Error::DataTypeMismatch {
                value,
                target,
                field,
                record: None,
                cause,
            } => Error::DataTypeMismatch {
                value,
                target,
                field,
                record: Some(record),
                cause,
            },
            Error::RequiredFieldEmpty { tuple, field, record: None } => {
                Error::RequiredFieldEmpty { tuple, field, record: Some(record) }
            }
            Error::ConstraintViolation { field, record: None, message } => {
                Error::ConstraintViolation {
                    field,
                    record: Some(record),
                    message,
                }
            }
            other => other,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<InvalidDialect> for Error {
    fn from(err: InvalidDialect) -> Error {
        Error::Config(err)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Config(ref err) => Some(err),
            Error::Io(ref err) => Some(err),
            Error::Utf8 { ref err, .. } => Some(err),
            Error::DataTypeMismatch { ref cause, .. } => {
                cause.as_ref().map(|c| &**c as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// Formats `record N: ` when an ordinal is known.
struct AtRecord(Option<u64>);

impl fmt::Display for AtRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "record {}: ", n),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Config(ref err) => {
                write!(f, "invalid CSV configuration: {}", err)
            }
            Error::Io(ref err) => err.fmt(f),
            Error::Utf8 { line, ref err } => {
                write!(f, "CSV parse error: line {}: {}", line, err)
            }
            Error::UnterminatedQuote { line } => write!(
                f,
                "CSV parse error: line {}: unterminated quoted field at \
                 end of input",
                line
            ),
            Error::RunawayQuotedField { line, limit } => write!(
                f,
                "CSV parse error: line {}: quoted field spans more than \
                 {} lines",
                line, limit
            ),
            Error::DataTypeMismatch {
                ref value,
                ref target,
                ref field,
                record,
                ref cause,
            } => {
                write!(
                    f,
                    "CSV bind error: {}field '{}': cannot convert {:?} \
                     to {}",
                    AtRecord(record),
                    field,
                    value,
                    target
                )?;
                if let Some(ref cause) = *cause {
                    write!(f, ": {}", cause)?;
                }
                Ok(())
            }
            Error::RequiredFieldEmpty { tuple, ref field, record } => write!(
                f,
                "CSV bind error: {}field '{}' of {} is required but no \
                 value was provided",
                AtRecord(record),
                field,
                tuple
            ),
            Error::ConstraintViolation { ref field, record, ref message } => {
                write!(
                    f,
                    "CSV bind error: {}field '{}': {}",
                    AtRecord(record),
                    field,
                    message
                )
            }
            Error::Introspection { tuple, ref field, ref message } => write!(
                f,
                "CSV bind error: cannot access slot '{}' of {}: {}",
                field, tuple, message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn with_record_fills_only_missing_ordinals() {
        let err = Error::RequiredFieldEmpty {
            tuple: "T",
            field: "x".to_string(),
            record: None,
        };
        match err.with_record(7) {
            Error::RequiredFieldEmpty { record, .. } => {
                assert_eq!(record, Some(7))
            }
            other => panic!("unexpected variant: {:?}", other),
        }

        let err = Error::UnterminatedQuote { line: 3 };
        match err.with_record(7) {
            Error::UnterminatedQuote { line } => assert_eq!(line, 3),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn display_mentions_positions() {
        let err = Error::RequiredFieldEmpty {
            tuple: "Person",
            field: "name".to_string(),
            record: Some(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("record 2"), "{}", msg);
        assert!(msg.contains("name"), "{}", msg);
        assert!(msg.contains("Person"), "{}", msg);
    }
}
