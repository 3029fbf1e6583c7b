use std::io;
use std::marker::PhantomData;
use std::mem;

use log::debug;

use laxcsv_core::Record;

use crate::error::{Error, Result};
use crate::reader::Reader;

use super::handler::Converters;
use super::mapping::Mapping;
use super::schema::Tuple;

/// Reads typed tuples out of a CSV reader.
///
/// Each record is converted column by column through the mapping's field
/// handlers. By default the first failure surfaces immediately with the
/// record ordinal attached; with [`TupleReader::fail_fast`] disabled,
/// failed records are skipped, their errors are captured, and processing
/// continues. Captured errors are handed over (and cleared) by
/// [`TupleReader::take_captured_errors`].
pub struct TupleReader<T, M, R> {
    reader: Reader<R>,
    mapping: M,
    converters: Converters,
    fail_fast: bool,
    captured: Vec<Error>,
    header_read: bool,
    record: u64,
    _tuple: PhantomData<T>,
}

impl<T, M, R> TupleReader<T, M, R>
where
    T: Tuple,
    M: Mapping<T>,
    R: io::Read,
{
    /// Bind `reader` through `mapping`.
    pub fn new(reader: Reader<R>, mapping: M) -> TupleReader<T, M, R> {
        TupleReader {
            reader,
            mapping,
            converters: Converters::new(),
            fail_fast: true,
            captured: Vec::new(),
            header_read: false,
            record: 0,
            _tuple: PhantomData,
        }
    }

    /// Supply custom converters for fields whose specs name one.
    pub fn converters(mut self, converters: Converters) -> TupleReader<T, M, R> {
        self.converters = converters;
        self
    }

    /// Whether the first conversion failure aborts the read.
    ///
    /// Enabled by default. When disabled, failed records are skipped and
    /// their errors captured for [`TupleReader::take_captured_errors`].
    /// Tokenizing and I/O errors always abort.
    pub fn fail_fast(mut self, yes: bool) -> TupleReader<T, M, R> {
        self.fail_fast = yes;
        self
    }

    /// Read and convert the next record.
    pub fn read_next(&mut self) -> Result<Option<T>> {
        if !self.header_read {
            self.mapping.capture_header(&mut self.reader)?;
            self.header_read = true;
        }
        loop {
            let record = match self.reader.read_next()? {
                None => {
                    if self.reader.has_next() {
                        // A line that tokenized to zero fields; move on.
                        continue;
                    }
                    return Ok(None);
                }
                Some(record) => record,
            };
            self.record += 1;
            match self.bind(&record) {
                Ok(tuple) => return Ok(Some(tuple)),
                Err(err) => {
                    let err = err.with_record(self.record);
                    if self.fail_fast {
                        return Err(err);
                    }
                    debug!("captured bind error: {}", err);
                    self.captured.push(err);
                }
            }
        }
    }

    /// Read and convert every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(tuple) = self.read_next()? {
            all.push(tuple);
        }
        Ok(all)
    }

    /// Hand over the errors captured while `fail_fast` was disabled.
    ///
    /// Reading the list clears it: a second call returns nothing until
    /// further errors are captured.
    pub fn take_captured_errors(&mut self) -> Vec<Error> {
        mem::take(&mut self.captured)
    }

    /// The underlying record reader, for its counters.
    pub fn reader(&self) -> &Reader<R> {
        &self.reader
    }

    fn bind(&self, record: &Record) -> Result<T> {
        let mut tuple = T::default();
        for (index, field) in record.iter().enumerate() {
            let handler = match self.mapping.handler_for_column(index) {
                None => continue,
                Some(handler) => handler,
            };
            let raw = field.unwrap_or("");
            let value = handler.convert_from(
                raw,
                &self.converters,
                T::type_name(),
            )?;
            if value.is_null() {
                // Leave the slot at its Default initialization.
                continue;
            }
            let name = handler.name();
            tuple.set(name, value).map_err(|err| Error::Introspection {
                tuple: T::type_name(),
                field: name.to_string(),
                message: err.to_string(),
            })?;
        }
        Ok(tuple)
    }
}
