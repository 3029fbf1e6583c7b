use std::io;
use std::marker::PhantomData;
use std::mem;

use log::debug;

use laxcsv_core::Record;

use crate::error::{Error, Result};
use crate::writer::Writer;

use super::handler::Converters;
use super::mapping::Mapping;
use super::schema::Tuple;

/// Writes typed tuples into a CSV writer.
///
/// Before the first tuple, the mapping's header is written (when it has
/// one). Each tuple is then rendered column by column across the
/// mapping's full width; unmapped columns and null optional values
/// become empty fields. The fail-fast and captured-error discipline
/// matches [`TupleReader`](crate::bind::TupleReader), with one
/// difference: a captured conversion failure leaves an empty field in
/// place so the record stays aligned.
pub struct TupleWriter<T, M, W: io::Write> {
    writer: Writer<W>,
    mapping: M,
    converters: Converters,
    fail_fast: bool,
    captured: Vec<Error>,
    header_written: bool,
    record: u64,
    _tuple: PhantomData<T>,
}

impl<T, M, W> TupleWriter<T, M, W>
where
    T: Tuple,
    M: Mapping<T>,
    W: io::Write,
{
    /// Bind `writer` through `mapping`.
    ///
    /// Reusing the mapping from a finished read operation preserves the
    /// column order of the input, headers included.
    pub fn new(writer: Writer<W>, mapping: M) -> TupleWriter<T, M, W> {
        TupleWriter {
            writer,
            mapping,
            converters: Converters::new(),
            fail_fast: true,
            captured: Vec::new(),
            header_written: false,
            record: 0,
            _tuple: PhantomData,
        }
    }

    /// Supply custom converters for fields whose specs name one.
    pub fn converters(mut self, converters: Converters) -> TupleWriter<T, M, W> {
        self.converters = converters;
        self
    }

    /// Whether the first conversion failure aborts the write.
    ///
    /// Enabled by default. Introspection and I/O errors always abort.
    pub fn fail_fast(mut self, yes: bool) -> TupleWriter<T, M, W> {
        self.fail_fast = yes;
        self
    }

    /// Render and write one tuple.
    pub fn write(&mut self, tuple: &T) -> Result<()> {
        self.record += 1;
        if !self.header_written {
            let header = self.mapping.generate_header();
            if !header.is_empty() {
                debug!("writing header with {} column(s)", header.len());
                self.writer.write_fields(&header)?;
            }
            self.header_written = true;
        }

        let max = match self.mapping.max_field_index() {
            None => {
                // Nothing is mapped; the record is empty.
                return self.writer.write_record(&Record::new());
            }
            Some(max) => max,
        };
        let mut fields: Vec<Option<String>> = Vec::with_capacity(max + 1);
        for index in 0..=max {
            let handler = match self.mapping.handler_for_column(index) {
                None => {
                    fields.push(Some(String::new()));
                    continue;
                }
                Some(handler) => handler,
            };
            let name = handler.name();
            let value =
                tuple.get(name).map_err(|err| Error::Introspection {
                    tuple: T::type_name(),
                    field: name.to_string(),
                    message: err.to_string(),
                })?;
            match handler.convert_to(&value, &self.converters, T::type_name())
            {
                Ok(rendered) => {
                    fields.push(Some(rendered.unwrap_or_default()))
                }
                Err(err) => {
                    let err = err.with_record(self.record);
                    if self.fail_fast {
                        return Err(err);
                    }
                    debug!("captured bind error: {}", err);
                    self.captured.push(err);
                    fields.push(Some(String::new()));
                }
            }
        }
        self.writer.write_record(&Record::from(fields))
    }

    /// Render and write a batch of tuples.
    pub fn write_all<'a, I>(&mut self, tuples: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        for tuple in tuples {
            self.write(tuple)?;
        }
        Ok(())
    }

    /// Hand over the errors captured while `fail_fast` was disabled.
    ///
    /// Reading the list clears it.
    pub fn take_captured_errors(&mut self) -> Vec<Error> {
        mem::take(&mut self.captured)
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }

    /// Flush and return the underlying writer's destination.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use crate::bind::{
        FieldSpec, HeaderMapping, PositionMapping, SlotError, Tuple,
        TupleReader, Value, ValueKind,
    };
    use crate::error::Error;
    use crate::reader::Reader;
    use crate::writer::Writer;

    use super::TupleWriter;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Score {
        player: String,
        points: i64,
        bonus: Option<i64>,
    }

    impl Tuple for Score {
        fn schema() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("player", ValueKind::Str).required(),
                FieldSpec::new("points", ValueKind::Int),
                FieldSpec::new("bonus", ValueKind::Int),
            ]
        }

        fn get(&self, field: &str) -> Result<Value, SlotError> {
            match field {
                "player" => Ok(Value::Str(self.player.clone())),
                "points" => Ok(Value::Int(self.points)),
                "bonus" => {
                    Ok(self.bonus.map(Value::Int).unwrap_or(Value::Null))
                }
                other => Err(SlotError::new(other)),
            }
        }

        fn set(&mut self, field: &str, value: Value) -> Result<(), SlotError> {
            match (field, value) {
                ("player", Value::Str(v)) => self.player = v,
                ("points", Value::Int(v)) => self.points = v,
                ("bonus", Value::Int(v)) => self.bonus = Some(v),
                (other, _) => return Err(SlotError::new(other)),
            }
            Ok(())
        }
    }

    fn sample() -> Vec<Score> {
        vec![
            Score { player: "ada".into(), points: 10, bonus: Some(2) },
            Score { player: "grace".into(), points: 7, bonus: None },
        ]
    }

    #[test]
    fn writes_a_sorted_header_and_rows() {
        let mut wtr = TupleWriter::new(
            Writer::from_writer(vec![]),
            HeaderMapping::<Score>::new(),
        );
        wtr.write_all(&sample()).unwrap();
        let got = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(got, "bonus,player,points\n2,ada,10\n,grace,7\n");
    }

    #[test]
    fn position_mapping_writes_no_header() {
        let mut wtr = TupleWriter::new(
            Writer::from_writer(vec![]),
            PositionMapping::<Score>::new(),
        );
        wtr.write_all(&sample()).unwrap();
        let got = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(got, "ada,10,2\ngrace,7,\n");
    }

    #[test]
    fn mapping_reused_from_a_read_preserves_column_order() {
        let data = "points,player\n10,ada\n";
        let mut mapping = HeaderMapping::<Score>::new();
        let tuples: Vec<Score> = {
            let rdr = Reader::from_reader(data.as_bytes());
            // Capture the header by reading through a borrow of the
            // mapping, then move the mapping into the writer.
            let mut reader = TupleReader::new(rdr, &mut mapping);
            reader.read_all().unwrap()
        };
        let mut wtr =
            TupleWriter::new(Writer::from_writer(vec![]), mapping);
        wtr.write_all(&tuples).unwrap();
        let got = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(got, "points,player\n10,ada\n");
    }

    #[test]
    fn required_null_value_fails_on_write() {
        let mut wtr = TupleWriter::new(
            Writer::from_writer(vec![]),
            PositionMapping::<Score>::new(),
        );
        // An empty required player renders as an empty string, which is
        // fine; a required *null* is the failure case, so model one via
        // an optional required field.
        #[derive(Debug, Default)]
        struct Sparse {
            tag: Option<String>,
        }
        impl Tuple for Sparse {
            fn schema() -> Vec<FieldSpec> {
                vec![FieldSpec::new("tag", ValueKind::Str).required()]
            }
            fn get(&self, field: &str) -> Result<Value, SlotError> {
                match field {
                    "tag" => Ok(self
                        .tag
                        .clone()
                        .map(Value::Str)
                        .unwrap_or(Value::Null)),
                    other => Err(SlotError::new(other)),
                }
            }
            fn set(
                &mut self,
                field: &str,
                value: Value,
            ) -> Result<(), SlotError> {
                match (field, value) {
                    ("tag", Value::Str(v)) => self.tag = Some(v),
                    (other, _) => return Err(SlotError::new(other)),
                }
                Ok(())
            }
        }

        let mut sparse_wtr = TupleWriter::new(
            Writer::from_writer(vec![]),
            PositionMapping::<Sparse>::new(),
        );
        match sparse_wtr.write(&Sparse { tag: None }) {
            Err(Error::RequiredFieldEmpty { field, record, .. }) => {
                assert_eq!(field, "tag");
                assert_eq!(record, Some(1));
            }
            other => panic!("unexpected: {:?}", other),
        }

        // Keep the outer writer exercised.
        wtr.write(&sample()[0]).unwrap();
    }

    #[test]
    fn captured_write_errors_keep_records_aligned() {
        #[derive(Debug, Default)]
        struct Sparse {
            tag: Option<String>,
            n: i64,
        }
        impl Tuple for Sparse {
            fn schema() -> Vec<FieldSpec> {
                vec![
                    FieldSpec::new("tag", ValueKind::Str).required(),
                    FieldSpec::new("n", ValueKind::Int),
                ]
            }
            fn get(&self, field: &str) -> Result<Value, SlotError> {
                match field {
                    "tag" => Ok(self
                        .tag
                        .clone()
                        .map(Value::Str)
                        .unwrap_or(Value::Null)),
                    "n" => Ok(Value::Int(self.n)),
                    other => Err(SlotError::new(other)),
                }
            }
            fn set(
                &mut self,
                field: &str,
                value: Value,
            ) -> Result<(), SlotError> {
                match (field, value) {
                    ("tag", Value::Str(v)) => self.tag = Some(v),
                    ("n", Value::Int(v)) => self.n = v,
                    (other, _) => return Err(SlotError::new(other)),
                }
                Ok(())
            }
        }

        let mut wtr = TupleWriter::new(
            Writer::from_writer(vec![]),
            PositionMapping::<Sparse>::new(),
        )
        .fail_fast(false);
        wtr.write(&Sparse { tag: None, n: 5 }).unwrap();
        let errors = wtr.take_captured_errors();
        assert_eq!(errors.len(), 1);
        assert!(wtr.take_captured_errors().is_empty());
        let got = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(got, ",5\n");
    }
}
