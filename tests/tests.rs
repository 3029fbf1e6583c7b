use std::io::Write as _;

use laxcsv::bind::{
    Converters, CustomConverter, FieldSpec, HeaderMapping, PositionMapping,
    SlotError, Tuple, TupleReader, TupleWriter, Value, ValueKind,
};
use laxcsv::{
    Error, NullFieldPolicy, QuoteStyle, Reader, ReaderBuilder, Writer,
    WriterBuilder,
};

fn read_all(data: &str) -> Vec<Vec<String>> {
    let mut rdr = Reader::from_reader(data.as_bytes());
    rdr.read_all()
        .unwrap()
        .into_iter()
        .map(|record| {
            record
                .into_parts()
                .into_iter()
                .map(|field| field.unwrap_or_default())
                .collect()
        })
        .collect()
}

#[test]
fn scenario_simple_record() {
    assert_eq!(read_all("a,b,c\n"), vec![vec!["a", "b", "c"]]);
}

#[test]
fn scenario_quoted_separators() {
    assert_eq!(read_all("a,\"b,b,b\",c\n"), vec![vec!["a", "b,b,b", "c"]]);
}

#[test]
fn scenario_adjacent_separators() {
    assert_eq!(read_all(",,\n"), vec![vec!["", "", ""]]);
}

#[test]
fn scenario_multi_line_field() {
    assert_eq!(
        read_all("a,\"PO Box 123,\nKippax,ACT. 2615.\nAustralia\",d.\n"),
        vec![vec!["a", "PO Box 123,\nKippax,ACT. 2615.\nAustralia", "d."]]
    );
}

#[test]
fn scenario_doubled_quotes() {
    assert_eq!(
        read_all("\"Glen \"\"The Man\"\" Smith\",Athlete,Developer\n"),
        vec![vec!["Glen \"The Man\" Smith", "Athlete", "Developer"]]
    );
}

#[test]
fn scenario_runs_of_quotes() {
    assert_eq!(read_all("\"\"\"\"\"\",\"test\"\n"), vec![vec![
        "\"\"", "test"
    ]]);
}

#[test]
fn scenario_escaped_quote() {
    assert_eq!(read_all("a,\"123\\\"4567\",c\n"), vec![vec![
        "a", "123\"4567", "c"
    ]]);
}

#[test]
fn scenario_null_policy_empty_separators() {
    let mut rdr = ReaderBuilder::new()
        .null_field_policy(NullFieldPolicy::EmptySeparators)
        .from_reader(",,,\"\",".as_bytes())
        .unwrap();
    let record = rdr.read_next().unwrap().unwrap();
    assert_eq!(record.fields(), vec![None, None, None, Some(""), None]);
}

#[test]
fn scenario_unterminated_quote() {
    let mut rdr = Reader::from_reader("a,\"b\n".as_bytes());
    assert!(matches!(
        rdr.read_next(),
        Err(Error::UnterminatedQuote { .. })
    ));
}

#[test]
fn scenario_clashing_dialect_characters() {
    let result = ReaderBuilder::new()
        .separator(',')
        .quote(Some(','))
        .from_reader("".as_bytes());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn round_trip_simple_fields() {
    let records = vec![
        vec!["plain", "fields", "only"],
        vec!["1", "2", "3"],
        vec!["", "empty", ""],
    ];
    let batch: Vec<laxcsv::Record> =
        records.iter().map(|r| laxcsv::Record::from(r.clone())).collect();
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_all_records(&batch).unwrap();
    let data = wtr.into_inner().unwrap();

    let mut rdr = Reader::from_reader(&data[..]);
    let got = rdr.read_all().unwrap();
    assert_eq!(got.len(), records.len());
    for (got, want) in got.iter().zip(&records) {
        assert_eq!(got, want);
    }
}

#[test]
fn round_trip_forced_quoting_arbitrary_fields() {
    let records = vec![
        vec!["with \"interior\" quotes", "a,b,c", "multi\nline\nfield"],
        vec!["", " leading and trailing ", "back\\slash"],
        vec!["separator,and\nnewline,together", "\"", "\\"],
    ];
    let mut wtr = WriterBuilder::new()
        .escape(Some('\\'))
        .quote_style(QuoteStyle::Always)
        .from_writer(vec![])
        .unwrap();
    for record in &records {
        wtr.write_fields(record.clone()).unwrap();
    }
    let data = wtr.into_inner().unwrap();

    let mut rdr = ReaderBuilder::new()
        .ignore_leading_whitespace(false)
        .from_reader(&data[..])
        .unwrap();
    let got = rdr.read_all().unwrap();
    assert_eq!(got.len(), records.len());
    for (got, want) in got.iter().zip(&records) {
        assert_eq!(got, want);
    }
}

#[test]
fn skip_lines_is_idempotent() {
    let data = "one\ntwo\na,b\nc,d\n";
    let parse = || {
        let mut rdr = ReaderBuilder::new()
            .skip_lines(2)
            .from_reader(data.as_bytes())
            .unwrap();
        rdr.read_all().unwrap()
    };
    assert_eq!(parse(), parse());
}

#[test]
fn counters_are_monotonic() {
    let data = "a,b\n\n\"x\ny\",z\nq\n";
    let mut rdr = Reader::from_reader(data.as_bytes());
    let mut last_lines = 0;
    let mut last_records = 0;
    while let Some(_) = rdr.read_next().unwrap() {
        assert!(rdr.lines_read() >= last_lines);
        assert_eq!(rdr.records_read(), last_records + 1);
        last_lines = rdr.lines_read();
        last_records = rdr.records_read();
    }
    assert_eq!(last_records, 4);
}

#[test]
fn reading_from_a_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"a,b\nc,d\n").unwrap();
    let mut rdr = Reader::from_path(file.path()).unwrap();
    assert_eq!(rdr.read_all().unwrap().len(), 2);
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Order {
    item: String,
    quantity: i64,
    price: f64,
    express: bool,
    ordered: chrono::NaiveDate,
    note: Option<String>,
}

impl Tuple for Order {
    fn schema() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("item", ValueKind::Str).required(),
            FieldSpec::new("quantity", ValueKind::Int),
            FieldSpec::new("price", ValueKind::Float),
            FieldSpec::new("express", ValueKind::Bool).converter("yesno"),
            FieldSpec::new("ordered", ValueKind::Date).format("%d.%m.%Y"),
            FieldSpec::new("note", ValueKind::Str),
        ]
    }

    fn get(&self, field: &str) -> Result<Value, SlotError> {
        match field {
            "item" => Ok(Value::Str(self.item.clone())),
            "quantity" => Ok(Value::Int(self.quantity)),
            "price" => Ok(Value::Float(self.price)),
            "express" => Ok(Value::Bool(self.express)),
            "ordered" => Ok(Value::Date(self.ordered)),
            "note" => {
                Ok(self.note.clone().map(Value::Str).unwrap_or(Value::Null))
            }
            other => Err(SlotError::new(other)),
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), SlotError> {
        match (field, value) {
            ("item", Value::Str(v)) => self.item = v,
            ("quantity", Value::Int(v)) => self.quantity = v,
            ("price", Value::Float(v)) => self.price = v,
            ("express", Value::Bool(v)) => self.express = v,
            ("ordered", Value::Date(v)) => self.ordered = v,
            ("note", Value::Str(v)) => self.note = Some(v),
            (other, _) => return Err(SlotError::new(other)),
        }
        Ok(())
    }
}

struct YesNo;

impl CustomConverter for YesNo {
    fn convert_from(&self, raw: &str) -> Result<Value, String> {
        match raw {
            "yes" => Ok(Value::Bool(true)),
            "no" => Ok(Value::Bool(false)),
            other => Err(format!("expected yes or no, got {:?}", other)),
        }
    }

    fn convert_to(&self, value: &Value) -> Result<String, String> {
        match *value {
            Value::Bool(true) => Ok("yes".to_string()),
            Value::Bool(false) => Ok("no".to_string()),
            ref other => Err(format!("not a bool: {:?}", other)),
        }
    }
}

fn converters() -> Converters {
    let mut converters = Converters::new();
    converters.register("yesno", YesNo);
    converters
}

#[test]
fn tuples_read_by_header_with_dates_and_custom_converters() {
    let data = "item,quantity,price,express,ordered,note\n\
                widget,3,9.5,yes,26.06.2016,fragile\n\
                sprocket,1,2.25,no,01.01.2020,\n";
    let mut rdr = TupleReader::new(
        Reader::from_reader(data.as_bytes()),
        HeaderMapping::<Order>::new(),
    )
    .converters(converters());
    let orders = rdr.read_all().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].item, "widget");
    assert_eq!(orders[0].price, 9.5);
    assert!(orders[0].express);
    assert_eq!(
        orders[0].ordered,
        chrono::NaiveDate::from_ymd_opt(2016, 6, 26).unwrap()
    );
    assert_eq!(orders[0].note.as_deref(), Some("fragile"));
    assert_eq!(orders[1].note, None);
    assert!(!orders[1].express);
}

#[test]
fn tuples_round_trip_through_write_and_read() {
    let orders = vec![
        Order {
            item: "widget".into(),
            quantity: 3,
            price: 9.5,
            express: true,
            ordered: chrono::NaiveDate::from_ymd_opt(2016, 6, 26).unwrap(),
            note: Some("fragile, keep \"this\" side up".into()),
        },
        Order {
            item: "sprocket".into(),
            quantity: 1,
            price: 2.25,
            express: false,
            ordered: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            note: None,
        },
    ];

    let mut wtr = TupleWriter::new(
        Writer::from_writer(vec![]),
        HeaderMapping::<Order>::new(),
    )
    .converters(converters());
    wtr.write_all(&orders).unwrap();
    let data = wtr.into_inner().unwrap();

    let mut rdr = TupleReader::new(
        Reader::from_reader(&data[..]),
        HeaderMapping::<Order>::new(),
    )
    .converters(converters());
    let got = rdr.read_all().unwrap();
    assert_eq!(got, orders);
}

#[test]
fn tuples_by_position_without_headers() {
    let data = "widget,3,9.5,yes,26.06.2016,\n";
    let mut rdr = TupleReader::new(
        Reader::from_reader(data.as_bytes()),
        PositionMapping::<Order>::new(),
    )
    .converters(converters());
    let orders = rdr.read_all().unwrap();
    assert_eq!(orders[0].item, "widget");
    assert_eq!(orders[0].quantity, 3);
    assert_eq!(orders[0].note, None);
}

#[test]
fn captured_errors_survive_until_taken() {
    let data = "item,quantity\nwidget,3\n,9\nbolt,many\n";
    let mut rdr = TupleReader::new(
        Reader::from_reader(data.as_bytes()),
        HeaderMapping::<Order>::new(),
    )
    .fail_fast(false);
    let orders = rdr.read_all().unwrap();
    assert_eq!(orders.len(), 1);

    let errors = rdr.take_captured_errors();
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], Error::RequiredFieldEmpty { .. }));
    assert!(matches!(errors[1], Error::DataTypeMismatch { .. }));
    assert!(rdr.take_captured_errors().is_empty());
}

#[test]
fn constraint_violations_name_the_field() {
    let data = "item,express\nwidget,maybe\n";
    let mut rdr = TupleReader::new(
        Reader::from_reader(data.as_bytes()),
        HeaderMapping::<Order>::new(),
    )
    .converters(converters());
    match rdr.read_next() {
        Err(Error::ConstraintViolation { field, record, .. }) => {
            assert_eq!(field, "express");
            assert_eq!(record, Some(1));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn strict_and_permissive_agree_on_clean_input() {
    let data = "a,\"b,c\",d\n\"x\"\"y\",z,w\n";
    let permissive = read_all(data);
    let mut rdr = ReaderBuilder::new()
        .strict_4180(true)
        .from_reader(data.as_bytes())
        .unwrap();
    let strict: Vec<Vec<String>> = rdr
        .read_all()
        .unwrap()
        .into_iter()
        .map(|record| {
            record
                .into_parts()
                .into_iter()
                .map(|field| field.unwrap_or_default())
                .collect()
        })
        .collect();
    assert_eq!(permissive, strict);
}
