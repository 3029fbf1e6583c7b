/*!
Typed binding between CSV records and user-defined types.

The binder never inspects your types directly. Instead, a type describes
itself by implementing [`Tuple`]: a list of [`FieldSpec`]s naming each
bound field, its target [`ValueKind`], whether it is required, and how to
convert it, plus `get`/`set` accessors exchanging tagged [`Value`]s with
the type's slots.

A [mapping](Mapping) decides which column feeds which field: by header
name ([`HeaderMapping`], consuming the first record as headers) or by
column position ([`PositionMapping`]). [`TupleReader`] and
[`TupleWriter`] drive a mapping against a CSV reader or writer.

# Example

```
use laxcsv::bind::{
    FieldSpec, HeaderMapping, SlotError, Tuple, TupleReader, Value,
    ValueKind,
};
use laxcsv::Reader;

#[derive(Debug, Default, PartialEq)]
struct City {
    name: String,
    population: i64,
}

impl Tuple for City {
    fn schema() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("name", ValueKind::Str).required(),
            FieldSpec::new("population", ValueKind::Int),
        ]
    }

    fn get(&self, field: &str) -> Result<Value, SlotError> {
        match field {
            "name" => Ok(Value::Str(self.name.clone())),
            "population" => Ok(Value::Int(self.population)),
            other => Err(SlotError::new(other)),
        }
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), SlotError> {
        match (field, value) {
            ("name", Value::Str(v)) => self.name = v,
            ("population", Value::Int(v)) => self.population = v,
            (other, _) => return Err(SlotError::new(other)),
        }
        Ok(())
    }
}

let data = "name,population\nsydney,5312163\nzurich,415367\n";
let rdr = Reader::from_reader(data.as_bytes());
let mut cities =
    TupleReader::new(rdr, HeaderMapping::<City>::new());
let all = cities.read_all().unwrap();
assert_eq!(all[0], City { name: "sydney".into(), population: 5312163 });
```
*/

pub use self::handler::{CustomConverter, Converters, FieldHandler};
pub use self::mapping::{HeaderMapping, Mapping, PositionMapping};
pub use self::read::TupleReader;
pub use self::schema::{FieldSpec, SlotError, Tuple};
pub use self::value::{NumberLocale, Value, ValueKind};
pub use self::write::TupleWriter;

mod handler;
mod mapping;
mod read;
mod schema;
mod value;
mod write;
