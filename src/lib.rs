/*!
The `laxcsv` crate reads and writes CSV-style delimited text, leaning
permissive: real-world CSV is full of stray quotes, ad-hoc escapes and
fields that span lines, and the default tokenizer accepts all of it and
finds *a* parse. A separate strict tokenizer is available for input known
to follow RFC 4180.

On top of raw records, the [`bind`] module maps records to and from your
own types through a schema you describe: by header name or by column
position, with per-field type conversion, required-field enforcement and
optional error aggregation.

# Reading

```
use laxcsv::Reader;

let data = "\
name,place,id
mark,sydney,46
ashley,zurich,92";

let mut rdr = Reader::from_reader(data.as_bytes());
for record in rdr.records() {
    let record = record.unwrap();
    println!("{:?}", record);
}
```

# Writing

```
use laxcsv::Writer;

let mut wtr = Writer::from_writer(vec![]);
wtr.write_fields(vec!["name", "place", "id"]).unwrap();
wtr.write_fields(vec!["mark", "sydney", "46"]).unwrap();
let data = wtr.into_inner().unwrap();
assert_eq!(data, b"name,place,id\nmark,sydney,46\n");
```

# Dialects

Tokenization is governed by an immutable [`Dialect`]: separator, quote
and escape characters, strict-quote and quote-ignoring modes, and a
[`NullFieldPolicy`] deciding which empty fields read back as absent
(`None`) rather than as empty strings. Configure it through
[`ReaderBuilder`] or [`WriterBuilder`].
*/

pub use laxcsv_core::{
    Dialect, DialectBuilder, Emitter, InvalidDialect, NullFieldPolicy,
    QuoteRequiredError, QuoteStyle, Record, StrictTokenizer, Tokenize,
    Tokenizer, UnterminatedQuoteError,
};

pub use crate::error::{Error, Result};
pub use crate::line_reader::LineReader;
pub use crate::reader::{Reader, ReaderBuilder, Records};
pub use crate::writer::{Writer, WriterBuilder};

pub mod bind;
mod error;
mod line_reader;
mod reader;
mod writer;
