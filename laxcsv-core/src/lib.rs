/*!
`laxcsv-core` provides the pieces of CSV processing that do no I/O: the
dialect configuration, the permissive and strict record tokenizers, the
owned record type and the field emitter.

Most callers want the `laxcsv` crate, which drives these against readers
and writers and adds typed record binding. This crate is useful on its own
when you already have lines in hand and want to turn them into fields (or
fields into a line) without going through `std::io`.
*/

pub use crate::dialect::{Dialect, DialectBuilder, InvalidDialect, NullFieldPolicy};
pub use crate::emitter::{Emitter, QuoteRequiredError, QuoteStyle};
pub use crate::record::Record;
pub use crate::strict::StrictTokenizer;
pub use crate::tokenizer::{Tokenize, Tokenizer, UnterminatedQuoteError};

mod dialect;
mod emitter;
mod record;
mod strict;
mod tokenizer;
