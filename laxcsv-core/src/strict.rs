use crate::dialect::Dialect;
use crate::record::Record;
use crate::tokenizer::{Tokenize, UnterminatedQuoteError};

/// A field tokenizer for input that follows RFC 4180.
///
/// Only the separator and quote characters of the dialect are honored;
/// there is no escape character, no whitespace trimming and no null-field
/// policy. Quoted fields end at a quote followed by the separator or the
/// end of the line, and doubled quotes collapse to one literal quote.
///
/// This scanner never produces multi-line continuations: a quoted field
/// that runs to the end of the line simply ends there. Feed it one
/// logical line per record.
///
/// # Example
///
/// ```
/// use laxcsv_core::{Dialect, StrictTokenizer, Tokenize};
///
/// let mut tok = StrictTokenizer::new(&Dialect::default());
/// let record = tok.tokenize_line("a,\"b\"\"c\",d").unwrap();
/// assert_eq!(record, vec!["a", "b\"c", "d"]);
/// ```
#[derive(Clone, Debug)]
pub struct StrictTokenizer {
    separator: char,
    quote: Option<char>,
}

impl StrictTokenizer {
    /// Create a strict tokenizer using the separator and quote of the
    /// given dialect.
    pub fn new(dialect: &Dialect) -> StrictTokenizer {
        StrictTokenizer {
            separator: dialect.separator(),
            quote: dialect.quote(),
        }
    }

    fn split(&self, line: &str) -> Vec<String> {
        match self.quote {
            Some(quote) if line.contains(quote) => self
                .split_outside_quotes(line, quote)
                .into_iter()
                .map(|field| strip_quotes(field, quote))
                .collect(),
            _ => self.split_plain(line),
        }
    }

    /// Split a line with no quote character in it. Trailing empty fields
    /// are dropped, but an empty line is still one empty field.
    fn split_plain(&self, line: &str) -> Vec<String> {
        if line.is_empty() {
            return vec![String::new()];
        }
        let mut fields: Vec<String> =
            line.split(self.separator).map(str::to_string).collect();
        while fields.last().map_or(false, |f| f.is_empty()) {
            fields.pop();
        }
        fields
    }

    fn split_outside_quotes(&self, line: &str, quote: char) -> Vec<String> {
        let mut fields = Vec::new();
        let mut pos = 0;
        while pos < line.len() {
            let rest = &line[pos..];
            let next_sep = rest.find(self.separator).map(|i| pos + i);
            let next_quote = rest.find(quote).map(|i| pos + i);
            match (next_sep, next_quote) {
                (None, _) => {
                    fields.push(rest.to_string());
                    pos = line.len();
                }
                (Some(_), Some(q)) if q == pos => {
                    let end = self.field_end(line, pos, quote);
                    fields.push(line[pos..end.min(line.len())].to_string());
                    pos = end + self.separator.len_utf8();
                }
                (Some(s), _) => {
                    fields.push(line[pos..s].to_string());
                    pos = s + self.separator.len_utf8();
                }
            }
        }
        fields
    }

    /// Find the end of a quoted field starting at `start`: the position
    /// just past a closing quote that is followed by the separator or by
    /// the end of the line. Doubled quotes do not close the field.
    fn field_end(&self, line: &str, start: usize, quote: char) -> usize {
        let mut from = start + quote.len_utf8();
        while let Some(rel) = line[from..].find(quote) {
            let after = from + rel + quote.len_utf8();
            match line[after..].chars().next() {
                Some(c) if c == self.separator => return after,
                None => return after,
                _ => from = after,
            }
        }
        line.len()
    }
}

/// Strip the surrounding quotes from a field and collapse doubled quotes.
fn strip_quotes(field: String, quote: char) -> String {
    let mut ret = field;
    if ret.starts_with(quote) {
        ret.drain(..quote.len_utf8());
        if ret.ends_with(quote) {
            ret.truncate(ret.len() - quote.len_utf8());
        }
    }
    let doubled: String = [quote, quote].iter().collect();
    ret.replace(&doubled, &quote.to_string())
}

impl Tokenize for StrictTokenizer {
    fn tokenize_line(
        &mut self,
        line: &str,
    ) -> Result<Record, UnterminatedQuoteError> {
        Ok(self.split(line).into_iter().map(Some).collect())
    }

    fn tokenize_multi(
        &mut self,
        line: &str,
    ) -> Result<Record, UnterminatedQuoteError> {
        // Records never span lines in this profile, so a "multi" call is
        // just a line parse.
        self.tokenize_line(line)
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::{Dialect, DialectBuilder};
    use crate::tokenizer::Tokenize;

    use super::StrictTokenizer;

    fn tok() -> StrictTokenizer {
        StrictTokenizer::new(&Dialect::default())
    }

    macro_rules! splits_to {
        ($name:ident, $line:expr, [$($field:expr),*]) => {
            #[test]
            fn $name() {
                let got = tok().tokenize_line($line).unwrap();
                let expected: Vec<&str> = vec![$($field),*];
                assert_eq!(got, expected);
            }
        };
    }

    splits_to!(plain, "a,b,c", ["a", "b", "c"]);
    splits_to!(empty_line, "", [""]);
    splits_to!(leading_empty, ",a,b", ["", "a", "b"]);
    splits_to!(trailing_empties_dropped, "a,b,,", ["a", "b"]);
    splits_to!(only_separators, ",,,", []);
    splits_to!(quoted_separator, "a,\"b,c\",d", ["a", "b,c", "d"]);
    splits_to!(doubled_quote, "a,\"b\"\"c\",d", ["a", "b\"c", "d"]);
    splits_to!(quoted_only, "\"abc\"", ["abc"]);
    splits_to!(quote_at_end_of_line, "a,\"bc\"", ["a", "bc"]);
    splits_to!(interior_quote_kept, "a,b\"c,d", ["a", "b\"c", "d"]);
    splits_to!(unterminated_runs_to_eol, "a,\"bc,d", ["a", "bc,d"]);
    splits_to!(
        doubled_quotes_only,
        "\"\"\"\"\"\",\"test\"",
        ["\"\"", "test"]
    );

    #[test]
    fn never_pends() {
        let mut t = tok();
        t.tokenize_multi("a,\"open").unwrap();
        assert!(!t.is_pending());
        assert_eq!(t.finish(), None);
    }

    #[test]
    fn custom_separator() {
        let dialect =
            DialectBuilder::new().separator(';').build().unwrap();
        let mut t = StrictTokenizer::new(&dialect);
        let got = t.tokenize_line("a;\"b;c\";d").unwrap();
        assert_eq!(got, vec!["a", "b;c", "d"]);
    }

    #[test]
    fn no_quote_character_means_plain_split() {
        let dialect = DialectBuilder::new().quote(None).build().unwrap();
        let mut t = StrictTokenizer::new(&dialect);
        let got = t.tokenize_line("a,\"b\",c").unwrap();
        assert_eq!(got, vec!["a", "\"b\"", "c"]);
    }
}
