use std::error::Error;
use std::fmt;

/// Which shapes of empty field are reported as absent rather than as an
/// empty string.
///
/// An "absent" field comes back as `None` in a [`Record`](crate::Record),
/// while an empty field comes back as `Some("")`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NullFieldPolicy {
    /// Empty fields are always empty strings. The default.
    Neither,
    /// A field that was empty between two separators (never quoted) is
    /// absent.
    EmptySeparators,
    /// A field whose emptiness came from a quoted region (`""`) is absent.
    EmptyQuotes,
    /// Both of the above are absent.
    Both,
}

impl Default for NullFieldPolicy {
    fn default() -> NullFieldPolicy {
        NullFieldPolicy::Neither
    }
}

/// An invalid dialect configuration.
///
/// Raised when a dialect (or writer configuration) is built from
/// characters that cannot work together.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InvalidDialect {
    /// Two of separator, quote and escape are the same character.
    DuplicateCharacters(char),
    /// The separator is the NUL character, which is reserved.
    MissingSeparator,
}

impl fmt::Display for InvalidDialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InvalidDialect::DuplicateCharacters(ch) => write!(
                f,
                "the separator, quote and escape characters must be \
                 distinct, but {:?} is used twice",
                ch
            ),
            InvalidDialect::MissingSeparator => {
                write!(f, "the separator character must be defined")
            }
        }
    }
}

impl Error for InvalidDialect {}

/// The immutable bundle of characters and flags governing tokenization.
///
/// A dialect is built once with a [`DialectBuilder`] and may be freely
/// shared between readers. The default dialect separates on `,`, quotes
/// with `"` and escapes with `\`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dialect {
    separator: char,
    quote: Option<char>,
    escape: Option<char>,
    strict_quotes: bool,
    ignore_leading_whitespace: bool,
    ignore_quotations: bool,
    null_field_policy: NullFieldPolicy,
}

impl Default for Dialect {
    fn default() -> Dialect {
        Dialect {
            separator: ',',
            quote: Some('"'),
            escape: Some('\\'),
            strict_quotes: false,
            ignore_leading_whitespace: true,
            ignore_quotations: false,
            null_field_policy: NullFieldPolicy::default(),
        }
    }
}

impl Dialect {
    /// The field delimiter.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// The quoting character, if quoting is enabled.
    pub fn quote(&self) -> Option<char> {
        self.quote
    }

    /// The escape character, if escaping is enabled.
    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    /// Whether characters outside quoted regions are discarded.
    pub fn strict_quotes(&self) -> bool {
        self.strict_quotes
    }

    /// Whether whitespace leading up to a quote is dropped.
    pub fn ignore_leading_whitespace(&self) -> bool {
        self.ignore_leading_whitespace
    }

    /// Whether the quote character is treated as ordinary data.
    pub fn ignore_quotations(&self) -> bool {
        self.ignore_quotations
    }

    /// Which empty fields read back as absent.
    pub fn null_field_policy(&self) -> NullFieldPolicy {
        self.null_field_policy
    }

    /// Checks that a separator/quote/escape combination is usable.
    ///
    /// The three characters must be pairwise distinct and the separator
    /// must not be NUL. Writer configurations share this rule.
    pub fn validate(
        separator: char,
        quote: Option<char>,
        escape: Option<char>,
    ) -> Result<(), InvalidDialect> {
        if separator == '\u{0}' {
            return Err(InvalidDialect::MissingSeparator);
        }
        if quote == Some(separator) || escape == Some(separator) {
            return Err(InvalidDialect::DuplicateCharacters(separator));
        }
        match (quote, escape) {
            (Some(q), Some(e)) if q == e => {
                Err(InvalidDialect::DuplicateCharacters(q))
            }
            _ => Ok(()),
        }
    }
}

/// Builds a [`Dialect`] with various configuration knobs.
///
/// `build` validates the configuration, so an impossible combination of
/// characters is rejected before any parsing happens.
///
/// # Example
///
/// ```
/// use laxcsv_core::{DialectBuilder, NullFieldPolicy};
///
/// let dialect = DialectBuilder::new()
///     .separator(';')
///     .escape(None)
///     .null_field_policy(NullFieldPolicy::EmptySeparators)
///     .build()
///     .unwrap();
/// assert_eq!(dialect.separator(), ';');
/// ```
#[derive(Clone, Debug, Default)]
pub struct DialectBuilder {
    dialect: Dialect,
}

impl DialectBuilder {
    /// Create a new builder holding the default dialect.
    pub fn new() -> DialectBuilder {
        DialectBuilder::default()
    }

    /// Validate the configuration and produce the dialect.
    pub fn build(&self) -> Result<Dialect, InvalidDialect> {
        let d = &self.dialect;
        Dialect::validate(d.separator, d.quote, d.escape)?;
        Ok(d.clone())
    }

    /// The field delimiter to use. The default is `,`.
    pub fn separator(&mut self, separator: char) -> &mut DialectBuilder {
        self.dialect.separator = separator;
        self
    }

    /// The quote character to use, or `None` to disable quoting.
    ///
    /// The default is `"`.
    pub fn quote(&mut self, quote: Option<char>) -> &mut DialectBuilder {
        self.dialect.quote = quote;
        self
    }

    /// The escape character to use, or `None` to disable escaping.
    ///
    /// The default is `\`.
    pub fn escape(&mut self, escape: Option<char>) -> &mut DialectBuilder {
        self.dialect.escape = escape;
        self
    }

    /// When enabled, characters outside quoted regions are discarded and
    /// only content between quote pairs becomes field data.
    ///
    /// Disabled by default.
    pub fn strict_quotes(&mut self, yes: bool) -> &mut DialectBuilder {
        self.dialect.strict_quotes = yes;
        self
    }

    /// When enabled, whitespace accumulated in front of a quote is
    /// dropped rather than kept as field data.
    ///
    /// Enabled by default.
    pub fn ignore_leading_whitespace(
        &mut self,
        yes: bool,
    ) -> &mut DialectBuilder {
        self.dialect.ignore_leading_whitespace = yes;
        self
    }

    /// When enabled, the quote character never toggles quoted state and
    /// is treated as ordinary data.
    ///
    /// This wins over `strict_quotes`: with quotations ignored there is
    /// no quoted region for `strict_quotes` to keep, so every character
    /// is discarded.
    ///
    /// Disabled by default.
    pub fn ignore_quotations(&mut self, yes: bool) -> &mut DialectBuilder {
        self.dialect.ignore_quotations = yes;
        self
    }

    /// Which empty-field shapes read back as absent.
    ///
    /// The default is `NullFieldPolicy::Neither`.
    pub fn null_field_policy(
        &mut self,
        policy: NullFieldPolicy,
    ) -> &mut DialectBuilder {
        self.dialect.null_field_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Dialect, DialectBuilder, InvalidDialect};

    #[test]
    fn default_dialect() {
        let d = Dialect::default();
        assert_eq!(d.separator(), ',');
        assert_eq!(d.quote(), Some('"'));
        assert_eq!(d.escape(), Some('\\'));
        assert!(!d.strict_quotes());
        assert!(d.ignore_leading_whitespace());
        assert!(!d.ignore_quotations());
    }

    #[test]
    fn separator_equal_to_quote_is_rejected() {
        let err = DialectBuilder::new()
            .separator(',')
            .quote(Some(','))
            .build()
            .unwrap_err();
        assert_eq!(err, InvalidDialect::DuplicateCharacters(','));
    }

    #[test]
    fn quote_equal_to_escape_is_rejected() {
        let err = DialectBuilder::new()
            .quote(Some('\''))
            .escape(Some('\''))
            .build()
            .unwrap_err();
        assert_eq!(err, InvalidDialect::DuplicateCharacters('\''));
    }

    #[test]
    fn nul_separator_is_rejected() {
        let err =
            DialectBuilder::new().separator('\u{0}').build().unwrap_err();
        assert_eq!(err, InvalidDialect::MissingSeparator);
    }

    #[test]
    fn disabled_characters_do_not_collide() {
        // Quoting and escaping both off leaves nothing to clash.
        let d = DialectBuilder::new()
            .quote(None)
            .escape(None)
            .build()
            .unwrap();
        assert_eq!(d.quote(), None);
        assert_eq!(d.escape(), None);
    }
}
