use std::fmt;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc,
};

/// A tagged value exchanged between field handlers and tuple slots.
///
/// `Null` stands for "no value": an optional field that was empty on
/// input, or an unset optional slot on output. The binder never passes
/// `Null` to [`Tuple::set`](crate::bind::Tuple::set); an empty optional
/// field simply leaves the slot at its `Default` initialization.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A calendar date without time or zone.
    Date(NaiveDate),
    /// A wall-clock time without date or zone.
    Time(NaiveTime),
    /// A date and time without zone.
    DateTime(NaiveDateTime),
    /// An absolute point in time, in UTC.
    Instant(DateTime<Utc>),
    /// A date and time pinned to a fixed offset.
    Zoned(DateTime<FixedOffset>),
}

impl Value {
    /// Whether this is the no-value marker.
    pub fn is_null(&self) -> bool {
        matches!(*self, Value::Null)
    }

    /// The kind this value belongs to, or `None` for `Null`.
    pub fn kind(&self) -> Option<ValueKind> {
        match *self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Int(_) => Some(ValueKind::Int),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Str(_) => Some(ValueKind::Str),
            Value::Date(_) => Some(ValueKind::Date),
            Value::Time(_) => Some(ValueKind::Time),
            Value::DateTime(_) => Some(ValueKind::DateTime),
            Value::Instant(_) => Some(ValueKind::Instant),
            Value::Zoned(_) => Some(ValueKind::Zoned),
        }
    }
}

/// The target type tag of a bound field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    Date,
    Time,
    DateTime,
    Instant,
    Zoned,
}

impl ValueKind {
    /// A human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::DateTime => "date-time",
            ValueKind::Instant => "instant",
            ValueKind::Zoned => "zoned date-time",
        }
    }

    /// Whether values of this kind go through the date handler.
    pub(crate) fn is_temporal(&self) -> bool {
        matches!(
            *self,
            ValueKind::Date
                | ValueKind::Time
                | ValueKind::DateTime
                | ValueKind::Instant
                | ValueKind::Zoned
        )
    }

    /// The format pattern used when the field spec does not name one.
    pub(crate) fn default_format(&self) -> &'static str {
        match *self {
            ValueKind::Date => "%Y-%m-%d",
            ValueKind::Time => "%H:%M:%S",
            ValueKind::DateTime => "%Y-%m-%dT%H:%M:%S",
            ValueKind::Instant | ValueKind::Zoned => "%Y-%m-%dT%H:%M:%S%z",
            _ => "",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host-supplied numeric conventions for one field.
///
/// The crate bundles no locale data. A caller that needs, say, German
/// numbers constructs `NumberLocale::new(',', Some('.'))` and attaches
/// it to the field spec; parsing then strips grouping separators and
/// normalizes the decimal separator before the number parser runs, and
/// rendering puts the decimal separator back.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NumberLocale {
    decimal: char,
    grouping: Option<char>,
}

impl Default for NumberLocale {
    fn default() -> NumberLocale {
        NumberLocale { decimal: '.', grouping: None }
    }
}

impl NumberLocale {
    /// Create numeric conventions from a decimal separator and an
    /// optional grouping separator.
    pub fn new(decimal: char, grouping: Option<char>) -> NumberLocale {
        NumberLocale { decimal, grouping }
    }

    /// The decimal separator.
    pub fn decimal(&self) -> char {
        self.decimal
    }

    /// The grouping separator, if any.
    pub fn grouping(&self) -> Option<char> {
        self.grouping
    }

    /// Rewrite `raw` into the form the standard number parsers accept.
    pub(crate) fn normalize(&self, raw: &str) -> String {
        raw.chars()
            .filter(|&c| Some(c) != self.grouping)
            .map(|c| if c == self.decimal { '.' } else { c })
            .collect()
    }

    /// Rewrite a rendered number back into these conventions.
    pub(crate) fn render(&self, formatted: &str) -> String {
        formatted
            .chars()
            .map(|c| if c == '.' { self.decimal } else { c })
            .collect()
    }
}
