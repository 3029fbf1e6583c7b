use std::any;
use std::error::Error;
use std::fmt;

use super::value::{NumberLocale, Value, ValueKind};

/// A slot named by the schema could not be read or written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotError {
    field: String,
}

impl SlotError {
    /// Report that `field` has no accessible slot.
    pub fn new(field: impl Into<String>) -> SlotError {
        SlotError { field: field.into() }
    }

    /// The slot that was not accessible.
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for SlotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "no accessible slot named '{}'", self.field)
    }
}

impl Error for SlotError {}

/// The description of one bound field.
///
/// Built with a small chain of consuming methods:
///
/// ```
/// use laxcsv::bind::{FieldSpec, NumberLocale, ValueKind};
///
/// let spec = FieldSpec::new("price", ValueKind::Float)
///     .required()
///     .locale(NumberLocale::new(',', Some('.')));
/// assert!(spec.is_required());
/// ```
#[derive(Clone, Debug)]
pub struct FieldSpec {
    name: String,
    position: Option<usize>,
    kind: ValueKind,
    required: bool,
    locale: Option<NumberLocale>,
    format: Option<String>,
    converter: Option<String>,
}

impl FieldSpec {
    /// Describe a field by name and target kind.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> FieldSpec {
        FieldSpec {
            name: name.into(),
            position: None,
            kind,
            required: false,
            locale: None,
            format: None,
            converter: None,
        }
    }

    /// The column index this field occupies under position mapping.
    ///
    /// Fields without an explicit position take their ordinal in the
    /// schema list.
    pub fn position(mut self, position: usize) -> FieldSpec {
        self.position = Some(position);
        self
    }

    /// Mark the field as required: an empty input value (or an unset
    /// slot on output) becomes an error.
    pub fn required(mut self) -> FieldSpec {
        self.required = true;
        self
    }

    /// Numeric conventions for parsing and rendering this field.
    pub fn locale(mut self, locale: NumberLocale) -> FieldSpec {
        self.locale = Some(locale);
        self
    }

    /// The date/time format pattern for this field, in `chrono` strftime
    /// syntax. One pattern serves all five temporal kinds.
    pub fn format(mut self, format: impl Into<String>) -> FieldSpec {
        self.format = Some(format.into());
        self
    }

    /// Route this field through the named custom converter instead of
    /// the built-in handlers.
    pub fn converter(mut self, tag: impl Into<String>) -> FieldSpec {
        self.converter = Some(tag.into());
        self
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The explicit column position, if one was given.
    pub fn declared_position(&self) -> Option<usize> {
        self.position
    }

    /// The target kind.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Whether the field must carry a value.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The numeric conventions, if any.
    pub fn number_locale(&self) -> Option<NumberLocale> {
        self.locale
    }

    /// The date/time format pattern, if any.
    pub fn declared_format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// The custom converter tag, if any.
    pub fn converter_tag(&self) -> Option<&str> {
        self.converter.as_deref()
    }
}

/// The schema descriptor a bindable type implements.
///
/// `schema` lists the bound fields; `get` and `set` exchange tagged
/// [`Value`]s with the type's slots. The binder consults all of this
/// read-only and never constructs values of unexpected kinds: `set` is
/// called with the kind the field's spec declares, and `get` is expected
/// to return that kind (or [`Value::Null`] for an unset optional slot).
pub trait Tuple: Default {
    /// The field specifications for this type.
    fn schema() -> Vec<FieldSpec>;

    /// Read the named slot. Unset optional slots yield [`Value::Null`].
    fn get(&self, field: &str) -> Result<Value, SlotError>;

    /// Write the named slot.
    fn set(&mut self, field: &str, value: Value) -> Result<(), SlotError>;

    /// The type's name, for error attribution.
    fn type_name() -> &'static str {
        any::type_name::<Self>()
    }
}
