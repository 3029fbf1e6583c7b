use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::Error;

use super::schema::FieldSpec;
use super::value::{NumberLocale, Value, ValueKind};

/// A caller-supplied converter for one field, dispatched by the tag
/// named in the field's spec.
///
/// Errors are domain-level rejections; they surface as
/// [`Error::ConstraintViolation`] with the message the converter
/// returned.
pub trait CustomConverter {
    /// Parse a non-empty raw field into a value.
    fn convert_from(&self, raw: &str) -> Result<Value, String>;

    /// Render a non-null value back into field text.
    fn convert_to(&self, value: &Value) -> Result<String, String>;
}

/// A registry of named custom converters.
#[derive(Default)]
pub struct Converters {
    map: HashMap<String, Box<dyn CustomConverter>>,
}

impl Converters {
    /// Create an empty registry.
    pub fn new() -> Converters {
        Converters::default()
    }

    /// Register a converter under `tag`.
    pub fn register<C>(&mut self, tag: impl Into<String>, converter: C)
    where
        C: CustomConverter + 'static,
    {
        self.map.insert(tag.into(), Box::new(converter));
    }

    fn get(&self, tag: &str) -> Option<&dyn CustomConverter> {
        self.map.get(tag).map(|c| &**c)
    }
}

/// The unit that converts one column's text to a typed value and back.
///
/// Three families share the convert-from / convert-to contract:
/// primitives (numbers, booleans, strings), date/time values driven by a
/// format pattern, and custom converters dispatched by tag.
pub enum FieldHandler {
    Primitive(PrimitiveHandler),
    Date(DateHandler),
    Custom(CustomHandler),
}

impl FieldHandler {
    /// Choose the handler family for a field spec.
    pub fn for_spec(spec: &FieldSpec) -> FieldHandler {
        if let Some(tag) = spec.converter_tag() {
            FieldHandler::Custom(CustomHandler {
                name: spec.name().to_string(),
                required: spec.is_required(),
                tag: tag.to_string(),
            })
        } else if spec.kind().is_temporal() {
            FieldHandler::Date(DateHandler {
                name: spec.name().to_string(),
                kind: spec.kind(),
                required: spec.is_required(),
                format: spec
                    .declared_format()
                    .unwrap_or_else(|| spec.kind().default_format())
                    .to_string(),
            })
        } else {
            FieldHandler::Primitive(PrimitiveHandler {
                name: spec.name().to_string(),
                kind: spec.kind(),
                required: spec.is_required(),
                locale: spec.number_locale().unwrap_or_default(),
            })
        }
    }

    /// The name of the field this handler is bound to.
    pub fn name(&self) -> &str {
        match *self {
            FieldHandler::Primitive(ref h) => &h.name,
            FieldHandler::Date(ref h) => &h.name,
            FieldHandler::Custom(ref h) => &h.name,
        }
    }

    /// Convert raw field text to a typed value.
    ///
    /// An empty value yields [`Value::Null`] for optional fields and
    /// [`Error::RequiredFieldEmpty`] for required ones.
    pub fn convert_from(
        &self,
        raw: &str,
        converters: &Converters,
        tuple: &'static str,
    ) -> Result<Value, Error> {
        match *self {
            FieldHandler::Primitive(ref h) => h.convert_from(raw, tuple),
            FieldHandler::Date(ref h) => h.convert_from(raw, tuple),
            FieldHandler::Custom(ref h) => {
                h.convert_from(raw, converters, tuple)
            }
        }
    }

    /// Convert a typed value back to field text.
    ///
    /// `Ok(None)` means the value was null and the field optional; the
    /// caller renders that as it sees fit (the tuple writer uses the
    /// empty string).
    pub fn convert_to(
        &self,
        value: &Value,
        converters: &Converters,
        tuple: &'static str,
    ) -> Result<Option<String>, Error> {
        match *self {
            FieldHandler::Primitive(ref h) => h.convert_to(value, tuple),
            FieldHandler::Date(ref h) => h.convert_to(value, tuple),
            FieldHandler::Custom(ref h) => {
                h.convert_to(value, converters, tuple)
            }
        }
    }
}

/// Handles numbers, booleans and strings.
pub struct PrimitiveHandler {
    name: String,
    kind: ValueKind,
    required: bool,
    locale: NumberLocale,
}

impl PrimitiveHandler {
    fn convert_from(
        &self,
        raw: &str,
        tuple: &'static str,
    ) -> Result<Value, Error> {
        if raw.trim().is_empty() {
            return if self.required {
                Err(required_empty(tuple, &self.name))
            } else {
                Ok(Value::Null)
            };
        }
        match self.kind {
            ValueKind::Bool => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "n" | "off" | "0" => {
                    Ok(Value::Bool(false))
                }
                _ => Err(self.mismatch(raw, None)),
            },
            ValueKind::Int => self
                .locale
                .normalize(raw.trim())
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| self.mismatch(raw, Some(Box::new(e)))),
            ValueKind::Float => self
                .locale
                .normalize(raw.trim())
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| self.mismatch(raw, Some(Box::new(e)))),
            ValueKind::Str => Ok(Value::Str(raw.to_string())),
            // Temporal kinds are routed to the date handler.
            _ => Err(self.mismatch(raw, None)),
        }
    }

    fn convert_to(
        &self,
        value: &Value,
        tuple: &'static str,
    ) -> Result<Option<String>, Error> {
        match (self.kind, value) {
            (_, &Value::Null) => {
                if self.required {
                    Err(required_empty(tuple, &self.name))
                } else {
                    Ok(None)
                }
            }
            (ValueKind::Bool, &Value::Bool(b)) => {
                let rendered = if b { "true" } else { "false" };
                Ok(Some(rendered.to_string()))
            }
            (ValueKind::Int, &Value::Int(i)) => {
                Ok(Some(itoa::Buffer::new().format(i).to_string()))
            }
            (ValueKind::Float, &Value::Float(f)) => Ok(Some(
                self.locale.render(ryu::Buffer::new().format(f)),
            )),
            (ValueKind::Str, &Value::Str(ref s)) => Ok(Some(s.clone())),
            (_, other) => Err(self.mismatch(&format!("{:?}", other), None)),
        }
    }

    fn mismatch(
        &self,
        value: &str,
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Error {
        Error::DataTypeMismatch {
            value: value.to_string(),
            target: self.kind.name().to_string(),
            field: self.name.clone(),
            record: None,
            cause,
        }
    }
}

/// Handles the five date/time families through one format pattern.
pub struct DateHandler {
    name: String,
    kind: ValueKind,
    required: bool,
    format: String,
}

impl DateHandler {
    fn convert_from(
        &self,
        raw: &str,
        tuple: &'static str,
    ) -> Result<Value, Error> {
        if raw.is_empty() {
            return if self.required {
                Err(required_empty(tuple, &self.name))
            } else {
                Ok(Value::Null)
            };
        }
        let fmt = &self.format;
        let parsed = match self.kind {
            ValueKind::Date => {
                NaiveDate::parse_from_str(raw, fmt).map(Value::Date)
            }
            ValueKind::Time => {
                NaiveTime::parse_from_str(raw, fmt).map(Value::Time)
            }
            ValueKind::DateTime => {
                NaiveDateTime::parse_from_str(raw, fmt).map(Value::DateTime)
            }
            ValueKind::Instant => match DateTime::parse_from_str(raw, fmt) {
                Ok(dt) => Ok(Value::Instant(dt.with_timezone(&Utc))),
                // Patterns without an offset parse as naive UTC.
                Err(err) => NaiveDateTime::parse_from_str(raw, fmt)
                    .map(|n| Value::Instant(Utc.from_utc_datetime(&n)))
                    .map_err(|_| err),
            },
            ValueKind::Zoned => {
                DateTime::parse_from_str(raw, fmt).map(Value::Zoned)
            }
            _ => return Err(self.mismatch(raw, None)),
        };
        parsed.map_err(|e| self.mismatch(raw, Some(Box::new(e))))
    }

    fn convert_to(
        &self,
        value: &Value,
        tuple: &'static str,
    ) -> Result<Option<String>, Error> {
        let fmt = &self.format;
        let mut out = String::new();
        let formatted = match (self.kind, value) {
            (_, &Value::Null) => {
                return if self.required {
                    Err(required_empty(tuple, &self.name))
                } else {
                    Ok(None)
                };
            }
            (ValueKind::Date, &Value::Date(d)) => {
                write!(out, "{}", d.format(fmt))
            }
            (ValueKind::Time, &Value::Time(t)) => {
                write!(out, "{}", t.format(fmt))
            }
            (ValueKind::DateTime, &Value::DateTime(dt)) => {
                write!(out, "{}", dt.format(fmt))
            }
            (ValueKind::Instant, &Value::Instant(dt)) => {
                write!(out, "{}", dt.format(fmt))
            }
            (ValueKind::Zoned, &Value::Zoned(dt)) => {
                write!(out, "{}", dt.format(fmt))
            }
            (_, other) => {
                return Err(self.mismatch(&format!("{:?}", other), None));
            }
        };
        match formatted {
            Ok(()) => Ok(Some(out)),
            // An invalid pattern item surfaces as a format error.
            Err(_) => Err(self.mismatch(&out, None)),
        }
    }

    fn mismatch(
        &self,
        value: &str,
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Error {
        Error::DataTypeMismatch {
            value: value.to_string(),
            target: format!("{} ({})", self.kind.name(), self.format),
            field: self.name.clone(),
            record: None,
            cause,
        }
    }
}

/// Dispatches to a registered [`CustomConverter`].
pub struct CustomHandler {
    name: String,
    required: bool,
    tag: String,
}

impl CustomHandler {
    fn convert_from(
        &self,
        raw: &str,
        converters: &Converters,
        tuple: &'static str,
    ) -> Result<Value, Error> {
        if raw.is_empty() {
            return if self.required {
                Err(required_empty(tuple, &self.name))
            } else {
                Ok(Value::Null)
            };
        }
        let converter = self.lookup(converters, tuple)?;
        converter
            .convert_from(raw)
            .map_err(|message| self.violation(message))
    }

    fn convert_to(
        &self,
        value: &Value,
        converters: &Converters,
        tuple: &'static str,
    ) -> Result<Option<String>, Error> {
        if value.is_null() {
            return if self.required {
                Err(required_empty(tuple, &self.name))
            } else {
                Ok(None)
            };
        }
        let converter = self.lookup(converters, tuple)?;
        converter
            .convert_to(value)
            .map(Some)
            .map_err(|message| self.violation(message))
    }

    fn lookup<'c>(
        &self,
        converters: &'c Converters,
        tuple: &'static str,
    ) -> Result<&'c dyn CustomConverter, Error> {
        converters.get(&self.tag).ok_or_else(|| Error::Introspection {
            tuple,
            field: self.name.clone(),
            message: format!("no converter registered under '{}'", self.tag),
        })
    }

    fn violation(&self, message: String) -> Error {
        Error::ConstraintViolation {
            field: self.name.clone(),
            record: None,
            message,
        }
    }
}

fn required_empty(tuple: &'static str, field: &str) -> Error {
    Error::RequiredFieldEmpty {
        tuple,
        field: field.to_string(),
        record: None,
    }
}
