use std::collections::HashMap;
use std::io;
use std::marker::PhantomData;

use log::debug;

use crate::error::Result;
use crate::reader::Reader;

use super::handler::FieldHandler;
use super::schema::Tuple;

/// Decides which column feeds which field of a tuple.
///
/// Implementations own the [`FieldHandler`]s built from the tuple's
/// schema; the tuple reader and writer consult them column by column.
pub trait Mapping<T: Tuple> {
    /// Consume whatever header material this mapping needs from the
    /// reader before the first data record.
    fn capture_header<R: io::Read>(
        &mut self,
        reader: &mut Reader<R>,
    ) -> Result<()>;

    /// The handler responsible for column `index`, if any. Unmapped
    /// columns are skipped by the binder.
    fn handler_for_column(&self, index: usize) -> Option<&FieldHandler>;

    /// The header to write before the first record, empty when this
    /// mapping writes none.
    fn generate_header(&mut self) -> Vec<String>;

    /// The highest column index this mapping can produce, so a writer
    /// knows how many columns to emit. `None` when nothing is mapped.
    fn max_field_index(&self) -> Option<usize>;
}

// A mapping can be borrowed into a reader, then moved into a writer, to
// carry a captured header from a read operation to a write operation.
impl<'m, T: Tuple, M: Mapping<T>> Mapping<T> for &'m mut M {
    fn capture_header<R: io::Read>(
        &mut self,
        reader: &mut Reader<R>,
    ) -> Result<()> {
        (**self).capture_header(reader)
    }

    fn handler_for_column(&self, index: usize) -> Option<&FieldHandler> {
        (**self).handler_for_column(index)
    }

    fn generate_header(&mut self) -> Vec<String> {
        (**self).generate_header()
    }

    fn max_field_index(&self) -> Option<usize> {
        (**self).max_field_index()
    }
}

fn lookup_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Maps columns by the header names in the first record.
///
/// Lookup is case-insensitive and ignores surrounding whitespace, so a
/// header spelled `" Name "` finds a field declared as `name`. Columns
/// whose header matches no declared field are skipped. When no header
/// was captured from input, writing derives one from the declared
/// fields, sorted alphabetically for deterministic output.
pub struct HeaderMapping<T> {
    handlers: HashMap<String, FieldHandler>,
    header: Option<Vec<String>>,
    _tuple: PhantomData<T>,
}

impl<T: Tuple> HeaderMapping<T> {
    /// Build the mapping from `T`'s schema.
    pub fn new() -> HeaderMapping<T> {
        let handlers = T::schema()
            .into_iter()
            .map(|spec| {
                (lookup_key(spec.name()), FieldHandler::for_spec(&spec))
            })
            .collect();
        HeaderMapping { handlers, header: None, _tuple: PhantomData }
    }

    /// The captured header, once one has been read.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }
}

impl<T: Tuple> Default for HeaderMapping<T> {
    fn default() -> HeaderMapping<T> {
        HeaderMapping::new()
    }
}

impl<T: Tuple> Mapping<T> for HeaderMapping<T> {
    fn capture_header<R: io::Read>(
        &mut self,
        reader: &mut Reader<R>,
    ) -> Result<()> {
        self.header = reader.read_next()?.map(|record| {
            record
                .into_parts()
                .into_iter()
                .map(|field| field.unwrap_or_default())
                .collect()
        });
        Ok(())
    }

    fn handler_for_column(&self, index: usize) -> Option<&FieldHandler> {
        let name = self.header.as_ref()?.get(index)?;
        if name.trim().is_empty() {
            return None;
        }
        self.handlers.get(&lookup_key(name))
    }

    fn generate_header(&mut self) -> Vec<String> {
        if self.header.is_none() {
            // Nothing was captured, so this mapping has only been used
            // for writing. Sort the declared names so the column order
            // does not depend on hashing.
            let mut names: Vec<String> = self
                .handlers
                .values()
                .map(|handler| handler.name().to_string())
                .collect();
            names.sort();
            debug!("derived header from schema: {} column(s)", names.len());
            self.header = Some(names);
        }
        self.header.clone().unwrap_or_default()
    }

    fn max_field_index(&self) -> Option<usize> {
        match self.header {
            Some(ref header) if !header.is_empty() => {
                Some(header.len() - 1)
            }
            _ => None,
        }
    }
}

/// Maps columns by position, with no header record at all.
///
/// Each field occupies the column its spec declares, or its ordinal in
/// the schema list when no position is declared.
pub struct PositionMapping<T> {
    handlers: HashMap<usize, FieldHandler>,
    _tuple: PhantomData<T>,
}

impl<T: Tuple> PositionMapping<T> {
    /// Build the mapping from `T`'s schema.
    pub fn new() -> PositionMapping<T> {
        let handlers = T::schema()
            .into_iter()
            .enumerate()
            .map(|(ordinal, spec)| {
                let position = spec.declared_position().unwrap_or(ordinal);
                (position, FieldHandler::for_spec(&spec))
            })
            .collect();
        PositionMapping { handlers, _tuple: PhantomData }
    }
}

impl<T: Tuple> Default for PositionMapping<T> {
    fn default() -> PositionMapping<T> {
        PositionMapping::new()
    }
}

impl<T: Tuple> Mapping<T> for PositionMapping<T> {
    fn capture_header<R: io::Read>(
        &mut self,
        _reader: &mut Reader<R>,
    ) -> Result<()> {
        Ok(())
    }

    fn handler_for_column(&self, index: usize) -> Option<&FieldHandler> {
        self.handlers.get(&index)
    }

    fn generate_header(&mut self) -> Vec<String> {
        Vec::new()
    }

    fn max_field_index(&self) -> Option<usize> {
        self.handlers.keys().max().copied()
    }
}
