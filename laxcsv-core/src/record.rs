use std::iter::FromIterator;
use std::ops::Index;

/// A single CSV record: an ordered sequence of fields.
///
/// A field is `Option<String>`. `None` marks an absent field, which is
/// distinct from `Some("")` only when the dialect's
/// [`NullFieldPolicy`](crate::NullFieldPolicy) asks for it; under the
/// default policy every field is `Some`.
///
/// # Example
///
/// ```
/// use laxcsv_core::Record;
///
/// let record = Record::from(vec!["a", "b", "c"]);
/// assert_eq!(record.len(), 3);
/// assert_eq!(record.get(1), Some("b"));
/// assert_eq!(record, vec!["a", "b", "c"]);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record(Vec<Option<String>>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Record {
        Record(Vec::new())
    }

    /// The number of fields in this record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this record has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The field at index `i` as a string slice.
    ///
    /// Returns `None` when the field is absent or the index is out of
    /// range; use [`Record::field`] to tell the two apart.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.0.get(i).and_then(|f| f.as_deref())
    }

    /// The field at index `i`, keeping the absent/present distinction.
    pub fn field(&self, i: usize) -> Option<&Option<String>> {
        self.0.get(i)
    }

    /// Add a field to the end of this record.
    pub fn push(&mut self, field: Option<String>) {
        self.0.push(field);
    }

    /// Move all fields of `other` onto the end of this record.
    pub fn extend_from(&mut self, other: Record) {
        self.0.extend(other.0);
    }

    /// An iterator over the fields as string slices, `None` for absent
    /// fields.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.0.iter().map(|f| f.as_deref())
    }

    /// The fields as a vector of string slices, `None` for absent
    /// fields. Convenient for comparisons against fixtures.
    pub fn fields(&self) -> Vec<Option<&str>> {
        self.iter().collect()
    }

    /// Consume the record, yielding its fields.
    pub fn into_parts(self) -> Vec<Option<String>> {
        self.0
    }
}

impl From<Vec<Option<String>>> for Record {
    fn from(fields: Vec<Option<String>>) -> Record {
        Record(fields)
    }
}

impl<'a> From<Vec<&'a str>> for Record {
    fn from(fields: Vec<&'a str>) -> Record {
        Record(fields.into_iter().map(|f| Some(f.to_string())).collect())
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Record {
        Record(fields.into_iter().map(Some).collect())
    }
}

impl FromIterator<Option<String>> for Record {
    fn from_iter<I: IntoIterator<Item = Option<String>>>(it: I) -> Record {
        Record(it.into_iter().collect())
    }
}

impl Index<usize> for Record {
    type Output = Option<String>;

    fn index(&self, i: usize) -> &Option<String> {
        &self.0[i]
    }
}

impl IntoIterator for Record {
    type Item = Option<String>;
    type IntoIter = std::vec::IntoIter<Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Option<String>;
    type IntoIter = std::slice::Iter<'a, Option<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: AsRef<str>> PartialEq<Vec<S>> for Record {
    fn eq(&self, other: &Vec<S>) -> bool {
        self.0.len() == other.len()
            && self.0.iter().zip(other.iter()).all(|(got, want)| {
                got.as_deref() == Some(want.as_ref())
            })
    }
}
