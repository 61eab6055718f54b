//! Header and record types shared between the reader and the writer

use std::collections::HashSet;
use std::sync::Arc;

use csv::StringRecord;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};

/// Ordered, unique field names from the first row.
///
/// Cloning is cheap; every record holds a handle to the same names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Arc<[String]>,
}

impl Header {
    /// Build a header from parsed names, rejecting duplicates
    pub fn new<I, S>(names: I) -> ConversionResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ConversionError::conversion(ConversionErrorKind::MissingHeader));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ConversionError::conversion(
                    ConversionErrorKind::DuplicateHeader { name: name.clone() },
                ));
            }
        }

        Ok(Self {
            names: names.into(),
        })
    }

    pub fn from_record(record: &StringRecord) -> ConversionResult<Self> {
        Self::new(record.iter())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// One data row paired positionally with the header.
///
/// Serializes as a JSON object in header order, every value a string.
#[derive(Debug, Clone)]
pub struct Record {
    header: Header,
    values: StringRecord,
    line: u64,
}

impl Record {
    /// Pair a row with the header. Callers must have checked the field count.
    pub(crate) fn new(header: Header, values: StringRecord, line: u64) -> Self {
        debug_assert_eq!(header.len(), values.len());
        Self {
            header,
            values,
            line,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.header.position(name).and_then(|i| self.values.get(i))
    }

    /// `(name, value)` pairs in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Source line the row started on
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
