//! Minimal record model: ordered, named, typed fields.

use smol_str::SmolStr;
use std::fmt::{self, Display};

/// Type tag of a field, used for the name-and-type passthrough match
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Int,
    Long,
    Double,
    Bool,
}

/// Value of a single field
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
}

impl FieldValue {
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Str(..) => FieldType::Str,
            Self::Int(..) => FieldType::Int,
            Self::Long(..) => FieldType::Long,
            Self::Double(..) => FieldType::Double,
            Self::Bool(..) => FieldType::Bool,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => Display::fmt(value, f),
            Self::Int(value) => Display::fmt(value, f),
            Self::Long(value) => Display::fmt(value, f),
            Self::Double(value) => Display::fmt(value, f),
            Self::Bool(value) => Display::fmt(value, f),
        }
    }
}

/// Named field of a record
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: SmolStr,
    pub value: FieldValue,
}

/// Ordered set of field names and types an outbound record may carry
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: Vec<(SmolStr, FieldType)>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field<N>(mut self, name: N, ty: FieldType) -> Self
    where
        N: Into<SmolStr>,
    {
        self.fields.push((name.into(), ty));
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str, ty: FieldType) -> bool {
        self.fields
            .iter()
            .any(|(field_name, field_ty)| field_name == name && *field_ty == ty)
    }
}

/// One unit of data flowing through the pipeline
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field<N>(mut self, name: N, value: FieldValue) -> Self
    where
        N: Into<SmolStr>,
    {
        self.set(name, value);
        self
    }

    /// First field of the record. For inbound records this is the one
    /// whose string content gets posted.
    #[must_use]
    pub fn first(&self) -> Option<&Field> {
        self.fields.first()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Set a field, replacing an existing one of the same name
    pub fn set<N>(&mut self, name: N, value: FieldValue)
    where
        N: Into<SmolStr>,
    {
        let name = name.into();
        if let Some(field) = self.fields.iter_mut().find(|field| field.name == name) {
            field.value = value;
        } else {
            self.fields.push(Field { name, value });
        }
    }

    /// Copy every field from `other` whose name and type appear in `schema`
    ///
    /// This is the passthrough copy: matching inbound fields survive into
    /// the outbound record untouched, everything else is left behind.
    pub fn assign_matching(&mut self, other: &Record, schema: &Schema) {
        for field in &other.fields {
            if schema.contains(&field.name, field.value.field_type()) {
                self.set(field.name.clone(), field.value.clone());
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for field in &self.fields {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}={}", field.name, field.value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{FieldType, FieldValue, Record, Schema};

    #[test]
    fn assign_matching_copies_name_and_type_matches() {
        let inbound = Record::new()
            .with_field("payload", FieldValue::Str("x".into()))
            .with_field("deviceId", FieldValue::Str("sensor-1".into()))
            .with_field("seq", FieldValue::Long(42));

        let schema = Schema::new()
            .with_field("deviceId", FieldType::Str)
            .with_field("seq", FieldType::Int); // type mismatch, must not copy

        let mut outbound = Record::new();
        outbound.assign_matching(&inbound, &schema);

        assert_eq!(
            outbound.get("deviceId"),
            Some(&FieldValue::Str("sensor-1".into()))
        );
        assert_eq!(outbound.get("seq"), None);
        assert_eq!(outbound.get("payload"), None);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut record = Record::new().with_field("statusCode", FieldValue::Int(0));
        record.set("statusCode", FieldValue::Int(200));

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("statusCode"), Some(&FieldValue::Int(200)));
    }

    #[test]
    fn display_is_name_value_pairs() {
        let record = Record::new()
            .with_field("statusCode", FieldValue::Int(200))
            .with_field("statusMessage", FieldValue::Str("OK".into()));

        assert_eq!(record.to_string(), "statusCode=200, statusMessage=OK");
    }
}
