use crate::{Entity, FromValue, Result, Value, fields_match};

/// The interchange form between rows and entities: an ordered field→value
/// map plus nested records for hydrated relation fields.
///
/// Keys are the `'static` field names carried by the entity metadata. A
/// missing field reads like SQL NULL, which is what lets placeholder stubs
/// decode with zero values everywhere else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<(&'static str, Value)>,
    relations: Vec<(&'static str, Record)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &'static str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        if let Some(slot) = self.values.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = value;
        } else {
            self.values.push((field, value));
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(f, _)| fields_match(f, field))
            .map(|(_, v)| v)
    }

    /// Decode a field into a native scalar; absent fields decode like NULL.
    pub fn decode<T: FromValue>(&self, field: &str) -> Result<T> {
        match self.get(field) {
            Some(value) => T::from_value(value),
            None => T::from_value(&Value::Null),
        }
    }

    pub fn set_relation(&mut self, field: &'static str, related: Record) -> &mut Self {
        if let Some(slot) = self.relations.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = related;
        } else {
            self.relations.push((field, related));
        }
        self
    }

    pub fn relation(&self, field: &str) -> Option<&Record> {
        self.relations
            .iter()
            .find(|(f, _)| fields_match(f, field))
            .map(|(_, r)| r)
    }

    /// Decode a hydrated relation field into its entity type; `None` when
    /// the relation was not populated.
    pub fn decode_relation<E: Entity>(&self, field: &str) -> Result<Option<E>> {
        self.relation(field).map(E::from_record).transpose()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_and_get_matches_tokens() {
        let mut record = Record::new();
        record.set("product_line", 1i32);
        record.set("product_line", 2i32);
        assert_eq!(record.get("ProductLine"), Some(&Value::Int32(Some(2))));
        assert_eq!(record.fields().count(), 1);
    }

    #[test]
    fn absent_field_decodes_like_null() {
        let record = Record::new();
        assert_eq!(record.decode::<i32>("missing").unwrap(), 0);
        assert_eq!(record.decode::<Option<String>>("missing").unwrap(), None);
    }
}
