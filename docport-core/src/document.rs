//! Conversion between typed values and BSON documents.
//!
//! Collections speak [`bson::Document`]. These helpers let callers keep their
//! own serde types at the edges.

use bson::{Bson, Document, de::deserialize_from_document, ser::serialize_to_document};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::DatabaseResult;

/// Serializes a value into a BSON document.
///
/// # Errors
///
/// Returns an error if the value does not serialize to a document (for
/// example a bare string or number).
pub fn to_document<T>(value: &T) -> DatabaseResult<Document>
where
    T: Serialize + ?Sized,
{
    Ok(serialize_to_document(value)?)
}

/// Deserializes a BSON document into a value.
///
/// # Errors
///
/// Returns an error if the document does not match the target type.
pub fn from_document<T>(document: Document) -> DatabaseResult<T>
where
    T: DeserializeOwned,
{
    Ok(deserialize_from_document(document)?)
}

/// Deserializes every document of a result set.
pub fn from_documents<T>(documents: Vec<Document>) -> DatabaseResult<Vec<T>>
where
    T: DeserializeOwned,
{
    documents.into_iter().map(from_document).collect()
}

/// Builds the `{ "_id": id }` selector used by id based operations.
pub fn id_selector(id: impl Into<Bson>) -> Document {
    let mut selector = Document::new();
    selector.insert("_id", id.into());
    selector
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        #[serde(rename = "_id")]
        id: String,
        name: String,
        age: i32,
    }

    #[test]
    fn typed_values_convert() {
        let user = User {
            id: "u1".into(),
            name: "Alice".into(),
            age: 30,
        };

        let document = to_document(&user).unwrap();
        assert_eq!(document, doc! { "_id": "u1", "name": "Alice", "age": 30 });
        assert_eq!(from_document::<User>(document).unwrap(), user);
    }

    #[test]
    fn mismatched_document_is_serialization_error() {
        let err = from_documents::<User>(vec![doc! { "name": 1 }]).unwrap_err();
        assert!(matches!(err, crate::error::DatabaseError::Serialization(_)));
    }

    #[test]
    fn id_selector_wraps_id() {
        assert_eq!(id_selector(7), doc! { "_id": 7 });
    }
}
