use crate::{
    bson::{Bson, Document},
    error::{ErrorKind, Result},
    options::IdGenerator,
};

pub(crate) fn first_key(document: &Document) -> Option<&str> {
    document.keys().next().map(String::as_str)
}

pub(crate) fn get_int(val: &Bson) -> Option<i64> {
    match *val {
        Bson::Int32(i) => Some(i as i64),
        Bson::Int64(i) => Some(i),
        Bson::Double(f) if (f - (f as i64 as f64)).abs() <= f64::EPSILON => Some(f as i64),
        _ => None,
    }
}

pub(crate) fn replacement_document_check(replacement: &Document) -> Result<()> {
    match first_key(replacement) {
        Some(s) if !s.starts_with('$') => Ok(()),
        _ => Err(ErrorKind::InvalidArgument {
            message: "replace document must have first key not starting with '$'".to_string(),
        }
        .into()),
    }
}

pub(crate) fn update_document_check(update: &Document) -> Result<()> {
    match first_key(update) {
        Some(s) if s.starts_with('$') => Ok(()),
        _ => Err(ErrorKind::InvalidArgument {
            message: "update document must have first key starting with '$'".to_string(),
        }
        .into()),
    }
}

/// Returns the document's `_id`, inserting a generated one first when absent.
pub(crate) fn get_or_insert_id(document: &mut Document, generator: &dyn IdGenerator) -> Bson {
    match document.get("_id") {
        Some(id) => id.clone(),
        None => {
            let id = generator.generate();
            document.insert("_id", id.clone());
            id
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        bson::{doc, Bson},
        options::ObjectIdGenerator,
    };

    use super::{get_or_insert_id, replacement_document_check, update_document_check};

    #[test]
    fn document_checks() {
        assert!(update_document_check(&doc! { "$set": { "x": 1 } }).is_ok());
        assert!(update_document_check(&doc! { "x": 1 }).is_err());
        assert!(update_document_check(&doc! {}).is_err());

        assert!(replacement_document_check(&doc! { "x": 1 }).is_ok());
        assert!(replacement_document_check(&doc! { "$set": { "x": 1 } }).is_err());
        assert!(replacement_document_check(&doc! {}).is_err());
    }

    #[test]
    fn id_population() {
        let mut with_id = doc! { "_id": 12, "x": 1 };
        assert_eq!(
            get_or_insert_id(&mut with_id, &ObjectIdGenerator),
            Bson::Int32(12)
        );

        let mut without_id = doc! { "x": 1 };
        let id = get_or_insert_id(&mut without_id, &ObjectIdGenerator);
        assert_eq!(without_id.get("_id"), Some(&id));
        assert!(matches!(id, Bson::ObjectId(_)));
    }
}
