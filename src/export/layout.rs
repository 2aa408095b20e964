//! On-disk layout of a backup
//!
//! ```text
//! <root>/<database>-<YYYY-MM-DD>/<container>/<document id>.json
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{DataError, Result};

use super::streaming::Document;

/// Name of the backup folder for one run
pub fn backup_dir_name(database: &str, date: NaiveDate) -> String {
    format!("{database}-{}", date.format("%Y-%m-%d"))
}

/// Full path of the backup folder for one run
pub fn backup_dir(root: &Path, database: &str, date: NaiveDate) -> Result<PathBuf> {
    let name = backup_dir_name(checked_component("database", database)?, date);
    Ok(root.join(name))
}

/// Path of the file a document is written to
pub fn document_path(container_dir: &Path, id: &str) -> Result<PathBuf> {
    let id = checked_component("document", id)?;
    Ok(container_dir.join(format!("{id}.json")))
}

/// Make sure an id names exactly one entry inside its parent folder.
///
/// Ids are used verbatim. Anything that would escape the parent or address
/// a different folder is refused rather than rewritten.
pub fn checked_component<'a>(kind: &'static str, name: &'a str) -> Result<&'a str> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if unsafe_name {
        return Err(DataError::UnsafeName {
            kind,
            name: name.to_string(),
        }
        .into());
    }

    Ok(name)
}

/// Read a document's `id` as text.
///
/// Strings are taken as-is, numbers and booleans use their JSON text.
/// `null`, objects, arrays and a missing field are errors.
pub fn document_id(doc: &Document, container: &str) -> Result<String> {
    match doc.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        // Booleans render as `true`/`false`, not the capitalized `True`/`False`.
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(value.to_string()),
        None | Some(Value::Null) => Err(DataError::MissingId {
            container: container.to_string(),
        }
        .into()),
        Some(other) => Err(DataError::InvalidId {
            container: container.to_string(),
            found: other.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DumpError;
    use crate::export::streaming::testing::doc;
    use serde_json::json;

    #[test]
    fn test_backup_dir_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(backup_dir_name("shop", date), "shop-2024-03-07");
    }

    #[test]
    fn test_backup_dir_rejects_unsafe_database() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert!(backup_dir(Path::new("."), "../shop", date).is_err());
        assert_eq!(
            backup_dir(Path::new("out"), "shop", date).unwrap(),
            PathBuf::from("out/shop-2024-03-07")
        );
    }

    #[test]
    fn test_document_id_string() {
        let d = doc(json!({ "id": "order-1", "total": 3 }));
        assert_eq!(document_id(&d, "orders").unwrap(), "order-1");
    }

    #[test]
    fn test_document_id_scalars() {
        assert_eq!(document_id(&doc(json!({ "id": 42 })), "c").unwrap(), "42");
        assert_eq!(document_id(&doc(json!({ "id": true })), "c").unwrap(), "true");
    }

    #[test]
    fn test_document_id_missing_or_null() {
        for d in [doc(json!({ "name": "x" })), doc(json!({ "id": null }))] {
            let err = document_id(&d, "orders").unwrap_err();
            assert!(matches!(err, DumpError::Data(DataError::MissingId { .. })));
        }
    }

    #[test]
    fn test_document_id_structured() {
        let err = document_id(&doc(json!({ "id": { "a": 1 } })), "orders").unwrap_err();
        assert!(matches!(err, DumpError::Data(DataError::InvalidId { .. })));
    }

    #[test]
    fn test_checked_component() {
        assert!(checked_component("document", "a b.c-d").is_ok());
        assert!(checked_component("document", "...").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b", "a\0b"] {
            assert!(checked_component("document", bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn test_document_path_keeps_id_verbatim() {
        let path = document_path(Path::new("backup/orders"), "Order #7").unwrap();
        assert_eq!(path, PathBuf::from("backup/orders/Order #7.json"));
    }
}
