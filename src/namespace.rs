use std::fmt;

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

/// A MongoDB namespace, consisting of a database name and a collection name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Namespace {
    /// The name of the database associated with this namespace.
    pub db: String,

    /// The name of the collection this namespace corresponds to.
    pub coll: String,
}

impl Namespace {
    /// Creates a new `Namespace` from the given database and collection names.
    pub fn new(db: impl Into<String>, coll: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            coll: coll.into(),
        }
    }

    pub(crate) fn from_str(s: &str) -> Option<Self> {
        let mut parts = s.splitn(2, '.');
        let (db, coll) = (parts.next()?, parts.next()?);
        if db.is_empty() || coll.is_empty() {
            return None;
        }
        Some(Self::new(db, coll))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}.{}", self.db, self.coll)
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s)
            .ok_or_else(|| D::Error::custom("namespace must be of the form <db>.<coll>"))
    }
}

#[cfg(test)]
mod test {
    use super::Namespace;

    #[test]
    fn parse_and_display() {
        let ns = Namespace::from_str("db.coll.with.dots").unwrap();
        assert_eq!(ns.db, "db");
        assert_eq!(ns.coll, "coll.with.dots");
        assert_eq!(ns.to_string(), "db.coll.with.dots");

        assert!(Namespace::from_str("missingcoll").is_none());
        assert!(Namespace::from_str(".coll").is_none());
    }
}
