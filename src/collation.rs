//! Contains the `Collation` type used to configure language-specific string comparison rules.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use typed_builder::TypedBuilder;

/// A collation configuration that allows users to specify language-specific rules for string
/// comparison, such as rules for letter case and accent marks.
///
/// See the documentation [here](https://www.mongodb.com/docs/manual/reference/collation/) for more
/// information.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, PartialEq, TypedBuilder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(default, setter(into)))]
#[non_exhaustive]
pub struct Collation {
    /// The ICU locale.
    #[builder(!default)]
    pub locale: String,

    /// The level of comparison to perform (1-5); corresponds to ICU comparison levels.
    pub strength: Option<u32>,

    /// Whether to include a separate level for case differences.
    pub case_level: Option<bool>,

    /// Whether to compare numeric strings as numbers or as strings.
    pub numeric_ordering: Option<bool>,

    /// Whether strings with diacritics sort from the back of the string.
    pub backwards: Option<bool>,
}

impl Collation {
    /// A collation for the given ICU locale with all other fields defaulted.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            ..Default::default()
        }
    }
}
