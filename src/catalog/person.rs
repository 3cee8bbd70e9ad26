//! Contributors (authors, editors, translators)

use serde::Serialize;

use super::aggregate::{MalformedRow, required, required_str};
use super::names;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub person_id: i64,
    pub last_name: String,
    pub first_and_middle_names: Option<String>,
    pub titles: Option<String>,
    pub credentials: Option<String>,
    pub is_organization: bool,
    pub sortable_name: Option<String>,
    pub display_name: String,
    pub display_name_short: String,
    pub notes: Option<String>,
}

impl Person {
    /// Build a person from its stored attributes, deriving both display names.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        person_id: i64,
        last_name: String,
        first_and_middle_names: Option<String>,
        titles: Option<String>,
        credentials: Option<String>,
        is_organization: bool,
        sortable_name: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let display_name = names::display_name(
            titles.as_deref(),
            first_and_middle_names.as_deref(),
            &last_name,
            credentials.as_deref(),
        );
        let display_name_short =
            names::display_name_short(first_and_middle_names.as_deref(), &last_name);

        Self {
            person_id,
            last_name,
            first_and_middle_names,
            titles,
            credentials,
            is_organization,
            sortable_name,
            display_name,
            display_name_short,
            notes,
        }
    }

    pub fn from_columns(cols: &PersonColumns<'_>) -> Result<Self, MalformedRow> {
        Ok(Self::new(
            required(&cols.person_id, "person_id")?,
            required_str(cols.last_name, "last_name")?,
            cols.first_and_middle_names.clone(),
            cols.titles.clone(),
            cols.credentials.clone(),
            cols.is_organization.unwrap_or(false),
            cols.sortable_name.clone(),
            cols.notes.clone(),
        ))
    }
}

/// Borrowed view over one contributor's prefixed columns in a joined row
/// (`author_*`, `editor_*`, `translator_*`).
pub struct PersonColumns<'a> {
    pub person_id: Option<i64>,
    pub last_name: &'a Option<String>,
    pub first_and_middle_names: &'a Option<String>,
    pub titles: &'a Option<String>,
    pub credentials: &'a Option<String>,
    pub is_organization: Option<bool>,
    pub sortable_name: &'a Option<String>,
    pub notes: &'a Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_person_display_names() {
        let person = Person::new(
            1,
            "Smith".into(),
            Some("John".into()),
            Some("Dr.".into()),
            Some("PhD".into()),
            false,
            Some("Smith, John".into()),
            None,
        );
        assert_eq!(person.display_name, "Dr. John Smith, PhD");
        assert_eq!(person.display_name_short, "J. Smith");
    }

    #[test]
    fn test_organization_uses_last_name() {
        let person = Person::new(2, "Acme Press".into(), None, None, None, true, None, None);
        assert_eq!(person.display_name, "Acme Press");
        assert_eq!(person.display_name_short, "Acme Press");
    }

    #[test]
    fn test_person_json_shape() {
        let person = Person::new(3, "Doe".into(), Some("Jane".into()), None, None, false, None, None);
        let json = serde_json::to_value(&person).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "personId",
                "lastName",
                "firstAndMiddleNames",
                "titles",
                "credentials",
                "isOrganization",
                "sortableName",
                "displayName",
                "displayNameShort",
                "notes",
            ]
        );
        assert_eq!(json["titles"], serde_json::Value::Null);
    }

    #[test]
    fn test_from_columns_requires_last_name() {
        let none = None;
        let cols = PersonColumns {
            person_id: Some(4),
            last_name: &none,
            first_and_middle_names: &none,
            titles: &none,
            credentials: &none,
            is_organization: None,
            sortable_name: &none,
            notes: &none,
        };
        assert_eq!(Person::from_columns(&cols).unwrap_err().column, "last_name");
    }
}
