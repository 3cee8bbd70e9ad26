//! Display-name and title formatting shared by the entity builders and the
//! write side.

/// Leading articles dropped from sortable titles.
const ARTICLES: &[&str] = &["The ", "A ", "An "];

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// First character of `name` followed by a period ("John" -> "J.").
fn initial(name: &str) -> String {
    name.chars().next().map(|c| format!("{c}.")).unwrap_or_default()
}

/// "Titles FirstNames LastName, Credentials"
///
/// Without first names (organizations) the titles are dropped and only the
/// last name remains, still followed by any credentials.
pub fn display_name(
    titles: Option<&str>,
    first_and_middle_names: Option<&str>,
    last_name: &str,
    credentials: Option<&str>,
) -> String {
    let mut name = match non_empty(first_and_middle_names) {
        Some(first) => match non_empty(titles) {
            Some(titles) => format!("{titles} {first} {last_name}"),
            None => format!("{first} {last_name}"),
        },
        None => last_name.to_string(),
    };
    if let Some(credentials) = non_empty(credentials) {
        name.push_str(", ");
        name.push_str(credentials);
    }
    name
}

/// "F. LastName", or just the last name when there are no first names.
pub fn display_name_short(first_and_middle_names: Option<&str>, last_name: &str) -> String {
    match non_empty(first_and_middle_names) {
        Some(first) => format!("{} {last_name}", initial(first)),
        None => last_name.to_string(),
    }
}

/// "LastName, FirstNames" for ordering persons.
pub fn sortable_name(last_name: &str, first_and_middle_names: Option<&str>) -> String {
    match non_empty(first_and_middle_names) {
        Some(first) => format!("{last_name}, {first}"),
        None => last_name.to_string(),
    }
}

/// Author name as shown in a book stub.
///
/// Abbreviated form: "J. Smith". Full form: "Dr. John Smith, PhD".
pub fn format_author(
    last_name: &str,
    first_and_middle_names: Option<&str>,
    titles: Option<&str>,
    credentials: Option<&str>,
    full_text: bool,
) -> String {
    let Some(first) = non_empty(first_and_middle_names) else {
        return last_name.to_string();
    };

    if !full_text {
        return format!("{} {last_name}", initial(first));
    }

    let mut name = format!("{first} {last_name}");
    if let Some(titles) = non_empty(titles) {
        name = format!("{titles} {name}");
    }
    if let Some(credentials) = non_empty(credentials) {
        name = format!("{name}, {credentials}");
    }
    name
}

/// Join names as prose: "A", "A and B", "A, B, and C".
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let mut joined = String::new();
            for name in init {
                joined.push_str(name.as_ref());
                joined.push_str(", ");
            }
            joined.push_str("and ");
            joined.push_str(last.as_ref());
            joined
        }
    }
}

/// "Title: Subtitle", or the bare title.
pub fn full_title(title: &str, subtitle: Option<&str>) -> String {
    match non_empty(subtitle) {
        Some(subtitle) => format!("{title}: {subtitle}"),
        None => title.to_string(),
    }
}

/// Full title with a leading English article removed.
pub fn sortable_title(full_title: &str) -> String {
    ARTICLES
        .iter()
        .find_map(|article| full_title.strip_prefix(article))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(full_title)
        .to_string()
}

/// Trim free text and map blank input to `None`.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_name() {
        assert_eq!(
            display_name(Some("Dr."), Some("John Henry"), "Smith", Some("PhD")),
            "Dr. John Henry Smith, PhD"
        );
        assert_eq!(display_name(None, Some("Jane"), "Doe", None), "Jane Doe");
        assert_eq!(display_name(Some("Rev."), None, "Acme Press", None), "Acme Press");
        assert_eq!(display_name(None, Some(""), "Acme", Some("Inc.")), "Acme, Inc.");
    }

    #[test]
    fn test_display_name_short() {
        assert_eq!(display_name_short(Some("John"), "Smith"), "J. Smith");
        assert_eq!(display_name_short(None, "Acme Press"), "Acme Press");
        assert_eq!(display_name_short(Some("Émile"), "Zola"), "É. Zola");
    }

    #[test]
    fn test_format_author_abbreviated() {
        assert_eq!(
            format_author("Smith", Some("John"), Some("Dr."), Some("PhD"), false),
            "J. Smith"
        );
    }

    #[test]
    fn test_format_author_full_text() {
        assert_eq!(
            format_author("Smith", Some("John"), Some("Dr."), Some("PhD"), true),
            "Dr. John Smith, PhD"
        );
        assert_eq!(format_author("Smith", Some("John"), None, None, true), "John Smith");
        assert_eq!(format_author("Acme", None, Some("Dr."), None, true), "Acme");
    }

    #[test]
    fn test_join_names() {
        let empty: [&str; 0] = [];
        assert_eq!(join_names(&empty), "");
        assert_eq!(join_names(&["A"]), "A");
        assert_eq!(join_names(&["A", "B"]), "A and B");
        assert_eq!(join_names(&["A", "B", "C"]), "A, B, and C");
    }

    #[test]
    fn test_titles() {
        assert_eq!(full_title("Dune", Some("Messiah")), "Dune: Messiah");
        assert_eq!(full_title("Dune", Some("")), "Dune");
        assert_eq!(sortable_title("The Hobbit"), "Hobbit");
        assert_eq!(sortable_title("An Essay"), "Essay");
        assert_eq!(sortable_title("Theory"), "Theory");
        assert_eq!(sortable_title("A "), "A ");
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(Some("  ".into())), None);
        assert_eq!(blank_to_none(Some(" note ".into())), Some("note".into()));
        assert_eq!(blank_to_none(None), None);
    }
}
