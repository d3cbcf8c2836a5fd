//! SCIM filter recognition.
//!
//! Exactly one predicate form is recognized: equality on `userName`. Any
//! other filter expression degrades to "no filtering" instead of being
//! rejected, which is what deployed IdPs expect from minimal SCIM servers.

use fedgate_db::UserQuery;

/// Parse a user list filter into a store query.
#[must_use]
pub fn parse_user_filter(filter: Option<&str>) -> UserQuery {
    let Some(filter) = filter else {
        return UserQuery::All;
    };

    let mut parts = filter.splitn(2, " eq ");
    let (Some(attr), Some(raw_value)) = (parts.next(), parts.next()) else {
        return UserQuery::All;
    };

    if !attr.trim().eq_ignore_ascii_case("userName") {
        return UserQuery::All;
    }

    let value = raw_value.trim().trim_matches(|c| c == '"' || c == '\'');
    if value.is_empty() {
        return UserQuery::All;
    }

    UserQuery::UserNameEq(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_eq_is_recognized() {
        let query = parse_user_filter(Some(r#"userName eq "jdoe@example.com""#));
        assert_eq!(query, UserQuery::UserNameEq("jdoe@example.com".to_string()));
    }

    #[test]
    fn test_attribute_match_is_case_insensitive() {
        let query = parse_user_filter(Some(r#"USERNAME eq "jdoe""#));
        assert_eq!(query, UserQuery::UserNameEq("jdoe".to_string()));
    }

    #[test]
    fn test_value_is_verbatim() {
        // The compared value keeps its case; only the quotes are trimmed.
        let query = parse_user_filter(Some(r#"userName eq "JDoe""#));
        assert_eq!(query, UserQuery::UserNameEq("JDoe".to_string()));
    }

    #[test]
    fn test_single_quotes_accepted() {
        let query = parse_user_filter(Some("userName eq 'jdoe'"));
        assert_eq!(query, UserQuery::UserNameEq("jdoe".to_string()));
    }

    #[test]
    fn test_unrecognized_filters_are_ignored() {
        assert_eq!(parse_user_filter(None), UserQuery::All);
        assert_eq!(parse_user_filter(Some("")), UserQuery::All);
        assert_eq!(
            parse_user_filter(Some(r#"emails co "example""#)),
            UserQuery::All
        );
        assert_eq!(
            parse_user_filter(Some(r#"displayName eq "X""#)),
            UserQuery::All
        );
        // Unsupported operator: not an error, just no filtering.
        assert_eq!(parse_user_filter(Some("userName sw \"j\"")), UserQuery::All);
        // Empty comparison value.
        assert_eq!(parse_user_filter(Some(r#"userName eq """#)), UserQuery::All);
    }
}
