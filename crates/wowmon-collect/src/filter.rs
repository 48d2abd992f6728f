//! Shared exclusion predicate for "real player" populations.
//!
//! Rows that look like test, staff or throwaway characters are filtered at
//! the query level: deleted characters, characters created within the last
//! 24 hours, and names containing one of [`EXCLUDED_NAME_PATTERNS`].

/// Substrings that mark a character name as non-player data.
pub const EXCLUDED_NAME_PATTERNS: &[&str] =
    &["test", "admin", "gm", "dev", "temp", "demo", "example"];

/// SQL condition selecting real players from the `characters` table.
///
/// `alias` qualifies the column names when the table is aliased in a join.
pub fn real_population(alias: Option<&str>) -> String {
    let col = |name: &str| match alias {
        Some(alias) => format!("{alias}.{name}"),
        None => name.to_string(),
    };
    let deleted = col("deleteDate");
    let created = col("creation_date");
    let name = col("name");

    let mut clauses = vec![
        format!("({deleted} IS NULL OR {deleted} = 0)"),
        format!("({created} IS NULL OR {created} < DATE_SUB(NOW(), INTERVAL 24 HOUR))"),
    ];
    clauses.extend(
        EXCLUDED_NAME_PATTERNS
            .iter()
            .map(|pattern| format!("{name} NOT LIKE '%{pattern}%'")),
    );
    clauses.join(" AND ")
}

/// Whether `sql` carries the complete exclusion predicate, aliased or not.
#[cfg(test)]
pub(crate) fn is_filtered(sql: &str) -> bool {
    sql.contains("deleteDate IS NULL")
        && sql.contains("INTERVAL 24 HOUR")
        && EXCLUDED_NAME_PATTERNS
            .iter()
            .all(|pattern| sql.contains(&format!("NOT LIKE '%{pattern}%'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unaliased_predicate() {
        let sql = real_population(None);
        assert!(sql.starts_with("(deleteDate IS NULL OR deleteDate = 0) AND "));
        assert!(sql.contains("creation_date < DATE_SUB(NOW(), INTERVAL 24 HOUR)"));
        for pattern in EXCLUDED_NAME_PATTERNS {
            assert!(sql.contains(&format!("name NOT LIKE '%{pattern}%'")), "{pattern}");
        }
    }

    #[test]
    fn aliased_predicate_qualifies_every_column() {
        let sql = real_population(Some("c"));
        assert!(sql.contains("c.deleteDate"));
        assert!(sql.contains("c.creation_date"));
        assert!(sql.contains("c.name NOT LIKE '%example%'"));
        assert!(!sql.contains(" name NOT LIKE"));
    }

    #[test]
    fn is_filtered_needs_every_clause() {
        assert!(is_filtered(&real_population(None)));
        assert!(is_filtered(&real_population(Some("c"))));
        assert!(!is_filtered("SELECT COUNT(*) FROM characters WHERE online = 1"));
        let partial = real_population(None).replace(" AND name NOT LIKE '%demo%'", "");
        assert!(!is_filtered(&partial));
    }
}
