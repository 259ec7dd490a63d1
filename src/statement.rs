use crate::error::DbError;

/// Kind of write statement accepted by `run`, keyed off the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Effect is the last inserted identifier.
    Insert,
    /// Effect is the number of rows affected.
    Update,
    /// Effect is the number of rows removed.
    Delete,
}

impl StatementKind {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        }
    }

    /// Classify a statement by its first keyword, ignoring case and
    /// surrounding whitespace.
    ///
    /// # Errors
    /// Returns `DbError::UnsupportedStatement` for any other leading keyword.
    pub fn classify(sql: &str) -> Result<Self, DbError> {
        let keyword = sql
            .trim()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default();

        if keyword.eq_ignore_ascii_case("insert") {
            Ok(StatementKind::Insert)
        } else if keyword.eq_ignore_ascii_case("update") {
            Ok(StatementKind::Update)
        } else if keyword.eq_ignore_ascii_case("delete") {
            Ok(StatementKind::Delete)
        } else {
            Err(DbError::UnsupportedStatement(format!(
                "expected INSERT, UPDATE or DELETE, found {:?}",
                keyword
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_keyword_is_case_insensitive_and_trimmed() {
        assert_eq!(
            StatementKind::classify("  insert INTO region (name) VALUES ($1)").unwrap(),
            StatementKind::Insert
        );
        assert_eq!(
            StatementKind::classify("\n\tUpdate region SET name = $1").unwrap(),
            StatementKind::Update
        );
        assert_eq!(
            StatementKind::classify("DELETE FROM region WHERE id = $1 ").unwrap(),
            StatementKind::Delete
        );
    }

    #[test]
    fn other_statements_are_rejected() {
        for sql in ["SELECT 1", "", "   ", "CREATE TABLE t (id int)", "inserted"] {
            assert!(
                matches!(
                    StatementKind::classify(sql),
                    Err(DbError::UnsupportedStatement(_))
                ),
                "{sql:?} should be rejected"
            );
        }
    }
}
