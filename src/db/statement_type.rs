/// Statement classification used by front ends to pick between `execute`
/// and `fetch`. The access layer itself never inspects SQL.

/// Represents different SQL statement types for routing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatementType {
    /// SELECT, WITH, VALUES, PRAGMA or EXPLAIN
    Query,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// CREATE statement
    Create,
    /// DROP statement
    Drop,
    /// ALTER statement
    Alter,
    /// BEGIN/COMMIT/ROLLBACK transaction commands
    Transaction,
    /// Other statement types
    Other,
}

impl StatementType {
    /// Determines the statement type from the first keyword of `sql`,
    /// skipping leading comments and parentheses.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = keywords(sql).next().unwrap_or_default();

        match keyword.as_str() {
            "SELECT" | "WITH" | "VALUES" | "PRAGMA" | "EXPLAIN" => StatementType::Query,
            "INSERT" | "REPLACE" => StatementType::Insert,
            "UPDATE" => StatementType::Update,
            "DELETE" => StatementType::Delete,
            "CREATE" => StatementType::Create,
            "DROP" => StatementType::Drop,
            "ALTER" => StatementType::Alter,
            "BEGIN" | "COMMIT" | "END" | "ROLLBACK" | "SAVEPOINT" | "RELEASE" => {
                StatementType::Transaction
            }
            _ => StatementType::Other,
        }
    }

    /// Whether statements of this type are expected to return rows.
    pub fn produces_rows(self) -> bool {
        self == StatementType::Query
    }

    /// Whether `sql` is expected to return rows: a query, or an INSERT,
    /// UPDATE or DELETE with a RETURNING clause.
    pub fn returns_rows(sql: &str) -> bool {
        match StatementType::from_sql(sql) {
            StatementType::Insert | StatementType::Update | StatementType::Delete => {
                keywords(sql).any(|word| word == "RETURNING")
            }
            other => other.produces_rows(),
        }
    }
}

/// Upper-cased bare words of `sql`, outside comments, string literals and
/// quoted identifiers.
fn keywords(sql: &str) -> impl Iterator<Item = String> + '_ {
    let mut rest = sql;
    std::iter::from_fn(move || loop {
        let text = rest.trim_start();
        let first = text.chars().next()?;

        rest = if text.starts_with("--") {
            match text.find('\n') {
                Some(end) => &text[end + 1..],
                None => "",
            }
        } else if text.starts_with("/*") {
            match text[2..].find("*/") {
                Some(end) => &text[end + 4..],
                None => "",
            }
        } else if let Some(close) = closing_quote(first) {
            match text[1..].find(close) {
                Some(end) => &text[end + 2..],
                None => "",
            }
        } else if first.is_alphabetic() || first == '_' {
            let end = text
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(text.len());
            rest = &text[end..];
            return Some(text[..end].to_uppercase());
        } else {
            &text[first.len_utf8()..]
        };
    })
}

fn closing_quote(open: char) -> Option<char> {
    match open {
        '\'' => Some('\''),
        '"' => Some('"'),
        '`' => Some('`'),
        '[' => Some(']'),
        _ => None,
    }
}
