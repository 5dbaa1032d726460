//! Identifier and literal rendering.
//!
//! A precompiler turns names and values into dialect-safe SQL tokens. The
//! default methods implement ANSI rules (double-quoted identifiers, doubled
//! single quotes in strings); dialects override only what differs.

use chrono::NaiveDateTime;

use crate::value::{SqlValue, TIMESTAMP_FORMAT};

/// Quote characters recognized (and stripped) on already-quoted segments.
const QUOTE_PAIRS: [(char, char); 3] = [('"', '"'), ('`', '`'), ('[', ']')];

/// Dialect-specific rendering of identifiers, aliases and literal values.
pub trait Precompiler: Send + Sync {
    /// Returns the opening and closing identifier quote characters.
    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    /// Quotes a single identifier segment.
    ///
    /// Surrounding quotes of any known style are stripped first and embedded
    /// closing quotes are doubled. `*` is emitted unquoted.
    fn quote_segment(&self, segment: &str) -> String {
        let segment = segment.trim();
        if segment == "*" {
            return String::from("*");
        }
        let bare = QUOTE_PAIRS
            .iter()
            .find_map(|(open, close)| {
                segment
                    .strip_prefix(*open)
                    .and_then(|s| s.strip_suffix(*close))
            })
            .unwrap_or(segment);
        let (open, close) = self.identifier_quotes();
        let escaped = bare.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// Quotes an identifier, splitting `schema.table.column` and quoting each
    /// segment independently.
    fn prepare_identifier(&self, name: &str) -> String {
        name.split('.')
            .map(|segment| self.quote_segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes a result-column or table alias.
    fn prepare_alias(&self, alias: &str) -> String {
        self.quote_segment(alias)
    }

    /// Keyword placed between a table and its alias.
    fn table_alias_keyword(&self) -> &'static str {
        " AS "
    }

    /// Renders a literal value.
    fn prepare_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => String::from("NULL"),
            SqlValue::Bool(b) => String::from(self.boolean_literal(*b)),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Float(f) => self.float_literal(*f),
            SqlValue::Text(s) => self.string_literal(s),
            SqlValue::Blob(b) => self.blob_literal(b),
            SqlValue::Timestamp(ts) => self.timestamp_literal(ts),
            SqlValue::Raw(sql) => sql.clone(),
        }
    }

    /// Renders a boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// Renders a float in canonical form; non-finite values become NULL.
    fn float_literal(&self, value: f64) -> String {
        if value.is_finite() {
            format!("{value:?}")
        } else {
            String::from("NULL")
        }
    }

    /// Quotes and escapes a string literal.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Renders a binary literal.
    fn blob_literal(&self, value: &[u8]) -> String {
        format!("X'{}'", hex(value))
    }

    /// Renders a timestamp literal.
    fn timestamp_literal(&self, value: &NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", value.format(TIMESTAMP_FORMAT))
    }
}

/// Upper-case hex encoding used by blob literals.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(8, 5, 9)
            .unwrap()
    }

    #[test]
    fn test_identifier_quoting_per_dialect() {
        assert_eq!(Dialect::Standard.sql().prepare_identifier("users"), "\"users\"");
        assert_eq!(Dialect::MySql.sql().prepare_identifier("users"), "`users`");
        assert_eq!(Dialect::MsSql.sql().prepare_identifier("users"), "[users]");
        assert_eq!(Dialect::PostgreSql.sql().prepare_identifier("users"), "\"users\"");
    }

    #[test]
    fn test_compound_identifier_is_split() {
        let pc = Dialect::Standard.sql();
        assert_eq!(
            pc.prepare_identifier("app.users.id"),
            "\"app\".\"users\".\"id\""
        );
        assert_eq!(pc.prepare_identifier("t0.*"), "\"t0\".*");
        assert_eq!(
            Dialect::MsSql.sql().prepare_identifier("dbo.orders"),
            "[dbo].[orders]"
        );
    }

    #[test]
    fn test_already_quoted_segments_are_not_double_quoted() {
        let pc = Dialect::Standard.sql();
        assert_eq!(pc.prepare_identifier("\"users\".`id`"), "\"users\".\"id\"");
        assert_eq!(Dialect::MsSql.sql().prepare_identifier("[a]"), "[a]");
    }

    #[test]
    fn test_embedded_quote_is_escaped() {
        assert_eq!(
            Dialect::Standard.sql().prepare_alias("we\"ird"),
            "\"we\"\"ird\""
        );
        assert_eq!(Dialect::MsSql.sql().prepare_alias("a]b"), "[a]]b]");
        assert_eq!(Dialect::MySql.sql().prepare_alias("a`b"), "`a``b`");
    }

    #[test]
    fn test_alias_is_not_split() {
        assert_eq!(
            Dialect::Standard.sql().prepare_alias("total.sum"),
            "\"total.sum\""
        );
    }

    #[test]
    fn test_prepare_value_standard() {
        let pc = Dialect::Standard.sql();
        assert_eq!(pc.prepare_value(&SqlValue::Null), "NULL");
        assert_eq!(pc.prepare_value(&SqlValue::Int(-7)), "-7");
        assert_eq!(pc.prepare_value(&SqlValue::Float(2.0)), "2.0");
        assert_eq!(pc.prepare_value(&SqlValue::Float(f64::NAN)), "NULL");
        assert_eq!(pc.prepare_value(&SqlValue::Bool(true)), "TRUE");
        assert_eq!(pc.prepare_value(&SqlValue::Text("O'Brien".into())), "'O''Brien'");
        assert_eq!(pc.prepare_value(&SqlValue::Blob(vec![0xDE, 0xAD])), "X'DEAD'");
        assert_eq!(
            pc.prepare_value(&SqlValue::Timestamp(ts())),
            "TIMESTAMP '2024-01-31 08:05:09'"
        );
        assert_eq!(pc.prepare_value(&SqlValue::Raw("NOW()".into())), "NOW()");
    }

    #[test]
    fn test_boolean_literals_per_dialect() {
        assert_eq!(Dialect::MsSql.sql().prepare_value(&SqlValue::Bool(true)), "1");
        assert_eq!(Dialect::Oracle.sql().prepare_value(&SqlValue::Bool(false)), "0");
        assert_eq!(Dialect::Db2.sql().prepare_value(&SqlValue::Bool(true)), "1");
        assert_eq!(
            Dialect::PostgreSql.sql().prepare_value(&SqlValue::Bool(false)),
            "FALSE"
        );
    }

    #[test]
    fn test_string_escaping_per_dialect() {
        let text = SqlValue::Text(String::from("it's a \\ test"));
        assert_eq!(
            Dialect::MySql.sql().prepare_value(&text),
            "'it\\'s a \\\\ test'"
        );
        assert_eq!(
            Dialect::Oracle.sql().prepare_value(&text),
            "'it''s a \\ test'"
        );
    }

    #[test]
    fn test_injection_attempt_stays_inside_literal() {
        let malicious = SqlValue::Text(String::from("'; DROP TABLE users; --"));
        assert_eq!(
            Dialect::Standard.sql().prepare_value(&malicious),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn test_blob_and_timestamp_literals_per_dialect() {
        let blob = SqlValue::Blob(vec![0x01, 0xAB]);
        assert_eq!(Dialect::PostgreSql.sql().prepare_value(&blob), "'\\x01AB'::bytea");
        assert_eq!(Dialect::MsSql.sql().prepare_value(&blob), "0x01AB");
        assert_eq!(Dialect::Oracle.sql().prepare_value(&blob), "HEXTORAW('01AB')");
        assert_eq!(Dialect::Db2.sql().prepare_value(&blob), "BX'01AB'");

        let stamp = SqlValue::Timestamp(ts());
        assert_eq!(
            Dialect::Oracle.sql().prepare_value(&stamp),
            "TO_TIMESTAMP('2024-01-31 08:05:09', 'YYYY-MM-DD HH24:MI:SS')"
        );
        assert_eq!(
            Dialect::Sqlite.sql().prepare_value(&stamp),
            "'2024-01-31 08:05:09'"
        );
        assert_eq!(
            Dialect::MsSql.sql().prepare_value(&stamp),
            "'2024-01-31T08:05:09'"
        );
    }
}
