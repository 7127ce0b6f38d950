//! Literal SQL generation.
//!
//! Produces self-contained SQL with every value inlined, for logging,
//! dry runs and replayable scripts. Nothing here is ever bound as a
//! parameter, so correctness rests on [`format_value`]:
//!
//! | value                 | rendered as                    |
//! |-----------------------|--------------------------------|
//! | text                  | `N'...'`, each `'` doubled     |
//! | date/time             | `N'YYYY-MM-DD HH:MM:SS'`       |
//! | null, NaN             | `NULL`                         |
//! | integer, float        | decimal text                   |
//! | boolean               | `1` / `0`                      |
//!
//! `DELETE` scripts end with `;`, the other shapes do not.

use crate::error::Result;
use crate::record::Record;
use crate::statement::{require_condition, require_fields};
use crate::value::{DATETIME_FORMAT, Value};

/// Renders a single value as an SQL literal.
///
/// # Examples
///
/// ```
/// use recordsql_core::{Value, format_value};
///
/// assert_eq!(format_value(&Value::from("O'Brien")), "N'O''Brien'");
/// assert_eq!(format_value(&Value::from(30)), "30");
/// assert_eq!(format_value(&Value::from(f64::NAN)), "NULL");
/// ```
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => u8::from(*b).to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Text(s) => quote_text(s),
        Value::DateTime(dt) => format!("N'{}'", dt.format(DATETIME_FORMAT)),
    }
}

/// Wraps text in `N'...'`, doubling embedded single quotes.
pub fn quote_text(text: &str) -> String {
    format!("N'{}'", text.replace('\'', "''"))
}

// Whole floats keep a trailing `.0` so they stay REAL when replayed.
// Infinities have no portable literal.
fn format_float(f: f64) -> String {
    if !f.is_finite() {
        "NULL".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

fn literal_pairs(record: &Record, separator: &str) -> String {
    record
        .iter()
        .map(|(key, value)| format!("{key} = {}", format_value(value)))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Generates `INSERT INTO table (k1, k2) VALUES (v1, v2)` with values inlined.
///
/// # Errors
///
/// Returns [`StatementError::EmptyRecord`](crate::StatementError::EmptyRecord)
/// if `record` has no fields.
///
/// # Examples
///
/// ```
/// use recordsql_core::{Record, generate_insert_sql};
///
/// let record = Record::new().with("Name", "O'Brien").with("Age", 30);
/// assert_eq!(
///     generate_insert_sql("Users", &record).unwrap(),
///     "INSERT INTO Users (Name, Age) VALUES (N'O''Brien', 30)"
/// );
/// ```
pub fn generate_insert_sql(table: &str, record: &Record) -> Result<String> {
    require_fields(record, "INSERT", table)?;
    let columns = record.keys().collect::<Vec<_>>().join(", ");
    let values = record
        .iter()
        .map(|(_, value)| format_value(value))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("INSERT INTO {table} ({columns}) VALUES ({values})"))
}

/// Generates `UPDATE table SET k = v, ... WHERE c = v AND ...`.
///
/// # Errors
///
/// Returns `EmptyRecord` for an empty `record` and `EmptyCondition` for an
/// empty `condition`.
pub fn generate_update_sql(table: &str, record: &Record, condition: &Record) -> Result<String> {
    require_fields(record, "UPDATE", table)?;
    require_condition(condition, "UPDATE", table)?;
    Ok(format!(
        "UPDATE {table} SET {} WHERE {}",
        literal_pairs(record, ", "),
        literal_pairs(condition, " AND ")
    ))
}

/// Generates `DELETE FROM table WHERE c = v AND ...;`.
///
/// # Errors
///
/// Returns `EmptyCondition` for an empty `condition`.
///
/// # Examples
///
/// ```
/// use recordsql_core::{Record, generate_delete_sql};
///
/// let condition = Record::new().with("Id", 5);
/// assert_eq!(
///     generate_delete_sql("Users", &condition).unwrap(),
///     "DELETE FROM Users WHERE Id = 5;"
/// );
/// ```
pub fn generate_delete_sql(table: &str, condition: &Record) -> Result<String> {
    require_condition(condition, "DELETE", table)?;
    Ok(format!(
        "DELETE FROM {table} WHERE {};",
        literal_pairs(condition, " AND ")
    ))
}

/// Generates `SELECT * FROM table`, adding `WHERE` only for a non-empty condition.
pub fn generate_select_sql(table: &str, condition: Option<&Record>) -> String {
    match condition {
        Some(condition) if !condition.is_empty() => format!(
            "SELECT * FROM {table} WHERE {}",
            literal_pairs(condition, " AND ")
        ),
        _ => format!("SELECT * FROM {table}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Reverses [`quote_text`].
    fn unquote(literal: &str) -> String {
        literal
            .strip_prefix("N'")
            .and_then(|s| s.strip_suffix('\''))
            .expect("not a quoted literal")
            .replace("''", "'")
    }

    #[test]
    fn test_quotes_round_trip() {
        for original in ["O'Brien", "''", "'lead", "trail'", "a''b'c", "no quotes", ""] {
            let literal = format_value(&Value::from(original));
            assert_eq!(unquote(&literal), original, "literal was {literal}");
        }
    }

    #[test]
    fn test_unicode_text() {
        assert_eq!(format_value(&Value::from("設定檔")), "N'設定檔'");
    }

    #[test]
    fn test_datetime_format() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_milli_opt(9, 3, 7, 450)
            .unwrap();
        assert_eq!(format_value(&Value::from(dt)), "N'2024-01-05 09:03:07'");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(format_value(&Value::Int(-12)), "-12");
        assert_eq!(format_value(&Value::Float(1.5)), "1.5");
        assert_eq!(format_value(&Value::Float(30.0)), "30.0");
        assert_eq!(format_value(&Value::Float(0.1)), "0.1");
        assert_eq!(format_value(&Value::Bool(true)), "1");
        assert_eq!(format_value(&Value::Bool(false)), "0");
    }

    #[test]
    fn test_null_and_nan() {
        assert_eq!(format_value(&Value::Null), "NULL");
        assert_eq!(format_value(&Value::Float(f64::NAN)), "NULL");
        assert_eq!(format_value(&Value::Float(f64::INFINITY)), "NULL");
    }

    #[test]
    fn test_insert() {
        let record = Record::new()
            .with("Name", "O'Brien")
            .with("Age", 30)
            .with("Score", f64::NAN);
        assert_eq!(
            generate_insert_sql("Users", &record).unwrap(),
            "INSERT INTO Users (Name, Age, Score) VALUES (N'O''Brien', 30, NULL)"
        );
    }

    #[test]
    fn test_update_has_no_semicolon() {
        let data = Record::new().with("Name", "Ann").with("Note", None::<String>);
        let cond = Record::new().with("Id", 5).with("Region", "EU");
        assert_eq!(
            generate_update_sql("Users", &data, &cond).unwrap(),
            "UPDATE Users SET Name = N'Ann', Note = NULL WHERE Id = 5 AND Region = N'EU'"
        );
    }

    #[test]
    fn test_delete_has_semicolon() {
        let cond = Record::new().with("Id", 5);
        assert_eq!(
            generate_delete_sql("Users", &cond).unwrap(),
            "DELETE FROM Users WHERE Id = 5;"
        );
    }

    #[test]
    fn test_empty_condition_is_refused() {
        let data = Record::new().with("Name", "Ann");
        assert!(generate_update_sql("Users", &data, &Record::new())
            .unwrap_err()
            .is_warning());
        assert!(generate_delete_sql("Users", &Record::new())
            .unwrap_err()
            .is_warning());
    }

    #[test]
    fn test_select() {
        assert_eq!(generate_select_sql("Users", None), "SELECT * FROM Users");
        let cond = Record::new().with("Name", "O'Brien");
        assert_eq!(
            generate_select_sql("Users", Some(&cond)),
            "SELECT * FROM Users WHERE Name = N'O''Brien'"
        );
    }
}
