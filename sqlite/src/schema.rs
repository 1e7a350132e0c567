//! SQL generation for the configured stock table.
//!
//! Every statement is built from validated identifiers, which are
//! double-quoted so that column names colliding with SQL keywords (`group`,
//! `order`, ...) still work. Values never appear in generated SQL; they are
//! bound to numbered placeholders (`?1`, `?2`, ...).

use stock_store_core::{SchemaConfig, is_identifier, is_type_token};

use crate::error::{Result, SqliteError};

/// Validates that a table or column name is a plain identifier.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(SqliteError::InvalidIdentifier(name.to_string()))
    }
}

fn validate_type(column: &str, sql_type: &str) -> Result<()> {
    if is_type_token(sql_type) {
        Ok(())
    } else {
        Err(SqliteError::InvalidColumnType {
            column: column.to_string(),
            sql_type: sql_type.to_string(),
        })
    }
}

/// Quotes a validated identifier.
pub(crate) fn quote(name: &str) -> String {
    format!("\"{name}\"")
}

fn quoted_columns(columns: &[&str]) -> Result<Vec<String>> {
    columns
        .iter()
        .map(|c| validate_identifier(c).map(|_| quote(c)))
        .collect()
}

/// Generates the `CREATE TABLE IF NOT EXISTS` statement for `schema`, one
/// column per entry in document order.
///
/// # Errors
///
/// Returns [`SqliteError::InvalidIdentifier`] or
/// [`SqliteError::InvalidColumnType`] for the first invalid entry.
pub fn generate_create_sql(table: &str, schema: &SchemaConfig) -> Result<String> {
    validate_identifier(table)?;

    let mut definitions = Vec::with_capacity(schema.len());
    for column in schema.columns() {
        validate_identifier(&column.name)?;
        validate_type(&column.name, &column.sql_type)?;
        definitions.push(format!("{} {}", quote(&column.name), column.sql_type.trim()));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(table),
        definitions.join(", ")
    ))
}

/// Generates an additive `ALTER TABLE ... ADD COLUMN` statement.
pub fn generate_add_column_sql(table: &str, column: &str, sql_type: &str) -> Result<String> {
    validate_identifier(table)?;
    validate_identifier(column)?;
    validate_type(column, sql_type)?;
    Ok(format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        quote(table),
        quote(column),
        sql_type.trim()
    ))
}

/// `SELECT *` with one `IS ?n` condition per filter column, in insertion
/// order. `IS` rather than `=` so a `null` filter value matches NULL.
pub(crate) fn select_sql(table: &str, filter_columns: &[&str], limit: Option<usize>) -> Result<String> {
    validate_identifier(table)?;
    let columns = quoted_columns(filter_columns)?;

    let mut sql = format!("SELECT * FROM {}", quote(table));
    if !columns.is_empty() {
        let conditions: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} IS ?{}", i + 1))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY rowid");
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    Ok(sql)
}

/// `INSERT INTO table (c1, c2, ...) VALUES (?1, ?2, ...)`.
pub(crate) fn insert_sql(table: &str, columns: &[&str]) -> Result<String> {
    validate_identifier(table)?;
    if columns.is_empty() {
        return Err(SqliteError::EmptyRow(table.to_string()));
    }
    let names = quoted_columns(columns)?;
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(table),
        names.join(", "),
        placeholders.join(", ")
    ))
}

/// `UPDATE table SET c1 = ?1, ... WHERE key = ?n+1`.
pub(crate) fn update_sql(table: &str, set_columns: &[&str], key_column: &str) -> Result<String> {
    validate_identifier(table)?;
    validate_identifier(key_column)?;
    if set_columns.is_empty() {
        return Err(SqliteError::EmptyRow(table.to_string()));
    }
    let names = quoted_columns(set_columns)?;
    let assignments: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{c} = ?{}", i + 1))
        .collect();
    Ok(format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        quote(table),
        assignments.join(", "),
        quote(key_column),
        set_columns.len() + 1
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("stocks").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("price_52w_high").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("drop;--").is_err());
        assert!(validate_identifier("two words").is_err());
        assert!(validate_identifier("9lives").is_err());
        assert!(validate_identifier("quo\"te").is_err());
    }

    #[test]
    fn test_create_sql_keeps_column_order() {
        let schema = SchemaConfig::new()
            .with_column("isin", "TEXT")
            .with_column("price", "REAL")
            .with_column("watchlist", "INTEGER");
        let sql = generate_create_sql("stocks", &schema).unwrap();
        assert_eq!(
            sql,
            r#"CREATE TABLE IF NOT EXISTS "stocks" ("isin" TEXT, "price" REAL, "watchlist" INTEGER)"#
        );
    }

    #[test]
    fn test_create_sql_rejects_bad_type() {
        let schema = SchemaConfig::new().with_column("isin", "TEXT); DROP TABLE x; --");
        assert!(matches!(
            generate_create_sql("stocks", &schema),
            Err(SqliteError::InvalidColumnType { .. })
        ));
    }

    #[test]
    fn test_add_column_sql() {
        let sql = generate_add_column_sql("stocks", "currency", "TEXT").unwrap();
        assert_eq!(sql, r#"ALTER TABLE "stocks" ADD COLUMN "currency" TEXT"#);
        assert!(generate_add_column_sql("stocks", "bad name", "TEXT").is_err());
    }

    #[test]
    fn test_select_sql() {
        assert_eq!(
            select_sql("stocks", &[], None).unwrap(),
            r#"SELECT * FROM "stocks" ORDER BY rowid"#
        );
        assert_eq!(
            select_sql("stocks", &["isin", "watchlist"], Some(1)).unwrap(),
            r#"SELECT * FROM "stocks" WHERE "isin" IS ?1 AND "watchlist" IS ?2 ORDER BY rowid LIMIT 1"#
        );
    }

    #[test]
    fn test_insert_and_update_sql() {
        assert_eq!(
            insert_sql("stocks", &["isin", "sym"]).unwrap(),
            r#"INSERT INTO "stocks" ("isin", "sym") VALUES (?1, ?2)"#
        );
        assert_eq!(
            update_sql("stocks", &["sym", "price"], "isin").unwrap(),
            r#"UPDATE "stocks" SET "sym" = ?1, "price" = ?2 WHERE "isin" = ?3"#
        );
        assert!(matches!(
            insert_sql("stocks", &[]),
            Err(SqliteError::EmptyRow(_))
        ));
    }
}
