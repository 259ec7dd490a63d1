#![cfg(feature = "sqlite")]

use region_api::{Database, DatabaseConfig, DbError, RowValues};
use tempfile::TempDir;

const DDL: &str = "CREATE TABLE region (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)";

fn sqlite_config(dir: &TempDir) -> DatabaseConfig {
    let path = dir.path().join("regions.db");
    DatabaseConfig::sqlite(path.to_string_lossy().into_owned())
}

async fn connected(dir: &TempDir) -> Result<Database, DbError> {
    let mut db = Database::new(&sqlite_config(dir))?;
    db.connect().await?;
    Ok(db)
}

/// The driver never creates the database file, so tests create it here.
fn create_empty(dir: &TempDir) -> Result<rusqlite::Connection, Box<dyn std::error::Error>> {
    Ok(rusqlite::Connection::open(dir.path().join("regions.db"))?)
}

/// `run` only accepts INSERT/UPDATE/DELETE, so the schema goes in through rusqlite directly.
fn create_schema(dir: &TempDir) -> Result<(), Box<dyn std::error::Error>> {
    create_empty(dir)?.execute_batch(DDL)?;
    Ok(())
}

#[tokio::test]
async fn effect_values_follow_statement_kind() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    create_schema(&dir)?;
    let mut db = connected(&dir).await?;

    let first = db
        .run("INSERT INTO region (name) VALUES ($1)", &[RowValues::Text("North".into())])
        .await?;
    let second = db
        .run("  insert into region (name) values ($1)", &[RowValues::Text("South".into())])
        .await?;
    let third = db
        .run("INSERT INTO region (name) VALUES ($1)", &[RowValues::Text("South".into())])
        .await?;
    assert_eq!((first, second, third), (1, 2, 3));

    let updated = db
        .run(
            "UPDATE region SET name = $1 WHERE name = $2",
            &[RowValues::Text("Deep South".into()), RowValues::Text("South".into())],
        )
        .await?;
    assert_eq!(updated, 2);

    let untouched = db
        .run("update region SET name = 'x' WHERE id = $1", &[RowValues::Int(404)])
        .await?;
    assert_eq!(untouched, 0);

    let deleted = db
        .run("\n DELETE FROM region WHERE id > $1", &[RowValues::Int(1)])
        .await?;
    assert_eq!(deleted, 2);

    db.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn select_returns_rows_in_order_with_typed_values() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    create_schema(&dir)?;
    let mut db = connected(&dir).await?;

    for name in ["North", "East", "West"] {
        db.run("INSERT INTO region (name) VALUES ($1)", &[RowValues::Text(name.into())])
            .await?;
    }

    let rows = db
        .select("SELECT id, name FROM region ORDER BY id DESC", &[])
        .await?;
    let names: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.get("name").and_then(RowValues::as_text))
        .collect();
    assert_eq!(names, ["West", "East", "North"]);
    assert_eq!(rows[0].get("id"), Some(&RowValues::Int(3)));
    assert_eq!(rows[0].column_names(), ["id".to_string(), "name".to_string()]);

    let nulls = db
        .select("SELECT NULL AS nothing, 1.5 AS ratio, x'0102' AS raw", &[])
        .await?;
    assert_eq!(nulls[0].get("nothing"), Some(&RowValues::Null));
    assert_eq!(nulls[0].get("ratio").and_then(RowValues::as_float), Some(1.5));
    assert_eq!(nulls[0].get("raw").and_then(RowValues::as_blob), Some(&[1u8, 2][..]));

    db.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn empty_select_then_disconnect() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    create_schema(&dir)?;
    let mut db = connected(&dir).await?;

    let rows = db
        .select("SELECT id, name FROM region WHERE id = $1", &[RowValues::Int(5)])
        .await?;
    assert!(rows.is_empty());

    db.disconnect().await?;
    assert!(!db.is_connected());
    // A second disconnect with nothing open is a no-op.
    db.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn parameters_are_bound_not_interpolated() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    create_schema(&dir)?;
    let mut db = connected(&dir).await?;

    let hostile = "x'); DROP TABLE region; --";
    db.run("INSERT INTO region (name) VALUES ($1)", &[RowValues::Text(hostile.into())])
        .await?;

    let rows = db.select("SELECT name FROM region", &[]).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name").and_then(RowValues::as_text), Some(hostile));
    db.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn unsupported_statement_is_never_executed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    create_empty(&dir)?;
    let mut db = connected(&dir).await?;

    let err = db.run(DDL, &[]).await.unwrap_err();
    assert!(matches!(err, DbError::UnsupportedStatement(_)));

    // The CREATE never ran, so the table is still missing.
    let err = db.select("SELECT id FROM region", &[]).await.unwrap_err();
    assert!(matches!(err, DbError::QueryError(_)));
    assert!(db.is_connected());

    db.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn placeholders_bind_by_number_not_by_position() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    create_schema(&dir)?;
    let mut db = connected(&dir).await?;

    for name in ["North", "East"] {
        db.run("INSERT INTO region (name) VALUES ($1)", &[RowValues::Text(name.into())])
            .await?;
    }

    let updated = db
        .run(
            "UPDATE region SET name = $2 WHERE id = $1",
            &[RowValues::Int(1), RowValues::Text("South".into())],
        )
        .await?;
    assert_eq!(updated, 1);

    let rows = db
        .select(
            "SELECT id, name FROM region WHERE name = $2 OR id = $1 OR name = $2 ORDER BY id",
            &[RowValues::Int(2), RowValues::Text("South".into())],
        )
        .await?;
    let names: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.get("name").and_then(RowValues::as_text))
        .collect();
    assert_eq!(names, ["South", "East"]);

    // A literal `$1` inside quotes is text, not a parameter.
    let rows = db
        .select("SELECT '$1' AS literal, $1 AS bound", &[RowValues::Int(9)])
        .await?;
    assert_eq!(rows[0].get("literal").and_then(RowValues::as_text), Some("$1"));
    assert_eq!(rows[0].get("bound"), Some(&RowValues::Int(9)));

    db.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn constraint_violation_is_a_query_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    create_schema(&dir)?;
    let mut db = connected(&dir).await?;

    let err = db
        .run("INSERT INTO region (name) VALUES ($1)", &[RowValues::Null])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::QueryError(_)));
    // The connection survives a rejected statement.
    assert!(db.is_connected());
    db.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn unreachable_path_is_a_connection_error() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("no").join("such").join("dir").join("x.db");
    let mut db = Database::new(&DatabaseConfig::sqlite(missing.to_string_lossy().into_owned()))?;

    let err = db.connect().await.unwrap_err();
    assert!(matches!(err, DbError::ConnectionError(_)));
    assert!(!db.is_connected());
    Ok(())
}

#[tokio::test]
async fn missing_database_file_is_not_created() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("typo.db");
    let mut db = Database::new(&DatabaseConfig::sqlite(path.to_string_lossy().into_owned()))?;

    let err = db.connect().await.unwrap_err();
    assert!(matches!(err, DbError::ConnectionError(_)));
    assert!(!db.is_connected());
    assert!(!path.exists());
    Ok(())
}
