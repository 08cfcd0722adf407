use rusqlite::{params, types::Value as SqlValue, Connection, ErrorCode, OptionalExtension};
use serde_json::Value;
use std::path::Path;

use super::{
    filter::is_valid_path,
    traits::{document_id, is_valid_collection_name},
    DocumentStore, Filter, StoreError,
};
use crate::schema::CollectionSchema;

const DB_SCHEMA_VERSION: i64 = 1;

/// Each registered collection is a table of JSON bodies; unique indexes are
/// expression indexes over `json_extract`.
#[derive(Clone)]
pub struct SqliteStore {
    pub path: String,
}

fn json_path(path: &str) -> Result<String, StoreError> {
    if !is_valid_path(path) {
        return Err(StoreError::InvalidFilter(format!("bad field path {path:?}")));
    }
    Ok(format!("'$.{path}'"))
}

/// Renders `filter` as a WHERE clause over the JSON expression `base`.
fn filter_sql(
    filter: &Filter,
    base: &str,
    depth: usize,
    params: &mut Vec<SqlValue>,
) -> Result<String, StoreError> {
    match filter {
        Filter::All => Ok("1".to_string()),
        Filter::Eq(path, value) => {
            let field = format!("json_extract({base}, {})", json_path(path)?);
            let param = match value {
                Value::Null => return Ok(format!("{field} IS NULL")),
                Value::Bool(b) => SqlValue::Integer(*b as i64),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => SqlValue::Integer(i),
                    None => SqlValue::Real(n.as_f64().unwrap_or_default()),
                },
                Value::String(s) => SqlValue::Text(s.clone()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(StoreError::InvalidFilter(format!(
                        "equality on composite value at {path:?}"
                    )))
                }
            };
            params.push(param);
            Ok(format!("{field} = ?{}", params.len()))
        }
        Filter::And(filters) => {
            if filters.is_empty() {
                return Ok("1".to_string());
            }
            let clauses = filters
                .iter()
                .map(|f| filter_sql(f, base, depth, params))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("({})", clauses.join(" AND ")))
        }
        Filter::ElemMatch(path, inner) => {
            let alias = format!("je{depth}");
            let inner_sql = filter_sql(inner, &format!("{alias}.value"), depth + 1, params)?;
            // Only object elements are matched; json_extract rejects scalar text.
            Ok(format!(
                "EXISTS (SELECT 1 FROM json_each({base}, {}) AS {alias} \
                 WHERE CASE WHEN {alias}.type = 'object' THEN {inner_sql} ELSE 0 END)",
                json_path(path)?
            ))
        }
    }
}

/// Maps unique constraint failures to `DuplicateKey`, naming the violated index.
fn map_write_error(collection: &str, err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(code, msg) = &err {
        let unique = code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            || code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY;
        if code.code == ErrorCode::ConstraintViolation && unique {
            let index = msg
                .as_deref()
                .and_then(|m| m.strip_prefix("UNIQUE constraint failed: "))
                .map(|rest| {
                    rest.trim_start_matches("index ")
                        .trim_matches('\'')
                        .to_string()
                })
                .unwrap_or_else(|| "unknown".to_string());
            return StoreError::DuplicateKey {
                collection: collection.to_string(),
                index,
            };
        }
    }
    StoreError::Sqlite(err)
}

fn db_is_registered(conn: &Connection, collection: &str) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM registered_collections WHERE name = ?1",
            params![collection],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn ensure_registered(conn: &Connection, collection: &str) -> Result<(), StoreError> {
    if db_is_registered(conn, collection)? {
        Ok(())
    } else {
        Err(StoreError::UnknownCollection(collection.to_string()))
    }
}

fn db_register(conn: &Connection, schema: &CollectionSchema) -> Result<(), StoreError> {
    if !is_valid_collection_name(schema.name) {
        return Err(StoreError::InvalidDocument {
            collection: schema.name.to_string(),
            reason: "invalid collection name".to_string(),
        });
    }

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{name}" (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            body TEXT NOT NULL CHECK (json_valid(body))
        );
        "#,
        name = schema.name
    ))?;

    for index in schema.unique {
        let exprs = index
            .fields
            .iter()
            .map(|field| json_path(field).map(|p| format!("json_extract(body, {p})")))
            .collect::<Result<Vec<_>, _>>()?;
        if !is_valid_collection_name(index.name) {
            return Err(StoreError::InvalidDocument {
                collection: schema.name.to_string(),
                reason: format!("invalid index name {:?}", index.name),
            });
        }
        tx.execute_batch(&format!(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS "{}" ON "{}" ({});"#,
            index.name,
            schema.name,
            exprs.join(", ")
        ))?;
    }

    let indexes = serde_json::to_string(
        &schema
            .unique
            .iter()
            .map(|i| serde_json::json!({ "name": i.name, "fields": i.fields }))
            .collect::<Vec<_>>(),
    )?;
    tx.execute(
        "INSERT INTO registered_collections (name, unique_indexes) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET unique_indexes=excluded.unique_indexes",
        params![schema.name, indexes],
    )?;
    tx.commit()?;
    Ok(())
}

fn db_find_one(
    conn: &Connection,
    collection: &str,
    filter: &Filter,
) -> Result<Option<Value>, StoreError> {
    ensure_registered(conn, collection)?;
    let mut sql_params = Vec::new();
    let clause = filter_sql(filter, "body", 0, &mut sql_params)?;
    let sql = format!(r#"SELECT body FROM "{collection}" WHERE {clause} ORDER BY seq LIMIT 1"#);
    let body: Option<String> = conn
        .query_row(&sql, rusqlite::params_from_iter(sql_params.iter()), |row| {
            row.get(0)
        })
        .optional()?;
    Ok(body.map(|b| serde_json::from_str(&b)).transpose()?)
}

fn db_insert(conn: &Connection, collection: &str, doc: &Value) -> Result<(), StoreError> {
    ensure_registered(conn, collection)?;
    let id = document_id(collection, doc)?;
    let body = serde_json::to_string(doc)?;
    conn.execute(
        &format!(r#"INSERT INTO "{collection}" (id, body) VALUES (?1, ?2)"#),
        params![id, body],
    )
    .map_err(|e| map_write_error(collection, e))?;
    Ok(())
}

fn db_save(conn: &Connection, collection: &str, doc: &Value) -> Result<(), StoreError> {
    ensure_registered(conn, collection)?;
    let id = document_id(collection, doc)?;
    let body = serde_json::to_string(doc)?;
    conn.execute(
        &format!(
            r#"INSERT INTO "{collection}" (id, body) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET body=excluded.body"#
        ),
        params![id, body],
    )
    .map_err(|e| map_write_error(collection, e))?;
    Ok(())
}

fn db_count(conn: &Connection, collection: &str) -> Result<u64, StoreError> {
    ensure_registered(conn, collection)?;
    let n: i64 = conn.query_row(&format!(r#"SELECT COUNT(*) FROM "{collection}""#), [], |row| {
        row.get(0)
    })?;
    Ok(n as u64)
}

fn db_collection_names(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM registered_collections ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn reset_all(&self) -> std::io::Result<()> {
        if !Path::new(&self.path).exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path)
    }

    pub fn init(&self) -> Result<(), StoreError> {
        self.with_conn(|_conn| Ok(()))
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;

        Self::migrate(&conn)?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        log::info!(
            "SQLite schema migration: {} -> {}",
            version,
            DB_SCHEMA_VERSION
        );

        if version == 0 {
            conn.execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS registered_collections (
                name TEXT PRIMARY KEY,
                unique_indexes TEXT NOT NULL
            );
        "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}

impl DocumentStore for SqliteStore {
    fn register(&self, schema: &CollectionSchema) -> Result<(), StoreError> {
        self.with_conn(|conn| db_register(conn, schema))
    }

    fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.with_conn(|conn| Ok(db_collection_names(conn)?))
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError> {
        self.with_conn(|conn| db_find_one(conn, collection, filter))
    }

    fn insert(&self, collection: &str, doc: Value) -> Result<(), StoreError> {
        self.with_conn(|conn| db_insert(conn, collection, &doc))
    }

    fn save(&self, collection: &str, doc: Value) -> Result<(), StoreError> {
        self.with_conn(|conn| db_save(conn, collection, &doc))
    }

    fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.with_conn(|conn| db_count(conn, collection))
    }
}
