//! SQLite-backed HR store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OpenFlags, Params};
use serde_json::Value;

use ess_core::config::StructuredConfig;
use ess_core::errors::StructuredDataError;
use ess_core::models::{Row, SubjectCode, SubjectRecord};
use ess_core::traits::IStructuredData;

const DIALECT: &str = "SQLite";

/// Read-only HR data store over a single SQLite connection.
pub struct SqliteHrStore {
    conn: Mutex<Connection>,
    config: StructuredConfig,
}

fn unavailable(e: impl std::fmt::Display) -> StructuredDataError {
    StructuredDataError::Unavailable {
        reason: e.to_string(),
    }
}

fn schema_err(e: impl std::fmt::Display) -> StructuredDataError {
    StructuredDataError::Schema {
        reason: e.to_string(),
    }
}

/// Busy, locked, and I/O failures are the backend's fault; everything else
/// (syntax, unknown column) is the query's.
fn query_err(e: rusqlite::Error) -> StructuredDataError {
    match e.sqlite_error_code() {
        Some(
            ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::NotADatabase,
        ) => unavailable(e),
        _ => StructuredDataError::Query {
            reason: e.to_string(),
        },
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<{} bytes>", b.len())),
    }
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    sql.get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}

fn to_code(value: ValueRef<'_>) -> Option<SubjectCode> {
    match value {
        ValueRef::Integer(i) => Some(SubjectCode::from(i)),
        ValueRef::Text(t) => Some(SubjectCode::new(String::from_utf8_lossy(t))),
        ValueRef::Real(f) => Some(SubjectCode::new(f.to_string())),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

impl SqliteHrStore {
    /// Open an existing database file read-only.
    pub fn open_read_only(path: &Path, config: StructuredConfig) -> Result<Self, StructuredDataError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(unavailable)?;
        tracing::info!(path = %path.display(), "opened HR store");
        Ok(Self::with_connection(conn, config))
    }

    /// Build an in-memory database from a SQL script, then lock it to queries.
    pub fn from_sql(script: &str, config: StructuredConfig) -> Result<Self, StructuredDataError> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        conn.execute_batch(script).map_err(schema_err)?;
        conn.pragma_update(None, "query_only", true)
            .map_err(unavailable)?;
        Ok(Self::with_connection(conn, config))
    }

    fn with_connection(conn: Connection, config: StructuredConfig) -> Self {
        Self {
            conn: Mutex::new(conn),
            config,
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StructuredDataError> {
        self.conn
            .lock()
            .map_err(|_| unavailable("connection lock poisoned"))
    }

    fn table_names(conn: &Connection) -> Result<Vec<String>, StructuredDataError> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(schema_err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(schema_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(schema_err)?;
        Ok(names)
    }

    fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, StructuredDataError> {
        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info(?1)")
            .map_err(schema_err)?;
        let names = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))
            .map_err(schema_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(schema_err)?;
        Ok(names)
    }

    /// One `name AS (...)` binding per table, shadowing the table with only
    /// the rows whose code column matches a bound subject. Tables without
    /// the code column shadow to nothing. The flag reports whether any
    /// binding references the subject parameters.
    fn scoped_views(
        &self,
        conn: &Connection,
        subjects: &[SubjectCode],
    ) -> Result<(Vec<String>, bool), StructuredDataError> {
        let code = &self.config.code_column;
        let placeholders = (1..=subjects.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut views = Vec::new();
        let mut bound = false;
        for table in Self::table_names(conn)? {
            let has_code = Self::table_columns(conn, &table)?
                .iter()
                .any(|c| c.eq_ignore_ascii_case(code));
            let filter = if has_code && !subjects.is_empty() {
                bound = true;
                format!("CAST({} AS TEXT) IN ({placeholders})", quote_ident(code))
            } else {
                "0".to_string()
            };
            let table = quote_ident(&table);
            views.push(format!("{table} AS (SELECT * FROM main.{table} WHERE {filter})"));
        }
        Ok((views, bound))
    }

    fn run(conn: &Connection, sql: &str, params: impl Params) -> Result<Vec<Row>, StructuredDataError> {
        let mut stmt = conn.prepare(sql).map_err(query_err)?;
        if !stmt.readonly() {
            return Err(StructuredDataError::Query {
                reason: "statement is not read-only".into(),
            });
        }
        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
        let mut rows = stmt.query(params).map_err(query_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut map = Row::new();
            for (i, name) in names.iter().enumerate() {
                let value = row.get_ref(i).map_err(query_err)?;
                map.insert(name.clone(), to_json(value));
            }
            out.push(map);
        }
        Ok(out)
    }

    fn find_subjects(
        &self,
        conn: &Connection,
        predicate: &str,
        reference: &str,
    ) -> Result<Vec<SubjectRecord>, StructuredDataError> {
        let c = &self.config;
        let sql = format!(
            "SELECT {code}, {name}, {sup} FROM {table} WHERE {predicate} ORDER BY {code}",
            code = quote_ident(&c.code_column),
            name = quote_ident(&c.name_column),
            sup = quote_ident(&c.supervisor_column),
            table = quote_ident(&c.employees_table),
        );
        let mut stmt = conn.prepare(&sql).map_err(schema_err)?;
        let mut rows = stmt.query(params![reference]).map_err(query_err)?;
        let mut found = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            let code = row.get_ref(0).map_err(query_err).map(to_code)?;
            let name: Option<String> = row.get(1).map_err(query_err)?;
            let supervisor = row.get_ref(2).map_err(query_err).map(to_code)?;
            if let Some(code) = code {
                found.push(SubjectRecord {
                    code,
                    name: name.unwrap_or_default(),
                    supervisor,
                });
            }
        }
        Ok(found)
    }
}

impl IStructuredData for SqliteHrStore {
    fn describe_schema(&self) -> Result<String, StructuredDataError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT sql FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
                 ORDER BY name",
            )
            .map_err(schema_err)?;
        let ddl = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(schema_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(schema_err)?;
        if ddl.is_empty() {
            return Err(schema_err("database has no tables"));
        }
        Ok(ddl.join(";\n\n") + ";")
    }

    fn execute(&self, query: &str) -> Result<Vec<Row>, StructuredDataError> {
        let conn = self.conn()?;
        let out = Self::run(&conn, query, params![])?;
        tracing::debug!(rows = out.len(), "query executed");
        Ok(out)
    }

    /// The generated query runs under a `WITH` clause that rebinds every
    /// table name to its in-scope rows, so no predicate in the query text can
    /// widen what it reads. Schema-qualified names are refused by the guard.
    fn execute_scoped(
        &self,
        query: &str,
        subjects: &[SubjectCode],
    ) -> Result<Vec<Row>, StructuredDataError> {
        let conn = self.conn()?;
        let (views, bound) = self.scoped_views(&conn, subjects)?;
        if views.is_empty() {
            return Err(schema_err("database has no tables"));
        }
        let query = query.trim();
        let sql = if starts_with_keyword(query, "SELECT") {
            format!("WITH {}\n{query}", views.join(",\n"))
        } else {
            format!("WITH {}\nSELECT * FROM ({query})", views.join(",\n"))
        };
        let codes: Vec<&str> = if bound {
            subjects.iter().map(SubjectCode::as_str).collect()
        } else {
            Vec::new()
        };
        let out = Self::run(&conn, &sql, params_from_iter(codes))?;
        tracing::debug!(rows = out.len(), subjects = subjects.len(), "scoped query executed");
        Ok(out)
    }

    fn direct_reports(&self, supervisor: &SubjectCode) -> Result<Vec<SubjectRecord>, StructuredDataError> {
        let conn = self.conn()?;
        let sup = quote_ident(&self.config.supervisor_column);
        self.find_subjects(&conn, &format!("CAST({sup} AS TEXT) = ?1"), supervisor.as_str())
    }

    fn resolve_subject(&self, reference: &str) -> Result<Option<SubjectRecord>, StructuredDataError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }
        let conn = self.conn()?;
        let code = quote_ident(&self.config.code_column);
        let name = quote_ident(&self.config.name_column);

        let by_code = self.find_subjects(&conn, &format!("CAST({code} AS TEXT) = ?1"), reference)?;
        if let Some(found) = by_code.into_iter().next() {
            return Ok(Some(found));
        }
        let by_name = self.find_subjects(&conn, &format!("lower({name}) = lower(?1)"), reference)?;
        if let Some(found) = by_name.into_iter().next() {
            return Ok(Some(found));
        }
        // First name only; an ambiguous match resolves to nobody.
        let mut by_first = self.find_subjects(
            &conn,
            &format!("lower({name}) LIKE lower(?1) || ' %'"),
            reference,
        )?;
        if by_first.len() == 1 {
            return Ok(by_first.pop());
        }
        if by_first.len() > 1 {
            tracing::debug!(reference, "ambiguous first-name reference");
        }
        Ok(None)
    }

    fn dialect(&self) -> &str {
        DIALECT
    }

    fn columns(&self) -> Result<Vec<String>, StructuredDataError> {
        let conn = self.conn()?;
        let mut columns = Vec::new();
        for table in Self::table_names(&conn)? {
            columns.extend(Self::table_columns(&conn, &table)?);
        }
        columns.sort();
        columns.dedup();
        Ok(columns)
    }

    fn name(&self) -> &str {
        "sqlite"
    }

    fn is_available(&self) -> bool {
        self.conn.lock().is_ok()
    }
}
