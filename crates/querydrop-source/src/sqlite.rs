use querydrop_core::{ResultSet, Value};
use rusqlite::types::ValueRef;

use crate::error::{Result, SourceError};

/// Turn `sqlite://path`, `sqlite:path` or `sqlite::memory:` into the
/// location rusqlite expects. `None` means in-memory.
pub(crate) fn parse_location(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("sqlite:").unwrap_or(url);
    if rest == ":memory:" || rest == "//:memory:" {
        return None;
    }
    let path = rest.strip_prefix("//").unwrap_or(rest);
    // Drop URL-style options (`?mode=ro`): rusqlite wants a plain path.
    let path = path.split('?').next().unwrap_or(path);
    Some(path)
}

pub(crate) fn open(url: &str) -> Result<rusqlite::Connection> {
    let conn = match parse_location(url) {
        None => rusqlite::Connection::open_in_memory(),
        Some(path) => rusqlite::Connection::open(path),
    };
    conn.map_err(|e| SourceError::Connect {
        backend: "sqlite",
        reason: e.to_string(),
    })
}

pub(crate) fn fetch(conn: &rusqlite::Connection, query: &str) -> Result<ResultSet> {
    let mut stmt = conn.prepare(query).map_err(query_err)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut set = ResultSet::new(columns);
    let width = set.column_count();

    let mut rows = stmt.query([]).map_err(query_err)?;
    while let Some(row) = rows.next().map_err(query_err)? {
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            values.push(convert(row.get_ref(idx).map_err(query_err)?));
        }
        set.push_row(values);
    }
    Ok(set)
}

fn convert(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(x) => Value::Float(x),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

fn query_err(e: rusqlite::Error) -> SourceError {
    SourceError::Query(e.to_string())
}
