use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::{
    types::{FromSql, Type},
    Client, NoTls, Row,
};
use querydrop_core::{ResultSet, Value};
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{Result, SourceError};

pub(crate) fn open(url: &str) -> Result<Client> {
    Client::connect(url, NoTls).map_err(|e| SourceError::Connect {
        backend: "postgres",
        reason: e.to_string(),
    })
}

pub(crate) fn fetch(client: &mut Client, query: &str) -> Result<ResultSet> {
    // Prepare first so column metadata is available even for zero rows.
    let statement = client.prepare(query).map_err(query_err)?;
    let types: Vec<Type> = statement.columns().iter().map(|c| c.type_().clone()).collect();
    let mut set = ResultSet::new(
        statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
    );

    for (column, ty) in set.columns.iter().zip(&types) {
        if !is_supported(ty) {
            warn!(column = %column, pg_type = %ty, "unsupported column type; cells rendered as type name");
        }
    }

    for row in client.query(&statement, &[]).map_err(query_err)? {
        let values = types
            .iter()
            .enumerate()
            .map(|(idx, ty)| from_pg(&row, idx, ty))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(query_err)?;
        set.push_row(values);
    }
    Ok(set)
}

fn is_supported(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::OID
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::NUMERIC
            | Type::TEXT
            | Type::VARCHAR
            | Type::BPCHAR
            | Type::NAME
            | Type::UNKNOWN
            | Type::BYTEA
            | Type::DATE
            | Type::TIME
            | Type::TIMESTAMP
            | Type::TIMESTAMPTZ
            | Type::UUID
            | Type::JSON
            | Type::JSONB
    )
}

/// Decode one cell, keeping NULLs as [`Value::Null`].
fn cell<'a, T, F>(row: &'a Row, idx: usize, f: F) -> std::result::Result<Value, postgres::Error>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> Value,
{
    Ok(row.try_get::<_, Option<T>>(idx)?.map(f).unwrap_or(Value::Null))
}

fn from_pg(row: &Row, idx: usize, ty: &Type) -> std::result::Result<Value, postgres::Error> {
    match *ty {
        Type::BOOL => cell(row, idx, Value::Bool),
        Type::INT2 => cell(row, idx, |v: i16| Value::Int(v.into())),
        Type::INT4 => cell(row, idx, |v: i32| Value::Int(v.into())),
        Type::INT8 => cell(row, idx, Value::Int),
        Type::OID => cell(row, idx, |v: u32| Value::Int(v.into())),
        Type::FLOAT4 => cell(row, idx, |v: f32| Value::Float(v.into())),
        Type::FLOAT8 => cell(row, idx, Value::Float),
        Type::NUMERIC => cell(row, idx, |v: Decimal| Value::Text(v.to_string())),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            cell(row, idx, Value::Text)
        }
        Type::BYTEA => cell(row, idx, Value::Bytes),
        Type::DATE => cell(row, idx, |v: NaiveDate| Value::Text(v.to_string())),
        Type::TIME => cell(row, idx, |v: NaiveTime| Value::Text(v.to_string())),
        Type::TIMESTAMP => cell(row, idx, |v: NaiveDateTime| Value::Text(v.to_string())),
        Type::TIMESTAMPTZ => cell(row, idx, |v: DateTime<Utc>| {
            Value::Text(v.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string())
        }),
        Type::UUID => cell(row, idx, |v: uuid::Uuid| Value::Text(v.to_string())),
        Type::JSON | Type::JSONB => cell(row, idx, |v: serde_json::Value| Value::Text(v.to_string())),
        _ => Ok(Value::Text(format!("<{}>", ty.name()))),
    }
}

fn query_err(e: postgres::Error) -> SourceError {
    SourceError::Query(e.to_string())
}
