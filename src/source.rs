//! DuckDB-backed access to one side of a comparison
//!
//! Each side gets its own in-memory DuckDB connection with the real database
//! attached read-only, so postgres schemas, DuckDB files and SQLite files are
//! all queried through the same catalog views.

use crate::config::SideConfig;
use crate::dataset::{ColumnSet, Row};
use crate::error::{Result, SchemadiffError};
use crate::schema::SchemaSource;
use crate::sql::{attach_statement, postgres_connection_string, quote_ident};
use crate::value::Value;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use duckdb::arrow::datatypes::DataType;
use duckdb::types::{TimeUnit, Value as DuckValue, ValueRef};
use duckdb::{params, Connection};

/// Days between 0001-01-01 (CE day 1) and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One attached side
pub struct DuckDbSource {
    connection: Connection,
    alias: String,
    schema: String,
    label: String,
}

impl DuckDbSource {
    /// Open an in-memory connection and attach the side described by `config`
    /// under `alias`
    pub fn connect(config: &SideConfig, alias: &str) -> Result<Self> {
        let config = config.resolved()?;
        let connection = Connection::open_in_memory()?;
        connection.execute("SET enable_progress_bar=false", [])?;

        let statement = match &config {
            SideConfig::Postgres {
                host,
                port,
                user,
                password,
                database,
                ..
            } => {
                connection
                    .execute_batch("INSTALL postgres; LOAD postgres;")
                    .context("Failed to load the DuckDB postgres extension")?;
                let target = postgres_connection_string(host, *port, user, password, database);
                attach_statement(&target, alias, Some("postgres"))
            }
            SideConfig::DuckDb { path, .. } => {
                if !path.exists() {
                    return Err(SchemadiffError::invalid_input(format!(
                        "DuckDB database not found: {}",
                        path.display()
                    )));
                }
                attach_statement(&path.to_string_lossy(), alias, None)
            }
            SideConfig::Sqlite { path, .. } => {
                if !path.exists() {
                    return Err(SchemadiffError::invalid_input(format!(
                        "SQLite database not found: {}",
                        path.display()
                    )));
                }
                connection
                    .execute_batch("INSTALL sqlite; LOAD sqlite;")
                    .context("Failed to load the DuckDB sqlite extension")?;
                attach_statement(&path.to_string_lossy(), alias, Some("sqlite"))
            }
        };

        connection
            .execute_batch(&statement)
            .with_context(|| format!("Failed to attach {}", config.display_name()))?;
        log::info!("Attached {} as {}", config.display_name(), alias);

        Ok(Self {
            connection,
            alias: alias.to_string(),
            schema: config.schema().to_string(),
            label: config.display_name(),
        })
    }

    /// Fully qualified, quoted name of `table`
    fn qualified(&self, table: &str) -> String {
        format!(
            "{}.{}.{}",
            quote_ident(&self.alias),
            quote_ident(&self.schema),
            quote_ident(table)
        )
    }
}

impl SchemaSource for DuckDbSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.connection.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_catalog = ? AND table_schema = ? ORDER BY table_name",
        )?;
        let rows = stmt.query_map(params![self.alias, self.schema], |row| row.get::<_, String>(0))?;

        let mut tables = Vec::new();
        for row in rows {
            tables.push(row?);
        }
        Ok(tables)
    }

    fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self.connection.prepare(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_catalog = ? AND table_schema = ? AND table_name = ? \
             ORDER BY ordinal_position",
        )?;
        let rows = stmt.query_map(params![self.alias, self.schema, table], |row| {
            row.get::<_, String>(0)
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }

    fn fetch_rows(&self, table: &str, columns: &ColumnSet, sort_column: &str) -> Result<Vec<Row>> {
        if columns.is_empty() {
            return Err(SchemadiffError::invalid_input(format!(
                "Table {} has no columns left to compare",
                table
            )));
        }

        let fields: Vec<String> = columns.names().iter().map(|c| quote_ident(c)).collect();
        let query = format!(
            "SELECT {} FROM {} ORDER BY {} ASC",
            fields.join(","),
            self.qualified(table),
            quote_ident(sort_column)
        );
        log::debug!("{}: {}", self.label, query);

        let width = columns.len();
        let mut stmt = self.connection.prepare(&query)?;
        let mut rows = stmt.query([])?;

        // column types are only known once the query has run
        let types: Vec<DataType> = match rows.as_ref() {
            Some(executed) => (0..width).map(|i| executed.column_type(i)).collect(),
            None => vec![DataType::Null; width],
        };

        let mut data = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for (i, data_type) in types.iter().enumerate() {
                values.push(convert_value(row.get_ref(i)?, data_type));
            }
            data.push(Row::new(values));
        }
        Ok(data)
    }
}

/// Convert a borrowed DuckDB value into an owned field value.
///
/// `data_type` is the result column's type. DuckDB hands out zoned and plain
/// timestamps as the same `ValueRef::Timestamp`, only the column type tells
/// them apart.
pub fn convert_value(value: ValueRef<'_>, data_type: &DataType) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::Int(i.into()),
        ValueRef::SmallInt(i) => Value::Int(i.into()),
        ValueRef::Int(i) => Value::Int(i.into()),
        ValueRef::BigInt(i) => Value::Int(i),
        ValueRef::HugeInt(i) => Value::BigInt(i),
        ValueRef::UTinyInt(i) => Value::Int(i.into()),
        ValueRef::USmallInt(i) => Value::Int(i.into()),
        ValueRef::UInt(i) => Value::Int(i.into()),
        ValueRef::UBigInt(i) => match i64::try_from(i) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::BigInt(i.into()),
        },
        ValueRef::Float(f) => Value::Float(f.into()),
        ValueRef::Double(f) => Value::Float(f),
        ValueRef::Decimal(d) => Value::Decimal(d.to_string()),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        ValueRef::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(Value::Date)
            .unwrap_or_else(|| Value::Other(format!("date({})", days))),
        ValueRef::Time64(unit, t) => time_of_day(unit, t)
            .map(Value::Time)
            .unwrap_or_else(|| Value::Other(format!("time({})", t))),
        ValueRef::Timestamp(unit, ts) => match data_type {
            DataType::Timestamp(_, Some(_)) => instant(unit, ts)
                .map(Value::TimestampTz)
                .unwrap_or_else(|| Value::Other(format!("timestamptz({})", ts))),
            _ => instant(unit, ts)
                .map(|dt| Value::Timestamp(dt.naive_utc()))
                .unwrap_or_else(|| Value::Other(format!("timestamp({})", ts))),
        },
        ValueRef::Interval { months, days, nanos } => Value::Interval { months, days, nanos },
        ValueRef::Enum(..) => match value.as_str() {
            Ok(label) => Value::Text(label.to_string()),
            Err(_) => Value::Other(render_nested(&value.to_owned())),
        },
        other => Value::Other(render_nested(&other.to_owned())),
    }
}

/// Text form of list, struct, map and union values
fn render_nested(value: &DuckValue) -> String {
    let join = |items: &[DuckValue]| {
        items
            .iter()
            .map(render_nested)
            .collect::<Vec<_>>()
            .join(", ")
    };

    match value {
        DuckValue::Null => "NULL".to_string(),
        DuckValue::Text(s) | DuckValue::Enum(s) => s.clone(),
        DuckValue::List(items) | DuckValue::Array(items) => format!("[{}]", join(items)),
        DuckValue::Struct(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(name, v)| format!("{}: {}", name, render_nested(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        DuckValue::Map(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}={}", render_nested(k), render_nested(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        DuckValue::Union(inner) => render_nested(inner),
        scalar => convert_value(ValueRef::from(scalar), &DataType::Null).to_string(),
    }
}

fn to_nanos(unit: TimeUnit, value: i64) -> Option<i128> {
    let factor: i128 = match unit {
        TimeUnit::Second => 1_000_000_000,
        TimeUnit::Millisecond => 1_000_000,
        TimeUnit::Microsecond => 1_000,
        TimeUnit::Nanosecond => 1,
    };
    i128::from(value).checked_mul(factor)
}

fn instant(unit: TimeUnit, value: i64) -> Option<DateTime<Utc>> {
    let nanos = to_nanos(unit, value)?;
    let secs = i64::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
    let subsec = u32::try_from(nanos.rem_euclid(1_000_000_000)).ok()?;
    DateTime::from_timestamp(secs, subsec)
}

fn time_of_day(unit: TimeUnit, value: i64) -> Option<NaiveTime> {
    let nanos = to_nanos(unit, value)?;
    let secs = u32::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
    let subsec = u32::try_from(nanos.rem_euclid(1_000_000_000)).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, subsec)
}
