//! SQL text helpers and connection string handling

use crate::error::{Result, SchemadiffError};
use std::env;
use std::path::Path;

/// Quote an identifier for DuckDB (double quotes, embedded quotes doubled)
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal (single quotes, embedded quotes doubled)
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quote a libpq keyword/value pair value when it needs quoting
fn libpq_value(value: &str) -> String {
    if !value.is_empty() && !value.contains([' ', '\'', '\\']) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Build a libpq keyword/value connection string
pub fn postgres_connection_string(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: &str,
) -> String {
    format!(
        "host={} port={} user={} password={} dbname={}",
        libpq_value(host),
        port,
        libpq_value(user),
        libpq_value(password),
        libpq_value(database)
    )
}

/// Statement attaching a database read-only under `alias`.
///
/// `kind` is the DuckDB storage type (`postgres`, `sqlite`), or `None` for a
/// native DuckDB file.
pub fn attach_statement(target: &str, alias: &str, kind: Option<&str>) -> String {
    let options = match kind {
        Some(kind) => format!("TYPE {}, READ_ONLY", kind),
        None => "READ_ONLY".to_string(),
    };
    format!(
        "ATTACH {} AS {} ({})",
        quote_literal(target),
        quote_ident(alias),
        options
    )
}

/// Substitute `{VAR_NAME}` placeholders with environment variable values
pub fn substitute_env_vars(text: &str) -> Result<String> {
    let mut result = text.to_string();

    let mut start = 0;
    while let Some(open_pos) = result[start..].find('{') {
        let open_pos = start + open_pos;
        if let Some(close_pos) = result[open_pos..].find('}') {
            let close_pos = open_pos + close_pos;
            let var_name = &result[open_pos + 1..close_pos];

            let var_value = env::var(var_name).map_err(|_| {
                SchemadiffError::invalid_input(format!(
                    "Environment variable '{}' not found. Make sure it's set in your .env file or environment.",
                    var_name
                ))
            })?;

            result.replace_range(open_pos..=close_pos, &var_value);
            start = open_pos + var_value.len();
        } else {
            start = open_pos + 1;
        }
    }

    Ok(result)
}

/// Load environment variables from .env file if it exists
pub fn load_env_file() -> Result<()> {
    if Path::new(".env").exists() {
        dotenv::dotenv().map_err(|e| {
            SchemadiffError::invalid_input(format!("Failed to load .env file: {}", e))
        })?;
    }

    Ok(())
}
