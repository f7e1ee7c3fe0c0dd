// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Row reads for database-backed endpoints.
//!
//! Each read opens a connection, runs one equality-filtered query and closes
//! the connection again. Rows and documents are returned as JSON objects.

use async_trait::async_trait;
use log::{debug, warn};
use mongodb::bson::{self, Bson, Document};
use mongodb::{Client, Collection};
use serde_json::{Map, Number, Value};
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};

use crate::models::DatabaseConnection;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Database query failed: {0}")]
    Query(String),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("No database name configured for '{0}'")]
    MissingDatabaseName(String),
}

#[async_trait]
pub trait DatabaseReader: Send + Sync {
    /// Documents of `collection` matching every field of `query`.
    async fn read_mongo(
        &self,
        connection: &DatabaseConnection,
        collection: &str,
        query: &Map<String, Value>,
    ) -> Result<Vec<Value>, DatabaseError>;

    /// Rows of `table` whose columns equal every field of `query`.
    async fn read_mysql(
        &self,
        connection: &DatabaseConnection,
        table: &str,
        query: &Map<String, Value>,
    ) -> Result<Vec<Value>, DatabaseError>;
}

/// Build `SELECT * FROM <table> [WHERE <col> = ? AND ...]` plus the values to
/// bind, in placeholder order.
pub fn select_statement(
    table: &str,
    query: &Map<String, Value>,
) -> Result<(String, Vec<Value>), DatabaseError> {
    let mut sql = format!("SELECT * FROM {}", quote_identifier(table)?);
    let mut values = Vec::with_capacity(query.len());

    if !query.is_empty() {
        let mut conditions = Vec::with_capacity(query.len());
        for (column, value) in query {
            conditions.push(format!("{} = ?", quote_identifier(column)?));
            values.push(value.clone());
        }
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    Ok((sql, values))
}

/// Backtick-quote an identifier, allowing a `schema.table` qualifier.
fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts
        .iter()
        .any(|part| part.is_empty() || part.contains('`') || part.contains('\0'))
    {
        return Err(DatabaseError::InvalidIdentifier(name.to_string()));
    }
    Ok(parts
        .iter()
        .map(|part| format!("`{part}`"))
        .collect::<Vec<_>>()
        .join("."))
}

/// MongoDB through the `mongodb` driver, MySQL through `sqlx`.
#[derive(Debug, Clone, Default)]
pub struct DriverDatabaseReader;

impl DriverDatabaseReader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatabaseReader for DriverDatabaseReader {
    async fn read_mongo(
        &self,
        connection: &DatabaseConnection,
        collection: &str,
        query: &Map<String, Value>,
    ) -> Result<Vec<Value>, DatabaseError> {
        let filter = mongo_filter(query)?;
        debug!("Database '{}': find {collection} {filter}", connection.id);

        let client = Client::with_uri_str(&connection.uri)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        let database = match connection.database.as_deref() {
            Some(name) if !name.is_empty() => client.database(name),
            _ => client
                .default_database()
                .ok_or_else(|| DatabaseError::MissingDatabaseName(connection.id.clone()))?,
        };

        find_all(database.collection::<Document>(collection), filter)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    async fn read_mysql(
        &self,
        connection: &DatabaseConnection,
        table: &str,
        query: &Map<String, Value>,
    ) -> Result<Vec<Value>, DatabaseError> {
        let (sql, params) = select_statement(table, query)?;
        debug!("Database '{}': {sql}", connection.id);

        let mut conn = MySqlConnection::connect(&connection.connection_uri())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let mut statement = sqlx::query(&sql);
        for value in &params {
            statement = bind_json(statement, value);
        }
        let result = statement.fetch_all(&mut conn).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close connection to database '{}': {e}", connection.id);
        }

        let rows = result.map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(rows.iter().map(row_to_json).collect())
    }
}

/// Equality filter document for a `find`.
fn mongo_filter(query: &Map<String, Value>) -> Result<Document, DatabaseError> {
    bson::to_document(query).map_err(|e| DatabaseError::Query(e.to_string()))
}

async fn find_all(
    collection: Collection<Document>,
    filter: Document,
) -> Result<Vec<Value>, mongodb::error::Error> {
    let mut cursor = collection.find(filter).await?;
    let mut documents = Vec::new();
    while cursor.advance().await? {
        let document = cursor.deserialize_current()?;
        documents.push(bson_to_json(Bson::Document(document)));
    }
    Ok(documents)
}

/// Object ids render as hex strings and dates as ISO-8601 strings; other
/// values use relaxed extended JSON.
fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(dt) => chrono::DateTime::<chrono::Utc>::from_timestamp_millis(
            dt.timestamp_millis(),
        )
        .map(|dt| Value::String(iso_millis(dt)))
        .unwrap_or(Value::Null),
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

fn bind_json<'q>(
    statement: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => statement.bind(None::<String>),
        Value::Bool(b) => statement.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                statement.bind(i)
            } else if let Some(u) = n.as_u64() {
                statement.bind(u)
            } else {
                statement.bind(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => statement.bind(s.clone()),
        other => statement.bind(other.to_string()),
    }
}

fn row_to_json(row: &MySqlRow) -> Value {
    let mut object = Map::new();
    for column in row.columns() {
        let value = column_value(row, column.ordinal(), column.type_info().name());
        object.insert(column.name().to_string(), value);
    }
    Value::Object(object)
}

fn column_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Err(_) => return Value::Null,
        Ok(_) => {}
    }

    let decoded = match type_name {
        "BOOLEAN" => row.try_get::<bool, _>(index).ok().map(Value::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(index).ok().map(Value::from)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" => row.try_get_unchecked::<u64, _>(index).ok().map(Value::from),
        "FLOAT" => row
            .try_get::<f32, _>(index)
            .ok()
            .and_then(|f| Number::from_f64(f64::from(f)))
            .map(Value::Number),
        "DOUBLE" => row
            .try_get::<f64, _>(index)
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        "JSON" => row
            .try_get::<sqlx::types::Json<Value>, _>(index)
            .ok()
            .map(|json| json.0),
        "DATETIME" => row
            .try_get::<chrono::NaiveDateTime, _>(index)
            .ok()
            .map(|dt| Value::String(iso_millis(dt.and_utc()))),
        "TIMESTAMP" => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(index)
            .ok()
            .map(|dt| Value::String(iso_millis(dt))),
        "DATE" => row
            .try_get::<chrono::NaiveDate, _>(index)
            .ok()
            .map(|d| Value::String(d.to_string())),
        "TIME" => row
            .try_get::<chrono::NaiveTime, _>(index)
            .ok()
            .map(|t| Value::String(t.to_string())),
        _ => None,
    };

    decoded
        .or_else(|| row.try_get_unchecked::<String, _>(index).ok().map(Value::String))
        .or_else(|| {
            row.try_get_unchecked::<Vec<u8>, _>(index)
                .ok()
                .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        })
        .unwrap_or(Value::Null)
}

fn iso_millis(dt: chrono::DateTime<chrono::Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
