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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connection details for a database-backed endpoint.
///
/// The `type` is kept as written in the configuration so an unrecognised
/// backend can be reported at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnection {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    MongoDb,
    MySql,
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MONGODB" => Ok(DatabaseKind::MongoDb),
            "MYSQL" => Ok(DatabaseKind::MySql),
            other => Err(format!("Unknown database type '{other}'")),
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseKind::MongoDb => write!(f, "MONGODB"),
            DatabaseKind::MySql => write!(f, "MYSQL"),
        }
    }
}

impl DatabaseConnection {
    pub fn kind(&self) -> Option<DatabaseKind> {
        self.kind.parse().ok()
    }

    /// `<uri>/<database>` when a database name is set, else the bare URI.
    pub fn connection_uri(&self) -> String {
        match self.database.as_deref() {
            Some(database) if !database.is_empty() => {
                format!("{}/{database}", self.uri.trim_end_matches('/'))
            }
            _ => self.uri.clone(),
        }
    }
}
