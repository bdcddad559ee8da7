// Copyright 2020 - present Alex Dukhno
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

use std::fmt::{self, Display, Formatter};

/// Immutable numeric id of a relation, unique within the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(u64);

impl From<u64> for RelationId {
    fn from(id: u64) -> RelationId {
        RelationId(id)
    }
}

impl Display for RelationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id of the schema that contains a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(u64);

impl From<u64> for SchemaId {
    fn from(id: u64) -> SchemaId {
        SchemaId(id)
    }
}

impl Display for SchemaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Table,
    View,
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Table => write!(f, "table"),
            RelationKind::View => write!(f, "view"),
        }
    }
}

/// A possibly schema-qualified relation name as it appears in a statement.
#[derive(Debug, PartialEq, Clone)]
pub struct FullRelationName {
    schema: Option<String>,
    name: String,
}

impl FullRelationName {
    pub fn schema_or<'n>(&'n self, default_schema: &'n str) -> &'n str {
        self.schema.as_deref().unwrap_or(default_schema)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S: ToString, N: ToString> From<(&S, &N)> for FullRelationName {
    fn from(tuple: (&S, &N)) -> Self {
        let (schema, name) = tuple;
        FullRelationName {
            schema: Some(schema.to_string()),
            name: name.to_string(),
        }
    }
}

impl From<&str> for FullRelationName {
    fn from(name: &str) -> Self {
        FullRelationName {
            schema: None,
            name: name.to_owned(),
        }
    }
}

impl Display for FullRelationName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.schema.as_ref() {
            None => write!(f, "{}", self.name),
            Some(schema_name) => write!(f, "{}.{}", schema_name, self.name),
        }
    }
}
