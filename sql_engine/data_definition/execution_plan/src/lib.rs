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

use definition::{FullRelationName, RelationId, RelationKind};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropBehavior {
    Restrict,
    Cascade,
}

impl Default for DropBehavior {
    fn default() -> DropBehavior {
        DropBehavior::Restrict
    }
}

/// `DROP VIEW [IF EXISTS] name [, ...] [CASCADE]` after name analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DropViewsQuery {
    pub names: Vec<FullRelationName>,
    pub if_exists: bool,
    pub behavior: DropBehavior,
}

impl Display for DropViewsQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DROP VIEW ")?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        let names = self.names.iter().map(ToString::to_string).collect::<Vec<String>>();
        write!(f, "{}", names.join(", "))?;
        if self.behavior == DropBehavior::Cascade {
            write!(f, " CASCADE")?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub enum ExecutionOutcome {
    ViewsDropped,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExecutionError {
    /// Named target does not resolve and `IF EXISTS` was not given.
    UndefinedRelation(String),
    /// Named target exists but is not a view.
    WrongObjectType { name: String, kind: RelationKind },
    /// A dependent relation blocks a non-cascading drop.
    DependentObjectBlocked { message: String, hint: Option<String> },
    /// A cascade would drop a relation the principal lacks DROP privilege on.
    AuthorizationDenied { user: String, relation: String },
    /// A fetch for a supposedly-existing dependency or dependent failed.
    DependencyResolutionFailure { id: RelationId, details: String },
    /// The dependency graph contains a cycle; the catalog is corrupted.
    DependencyCycle(RelationId),
    /// Concurrent modification detected by the descriptor store.
    Conflict,
}

impl ExecutionError {
    pub fn undefined_relation(name: &FullRelationName) -> ExecutionError {
        ExecutionError::UndefinedRelation(name.to_string())
    }

    pub fn wrong_object_type(name: &FullRelationName, kind: RelationKind) -> ExecutionError {
        ExecutionError::WrongObjectType {
            name: name.to_string(),
            kind,
        }
    }

    pub fn dependent_view(kind: RelationKind, object_name: &str, view_name: &str) -> ExecutionError {
        ExecutionError::DependentObjectBlocked {
            message: format!(
                "cannot drop {} \"{}\" because view \"{}\" depends on it",
                kind, object_name, view_name
            ),
            hint: Some(format!("you can drop {} instead.", view_name)),
        }
    }

    /// Degraded variant used when the dependent view's name cannot be
    /// qualified; the block is still reported, without a hint.
    pub fn dependent_view_unnamed(kind: RelationKind, object_name: &str) -> ExecutionError {
        ExecutionError::DependentObjectBlocked {
            message: format!("cannot drop {} \"{}\" because a view depends on it", kind, object_name),
            hint: None,
        }
    }

    pub fn authorization_denied<U: ToString, R: ToString>(user: U, relation: R) -> ExecutionError {
        ExecutionError::AuthorizationDenied {
            user: user.to_string(),
            relation: relation.to_string(),
        }
    }

    pub fn dependency_resolution_failure<D: ToString>(id: RelationId, details: D) -> ExecutionError {
        ExecutionError::DependencyResolutionFailure {
            id,
            details: details.to_string(),
        }
    }

    pub fn dependency_cycle(id: RelationId) -> ExecutionError {
        ExecutionError::DependencyCycle(id)
    }
}

impl Display for ExecutionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::UndefinedRelation(name) => write!(f, "view \"{}\" does not exist", name),
            ExecutionError::WrongObjectType { name, kind } => write!(f, "\"{}\" is a {}, not a view", name, kind),
            ExecutionError::DependentObjectBlocked { message, .. } => write!(f, "{}", message),
            ExecutionError::AuthorizationDenied { user, relation } => {
                write!(f, "user {} does not have DROP privilege on {}", user, relation)
            }
            ExecutionError::DependencyResolutionFailure { id, details } => {
                write!(f, "error resolving dependency relation ID {}: {}", id, details)
            }
            ExecutionError::DependencyCycle(id) => {
                write!(f, "cyclic dependency detected at relation ID {}", id)
            }
            ExecutionError::Conflict => write!(f, "concurrent modification of relation descriptors"),
        }
    }
}
