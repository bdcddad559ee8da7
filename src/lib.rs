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

pub use catalog::{Database, DropViewEvent, GrantsRegistry, PrivilegeChecker, RelationDescriptor, PUBLIC_SCHEMA};
pub use data_definition_execution_plan::{DropBehavior, DropViewsQuery, ExecutionError, ExecutionOutcome};
pub use definition::{FullRelationName, RelationId, RelationKind, SchemaId};
pub use schema_executor::{DropViewsPlan, StatementContext};

/// Identity on whose behalf statements run.
pub struct Session {
    user: String,
    default_schema: String,
}

impl Session {
    pub fn new<U: ToString>(user: U) -> Session {
        Session {
            user: user.to_string(),
            default_schema: PUBLIC_SCHEMA.to_owned(),
        }
    }

    pub fn with_default_schema<S: ToString>(mut self, default_schema: S) -> Session {
        self.default_schema = default_schema.to_string();
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }
}

/// Statement execution front door. Owns the catalog and the privilege
/// source and drives each statement through its plan-execute-commit cycle.
pub struct NodeEngine<P: PrivilegeChecker = GrantsRegistry> {
    database: Database,
    privileges: P,
}

impl<P: PrivilegeChecker> NodeEngine<P> {
    pub fn new(database: Database, privileges: P) -> NodeEngine<P> {
        NodeEngine { database, privileges }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn privileges(&self) -> &P {
        &self.privileges
    }

    /// Runs the whole statement inside a single transaction and retries it
    /// from scratch when the descriptor store detects a concurrent
    /// modification.
    pub fn execute_drop_views(
        &self,
        session: &Session,
        query: &DropViewsQuery,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        loop {
            let transaction = self.database.begin();
            let result = {
                let context = StatementContext::new(
                    &transaction,
                    &self.privileges,
                    session.user(),
                    session.default_schema(),
                    query.to_string(),
                );
                DropViewsPlan::plan(&context, query.clone()).and_then(|plan| plan.execute(&context))
            };
            match result {
                Ok(outcome) => match transaction.commit() {
                    Ok(()) => return Ok(outcome),
                    Err(conflict) => {
                        log::debug!("{} is retried: {}", query, conflict);
                    }
                },
                Err(ExecutionError::Conflict) => {
                    log::debug!("{} is retried after a mid-statement conflict", query);
                }
                Err(error) => return Err(error),
            }
        }
    }
}
