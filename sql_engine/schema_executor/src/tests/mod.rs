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

use super::*;
use catalog::{Database, GrantsRegistry, PUBLIC_SCHEMA};
use data_definition_execution_plan::DropBehavior;
use definition::{FullRelationName, RelationKind};

mod cascade;

const ROOT: &str = "root";

struct Cluster {
    database: Database,
    privileges: GrantsRegistry,
}

#[rstest::fixture]
fn cluster() -> Cluster {
    let database = Database::new();
    let privileges = GrantsRegistry::new();
    privileges.add_superuser(ROOT);
    Cluster { database, privileges }
}

fn drop_views(names: Vec<&str>, if_exists: bool, behavior: DropBehavior) -> DropViewsQuery {
    DropViewsQuery {
        names: names.into_iter().map(FullRelationName::from).collect(),
        if_exists,
        behavior,
    }
}

fn run_statement(
    database: &Database,
    privileges: &GrantsRegistry,
    user: &str,
    query: DropViewsQuery,
) -> Result<ExecutionOutcome, ExecutionError> {
    let transaction = database.begin();
    let statement = query.to_string();
    let outcome = {
        let context = StatementContext::new(&transaction, privileges, user, PUBLIC_SCHEMA, statement);
        DropViewsPlan::plan(&context, query).and_then(|plan| plan.execute(&context))
    }?;
    transaction.commit().map_err(|_| ExecutionError::Conflict)?;
    Ok(outcome)
}

fn snapshot(database: &Database) -> Vec<RelationDescriptor> {
    let mut relations = database.relations();
    relations.sort_by_key(RelationDescriptor::id);
    relations
}

fn assert_graph_symmetric(database: &Database) {
    let relations = database.relations();
    for relation in &relations {
        for dependency_id in relation.depends_on() {
            let dependency = relations
                .iter()
                .find(|descriptor| descriptor.id() == *dependency_id)
                .unwrap_or_else(|| panic!("dependency {} of relation {} is gone", dependency_id, relation.id()));
            assert!(
                dependency
                    .depended_on_by()
                    .iter()
                    .any(|reference| reference.id() == relation.id()),
                "relation {} lacks a back-reference to {}",
                dependency.id(),
                relation.id()
            );
        }
        for reference in relation.depended_on_by() {
            let dependent = relations
                .iter()
                .find(|descriptor| descriptor.id() == reference.id())
                .unwrap_or_else(|| panic!("dependent {} of relation {} is gone", reference.id(), relation.id()));
            assert!(
                dependent.depends_on().contains(&relation.id()),
                "relation {} lacks a forward reference to {}",
                dependent.id(),
                relation.id()
            );
        }
    }
}
