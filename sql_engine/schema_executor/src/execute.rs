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

use crate::StatementContext;
use catalog::{RelationDescriptor, StoreError};
use data_definition_execution_plan::{DropBehavior, ExecutionError};
use definition::RelationId;
use std::collections::HashSet;

/// Mutation phase of a drop batch. Runs only after [`CascadeValidator`]
/// cleared the whole batch, so every step here is expected to succeed short
/// of a descriptor version conflict.
///
/// [`CascadeValidator`]: crate::CascadeValidator
pub struct CascadeExecutor<'a> {
    context: &'a StatementContext<'a>,
}

impl<'a> CascadeExecutor<'a> {
    pub fn new(context: &'a StatementContext<'a>) -> CascadeExecutor<'a> {
        CascadeExecutor { context }
    }

    /// Tombstones the view, detaches it from both sides of the dependency
    /// graph and, with `CASCADE`, recursively drops every dependent. Returns
    /// the names of the additionally dropped views, depth-first with each
    /// dependent reported after its own cascade; the view itself is reported
    /// by the caller.
    pub fn drop_view(
        &self,
        view: &mut RelationDescriptor,
        behavior: DropBehavior,
    ) -> Result<Vec<String>, ExecutionError> {
        let mut path = HashSet::new();
        self.drop_view_inner(view, behavior, &mut path)
    }

    fn drop_view_inner(
        &self,
        view: &mut RelationDescriptor,
        behavior: DropBehavior,
        path: &mut HashSet<RelationId>,
    ) -> Result<Vec<String>, ExecutionError> {
        if !path.insert(view.id()) {
            return Err(ExecutionError::dependency_cycle(view.id()));
        }
        let transaction = self.context.transaction;
        for dependency_id in view.depends_on().to_vec() {
            let mut dependency = match transaction.relation(dependency_id) {
                Ok(descriptor) => descriptor,
                Err(error) => return Err(ExecutionError::dependency_resolution_failure(dependency_id, error)),
            };
            if dependency.dropped() {
                // tombstoned earlier in this transaction, gone at commit
                continue;
            }
            dependency.remove_back_reference(view.id());
            transaction
                .persist(dependency)
                .map_err(|error| store_error(dependency_id, error))?;
        }
        view.clear_dependencies();
        let mut cascade_dropped = vec![];
        if behavior == DropBehavior::Cascade {
            for reference in view.depended_on_by().to_vec() {
                let mut dependent = match transaction.relation(reference.id()) {
                    Ok(descriptor) => descriptor,
                    Err(error) => return Err(ExecutionError::dependency_resolution_failure(reference.id(), error)),
                };
                if dependent.dropped() {
                    continue;
                }
                let nested = self.drop_view_inner(&mut dependent, DropBehavior::Cascade, path)?;
                cascade_dropped.extend(nested);
                cascade_dropped.push(dependent.name().to_owned());
            }
        }
        transaction
            .initiate_drop(view)
            .map_err(|error| store_error(view.id(), error))?;
        transaction.register_absence_check(view.id());
        path.remove(&view.id());
        Ok(cascade_dropped)
    }
}

fn store_error(relation_id: RelationId, error: StoreError) -> ExecutionError {
    match error {
        StoreError::Conflict => ExecutionError::Conflict,
        other => ExecutionError::dependency_resolution_failure(relation_id, other),
    }
}
