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
use catalog::{Reference, RelationDescriptor};
use data_definition_execution_plan::{DropBehavior, ExecutionError};
use definition::RelationId;
use std::collections::HashSet;

/// Read-only legality walk over the dependent closure of a drop batch.
/// Decides whether the whole statement may proceed without staging a single
/// descriptor change, so a rejected statement leaves the catalog untouched.
pub struct CascadeValidator<'a> {
    context: &'a StatementContext<'a>,
    batch: Vec<RelationId>,
}

impl<'a> CascadeValidator<'a> {
    pub fn new(context: &'a StatementContext<'a>, targets: &[RelationDescriptor]) -> CascadeValidator<'a> {
        CascadeValidator {
            context,
            batch: targets.iter().map(RelationDescriptor::id).collect(),
        }
    }

    pub fn check_target(&self, target: &RelationDescriptor, behavior: DropBehavior) -> Result<(), ExecutionError> {
        let mut path = HashSet::new();
        path.insert(target.id());
        for reference in target.depended_on_by() {
            // dependents named by the same statement are dropped anyway
            if self.batch.contains(&reference.id()) {
                continue;
            }
            self.check_dependent(target, reference, behavior, &mut path)?;
        }
        Ok(())
    }

    fn check_dependent(
        &self,
        from: &RelationDescriptor,
        reference: &Reference,
        behavior: DropBehavior,
        path: &mut HashSet<RelationId>,
    ) -> Result<(), ExecutionError> {
        let dependent = self.dependent_for_cascade(from, reference.id(), behavior)?;
        if !path.insert(dependent.id()) {
            return Err(ExecutionError::dependency_cycle(dependent.id()));
        }
        if !self
            .context
            .privileges
            .has_drop_privilege(&self.context.user, &dependent)
        {
            let relation = self
                .context
                .transaction
                .qualified_name(&dependent)
                .unwrap_or_else(|_| dependent.name().to_owned());
            return Err(ExecutionError::authorization_denied(&self.context.user, relation));
        }
        for transitive in dependent.depended_on_by() {
            if self.batch.contains(&transitive.id()) {
                continue;
            }
            self.check_dependent(&dependent, transitive, behavior, path)?;
        }
        path.remove(&dependent.id());
        Ok(())
    }

    /// Fetches the dependent behind a back-reference. Without `CASCADE` the
    /// dependent is a blocker and its name is reported back, qualified when
    /// it lives in a different schema.
    fn dependent_for_cascade(
        &self,
        from: &RelationDescriptor,
        dependent_id: RelationId,
        behavior: DropBehavior,
    ) -> Result<RelationDescriptor, ExecutionError> {
        let dependent = match self.context.transaction.relation(dependent_id) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                log::warn!("unable to retrieve descriptor of dependent view {}: {}", dependent_id, error);
                return Err(ExecutionError::dependency_resolution_failure(dependent_id, error));
            }
        };
        if behavior != DropBehavior::Cascade {
            let mut dependent_name = dependent.name().to_owned();
            if dependent.schema_id() != from.schema_id() {
                match self.context.transaction.qualified_name(&dependent) {
                    Ok(qualified) => dependent_name = qualified,
                    Err(error) => {
                        log::warn!("unable to retrieve qualified name of view {}: {}", dependent_id, error);
                        return Err(ExecutionError::dependent_view_unnamed(from.kind(), from.name()));
                    }
                }
            }
            return Err(ExecutionError::dependent_view(from.kind(), from.name(), &dependent_name));
        }
        Ok(dependent)
    }
}
