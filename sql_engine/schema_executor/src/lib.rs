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

use catalog::{DropViewEvent, PrivilegeChecker, RelationDescriptor, Transaction};
use data_definition_execution_plan::{DropViewsQuery, ExecutionError, ExecutionOutcome};

mod execute;
mod validate;

pub use execute::CascadeExecutor;
pub use validate::CascadeValidator;

/// Everything one statement execution is allowed to touch: the transaction
/// it runs in, the privilege source and the session identity. Passed
/// explicitly so the cascade machinery holds no ambient state of its own.
pub struct StatementContext<'a> {
    pub transaction: &'a Transaction,
    pub privileges: &'a dyn PrivilegeChecker,
    pub user: String,
    pub default_schema: String,
    pub statement: String,
}

impl<'a> StatementContext<'a> {
    pub fn new(
        transaction: &'a Transaction,
        privileges: &'a dyn PrivilegeChecker,
        user: &str,
        default_schema: &str,
        statement: String,
    ) -> StatementContext<'a> {
        StatementContext {
            transaction,
            privileges,
            user: user.to_owned(),
            default_schema: default_schema.to_owned(),
            statement,
        }
    }
}

/// Planned `DROP VIEW` statement. [`DropViewsPlan::plan`] resolves and
/// validates the whole batch without staging any catalog change;
/// [`DropViewsPlan::execute`] then performs the mutations. A statement that
/// fails planning leaves no trace in the transaction.
pub struct DropViewsPlan {
    query: DropViewsQuery,
    targets: Vec<RelationDescriptor>,
}

impl DropViewsPlan {
    pub fn plan(context: &StatementContext, query: DropViewsQuery) -> Result<DropViewsPlan, ExecutionError> {
        let mut targets: Vec<RelationDescriptor> = vec![];
        for name in &query.names {
            let descriptor = match context.transaction.resolve(name, &context.default_schema) {
                Some(descriptor) => descriptor,
                None if query.if_exists => continue,
                None => return Err(ExecutionError::undefined_relation(name)),
            };
            if !descriptor.is_view() {
                return Err(ExecutionError::wrong_object_type(name, descriptor.kind()));
            }
            if !context.privileges.has_drop_privilege(&context.user, &descriptor) {
                return Err(ExecutionError::authorization_denied(&context.user, name));
            }
            targets.push(descriptor);
        }
        let validator = CascadeValidator::new(context, &targets);
        for target in &targets {
            validator.check_target(target, query.behavior)?;
        }
        Ok(DropViewsPlan { query, targets })
    }

    /// `true` when every requested name was skipped by `IF EXISTS`.
    pub fn is_no_op(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn execute(self, context: &StatementContext) -> Result<ExecutionOutcome, ExecutionError> {
        let executor = CascadeExecutor::new(context);
        for target in &self.targets {
            // re-fetch: an earlier target of this very statement may have
            // cascaded into this one already
            let mut descriptor = match context.transaction.relation(target.id()) {
                Ok(descriptor) => descriptor,
                Err(_) => continue,
            };
            if descriptor.dropped() {
                continue;
            }
            let cascade_dropped_views = executor.drop_view(&mut descriptor, self.query.behavior)?;
            context.transaction.log_event(DropViewEvent {
                view_name: descriptor.name().to_owned(),
                statement: context.statement.clone(),
                user: context.user.clone(),
                cascade_dropped_views,
            });
        }
        Ok(ExecutionOutcome::ViewsDropped)
    }
}

#[cfg(test)]
mod tests;
