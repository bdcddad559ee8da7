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

use crate::relation::RelationDescriptor;
use dashmap::DashSet;
use definition::RelationId;

/// Answers "does this principal hold DROP on this relation". The cascade
/// machinery only ever asks the boolean question; grant management is a
/// separate concern.
pub trait PrivilegeChecker {
    fn has_drop_privilege(&self, user: &str, relation: &RelationDescriptor) -> bool;
}

#[derive(Default)]
pub struct GrantsRegistry {
    superusers: DashSet<String>,
    drop_grants: DashSet<(String, RelationId)>,
}

impl GrantsRegistry {
    pub fn new() -> GrantsRegistry {
        GrantsRegistry::default()
    }

    pub fn add_superuser<U: ToString>(&self, user: U) {
        self.superusers.insert(user.to_string());
    }

    pub fn grant_drop<U: ToString>(&self, user: U, relation_id: RelationId) {
        self.drop_grants.insert((user.to_string(), relation_id));
    }

    pub fn revoke_drop(&self, user: &str, relation_id: RelationId) {
        self.drop_grants.remove(&(user.to_owned(), relation_id));
    }
}

impl PrivilegeChecker for GrantsRegistry {
    fn has_drop_privilege(&self, user: &str, relation: &RelationDescriptor) -> bool {
        self.superusers.contains(user) || self.drop_grants.contains(&(user.to_owned(), relation.id()))
    }
}
