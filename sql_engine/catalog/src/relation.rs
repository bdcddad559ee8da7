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

use definition::{RelationId, RelationKind, SchemaId};

/// Back-reference recorded on a relation, naming a relation that depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    id: RelationId,
}

impl Reference {
    pub fn id(&self) -> RelationId {
        self.id
    }
}

impl From<RelationId> for Reference {
    fn from(id: RelationId) -> Reference {
        Reference { id }
    }
}

/// Persisted metadata record for a table or a view.
///
/// Invariant: for every id `B` in `depends_on` of relation `A`, the
/// descriptor of `B` holds a `Reference` to `A` in `depended_on_by`, and
/// vice versa. Mutations here keep single descriptors consistent; the
/// cross-descriptor invariant is upheld by the callers that persist both
/// sides within one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDescriptor {
    id: RelationId,
    name: String,
    schema_id: SchemaId,
    kind: RelationKind,
    dropped: bool,
    depends_on: Vec<RelationId>,
    depended_on_by: Vec<Reference>,
}

impl RelationDescriptor {
    pub(crate) fn new(id: RelationId, name: String, schema_id: SchemaId, kind: RelationKind) -> RelationDescriptor {
        RelationDescriptor {
            id,
            name,
            schema_id,
            kind,
            dropped: false,
            depends_on: vec![],
            depended_on_by: vec![],
        }
    }

    pub fn id(&self) -> RelationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn is_view(&self) -> bool {
        self.kind == RelationKind::View
    }

    pub fn dropped(&self) -> bool {
        self.dropped
    }

    pub(crate) fn set_dropped(&mut self) {
        self.dropped = true;
    }

    pub fn depends_on(&self) -> &[RelationId] {
        &self.depends_on
    }

    pub fn depended_on_by(&self) -> &[Reference] {
        &self.depended_on_by
    }

    pub(crate) fn set_depends_on(&mut self, depends_on: Vec<RelationId>) {
        self.depends_on = depends_on;
    }

    pub(crate) fn add_back_reference(&mut self, reference: Reference) {
        self.depended_on_by.push(reference);
    }

    /// Removes every back-reference naming `target_id`. A no-op when no such
    /// reference is recorded, so a descriptor that was already partially
    /// cleaned can be cleaned again.
    pub fn remove_back_reference(&mut self, target_id: RelationId) {
        self.depended_on_by.retain(|reference| reference.id() != target_id);
    }

    pub fn clear_dependencies(&mut self) {
        self.depends_on.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: u64, name: &str) -> RelationDescriptor {
        RelationDescriptor::new(
            RelationId::from(id),
            name.to_owned(),
            SchemaId::from(1),
            RelationKind::View,
        )
    }

    #[test]
    fn removes_every_matching_back_reference() {
        let mut descriptor = view(10, "base_view");
        descriptor.add_back_reference(Reference::from(RelationId::from(11)));
        descriptor.add_back_reference(Reference::from(RelationId::from(12)));
        descriptor.add_back_reference(Reference::from(RelationId::from(11)));

        descriptor.remove_back_reference(RelationId::from(11));

        assert_eq!(descriptor.depended_on_by(), &[Reference::from(RelationId::from(12))]);
    }

    #[test]
    fn removing_absent_back_reference_changes_nothing() {
        let mut descriptor = view(10, "base_view");
        descriptor.add_back_reference(Reference::from(RelationId::from(12)));

        descriptor.remove_back_reference(RelationId::from(99));

        assert_eq!(descriptor.depended_on_by(), &[Reference::from(RelationId::from(12))]);
    }

    #[test]
    fn removing_from_clean_descriptor_is_idempotent() {
        let mut descriptor = view(10, "base_view");

        descriptor.remove_back_reference(RelationId::from(11));
        descriptor.remove_back_reference(RelationId::from(11));

        assert_eq!(descriptor.depended_on_by(), &[]);
    }
}
