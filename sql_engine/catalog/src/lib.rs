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

use dashmap::DashMap;
use definition::{FullRelationName, RelationId, RelationKind, SchemaId};
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Display, Formatter},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

mod access;
mod audit;
mod relation;

pub use access::{GrantsRegistry, PrivilegeChecker};
pub use audit::DropViewEvent;
pub use relation::{Reference, RelationDescriptor};

pub const PUBLIC_SCHEMA: &str = "public";

#[derive(Debug, PartialEq, Clone)]
pub enum StoreError {
    RelationNotFound(RelationId),
    SchemaNotFound(SchemaId),
    Conflict,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::RelationNotFound(id) => write!(f, "relation {} is not in the catalog", id),
            StoreError::SchemaNotFound(id) => write!(f, "schema {} is not in the catalog", id),
            StoreError::Conflict => write!(f, "descriptor version conflict"),
        }
    }
}

#[derive(Debug)]
struct VersionedRelation {
    version: u64,
    descriptor: RelationDescriptor,
}

struct CatalogStore {
    schemas: DashMap<SchemaId, String>,
    relations: DashMap<RelationId, VersionedRelation>,
    events: Mutex<Vec<DropViewEvent>>,
    commit_lock: Mutex<()>,
    id_generator: AtomicU64,
}

impl CatalogStore {
    fn new() -> CatalogStore {
        CatalogStore {
            schemas: DashMap::default(),
            relations: DashMap::default(),
            events: Mutex::new(vec![]),
            commit_lock: Mutex::new(()),
            id_generator: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.id_generator.fetch_add(1, Ordering::SeqCst)
    }

    fn schema_id_by_name(&self, schema_name: &str) -> Option<SchemaId> {
        self.schemas
            .iter()
            .find(|entry| entry.value() == schema_name)
            .map(|entry| *entry.key())
    }
}

/// Owner of the catalog. Descriptor creation goes through the database
/// directly (the CREATE flow is not transactional here); the drop subsystem
/// works through [`Transaction`] snapshots.
#[derive(Clone)]
pub struct Database {
    store: Arc<CatalogStore>,
}

impl Database {
    pub fn new() -> Database {
        let database = Database {
            store: Arc::new(CatalogStore::new()),
        };
        database.create_schema(PUBLIC_SCHEMA);
        database
    }

    pub fn create_schema(&self, schema_name: &str) -> SchemaId {
        let schema_id = SchemaId::from(self.store.next_id());
        self.store.schemas.insert(schema_id, schema_name.to_owned());
        schema_id
    }

    pub fn schema_id(&self, schema_name: &str) -> Option<SchemaId> {
        self.store.schema_id_by_name(schema_name)
    }

    pub fn create_table(&self, schema_id: SchemaId, table_name: &str) -> RelationId {
        let relation_id = RelationId::from(self.store.next_id());
        self.store.relations.insert(
            relation_id,
            VersionedRelation {
                version: 1,
                descriptor: RelationDescriptor::new(relation_id, table_name.to_owned(), schema_id, RelationKind::Table),
            },
        );
        relation_id
    }

    /// Creates a view depending on the given relations and installs the
    /// matching back-references, keeping the dependency graph symmetric.
    pub fn create_view(
        &self,
        schema_id: SchemaId,
        view_name: &str,
        depends_on: &[RelationId],
    ) -> Result<RelationId, StoreError> {
        for dependency_id in depends_on {
            if !self.store.relations.contains_key(dependency_id) {
                return Err(StoreError::RelationNotFound(*dependency_id));
            }
        }
        let relation_id = RelationId::from(self.store.next_id());
        let mut descriptor = RelationDescriptor::new(relation_id, view_name.to_owned(), schema_id, RelationKind::View);
        descriptor.set_depends_on(depends_on.to_vec());
        self.store.relations.insert(
            relation_id,
            VersionedRelation {
                version: 1,
                descriptor,
            },
        );
        for dependency_id in depends_on {
            if let Some(mut dependency) = self.store.relations.get_mut(dependency_id) {
                dependency.descriptor.add_back_reference(Reference::from(relation_id));
                dependency.version += 1;
            }
        }
        Ok(relation_id)
    }

    /// Installs a raw back-reference with no matching forward edge and no
    /// validation. Only useful to simulate a corrupted dependency graph in
    /// tests.
    #[doc(hidden)]
    pub fn force_back_reference(&self, on: RelationId, dependent: RelationId) {
        if let Some(mut relation) = self.store.relations.get_mut(&on) {
            relation.descriptor.add_back_reference(Reference::from(dependent));
            relation.version += 1;
        }
    }

    pub fn begin(&self) -> Transaction {
        Transaction {
            store: self.store.clone(),
            read_versions: RefCell::new(HashMap::new()),
            working: RefCell::new(HashMap::new()),
            removal_queue: RefCell::new(vec![]),
            staged_events: RefCell::new(vec![]),
            absence_checks: RefCell::new(vec![]),
        }
    }

    pub fn relation(&self, relation_id: RelationId) -> Option<RelationDescriptor> {
        self.store
            .relations
            .get(&relation_id)
            .map(|versioned| versioned.descriptor.clone())
    }

    pub fn relation_exists(&self, relation_id: RelationId) -> bool {
        self.store.relations.contains_key(&relation_id)
    }

    pub fn relations(&self) -> Vec<RelationDescriptor> {
        self.store
            .relations
            .iter()
            .map(|entry| entry.value().descriptor.clone())
            .collect()
    }

    pub fn events(&self) -> Vec<DropViewEvent> {
        self.store.events.lock().unwrap().clone()
    }
}

impl Default for Database {
    fn default() -> Database {
        Database::new()
    }
}

/// One transactional snapshot: descriptors are fetched by id, mutated and
/// persisted back; nothing is visible to other transactions until
/// [`Transaction::commit`] succeeds. Conflict detection is optimistic on
/// descriptor versions.
pub struct Transaction {
    store: Arc<CatalogStore>,
    read_versions: RefCell<HashMap<RelationId, u64>>,
    working: RefCell<HashMap<RelationId, RelationDescriptor>>,
    removal_queue: RefCell<Vec<RelationId>>,
    staged_events: RefCell<Vec<DropViewEvent>>,
    absence_checks: RefCell<Vec<RelationId>>,
}

impl Transaction {
    pub fn relation(&self, relation_id: RelationId) -> Result<RelationDescriptor, StoreError> {
        if let Some(descriptor) = self.working.borrow().get(&relation_id) {
            return Ok(descriptor.clone());
        }
        match self.store.relations.get(&relation_id) {
            Some(versioned) => {
                self.read_versions
                    .borrow_mut()
                    .entry(relation_id)
                    .or_insert(versioned.version);
                Ok(versioned.descriptor.clone())
            }
            None => Err(StoreError::RelationNotFound(relation_id)),
        }
    }

    /// Stages the descriptor's new state. Fails with [`StoreError::Conflict`]
    /// when another transaction has already moved the descriptor past the
    /// version this transaction first read.
    pub fn persist(&self, descriptor: RelationDescriptor) -> Result<(), StoreError> {
        let relation_id = descriptor.id();
        let base_version = match self.read_versions.borrow().get(&relation_id) {
            Some(version) => *version,
            None => return Err(StoreError::Conflict),
        };
        match self.store.relations.get(&relation_id) {
            Some(versioned) if versioned.version == base_version => {}
            _ => return Err(StoreError::Conflict),
        }
        self.working.borrow_mut().insert(relation_id, descriptor);
        Ok(())
    }

    /// Resolves a possibly-unqualified name against this transaction's view
    /// of the catalog. Tombstoned relations do not resolve.
    pub fn resolve(&self, name: &FullRelationName, default_schema: &str) -> Option<RelationDescriptor> {
        let schema_id = self.store.schema_id_by_name(name.schema_or(default_schema))?;
        let overlay_hit = self
            .working
            .borrow()
            .values()
            .find(|descriptor| {
                descriptor.schema_id() == schema_id && descriptor.name() == name.name() && !descriptor.dropped()
            })
            .cloned();
        if overlay_hit.is_some() {
            return overlay_hit;
        }
        for entry in self.store.relations.iter() {
            if self.working.borrow().contains_key(entry.key()) {
                continue;
            }
            let descriptor = &entry.value().descriptor;
            if descriptor.schema_id() == schema_id && descriptor.name() == name.name() && !descriptor.dropped() {
                self.read_versions
                    .borrow_mut()
                    .entry(*entry.key())
                    .or_insert(entry.value().version);
                return Some(descriptor.clone());
            }
        }
        None
    }

    pub fn qualified_name(&self, descriptor: &RelationDescriptor) -> Result<String, StoreError> {
        match self.store.schemas.get(&descriptor.schema_id()) {
            Some(schema_name) => Ok(format!("{}.{}", schema_name.value(), descriptor.name())),
            None => Err(StoreError::SchemaNotFound(descriptor.schema_id())),
        }
    }

    /// Tombstones the relation and schedules its removal from the catalog at
    /// commit. The point of no return for this relation.
    pub fn initiate_drop(&self, descriptor: &mut RelationDescriptor) -> Result<(), StoreError> {
        descriptor.set_dropped();
        self.persist(descriptor.clone())?;
        self.removal_queue.borrow_mut().push(descriptor.id());
        log::debug!("relation {} scheduled for removal", descriptor.id());
        Ok(())
    }

    pub fn log_event(&self, event: DropViewEvent) {
        self.staged_events.borrow_mut().push(event);
    }

    /// Registers a verification-build assertion that the relation is absent
    /// from the catalog once this transaction lands.
    pub fn register_absence_check(&self, relation_id: RelationId) {
        self.absence_checks.borrow_mut().push(relation_id);
    }

    /// Applies every staged write atomically. Fails with
    /// [`StoreError::Conflict`] without applying anything when any staged
    /// descriptor was concurrently modified.
    pub fn commit(self) -> Result<(), StoreError> {
        let Transaction {
            store,
            read_versions,
            working,
            removal_queue,
            staged_events,
            absence_checks,
        } = self;
        let read_versions = read_versions.into_inner();
        let working = working.into_inner();
        let removal_queue = removal_queue.into_inner();
        let staged_events = staged_events.into_inner();
        let absence_checks = absence_checks.into_inner();
        {
            let _serialized = store.commit_lock.lock().unwrap();
            for relation_id in working.keys() {
                let base_version = match read_versions.get(relation_id) {
                    Some(version) => *version,
                    None => return Err(StoreError::Conflict),
                };
                match store.relations.get(relation_id) {
                    Some(versioned) if versioned.version == base_version => {}
                    _ => return Err(StoreError::Conflict),
                }
            }
            for (relation_id, descriptor) in working {
                if removal_queue.contains(&relation_id) {
                    continue;
                }
                let next_version = read_versions[&relation_id] + 1;
                store.relations.insert(
                    relation_id,
                    VersionedRelation {
                        version: next_version,
                        descriptor,
                    },
                );
            }
            for relation_id in &removal_queue {
                store.relations.remove(relation_id);
            }
            store.events.lock().unwrap().extend(staged_events);
        }
        log::debug!("commit removed {} relation(s)", removal_queue.len());
        for relation_id in absence_checks {
            debug_assert!(
                !store.relations.contains_key(&relation_id),
                "relation {} must be absent from the catalog after commit",
                relation_id
            );
        }
        Ok(())
    }
}
