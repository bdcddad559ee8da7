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

use cascadedb::{
    Database, DropBehavior, DropViewsQuery, FullRelationName, GrantsRegistry, NodeEngine, Session, PUBLIC_SCHEMA,
};

fn main() {
    if let Ok(()) = simple_logger::SimpleLogger::new().init() {};

    let database = Database::new();
    let schema = database.schema_id(PUBLIC_SCHEMA).expect("public schema is bootstrapped");
    let table = database.create_table(schema, "measurements");
    let daily = database.create_view(schema, "daily", &[table]).expect("table exists");
    database.create_view(schema, "weekly", &[daily]).expect("view exists");

    let privileges = GrantsRegistry::new();
    privileges.add_superuser("root");
    let engine = NodeEngine::new(database, privileges);
    let session = Session::new("root");

    let restricted = DropViewsQuery {
        names: vec![FullRelationName::from("daily")],
        if_exists: false,
        behavior: DropBehavior::Restrict,
    };
    match engine.execute_drop_views(&session, &restricted) {
        Ok(outcome) => log::info!("{}: {:?}", restricted, outcome),
        Err(error) => log::info!("{}: {}", restricted, error),
    }

    let cascading = DropViewsQuery {
        names: vec![FullRelationName::from("daily")],
        if_exists: false,
        behavior: DropBehavior::Cascade,
    };
    match engine.execute_drop_views(&session, &cascading) {
        Ok(outcome) => log::info!("{}: {:?}", cascading, outcome),
        Err(error) => log::info!("{}: {}", cascading, error),
    }

    for event in engine.database().events() {
        log::info!(
            "audit: user {} ran {:?} and additionally dropped {:?}",
            event.user,
            event.statement,
            event.cascade_dropped_views
        );
    }
}
