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

#[rstest::rstest]
fn cascade_drops_transitive_dependents(cluster: Cluster) {
    let Cluster { database, privileges } = cluster;
    let schema = database.schema_id(PUBLIC_SCHEMA).unwrap();
    let table = database.create_table(schema, "measurements");
    let daily = database.create_view(schema, "daily", &[table]).unwrap();
    let weekly = database.create_view(schema, "weekly", &[daily]).unwrap();
    let monthly = database.create_view(schema, "monthly", &[weekly]).unwrap();

    assert_eq!(
        run_statement(
            &database,
            &privileges,
            ROOT,
            drop_views(vec!["daily"], false, DropBehavior::Cascade)
        ),
        Ok(ExecutionOutcome::ViewsDropped)
    );

    assert!(!database.relation_exists(daily));
    assert!(!database.relation_exists(weekly));
    assert!(!database.relation_exists(monthly));
    assert!(database.relation_exists(table));
    assert_eq!(database.relation(table).unwrap().depended_on_by(), &[]);
    assert_graph_symmetric(&database);

    let events = database.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].view_name, "daily");
    // each dependent is reported after its own cascade
    assert_eq!(events[0].cascade_dropped_views, vec!["monthly".to_owned(), "weekly".to_owned()]);
}

#[rstest::rstest]
fn diamond_shaped_dependents_drop_once(cluster: Cluster) {
    let Cluster { database, privileges } = cluster;
    let schema = database.schema_id(PUBLIC_SCHEMA).unwrap();
    let base = database.create_view(schema, "base", &[]).unwrap();
    let left = database.create_view(schema, "left_leg", &[base]).unwrap();
    let right = database.create_view(schema, "right_leg", &[base]).unwrap();
    let top = database.create_view(schema, "rollup", &[left, right]).unwrap();

    assert_eq!(
        run_statement(
            &database,
            &privileges,
            ROOT,
            drop_views(vec!["base"], false, DropBehavior::Cascade)
        ),
        Ok(ExecutionOutcome::ViewsDropped)
    );

    assert!(!database.relation_exists(base));
    assert!(!database.relation_exists(left));
    assert!(!database.relation_exists(right));
    assert!(!database.relation_exists(top));

    let events = database.events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].cascade_dropped_views,
        vec!["rollup".to_owned(), "left_leg".to_owned(), "right_leg".to_owned()]
    );
}

#[rstest::rstest]
fn statement_and_user_are_recorded_in_the_event(cluster: Cluster) {
    let Cluster { database, privileges } = cluster;
    let schema = database.schema_id(PUBLIC_SCHEMA).unwrap();
    let table = database.create_table(schema, "measurements");
    database.create_view(schema, "daily", &[table]).unwrap();

    run_statement(
        &database,
        &privileges,
        ROOT,
        drop_views(vec!["daily"], false, DropBehavior::Cascade),
    )
    .unwrap();

    let events = database.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].statement, "DROP VIEW daily CASCADE");
    assert_eq!(events[0].user, ROOT);
}

#[rstest::rstest]
fn target_already_taken_by_an_earlier_cascade_is_skipped(cluster: Cluster) {
    let Cluster { database, privileges } = cluster;
    let schema = database.schema_id(PUBLIC_SCHEMA).unwrap();
    let table = database.create_table(schema, "measurements");
    let daily = database.create_view(schema, "daily", &[table]).unwrap();
    let weekly = database.create_view(schema, "weekly", &[daily]).unwrap();

    assert_eq!(
        run_statement(
            &database,
            &privileges,
            ROOT,
            drop_views(vec!["daily", "weekly"], false, DropBehavior::Cascade)
        ),
        Ok(ExecutionOutcome::ViewsDropped)
    );

    assert!(!database.relation_exists(daily));
    assert!(!database.relation_exists(weekly));
    assert_graph_symmetric(&database);

    // "weekly" went down with the cascade of "daily", not on its own
    let events = database.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].view_name, "daily");
    assert_eq!(events[0].cascade_dropped_views, vec!["weekly".to_owned()]);
}

#[rstest::rstest]
fn corrupted_graph_cycle_fails_validation(cluster: Cluster) {
    let Cluster { database, privileges } = cluster;
    let schema = database.schema_id(PUBLIC_SCHEMA).unwrap();
    let daily = database.create_view(schema, "daily", &[]).unwrap();
    let weekly = database.create_view(schema, "weekly", &[daily]).unwrap();
    let monthly = database.create_view(schema, "monthly", &[weekly]).unwrap();
    database.force_back_reference(monthly, weekly);
    let before = snapshot(&database);

    assert_eq!(
        run_statement(
            &database,
            &privileges,
            ROOT,
            drop_views(vec!["daily"], false, DropBehavior::Cascade)
        ),
        Err(ExecutionError::DependencyCycle(weekly))
    );

    assert_eq!(snapshot(&database), before);
    assert_eq!(database.events(), vec![]);
}

#[rstest::rstest]
fn executor_guards_against_cyclic_recursion(cluster: Cluster) {
    let Cluster { database, privileges } = cluster;
    let schema = database.schema_id(PUBLIC_SCHEMA).unwrap();
    let daily = database.create_view(schema, "daily", &[]).unwrap();
    let weekly = database.create_view(schema, "weekly", &[daily]).unwrap();
    database.force_back_reference(weekly, daily);
    let transaction = database.begin();
    let context = StatementContext::new(
        &transaction,
        &privileges,
        ROOT,
        PUBLIC_SCHEMA,
        "DROP VIEW daily CASCADE".to_owned(),
    );
    let mut descriptor = transaction.relation(daily).unwrap();

    assert_eq!(
        CascadeExecutor::new(&context).drop_view(&mut descriptor, DropBehavior::Cascade),
        Err(ExecutionError::dependency_cycle(daily))
    );
}
