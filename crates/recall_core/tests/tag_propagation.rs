use recall_core::db::{open_db, open_db_in_memory};
use recall_core::{
    EventRepository, EventService, GoalFrequency, GoalId, GoalPriority, GoalRatingSet,
    GoalService, NewEvent, NewGoal, NewTag, SqliteEventRepository, SqliteGoalRepository,
    SqliteTagRepository, Tag, TagColor, TagService, TagUpdate, TagUpdatePolicy,
};
use rusqlite::Connection;

fn goal(conn: &Connection, label: &str) -> GoalId {
    GoalService::new(SqliteGoalRepository::new(conn))
        .create_goal(NewGoal {
            label: label.to_string(),
            description: None,
            frequency: GoalFrequency::Weekly,
            target_hours: 10.0,
            priority: GoalPriority::Medium,
        })
        .unwrap()
        .id
}

fn ratings(entries: &[(GoalId, &str)]) -> GoalRatingSet {
    entries
        .iter()
        .map(|(goal_id, rating)| (*goal_id, rating.to_string()))
        .collect()
}

fn tag_service(conn: &Connection) -> TagService<SqliteTagRepository<'_>, SqliteEventRepository<'_>> {
    TagService::new(SqliteTagRepository::new(conn), SqliteEventRepository::new(conn))
}

fn event_service(
    conn: &Connection,
) -> EventService<SqliteEventRepository<'_>, SqliteTagRepository<'_>> {
    EventService::new(SqliteEventRepository::new(conn), SqliteTagRepository::new(conn))
}

fn create_tag(conn: &Connection, label: &str, tag_ratings: GoalRatingSet) -> Tag {
    tag_service(conn)
        .create_tag(NewTag {
            label: label.to_string(),
            color: TagColor::new(0.1, 0.4, 0.9),
            is_favorite: false,
            ratings: tag_ratings,
        })
        .unwrap()
}

fn recall(conn: &Connection, title: &str, tag: &Tag) -> recall_core::EventId {
    event_service(conn)
        .recall_event(NewEvent {
            title: title.to_string(),
            notes: None,
            start_ms: 0,
            end_ms: 3_600_000,
            tag_id: Some(tag.id),
        })
        .unwrap()
        .id
}

fn edit(tag: &Tag, new_ratings: GoalRatingSet) -> TagUpdate {
    TagUpdate {
        id: tag.id,
        label: tag.label.clone(),
        color: tag.color,
        is_favorite: tag.is_favorite,
        ratings: new_ratings,
    }
}

fn stored_ratings(conn: &Connection, id: recall_core::EventId) -> GoalRatingSet {
    SqliteEventRepository::new(conn)
        .get_event(id)
        .unwrap()
        .unwrap()
        .ratings
}

/// Tag "Work" rated `{a: 1}`; X untouched, Y customized to `{a: 2}`.
struct WorkScenario {
    conn: Connection,
    goal_a: GoalId,
    goal_b: GoalId,
    tag: Tag,
    x: recall_core::EventId,
    y: recall_core::EventId,
}

fn work_scenario() -> WorkScenario {
    let conn = open_db_in_memory().unwrap();
    let goal_a = goal(&conn, "Focus");
    let goal_b = goal(&conn, "Learning");
    let tag = create_tag(&conn, "Work", ratings(&[(goal_a, "1")]));
    let x = recall(&conn, "Planning", &tag);
    let y = recall(&conn, "Review", &tag);
    event_service(&conn)
        .customize_ratings(y, ratings(&[(goal_a, "2")]))
        .unwrap();
    WorkScenario {
        conn,
        goal_a,
        goal_b,
        tag,
        x,
        y,
    }
}

#[test]
fn recalled_event_copies_tag_ratings() {
    let s = work_scenario();
    assert_eq!(stored_ratings(&s.conn, s.x), ratings(&[(s.goal_a, "1")]));
}

#[test]
fn preserve_custom_adds_new_goal_and_keeps_customization() {
    let s = work_scenario();
    let outcome = tag_service(&s.conn)
        .update_tag(
            edit(&s.tag, ratings(&[(s.goal_a, "1"), (s.goal_b, "3")])),
            TagUpdatePolicy::PreserveCustom,
        )
        .unwrap();

    assert!(outcome.propagation.is_complete());
    assert_eq!(
        stored_ratings(&s.conn, s.x),
        ratings(&[(s.goal_a, "1"), (s.goal_b, "3")])
    );
    assert_eq!(
        stored_ratings(&s.conn, s.y),
        ratings(&[(s.goal_a, "2"), (s.goal_b, "3")])
    );
}

#[test]
fn preserve_custom_removes_dropped_goal_only_where_unmodified() {
    let s = work_scenario();
    tag_service(&s.conn)
        .update_tag(edit(&s.tag, GoalRatingSet::new()), TagUpdatePolicy::PreserveCustom)
        .unwrap();

    assert_eq!(stored_ratings(&s.conn, s.x), GoalRatingSet::new());
    assert_eq!(stored_ratings(&s.conn, s.y), ratings(&[(s.goal_a, "2")]));
}

#[test]
fn preserve_custom_twice_matches_once() {
    let s = work_scenario();
    let service = tag_service(&s.conn);
    let update = edit(&s.tag, ratings(&[(s.goal_a, "4"), (s.goal_b, "3")]));
    let old = s.tag.ratings.clone();
    let new = update.ratings.clone();

    service
        .update_tag(update, TagUpdatePolicy::PreserveCustom)
        .unwrap();
    let after_once = (stored_ratings(&s.conn, s.x), stored_ratings(&s.conn, s.y));

    // Replay the same old -> new transition directly against the store.
    let events = SqliteEventRepository::new(&s.conn);
    let report = recall_core::TagUpdatePropagator::new(&events)
        .propagate(s.tag.id, TagUpdatePolicy::PreserveCustom, &old, &new)
        .unwrap();

    assert!(report.updated.is_empty());
    assert_eq!(
        (stored_ratings(&s.conn, s.x), stored_ratings(&s.conn, s.y)),
        after_once
    );
}

#[test]
fn complete_override_replaces_every_event() {
    let s = work_scenario();
    let new = ratings(&[(s.goal_b, "5")]);
    let outcome = tag_service(&s.conn)
        .update_tag(edit(&s.tag, new.clone()), TagUpdatePolicy::CompleteOverride)
        .unwrap();

    assert_eq!(outcome.propagation.updated.len(), 2);
    assert_eq!(stored_ratings(&s.conn, s.x), new);
    assert_eq!(stored_ratings(&s.conn, s.y), new);
}

#[test]
fn name_only_leaves_events_untouched_but_updates_tag() {
    let s = work_scenario();
    let mut update = edit(&s.tag, ratings(&[(s.goal_b, "5")]));
    update.label = "Office".to_string();
    let outcome = tag_service(&s.conn)
        .update_tag(update, TagUpdatePolicy::NameOnly)
        .unwrap();

    assert_eq!(outcome.tag.label, "Office");
    assert_eq!(stored_ratings(&s.conn, s.x), ratings(&[(s.goal_a, "1")]));
    assert_eq!(stored_ratings(&s.conn, s.y), ratings(&[(s.goal_a, "2")]));
}

#[test]
fn removed_event_rating_is_not_resurrected() {
    let s = work_scenario();
    event_service(&s.conn)
        .remove_event_rating(s.x, s.goal_a)
        .unwrap();

    tag_service(&s.conn)
        .update_tag(
            edit(&s.tag, ratings(&[(s.goal_a, "7")])),
            TagUpdatePolicy::PreserveCustom,
        )
        .unwrap();

    assert_eq!(stored_ratings(&s.conn, s.x), GoalRatingSet::new());
}

#[test]
fn rename_keeps_event_association() {
    let s = work_scenario();
    let service = tag_service(&s.conn);
    let mut rename = edit(&s.tag, s.tag.ratings.clone());
    rename.label = "Job".to_string();
    service
        .update_tag(rename, TagUpdatePolicy::NameOnly)
        .unwrap();

    let renamed = service.get_tag(s.tag.id).unwrap().unwrap();
    let outcome = service
        .update_tag(
            edit(&renamed, ratings(&[(s.goal_a, "9")])),
            TagUpdatePolicy::PreserveCustom,
        )
        .unwrap();

    assert_eq!(outcome.propagation.updated, vec![s.x]);
    assert_eq!(stored_ratings(&s.conn, s.x), ratings(&[(s.goal_a, "9")]));
}

#[test]
fn default_policy_is_preserve_custom() {
    let s = work_scenario();
    let service = tag_service(&s.conn);
    assert_eq!(service.default_policy(), TagUpdatePolicy::PreserveCustom);

    service
        .update_tag_with_default_policy(edit(&s.tag, ratings(&[(s.goal_a, "3")])))
        .unwrap();
    assert_eq!(stored_ratings(&s.conn, s.x), ratings(&[(s.goal_a, "3")]));
    assert_eq!(stored_ratings(&s.conn, s.y), ratings(&[(s.goal_a, "2")]));
}

#[test]
fn events_of_other_tags_are_not_visited() {
    let s = work_scenario();
    let other = create_tag(&s.conn, "Home", ratings(&[(s.goal_a, "1")]));
    let z = recall(&s.conn, "Dinner", &other);

    tag_service(&s.conn)
        .update_tag(edit(&s.tag, GoalRatingSet::new()), TagUpdatePolicy::CompleteOverride)
        .unwrap();

    assert_eq!(stored_ratings(&s.conn, z), ratings(&[(s.goal_a, "1")]));
}

#[test]
fn edit_from_second_connection_sees_the_latest_tag_ratings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let first = open_db(&path).unwrap();
    let second = open_db(&path).unwrap();

    let goal_a = goal(&first, "Focus");
    let tag = create_tag(&first, "Work", ratings(&[(goal_a, "1")]));
    let x = recall(&first, "Planning", &tag);
    // `second` has loaded the tag before `first` edits it.
    let seen_by_second = tag_service(&second).get_tag(tag.id).unwrap().unwrap();

    tag_service(&first)
        .update_tag(
            edit(&tag, ratings(&[(goal_a, "2")])),
            TagUpdatePolicy::PreserveCustom,
        )
        .unwrap();
    assert_eq!(stored_ratings(&first, x), ratings(&[(goal_a, "2")]));

    tag_service(&second)
        .update_tag(
            edit(&seen_by_second, ratings(&[(goal_a, "3")])),
            TagUpdatePolicy::PreserveCustom,
        )
        .unwrap();
    assert_eq!(stored_ratings(&second, x), ratings(&[(goal_a, "3")]));
}
