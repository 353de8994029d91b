use super::*;
use serde_json::{json, Value};

fn snapshot(value: Value) -> Snapshot {
    serde_json::from_value(value).unwrap()
}

fn table_json(table: &TurtleTable) -> Value {
    serde_json::to_value(table).unwrap()
}

/// S2 overriding S1 field by field
fn combine(first: &Snapshot, second: &Snapshot) -> Snapshot {
    let mut combined = first.clone();
    for (id, patch) in second {
        let entry = combined.entry(id.clone()).or_default();
        for (field, value) in patch {
            entry.insert(field.clone(), value.clone());
        }
    }
    combined
}

#[test]
fn test_new_turtle_defaults_to_disabled() {
    let table = reconcile(&TurtleTable::new(), &snapshot(json!({"1": {"battery": 99}})));

    assert_eq!(table.len(), 1);
    assert_eq!(table_json(&table), json!({"1": {"battery": 99, "enabled": false}}));
    assert!(!table.get("1").unwrap().enabled());
}

#[test]
fn test_new_turtle_keeps_explicit_enabled() {
    let table = reconcile(&TurtleTable::new(), &snapshot(json!({"1": {"enabled": true}})));
    assert!(table.get("1").unwrap().enabled());
    assert_eq!(table.enabled_ids(), vec!["1"]);
}

#[test]
fn test_existing_turtle_is_shallow_merged() {
    let table = reconcile(
        &TurtleTable::new(),
        &snapshot(json!({"1": {"battery": 88, "enabled": false}})),
    );
    let table = reconcile(&table, &snapshot(json!({"1": {"battery": 87, "team": "magenta"}})));

    assert_eq!(
        table_json(&table),
        json!({"1": {"battery": 87, "enabled": false, "team": "magenta"}})
    );
}

#[test]
fn test_enabled_flag_survives_unrelated_updates() {
    let table = reconcile(&TurtleTable::new(), &snapshot(json!({"4": {"enabled": true}})));
    let table = reconcile(&table, &snapshot(json!({"4": {"role": "goalkeeper"}})));

    let turtle = table.get("4").unwrap();
    assert!(turtle.enabled());
    assert_eq!(turtle.role(), Some("goalkeeper"));
}

#[test]
fn test_unmentioned_turtles_are_untouched() {
    let table = reconcile(
        &TurtleTable::new(),
        &snapshot(json!({"1": {"battery": 50}, "2": {"battery": 60}})),
    );
    let next = reconcile(&table, &snapshot(json!({"2": {"battery": 61}})));

    assert_eq!(next.len(), 2);
    assert_eq!(next.get("1"), table.get("1"));
    assert_eq!(next.get("2").unwrap().get("battery"), Some(&json!(61)));
}

#[test]
fn test_empty_snapshot_is_identity() {
    let table = reconcile(
        &TurtleTable::new(),
        &snapshot(json!({"1": {"battery": 50, "enabled": true}, "7": {}})),
    );
    assert_eq!(reconcile(&table, &Snapshot::new()), table);
    assert_eq!(reconcile(&TurtleTable::new(), &Snapshot::new()), TurtleTable::new());
}

#[test]
fn test_reconcile_is_idempotent() {
    let base = reconcile(&TurtleTable::new(), &snapshot(json!({"1": {"battery": 10}})));
    let update = snapshot(json!({
        "1": {"battery": 11, "enabled": true},
        "2": {"teamcolor": "cyan", "role": null}
    }));

    let once = reconcile(&base, &update);
    let twice = reconcile(&once, &update);
    assert_eq!(once, twice);
}

#[test]
fn test_sequential_merge_equals_combined_snapshot() {
    let base = reconcile(
        &TurtleTable::new(),
        &snapshot(json!({"1": {"battery": 90, "enabled": true}, "3": {"role": "none"}})),
    );
    let cases = vec![
        (
            snapshot(json!({"1": {"battery": 80}, "2": {"team": "cyan"}})),
            snapshot(json!({"1": {"enabled": false}, "2": {"battery": 70}})),
        ),
        (
            snapshot(json!({"5": {"enabled": true}})),
            snapshot(json!({"5": {"enabled": "yes"}, "1": {}})),
        ),
        (
            snapshot(json!({})),
            snapshot(json!({"3": {"role": "goalkeeper", "homegoal": "blue"}})),
        ),
    ];

    for (first, second) in cases {
        let sequential = reconcile(&reconcile(&base, &first), &second);
        let combined = reconcile(&base, &combine(&first, &second));
        assert_eq!(sequential, combined);
    }
}

#[test]
fn test_reconcile_does_not_mutate_input() {
    let table = reconcile(&TurtleTable::new(), &snapshot(json!({"1": {"battery": 50}})));
    let before = table.clone();

    let _ = reconcile(&table, &snapshot(json!({"1": {"battery": 1}, "2": {}})));
    assert_eq!(table, before);
}

#[test]
fn test_non_boolean_enabled_reads_as_disabled() {
    let table = reconcile(&TurtleTable::new(), &snapshot(json!({"1": {"enabled": "on"}})));
    assert!(!table.get("1").unwrap().enabled());
    assert!(table.enabled_ids().is_empty());
}

#[test]
fn test_typed_accessors() {
    let table = reconcile(
        &TurtleTable::new(),
        &snapshot(json!({"1": {
            "batteryvoltage": 77,
            "role": "attacker_main",
            "teamcolor": "magenta",
            "homegoal": "yellow"
        }})),
    );
    let turtle = table.get("1").unwrap();

    assert_eq!(turtle.battery_voltage(), Some(77));
    assert_eq!(turtle.role(), Some("attacker_main"));
    assert_eq!(turtle.team_color(), Some("magenta"));
    assert_eq!(turtle.home_goal(), Some("yellow"));
    assert_eq!(turtle.fields().len(), 5);
}
