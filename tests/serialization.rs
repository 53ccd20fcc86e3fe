//! JSON shape of settings and results.

use exam_schedule::models::{
    Exam, Invigilator, LoadScope, LockConstraints, Room, SchedulerSettings, Timeslot,
};
use exam_schedule::scheduler::{ScheduleRequest, SchedulingAgent};
use exam_schedule::validation::{validate_schedule, ScheduleAudit};
use serde_json::{json, Value};

fn request() -> ScheduleRequest {
    ScheduleRequest::new(
        vec![
            Exam::new("E1", "CS101").with_students(["s1", "s2"]),
            Exam::new("E2", "CS102").with_students(["s2", "s3"]),
        ],
        vec![Room::new("R1", 3)],
        vec![Timeslot::new("T1", "2024-05-15"), Timeslot::new("T2", "2024-05-15")],
        vec![Invigilator::new("I1", 2)],
    )
}

#[test]
fn test_settings_partial_json() {
    let settings: SchedulerSettings =
        serde_json::from_value(json!({ "avoid_forbidden_timeslots": false })).unwrap();
    assert!(!settings.avoid_forbidden_timeslots);
    assert!(settings.balance_invigilator_load);
    assert!(settings.minimize_room_wastage);
    assert_eq!(settings.load_scope, LoadScope::PerDay);
}

#[test]
fn test_lock_from_json() {
    let lock: LockConstraints = serde_json::from_value(json!({
        "room_ids": ["R1"],
        "priority_exam_ids": ["E2"]
    }))
    .unwrap();
    assert_eq!(lock.room_ids, vec!["R1"]);
    assert!(lock.dates.is_empty());

    let result = SchedulingAgent::new().schedule(&request().with_lock(lock));
    assert_eq!(result.timetable.assignments[0].exam_id, "E2");
}

#[test]
fn test_result_json_shape() {
    let result = SchedulingAgent::new().schedule(&request());
    assert!(result.success);

    let value: Value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["trace"][0]["action"], json!("TRY"));
    assert_eq!(value["trace"][1]["action"], json!("ACCEPT"));
    assert_eq!(value["trace"][1]["checks"][0]["constraint"], json!("ROOM_CAPACITY"));
    assert!(value["trace"][0].get("checks").is_none());
    assert_eq!(value["timetable"]["assignments"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["invigilator_roster"][0]["total"], json!(2));
    assert!(value["metrics"]["states_explored"].as_u64().unwrap() >= 2);

    let conflict = &value["conflicts"][0];
    assert_eq!(conflict["constraint"], json!("DOUBLE_BOOKING"));
    assert_eq!(conflict["attempted"]["room_id"], json!("R1"));
}

#[test]
fn test_audit_round_trips() {
    let request = request();
    let result = SchedulingAgent::new().schedule(&request);
    let audit = validate_schedule(
        &result.timetable.assignments,
        &request.exams,
        &request.rooms,
        &request.timeslots,
        &request.enrollment_index(),
    );

    let text = serde_json::to_string(&audit).unwrap();
    let back: ScheduleAudit = serde_json::from_str(&text).unwrap();
    assert_eq!(back, audit);
    assert!(back.is_valid);
}

#[test]
fn test_request_from_json() {
    let request: ScheduleRequest = serde_json::from_value(json!({
        "exams": [{
            "id": "E1", "code": "CS101", "name": "Intro",
            "duration_minutes": 90, "enrolled_students": ["s1"]
        }],
        "rooms": [{
            "id": "R1", "name": "Hall", "capacity": 5,
            "building": "Main", "availability": "Available"
        }],
        "timeslots": [{
            "id": "T1", "date": "2024-05-15", "start_time": "09:00",
            "end_time": "11:00", "label": "Morning", "is_forbidden": false
        }],
        "invigilators": [{
            "id": "I1", "name": "Dr. Kim", "availability": "Available",
            "daily_load": 0, "max_load": 1
        }]
    }))
    .unwrap();

    let result = SchedulingAgent::new().schedule(&request);
    assert!(result.success);
    assert!(result.timetable.assignments[0].reason.starts_with("Room Hall selected"));
}
