// Persistence round-trips and legacy-file interop through the public API.
use rollbook::api::{Course, LoadStatus, LocalClient, Student};

#[test]
fn full_state_survives_a_reopen() {
    let temp = tempfile::tempdir().expect("tempdir");
    let client = LocalClient::new().with_data_dir(temp.path());

    let (mut store, _) = client.open_store().expect("open");
    store
        .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
        .expect("add");
    store
        .add_student(Student::new("S2", "Ben", 21, "R2", "B"))
        .expect("add");
    store.add_course(Course::new("C1", "Math")).expect("add");
    store.add_course(Course::new("C2", "Physics")).expect("add");
    store.assign_course("S1", "C1").expect("assign");
    store.assign_course("S1", "C2").expect("assign");
    let students = store.students().to_vec();
    let courses = store.courses().to_vec();

    let (reopened, statuses) = client.open_store().expect("reopen");
    assert_eq!(statuses, [LoadStatus::Loaded(2), LoadStatus::Loaded(2)]);
    assert_eq!(reopened.students(), students);
    assert_eq!(reopened.courses(), courses);
    assert_eq!(reopened.students()[0].courses, ["Math", "Physics"]);
}

#[test]
fn reads_files_written_by_the_legacy_tool() {
    // The historical producer quoted the joined courses cell and
    // terminated rows with CRLF.
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        temp.path().join("students.csv"),
        "student_id,name,age,roll_no,grade,courses\r\nS1,Ann,20,R1,A,\"Math,Physics\"\r\n",
    )
    .expect("write");
    std::fs::write(
        temp.path().join("courses.csv"),
        "course_id,course_name\r\nC1,Math\r\nC2,Physics\r\n",
    )
    .expect("write");

    let client = LocalClient::new().with_data_dir(temp.path());
    let (store, statuses) = client.open_store().expect("open");
    assert_eq!(statuses, [LoadStatus::Loaded(1), LoadStatus::Loaded(2)]);
    assert_eq!(store.students()[0].courses, ["Math", "Physics"]);
    assert_eq!(store.courses()[1].course_name, "Physics");
}

#[test]
fn first_run_starts_empty_then_persists() {
    let temp = tempfile::tempdir().expect("tempdir");
    let client = LocalClient::new().with_data_dir(temp.path());

    let (mut store, statuses) = client.open_store().expect("open");
    assert!(statuses
        .iter()
        .all(|status| matches!(status, LoadStatus::Missing(_))));

    store.add_course(Course::new("C1", "Math")).expect("add");

    let (store, statuses) = client.open_store().expect("reopen");
    assert_eq!(statuses[1], LoadStatus::Loaded(1));
    assert_eq!(store.courses()[0].course_id, "C1");
}
