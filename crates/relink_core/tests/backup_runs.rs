use chrono::{Local, TimeZone};
use relink_core::{write_backups, BackupError, RunTimestamp};
use uuid::Uuid;

fn fixed_stamp() -> RunTimestamp {
    let datetime = Local
        .with_ymd_and_hms(2024, 6, 1, 15, 0, 0)
        .single()
        .expect("unambiguous local datetime");
    RunTimestamp::from_datetime(datetime)
}

#[test]
fn writes_one_file_per_note_under_the_run_directory() {
    let root = tempfile::tempdir().expect("temp backups root");
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let entries = vec![(first, "first original"), (second, "second original")];

    let run_dir =
        write_backups(root.path(), &fixed_stamp(), &entries).expect("backups should write");

    assert!(run_dir.starts_with(root.path()));
    assert_eq!(
        std::fs::read_to_string(run_dir.join(format!("{first}.md"))).expect("first backup"),
        "first original"
    );
    assert_eq!(
        std::fs::read_to_string(run_dir.join(format!("{second}.md"))).expect("second backup"),
        "second original"
    );
    let count = std::fs::read_dir(&run_dir).expect("run dir readable").count();
    assert_eq!(count, 2);
}

#[test]
fn run_directory_name_comes_from_the_stamp() {
    let root = tempfile::tempdir().expect("temp backups root");
    let run_dir = write_backups(root.path(), &fixed_stamp(), &[]).expect("backups should write");
    let name = run_dir
        .file_name()
        .expect("run dir has a name")
        .to_string_lossy()
        .into_owned();
    assert!(name.starts_with("2024-06-01T15-00-00"));
}

#[test]
fn existing_run_directory_is_a_fatal_collision() {
    let root = tempfile::tempdir().expect("temp backups root");
    let stamp = fixed_stamp();
    std::fs::create_dir(root.path().join(stamp.dir_name())).expect("pre-create run dir");

    let err = write_backups(root.path(), &stamp, &[(Uuid::new_v4(), "content")])
        .expect_err("collision must fail");
    assert!(matches!(err, BackupError::DirectoryCollision(_)));
}

#[test]
fn missing_backups_root_is_created_on_demand() {
    let root = tempfile::tempdir().expect("temp backups root");
    let nested = root.path().join("deep").join("backups");

    let run_dir = write_backups(&nested, &fixed_stamp(), &[(Uuid::new_v4(), "content")])
        .expect("backups should write");
    assert!(run_dir.exists());
}
