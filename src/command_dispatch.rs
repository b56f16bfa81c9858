//! Purpose: Hold top-level CLI command dispatch for `rollbook`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command behavior, output envelopes, and exit code semantics stay unchanged.
//! Invariants: Stores are opened per invocation; no state survives dispatch.

use super::*;

pub(super) fn dispatch_command(
    command: Command,
    data_dir: PathBuf,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "rollbook", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Student { command } => dispatch_student(command, &data_dir, color_mode),
        Command::Course { command } => dispatch_course(command, &data_dir, color_mode),
        Command::Assign {
            student_id,
            course_id,
        } => {
            let (mut store, statuses) = open_store(&data_dir)?;
            emit_load_notices(&statuses, "assign", color_mode);
            let assignment = store.assign_course(&student_id, &course_id)?;
            emit_json(
                json!({
                    "assigned": {
                        "student_id": assignment.student_id,
                        "student": assignment.student_name,
                        "course": assignment.course_name,
                    }
                }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_student(
    command: StudentCommand,
    data_dir: &Path,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        StudentCommand::Add(args) => {
            let client = LocalClient::new().with_data_dir(data_dir);
            client.ensure_data_dir()?;
            let (mut store, statuses) = client.open_store()?;
            emit_load_notices(&statuses, "student add", color_mode);

            let student = Student::new(args.id, args.name, args.age, args.roll_no, args.grade);
            let student_id = student.student_id.clone();
            let outcome = store.add_student(student)?;
            if outcome.duplicate_id {
                emit_duplicate_notice(
                    "student add",
                    STUDENTS_FILE,
                    "student_id",
                    &student_id,
                    color_mode,
                );
            }
            emit_json(
                json!({
                    "added": {
                        "student_id": student_id,
                        "students": store.students().len(),
                    }
                }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
        StudentCommand::List { format } => {
            let (store, statuses) = open_store(data_dir)?;
            emit_load_notices(&statuses, "student list", color_mode);
            match format {
                ListFormat::Human => println!("{}", store.render_students()),
                ListFormat::Jsonl => emit_records_jsonl(store.students())?,
            }
            Ok(RunOutcome::ok())
        }
        StudentCommand::Delete { student_id } => {
            let (mut store, statuses) = open_store(data_dir)?;
            emit_load_notices(&statuses, "student delete", color_mode);
            let removed = store.delete_student(&student_id)?;
            emit_json(
                json!({
                    "deleted": {
                        "student_id": removed.student_id,
                        "students": store.students().len(),
                    }
                }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_course(
    command: CourseCommand,
    data_dir: &Path,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        CourseCommand::Add(args) => {
            let client = LocalClient::new().with_data_dir(data_dir);
            client.ensure_data_dir()?;
            let (mut store, statuses) = client.open_store()?;
            emit_load_notices(&statuses, "course add", color_mode);

            let course = Course::new(args.id, args.name);
            let course_id = course.course_id.clone();
            let outcome = store.add_course(course)?;
            if outcome.duplicate_id {
                emit_duplicate_notice(
                    "course add",
                    COURSES_FILE,
                    "course_id",
                    &course_id,
                    color_mode,
                );
            }
            emit_json(
                json!({
                    "added": {
                        "course_id": course_id,
                        "courses": store.courses().len(),
                    }
                }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
        CourseCommand::List { format } => {
            let (store, statuses) = open_store(data_dir)?;
            emit_load_notices(&statuses, "course list", color_mode);
            match format {
                ListFormat::Human => println!("{}", store.render_courses()),
                ListFormat::Jsonl => emit_records_jsonl(store.courses())?,
            }
            Ok(RunOutcome::ok())
        }
        CourseCommand::Delete { course_id } => {
            let (mut store, statuses) = open_store(data_dir)?;
            emit_load_notices(&statuses, "course delete", color_mode);
            let removed = store.delete_course(&course_id)?;
            emit_json(
                json!({
                    "deleted": {
                        "course_id": removed.course_id,
                        "courses": store.courses().len(),
                    }
                }),
                color_mode,
            );
            Ok(RunOutcome::ok())
        }
    }
}

fn open_store(data_dir: &Path) -> Result<(RecordStore, Vec<LoadStatus>), Error> {
    LocalClient::new().with_data_dir(data_dir).open_store()
}

fn emit_records_jsonl<T: serde::Serialize>(records: &[T]) -> Result<(), Error> {
    for record in records {
        let line = serde_json::to_string(record).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode record")
                .with_source(err)
        })?;
        println!("{line}");
    }
    Ok(())
}
