// CSV codec for the two backing files. Full-file reads and
// truncate-and-rewrite saves; handles never outlive one call.
//
// The courses column is a single cell holding names joined with commas.
// Cell quoting keeps the joined cell intact on disk, but a course *name*
// containing a comma still splits wrong on reload. Known limitation.
use std::fs::File;
use std::path::Path;

use crate::core::error::{map_io_error_kind, Error, ErrorKind};
use crate::core::record::{Course, Student};

pub const STUDENT_FIELDS: [&str; 6] = ["student_id", "name", "age", "roll_no", "grade", "courses"];
pub const COURSE_FIELDS: [&str; 2] = ["course_id", "course_name"];

pub fn read_students(path: &Path) -> Result<Vec<Student>, Error> {
    let file = open_for_read(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|err| malformed(path, 1, "unreadable header row").with_source(err))?
        .clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let columns = locate_columns(&headers, &STUDENT_FIELDS, path)?;

    let mut students = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // Header occupies row 1; first data record is row 2.
        let row = index + 2;
        let record =
            record.map_err(|err| malformed(path, row, "unreadable row").with_source(err))?;

        let age_cell = record_field(&record, columns[2], "age", path, row)?;
        let age = age_cell.trim().parse::<u32>().map_err(|err| {
            malformed(path, row, format!("age {age_cell:?} is not an integer")).with_source(err)
        })?;
        let courses = record
            .get(columns[5])
            .map(split_courses)
            .unwrap_or_default();

        students.push(Student {
            student_id: record_field(&record, columns[0], "student_id", path, row)?.to_string(),
            name: record_field(&record, columns[1], "name", path, row)?.to_string(),
            age,
            roll_no: record_field(&record, columns[3], "roll_no", path, row)?.to_string(),
            grade: record_field(&record, columns[4], "grade", path, row)?.to_string(),
            courses,
        });
    }
    Ok(students)
}

pub fn write_students(path: &Path, students: &[Student]) -> Result<(), Error> {
    let file = create_for_write(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(STUDENT_FIELDS)
        .map_err(|err| write_error(path, err))?;
    for student in students {
        let age = student.age.to_string();
        let courses = join_courses(&student.courses);
        writer
            .write_record([
                student.student_id.as_str(),
                student.name.as_str(),
                age.as_str(),
                student.roll_no.as_str(),
                student.grade.as_str(),
                courses.as_str(),
            ])
            .map_err(|err| write_error(path, err))?;
    }
    writer.flush().map_err(|err| {
        Error::new(map_io_error_kind(&err))
            .with_message("failed to flush records")
            .with_path(path)
            .with_source(err)
    })
}

pub fn read_courses(path: &Path) -> Result<Vec<Course>, Error> {
    let file = open_for_read(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|err| malformed(path, 1, "unreadable header row").with_source(err))?
        .clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let columns = locate_columns(&headers, &COURSE_FIELDS, path)?;

    let mut courses = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row = index + 2;
        let record =
            record.map_err(|err| malformed(path, row, "unreadable row").with_source(err))?;
        courses.push(Course {
            course_id: record_field(&record, columns[0], "course_id", path, row)?.to_string(),
            course_name: record_field(&record, columns[1], "course_name", path, row)?.to_string(),
        });
    }
    Ok(courses)
}

pub fn write_courses(path: &Path, courses: &[Course]) -> Result<(), Error> {
    let file = create_for_write(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(COURSE_FIELDS)
        .map_err(|err| write_error(path, err))?;
    for course in courses {
        writer
            .write_record([course.course_id.as_str(), course.course_name.as_str()])
            .map_err(|err| write_error(path, err))?;
    }
    writer.flush().map_err(|err| {
        Error::new(map_io_error_kind(&err))
            .with_message("failed to flush records")
            .with_path(path)
            .with_source(err)
    })
}

pub fn join_courses(courses: &[String]) -> String {
    courses.join(",")
}

pub fn split_courses(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(',').map(str::to_string).collect()
}

fn open_for_read(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|err| {
        Error::new(map_io_error_kind(&err))
            .with_message("failed to open records file")
            .with_path(path)
            .with_source(err)
    })
}

fn create_for_write(path: &Path) -> Result<File, Error> {
    File::create(path).map_err(|err| {
        Error::new(map_io_error_kind(&err))
            .with_message("failed to create records file")
            .with_path(path)
            .with_source(err)
    })
}

fn locate_columns<const N: usize>(
    headers: &csv::StringRecord,
    fields: &[&str; N],
    path: &Path,
) -> Result<[usize; N], Error> {
    let mut columns = [0usize; N];
    for (slot, field) in columns.iter_mut().zip(fields.iter()) {
        *slot = headers
            .iter()
            .position(|header| header == *field)
            .ok_or_else(|| {
                Error::new(ErrorKind::Invalid)
                    .with_message(format!("missing {field} column in header"))
                    .with_path(path)
                    .with_row(1)
            })?;
    }
    Ok(columns)
}

fn record_field<'a>(
    record: &'a csv::StringRecord,
    column: usize,
    name: &str,
    path: &Path,
    row: usize,
) -> Result<&'a str, Error> {
    record
        .get(column)
        .ok_or_else(|| malformed(path, row, format!("missing {name} cell")))
}

fn malformed(path: &Path, row: usize, message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Invalid)
        .with_message(message)
        .with_path(path)
        .with_row(row)
}

fn write_error(path: &Path, err: csv::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to write records")
        .with_path(path)
        .with_source(err)
}
