// In-memory authority for the student and course collections.
// Every mutation rewrites the affected backing file before returning,
// so disk state always matches memory on the Ok path.
//
// Lookups are linear scans; duplicate ids are tolerated and resolve to
// the first match in collection order, as the historical data did.
use std::path::{Path, PathBuf};

use crate::core::codec;
use crate::core::error::{Error, ErrorKind};
use crate::core::record::{Course, Student};
use crate::store_paths::{COURSES_FILE, STUDENTS_FILE};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorePaths {
    pub students: PathBuf,
    pub courses: PathBuf,
}

impl StorePaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            students: dir.join(STUDENTS_FILE),
            courses: dir.join(COURSES_FILE),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadStatus {
    Loaded(usize),
    Missing(PathBuf),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AddOutcome {
    pub duplicate_id: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment {
    pub student_id: String,
    pub student_name: String,
    pub course_name: String,
}

pub struct RecordStore {
    paths: StorePaths,
    students: Vec<Student>,
    courses: Vec<Course>,
}

impl RecordStore {
    pub fn new(paths: StorePaths) -> Self {
        Self {
            paths,
            students: Vec::new(),
            courses: Vec::new(),
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Replaces the students collection from the backing file. An absent
    /// file is a fresh start, not an error.
    pub fn load_students(&mut self) -> Result<LoadStatus, Error> {
        match codec::read_students(&self.paths.students) {
            Ok(students) => {
                let count = students.len();
                self.students = students;
                Ok(LoadStatus::Loaded(count))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.students.clear();
                Ok(LoadStatus::Missing(self.paths.students.clone()))
            }
            Err(err) => Err(err),
        }
    }

    pub fn load_courses(&mut self) -> Result<LoadStatus, Error> {
        match codec::read_courses(&self.paths.courses) {
            Ok(courses) => {
                let count = courses.len();
                self.courses = courses;
                Ok(LoadStatus::Loaded(count))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.courses.clear();
                Ok(LoadStatus::Missing(self.paths.courses.clone()))
            }
            Err(err) => Err(err),
        }
    }

    /// Appends a student and persists the collection. A colliding id is
    /// accepted (the outcome flags it); lookups then resolve to the first
    /// match in collection order.
    pub fn add_student(&mut self, student: Student) -> Result<AddOutcome, Error> {
        let duplicate_id = self
            .students
            .iter()
            .any(|existing| existing.student_id == student.student_id);
        self.students.push(student);
        self.save_students()?;
        Ok(AddOutcome { duplicate_id })
    }

    /// Removes the first student matching the id and persists. The
    /// collection is untouched when the id is absent.
    pub fn delete_student(&mut self, student_id: &str) -> Result<Student, Error> {
        let index = self
            .students
            .iter()
            .position(|student| student.student_id == student_id)
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message(format!("student {student_id} not found"))
            })?;
        let removed = self.students.remove(index);
        self.save_students()?;
        Ok(removed)
    }

    pub fn add_course(&mut self, course: Course) -> Result<AddOutcome, Error> {
        let duplicate_id = self
            .courses
            .iter()
            .any(|existing| existing.course_id == course.course_id);
        self.courses.push(course);
        self.save_courses()?;
        Ok(AddOutcome { duplicate_id })
    }

    pub fn delete_course(&mut self, course_id: &str) -> Result<Course, Error> {
        let index = self
            .courses
            .iter()
            .position(|course| course.course_id == course_id)
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message(format!("course {course_id} not found"))
            })?;
        let removed = self.courses.remove(index);
        self.save_courses()?;
        Ok(removed)
    }

    /// Appends the course's *name* to the student's course list and
    /// persists students. The student is resolved before the course, so a
    /// missing student is reported even when the course is also missing.
    pub fn assign_course(
        &mut self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Assignment, Error> {
        let index = self
            .students
            .iter()
            .position(|student| student.student_id == student_id)
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message(format!("student {student_id} not found"))
            })?;
        let course_name = self
            .courses
            .iter()
            .find(|course| course.course_id == course_id)
            .map(|course| course.course_name.clone())
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound)
                    .with_message(format!("course {course_id} not found"))
            })?;

        self.students[index].courses.push(course_name.clone());
        self.save_students()?;
        let student = &self.students[index];
        Ok(Assignment {
            student_id: student.student_id.clone(),
            student_name: student.name.clone(),
            course_name,
        })
    }

    pub fn render_students(&self) -> String {
        if self.students.is_empty() {
            return "No students available.".to_string();
        }
        self.students
            .iter()
            .map(Student::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_courses(&self) -> String {
        if self.courses.is_empty() {
            return "No courses available.".to_string();
        }
        self.courses
            .iter()
            .map(Course::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn save_students(&self) -> Result<(), Error> {
        codec::write_students(&self.paths.students, &self.students)
    }

    fn save_courses(&self) -> Result<(), Error> {
        codec::write_courses(&self.paths.courses, &self.courses)
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadStatus, RecordStore, StorePaths};
    use crate::core::error::ErrorKind;
    use crate::core::record::{Course, Student};

    fn store_in_tempdir() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = RecordStore::new(StorePaths::in_dir(dir.path()));
        (dir, store)
    }

    #[test]
    fn load_from_absent_files_is_missing_not_error() {
        let (_dir, mut store) = store_in_tempdir();
        let status = store.load_students().expect("load");
        assert!(matches!(status, LoadStatus::Missing(_)));
        assert!(store.students().is_empty());

        let status = store.load_courses().expect("load");
        assert!(matches!(status, LoadStatus::Missing(_)));
        assert!(store.courses().is_empty());
    }

    #[test]
    fn mutations_write_through_before_returning() {
        let (_dir, mut store) = store_in_tempdir();

        store
            .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
            .expect("add");
        let text = std::fs::read_to_string(&store.paths().students).expect("read");
        assert_eq!(text, "student_id,name,age,roll_no,grade,courses\nS1,Ann,20,R1,A,\n");

        store.add_course(Course::new("C1", "Math")).expect("add");
        let text = std::fs::read_to_string(&store.paths().courses).expect("read");
        assert_eq!(text, "course_id,course_name\nC1,Math\n");

        store.assign_course("S1", "C1").expect("assign");
        let text = std::fs::read_to_string(&store.paths().students).expect("read");
        assert_eq!(text, "student_id,name,age,roll_no,grade,courses\nS1,Ann,20,R1,A,Math\n");

        store.delete_student("S1").expect("delete");
        let text = std::fs::read_to_string(&store.paths().students).expect("read");
        assert_eq!(text, "student_id,name,age,roll_no,grade,courses\n");
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, mut store) = store_in_tempdir();
        store
            .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
            .expect("add");
        store
            .add_student(Student::new("S2", "Ben", 21, "R2", "B"))
            .expect("add");
        store.add_course(Course::new("C1", "Math")).expect("add");
        store.assign_course("S1", "C1").expect("assign");
        let before_students = store.students().to_vec();
        let before_courses = store.courses().to_vec();

        let mut reloaded = RecordStore::new(store.paths().clone());
        assert_eq!(
            reloaded.load_students().expect("load"),
            LoadStatus::Loaded(2)
        );
        assert_eq!(reloaded.load_courses().expect("load"), LoadStatus::Loaded(1));
        assert_eq!(reloaded.students(), before_students);
        assert_eq!(reloaded.courses(), before_courses);
    }

    #[test]
    fn assign_appends_exactly_one_name_at_the_end() {
        let (_dir, mut store) = store_in_tempdir();
        store
            .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
            .expect("add");
        store.add_course(Course::new("C1", "Math")).expect("add");
        store.add_course(Course::new("C2", "Physics")).expect("add");
        store.assign_course("S1", "C1").expect("assign");

        let assignment = store.assign_course("S1", "C2").expect("assign");
        assert_eq!(assignment.course_name, "Physics");
        assert_eq!(store.students()[0].courses, ["Math", "Physics"]);
    }

    #[test]
    fn assign_reports_which_side_is_missing() {
        let (_dir, mut store) = store_in_tempdir();
        store
            .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
            .expect("add");

        let err = store.assign_course("S9", "C1").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.message().unwrap().contains("student S9"));

        let err = store.assign_course("S1", "C9").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.message().unwrap().contains("course C9"));
        assert!(store.students()[0].courses.is_empty());
    }

    #[test]
    fn delete_of_missing_id_changes_nothing() {
        let (_dir, mut store) = store_in_tempdir();
        store
            .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
            .expect("add");

        let err = store.delete_student("S9").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.students().len(), 1);

        let err = store.delete_course("C9").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn duplicate_ids_are_kept_and_first_match_wins() {
        let (_dir, mut store) = store_in_tempdir();
        let outcome = store
            .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
            .expect("add");
        assert!(!outcome.duplicate_id);

        let outcome = store
            .add_student(Student::new("S1", "Twin", 22, "R9", "C"))
            .expect("add");
        assert!(outcome.duplicate_id);
        assert_eq!(store.students().len(), 2);

        let removed = store.delete_student("S1").expect("delete");
        assert_eq!(removed.name, "Ann");
        assert_eq!(store.students().len(), 1);
        assert_eq!(store.students()[0].name, "Twin");
    }

    #[test]
    fn renders_fall_back_to_empty_sentinels() {
        let (_dir, mut store) = store_in_tempdir();
        assert_eq!(store.render_students(), "No students available.");
        assert_eq!(store.render_courses(), "No courses available.");

        store
            .add_student(Student::new("S1", "Ann", 20, "R1", "A"))
            .expect("add");
        assert!(store.render_students().starts_with("Student ID: S1"));
    }
}
