// Student and course entities plus their human-readable renderings.
// Ids are unique by convention only; collections tolerate duplicates.
use std::fmt;

use serde::Serialize;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub age: u32,
    pub roll_no: String,
    pub grade: String,
    pub courses: Vec<String>,
}

impl Student {
    pub fn new(
        student_id: impl Into<String>,
        name: impl Into<String>,
        age: u32,
        roll_no: impl Into<String>,
        grade: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            age,
            roll_no: roll_no.into(),
            grade: grade.into(),
            courses: Vec::new(),
        }
    }

    pub fn with_courses(mut self, courses: Vec<String>) -> Self {
        self.courses = courses;
        self
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let courses = if self.courses.is_empty() {
            "None".to_string()
        } else {
            self.courses.join(", ")
        };
        write!(
            f,
            "Student ID: {}, Name: {}, Age: {}, Roll No: {}, Grade: {}, Courses: {}",
            self.student_id, self.name, self.age, self.roll_no, self.grade, courses
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Course {
    pub course_id: String,
    pub course_name: String,
}

impl Course {
    pub fn new(course_id: impl Into<String>, course_name: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            course_name: course_name.into(),
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Course ID: {}, Name: {}", self.course_id, self.course_name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Course, Student};

    #[test]
    fn student_rendering_lists_courses() {
        let student = Student::new("S1", "Ann", 20, "R1", "A")
            .with_courses(vec!["Math".to_string(), "Physics".to_string()]);
        assert_eq!(
            student.to_string(),
            "Student ID: S1, Name: Ann, Age: 20, Roll No: R1, Grade: A, Courses: Math, Physics"
        );
    }

    #[test]
    fn student_rendering_without_courses_says_none() {
        let student = Student::new("S2", "Ben", 21, "R2", "B");
        assert!(student.to_string().ends_with("Courses: None"));
    }

    #[test]
    fn course_rendering() {
        let course = Course::new("C1", "Math");
        assert_eq!(course.to_string(), "Course ID: C1, Name: Math");
    }
}
