/// Domain models for the student roster.
use crate::core::{DbError, Entity, Patch, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_DEPARTMENT_LEN: usize = 2;
pub const AGE_RANGE: std::ops::RangeInclusive<u32> = 16..=100;
pub const MARKS_RANGE: std::ops::RangeInclusive<u32> = 0..=100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub marks: u32,
    pub department: String,
    pub status: StudentStatus,
}

impl Entity for Student {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Pending,
    Approved,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Pending => "pending",
            StudentStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for enrolling a student. New students always start pending.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewStudent {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub marks: u32,
    pub department: String,
}

impl NewStudent {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DbError::Validation("id is required".to_string()));
        }
        validate_name(&self.name)?;
        validate_age(self.age)?;
        validate_marks(self.marks)?;
        validate_department(&self.department)?;
        Ok(())
    }

    pub fn into_student(self) -> Student {
        Student {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            age: self.age,
            marks: self.marks,
            department: self.department.trim().to_string(),
            status: StudentStatus::Pending,
        }
    }
}

/// Partial edit of a student. Identity and status are not editable here;
/// status moves only through approve/reject.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub marks: Option<u32>,
    pub department: Option<String>,
}

impl StudentPatch {
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.age.is_some() || self.marks.is_some() || self.department.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.has_changes() {
            return Err(DbError::Validation(
                "at least one field must be provided".to_string(),
            ));
        }
        if let Some(name) = self.name.as_deref() {
            validate_name(name)?;
        }
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        if let Some(marks) = self.marks {
            validate_marks(marks)?;
        }
        if let Some(department) = self.department.as_deref() {
            validate_department(department)?;
        }
        Ok(())
    }
}

impl Patch<Student> for StudentPatch {
    fn apply_to(&self, target: &mut Student) {
        if let Some(name) = &self.name {
            target.name = name.trim().to_string();
        }
        if let Some(age) = self.age {
            target.age = age;
        }
        if let Some(marks) = self.marks {
            target.marks = marks;
        }
        if let Some(department) = &self.department {
            target.department = department.trim().to_string();
        }
    }
}

/// Status change applied by approval.
pub(crate) struct SetStatus(pub StudentStatus);

impl Patch<Student> for SetStatus {
    fn apply_to(&self, target: &mut Student) {
        target.status = self.0;
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(DbError::Validation(format!(
            "name must be at least {} characters",
            MIN_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_age(age: u32) -> Result<()> {
    if !AGE_RANGE.contains(&age) {
        return Err(DbError::Validation(format!(
            "age must be between {} and {}",
            AGE_RANGE.start(),
            AGE_RANGE.end()
        )));
    }
    Ok(())
}

fn validate_marks(marks: u32) -> Result<()> {
    if !MARKS_RANGE.contains(&marks) {
        return Err(DbError::Validation(format!(
            "marks must be between {} and {}",
            MARKS_RANGE.start(),
            MARKS_RANGE.end()
        )));
    }
    Ok(())
}

fn validate_department(department: &str) -> Result<()> {
    if department.trim().chars().count() < MIN_DEPARTMENT_LEN {
        return Err(DbError::Validation("department is required".to_string()));
    }
    Ok(())
}
