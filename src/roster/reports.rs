//! Aggregates over approved students.
//!
//! Departments are listed in the order they first appear in the roster.

use super::models::{Student, StudentStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentAverage {
    pub department: String,
    pub average_marks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentCount {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarksBin {
    pub name: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterReport {
    pub department_performance: Vec<DepartmentAverage>,
    pub student_distribution: Vec<DepartmentCount>,
    pub marks_distribution: Vec<MarksBin>,
}

impl RosterReport {
    pub fn build(students: &[Student]) -> Self {
        Self {
            department_performance: department_performance(students),
            student_distribution: student_distribution(students),
            marks_distribution: marks_distribution(students),
        }
    }
}

fn approved(students: &[Student]) -> impl Iterator<Item = &Student> {
    students
        .iter()
        .filter(|s| s.status == StudentStatus::Approved)
}

/// (department, total marks, head count) in first-seen order
fn tally(students: &[Student]) -> Vec<(String, u64, usize)> {
    let mut rows: Vec<(String, u64, usize)> = Vec::new();
    for student in approved(students) {
        match rows.iter_mut().find(|(dept, _, _)| *dept == student.department) {
            Some((_, total, count)) => {
                *total += u64::from(student.marks);
                *count += 1;
            }
            None => rows.push((student.department.clone(), u64::from(student.marks), 1)),
        }
    }
    rows
}

pub fn department_performance(students: &[Student]) -> Vec<DepartmentAverage> {
    tally(students)
        .into_iter()
        .map(|(department, total, count)| DepartmentAverage {
            department,
            average_marks: (total as f64 / count as f64).round() as u32,
        })
        .collect()
}

pub fn student_distribution(students: &[Student]) -> Vec<DepartmentCount> {
    tally(students)
        .into_iter()
        .map(|(name, _, value)| DepartmentCount { name, value })
        .collect()
}

/// Histogram of approved marks; empty when nobody is approved.
pub fn marks_distribution(students: &[Student]) -> Vec<MarksBin> {
    let mut bins = [
        MarksBin { name: "90-100", count: 0 },
        MarksBin { name: "80-89", count: 0 },
        MarksBin { name: "70-79", count: 0 },
        MarksBin { name: "60-69", count: 0 },
        MarksBin { name: "<60", count: 0 },
    ];
    let mut any = false;
    for student in approved(students) {
        any = true;
        let slot = match student.marks {
            90.. => 0,
            80..=89 => 1,
            70..=79 => 2,
            60..=69 => 3,
            _ => 4,
        };
        bins[slot].count += 1;
    }
    if any { bins.to_vec() } else { Vec::new() }
}
