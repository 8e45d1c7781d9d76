use super::models::{Student, StudentStatus};

/// Sample roster loaded when no snapshot exists.
pub fn seed_students() -> Vec<Student> {
    [
        ("S001", "Alice Johnson", 22, 88, "Computer Science", StudentStatus::Approved),
        ("S002", "Bob Smith", 21, 92, "Physics", StudentStatus::Approved),
        ("S003", "Charlie Brown", 23, 76, "Mathematics", StudentStatus::Approved),
        ("S004", "Diana Prince", 20, 95, "History", StudentStatus::Pending),
    ]
    .into_iter()
    .map(|(id, name, age, marks, department, status)| Student {
        id: id.to_string(),
        name: name.to_string(),
        age,
        marks,
        department: department.to_string(),
        status,
    })
    .collect()
}
