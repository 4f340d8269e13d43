use serde::Serialize;

use crate::domain::models::Student;

#[derive(Debug, Clone, Serialize)]
pub struct StudentListItem {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub identity_key: String,
}

impl From<&Student> for StudentListItem {
    fn from(student: &Student) -> Self {
        Self {
            student_id: student.id.to_string(),
            name: student.full_name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            identity_key: student.identity_key.to_string(),
        }
    }
}
