use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::domain::models::Student;
use crate::domain::types::IdentityKey;
use crate::repositories::Ledger;

pub fn find_by_identity<'a>(ledger: &'a Ledger, identity_key: &IdentityKey) -> Option<&'a Student> {
    ledger.students.iter().find(|student| &student.identity_key == identity_key)
}

pub fn find_by_id(ledger: &Ledger, id: Uuid) -> Option<&Student> {
    ledger.students.iter().find(|student| student.id == id)
}

/// Returns the student owning `identity_key`, creating it on first sight.
/// Contact fields of an existing student are left untouched.
pub fn upsert(
    ledger: &mut Ledger,
    identity_key: IdentityKey,
    full_name: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> Uuid {
    if let Some(existing) = find_by_identity(ledger, &identity_key) {
        return existing.id;
    }

    let student = Student {
        id: Uuid::new_v4(),
        full_name: full_name.to_string(),
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        identity_key,
        created_at: primitive_now_utc(),
    };
    let id = student.id;
    ledger.students.push(student);
    id
}
