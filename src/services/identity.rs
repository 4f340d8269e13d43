use crate::domain::types::IdentityKey;

const GMAIL_DOMAIN: &str = "gmail.com";

/// Derives the canonical identity of a student from raw contact fields.
///
/// Email wins over phone. A phone with no digits counts as absent.
pub fn resolve(email: Option<&str>, phone: Option<&str>) -> Option<IdentityKey> {
    if let Some(normalized) = email.and_then(normalize_email) {
        return Some(IdentityKey::email(&normalized));
    }

    phone.and_then(normalize_phone).map(|digits| IdentityKey::phone(&digits))
}

/// Trims and lowercases an address. Gmail local parts lose `+tags` and dots.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return None;
    }

    let Some((local, domain)) = email.rsplit_once('@') else {
        return Some(email);
    };

    if domain != GMAIL_DOMAIN {
        return Some(email);
    }

    let local = local.split('+').next().unwrap_or_default().replace('.', "");
    Some(format!("{local}@{domain}"))
}

pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}
