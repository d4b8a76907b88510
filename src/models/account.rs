use crate::domain::UserId;

/// An account as seen by the rest of the application (no password hash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields accepted by a profile update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl AccountPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.name.is_none()
    }
}

/// Lowercases the domain part of an email, leaving the local part as given.
///
/// ```rust
/// use recipebox::models::account::normalize_email;
///
/// assert_eq!(normalize_email("Test@DOMAIN.com"), "Test@domain.com");
/// ```
#[must_use]
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("test@DOMAIN.com"), "test@domain.com");
        assert_eq!(normalize_email("MiXeD@Example.ORG"), "MiXeD@example.org");
    }

    #[test]
    fn test_normalize_email_trims_and_keeps_malformed_input() {
        assert_eq!(normalize_email("  a@B.com "), "a@b.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_normalize_email_splits_on_last_at() {
        assert_eq!(normalize_email("odd@local@HOST.io"), "odd@local@host.io");
    }
}
