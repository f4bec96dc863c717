use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_TITLE_LEN: usize = 100;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Field-level validation failures. These block a submission before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Name is required")]
    NameRequired,
    #[error("Task title is required")]
    TitleRequired,
    #[error("Task title must be at most 100 characters")]
    TitleTooLong,
    #[error("Priority must be between 1 and 5, got {0}")]
    PriorityOutOfRange(i64),
    #[error("Priority must be a number between 1 and 5, got '{0}'")]
    InvalidPriority(String),
    #[error("Unknown color '{0}'")]
    UnknownColor(String),
    #[error("Unrecognized date '{0}'. Try YYYY-MM-DD, today, tomorrow, +3d, mon")]
    InvalidDate(String),
}

/// `local-part@domain.tld`, no whitespace, at least one dot in the domain.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Length is counted in Unicode scalar values, not UTF-16 units.
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Length is counted in Unicode scalar values, not UTF-16 units.
pub fn is_valid_title(title: &str) -> bool {
    is_present(title) && title.chars().count() <= MAX_TITLE_LEN
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if !is_present(title) {
        return Err(ValidationError::TitleRequired);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

/// Checks sign-in fields in submission order: email, password, then the name when signing up.
pub fn validate_credentials(
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<(), ValidationError> {
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_valid_password(password) {
        return Err(ValidationError::PasswordTooShort);
    }
    if let Some(name) = name {
        if !is_present(name) {
            return Err(ValidationError::NameRequired);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("a@b.com", true)]
    #[case("first.last@example.co.uk", true)]
    #[case("a@b", false)]
    #[case("a b@c.com", false)]
    #[case("a@b c.com", false)]
    #[case("@b.com", false)]
    #[case("a@.com", false)]
    #[case("a@@b.com", false)]
    #[case("", false)]
    fn email_shapes(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(email), expected);
    }

    #[test]
    fn password_needs_six_characters() {
        assert!(!is_valid_password("12345"));
        assert!(is_valid_password("123456"));
        assert!(is_valid_password("      "));
        assert!(is_valid_password("\u{1F600}\u{1F600}\u{1F600}\u{1F600}\u{1F600}\u{1F600}"));
        assert!(!is_valid_password("\u{1F600}\u{1F600}\u{1F600}"));
    }

    #[test]
    fn required_ignores_surrounding_whitespace() {
        assert!(!is_present(""));
        assert!(!is_present(" \t\n"));
        assert!(is_present("  x "));
    }

    #[test]
    fn title_length_counts_untrimmed_characters() {
        let exactly = "a".repeat(MAX_TITLE_LEN);
        let padded = format!(" {}", exactly);
        assert!(is_valid_title(&exactly));
        assert!(!is_valid_title(&padded));
        assert!(!is_valid_title("   "));
        assert_eq!(validate_title(&padded), Err(ValidationError::TitleTooLong));
        assert_eq!(validate_title(""), Err(ValidationError::TitleRequired));
        assert!(is_valid_title(&"\u{1F600}".repeat(MAX_TITLE_LEN)));
    }

    #[test]
    fn credentials_report_first_failing_field() {
        assert_eq!(
            validate_credentials("nope", "x", Some("")),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_credentials("a@b.com", "x", Some("")),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_credentials("a@b.com", "secret1", Some("  ")),
            Err(ValidationError::NameRequired)
        );
        assert_eq!(validate_credentials("a@b.com", "secret1", None), Ok(()));
    }

    #[test]
    fn messages_match_form_copy() {
        assert_eq!(
            ValidationError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            ValidationError::TitleTooLong.to_string(),
            "Task title must be at most 100 characters"
        );
    }
}
