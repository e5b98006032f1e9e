use lazy_static::lazy_static;
use regex::Regex;

/// Only college addresses may register or log in
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@skasc\.ac\.in$";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(EMAIL_PATTERN).expect("email pattern is valid");
}

/// Check that `email` is a `@skasc.ac.in` address
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
