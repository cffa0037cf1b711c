use std::collections::BTreeMap;

use rocket::http::Status;
use serde::Serialize;

use super::{Envelope, Reply};
use crate::error::{Error, Result};

/// The fields of a request body that failed validation, each mapped to `true`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, bool>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `field` as invalid unless `valid` holds.
    pub fn check(&mut self, field: &'static str, valid: bool) -> &mut Self {
        if !valid {
            self.0.insert(field, true);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok` if nothing was flagged, otherwise an [`Error::Invalid`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Invalid(self))
        }
    }

    /// A 400 failure whose `data` names the offending fields.
    pub fn into_reply(self) -> Reply {
        // A map of `&str` to `bool` always converts.
        let data = rocket::serde::json::serde_json::to_value(&self).ok();
        Reply::new(
            Status::BadRequest,
            Envelope::new(data, Some("Invalid fields".to_string())),
        )
    }
}

/// Is `value` between `min` and `max` characters long (inclusive)?
pub fn length_between(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

/// A loose email shape check: `local@domain.tld`.
pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rocket::serde::json::json;

    #[test]
    fn reply_names_fields() {
        let mut errors = FieldErrors::new();
        errors.check("userName", false).check("email", true);
        let reply = errors.into_reply();
        assert_eq!(reply.status, Status::BadRequest);
        assert_eq!(reply.body.data, Some(json!({"userName": true})));
        assert_eq!(reply.body.error.as_deref(), Some("Invalid fields"));
    }

    #[test]
    fn empty_errors_pass() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn emails() {
        assert!(looks_like_email("ada@example.com"));
        assert!(!looks_like_email("ada@example"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("ada@@example.com"));
        assert!(!looks_like_email("ada lovelace@example.com"));
    }

    #[test]
    fn lengths_count_characters() {
        assert!(length_between("héllo", 5, 5));
        assert!(!length_between("", 1, 5));
    }
}
