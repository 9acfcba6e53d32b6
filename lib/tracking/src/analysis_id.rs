use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Width of the email fingerprint segment, in hex characters.
const FINGERPRINT_LEN: usize = 6;

/// Stable identifier for one analysis request.
///
/// Format: `{submission_id}_{email_fingerprint}_{tooth_number}`, e.g.
/// `5123456789_a1b2c3_21`. The fingerprint is a truncated SHA-256 of the
/// dentist email, so the identifier is shareable without embedding personal
/// data while remaining a deterministic function of its inputs: no
/// randomness, no clock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisId(String);

impl AnalysisId {
    /// Derive the identifier for one (submission, dentist, tooth) request.
    ///
    /// `submission_id` and `tooth_number` must be non-empty decimal digit
    /// strings; the email must contain `@` and no whitespace. Inputs that
    /// would produce a malformed identifier are rejected here rather than
    /// silently passed through.
    pub fn derive(submission_id: &str, email: &str, tooth_number: &str) -> Result<Self> {
        if submission_id.is_empty() || !submission_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "submission id must be a decimal digit string, got {submission_id:?}"
            )));
        }
        if tooth_number.is_empty() || !tooth_number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "tooth number must be a decimal digit string, got {tooth_number:?}"
            )));
        }
        if !email.contains('@') || email.chars().any(char::is_whitespace) {
            return Err(Error::InvalidArgument(format!(
                "not a usable email address: {email:?}"
            )));
        }

        let fingerprint = email_fingerprint(email);
        Ok(Self(format!("{submission_id}_{fingerprint}_{tooth_number}")))
    }

    /// Structural check: three underscore-delimited fields, digit-only
    /// submission and tooth segments, a fingerprint of exactly
    /// [`FINGERPRINT_LEN`] characters.
    ///
    /// This does not re-derive the fingerprint, so a forged-but-well-formed
    /// identifier passes. That is a documented limitation; the identifier is
    /// a tracking key, not a security boundary.
    pub fn validate(candidate: &str) -> bool {
        let mut parts = candidate.split('_');
        let (Some(submission), Some(fingerprint), Some(tooth), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        !submission.is_empty()
            && submission.bytes().all(|b| b.is_ascii_digit())
            && fingerprint.len() == FINGERPRINT_LEN
            && !tooth.is_empty()
            && tooth.bytes().all(|b| b.is_ascii_digit())
    }

    /// Best-effort reverse lookup of the original submission id.
    ///
    /// Returns `None` for a structurally invalid identifier instead of
    /// failing; reconciliation callers treat that as "not one of ours".
    pub fn submission_id_of(candidate: &str) -> Option<&str> {
        if !Self::validate(candidate) {
            return None;
        }
        candidate.split('_').next()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed-width, non-reversible fingerprint of a dentist email.
///
/// Same email always yields the same fingerprint. Case and surrounding
/// whitespace are not significant.
fn email_fingerprint(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_ascii_lowercase().as_bytes());
    let mut out = String::with_capacity(FINGERPRINT_LEN);
    for byte in digest.iter().take(FINGERPRINT_LEN.div_ceil(2)) {
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(FINGERPRINT_LEN);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = AnalysisId::derive("5123456789", "doc@example.com", "21").unwrap();
        let b = AnalysisId::derive("5123456789", "doc@example.com", "21").unwrap();
        assert_eq!(a, b);

        let c = AnalysisId::derive("5123456789", "other@example.com", "21").unwrap();
        assert_ne!(a, c);
        let d = AnalysisId::derive("5123456790", "doc@example.com", "21").unwrap();
        assert_ne!(a, d);
        let e = AnalysisId::derive("5123456789", "doc@example.com", "22").unwrap();
        assert_ne!(a, e);
    }

    #[test]
    fn test_derive_shape() {
        let id = AnalysisId::derive("5123456789", "doc@example.com", "21").unwrap();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "5123456789");
        assert_eq!(parts[1].len(), 6);
        assert!(parts[1].bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        assert_eq!(parts[2], "21");
    }

    #[test]
    fn test_fingerprint_ignores_case_and_padding() {
        let a = AnalysisId::derive("1", "Doc@Example.COM", "21").unwrap();
        let b = AnalysisId::derive("1", "doc@example.com", "21").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_rejects_bad_inputs() {
        assert!(AnalysisId::derive("", "doc@example.com", "21").is_err());
        assert!(AnalysisId::derive("12a4", "doc@example.com", "21").is_err());
        assert!(AnalysisId::derive("1234", "doc@example.com", "2 1").is_err());
        assert!(AnalysisId::derive("1234", "doc@example.com", "").is_err());
        assert!(AnalysisId::derive("1234", "not-an-email", "21").is_err());
        assert!(AnalysisId::derive("1234", "doc @example.com", "21").is_err());
    }

    #[test]
    fn test_validate_round_trip() {
        let id = AnalysisId::derive("5123456789", "doc@example.com", "21").unwrap();
        assert!(AnalysisId::validate(id.as_str()));
        assert_eq!(
            AnalysisId::submission_id_of(id.as_str()),
            Some("5123456789")
        );
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert!(!AnalysisId::validate(""));
        assert!(!AnalysisId::validate("123_abc"));
        assert!(!AnalysisId::validate("123_abcdef_21_extra"));
        assert!(!AnalysisId::validate("12x_abcdef_21"));
        assert!(!AnalysisId::validate("123_abcde_21"));
        assert!(!AnalysisId::validate("123_abcdefg_21"));
        assert!(!AnalysisId::validate("123_abcdef_2x"));
        assert_eq!(AnalysisId::submission_id_of("123_abc"), None);
    }
}
