//! Medical code extraction
//!
//! Claim feeds carry diagnosis and procedure codes buried in free text
//! ("Diag: e11.9 present", "cpt 99213 billed"). These helpers pull out the
//! first plausible token; callers substitute the schema default when nothing
//! matches.

use once_cell::sync::Lazy;
use regex::Regex;

/// ICD-style token: one letter, two digits, then alphanumerics or dots
static DIAGNOSIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[a-z][0-9]{2}[a-z0-9.]*").expect("valid diagnosis pattern"));

/// Maximal digit runs; procedure codes are the runs of exactly five digits
static DIGIT_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digit-run pattern"));

/// Extract the first ICD-style diagnosis code from free text, uppercased.
pub fn extract_diagnosis_code(text: &str) -> Option<String> {
    DIAGNOSIS_RE.find(text).map(|m| m.as_str().to_uppercase())
}

/// Extract the first whole token of exactly five digits from free text.
///
/// Longer or shorter digit runs are not procedure codes; "123456" yields
/// nothing while "cpt 99213 billed" yields "99213".
pub fn extract_procedure_code(text: &str) -> Option<String> {
    DIGIT_RUN_RE
        .find_iter(text)
        .find(|m| m.as_str().len() == 5)
        .map(|m| m.as_str().to_string())
}
