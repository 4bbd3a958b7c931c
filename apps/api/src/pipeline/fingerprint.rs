//! Request fingerprinting for single-flight de-duplication.
//!
//! The fingerprint is a SHA-256 over every request-defining field. Fields
//! are length-prefixed before hashing so adjacent values cannot collide by
//! concatenation. Stability follows from the Prompt Builder's determinism:
//! the same fields always serialize to the same bytes.

use sha2::{Digest, Sha256};

use crate::pipeline::GenerateRequest;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub(crate) fn from_hex(digest: String) -> Self {
        Fingerprint(digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Log-friendly short form.
        write!(f, "{}", &self.0[..12.min(self.0.len())])
    }
}

pub fn fingerprint(request: &GenerateRequest) -> Fingerprint {
    let mut hasher = Sha256::new();

    // serde_json is deterministic for these types: struct field order is
    // fixed and the only set involved is a BTreeSet.
    let resume_json = serde_json::to_string(&request.resume).unwrap_or_default();
    let jd_json = serde_json::to_string(&request.job_description).unwrap_or_default();
    let options_json = serde_json::to_string(&request.effective_options()).unwrap_or_default();

    let mut update = |bytes: &[u8]| {
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(bytes);
    };
    update(resume_json.as_bytes());
    update(jd_json.as_bytes());
    update(request.task.as_str().as_bytes());
    for question in &request.questions {
        update(question.as_bytes());
    }
    update(request.format.as_str().as_bytes());
    update(options_json.as_bytes());

    Fingerprint(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobDescription;
    use crate::models::result::OutputFormat;
    use crate::models::resume::{Resume, ResumeSection, SectionEntry};
    use crate::models::task::TaskKind;
    use std::collections::BTreeSet;

    fn base_request() -> GenerateRequest {
        GenerateRequest {
            resume: Resume {
                sections: vec![ResumeSection {
                    id: "experience".into(),
                    title: "Experience".into(),
                    entries: vec![SectionEntry {
                        body: Some("Shipped things".into()),
                        ..Default::default()
                    }],
                }],
            },
            job_description: JobDescription {
                body: "Rust engineer".into(),
                title: None,
                required_skills: BTreeSet::new(),
            },
            task: TaskKind::TailorResume,
            questions: vec![],
            format: OutputFormat::Text,
            options: None,
        }
    }

    #[test]
    fn test_identical_requests_share_a_fingerprint() {
        assert_eq!(fingerprint(&base_request()), fingerprint(&base_request()));
    }

    #[test]
    fn test_each_field_perturbs_the_fingerprint() {
        let base = fingerprint(&base_request());

        let mut r = base_request();
        r.job_description.body.push('!');
        assert_ne!(fingerprint(&r), base, "jd change must change fingerprint");

        let mut r = base_request();
        r.resume.sections[0].entries[0].body = Some("Different".into());
        assert_ne!(fingerprint(&r), base, "resume change must change fingerprint");

        let mut r = base_request();
        r.task = TaskKind::CoverLetter;
        assert_ne!(fingerprint(&r), base, "task change must change fingerprint");

        let mut r = base_request();
        r.format = OutputFormat::Structured;
        assert_ne!(fingerprint(&r), base, "format change must change fingerprint");

        let mut r = base_request();
        r.questions = vec!["Why?".into()];
        assert_ne!(fingerprint(&r), base, "questions must change fingerprint");
    }

    #[test]
    fn test_fingerprint_is_hex_of_sha256_width() {
        let fp = fingerprint(&base_request());
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
