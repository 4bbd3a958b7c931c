//! Job description document model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A target job description: the raw text plus whatever structured hints
/// the caller already extracted. Immutable, request-scoped.
///
/// `required_skills` is a `BTreeSet` so serialization order is stable and
/// the Prompt Builder stays byte-deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub required_skills: BTreeSet<String>,
}

impl JobDescription {
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_only_body_is_empty() {
        let jd = JobDescription {
            body: "  \n\t ".into(),
            title: None,
            required_skills: BTreeSet::new(),
        };
        assert!(jd.is_empty());
    }

    #[test]
    fn test_required_skills_serialize_sorted() {
        let jd = JobDescription {
            body: "Build systems".into(),
            title: None,
            required_skills: ["Rust", "Python", "AWS"]
                .into_iter()
                .map(String::from)
                .collect(),
        };
        let json = serde_json::to_string(&jd).unwrap();
        let aws = json.find("AWS").unwrap();
        let python = json.find("Python").unwrap();
        let rust = json.find("Rust").unwrap();
        assert!(aws < python && python < rust);
    }
}
