//! Resume document model — ordered sections of ordered free-text entries.
//!
//! A `Resume` is immutable once loaded for a request and owned exclusively
//! by the request context. Section order and entry order are significant:
//! tailoring must hand back the same section ids in the same order, and
//! rendering preserves both orders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub sections: Vec<ResumeSection>,
}

/// One resume section, e.g. experience, education, skills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSection {
    /// Stable identifier, e.g. "experience". Tailored output must cover
    /// exactly the input id set.
    pub id: String,
    pub title: String,
    pub entries: Vec<SectionEntry>,
}

/// One entry within a section. All fields are free text; which ones are
/// populated varies by section (an experience entry has a heading and
/// period, a skills entry may be body-only).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

impl Resume {
    /// Section ids in document order.
    pub fn section_ids(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.id.as_str()).collect()
    }

    /// A resume with no sections, or with only empty sections, carries
    /// nothing to tailor.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.entries.is_empty())
    }
}

impl SectionEntry {
    /// True when every text field is absent or blank.
    pub fn is_blank(&self) -> bool {
        let blank = |o: &Option<String>| o.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.heading)
            && blank(&self.subheading)
            && blank(&self.period)
            && blank(&self.body)
            && self.highlights.iter().all(|h| h.trim().is_empty())
    }
}
