//! TEXT format — flattened, human-readable serialization with fixed
//! ordering.
//!
//! Output is built from blocks. A block is the unit the DOCUMENT format is
//! not allowed to split across a page when it fits on one: a resume entry,
//! a cover-letter paragraph, or a question/answer pair. TEXT joins the
//! blocks with blank lines.

use crate::models::result::TailoredResult;
use crate::models::resume::ResumeSection;

/// One logical text block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lines: Vec<String>,
}

impl Block {
    fn new(lines: Vec<String>) -> Self {
        Block { lines }
    }
}

pub fn render_text(result: &TailoredResult) -> String {
    let blocks = blocks(result);
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for line in &block.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Decomposes a result into ordered blocks. Ordering is fixed by the result
/// itself: resume sections in document order, letter paragraphs top to
/// bottom, answers in question order.
pub fn blocks(result: &TailoredResult) -> Vec<Block> {
    match result {
        TailoredResult::Resume(resume) => {
            let mut blocks = Vec::new();
            for section in &resume.sections {
                blocks.extend(section_blocks(section));
            }
            blocks
        }
        TailoredResult::CoverLetter(letter) => {
            let mut blocks = vec![Block::new(vec![letter.greeting.clone()])];
            for paragraph in &letter.body_paragraphs {
                blocks.push(Block::new(
                    paragraph.split('\n').map(str::to_string).collect(),
                ));
            }
            blocks.push(Block::new(
                letter.closing.split('\n').map(str::to_string).collect(),
            ));
            blocks
        }
        TailoredResult::Answers(sheet) => sheet
            .answers
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mut lines = vec![format!("Q{}: {}", i + 1, item.question)];
                lines.extend(item.answer.split('\n').map(str::to_string));
                Block::new(lines)
            })
            .collect(),
    }
}

fn section_blocks(section: &ResumeSection) -> Vec<Block> {
    let mut blocks = vec![Block::new(vec![section.title.to_uppercase()])];
    for entry in &section.entries {
        let mut lines = Vec::new();
        if let Some(heading) = entry.heading.as_deref() {
            match entry.subheading.as_deref() {
                Some(sub) => lines.push(format!("{heading} at {sub}")),
                None => lines.push(heading.to_string()),
            }
        }
        if let Some(period) = entry.period.as_deref() {
            lines.push(period.to_string());
        }
        if let Some(body) = entry.body.as_deref() {
            lines.extend(body.split('\n').map(str::to_string));
        }
        for highlight in &entry.highlights {
            lines.push(format!("• {highlight}"));
        }
        if !lines.is_empty() {
            blocks.push(Block::new(lines));
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::{AnswerItem, AnswerSheet, CoverLetter, TailoredResume};
    use crate::models::resume::SectionEntry;

    fn three_section_resume() -> TailoredResult {
        TailoredResult::Resume(TailoredResume {
            sections: vec![
                ResumeSection {
                    id: "summary".into(),
                    title: "Summary".into(),
                    entries: vec![SectionEntry {
                        body: Some("Engineer focused on Python and distributed systems.".into()),
                        ..Default::default()
                    }],
                },
                ResumeSection {
                    id: "experience".into(),
                    title: "Experience".into(),
                    entries: vec![SectionEntry {
                        heading: Some("Senior Engineer".into()),
                        subheading: Some("Acme".into()),
                        period: Some("2019 - 2024".into()),
                        highlights: vec!["Built a distributed scheduler".into()],
                        ..Default::default()
                    }],
                },
                ResumeSection {
                    id: "skills".into(),
                    title: "Skills".into(),
                    entries: vec![SectionEntry {
                        body: Some("Python, distributed systems".into()),
                        ..Default::default()
                    }],
                },
            ],
        })
    }

    #[test]
    fn test_resume_text_keeps_three_sections_in_order() {
        let text = render_text(&three_section_resume());
        let summary = text.find("SUMMARY").unwrap();
        let experience = text.find("EXPERIENCE").unwrap();
        let skills = text.find("SKILLS").unwrap();
        assert!(summary < experience && experience < skills);
        assert!(text.contains("Senior Engineer at Acme"));
        assert!(text.contains("• Built a distributed scheduler"));
    }

    #[test]
    fn test_resume_sections_are_non_empty_in_text() {
        let text = render_text(&three_section_resume());
        for header in ["SUMMARY", "EXPERIENCE", "SKILLS"] {
            let after = &text[text.find(header).unwrap() + header.len()..];
            assert!(
                after.trim_start().lines().next().is_some(),
                "section {header} rendered empty"
            );
        }
    }

    #[test]
    fn test_cover_letter_text_order() {
        let result = TailoredResult::CoverLetter(CoverLetter {
            greeting: "Dear Hiring Manager,".into(),
            body_paragraphs: vec!["Para one.".into(), "Para two.".into()],
            closing: "Sincerely,\nAlex".into(),
        });
        let text = render_text(&result);
        let greeting = text.find("Dear Hiring Manager,").unwrap();
        let one = text.find("Para one.").unwrap();
        let two = text.find("Para two.").unwrap();
        let closing = text.find("Sincerely,").unwrap();
        assert!(greeting < one && one < two && two < closing);
        assert!(text.ends_with("Alex\n"));
    }

    #[test]
    fn test_answers_text_numbered_in_order() {
        let result = TailoredResult::Answers(AnswerSheet {
            answers: vec![
                AnswerItem {
                    question: "Why us?".into(),
                    answer: "Mission.".into(),
                },
                AnswerItem {
                    question: "Why you?".into(),
                    answer: "Experience.".into(),
                },
            ],
        });
        let text = render_text(&result);
        assert!(text.find("Q1: Why us?").unwrap() < text.find("Q2: Why you?").unwrap());
        assert!(text.contains("Mission."));
    }

    #[test]
    fn test_render_text_is_deterministic() {
        let result = three_section_resume();
        assert_eq!(render_text(&result), render_text(&result));
    }
}
