#![allow(dead_code)]

//! Form model — the editable job application, autofilled from parsed résumés.

pub mod skills;

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::cv::{EducationEntry, ExperienceEntry, ParsedCv, PersonalInfo};

use self::skills::{format_skills, parse_skills};

/// The editable application form.
///
/// The skills list is the stored value. The text shown for editing is the list
/// rendered with `format_skills`, unless the user has typed over it; typed
/// text only replaces the list at submit. Education and experience start with
/// one blank entry each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    skills: Vec<String>,
    edited_skills_text: Option<String>,
}

/// Terminal notification produced by `FormState::submit`. Nothing is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub application: ParsedCv,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            education: vec![EducationEntry::default()],
            experience: vec![ExperienceEntry::default()],
            skills: Vec::new(),
            edited_skills_text: None,
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the form with parser output.
    ///
    /// Personal info is replaced wholesale. Education, experience and skills
    /// are replaced only when the incoming list is non-empty.
    pub fn autofill(&mut self, parsed: &ParsedCv) {
        self.personal_info = parsed.personal_info.clone();

        if !parsed.education.is_empty() {
            self.education = parsed.education.clone();
        }
        if !parsed.experience.is_empty() {
            self.experience = parsed.experience.clone();
        }
        if !parsed.skills.is_empty() {
            self.skills = parsed.skills.clone();
            self.edited_skills_text = None;
        }

        debug!(
            education = self.education.len(),
            experience = self.experience.len(),
            skills = self.skills.len(),
            "Form autofilled"
        );
    }

    pub fn add_education(&mut self) {
        self.education.push(EducationEntry::default());
    }

    pub fn add_experience(&mut self) {
        self.experience.push(ExperienceEntry::default());
    }

    /// Removes the entry at `index`. Out-of-range indices are ignored.
    pub fn remove_education(&mut self, index: usize) -> Option<EducationEntry> {
        remove_at(&mut self.education, index)
    }

    /// Removes the entry at `index`. Out-of-range indices are ignored.
    pub fn remove_experience(&mut self, index: usize) -> Option<ExperienceEntry> {
        remove_at(&mut self.experience, index)
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn skills_text(&self) -> Cow<'_, str> {
        match &self.edited_skills_text {
            Some(text) => Cow::Borrowed(text.as_str()),
            None => Cow::Owned(format_skills(&self.skills)),
        }
    }

    /// Records free-text edits. The list is not touched until `submit`.
    pub fn set_skills_text(&mut self, text: impl Into<String>) {
        self.edited_skills_text = Some(text.into());
    }

    /// Removes every skill equal to `skill`. The text is re-rendered from the
    /// remaining list, discarding unsubmitted text edits.
    pub fn remove_skill(&mut self, skill: &str) {
        self.skills.retain(|s| s != skill);
        self.edited_skills_text = None;
    }

    /// Skills as they would be submitted: non-empty edited text wins over the list.
    fn submitted_skills(&self) -> Vec<String> {
        match self.edited_skills_text.as_deref() {
            Some(text) if !text.is_empty() => parse_skills(text),
            _ => self.skills.clone(),
        }
    }

    /// Current form contents in wire shape, with pending skills text applied.
    pub fn snapshot(&self) -> ParsedCv {
        ParsedCv {
            personal_info: self.personal_info.clone(),
            education: self.education.clone(),
            experience: self.experience.clone(),
            skills: self.submitted_skills(),
        }
    }

    /// Finalises the application, syncing the skills list from edited text.
    pub fn submit(&mut self) -> Submission {
        self.skills = self.submitted_skills();

        let submission = Submission {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            application: self.snapshot(),
        };
        info!(
            id = %submission.id,
            name = %submission.application.personal_info.full_name,
            skills = submission.application.skills.len(),
            "Application submitted"
        );
        submission
    }
}

fn remove_at<T>(entries: &mut Vec<T>, index: usize) -> Option<T> {
    if index < entries.len() {
        Some(entries.remove(index))
    } else {
        debug!(index, len = entries.len(), "Ignoring out-of-range removal");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> ParsedCv {
        ParsedCv {
            personal_info: PersonalInfo {
                full_name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                phone: "555".to_string(),
            },
            education: vec![EducationEntry {
                degree: "BS".to_string(),
                institution: "MIT".to_string(),
                year: "2020".to_string(),
            }],
            experience: vec![],
            skills: vec!["Go".to_string(), "SQL".to_string()],
        }
    }

    #[test]
    fn test_new_form_has_one_blank_entry_each() {
        let form = FormState::new();
        assert_eq!(form.education, vec![EducationEntry::default()]);
        assert_eq!(form.experience, vec![ExperienceEntry::default()]);
        assert!(form.skills().is_empty());
    }

    #[test]
    fn test_autofill_replaces_non_empty_sections_only() {
        let mut form = FormState::new();
        form.experience[0].title = "Intern".to_string();
        let before = form.experience.clone();

        form.autofill(&jane());

        assert_eq!(form.personal_info.full_name, "Jane Doe");
        assert_eq!(form.education, jane().education);
        assert_eq!(form.experience, before);
        assert_eq!(form.skills(), vec!["Go", "SQL"]);
        assert_eq!(form.skills_text(), "Go, SQL");
    }

    #[test]
    fn test_autofill_overwrites_personal_info_wholesale() {
        let mut form = FormState::new();
        form.personal_info.phone = "123".to_string();

        let mut parsed = jane();
        parsed.personal_info.phone = String::new();
        form.autofill(&parsed);

        assert_eq!(form.personal_info.phone, "");
    }

    #[test]
    fn test_autofill_with_empty_skills_keeps_text() {
        let mut form = FormState::new();
        form.set_skills_text("Rust");

        let mut parsed = jane();
        parsed.skills.clear();
        form.autofill(&parsed);

        assert_eq!(form.skills_text(), "Rust");
    }

    #[test]
    fn test_autofill_does_not_alias_source() {
        let mut form = FormState::new();
        let mut parsed = jane();
        form.autofill(&parsed);

        parsed.education[0].degree = "PhD".to_string();
        assert_eq!(form.education[0].degree, "BS");
    }

    #[test]
    fn test_remove_skill_removes_all_matches() {
        let mut form = FormState::new();
        let mut parsed = jane();
        parsed.skills = vec!["Go".to_string(), "SQL".to_string(), "Go".to_string()];
        form.autofill(&parsed);

        form.remove_skill("Go");

        assert_eq!(form.skills(), vec!["SQL"]);
        assert_eq!(form.skills_text(), "SQL");
    }

    #[test]
    fn test_submit_derives_skills_from_text() {
        let mut form = FormState::new();
        form.autofill(&jane());
        form.set_skills_text(" a, b ,, c");

        let submission = form.submit();

        assert_eq!(submission.application.skills, vec!["a", "b", "c"]);
        assert_eq!(form.skills(), ["a", "b", "c"]);
        assert_eq!(submission.application.personal_info.full_name, "Jane Doe");
    }

    #[test]
    fn test_autofill_keeps_skill_containing_comma() {
        let mut form = FormState::new();
        let mut parsed = jane();
        parsed.skills = vec!["C, C++".to_string(), "Go".to_string()];

        form.autofill(&parsed);

        assert_eq!(form.skills(), ["C, C++", "Go"]);
        assert_eq!(form.skills_text(), "C, C++, Go");

        form.remove_skill("Go");
        assert_eq!(form.skills(), ["C, C++"]);

        let submission = form.submit();
        assert_eq!(submission.application.skills, vec!["C, C++"]);
    }

    #[test]
    fn test_skills_text_edits_apply_only_at_submit() {
        let mut form = FormState::new();
        form.autofill(&jane());
        form.set_skills_text("Rust, Go");

        assert_eq!(form.skills(), ["Go", "SQL"]);
        assert_eq!(form.skills_text(), "Rust, Go");

        form.submit();
        assert_eq!(form.skills(), ["Rust", "Go"]);
    }

    #[test]
    fn test_cleared_skills_text_keeps_list_at_submit() {
        let mut form = FormState::new();
        form.autofill(&jane());
        form.set_skills_text("");

        let submission = form.submit();

        assert_eq!(submission.application.skills, vec!["Go", "SQL"]);
    }

    #[test]
    fn test_remove_skill_discards_unsubmitted_text() {
        let mut form = FormState::new();
        form.autofill(&jane());
        form.set_skills_text("Go, SQL, Rust");

        form.remove_skill("SQL");

        assert_eq!(form.skills(), ["Go"]);
        assert_eq!(form.skills_text(), "Go");
    }

    #[test]
    fn test_add_then_remove_first_education_empties_single_entry_list() {
        let mut form = FormState::new();
        form.education.clear();
        form.add_education();
        assert_eq!(form.education.len(), 1);

        assert_eq!(form.remove_education(0), Some(EducationEntry::default()));
        assert!(form.education.is_empty());
    }

    #[test]
    fn test_remove_shifts_following_entries_left() {
        let mut form = FormState::new();
        form.experience[0].title = "first".to_string();
        form.add_experience();
        form.experience[1].title = "second".to_string();
        form.add_experience();
        form.experience[2].title = "third".to_string();

        form.remove_experience(1);

        let titles: Vec<&str> = form.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "third"]);
    }

    #[test]
    fn test_out_of_range_removal_is_noop() {
        let mut form = FormState::new();
        assert_eq!(form.remove_education(5), None);
        assert_eq!(form.remove_experience(1), None);
        assert_eq!(form.education.len(), 1);
        assert_eq!(form.experience.len(), 1);
    }

    #[test]
    fn test_added_entry_is_last() {
        let mut form = FormState::new();
        form.education[0].degree = "BS".to_string();
        form.add_education();
        assert_eq!(form.education.len(), 2);
        assert_eq!(form.education[1], EducationEntry::default());
        assert_eq!(form.education[0].degree, "BS");
    }
}
