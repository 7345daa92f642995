//! Skills are edited as free text; the list form is derived from it on demand.

/// Splits comma-separated skills, trimming each piece and dropping empty ones.
pub fn parse_skills(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Renders a skills list the way it is shown for editing.
pub fn format_skills<S: AsRef<str>>(skills: &[S]) -> String {
    skills
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
