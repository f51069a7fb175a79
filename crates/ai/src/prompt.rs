//! Generation request validation and prompt construction.

use coauthor_core::error::CoreError;

pub const BRIEF_MIN_LEN: usize = 10;
pub const BRIEF_MAX_LEN: usize = 1000;

/// Maximum length of the optional tone / length hints.
pub const HINT_MAX_LEN: usize = 50;

pub fn validate_brief(brief: &str) -> Result<(), CoreError> {
    let len = brief.trim().chars().count();
    if !(BRIEF_MIN_LEN..=BRIEF_MAX_LEN).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Brief must be between {BRIEF_MIN_LEN} and {BRIEF_MAX_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_hint(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > HINT_MAX_LEN => Err(CoreError::Validation(format!(
            "{field} must be at most {HINT_MAX_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

/// Build the instruction sent to every backend.
pub fn build_prompt(brief: &str, tone: Option<&str>, length: Option<&str>) -> String {
    let mut prompt = format!(
        "You are an AI content writer for blogs/case studies. Write content based on: {}",
        brief.trim()
    );
    if let Some(tone) = tone.map(str::trim).filter(|t| !t.is_empty()) {
        prompt.push_str(&format!("\nTone: {tone}"));
    }
    if let Some(length) = length.map(str::trim).filter(|l| !l.is_empty()) {
        prompt.push_str(&format!("\nLength: {length}"));
    }
    prompt
}
