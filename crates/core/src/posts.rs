//! Post vocabulary: types, statuses, collaborator roles, slugs and the
//! status transition rule.
//!
//! Enums are persisted as their upper-case string form (`"BLOG"`,
//! `"DRAFT"`, `"OWNER"`, ...) in TEXT columns guarded by CHECK constraints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minimum post title length in characters.
pub const TITLE_MIN_LEN: usize = 3;

/// Maximum post title length in characters.
pub const TITLE_MAX_LEN: usize = 200;

/// Collaborator capacity (owner included) for [`PostType::Blog`].
pub const BLOG_COLLAB_LIMIT: i32 = 5;

/// Collaborator capacity (owner included) for [`PostType::CaseStudy`].
pub const CASE_STUDY_COLLAB_LIMIT: i32 = 4;

/// Length of the random suffix appended when a derived slug collides.
pub const SLUG_SUFFIX_LEN: usize = 6;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The persisted / wire representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        $label,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// Kind of document; determines the collaborator capacity.
    PostType, "post type" {
        Blog => "BLOG",
        CaseStudy => "CASE_STUDY",
    }
}

string_enum! {
    /// Publication status. Only `DRAFT -> PUBLISHED` is ever allowed.
    PostStatus, "post status" {
        Draft => "DRAFT",
        Published => "PUBLISHED",
    }
}

string_enum! {
    /// Role of a user on a single post.
    CollabRole, "collaborator role" {
        Owner => "OWNER",
        Editor => "EDITOR",
        Commenter => "COMMENTER",
        Viewer => "VIEWER",
    }
}

impl PostType {
    /// Maximum number of collaborator rows (owner included) for this type.
    pub fn collab_limit(self) -> i32 {
        match self {
            PostType::Blog => BLOG_COLLAB_LIMIT,
            PostType::CaseStudy => CASE_STUDY_COLLAB_LIMIT,
        }
    }
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Check that a post may move from `current` to `requested`.
///
/// Staying in the same status is accepted as a no-op. The only real
/// transition is `DRAFT -> PUBLISHED`; unpublishing is rejected.
/// Ownership is checked separately by the permission layer.
pub fn validate_status_transition(
    current: PostStatus,
    requested: PostStatus,
) -> Result<(), CoreError> {
    match (current, requested) {
        (PostStatus::Draft, _) => Ok(()),
        (PostStatus::Published, PostStatus::Published) => Ok(()),
        (PostStatus::Published, PostStatus::Draft) => Err(CoreError::Validation(
            "A published post cannot be moved back to draft".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Titles and slugs
// ---------------------------------------------------------------------------

/// Validate a post title (trimmed length within bounds).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let len = title.trim().chars().count();
    if len < TITLE_MIN_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at least {TITLE_MIN_LEN} characters"
        )));
    }
    if len > TITLE_MAX_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Reduce arbitrary text to lowercase ASCII alphanumerics separated by
/// single hyphens, with no leading or trailing hyphen.
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_hyphen = true;
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }
    result.trim_end_matches('-').to_string()
}

/// Derive the slug for a new post from its title and creation instant
/// (Unix milliseconds), e.g. `launch-notes-1760601600000`.
pub fn post_slug(title: &str, created_at_millis: i64) -> String {
    slugify(&format!("{title}-{created_at_millis}"))
}

/// Append a short random lowercase suffix to a slug that collided.
pub fn slug_with_suffix(slug: &str) -> String {
    use rand::Rng;

    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SLUG_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{slug}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collab_limits_follow_post_type() {
        assert_eq!(PostType::Blog.collab_limit(), 5);
        assert_eq!(PostType::CaseStudy.collab_limit(), 4);
    }

    #[test]
    fn enums_parse_their_wire_form() {
        assert_eq!("BLOG".parse::<PostType>().unwrap(), PostType::Blog);
        assert_eq!("CASE_STUDY".parse::<PostType>().unwrap(), PostType::CaseStudy);
        assert_eq!("PUBLISHED".parse::<PostStatus>().unwrap(), PostStatus::Published);
        assert_eq!("COMMENTER".parse::<CollabRole>().unwrap(), CollabRole::Commenter);
    }

    #[test]
    fn enums_reject_unknown_and_lowercase() {
        let err = "blog".parse::<PostType>().unwrap_err();
        assert!(err.to_string().contains("Invalid post type"));
        assert!("ADMIN".parse::<CollabRole>().is_err());
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&PostType::CaseStudy).unwrap();
        assert_eq!(json, "\"CASE_STUDY\"");
        let role: CollabRole = serde_json::from_str("\"EDITOR\"").unwrap();
        assert_eq!(role, CollabRole::Editor);
    }

    #[test]
    fn draft_can_be_published() {
        assert!(validate_status_transition(PostStatus::Draft, PostStatus::Published).is_ok());
        assert!(validate_status_transition(PostStatus::Draft, PostStatus::Draft).is_ok());
        assert!(
            validate_status_transition(PostStatus::Published, PostStatus::Published).is_ok()
        );
    }

    #[test]
    fn published_cannot_be_unpublished() {
        let err =
            validate_status_transition(PostStatus::Published, PostStatus::Draft).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn title_bounds() {
        assert!(validate_title("Launch Notes").is_ok());
        assert!(validate_title("abc").is_ok());
        assert!(validate_title("  ab  ").is_err());
        assert!(validate_title(&"x".repeat(201)).is_err());
        assert!(validate_title(&"x".repeat(200)).is_ok());
    }

    #[test]
    fn slugify_strips_symbols_and_collapses_hyphens() {
        assert_eq!(slugify("Launch Notes"), "launch-notes");
        assert_eq!(slugify("  Hello,   World!! "), "hello-world");
        assert_eq!(slugify("Café & Co."), "caf-co");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn post_slug_embeds_timestamp() {
        assert_eq!(
            post_slug("Launch Notes", 1_760_601_600_000),
            "launch-notes-1760601600000"
        );
    }

    #[test]
    fn identical_titles_at_different_instants_get_distinct_slugs() {
        let a = post_slug("Same Title", 1_000);
        let b = post_slug("Same Title", 1_001);
        assert_ne!(a, b);
    }

    #[test]
    fn suffixed_slug_stays_url_safe() {
        let slug = slug_with_suffix("launch-notes-1");
        assert!(slug.starts_with("launch-notes-1-"));
        assert_eq!(slug.len(), "launch-notes-1-".len() + SLUG_SUFFIX_LEN);
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }
}
