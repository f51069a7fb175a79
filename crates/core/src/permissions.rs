//! Permission evaluator.
//!
//! Pure decisions over facts the caller has already loaded. A missing post
//! is the caller's concern (`NotFound`); these functions only ever answer
//! yes or no, and [`require_edit`] / [`require_owner`] turn a "no" into
//! [`CoreError::Forbidden`].

use crate::error::CoreError;
use crate::types::DbId;

/// Authorization facts for one post.
#[derive(Debug, Clone, Default)]
pub struct PostAccess {
    pub owner_id: DbId,
    /// Every user holding a collaborator row on the post, owner included.
    pub collaborator_ids: Vec<DbId>,
}

impl PostAccess {
    pub fn new(owner_id: DbId, collaborator_ids: Vec<DbId>) -> Self {
        Self {
            owner_id,
            collaborator_ids,
        }
    }
}

/// True only for the exact owner id.
pub fn is_owner(access: &PostAccess, user_id: DbId) -> bool {
    access.owner_id == user_id
}

/// True for the owner and for every listed collaborator.
pub fn can_edit(access: &PostAccess, user_id: DbId) -> bool {
    is_owner(access, user_id) || access.collaborator_ids.contains(&user_id)
}

pub fn require_owner(access: &PostAccess, user_id: DbId) -> Result<(), CoreError> {
    if is_owner(access, user_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the post owner can perform this action".into(),
        ))
    }
}

pub fn require_edit(access: &PostAccess, user_id: DbId) -> Result<(), CoreError> {
    if can_edit(access, user_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You are not a collaborator on this post".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access() -> PostAccess {
        PostAccess::new(1, vec![1, 2, 3])
    }

    #[test]
    fn owner_is_exact_match() {
        let a = access();
        assert!(is_owner(&a, 1));
        assert!(!is_owner(&a, 2));
        assert!(!is_owner(&a, 0));
        assert!(!is_owner(&a, -1));
    }

    #[test]
    fn collaborators_and_owner_can_edit() {
        let a = access();
        for user in [1, 2, 3] {
            assert!(can_edit(&a, user), "user {user} should edit");
        }
        assert!(!can_edit(&a, 4));
    }

    #[test]
    fn owner_can_edit_without_a_collaborator_row() {
        let a = PostAccess::new(9, vec![]);
        assert!(can_edit(&a, 9));
        assert!(!can_edit(&a, 10));
    }

    #[test]
    fn require_helpers_return_forbidden() {
        let a = access();
        assert!(require_owner(&a, 1).is_ok());
        assert!(matches!(require_owner(&a, 2), Err(CoreError::Forbidden(_))));
        assert!(require_edit(&a, 3).is_ok());
        assert!(matches!(require_edit(&a, 7), Err(CoreError::Forbidden(_))));
    }
}
