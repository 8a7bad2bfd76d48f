use chrono::Utc;
use tracing::info;

use super::{require_staff, EngagementError, EngagementService, MissingEntity};
use crate::catalog::domain::{Actor, Comment};
use crate::catalog::ids::{CommentId, PetId};
use crate::catalog::repository::{Notice, NotificationSink, ShelterRepository};

impl<R, N> EngagementService<R, N>
where
    R: ShelterRepository + 'static,
    N: NotificationSink + 'static,
{
    /// Post a comment. Comments are published immediately; moderation happens afterwards.
    pub fn add_comment(
        &self,
        actor: &Actor,
        pet_id: PetId,
        content: &str,
    ) -> Result<Comment, EngagementError> {
        self.require_pet(pet_id)?;
        let content = self.guard.comment_content(content)?;

        let stored = self.repository.insert_comment(Comment {
            id: CommentId::next(),
            pet: pet_id,
            user: actor.user.clone(),
            content,
            created_at: Utc::now(),
            is_approved: true,
        })?;

        info!(user = %actor.user, pet = %pet_id, comment = %stored.id, "comment added");
        self.notify(
            Notice::new("comment_added", &actor.user, Some(pet_id))
                .with_detail("comment_id", stored.id.to_string()),
        );
        Ok(stored)
    }

    /// Only the author may delete a comment.
    pub fn delete_comment(
        &self,
        actor: &Actor,
        comment_id: CommentId,
    ) -> Result<(), EngagementError> {
        let comment = self
            .repository
            .fetch_comment(comment_id)?
            .ok_or(EngagementError::NotFound(MissingEntity::Comment(comment_id)))?;

        if comment.user != actor.user {
            return Err(EngagementError::Permission(
                "only the author may delete a comment",
            ));
        }

        if !self.repository.delete_comment(comment_id)? {
            return Err(EngagementError::NotFound(MissingEntity::Comment(comment_id)));
        }

        info!(user = %actor.user, comment = %comment_id, "comment deleted");
        self.notify(
            Notice::new("comment_deleted", &actor.user, Some(comment.pet))
                .with_detail("comment_id", comment_id.to_string()),
        );
        Ok(())
    }

    /// Approved comments on the pet, newest first.
    pub fn visible_comments(&self, pet_id: PetId) -> Result<Vec<Comment>, EngagementError> {
        self.require_pet(pet_id)?;
        Ok(self
            .repository
            .comments_for_pet(pet_id)?
            .into_iter()
            .filter(|comment| comment.is_approved)
            .collect())
    }

    /// Staff moderation: hide or re-publish a comment.
    pub fn set_comment_approval(
        &self,
        actor: &Actor,
        comment_id: CommentId,
        approved: bool,
    ) -> Result<Comment, EngagementError> {
        require_staff(actor, "only staff may moderate comments")?;
        let mut comment = self
            .repository
            .fetch_comment(comment_id)?
            .ok_or(EngagementError::NotFound(MissingEntity::Comment(comment_id)))?;

        comment.is_approved = approved;
        self.repository.update_comment(comment.clone())?;
        info!(staff = %actor.user, comment = %comment_id, approved, "comment moderated");
        Ok(comment)
    }
}
