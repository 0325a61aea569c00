use crate::{
    model::error::{DatabaseError, DatabaseResult},
    web::{AuthenticatedUser, UserRole},
};

/// A resource that belongs to exactly one user.
pub trait HasOwner {
    fn owner_id(&self) -> &str;
}

/// Lets the owner (or an admin) through, everyone else gets `Forbidden`.
pub fn check_access<T: HasOwner>(actor: &AuthenticatedUser, resource: &T) -> DatabaseResult<()> {
    // admin can get all resources
    if actor.user_role() == UserRole::Admin {
        return Ok(());
    }

    if resource.owner_id() == actor.user_id() {
        Ok(())
    } else {
        Err(DatabaseError::Forbidden)
    }
}
