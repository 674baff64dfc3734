//! Profile resolution hook.
//!
//! QuizArena does not own user profiles — the platform's user service
//! does. The coordinator only needs a name and level to show opponents
//! and room members, so it resolves them once per registration through
//! this trait and caches the result in the [`ConnectionRegistry`].
//!
//! [`ConnectionRegistry`]: crate::ConnectionRegistry

use quizarena_protocol::{PlayerProfile, UserId};

use crate::SessionError;

/// Resolves a user's display profile at registration time.
///
/// `Send + Sync + 'static` because the provider lives as long as the
/// server and is called from the coordinator task.
///
/// # Example
///
/// ```rust
/// use quizarena_protocol::{PlayerProfile, UserId};
/// use quizarena_session::{ProfileProvider, SessionError};
///
/// /// Fabricates a profile from the ID. Development only.
/// struct DevProfiles;
///
/// impl ProfileProvider for DevProfiles {
///     async fn resolve(
///         &self,
///         user_id: UserId,
///     ) -> Result<PlayerProfile, SessionError> {
///         Ok(PlayerProfile {
///             user_id,
///             name: format!("player-{}", user_id.0),
///             level: 1,
///         })
///     }
/// }
/// ```
pub trait ProfileProvider: Send + Sync + 'static {
    /// Resolves the profile for `user_id`.
    ///
    /// # Errors
    /// Returns [`SessionError::ProfileUnavailable`] if the user is
    /// unknown or the profile service cannot be reached; registration
    /// fails and the registry is left untouched.
    fn resolve(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<PlayerProfile, SessionError>> + Send;
}

// =========================================================================
// Tests
// =========================================================================
