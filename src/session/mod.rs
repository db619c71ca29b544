//! Client-held session state.
//!
//! A [`SessionContext`] is an owned value handed to whatever renders the UI;
//! there is no process-wide session. It only changes state after the server
//! accepted a signup or signin, and `logout` always returns it to anonymous.
//!
//! Known limitation: the server issues no session token and never validates
//! the session afterwards, so this context is the only record that a user is
//! signed in. Guards built on it are UX only.

use crate::{
    client::{ApiClient, ClientError},
    store::{PublicUser, Role},
};
use secrecy::SecretString;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(PublicUser),
}

/// Which dashboard a session is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView {
    Teacher,
    Student,
    /// Anonymous, or an account without a role. Never defaults to a role.
    Neutral,
}

impl DashboardView {
    #[must_use]
    pub fn for_session(session: &Session) -> Self {
        match session {
            Session::Authenticated(user) => Self::for_role(user.role),
            Session::Anonymous => Self::Neutral,
        }
    }

    #[must_use]
    pub const fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Teacher) => Self::Teacher,
            Some(Role::Student) => Self::Student,
            None => Self::Neutral,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionContext {
    session: Session,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn user(&self) -> Option<&PublicUser> {
        match &self.session {
            Session::Authenticated(user) => Some(user),
            Session::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self.session, Session::Authenticated(_))
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user().and_then(|user| user.role)
    }

    #[must_use]
    pub fn dashboard(&self) -> DashboardView {
        DashboardView::for_session(&self.session)
    }

    /// Hold `user` as the signed-in account, replacing any previous one.
    pub fn login(&mut self, user: PublicUser) {
        debug!(user_id = %user.id, "session login");
        self.session = Session::Authenticated(user);
    }

    pub fn logout(&mut self) {
        debug!("session logout");
        self.session = Session::Anonymous;
    }

    /// Sign in through `client` and log in on success.
    ///
    /// # Errors
    /// Returns the client error unchanged; the session is left as it was.
    #[instrument(skip(self, client, password))]
    pub async fn sign_in(
        &mut self,
        client: &ApiClient,
        username: &str,
        password: &SecretString,
    ) -> Result<PublicUser, ClientError> {
        let user = client.signin(username, password).await?;
        self.login(user.clone());
        Ok(user)
    }

    /// Create an account through `client` and log in on success.
    ///
    /// # Errors
    /// Returns the client error unchanged; the session is left as it was.
    #[instrument(skip(self, client, password))]
    pub async fn sign_up(
        &mut self,
        client: &ApiClient,
        username: &str,
        password: &SecretString,
        role: Role,
    ) -> Result<PublicUser, ClientError> {
        let user = client.signup(username, password, role).await?;
        self.login(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Option<Role>) -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            role,
        }
    }

    #[test]
    fn starts_anonymous() {
        let context = SessionContext::new();
        assert_eq!(context.session(), &Session::Anonymous);
        assert!(!context.is_authenticated());
        assert!(context.user().is_none());
        assert_eq!(context.dashboard(), DashboardView::Neutral);
    }

    #[test]
    fn login_then_logout() {
        let mut context = SessionContext::new();
        let teacher = user(Some(Role::Teacher));
        context.login(teacher.clone());
        assert!(context.is_authenticated());
        assert_eq!(context.user(), Some(&teacher));
        assert_eq!(context.role(), Some(Role::Teacher));
        assert_eq!(context.dashboard(), DashboardView::Teacher);

        context.logout();
        assert_eq!(context.session(), &Session::Anonymous);
        assert_eq!(context.dashboard(), DashboardView::Neutral);

        // logout is unconditional
        context.logout();
        assert!(!context.is_authenticated());
    }

    #[test]
    fn login_replaces_previous_user() {
        let mut context = SessionContext::new();
        context.login(user(Some(Role::Teacher)));
        let student = user(Some(Role::Student));
        context.login(student.clone());
        assert_eq!(context.user(), Some(&student));
        assert_eq!(context.dashboard(), DashboardView::Student);
    }

    #[test]
    fn missing_role_is_neutral() {
        let mut context = SessionContext::new();
        context.login(user(None));
        assert!(context.is_authenticated());
        assert_eq!(context.role(), None);
        assert_eq!(context.dashboard(), DashboardView::Neutral);
    }

    #[test]
    fn dispatch_by_role() {
        assert_eq!(
            DashboardView::for_role(Some(Role::Teacher)),
            DashboardView::Teacher
        );
        assert_eq!(
            DashboardView::for_role(Some(Role::Student)),
            DashboardView::Student
        );
        assert_eq!(DashboardView::for_role(None), DashboardView::Neutral);
    }
}
