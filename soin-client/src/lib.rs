pub mod client;
pub mod error;
pub mod gate;
pub mod identity;
pub mod listing;
pub mod session;
pub mod storage;
pub mod submission;

// Re-export commonly used types
pub use client::{ApiClient, AuthResponse, RegisterProfile};
pub use error::{Result, SoinError};
pub use gate::{Decision, Screen, decide};
pub use identity::{AccessRole, ApprovalStatus, Identity, Role};
pub use listing::{FilterCriteria, PatientGroup, TypeFilter, doctor_view, filter, group_by_patient};
pub use session::{AuthBackend, AuthContext, SessionStore};
pub use storage::{FileTokenStore, InMemoryTokenStore, TokenStore};
pub use submission::{AdminStats, DiabetesType, NewSubmission, Submission};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct SingleUserBackend {
        user: Identity,
    }

    #[async_trait]
    impl AuthBackend for SingleUserBackend {
        async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse> {
            if email != self.user.email {
                return Err(SoinError::AuthFailed("Invalid credentials".to_string()));
            }
            Ok(AuthResponse {
                access_token: "tok".to_string(),
                user: self.user.clone(),
            })
        }

        async fn register(&self, profile: &RegisterProfile) -> Result<AuthResponse> {
            let approval = match profile.role {
                Role::Doctor => ApprovalStatus::Pending,
                _ => ApprovalStatus::Approved,
            };
            Ok(AuthResponse {
                access_token: "tok".to_string(),
                user: Identity {
                    id: "new".to_string(),
                    name: profile.name.clone(),
                    email: profile.email.clone(),
                    role: profile.role,
                    approval_status: Some(approval),
                    age: profile.age,
                },
            })
        }

        async fn me(&self, ctx: &AuthContext) -> Result<Identity> {
            if ctx.bearer() != "tok" {
                return Err(SoinError::AuthFailed("Token expired".to_string()));
            }
            Ok(self.user.clone())
        }
    }

    fn patient() -> Identity {
        Identity {
            id: "p1".to_string(),
            name: "Ann Lee".to_string(),
            email: "ann@example.com".to_string(),
            role: Role::Patient,
            approval_status: Some(ApprovalStatus::Approved),
            age: Some(34),
        }
    }

    #[tokio::test]
    async fn patient_login_lands_on_patient_dashboard() {
        let backend = Arc::new(SingleUserBackend { user: patient() });
        let tokens = Arc::new(InMemoryTokenStore::new());
        let mut session = SessionStore::new(backend, tokens);

        session.login("ann@example.com", "pw").await.unwrap();

        assert_eq!(
            decide(session.identity(), Screen::Entry),
            Decision::Redirect(Screen::PatientDashboard)
        );
    }

    #[tokio::test]
    async fn registered_doctor_is_kept_off_the_doctor_dashboard() {
        let backend = Arc::new(SingleUserBackend { user: patient() });
        let tokens = Arc::new(InMemoryTokenStore::new());
        let mut session = SessionStore::new(backend, tokens);

        let profile = RegisterProfile {
            email: "doc@example.com".to_string(),
            password: "pw".to_string(),
            name: "New Doctor".to_string(),
            role: Role::Doctor,
            age: Some(45),
        };
        let user = session.register(&profile).await.unwrap();
        assert_eq!(user.approval_status, Some(ApprovalStatus::Pending));

        assert_eq!(
            decide(session.identity(), Screen::DoctorDashboard),
            Decision::Redirect(Screen::Entry)
        );
    }

    #[tokio::test]
    async fn stale_token_restore_falls_back_to_entry() {
        let backend = Arc::new(SingleUserBackend { user: patient() });
        let tokens = Arc::new(InMemoryTokenStore::new());
        tokens.save("stale").await.unwrap();
        let mut session = SessionStore::new(backend, tokens.clone());

        // Restore completes before the first gate decision.
        assert!(!session.restore().await);
        assert_eq!(tokens.load().await.unwrap(), None);

        assert_eq!(
            decide(session.identity(), Screen::PatientDashboard),
            Decision::Redirect(Screen::Entry)
        );
    }
}
