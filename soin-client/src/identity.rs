use serde::{Deserialize, Serialize};

/// Account role as the auth service reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

/// Doctor account approval state. Patients and admins are reported as
/// `Approved` by the backend; only doctors ever start out `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// The authenticated user, as returned by login, registration and
/// `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

/// Closed view of a role used for access decisions. Folding the approval
/// state into the doctor variant keeps every gate rule an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRole {
    Patient,
    Doctor(ApprovalStatus),
    Admin,
}

impl Identity {
    /// Project this identity onto its access role. A doctor with no reported
    /// approval status is treated as pending.
    pub fn access_role(&self) -> AccessRole {
        match self.role {
            Role::Patient => AccessRole::Patient,
            Role::Doctor => {
                AccessRole::Doctor(self.approval_status.unwrap_or(ApprovalStatus::Pending))
            }
            Role::Admin => AccessRole::Admin,
        }
    }

    pub fn is_approved_doctor(&self) -> bool {
        matches!(
            self.access_role(),
            AccessRole::Doctor(ApprovalStatus::Approved)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role, approval: Option<ApprovalStatus>) -> Identity {
        Identity {
            id: "u1".to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            role,
            approval_status: approval,
            age: None,
        }
    }

    #[test]
    fn doctor_without_reported_status_is_pending() {
        let doctor = identity(Role::Doctor, None);
        assert_eq!(
            doctor.access_role(),
            AccessRole::Doctor(ApprovalStatus::Pending)
        );
        assert!(!doctor.is_approved_doctor());
    }

    #[test]
    fn approved_doctor_projects_approval() {
        let doctor = identity(Role::Doctor, Some(ApprovalStatus::Approved));
        assert!(doctor.is_approved_doctor());
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Patient).unwrap(), "\"patient\"");
        assert_eq!(
            serde_json::to_string(&ApprovalStatus::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[test]
    fn identity_deserializes_without_optional_fields() {
        let raw = r#"{"id":"a","name":"Ann","email":"ann@x.io","role":"admin"}"#;
        let parsed: Identity = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.role, Role::Admin);
        assert_eq!(parsed.approval_status, None);
        assert_eq!(parsed.age, None);
    }
}
