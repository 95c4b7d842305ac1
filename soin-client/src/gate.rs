//! Access gate: decides, for a requested screen and the current identity,
//! whether the screen renders or the user is redirected elsewhere.
//!
//! The decision function is pure and total. It performs no I/O and holds no
//! state, so every (identity, screen) pair can be enumerated in tests.

use crate::identity::{AccessRole, ApprovalStatus, Identity, Role};

/// The screens a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Unauthenticated entry point (login / registration).
    Entry,
    PatientDashboard,
    DoctorDashboard,
    AdminDashboard,
}

impl Screen {
    /// The dashboard a role lands on after authenticating.
    pub fn dashboard_for(role: Role) -> Screen {
        match role {
            Role::Patient => Screen::PatientDashboard,
            Role::Doctor => Screen::DoctorDashboard,
            Role::Admin => Screen::AdminDashboard,
        }
    }
}

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render(Screen),
    Redirect(Screen),
}

/// Decide whether `requested` may render for the current identity.
///
/// Rules, in order:
/// 1. No identity: only [`Screen::Entry`] renders, everything else redirects
///    to it.
/// 2. An authenticated user requesting the entry screen is redirected to
///    their role dashboard.
/// 3. Role-restricted screens render only on an exact role match; the doctor
///    dashboard additionally requires an approved account. Everything else
///    redirects to the entry screen.
pub fn decide(identity: Option<&Identity>, requested: Screen) -> Decision {
    let Some(identity) = identity else {
        return match requested {
            Screen::Entry => Decision::Render(Screen::Entry),
            _ => Decision::Redirect(Screen::Entry),
        };
    };

    match requested {
        Screen::Entry => Decision::Redirect(Screen::dashboard_for(identity.role)),
        Screen::PatientDashboard => match identity.access_role() {
            AccessRole::Patient => Decision::Render(requested),
            AccessRole::Doctor(_) | AccessRole::Admin => Decision::Redirect(Screen::Entry),
        },
        Screen::DoctorDashboard => match identity.access_role() {
            AccessRole::Doctor(ApprovalStatus::Approved) => Decision::Render(requested),
            AccessRole::Doctor(_) | AccessRole::Patient | AccessRole::Admin => {
                Decision::Redirect(Screen::Entry)
            }
        },
        Screen::AdminDashboard => match identity.access_role() {
            AccessRole::Admin => Decision::Render(requested),
            AccessRole::Patient | AccessRole::Doctor(_) => Decision::Redirect(Screen::Entry),
        },
    }
}
