//! Dashboard rendering. Each screen is a pure consumer of the library: the
//! gate has already decided what renders, the list model decides what is
//! shown and in which order.

use soin_client::{
    ApiClient, FilterCriteria, Screen, SessionStore, Submission, doctor_view, filter,
};

pub fn screen_name(screen: Screen) -> &'static str {
    match screen {
        Screen::Entry => "entry screen",
        Screen::PatientDashboard => "patient dashboard",
        Screen::DoctorDashboard => "doctor dashboard",
        Screen::AdminDashboard => "admin dashboard",
    }
}

pub fn entry_hint() {
    println!("Not signed in. Use `soin login` or `soin register` first.");
}

pub async fn render(
    screen: Screen,
    session: &SessionStore,
    api: &ApiClient,
    criteria: &FilterCriteria,
) -> anyhow::Result<()> {
    match screen {
        Screen::Entry => entry_hint(),
        Screen::PatientDashboard => patient_dashboard(session, api).await,
        Screen::DoctorDashboard => doctor_dashboard(session, api, criteria).await,
        Screen::AdminDashboard => admin_dashboard(session, api, criteria).await,
    }
    Ok(())
}

async fn patient_dashboard(session: &SessionStore, api: &ApiClient) {
    let (Some(user), Some(ctx)) = (session.identity(), session.auth_context()) else {
        entry_hint();
        return;
    };

    println!("== Patient Dashboard: {} ==", user.name);

    // A read failure is transient: report it and fall back to an empty view.
    let submissions = match api.submissions(&ctx).await {
        Ok(submissions) => submissions,
        Err(e) => {
            eprintln!("Failed to fetch history: {e}");
            return;
        }
    };

    if submissions.is_empty() {
        println!("No submissions yet. Use `soin submit` to upload one.");
        return;
    }

    println!("Submission history ({}):", submissions.len());
    for submission in &submissions {
        print_submission(submission, api, "  ");
    }
}

async fn doctor_dashboard(session: &SessionStore, api: &ApiClient, criteria: &FilterCriteria) {
    let (Some(user), Some(ctx)) = (session.identity(), session.auth_context()) else {
        entry_hint();
        return;
    };

    println!("== Doctor Dashboard: Dr. {} ==", user.name);

    let submissions = match api.submissions(&ctx).await {
        Ok(submissions) => submissions,
        Err(e) => {
            eprintln!("Failed to fetch submissions: {e}");
            return;
        }
    };

    let groups = doctor_view(&submissions, criteria);
    if groups.is_empty() {
        println!("No patient submissions found.");
        return;
    }

    for group in &groups {
        let age = group
            .patient_age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} <{}>  age {}  ({} submissions)",
            group.patient_name,
            group.patient_email,
            age,
            group.submissions.len()
        );
        for submission in &group.submissions {
            print_submission(submission, api, "  ");
        }
    }
}

async fn admin_dashboard(session: &SessionStore, api: &ApiClient, criteria: &FilterCriteria) {
    let (Some(user), Some(ctx)) = (session.identity(), session.auth_context()) else {
        entry_hint();
        return;
    };

    println!("== Admin Dashboard: {} ==", user.name);

    match api.admin_stats(&ctx).await {
        Ok(stats) => {
            println!(
                "patients: {}   doctors: {}   pending doctors: {}   submissions: {}",
                stats.total_patients,
                stats.total_doctors,
                stats.pending_doctors,
                stats.total_submissions
            );
        }
        Err(e) => eprintln!("Failed to fetch stats: {e}"),
    }

    match api.pending_doctors(&ctx).await {
        Ok(pending) if pending.is_empty() => println!("No pending doctor approvals."),
        Ok(pending) => {
            println!("Pending doctors:");
            for doctor in &pending {
                println!("  {}  {} <{}>", doctor.id, doctor.name, doctor.email);
            }
            println!("Use `soin approve-doctor <id>` (or `--reject`).");
        }
        Err(e) => eprintln!("Failed to fetch pending doctors: {e}"),
    }

    let submissions = match api.submissions(&ctx).await {
        Ok(submissions) => submissions,
        Err(e) => {
            eprintln!("Failed to fetch submissions: {e}");
            return;
        }
    };

    // The admin view is a flat filtered list, not grouped.
    let visible = filter(&submissions, criteria);
    println!("Submissions ({} of {}):", visible.len(), submissions.len());
    for submission in &visible {
        println!("  {} <{}>", submission.patient_name, submission.patient_email);
        print_submission(submission, api, "    ");
    }
}

fn print_submission(submission: &Submission, api: &ApiClient, indent: &str) {
    println!(
        "{indent}{}  {}  glucose {} mg/dL  HbA1c {}%",
        submission.created_at.format("%Y-%m-%d %H:%M"),
        submission.diabetes_type,
        submission.blood_glucose,
        submission.hba1c
    );
    if let Some(insulin) = submission.insulin_level {
        println!("{indent}insulin: {insulin}");
    }
    if !submission.symptoms.is_empty() {
        println!("{indent}symptoms: {}", submission.symptoms.join(", "));
    }
    if !submission.medications.is_empty() {
        println!("{indent}medications: {}", submission.medications.join(", "));
    }
    if let Some(notes) = &submission.notes {
        if !notes.is_empty() {
            println!("{indent}notes: {notes}");
        }
    }
    println!(
        "{indent}image: {}",
        api.resolve_image_url(&submission.tongue_image_url)
    );
}
