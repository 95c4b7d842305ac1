mod screens;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use soin_client::{
    ApiClient, Decision, DiabetesType, FileTokenStore, FilterCriteria, NewSubmission,
    RegisterProfile, Role, Screen, SessionStore, TypeFilter, decide,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "soin")]
#[command(about = "Terminal client for the SOIN healthcare data-intake service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        /// "patient" or "doctor" (doctor accounts need admin approval)
        #[arg(long, default_value = "patient")]
        role: String,
        #[arg(long)]
        age: Option<u32>,
    },
    /// End the current session
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Open the dashboard for the current role
    Dashboard {
        /// Filter submissions by patient name or email
        #[arg(long, default_value = "")]
        query: String,
        /// Filter by diabetes type: "Type 1", "Type 2" or "Prediabetes"
        #[arg(long)]
        diabetes_type: Option<String>,
    },
    /// Upload a tongue image with lab values (patients)
    Submit {
        /// Path to the tongue image
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        blood_glucose: f64,
        #[arg(long)]
        hba1c: f64,
        #[arg(long)]
        insulin_level: Option<f64>,
        /// "Type 1", "Type 2" or "Prediabetes"
        #[arg(long)]
        diabetes_type: String,
        /// Comma-separated symptom list
        #[arg(long, default_value = "")]
        symptoms: String,
        /// Comma-separated medication list
        #[arg(long, default_value = "")]
        medications: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Approve or reject a pending doctor account (admin)
    ApproveDoctor {
        doctor_id: String,
        /// Reject the account instead of approving it
        #[arg(long)]
        reject: bool,
    },
    /// Download the full data export (admin)
    Export {
        /// Output file; defaults to soin_export_<date>.zip
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "soin_cli=warn,soin_client=warn".into()),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let backend_url =
        std::env::var("SOIN_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let token_file =
        std::env::var("SOIN_TOKEN_FILE").unwrap_or_else(|_| ".soin-token".to_string());

    let api = ApiClient::new(&backend_url)?;
    let tokens = Arc::new(FileTokenStore::new(token_file));
    let mut session = SessionStore::new(Arc::new(api.clone()), tokens);

    // Restore must complete before the first gate decision.
    session.restore().await;

    match cli.command {
        Commands::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("Signed in as {} ({})", user.name, user.email);
            if let Decision::Redirect(screen) = decide(session.identity(), Screen::Entry) {
                println!("Run `soin dashboard` to open the {}.", screens::screen_name(screen));
            }
        }
        Commands::Register {
            email,
            password,
            name,
            role,
            age,
        } => {
            let role = parse_role(&role)?;
            let profile = RegisterProfile {
                email,
                password,
                name,
                role,
                age,
            };
            let user = session.register(&profile).await?;
            match user.role {
                Role::Doctor => println!(
                    "Registration successful. Your account is pending admin approval."
                ),
                _ => println!("Registration successful. Signed in as {}.", user.email),
            }
        }
        Commands::Logout => {
            session.logout().await;
            println!("Signed out.");
        }
        Commands::Whoami => match session.identity() {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                println!("role: {:?}", user.role);
                if let Some(status) = user.approval_status {
                    println!("approval: {status:?}");
                }
            }
            None => println!("Not signed in."),
        },
        Commands::Dashboard {
            query,
            diabetes_type,
        } => {
            let criteria = FilterCriteria {
                query,
                diabetes_type: parse_type_filter(diabetes_type.as_deref())?,
            };
            // The entry decision names a dashboard; the dashboard's own rule
            // still applies (a pending doctor bounces back to the entry
            // screen).
            match decide(session.identity(), Screen::Entry) {
                Decision::Redirect(screen) => match decide(session.identity(), screen) {
                    Decision::Render(screen) => {
                        screens::render(screen, &session, &api, &criteria).await?;
                    }
                    Decision::Redirect(_) => screens::entry_hint(),
                },
                Decision::Render(_) => screens::entry_hint(),
            }
        }
        Commands::Submit {
            image,
            blood_glucose,
            hba1c,
            insulin_level,
            diabetes_type,
            symptoms,
            medications,
            notes,
        } => {
            if decide(session.identity(), Screen::PatientDashboard)
                != Decision::Render(Screen::PatientDashboard)
            {
                screens::entry_hint();
                return Ok(());
            }
            let ctx = session
                .auth_context()
                .context("no active session")?;

            let image_bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("could not read image {}", image.display()))?;
            let image_file_name = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("image path has no file name")?;

            let new = NewSubmission {
                image_file_name,
                image_bytes,
                blood_glucose,
                hba1c,
                insulin_level,
                diabetes_type: parse_diabetes_type(&diabetes_type)?,
                symptoms: split_list(&symptoms),
                medications: split_list(&medications),
                notes,
            };

            let created = api.create_submission(&ctx, new).await?;
            println!("Submission saved ({}).", created.id);
        }
        Commands::ApproveDoctor { doctor_id, reject } => {
            if decide(session.identity(), Screen::AdminDashboard)
                != Decision::Render(Screen::AdminDashboard)
            {
                screens::entry_hint();
                return Ok(());
            }
            let ctx = session.auth_context().context("no active session")?;
            let approve = !reject;
            api.approve_doctor(&ctx, &doctor_id, approve).await?;
            println!("{}", if approve { "Doctor approved." } else { "Doctor rejected." });
        }
        Commands::Export { out } => {
            if decide(session.identity(), Screen::AdminDashboard)
                != Decision::Render(Screen::AdminDashboard)
            {
                screens::entry_hint();
                return Ok(());
            }
            let ctx = session.auth_context().context("no active session")?;
            let archive = api.export_data(&ctx).await?;
            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "soin_export_{}.zip",
                    chrono::Utc::now().format("%Y-%m-%d")
                ))
            });
            tokio::fs::write(&path, archive)
                .await
                .with_context(|| format!("could not write {}", path.display()))?;
            println!("Data exported to {}.", path.display());
        }
    }

    Ok(())
}

fn parse_role(raw: &str) -> anyhow::Result<Role> {
    match raw.to_ascii_lowercase().as_str() {
        "patient" => Ok(Role::Patient),
        "doctor" => Ok(Role::Doctor),
        other => bail!("unknown role {other:?}; expected \"patient\" or \"doctor\""),
    }
}

fn parse_diabetes_type(raw: &str) -> anyhow::Result<DiabetesType> {
    raw.parse::<DiabetesType>().map_err(anyhow::Error::msg)
}

fn parse_type_filter(raw: Option<&str>) -> anyhow::Result<TypeFilter> {
    match raw {
        None => Ok(TypeFilter::All),
        Some(raw) if raw.eq_ignore_ascii_case("all") => Ok(TypeFilter::All),
        Some(raw) => Ok(TypeFilter::Only(parse_diabetes_type(raw)?)),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
