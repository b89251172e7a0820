use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};

use backend::{
    FirebaseAuth, IdentityProvider, InMemoryIdentityProvider, InMemoryRecordStore, RecordStore,
    RtdbStore,
};
use mathe_core::{
    ChildRef, GameProgress, MathLevelEntry, ParentRecord, PlayerProfile, RewardProfile,
    StudentRecord, UserDoc, UserId, UserRecord,
};
use services::{AuthService, ProfileService, SessionCoordinator};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    PartialFirebaseConfig,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::PartialFirebaseConfig => {
                write!(f, "--api-key and --db-url must be provided together")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-key <key>] [--db-url <url>]");
    eprintln!();
    eprintln!("Without a configured backend the app runs against seeded demo data");
    eprintln!("(account: parent@example.com / demo).");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MATHE_API_KEY, MATHE_DB_URL");
}

enum BackendConfig {
    Firebase { api_key: String, db_url: String },
    Demo,
}

impl BackendConfig {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut api_key = std::env::var("MATHE_API_KEY").ok();
        let mut db_url = std::env::var("MATHE_DB_URL").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-key" => api_key = Some(require_value(args, "--api-key")?),
                "--db-url" => db_url = Some(require_value(args, "--db-url")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        match (api_key, db_url) {
            (Some(api_key), Some(db_url)) => Ok(Self::Firebase { api_key, db_url }),
            (None, None) => Ok(Self::Demo),
            _ => Err(ArgsError::PartialFirebaseConfig),
        }
    }
}

struct DesktopApp {
    session: services::SessionHandle,
    auth: Arc<AuthService>,
}

impl UiApp for DesktopApp {
    fn session(&self) -> services::SessionHandle {
        self.session.clone()
    }

    fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config = BackendConfig::parse(&mut args).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let (provider, store): (Arc<dyn IdentityProvider>, Arc<dyn RecordStore>) = match config {
        BackendConfig::Firebase { api_key, db_url } => (
            Arc::new(FirebaseAuth::new(api_key)),
            Arc::new(RtdbStore::new(db_url)),
        ),
        BackendConfig::Demo => {
            eprintln!("no backend configured, running with seeded demo data");
            let provider =
                InMemoryIdentityProvider::new().with_user("parent@example.com", "demo", "p1");
            let store = InMemoryRecordStore::new();
            seed_demo_data(&store)?;
            (Arc::new(provider), Arc::new(store))
        }
    };

    let profiles = ProfileService::new(Arc::clone(&store));
    let (session, _guard) = SessionCoordinator::spawn(Arc::clone(&provider), profiles);
    let auth = Arc::new(AuthService::new(provider));

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { session, auth });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("MathéMagique")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

// Demo fixture: one parent with a played child (by id), an embedded summary,
// and a dangling reference that the loader silently drops.
fn seed_demo_data(store: &InMemoryRecordStore) -> Result<(), Box<dyn std::error::Error>> {
    let parent = UserRecord::Parent(ParentRecord {
        doc: UserDoc {
            id: UserId::new("p1"),
            first_name: "Marie".to_string(),
            last_name: "Durand".to_string(),
            gender: "female".to_string(),
            email: "parent@example.com".to_string(),
            date_of_birth: "1985-03-12".to_string(),
        },
        children: vec![
            ChildRef::Id(UserId::new("c1")),
            ChildRef::Embedded(Box::new(demo_student(
                "c2",
                "Tom",
                "male",
                "CP",
                None,
            ))),
            ChildRef::Id(UserId::new("c3")),
        ],
    });
    store.insert_user(&parent)?;

    let lea = demo_student(
        "c1",
        "Léa",
        "female",
        "CE2",
        Some(PlayerProfile {
            player_name: "lea42".to_string(),
            game_level: 3,
            math_level: 7,
            coins: 120,
            questions_solved: 54,
            reward_profile: RewardProfile {
                score: 60,
                rank: 2,
                i_score: 15,
                reward_count: 4,
                positives: 50,
                negatives: 10,
            },
        }),
    );
    store.insert_user(&UserRecord::Student(Box::new(lea)))?;

    Ok(())
}

fn demo_student(
    id: &str,
    first_name: &str,
    gender: &str,
    grade: &str,
    player_profile: Option<PlayerProfile>,
) -> StudentRecord {
    let played = player_profile.is_some();
    StudentRecord {
        doc: UserDoc {
            id: UserId::new(id),
            first_name: first_name.to_string(),
            last_name: "Durand".to_string(),
            gender: gender.to_string(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            date_of_birth: "2015-06-20".to_string(),
        },
        grade: grade.to_string(),
        parent_id: UserId::new("p1"),
        teacher_id: UserId::new("t1"),
        player_profile,
        achievements: Vec::new(),
        game_progress: if played {
            vec![
                GameProgress {
                    game_id: "vertical_operations".into(),
                    last_score: 40.0,
                    best_score: 85.0,
                    completed_at: demo_date(2024, 2, 3),
                },
                GameProgress {
                    game_id: "choose_answer".into(),
                    last_score: 10.0,
                    best_score: 30.0,
                    completed_at: demo_date(2024, 2, 5),
                },
            ]
        } else {
            Vec::new()
        },
        history_math_level: played.then(|| {
            vec![
                MathLevelEntry {
                    date: demo_date(2024, 1, 1),
                    level: 5,
                },
                MathLevelEntry {
                    date: demo_date(2024, 2, 1),
                    level: 7,
                },
            ]
        }),
    }
}

fn demo_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[tokio::main]
async fn main() {
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
