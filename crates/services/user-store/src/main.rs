//! User Store - command-line access to the account repository.

use clap::{Args, Parser, Subcommand};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domain::NewUser;
use user_store_lib::config::UserStoreConfig;
use user_store_lib::repository::MongoUserCollection;
use user_store_lib::service::UserManager;
use user_store_lib::{AccountLookup, AppError, AppResult, UserKey};

#[derive(Parser)]
#[command(name = "user-store")]
#[command(about = "User account repository")]
struct Cli {
    /// Connection URI (overrides USER_STORE_MONGODB_URI)
    #[arg(long, global = true)]
    uri: Option<String>,

    /// Logical database name (overrides USER_STORE_DATABASE)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Create {
        #[arg(long)]
        email: String,
        #[arg(long, env = "USER_STORE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Fetch an account (email lookups skip deleted accounts)
    Get(KeyArgs),
    /// Soft delete an account
    Delete(KeyArgs),
    /// Mark an account as verified
    Verify {
        #[arg(long)]
        email: String,
    },
    /// Replace an account's password
    SetPassword {
        #[arg(long, value_parser = parse_object_id)]
        id: ObjectId,
        #[arg(long, env = "USER_STORE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create the unique index on email
    EnsureIndex,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct KeyArgs {
    #[arg(long, value_parser = parse_object_id)]
    id: Option<ObjectId>,
    #[arg(long)]
    email: Option<String>,
}

impl KeyArgs {
    fn into_key(self) -> AppResult<UserKey> {
        match (self.id, self.email) {
            (Some(id), _) => Ok(UserKey::Id(id)),
            (None, Some(email)) => Ok(UserKey::Email(email)),
            (None, None) => Err(AppError::validation("either --id or --email is required.")),
        }
    }
}

fn parse_object_id(s: &str) -> Result<ObjectId, String> {
    ObjectId::parse_str(s).map_err(|e| e.to_string())
}

async fn run(users: &UserManager<MongoUserCollection>, command: Commands) -> AppResult<Value> {
    match command {
        Commands::Create { email, password } => {
            let id = users.create_user(NewUser::new(email, password)).await?;
            Ok(json!({ "id": id.to_hex() }))
        }
        Commands::Get(key) => {
            let user = match key.into_key()? {
                UserKey::Id(id) => users.fetch_user_by_id(id).await?,
                UserKey::Email(email) => users.fetch_user_by_email(&email).await?,
            };
            Ok(json!({
                "id": user.id.to_hex(),
                "email": user.email,
                "created": user.created.to_rfc3339(),
                "verified": user.verified,
                "deleted": user.deleted,
            }))
        }
        Commands::Delete(key) => {
            let modified = match key.into_key()? {
                UserKey::Id(id) => users.soft_delete_by_id(id).await?,
                UserKey::Email(email) => users.soft_delete_by_email(&email).await?,
            };
            Ok(json!({ "modified": modified }))
        }
        Commands::Verify { email } => {
            let modified = users.mark_verified(&email).await?;
            let account = users.find_account(&UserKey::Email(email)).await?;
            Ok(json!({ "modified": modified, "account": account.id.to_hex(), "verified": account.verified }))
        }
        Commands::SetPassword { id, password } => {
            let modified = users.update_password(id, &password).await?;
            Ok(json!({ "modified": modified }))
        }
        Commands::EnsureIndex => {
            users.ensure_email_index().await?;
            Ok(json!({ "index": "email", "unique": true }))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = UserStoreConfig::from_env();
    if let Some(uri) = cli.uri {
        config.database.uri = uri;
    }
    if let Some(database) = cli.database {
        config.database.database = database;
    }

    let cache = user_store_lib::mongo_cache(&config);
    let outcome = match user_store_lib::open_user_manager(&cache, &config).await {
        Ok(users) => {
            let outcome = run(&users, cli.command).await;
            users.close();
            outcome
        }
        Err(e) => Err(e),
    };
    cache.shutdown().await;

    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            error!(code = e.code(), "{}", e);
            eprintln!("{}: {}", e.code(), e.user_message());
            std::process::exit(1);
        }
    }
}
