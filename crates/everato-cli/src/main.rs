use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use everato_cli::{CreateOutcome, create_super_admin};
use everato_config::DatabaseConfig;
use everato_db::init_db_pool;

#[derive(Parser)]
#[command(name = "everato-cli")]
#[command(about = "Everato CLI - Administrative tools for Everato", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the super administrator account if it does not exist yet
    CreateSuperAdmin {
        /// Username
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match init_db_pool(&DatabaseConfig::from_env()).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::CreateSuperAdmin {
            username,
            email,
            password,
        } => {
            if let Err(e) = handle_create_super_admin(&pool, username, email, password).await {
                eprintln!("\n❌ Error creating super admin: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn handle_create_super_admin(
    pool: &sqlx::PgPool,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let username = match username {
        Some(username) => username,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    match create_super_admin(pool, &username, &email, &password).await? {
        CreateOutcome::Created(admin) => {
            println!("\n✅ Super admin created successfully!");
            println!("   ID: {}", admin.id);
            println!("   Username: {}", admin.username);
            println!("   Email: {}", admin.email);
        }
        CreateOutcome::AlreadyExists => {
            println!("\nℹ️  An account with that email or username already exists, nothing to do.");
        }
    }

    Ok(())
}
