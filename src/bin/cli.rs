use anyhow::Context;
use blogspace::cli::{create_user, parse_authorities};
use blogspace::seed::DEFAULT_AUTHORITY;
use blogspace_core::{BcryptPasswordHasher, PasswordHasher};
use blogspace_db::{PgUserDirectory, init_db_pool, run_migrations};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "blogspace-cli")]
#[command(about = "BlogSpace CLI - Administrative tools for BlogSpace", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user account that can log in
    CreateUser {
        /// Email address, used as the login name
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Comma separated authorities
        #[arg(short = 'a', long, default_value = DEFAULT_AUTHORITY)]
        authorities: String,
    },
    /// Print the bcrypt hash of a password
    HashPassword {
        /// Password (will be prompted securely if not provided)
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::CreateUser {
            email,
            name,
            password,
            authorities,
        } => handle_create_user(email, name, password, &authorities).await,
        Commands::HashPassword { password } => handle_hash_password(password),
    };

    if let Err(e) = result {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

fn prompt_password(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password"),
    }
}

async fn handle_create_user(
    email: Option<String>,
    name: Option<String>,
    password: Option<String>,
    authorities: &str,
) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };

    let name = match name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Display name")
            .interact_text()
            .context("Failed to read display name")?,
    };

    let password = prompt_password(password)?;

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool).await?;

    let directory = PgUserDirectory::new(pool);
    let id = create_user(
        &directory,
        &BcryptPasswordHasher::default(),
        &email,
        &name,
        &password,
        &parse_authorities(authorities),
    )
    .await?;

    println!("\n✅ User created successfully!");
    println!("   ID: {}", id);
    println!("   Email: {}", email);
    println!("   Name: {}", name);

    Ok(())
}

fn handle_hash_password(password: Option<String>) -> anyhow::Result<()> {
    let password = prompt_password(password)?;
    let hash = BcryptPasswordHasher::default().hash(&password)?;
    println!("{}", hash);
    Ok(())
}
