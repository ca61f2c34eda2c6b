use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod app;
mod auth;
mod config;
mod error;
mod importer;
mod llm;
mod output;
mod recipe;
mod scale;
mod search;
mod store;
mod telemetry;
mod views;

mod add;
mod create;
mod init;
mod list;
mod login;
mod notes;
mod show;

use output::config::{force_format, OutputFormat};

#[derive(Parser)]
#[command(name = "recipes", about = "Save, search and scale your recipes")]
struct Cli {
    /// Postgres DSN for the remote store (falls back to DATABASE_URL; local-only when unset)
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Where the session and the local recipe copy live (falls back to RECIPES_DATA_DIR, then .recipes)
    #[arg(global = true, long)]
    data_dir: Option<PathBuf>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the remote schema
    Init(init::InitCmd),
    /// Sign in with an email address
    Login(login::LoginCmd),
    Logout,
    Whoami,
    /// Import a recipe from a web page
    Add(add::AddCmd),
    /// Enter a recipe by hand
    New(create::NewCmd),
    /// List recipes, optionally filtered
    Ls(list::LsCmd),
    /// Show one recipe, scaled
    Show(show::ShowCmd),
    /// Edit the personal notes of a recipe
    Notes(notes::NotesCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    if cli.json { force_format(OutputFormat::Json); }

    // logs go to stderr; RUST_LOG and RECIPES_LOG_FORMAT apply
    telemetry::config::init_tracing();

    let cfg = config::AppConfig::from_env().with_overrides(cli.dsn, cli.data_dir);
    let app = app::App::build(cfg).await?;

    match cli.command {
        Commands::Init(args) => init::run(&app, args).await?,
        Commands::Login(args) => login::login(&app, args).await?,
        Commands::Logout => login::logout(&app).await?,
        Commands::Whoami => login::whoami(&app).await?,
        Commands::Add(args) => add::run(&app, args).await?,
        Commands::New(args) => create::run(&app, args).await?,
        Commands::Ls(args) => list::run(&app, args).await?,
        Commands::Show(args) => show::run(&app, args).await?,
        Commands::Notes(args) => notes::run(&app, args).await?,
    }

    Ok(())
}
