//! gitbak CLI - back up git repositories to a GitLab instance.

mod commands;
mod config;
mod progress;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

/// Process exit codes. Zero is success; the negative values mirror the
/// distinct fatal conditions of the request pipeline.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    /// Project name not resolvable, or required settings missing.
    pub const CONFIGURATION: i32 = -1;
    /// Clone, push, or unrecoverable hosting-API failure.
    pub const TRANSFER: i32 = -2;
    /// Destination already populated and `--force` not given.
    pub const DESTINATION_CONFLICT: i32 = -3;
}

#[derive(Parser)]
#[command(name = "gitbak")]
#[command(version)]
#[command(about = "Back up git repositories to a GitLab instance")]
#[command(
    long_about = "gitbak mirrors git repositories into a GitLab instance. It infers the \
destination project and group names from the source URL, creates the \
destination if absent, and mirror-pushes the repository content."
)]
#[command(after_long_help = r#"EXAMPLES
    Back up one repository (destination inferred from the URL):
        $ gitbak sync git@github.com:0xKD/elixir.git

    Back up under an explicit project and group:
        $ gitbak sync https://host.xz/repo.git --project mirror --group archive

    Back up everything starred on GitHub, skipping fresh destinations:
        $ gitbak copy-github --limit 500

    Generate shell completions:
        $ gitbak completions bash > ~/.local/share/bash-completion/completions/gitbak

CONFIGURATION
    gitbak reads configuration from:
      1. ~/.config/gitbak/config.toml (or $XDG_CONFIG_HOME/gitbak/config.toml)
      2. ./gitbak.toml
      3. Environment variables (GITBAK_* prefix, e.g. GITBAK_GITLAB__TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GITLAB_URL              GitLab instance base URL (default: https://gitlab.com)
    GITLAB_USERNAME         GitLab account username
    GITLAB_PRIVATE_TOKEN    GitLab private access token
    GITHUB_TOKEN            GitHub personal access token (copy-github)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up one repository
    Sync {
        /// Git repository URL or path
        source: String,
        /// Destination project name; inferred from the source when omitted
        #[arg(long)]
        project: Option<String>,
        /// Group under which the destination project is categorised
        #[arg(long)]
        group: Option<String>,
        /// Overwrite existing project data on the target instance
        #[arg(short, long)]
        force: bool,
    },
    /// Back up the authenticated user's GitHub-starred repositories
    CopyGithub {
        /// Maximum number of starred repositories to enumerate
        #[arg(long, default_value_t = 1000)]
        limit: usize,
        /// Skip destinations active within this many days
        #[arg(long)]
        recency_days: Option<i64>,
        /// Overwrite existing project data on the target instance
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("gitbak=info,gitbak_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(Term::stderr().is_term())
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::load();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Sync {
            source,
            project,
            group,
            force,
        } => commands::sync::handle_sync(&config, source, project, group, force).await,
        Commands::CopyGithub {
            limit,
            recency_days,
            force,
        } => commands::copy_github::handle_copy_github(&config, limit, recency_days, force).await,
        Commands::Completions { shell } => {
            commands::meta::handle_completions(shell);
            exit_codes::SUCCESS
        }
    };

    if code != exit_codes::SUCCESS {
        std::process::exit(code);
    }
}
