mod profiles;
mod scrape;

use clap::{Parser, Subcommand};
use liscrape_store::FileStore;
use tracing_subscriber::EnvFilter;

use crate::profiles::ProfilesCommands;

#[derive(Debug, Parser)]
#[command(name = "liscrape-cli")]
#[command(about = "Scrape LinkedIn profiles and inspect the stored documents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one profile and merge it into the data directory
    Scrape {
        /// Profile URL (e.g. https://www.linkedin.com/in/jane-doe/)
        #[arg(long)]
        url: String,
        /// Value of the `li_at` session cookie
        #[arg(long, env = "LISCRAPE_SESSION_COOKIE", hide_env_values = true)]
        cookie: String,
        /// Also scrape recent posts
        #[arg(long)]
        posts: bool,
        /// Also scrape the profile owner's comments
        #[arg(long)]
        comments: bool,
        /// Also scrape recent reactions
        #[arg(long)]
        reactions: bool,
    },
    /// Read stored profiles
    Profiles {
        #[command(subcommand)]
        command: ProfilesCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("liscrape-cli: run with --help to list commands");
        return Ok(());
    };

    let config = liscrape_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let store = FileStore::new(config.data_dir.clone());

    match command {
        Commands::Scrape {
            url,
            cookie,
            posts,
            comments,
            reactions,
        } => {
            let flags = liscrape_core::ActivityFlags {
                posts,
                comments,
                reactions,
            };
            scrape::run_scrape(&store, &config, &url, &cookie, flags).await?;
        }
        Commands::Profiles { command } => match command {
            ProfilesCommands::List => profiles::run_list(&store).await?,
            ProfilesCommands::Show { id } => profiles::run_show(&store, &id).await?,
            ProfilesCommands::Search { query } => profiles::run_search(&store, &query).await?,
        },
    }

    Ok(())
}

/// Writes `value` to stdout as indented JSON.
fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
