//! Read-only commands over the profile store.

use clap::Subcommand;
use liscrape_store::ProfileStore;

/// Sub-commands available under `profiles`.
#[derive(Debug, Subcommand)]
pub enum ProfilesCommands {
    /// List every stored profile
    List,
    /// Print one stored profile document
    Show {
        /// Profile id (the `/in/<id>` segment of the profile URL)
        id: String,
    },
    /// Find profiles whose name or headline contains the query
    Search {
        query: String,
    },
}

pub(crate) async fn run_list(store: &impl ProfileStore) -> anyhow::Result<()> {
    let profiles = store.list_profiles().await?;
    crate::print_json(&profiles)
}

/// Prints the stored document for `id`.
///
/// # Errors
///
/// Returns an error if no profile is stored under `id` or the file is
/// unreadable.
pub(crate) async fn run_show(store: &impl ProfileStore, id: &str) -> anyhow::Result<()> {
    let document = store
        .get_profile(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("profile '{id}' not found; run `scrape` first"))?;
    crate::print_json(&document)
}

pub(crate) async fn run_search(store: &impl ProfileStore, query: &str) -> anyhow::Result<()> {
    let profiles = store.search_profiles(query).await?;
    if profiles.is_empty() {
        tracing::info!(query, "no stored profile matches");
    }
    crate::print_json(&profiles)
}
