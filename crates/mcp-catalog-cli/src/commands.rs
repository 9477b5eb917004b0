use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub(crate) struct SyncArgs {
    /// Repository to harvest, as a URL or owner/repo.
    #[arg(long)]
    pub(crate) source_repo: String,
    #[arg(long, default_value = ".")]
    pub(crate) catalog_root: PathBuf,
    #[arg(long, default_value = "servers")]
    pub(crate) servers_dir: PathBuf,
    #[arg(long, default_value = "index.json")]
    pub(crate) index_file: PathBuf,
    #[arg(long, default_value_t = 4)]
    pub(crate) max_parallel: usize,
    /// Harvester executable; defaults to $MCP_CATALOG_HARVESTER, then mcp-ingest.
    #[arg(long)]
    pub(crate) harvester: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum ValidateCommand {
    /// Check that every indexed manifest exists, parses and is active.
    Index {
        #[arg(long, default_value = ".")]
        catalog_root: PathBuf,
        #[arg(long, default_value = "index.json")]
        index_file: PathBuf,
    },
    /// Check required index keys and manifest fields.
    Structure {
        #[arg(long, default_value = ".")]
        catalog_root: PathBuf,
        #[arg(long, default_value = "index.json")]
        index_file: PathBuf,
        #[arg(long, default_value = "servers")]
        servers_dir: PathBuf,
    },
    /// Validate every catalog manifest against the JSON schema.
    Schema {
        #[arg(long, default_value = ".")]
        catalog_root: PathBuf,
        #[arg(long, default_value = "servers")]
        servers_dir: PathBuf,
        /// Relative paths resolve against the catalog root.
        #[arg(long, default_value = "schema/mcp_server.schema.json")]
        schema: PathBuf,
    },
}
