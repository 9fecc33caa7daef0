use clap::{Parser, Subcommand};

use seashell_cli::commands::{config_ops, dict_ops};
use seashell_cli::trace_init::init_tracing;
use seashell_core::SearchMode;

#[derive(Parser)]
#[command(name = "seashell", about = "EDICT dictionary index and search tool")]
struct Cli {
    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    /// Custom settings TOML file
    #[arg(long, global = true)]
    settings: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build (or rebuild) the index next to a dictionary file
    Index {
        /// Dictionary file (UTF-8 or EUC-JP EDICT)
        dict_file: String,
    },
    /// Search a dictionary, building its index first if needed
    Search {
        /// Dictionary file
        dict_file: String,
        /// Query text
        query: String,
        /// Word position filter: any, exact, start, end or middle
        #[arg(long, default_value = "any")]
        mode: SearchMode,
        /// Maximum number of entries to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print one JSON object per entry
        #[arg(long)]
        json: bool,
    },
    /// Show dictionary encoding, size and index state
    Info {
        /// Dictionary file
        dict_file: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    if let Some(file) = &cli.settings {
        config_ops::load_settings(file);
    }

    match cli.command {
        Command::Index { dict_file } => dict_ops::index(&dict_file),
        Command::Search {
            dict_file,
            query,
            mode,
            limit,
            json,
        } => {
            let opts = dict_ops::SearchOptions { mode, limit, json };
            dict_ops::search(&dict_file, &query, &opts);
        }
        Command::Info { dict_file } => dict_ops::info(&dict_file),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
