//! mrvc CLI — the command-line interface to MRVC.

use std::process;

use clap::{Parser, Subcommand};
use mrvc_core::Repository;

#[derive(Parser)]
#[command(name = "mrvc", about = "mrvc — multi-repository version control", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new MRVC repository in the current directory.
    Init {
        /// Repository name.
        #[arg(long)]
        name: String,

        /// Repository author.
        #[arg(long)]
        author: String,
    },

    /// Snapshot files into a new commit.
    Commit {
        /// Commit message.
        #[arg(long, short)]
        message: String,

        /// Files to commit (comma-separated), or "*" for the whole tree.
        #[arg(long, value_delimiter = ',', required = true)]
        files: Vec<String>,

        /// Commit author.
        #[arg(long, default_value = "unknown")]
        author: String,
    },

    /// Show working-tree and super-commit status.
    Status,

    /// Link a child repository beneath this one.
    Link {
        /// Path to the child repository.
        #[arg(long)]
        path: String,
    },

    /// Record a coordinated snapshot of this repo and all linked children.
    SuperCommit {
        /// Super-commit message.
        #[arg(long, short)]
        message: String,

        /// Super-commit author.
        #[arg(long, default_value = "unknown")]
        author: String,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().unwrap_or_else(|e| {
        eprintln!("error: cannot determine current directory: {e}");
        process::exit(1);
    });

    let result = match cli.command {
        Commands::Init { name, author } => {
            Repository::init(&cwd, &name, &author).map(|repo| {
                println!(
                    "Initialized empty MRVC repository in {}",
                    repo.root().join(".mrvc").display()
                );
            })
        }
        Commands::Commit {
            message,
            files,
            author,
        } => Repository::open(&cwd)
            .and_then(|repo| repo.commit(&message, &author, &files))
            .map(|hash| println!("Commit created: {hash}")),
        Commands::Status => Repository::open(&cwd)
            .and_then(|repo| repo.status())
            .map(|report| println!("{}", report.render())),
        Commands::Link { path } => Repository::open(&cwd)
            .and_then(|repo| repo.link(&path))
            .map(|()| println!("Linked child repository: {path}")),
        Commands::SuperCommit { message, author } => Repository::open(&cwd)
            .and_then(|repo| repo.super_commit(&message, &author))
            .map(|hash| println!("Super commit created: {hash}")),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
