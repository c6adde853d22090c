//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--config <file>`: Use this global configuration file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::resources::ResourceKind;

/// gitform - declarative management of local Git repositories
#[derive(Parser, Debug)]
#[command(name = "gitform")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if gitform was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Global configuration file, instead of the usual search path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show what apply would do
    #[command(
        name = "plan",
        long_about = "Compare the manifest with recorded state and the live repositories.\n\n\
            Plan never changes a repository. Each resource is reported as no changes, \
            create, update or replace, with the reason a replace is needed. Resources \
            recorded in state but no longer declared are listed as orphans.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Preview every resource
    gitform plan

    # Only the resources you are working on
    gitform plan --target app --target app-tag

    # Keep the digest to apply exactly this plan later
    gitform plan --json | jq -r .digest"
    )]
    Plan {
        /// Limit planning to these resource ids
        #[arg(long = "target", value_name = "ID")]
        targets: Vec<String>,
    },

    /// Reconcile repositories with the manifest
    #[command(
        name = "apply",
        long_about = "Plan, then execute every pending action in manifest order.\n\n\
            State is saved after each resource, so a failure leaves earlier resources \
            recorded. Orphaned entries are dropped from state; their repositories are \
            left untouched.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Apply everything
    gitform apply

    # Refuse to run if the plan changed since it was reviewed
    gitform apply --expect 3f2a..."
    )]
    Apply {
        /// Limit applying to these resource ids
        #[arg(long = "target", value_name = "ID")]
        targets: Vec<String>,

        /// Abort unless the fresh plan has this digest
        #[arg(long, value_name = "DIGEST")]
        expect: Option<String>,
    },

    /// Adopt an existing repository object into state
    #[command(
        name = "import",
        after_help = "\
IMPORT IDENTIFIERS:
    repository, clone, add, push    <directory>
    commit                          <directory>[|<revision>]
    remote                          <directory>|<name>
    tag                             <directory>|<name>[|<revision>]"
    )]
    Import {
        /// Resource type
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Import identifier
        import_id: String,

        /// Manifest id to record the state under
        resource_id: String,
    },

    /// Drop a resource from state without touching the repository
    Forget {
        /// Resource id
        resource_id: String,
    },

    /// Read facts about a repository
    Read {
        #[command(subcommand)]
        fact: ReadFact,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    gitform completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    gitform completion zsh >> ~/.zshrc"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    s.parse().map_err(|e: crate::resources::ResourceError| e.to_string())
}

/// Repository directory shared by all facts.
#[derive(Args, Debug, Clone)]
pub struct RepoArg {
    /// Repository directory
    #[arg(default_value = ".")]
    pub directory: PathBuf,
}

/// Facts that `read` can report.
#[derive(Subcommand, Debug)]
pub enum ReadFact {
    /// Commit hashes selected by a log query
    Log {
        #[command(flatten)]
        repo: RepoArg,

        /// Revision to start from
        #[arg(long, conflicts_with = "all")]
        from: Option<String>,

        /// Start from every reference
        #[arg(long)]
        all: bool,

        /// Walk order: time, depth or breadth
        #[arg(long)]
        order: Option<String>,

        /// Only commits at or after this RFC 3339 time
        #[arg(long)]
        since: Option<String>,

        /// Only commits at or before this RFC 3339 time
        #[arg(long)]
        until: Option<String>,

        /// Return at most this many commits
        #[arg(long)]
        max_count: Option<usize>,

        /// Drop this many commits from the front
        #[arg(long)]
        skip: Option<usize>,

        /// Only commits touching files matching this glob
        #[arg(long = "path", value_name = "GLOB")]
        paths: Vec<String>,
    },

    /// Working tree status
    Status {
        #[command(flatten)]
        repo: RepoArg,
    },

    /// Local and remote-tracking branches
    Branches {
        #[command(flatten)]
        repo: RepoArg,
    },

    /// Tags with their targets
    Tags {
        #[command(flatten)]
        repo: RepoArg,
    },

    /// Configured remotes
    Remotes {
        #[command(flatten)]
        repo: RepoArg,
    },

    /// Git configuration entries
    Config {
        #[command(flatten)]
        repo: RepoArg,

        /// local, global or system; merged when omitted
        #[arg(long)]
        scope: Option<String>,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration and where it came from
    Show,
    /// Write a project configuration file
    Init {
        /// Manifest file name
        #[arg(long)]
        manifest: Option<String>,

        /// State file name
        #[arg(long)]
        state: Option<String>,

        /// Overwrite an existing project configuration
        #[arg(long)]
        force: bool,
    },
}

/// Shells supported by `completion`.
#[derive(ValueEnum, Clone, Copy, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_parses_kind() {
        let cli = Cli::try_parse_from(["gitform", "import", "tag", "repo|v1", "release"]).unwrap();
        match cli.command {
            Command::Import {
                kind,
                import_id,
                resource_id,
            } => {
                assert_eq!(kind, ResourceKind::Tag);
                assert_eq!(import_id, "repo|v1");
                assert_eq!(resource_id, "release");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn import_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["gitform", "import", "branch", "repo", "b"]).is_err());
    }

    #[test]
    fn read_log_options() {
        let cli = Cli::try_parse_from([
            "gitform", "read", "log", "work", "--max-count", "5", "--skip", "2", "--path", "src/*",
        ])
        .unwrap();
        let Command::Read {
            fact:
                ReadFact::Log {
                    repo,
                    max_count,
                    skip,
                    paths,
                    ..
                },
        } = cli.command
        else {
            panic!("expected read log");
        };
        assert_eq!(repo.directory, PathBuf::from("work"));
        assert_eq!(max_count, Some(5));
        assert_eq!(skip, Some(2));
        assert_eq!(paths, vec!["src/*".to_string()]);
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = Cli::try_parse_from(["gitform", "plan", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
    }
}
