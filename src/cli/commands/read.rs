//! read command - Report facts about a repository

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::args::ReadFact;
use crate::data;
use crate::engine::log_query::LogQueryInput;
use crate::engine::Context;
use crate::git::Git;
use crate::ui::output::Output;

fn emit<T: Serialize>(output: &Output, fact: &T, lines: Vec<String>) -> Result<()> {
    if output.json {
        output.json(fact)?;
    } else {
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Read one fact and print it.
pub fn read(ctx: &Context, output: &Output, fact: ReadFact) -> Result<()> {
    let directory = match &fact {
        ReadFact::Log { repo, .. }
        | ReadFact::Status { repo }
        | ReadFact::Branches { repo }
        | ReadFact::Tags { repo }
        | ReadFact::Remotes { repo }
        | ReadFact::Config { repo, .. } => ctx.resolve_dir(&repo.directory),
    };
    let git = Git::open(&directory)
        .with_context(|| format!("cannot open repository {}", directory.display()))?;

    match fact {
        ReadFact::Log {
            from,
            all,
            order,
            since,
            until,
            max_count,
            skip,
            paths,
            ..
        } => {
            let input = LogQueryInput {
                from,
                order,
                all,
                since,
                until,
                max_count,
                skip,
                paths,
            };
            let log = data::log::read(&git, &input)?;
            let lines = log.commits.iter().map(|c| c.to_string()).collect();
            emit(output, &log, lines)
        }
        ReadFact::Status { .. } => {
            let status = data::status::read(&git)?;
            let lines = status
                .files
                .iter()
                .map(|f| format!("{}{} {}", f.staging, f.worktree, f.path))
                .collect();
            emit(output, &status, lines)
        }
        ReadFact::Branches { .. } => {
            let branches = data::branches::read(&git)?;
            let lines = branches
                .branches
                .iter()
                .map(|b| {
                    let mark = if !b.remote && branches.current.as_deref() == Some(b.name.as_str()) {
                        '*'
                    } else {
                        ' '
                    };
                    let sha = b.sha1.as_ref().map(|s| s.short(7)).unwrap_or("-");
                    format!("{} {} {}", mark, b.name, sha)
                })
                .collect();
            emit(output, &branches, lines)
        }
        ReadFact::Tags { .. } => {
            let tags = data::tags::read(&git)?;
            let lines = tags
                .tags
                .iter()
                .map(|t| {
                    let kind = if t.target.annotated {
                        "annotated"
                    } else {
                        "lightweight"
                    };
                    format!("{} {} {}", t.name, t.target.hash.short(7), kind)
                })
                .collect();
            emit(output, &tags, lines)
        }
        ReadFact::Remotes { .. } => {
            let remotes = data::remotes::read(&git)?;
            let lines = remotes
                .remotes
                .iter()
                .flat_map(|r| r.urls.iter().map(move |u| format!("{}\t{}", r.name, u)))
                .collect();
            emit(output, &remotes, lines)
        }
        ReadFact::Config { scope, .. } => {
            let scope = data::config::parse_scope(scope.as_deref())?;
            let config = data::config::read(&git, scope)?;
            let lines = config
                .entries
                .iter()
                .map(|e| format!("{}={}", e.key, e.value))
                .collect();
            emit(output, &config, lines)
        }
    }
}
