//! resources::push
//!
//! Pushing local refs to a configured remote.
//!
//! Planning lists the refs the remote advertises and compares each
//! refspec's destination with the local source. A push is pending whenever
//! any destination lags behind or differs from its source.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Resource, ResourceError, ResourceKind};
use crate::auth::{self, AuthConfig};
use crate::core::import_id::ImportId;
use crate::core::types::Oid;
use crate::engine::{Context, EngineError, Reconciliation};
use crate::git::{Git, GitError, Lookup};

fn default_remote() -> String {
    "origin".to_string()
}

/// Declared push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSpec {
    pub directory: PathBuf,
    #[serde(default = "default_remote")]
    pub remote: String,
    /// `[+]<src>[:<dst>]`; short names are expanded against local refs.
    pub refspecs: Vec<String>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Recorded push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushState {
    pub directory: PathBuf,
    pub remote: String,
    #[serde(default)]
    pub refspecs: Vec<String>,
    #[serde(default)]
    pub force: bool,
    /// Destination ref to the object pushed there.
    #[serde(default)]
    pub pushed: BTreeMap<String, Oid>,
}

/// One parsed refspec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refspec {
    pub force: bool,
    pub src: String,
    pub dst: Option<String>,
}

impl Refspec {
    pub fn parse(raw: &str) -> Result<Self, ResourceError> {
        let (force, rest) = match raw.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let (src, dst) = match rest.split_once(':') {
            Some((src, dst)) => (src, Some(dst)),
            None => (rest, None),
        };
        if src.trim().is_empty() {
            return Err(ResourceError::invalid(
                ResourceKind::Push,
                format!("refspec '{}' has no source; deleting remote refs is not supported", raw),
            ));
        }
        if dst.is_some_and(|d| d.trim().is_empty()) {
            return Err(ResourceError::invalid(
                ResourceKind::Push,
                format!("refspec '{}' has an empty destination", raw),
            ));
        }
        Ok(Self {
            force,
            src: src.to_string(),
            dst: dst.map(String::from),
        })
    }

    /// Full destination ref for an expanded source ref.
    ///
    /// A short destination takes the namespace of the source, so `main:dev`
    /// pushes `refs/heads/main` to `refs/heads/dev`.
    pub fn destination(&self, expanded_src: &str) -> String {
        match &self.dst {
            None => expanded_src.to_string(),
            Some(dst) if dst.starts_with("refs/") => dst.clone(),
            Some(dst) => {
                let namespace = ["refs/heads/", "refs/tags/"]
                    .into_iter()
                    .find(|ns| expanded_src.starts_with(ns))
                    .unwrap_or("refs/heads/");
                format!("{}{}", namespace, dst)
            }
        }
    }
}

/// A refspec resolved against the local repository.
#[derive(Debug, Clone)]
struct Resolved {
    src: String,
    dst: String,
    oid: Oid,
    force: bool,
}

impl Resolved {
    fn wire(&self, force: bool) -> String {
        let plus = if self.force || force { "+" } else { "" };
        format!("{}{}:{}", plus, self.src, self.dst)
    }
}

impl PushSpec {
    fn validate(&self) -> Result<Vec<Refspec>, ResourceError> {
        if self.remote.trim().is_empty() {
            return Err(ResourceError::invalid(Self::KIND, "remote cannot be empty"));
        }
        if self.refspecs.is_empty() {
            return Err(ResourceError::invalid(
                Self::KIND,
                "at least one refspec is required",
            ));
        }
        self.refspecs.iter().map(|r| Refspec::parse(r)).collect()
    }

    fn resolve(&self, git: &Git, refspecs: &[Refspec]) -> Result<Vec<Resolved>, ResourceError> {
        refspecs
            .iter()
            .map(|spec| {
                let src = git
                    .expand_ref(&spec.src)?
                    .found()
                    .ok_or_else(|| EngineError::Revision {
                        revision: spec.src.clone(),
                    })?;
                let oid = match git.try_resolve_ref(&src)? {
                    Lookup::Found(oid) => oid,
                    Lookup::NotFound => git
                        .resolve_revision(&src)
                        .map_err(EngineError::from_revision)?,
                };
                Ok(Resolved {
                    dst: spec.destination(&src),
                    src,
                    oid,
                    force: spec.force,
                })
            })
            .collect()
    }

    fn remote_url(&self, git: &Git) -> Result<String, ResourceError> {
        let urls = git
            .remote_urls(&self.remote)?
            .found()
            .ok_or_else(|| GitError::RemoteNotFound {
                name: self.remote.clone(),
            })?;
        urls.into_iter().next().ok_or_else(|| {
            ResourceError::invalid(
                Self::KIND,
                format!("remote '{}' has no url", self.remote),
            )
        })
    }

    fn state(&self, resolved: &[Resolved]) -> PushState {
        PushState {
            directory: self.directory.clone(),
            remote: self.remote.clone(),
            refspecs: self.refspecs.clone(),
            force: self.force,
            pushed: resolved
                .iter()
                .map(|r| (r.dst.clone(), r.oid.clone()))
                .collect(),
        }
    }
}

/// Destinations whose remote hash differs from the local source.
fn pending(resolved: &[Resolved], advertised: &HashMap<String, Oid>) -> Vec<String> {
    resolved
        .iter()
        .filter_map(|r| match advertised.get(&r.dst) {
            Some(remote) if remote == &r.oid => None,
            Some(remote) => Some(format!("{}: {} -> {}", r.dst, remote.short(7), r.oid.short(7))),
            None => Some(format!("{}: (absent) -> {}", r.dst, r.oid.short(7))),
        })
        .collect()
}

impl Resource for PushSpec {
    type State = PushState;

    const KIND: ResourceKind = ResourceKind::Push;

    fn plan(
        &self,
        ctx: &Context,
        previous: Option<&PushState>,
    ) -> Result<Reconciliation, ResourceError> {
        let refspecs = self.validate()?;
        let auth_spec = self.auth.to_spec()?;
        let Some(prev) = previous else {
            return Ok(Reconciliation::Create);
        };
        if prev.directory != self.directory
            || prev.remote != self.remote
            || prev.refspecs != self.refspecs
        {
            return Ok(Reconciliation::replace("configuration changed"));
        }

        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        let resolved = self.resolve(&git, &refspecs)?;
        let url = self.remote_url(&git)?;

        let transport = auth::resolve(&auth_spec, &ctx.known_hosts())?;
        let advertised: HashMap<String, Oid> = Git::list_remote_refs(&url, transport.as_ref())
            .map_err(|source| EngineError::ListRemote {
                url: url.clone(),
                source,
            })?
            .into_iter()
            .map(|r| (r.name, r.oid))
            .collect();
        debug!(remote = %self.remote, refs = advertised.len(), "compared remote refs");

        let changes = pending(&resolved, &advertised);
        if changes.is_empty() {
            Ok(Reconciliation::Noop)
        } else {
            Ok(Reconciliation::Update { changes })
        }
    }

    fn apply(
        &self,
        ctx: &Context,
        _previous: Option<&PushState>,
        _planned: &Reconciliation,
    ) -> Result<PushState, ResourceError> {
        let refspecs = self.validate()?;
        let transport = auth::resolve(&self.auth.to_spec()?, &ctx.known_hosts())?;

        let git = Git::open(&ctx.resolve_dir(&self.directory))?;
        let resolved = self.resolve(&git, &refspecs)?;
        let wire: Vec<String> = resolved.iter().map(|r| r.wire(self.force)).collect();

        git.push(&self.remote, &wire, transport.as_ref())?;
        info!(remote = %self.remote, refs = wire.len(), "pushed");
        Ok(self.state(&resolved))
    }

    /// Imports the remote-tracking branches of `origin` as already pushed.
    fn import(ctx: &Context, id: &str) -> Result<PushState, ResourceError> {
        let id = ImportId::parse_directory(id)?;
        let git = Git::open(&ctx.resolve_dir(&id.directory))?;
        let remote = default_remote();
        if !git.remote_urls(&remote)?.is_found() {
            return Err(GitError::RemoteNotFound { name: remote }.into());
        }

        let prefix = format!("{}/", remote);
        let pushed = git
            .list_branches()?
            .into_iter()
            .filter(|b| b.remote)
            .filter_map(|b| {
                let short = b.name.strip_prefix(&prefix)?;
                if short == "HEAD" {
                    return None;
                }
                Some((format!("refs/heads/{}", short), b.oid?))
            })
            .collect();

        Ok(PushState {
            directory: id.directory,
            remote,
            refspecs: Vec::new(),
            force: false,
            pushed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod refspec {
        use super::*;

        #[test]
        fn plain_source() {
            let spec = Refspec::parse("main").unwrap();
            assert!(!spec.force);
            assert_eq!(spec.src, "main");
            assert_eq!(spec.destination("refs/heads/main"), "refs/heads/main");
        }

        #[test]
        fn forced_with_short_destination() {
            let spec = Refspec::parse("+main:dev").unwrap();
            assert!(spec.force);
            assert_eq!(spec.destination("refs/heads/main"), "refs/heads/dev");
        }

        #[test]
        fn tag_namespace_carries_over() {
            let spec = Refspec::parse("v1:v1-release").unwrap();
            assert_eq!(spec.destination("refs/tags/v1"), "refs/tags/v1-release");
        }

        #[test]
        fn full_destination_kept() {
            let spec = Refspec::parse("main:refs/heads/release").unwrap();
            assert_eq!(spec.destination("refs/heads/main"), "refs/heads/release");
        }

        #[test]
        fn delete_refspec_rejected() {
            assert!(matches!(
                Refspec::parse(":refs/heads/old"),
                Err(ResourceError::Invalid { .. })
            ));
            assert!(Refspec::parse("main:").is_err());
        }
    }

    mod comparison {
        use super::*;

        fn oid(c: char) -> Oid {
            Oid::new(c.to_string().repeat(40)).unwrap()
        }

        fn resolved(dst: &str, c: char) -> Resolved {
            Resolved {
                src: dst.to_string(),
                dst: dst.to_string(),
                oid: oid(c),
                force: false,
            }
        }

        #[test]
        fn up_to_date_is_quiet() {
            let advertised = HashMap::from([("refs/heads/main".to_string(), oid('a'))]);
            assert!(pending(&[resolved("refs/heads/main", 'a')], &advertised).is_empty());
        }

        #[test]
        fn moved_and_absent_are_listed() {
            let advertised = HashMap::from([("refs/heads/main".to_string(), oid('a'))]);
            let changes = pending(
                &[resolved("refs/heads/main", 'b'), resolved("refs/tags/v1", 'c')],
                &advertised,
            );
            assert_eq!(
                changes,
                vec![
                    "refs/heads/main: aaaaaaa -> bbbbbbb".to_string(),
                    "refs/tags/v1: (absent) -> ccccccc".to_string(),
                ]
            );
        }

        #[test]
        fn force_prefix() {
            let r = resolved("refs/heads/main", 'a');
            assert_eq!(r.wire(false), "refs/heads/main:refs/heads/main");
            assert_eq!(r.wire(true), "+refs/heads/main:refs/heads/main");
        }
    }

    #[test]
    fn remote_defaults_to_origin() {
        let spec: PushSpec = toml::from_str(
            r#"
            directory = "repo"
            refspecs = ["main"]
            "#,
        )
        .unwrap();
        assert_eq!(spec.remote, "origin");
        assert!(!spec.force);
    }
}
