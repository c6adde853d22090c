//! auth::known_hosts
//!
//! OpenSSH `known_hosts` parsing and host-key verification.
//!
//! # Format
//!
//! Each non-comment line is `[marker] patterns keytype base64-key [comment]`:
//! - `patterns` is a comma-separated list of host globs (`*`, `?`), each
//!   optionally negated with `!` or written as `[host]:port`
//! - `@revoked` marks a key that must be rejected
//! - `@cert-authority` lines are ignored
//! - hashed hosts (`|1|salt|hash`) are skipped and never match
//!
//! A malformed line fails the whole load; the resolver then decides how to
//! degrade.
//!
//! Verification compares the SHA-256 digest of the presented host key blob
//! against the digest of each matching entry's decoded key.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::errors::AuthError;
use crate::core::paths::expand_home;

/// Outcome of checking a presented host key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKeyVerdict {
    /// A matching entry holds this key.
    Trusted,
    /// No entry matches the host.
    Unknown,
    /// Entries match the host but none holds this key.
    Mismatch,
    /// The key is listed as `@revoked`.
    Revoked,
}

#[derive(Debug, Clone)]
struct HostPattern {
    negated: bool,
    pattern: glob::Pattern,
}

#[derive(Debug, Clone)]
struct HostEntry {
    revoked: bool,
    patterns: Vec<HostPattern>,
    key_type: String,
    fingerprint: [u8; 32],
}

impl HostEntry {
    fn matches_host(&self, host: &str) -> bool {
        let mut positive = false;
        for p in &self.patterns {
            if p.pattern.matches(host) {
                if p.negated {
                    return false;
                }
                positive = true;
            }
        }
        positive
    }
}

/// A parsed set of known-hosts entries.
#[derive(Debug, Clone, Default)]
pub struct KnownHosts {
    entries: Vec<HostEntry>,
    sources: Vec<PathBuf>,
}

impl KnownHosts {
    /// Load and merge known-hosts files.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KnownHosts`] if `paths` is empty, if any file
    /// cannot be read, or if any line is malformed.
    pub fn load(paths: &[PathBuf]) -> Result<Self, AuthError> {
        if paths.is_empty() {
            return Err(AuthError::KnownHosts(
                "no known_hosts files available".to_string(),
            ));
        }

        let mut hosts = KnownHosts::default();
        for path in paths {
            let path = expand_home(path);
            let content = fs::read_to_string(&path).map_err(|e| {
                AuthError::KnownHosts(format!("cannot read {}: {}", path.display(), e))
            })?;
            hosts.add_file(&path, &content)?;
        }
        Ok(hosts)
    }

    /// Parse known-hosts content. `origin` is only used in error messages.
    pub fn parse(origin: &Path, content: &str) -> Result<Self, AuthError> {
        let mut hosts = KnownHosts::default();
        hosts.add_file(origin, content)?;
        Ok(hosts)
    }

    fn add_file(&mut self, origin: &Path, content: &str) -> Result<(), AuthError> {
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(entry) = parse_line(line).map_err(|msg| {
                AuthError::KnownHosts(format!("{}:{}: {}", origin.display(), idx + 1, msg))
            })? {
                self.entries.push(entry);
            }
        }
        self.sources.push(origin.to_path_buf());
        Ok(())
    }

    /// Number of usable entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files this set was loaded from.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Check a presented host key, given the SHA-256 digest of its blob.
    pub fn verify(&self, host: &str, key_sha256: &[u8]) -> HostKeyVerdict {
        let host = host.to_ascii_lowercase();
        let mut seen_host = false;
        let mut trusted = false;

        for entry in self.entries.iter().filter(|e| e.matches_host(&host)) {
            let same_key = entry.fingerprint.as_slice() == key_sha256;
            if entry.revoked {
                if same_key {
                    return HostKeyVerdict::Revoked;
                }
                continue;
            }
            seen_host = true;
            if same_key {
                debug!(host = %host, key_type = %entry.key_type, "host key matched known_hosts");
                trusted = true;
            }
        }

        match (trusted, seen_host) {
            (true, _) => HostKeyVerdict::Trusted,
            (false, true) => HostKeyVerdict::Mismatch,
            (false, false) => HostKeyVerdict::Unknown,
        }
    }
}

fn parse_line(line: &str) -> Result<Option<HostEntry>, String> {
    let mut fields = line.split_whitespace();
    let mut first = fields.next().ok_or("empty line")?;

    let mut revoked = false;
    if first.starts_with('@') {
        match first {
            "@revoked" => revoked = true,
            "@cert-authority" => return Ok(None),
            other => return Err(format!("unknown marker '{}'", other)),
        }
        first = fields.next().ok_or("missing host patterns")?;
    }

    let key_type = fields.next().ok_or("missing key type")?;
    let key_data = fields.next().ok_or("missing key data")?;

    if first.starts_with('|') {
        debug!("skipping hashed known_hosts entry");
        return Ok(None);
    }

    let blob = base64::engine::general_purpose::STANDARD
        .decode(key_data)
        .map_err(|e| format!("invalid key data: {}", e))?;
    let fingerprint: [u8; 32] = Sha256::digest(&blob).into();

    let patterns = first
        .split(',')
        .filter(|p| !p.is_empty())
        .map(parse_pattern)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(HostEntry {
        revoked,
        patterns,
        key_type: key_type.to_string(),
        fingerprint,
    }))
}

fn parse_pattern(raw: &str) -> Result<HostPattern, String> {
    let (negated, rest) = match raw.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    // "[host]:port" keeps only the host; callers verify by hostname.
    let host = match rest.strip_prefix('[') {
        Some(bracketed) => bracketed
            .split_once(']')
            .map(|(host, _)| host)
            .ok_or_else(|| format!("unterminated '[' in host pattern '{}'", raw))?,
        None => rest,
    };

    let pattern = glob::Pattern::new(&host.to_ascii_lowercase())
        .map_err(|e| format!("invalid host pattern '{}': {}", raw, e))?;
    Ok(HostPattern { negated, pattern })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_A: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsabgH5C9okWi0dh2l9GKJl";
    const KEY_B: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIBbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn digest(b64: &str) -> Vec<u8> {
        let blob = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
        Sha256::digest(&blob).to_vec()
    }

    fn parse(content: &str) -> KnownHosts {
        KnownHosts::parse(Path::new("test"), content).unwrap()
    }

    #[test]
    fn trusted_key() {
        let hosts = parse(&format!("github.com ssh-ed25519 {}\n", KEY_A));
        assert_eq!(hosts.verify("github.com", &digest(KEY_A)), HostKeyVerdict::Trusted);
    }

    #[test]
    fn unknown_host() {
        let hosts = parse(&format!("github.com ssh-ed25519 {}\n", KEY_A));
        assert_eq!(hosts.verify("gitlab.com", &digest(KEY_A)), HostKeyVerdict::Unknown);
    }

    #[test]
    fn mismatched_key() {
        let hosts = parse(&format!("github.com ssh-ed25519 {}\n", KEY_A));
        assert_eq!(hosts.verify("github.com", &digest(KEY_B)), HostKeyVerdict::Mismatch);
    }

    #[test]
    fn wildcard_and_negation() {
        let hosts = parse(&format!("*.example.com,!bad.example.com ssh-ed25519 {}\n", KEY_A));
        assert_eq!(
            hosts.verify("git.example.com", &digest(KEY_A)),
            HostKeyVerdict::Trusted
        );
        assert_eq!(
            hosts.verify("bad.example.com", &digest(KEY_A)),
            HostKeyVerdict::Unknown
        );
    }

    #[test]
    fn bracketed_port_matches_host() {
        let hosts = parse(&format!("[git.local]:2222 ssh-ed25519 {}\n", KEY_A));
        assert_eq!(hosts.verify("git.local", &digest(KEY_A)), HostKeyVerdict::Trusted);
    }

    #[test]
    fn case_insensitive_hosts() {
        let hosts = parse(&format!("GitHub.com ssh-ed25519 {}\n", KEY_A));
        assert_eq!(hosts.verify("github.COM", &digest(KEY_A)), HostKeyVerdict::Trusted);
    }

    #[test]
    fn revoked_key_rejected() {
        let hosts = parse(&format!(
            "@revoked * ssh-ed25519 {}\ngithub.com ssh-ed25519 {}\n",
            KEY_A, KEY_A
        ));
        assert_eq!(hosts.verify("github.com", &digest(KEY_A)), HostKeyVerdict::Revoked);
    }

    #[test]
    fn comments_hashed_and_ca_lines_skipped() {
        let hosts = parse(&format!(
            "# comment\n\n|1|c2FsdA==|aGFzaA== ssh-ed25519 {}\n@cert-authority *.x ssh-ed25519 {}\n",
            KEY_A, KEY_A
        ));
        assert!(hosts.is_empty());
    }

    #[test]
    fn malformed_line_fails() {
        let result = KnownHosts::parse(Path::new("kh"), "github.com ssh-ed25519\n");
        assert!(matches!(result, Err(AuthError::KnownHosts(_))));

        let result = KnownHosts::parse(Path::new("kh"), "github.com ssh-ed25519 !!notbase64!!\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_requires_paths() {
        assert!(KnownHosts::load(&[]).is_err());
    }

    #[test]
    fn load_missing_file_fails() {
        let result = KnownHosts::load(&[PathBuf::from("/nonexistent/known_hosts")]);
        assert!(matches!(result, Err(AuthError::KnownHosts(_))));
    }

    #[test]
    fn load_reads_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("known_hosts");
        fs::write(&path, format!("github.com ssh-ed25519 {}\n", KEY_A)).unwrap();
        let hosts = KnownHosts::load(&[path.clone()]).unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts.sources(), &[path]);
    }
}
