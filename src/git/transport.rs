//! git::transport
//!
//! Builds libgit2 remote callbacks from a resolved [`Transport`].
//!
//! Credentials are offered a bounded number of times so a rejected
//! credential surfaces as an error instead of an endless retry loop.
//! SSH host keys are checked against the transport's [`HostKeyPolicy`].

use tracing::{debug, warn};

use crate::auth::{Credential, HostKeyPolicy, HostKeyVerdict, Transport};

const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Callbacks for fetch-direction operations (clone, ref listing).
pub(super) fn callbacks(auth: Option<&Transport>) -> git2::RemoteCallbacks<'static> {
    let mut cb = git2::RemoteCallbacks::new();
    let Some(transport) = auth else {
        return cb;
    };

    let credential = transport.credential.clone();
    let mut attempts = 0usize;
    cb.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "authentication failed for {}",
                url
            )));
        }
        offer(&credential, username_from_url, allowed)
    });

    let policy = transport.host_keys.clone();
    cb.certificate_check(move |cert, host| check_host_key(&policy, cert, host));
    cb
}

/// Callbacks for push, which additionally fail on per-ref rejections.
pub(super) fn push_callbacks(auth: Option<&Transport>) -> git2::RemoteCallbacks<'static> {
    let mut cb = callbacks(auth);
    cb.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::from_str(&format!(
            "remote rejected {}: {}",
            refname, message
        ))),
        None => Ok(()),
    });
    cb
}

fn offer(
    credential: &Credential,
    username_from_url: Option<&str>,
    allowed: git2::CredentialType,
) -> Result<git2::Cred, git2::Error> {
    let user_for = |configured: &str| -> String {
        if configured.is_empty() {
            username_from_url.unwrap_or_default().to_string()
        } else {
            configured.to_string()
        }
    };

    match credential {
        Credential::UserPass { username, password } => {
            if allowed.contains(git2::CredentialType::USERNAME) {
                return git2::Cred::username(&user_for(username));
            }
            git2::Cred::userpass_plaintext(&user_for(username), password.expose())
        }
        // Only reached when the server challenges despite the header, or
        // for ref listing where libgit2 cannot attach custom headers.
        Credential::Bearer { token } => git2::Cred::userpass_plaintext("", token.expose()),
        Credential::SshKey {
            username,
            private_key,
            passphrase,
        } => {
            let user = user_for(username);
            if allowed.contains(git2::CredentialType::USERNAME) {
                return git2::Cred::username(&user);
            }
            git2::Cred::ssh_key_from_memory(
                &user,
                None,
                private_key.expose(),
                passphrase.as_ref().map(|p| p.expose().as_str()),
            )
        }
        Credential::SshAgent { username } => {
            let user = user_for(username);
            if allowed.contains(git2::CredentialType::USERNAME) {
                return git2::Cred::username(&user);
            }
            git2::Cred::ssh_key_from_agent(&user)
        }
    }
}

fn check_host_key(
    policy: &HostKeyPolicy,
    cert: &git2::cert::Cert<'_>,
    host: &str,
) -> Result<git2::CertificateCheckStatus, git2::Error> {
    let known = match policy {
        HostKeyPolicy::Default => return Ok(git2::CertificateCheckStatus::CertificatePassthrough),
        HostKeyPolicy::AcceptAny => return Ok(git2::CertificateCheckStatus::CertificateOk),
        HostKeyPolicy::Verify(known) => known,
    };

    // TLS certificates keep libgit2's own validation.
    let Some(hostkey) = cert.as_hostkey() else {
        return Ok(git2::CertificateCheckStatus::CertificatePassthrough);
    };
    let Some(hash) = hostkey.hash_sha256() else {
        return Err(git2::Error::from_str(&format!(
            "no SHA-256 host key fingerprint offered by {}",
            host
        )));
    };

    match known.verify(host, hash) {
        HostKeyVerdict::Trusted => {
            debug!(host, "host key trusted");
            Ok(git2::CertificateCheckStatus::CertificateOk)
        }
        verdict => {
            warn!(host, ?verdict, "host key rejected");
            Err(git2::Error::from_str(&format!(
                "host key verification failed for {}: {:?}",
                host, verdict
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SecretString;

    #[test]
    fn userpass_answers_username_request() {
        let cred = Credential::UserPass {
            username: "alice".into(),
            password: SecretString::new("pw".into()),
        };
        let result = offer(&cred, None, git2::CredentialType::USERNAME);
        assert!(result.is_ok());
    }

    #[test]
    fn userpass_plaintext_offered() {
        let cred = Credential::UserPass {
            username: String::new(),
            password: SecretString::new("pw".into()),
        };
        let result = offer(&cred, Some("bob"), git2::CredentialType::USER_PASS_PLAINTEXT);
        assert!(result.is_ok());
    }

    #[test]
    fn callbacks_without_transport() {
        let _cb = callbacks(None);
        let _push = push_callbacks(None);
    }
}
