//! Git handler built on the system `git` command.
//!
//! Using the system binary means the usual git configuration applies:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Any authentication configured in ~/.gitconfig
//!
//! Basic credentials from the repository auth map (`user`/`username`,
//! `password` or `token`) are additionally injected into http(s) locations
//! for clone and fetch. The remote stored in the working copy never carries
//! them, so it can be compared with the plain location.

use std::fs;
use std::path::Path;
use std::process::Command;

use regex::Regex;
use url::Url;

use super::{ScmHandler, SCHEME_HTTP, SCHEME_HTTPS};
use crate::error::{Error, Result};
use crate::repository::Credentials;

/// Fetches components from git repositories.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitScmHandler;

impl ScmHandler for GitScmHandler {
    fn matches(&self, location: &Url, path: &Path) -> bool {
        if !path.join(".git").exists() {
            return false;
        }
        match run_git(
            path,
            &["config", "--get", "remote.origin.url"],
            location.as_str(),
        ) {
            Ok(remote) => same_location(remote.trim(), location),
            Err(_) => false,
        }
    }

    fn fetch(&self, location: &Url, path: &Path, auth: &Credentials) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let remote = with_credentials(location, auth);
        let target = path.to_string_lossy();
        let cwd = path.parent().unwrap_or_else(|| Path::new("."));
        run_git(
            cwd,
            &["clone", remote.as_str(), target.as_ref()],
            location.as_str(),
        )
        .map_err(|e| match e {
            Error::GitCommand { stderr, .. } => Error::GitCommand {
                command: "clone".to_string(),
                location: location.to_string(),
                stderr: explain_clone_failure(&stderr),
            },
            other => other,
        })?;

        if remote != *location {
            run_git(
                path,
                &["remote", "set-url", "origin", location.as_str()],
                location.as_str(),
            )?;
        }
        Ok(())
    }

    fn update(&self, location: &Url, path: &Path, auth: &Credentials) -> Result<()> {
        let remote = with_credentials(location, auth);
        run_git(
            path,
            &[
                "fetch",
                "--tags",
                "--force",
                remote.as_str(),
                "+refs/heads/*:refs/remotes/origin/*",
            ],
            location.as_str(),
        )?;

        // Keep origin/HEAD on the remote default branch
        let head = run_git(
            path,
            &["ls-remote", "--symref", remote.as_str(), "HEAD"],
            location.as_str(),
        )?;
        if let Some(branch) = default_branch(&head) {
            let target = format!("refs/remotes/origin/{}", branch);
            run_git(
                path,
                &["symbolic-ref", "refs/remotes/origin/HEAD", target.as_str()],
                location.as_str(),
            )?;
        }
        Ok(())
    }

    fn switch(&self, path: &Path, reference: &str) -> Result<()> {
        let location = path.display().to_string();
        if reference.is_empty() {
            return switch_to_default_branch(path, &location);
        }

        let remote_branch = format!("refs/remotes/origin/{}", reference);
        let is_branch = run_git(
            path,
            &["rev-parse", "--verify", "--quiet", remote_branch.as_str()],
            &location,
        )
        .is_ok();

        if is_branch {
            let start = format!("origin/{}", reference);
            run_git(
                path,
                &["checkout", "--force", "-B", reference, start.as_str()],
                &location,
            )?;
        } else {
            // Tag or commit
            run_git(
                path,
                &["checkout", "--force", "--detach", reference],
                &location,
            )?;
        }
        Ok(())
    }
}

/// Checks out the remote default branch at its latest fetched commit.
///
/// Copies without an `origin/HEAD` are left alone.
fn switch_to_default_branch(path: &Path, location: &str) -> Result<()> {
    let Ok(head) = run_git(
        path,
        &["symbolic-ref", "--short", "refs/remotes/origin/HEAD"],
        location,
    ) else {
        return Ok(());
    };
    let start = head.trim();
    let Some(branch) = start.strip_prefix("origin/") else {
        return Ok(());
    };
    run_git(
        path,
        &["checkout", "--force", "-B", branch, start],
        location,
    )?;
    Ok(())
}

/// Extracts the default branch from `git ls-remote --symref <remote> HEAD`.
fn default_branch(ls_remote: &str) -> Option<&str> {
    ls_remote.lines().find_map(|line| {
        let (target, name) = line.strip_prefix("ref: ")?.split_once('\t')?;
        if name.trim() != "HEAD" {
            return None;
        }
        target.strip_prefix("refs/heads/")
    })
}

/// Runs a git command in `cwd` and returns its standard output.
///
/// The command recorded in errors only contains the git sub-command, never
/// the remote URL, and userinfo is stripped from the captured stderr, so
/// credentials do not leak into messages.
fn run_git(cwd: &Path, args: &[&str], location: &str) -> Result<String> {
    let command = args.first().copied().unwrap_or_default().to_string();
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            location: location.to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command,
            location: location.to_string(),
            stderr: redact_userinfo(stderr.trim())?,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Scheme followed by `user[:password]@`
const USERINFO_PATTERN: &str = r"([A-Za-z][A-Za-z0-9+.\-]*://)[^/@\s]+@";

/// Removes `user:password@` from every URL in `text`.
fn redact_userinfo(text: &str) -> Result<String> {
    let userinfo = Regex::new(USERINFO_PATTERN).map_err(Error::Regex)?;
    Ok(userinfo.replace_all(text, "$1").into_owned())
}

// Provide helpful error message for common auth failures
fn explain_clone_failure(stderr: &str) -> String {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Make sure you have access to the repository.\n\
            For private repos, ensure you have:\n\
            - SSH key added to ssh-agent\n\
            - Git credentials configured\n\
            - user/password or token in the component auth\n\
            Error: {}",
            stderr
        )
    } else {
        stderr.to_string()
    }
}

/// Injects basic credentials into http(s) locations.
fn with_credentials(location: &Url, auth: &Credentials) -> Url {
    if location.scheme() != SCHEME_HTTP && location.scheme() != SCHEME_HTTPS {
        return location.clone();
    }

    let user = auth.get("user").or_else(|| auth.get("username"));
    let secret = auth.get("password").or_else(|| auth.get("token"));
    let mut url = location.clone();
    match (user, secret) {
        (Some(user), secret) => {
            let _ = url.set_username(user);
            let _ = url.set_password(secret.map(String::as_str));
        }
        (None, Some(token)) => {
            let _ = url.set_username("git");
            let _ = url.set_password(Some(token));
        }
        (None, None) => {}
    }
    url
}

/// Compares a configured remote with a location, ignoring credentials and a
/// trailing `.git` or `/`.
fn same_location(remote: &str, location: &Url) -> bool {
    let normalize = |s: &str| -> String {
        let s = s.trim_end_matches('/');
        s.strip_suffix(".git").unwrap_or(s).to_string()
    };
    match Url::parse(remote) {
        Ok(mut remote) => {
            let _ = remote.set_username("");
            let _ = remote.set_password(None);
            normalize(remote.as_str()) == normalize(location.as_str())
        }
        Err(_) => normalize(remote) == normalize(location.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn creds(pairs: &[(&str, &str)]) -> Credentials {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_with_credentials_user_password() {
        let location = Url::parse("https://github.com/org/repo.git").unwrap();
        let url = with_credentials(&location, &creds(&[("user", "bob"), ("password", "pw")]));
        assert_eq!(url.as_str(), "https://bob:pw@github.com/org/repo.git");
    }

    #[test]
    fn test_with_credentials_token_only() {
        let location = Url::parse("https://github.com/org/repo.git").unwrap();
        let url = with_credentials(&location, &creds(&[("token", "t0k")]));
        assert_eq!(url.username(), "git");
        assert_eq!(url.password(), Some("t0k"));
    }

    #[test]
    fn test_with_credentials_ignores_git_scheme() {
        let location = Url::parse("git://host/org/repo").unwrap();
        let url = with_credentials(&location, &creds(&[("user", "bob")]));
        assert_eq!(url, location);
    }

    #[test]
    fn test_same_location() {
        let location = Url::parse("https://github.com/org/repo").unwrap();
        assert!(same_location("https://github.com/org/repo.git", &location));
        assert!(same_location("https://bob:pw@github.com/org/repo", &location));
        assert!(!same_location("https://github.com/org/other", &location));
    }

    #[test]
    fn test_redact_userinfo() {
        let stderr = "fatal: repository 'https://bob:pw@host/org/r.git/' not found";
        let redacted = redact_userinfo(stderr).unwrap();
        assert!(!redacted.contains("bob"));
        assert!(!redacted.contains("pw@"));
        assert_eq!(redacted, "fatal: repository 'https://host/org/r.git/' not found");

        let stderr = "unable to access 'https://git:t0k@h/x' and ssh://me@h/y";
        assert_eq!(
            redact_userinfo(stderr).unwrap(),
            "unable to access 'https://h/x' and ssh://h/y"
        );
        assert_eq!(redact_userinfo("fatal: boom").unwrap(), "fatal: boom");
    }

    #[test]
    fn test_default_branch() {
        let output = "ref: refs/heads/trunk\tHEAD\n3f2a0c1d\tHEAD\n";
        assert_eq!(default_branch(output), Some("trunk"));
        assert_eq!(default_branch("3f2a0c1d\tHEAD\n"), None);
        assert_eq!(default_branch(""), None);
    }

    #[test]
    fn test_explain_clone_failure() {
        let message = explain_clone_failure("fatal: Authentication failed for ...");
        assert!(message.contains("Make sure you have access"));
        assert_eq!(explain_clone_failure("fatal: boom"), "fatal: boom");
    }

    #[test]
    fn test_matches_requires_working_copy() {
        let temp = TempDir::new().unwrap();
        let location = Url::parse("https://github.com/org/repo").unwrap();
        assert!(!GitScmHandler.matches(&location, temp.path()));
    }

    #[test]
    fn test_switch_without_reference_is_noop() {
        let temp = TempDir::new().unwrap();
        assert!(GitScmHandler.switch(temp.path(), "").is_ok());
    }

    // Exercising clone/fetch/checkout needs a git binary; see
    // tests/git_handler_test.rs (integration-tests feature).
}
