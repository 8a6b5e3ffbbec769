//! Remote repository acquisition
//!
//! Parses repository locators and shallow-clones them into a temporary
//! directory that is removed when the returned [`Acquired`] is dropped,
//! whether or not the run that follows succeeds.
//!
//! When cloning fails for a GitHub repository, the branch archive is
//! downloaded and unpacked instead. The revision is then unknown.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;
use thiserror::Error;
use url::Url;

use crate::document::UNKNOWN_REVISION;
use crate::git::revision_of;

/// Archive host for GitHub repositories
const GITHUB_ARCHIVE_BASE: &str = "https://codeload.github.com";

/// Branches tried after the requested one
const FALLBACK_BRANCHES: &[&str] = &["main", "master"];

/// Per-request timeout for archive downloads
pub const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(20);

/// Supported Git providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitProvider {
    GitHub,
    GitLab,
    Bitbucket,
    Generic,
}

/// Parsed remote repository locator
#[derive(Debug, Clone)]
pub struct RemoteRepo {
    /// Clone URL
    pub url: String,
    /// Git provider
    pub provider: GitProvider,
    /// Repository owner/organization
    pub owner: Option<String>,
    /// Repository name
    pub name: String,
    /// Branch or tag to clone (None = default branch)
    pub branch: Option<String>,
    /// Specific commit to checkout after cloning
    pub reference: Option<String>,
}

/// Remote repository errors
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Git error: {0}")]
    GitError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Archive download failed: {0}")]
    DownloadError(String),

    #[error("Invalid archive: {0}")]
    ArchiveError(String),
}

/// A materialized working tree. Dropping it deletes the clone.
#[derive(Debug)]
pub struct Acquired {
    _temp: TempDir,
    /// Root of the working tree
    pub root: PathBuf,
    /// HEAD commit, or `(unknown)`
    pub revision: String,
}

impl RemoteRepo {
    /// Parse a remote locator.
    ///
    /// Supported formats:
    /// - https://github.com/owner/repo[.git]
    /// - https://github.com/owner/repo/tree/branch
    /// - https://github.com/owner/repo/commit/sha
    /// - github:owner/repo, gitlab:owner/repo, bitbucket:owner/repo
    /// - owner/repo (assumes GitHub)
    /// - git@github.com:owner/repo.git
    pub fn parse(input: &str) -> Result<Self, RemoteError> {
        let input = input.trim();

        if let Some(rest) = input.strip_prefix("github:") {
            return Self::parse_path(rest, GitProvider::GitHub, None);
        }
        if let Some(rest) = input.strip_prefix("gitlab:") {
            return Self::parse_path(rest, GitProvider::GitLab, None);
        }
        if let Some(rest) = input.strip_prefix("bitbucket:") {
            return Self::parse_path(rest, GitProvider::Bitbucket, None);
        }

        if input.starts_with("git@") {
            return Self::parse_ssh_url(input);
        }

        if !input.contains("://") && input.contains('/') {
            return Self::parse_path(input, GitProvider::GitHub, None);
        }

        Self::parse_https_url(input)
    }

    fn parse_path(
        path: &str,
        provider: GitProvider,
        origin: Option<&str>,
    ) -> Result<Self, RemoteError> {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 {
            return Err(RemoteError::InvalidUrl(format!("Expected owner/repo in: {}", path)));
        }

        let owner = parts[0].to_owned();
        let name = parts[1].trim_end_matches(".git").to_owned();

        let (branch, reference) = match (parts.get(2).copied(), parts.get(3)) {
            (Some("tree" | "blob" | "releases" | "tags"), Some(r)) => (Some((*r).to_owned()), None),
            (Some("commit"), Some(r)) => (None, Some((*r).to_owned())),
            _ => (None, None),
        };

        let url = match origin {
            Some(origin) => format!("{}/{}/{}.git", origin.trim_end_matches('/'), owner, name),
            None => Self::build_clone_url(provider, &owner, &name),
        };

        Ok(Self { url, provider, owner: Some(owner), name, branch, reference })
    }

    fn parse_ssh_url(input: &str) -> Result<Self, RemoteError> {
        let provider = Self::provider_for_host(input);

        let (host_part, path) = input
            .split_once(':')
            .ok_or_else(|| RemoteError::InvalidUrl("Invalid SSH URL format".to_owned()))?;

        let mut repo = Self::parse_path(path, provider, None)?;
        if provider == GitProvider::Generic {
            // Keep the original transport for unknown hosts
            repo.url = format!("{}:{}/{}.git", host_part, repo.owner.as_deref().unwrap_or(""), repo.name);
        }
        Ok(repo)
    }

    fn parse_https_url(input: &str) -> Result<Self, RemoteError> {
        let url = Url::parse(input).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidUrl(format!(
                "Unsupported scheme '{}': expected http or https",
                url.scheme()
            )));
        }

        let host = url.host_str().unwrap_or("");
        let provider = Self::provider_for_host(host);
        let origin = match provider {
            GitProvider::Generic => Some(url.origin().ascii_serialization()),
            _ => None,
        };

        Self::parse_path(url.path(), provider, origin.as_deref())
    }

    fn provider_for_host(host: &str) -> GitProvider {
        if host.contains("github.com") {
            GitProvider::GitHub
        } else if host.contains("gitlab.com") {
            GitProvider::GitLab
        } else if host.contains("bitbucket.org") {
            GitProvider::Bitbucket
        } else {
            GitProvider::Generic
        }
    }

    fn build_clone_url(provider: GitProvider, owner: &str, name: &str) -> String {
        match provider {
            GitProvider::GitHub | GitProvider::Generic => {
                format!("https://github.com/{}/{}.git", owner, name)
            },
            GitProvider::GitLab => format!("https://gitlab.com/{}/{}.git", owner, name),
            GitProvider::Bitbucket => format!("https://bitbucket.org/{}/{}.git", owner, name),
        }
    }

    /// Clone into a fresh temporary directory, falling back to an archive
    /// download when the clone fails and the host offers one.
    ///
    /// The directory is removed on every exit path: on failure here, and on
    /// drop of the returned [`Acquired`] otherwise.
    pub fn acquire(&self) -> Result<Acquired, RemoteError> {
        let temp = tempfile::Builder::new().prefix("codescroll-").tempdir()?;
        let target = temp.path().join("repo");

        log::info!("Cloning {} into {}", self.url, target.display());
        let clone_error = match self.clone_into(&target) {
            Ok(()) => {
                let revision = revision_of(&target);
                return Ok(Acquired { _temp: temp, root: target, revision });
            },
            Err(e) => e,
        };

        let candidates = self.archive_urls();
        if candidates.is_empty() {
            return Err(clone_error);
        }

        log::warn!("{}; trying archive download", clone_error);
        let root = download_archive(&candidates, &temp.path().join("archive")).map_err(|e| {
            log::warn!("Archive fallback failed: {}", e);
            clone_error
        })?;

        Ok(Acquired { _temp: temp, root, revision: UNKNOWN_REVISION.to_owned() })
    }

    /// Archive URLs to try in order: the requested branch, tag or commit,
    /// then `main` and `master`. Empty for hosts without an archive endpoint.
    pub fn archive_urls(&self) -> Vec<String> {
        let owner = match (&self.provider, &self.owner) {
            (GitProvider::GitHub, Some(owner)) => owner,
            _ => return Vec::new(),
        };
        let base = format!("{}/{}/{}/zip", GITHUB_ARCHIVE_BASE, owner, self.name);

        let requested: Vec<&str> = self
            .reference
            .iter()
            .chain(self.branch.iter())
            .map(String::as_str)
            .filter(|r| !r.is_empty())
            .collect();

        let mut urls: Vec<String> = requested.iter().map(|r| format!("{}/{}", base, r)).collect();
        for branch in FALLBACK_BRANCHES {
            if !requested.contains(branch) {
                urls.push(format!("{}/refs/heads/{}", base, branch));
            }
        }
        urls
    }

    /// Shallow-clone into `target`
    pub fn clone_into(&self, target: &Path) -> Result<(), RemoteError> {
        let mut cmd = Command::new("git");
        cmd.arg("clone");

        // A specific commit needs history to check out
        if self.reference.is_none() {
            cmd.arg("--depth").arg("1");
            cmd.arg("--single-branch");
        }

        if let Some(ref branch) = self.branch {
            cmd.arg("--branch").arg(branch);
        }

        cmd.arg(&self.url);
        cmd.arg(target);

        let output = cmd
            .output()
            .map_err(|e| RemoteError::GitError(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RemoteError::GitError(format!("git clone failed: {}", stderr.trim())));
        }

        if let Some(ref reference) = self.reference {
            let output = Command::new("git")
                .current_dir(target)
                .args(["checkout", reference])
                .output()
                .map_err(|e| RemoteError::GitError(format!("Failed to checkout: {}", e)))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(RemoteError::GitError(format!("git checkout failed: {}", stderr.trim())));
            }
        }

        Ok(())
    }

    /// Check if a string looks like a remote locator rather than a local path
    pub fn is_remote_url(input: &str) -> bool {
        input.contains("://") ||
        input.starts_with("git@") ||
        input.starts_with("github:") ||
        input.starts_with("gitlab:") ||
        input.starts_with("bitbucket:") ||
        // Simple owner/repo format (not starting with / or .)
        (input.contains('/') && !input.starts_with('/') && !input.starts_with('.') && input.matches('/').count() == 1)
    }
}

/// Download the first archive that succeeds and unpack it into `dest`
fn download_archive(urls: &[String], dest: &Path) -> Result<PathBuf, RemoteError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(ARCHIVE_TIMEOUT)
        .build()
        .map_err(|e| RemoteError::DownloadError(e.to_string()))?;

    let mut last_error = RemoteError::DownloadError("no archive candidates".to_owned());
    for url in urls {
        log::info!("Downloading {}", url);
        match fetch(&client, url) {
            Ok(bytes) => return extract_archive(&bytes, dest),
            Err(e) => {
                log::debug!("{}: {}", url, e);
                last_error = e;
            },
        }
    }
    Err(last_error)
}

fn fetch(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, RemoteError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| RemoteError::DownloadError(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(RemoteError::DownloadError(format!("HTTP {} from {}", resp.status(), url)));
    }

    let bytes = resp.bytes().map_err(|e| RemoteError::DownloadError(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Unpack a zip archive into `dest` and return the tree root.
///
/// Archives with a single top-level directory (as GitHub produces) are rooted
/// at that directory; anything else is rooted at `dest`.
pub fn extract_archive(bytes: &[u8], dest: &Path) -> Result<PathBuf, RemoteError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| RemoteError::ArchiveError(e.to_string()))?;
    fs::create_dir_all(dest)?;
    archive
        .extract(dest)
        .map_err(|e| RemoteError::ArchiveError(e.to_string()))?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dest)? {
        entries.push(entry?);
    }

    match entries.as_slice() {
        [only] if only.file_type()?.is_dir() => Ok(only.path()),
        _ => Ok(dest.to_path_buf()),
    }
}

#[cfg(test)]
#[allow(clippy::str_to_string)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn zip_of(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            match content {
                Some(text) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(text.as_bytes()).unwrap();
                },
                None => writer.add_directory(*name, options).unwrap(),
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_parse_github_url() {
        let repo = RemoteRepo::parse("https://github.com/rust-lang/rust").unwrap();
        assert_eq!(repo.provider, GitProvider::GitHub);
        assert_eq!(repo.owner, Some("rust-lang".to_string()));
        assert_eq!(repo.name, "rust");
        assert_eq!(repo.url, "https://github.com/rust-lang/rust.git");
    }

    #[test]
    fn test_parse_shorthand() {
        let repo = RemoteRepo::parse("rust-lang/rust").unwrap();
        assert_eq!(repo.provider, GitProvider::GitHub);
        assert_eq!(repo.name, "rust");

        let repo = RemoteRepo::parse("gitlab:group/project").unwrap();
        assert_eq!(repo.provider, GitProvider::GitLab);
        assert_eq!(repo.url, "https://gitlab.com/group/project.git");
    }

    #[test]
    fn test_parse_ssh_url() {
        let repo = RemoteRepo::parse("git@github.com:rust-lang/rust.git").unwrap();
        assert_eq!(repo.provider, GitProvider::GitHub);
        assert_eq!(repo.owner, Some("rust-lang".to_string()));
        assert_eq!(repo.name, "rust");
    }

    #[test]
    fn test_parse_with_branch_and_commit() {
        let repo = RemoteRepo::parse("https://github.com/rust-lang/rust/tree/master").unwrap();
        assert_eq!(repo.branch, Some("master".to_string()));

        let repo = RemoteRepo::parse("https://github.com/octo/hello/commit/abc123").unwrap();
        assert_eq!(repo.branch, None);
        assert_eq!(repo.reference, Some("abc123".to_string()));
    }

    #[test]
    fn test_generic_host_keeps_origin() {
        let repo = RemoteRepo::parse("https://git.example.org/team/tool.git").unwrap();
        assert_eq!(repo.provider, GitProvider::Generic);
        assert_eq!(repo.url, "https://git.example.org/team/tool.git");
    }

    #[test]
    fn test_invalid_urls() {
        assert!(RemoteRepo::parse("https://github.com/only-owner").is_err());
        assert!(RemoteRepo::parse("ftp://example.com/a/b").is_err());
    }

    #[test]
    fn test_is_remote_url() {
        assert!(RemoteRepo::is_remote_url("https://github.com/foo/bar"));
        assert!(RemoteRepo::is_remote_url("git@github.com:foo/bar.git"));
        assert!(RemoteRepo::is_remote_url("github:foo/bar"));
        assert!(!RemoteRepo::is_remote_url("/path/to/local/repo"));
        assert!(!RemoteRepo::is_remote_url("./local"));
    }

    #[test]
    fn test_failed_clone_is_error() {
        // Local path transport fails without network
        let repo = RemoteRepo {
            url: "/nonexistent/codescroll/repo.git".to_string(),
            provider: GitProvider::Generic,
            owner: None,
            name: "repo".to_string(),
            branch: None,
            reference: None,
        };
        assert!(repo.acquire().is_err());
    }

    #[test]
    fn test_archive_urls_default_branches() {
        let repo = RemoteRepo::parse("https://github.com/octo/hello").unwrap();
        assert_eq!(
            repo.archive_urls(),
            vec![
                "https://codeload.github.com/octo/hello/zip/refs/heads/main",
                "https://codeload.github.com/octo/hello/zip/refs/heads/master",
            ]
        );
    }

    #[test]
    fn test_archive_urls_requested_ref_first() {
        let repo = RemoteRepo::parse("https://github.com/octo/hello/tree/dev").unwrap();
        let urls = repo.archive_urls();
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0], "https://codeload.github.com/octo/hello/zip/dev");

        let repo = RemoteRepo::parse("https://github.com/octo/hello/commit/abc123").unwrap();
        assert_eq!(repo.archive_urls()[0], "https://codeload.github.com/octo/hello/zip/abc123");
    }

    #[test]
    fn test_archive_urls_skip_repeated_branch() {
        let repo = RemoteRepo::parse("github:octo/hello.git/tree/main").unwrap();
        assert_eq!(
            repo.archive_urls(),
            vec![
                "https://codeload.github.com/octo/hello/zip/main",
                "https://codeload.github.com/octo/hello/zip/refs/heads/master",
            ]
        );
    }

    #[test]
    fn test_archive_urls_only_for_github() {
        assert!(RemoteRepo::parse("gitlab:group/project").unwrap().archive_urls().is_empty());
        assert!(RemoteRepo::parse("https://git.example.org/team/tool.git")
            .unwrap()
            .archive_urls()
            .is_empty());
    }

    #[test]
    fn test_extract_archive_roots_at_single_directory() {
        let bytes = zip_of(&[
            ("hello-main/", None),
            ("hello-main/README.md", Some("# Hello\n")),
            ("hello-main/src/lib.rs", Some("pub fn hi() {}\n")),
        ]);
        let temp = TempDir::new().unwrap();

        let root = extract_archive(&bytes, &temp.path().join("archive")).unwrap();
        assert_eq!(root, temp.path().join("archive").join("hello-main"));
        assert_eq!(fs::read_to_string(root.join("README.md")).unwrap(), "# Hello\n");
        assert!(root.join("src/lib.rs").is_file());
    }

    #[test]
    fn test_extract_archive_without_wrapper_directory() {
        let bytes = zip_of(&[("a.txt", Some("a")), ("b.txt", Some("b"))]);
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("archive");

        assert_eq!(extract_archive(&bytes, &dest).unwrap(), dest);
    }

    #[test]
    fn test_extract_archive_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let result = extract_archive(b"not a zip", &temp.path().join("archive"));
        assert!(matches!(result, Err(RemoteError::ArchiveError(_))));
    }
}
