//! Git revision lookup for acquired trees

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

use crate::document::UNKNOWN_REVISION;

/// Git repository wrapper
pub struct GitRepo {
    path: PathBuf,
}

/// Git errors
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository")]
    NotAGitRepo,

    #[error("Git command failed: {0}")]
    CommandFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl GitRepo {
    /// Open a git repository
    pub fn open(path: &Path) -> Result<Self, GitError> {
        if !Self::is_git_repo(path) {
            return Err(GitError::NotAGitRepo);
        }

        Ok(Self { path: path.to_path_buf() })
    }

    /// Check if path is a git repository
    pub fn is_git_repo(path: &Path) -> bool {
        path.join(".git").exists()
    }

    /// Get current branch name
    pub fn current_branch(&self) -> Result<String, GitError> {
        let output = self.run_git(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(output.trim().to_owned())
    }

    /// Get current commit hash
    pub fn current_commit(&self) -> Result<String, GitError> {
        let output = self.run_git(&["rev-parse", "HEAD"])?;
        let hash = output.trim();
        if hash.is_empty() {
            return Err(GitError::ParseError("empty rev-parse output".to_owned()));
        }
        Ok(hash.to_owned())
    }

    fn run_git(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .current_dir(&self.path)
            .args(args)
            .output()
            .map_err(|e| GitError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed(stderr.trim().to_owned()));
        }

        String::from_utf8(output.stdout).map_err(|e| GitError::ParseError(e.to_string()))
    }
}

/// HEAD commit of the tree at `path`, or [`UNKNOWN_REVISION`]
pub fn revision_of(path: &Path) -> String {
    match GitRepo::open(path).and_then(|repo| repo.current_commit()) {
        Ok(hash) => hash,
        Err(e) => {
            log::debug!("No revision for {}: {}", path.display(), e);
            UNKNOWN_REVISION.to_owned()
        },
    }
}
