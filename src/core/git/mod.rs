use crate::utils::error::Result;

pub mod remote;
pub mod repository;
#[cfg(test)]
pub mod testing;

pub use remote::{validate_branch_name, RemoteBranch, RemoteInspector};
pub use repository::GitRepository;

/// The seam between the sweep logic and the remote. Production code talks to
/// `origin` through `RemoteInspector`; tests substitute an in-memory remote.
pub trait RemoteOperations {
    fn list_branches(&self) -> Result<Vec<RemoteBranch>>;
    fn branch_exists(&self, name: &str) -> Result<bool>;
    fn tip_commit(&self, branch: &str) -> Result<Option<String>>;
    fn merge_base(&self, branch: &str, other: &str) -> Result<Option<String>>;
    fn merged_into(&self, protected: &str) -> Result<Vec<String>>;
    fn log_matches(&self, protected: &str, pattern: &str) -> Result<bool>;
    fn fetch_all(&self) -> Result<()>;
    fn fetch_prune(&self) -> Result<()>;
    fn delete_branch(&self, name: &str) -> Result<()>;
    fn default_branch(&self) -> Result<String>;
}

pub struct GitService {
    repo: GitRepository,
}

impl GitService {
    pub fn discover() -> Result<Self> {
        Ok(Self {
            repo: GitRepository::discover()?,
        })
    }

    pub fn repository(&self) -> &GitRepository {
        &self.repo
    }

    fn inspector(&self) -> RemoteInspector<'_> {
        RemoteInspector::new(&self.repo)
    }
}

impl RemoteOperations for GitService {
    fn list_branches(&self) -> Result<Vec<RemoteBranch>> {
        self.inspector().list_branches()
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        self.inspector().branch_exists(name)
    }

    fn tip_commit(&self, branch: &str) -> Result<Option<String>> {
        self.inspector().tip_commit(branch)
    }

    fn merge_base(&self, branch: &str, other: &str) -> Result<Option<String>> {
        self.inspector().merge_base(branch, other)
    }

    fn merged_into(&self, protected: &str) -> Result<Vec<String>> {
        self.inspector().merged_into(protected)
    }

    fn log_matches(&self, protected: &str, pattern: &str) -> Result<bool> {
        self.inspector().log_matches(protected, pattern)
    }

    fn fetch_all(&self) -> Result<()> {
        self.inspector().fetch_all()
    }

    fn fetch_prune(&self) -> Result<()> {
        self.inspector().fetch_prune()
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.inspector().delete_branch(name)
    }

    fn default_branch(&self) -> Result<String> {
        self.inspector().default_branch()
    }
}
