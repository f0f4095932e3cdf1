//! In-memory remote used by classifier, engine, and executor tests so the
//! decision logic is exercised without any real network-backed process.

use super::{RemoteBranch, RemoteOperations};
use crate::utils::error::{Result, SweeperError};
use regex::Regex;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Default)]
struct FakeState {
    branches: Vec<RemoteBranch>,
    tips: BTreeMap<String, String>,
    merge_bases: BTreeMap<(String, String), String>,
    merged_lists: BTreeMap<String, Vec<String>>,
    log_messages: Vec<(String, String)>,
    default_branch: String,
    issued_deletes: Vec<String>,
    fetch_prune_count: usize,
    // Number of fetch --prune calls before an issued delete becomes visible.
    deletion_lag: usize,
    fail_deletes: bool,
    fail_fetch_all: bool,
    fail_listing: bool,
    deleted: Vec<String>,
}

pub struct FakeRemote {
    state: RefCell<FakeState>,
}

impl FakeRemote {
    pub fn new(default_branch: &str) -> Self {
        Self {
            state: RefCell::new(FakeState {
                default_branch: default_branch.to_string(),
                ..FakeState::default()
            }),
        }
    }

    pub fn add_branch(&self, name: &str, last_activity: i64, tip: &str) {
        let mut state = self.state.borrow_mut();
        state.branches.push(RemoteBranch {
            name: name.to_string(),
            last_activity,
        });
        state.tips.insert(name.to_string(), tip.to_string());
    }

    pub fn set_merge_base(&self, branch: &str, other: &str, commit: &str) {
        self.state.borrow_mut().merge_bases.insert(
            (branch.to_string(), other.to_string()),
            commit.to_string(),
        );
    }

    /// Make `merged_into(protected)` list the branch as `origin/<branch>`.
    pub fn mark_merged(&self, protected: &str, branch: &str) {
        self.state
            .borrow_mut()
            .merged_lists
            .entry(protected.to_string())
            .or_default()
            .push(format!("origin/{}", branch));
    }

    /// Record a canned commit message on the protected branch's log, to be
    /// matched by `log_matches` patterns.
    pub fn add_log_message(&self, protected: &str, message: &str) {
        self.state
            .borrow_mut()
            .log_messages
            .push((protected.to_string(), message.to_string()));
    }

    pub fn set_deletion_lag(&self, fetches: usize) {
        self.state.borrow_mut().deletion_lag = fetches;
    }

    pub fn fail_deletes(&self) {
        self.state.borrow_mut().fail_deletes = true;
    }

    pub fn fail_fetches(&self) {
        self.state.borrow_mut().fail_fetch_all = true;
    }

    pub fn fail_listing(&self) {
        self.state.borrow_mut().fail_listing = true;
    }

    pub fn issued_deletes(&self) -> Vec<String> {
        self.state.borrow().issued_deletes.clone()
    }

    pub fn fetch_prune_count(&self) -> usize {
        self.state.borrow().fetch_prune_count
    }

    fn apply_visible_deletes(state: &mut FakeState) {
        if state.fetch_prune_count >= state.deletion_lag {
            for name in state.issued_deletes.clone() {
                state.branches.retain(|b| b.name != name);
                if !state.deleted.contains(&name) {
                    state.deleted.push(name);
                }
            }
        }
    }
}

impl RemoteOperations for FakeRemote {
    fn list_branches(&self) -> Result<Vec<RemoteBranch>> {
        let state = self.state.borrow();
        if state.fail_listing {
            return Err(SweeperError::remote_query("simulated listing outage"));
        }
        Ok(state.branches.clone())
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.state.borrow().branches.iter().any(|b| b.name == name))
    }

    fn tip_commit(&self, branch: &str) -> Result<Option<String>> {
        Ok(self.state.borrow().tips.get(branch).cloned())
    }

    fn merge_base(&self, branch: &str, other: &str) -> Result<Option<String>> {
        let state = self.state.borrow();
        Ok(state
            .merge_bases
            .get(&(branch.to_string(), other.to_string()))
            .or_else(|| {
                state
                    .merge_bases
                    .get(&(other.to_string(), branch.to_string()))
            })
            .cloned())
    }

    fn merged_into(&self, protected: &str) -> Result<Vec<String>> {
        Ok(self
            .state
            .borrow()
            .merged_lists
            .get(protected)
            .cloned()
            .unwrap_or_default())
    }

    fn log_matches(&self, protected: &str, pattern: &str) -> Result<bool> {
        // Compiled for real so escaped branch names match the way git would.
        let regex = Regex::new(pattern)?;
        Ok(self
            .state
            .borrow()
            .log_messages
            .iter()
            .any(|(p, message)| p == protected && regex.is_match(message)))
    }

    fn fetch_all(&self) -> Result<()> {
        if self.state.borrow().fail_fetch_all {
            return Err(SweeperError::remote_query("simulated fetch outage"));
        }
        Ok(())
    }

    fn fetch_prune(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.fetch_prune_count += 1;
        Self::apply_visible_deletes(&mut state);
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_deletes {
            return Err(SweeperError::remote_query(format!(
                "simulated delete failure for '{}'",
                name
            )));
        }
        state.issued_deletes.push(name.to_string());
        Ok(())
    }

    fn default_branch(&self) -> Result<String> {
        Ok(self.state.borrow().default_branch.clone())
    }
}
