use crate::core::git::RemoteOperations;
use crate::core::policy::IntegrationStatus;
use crate::core::protected::ProtectedSet;
use crate::core::review::ReviewOperations;
use crate::utils::error::Result;
use log::{debug, info, warn};

/// What one evidence source can say about a branch. No source is
/// authoritative alone, but any single `Integrated` is sufficient;
/// `NotIntegrated` and `Inconclusive` never exclude a later source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    Integrated { detail: String },
    NotIntegrated,
    Inconclusive,
}

/// One independent merge-detection signal. Sources are consulted in order;
/// the first `Integrated` wins.
pub trait EvidenceSource {
    fn name(&self) -> &'static str;

    fn evaluate(
        &self,
        remote: &dyn RemoteOperations,
        branch: &str,
        protected: &ProtectedSet,
    ) -> Result<Evidence>;
}

/// Merged-PR record in the hosting platform's review system. Catches
/// squash and rebase merges whose history no longer traces back.
pub struct ReviewRecord<'a> {
    review: &'a dyn ReviewOperations,
}

impl<'a> ReviewRecord<'a> {
    pub fn new(review: &'a dyn ReviewOperations) -> Self {
        Self { review }
    }
}

impl EvidenceSource for ReviewRecord<'_> {
    fn name(&self) -> &'static str {
        "review-record"
    }

    fn evaluate(
        &self,
        _remote: &dyn RemoteOperations,
        branch: &str,
        _protected: &ProtectedSet,
    ) -> Result<Evidence> {
        match self.review.merged_proposal(branch)? {
            Some(proposal) => Ok(Evidence::Integrated {
                detail: format!(
                    "merged via PR #{}: {} (merged at {})",
                    proposal.number,
                    proposal.title,
                    proposal.merged_at.as_deref().unwrap_or("unknown")
                ),
            }),
            None => Ok(Evidence::NotIntegrated),
        }
    }
}

/// Full ancestry containment: the branch tip equals its merge base with a
/// protected branch, so every commit is already in that branch's history.
pub struct AncestryContainment;

impl EvidenceSource for AncestryContainment {
    fn name(&self) -> &'static str {
        "ancestry-containment"
    }

    fn evaluate(
        &self,
        remote: &dyn RemoteOperations,
        branch: &str,
        protected: &ProtectedSet,
    ) -> Result<Evidence> {
        let tip = match remote.tip_commit(branch)? {
            Some(tip) => tip,
            None => return Ok(Evidence::Inconclusive),
        };

        for p in protected.iter() {
            if let Some(base) = remote.merge_base(branch, p)? {
                if base == tip {
                    return Ok(Evidence::Integrated {
                        detail: format!("fully contained in protected branch {}", p),
                    });
                }
            }
        }

        Ok(Evidence::NotIntegrated)
    }
}

/// Merge-commit message scan over protected branch logs. A heuristic with a
/// deliberate false-negative bias: it handles squash merges and rebases that
/// break ancestry tracing, and a miss proves nothing.
pub struct MergeCommitScan;

impl MergeCommitScan {
    fn pattern_for(branch: &str) -> String {
        let b = regex::escape(branch);
        format!(
            "Merge.*{b}|Merge.*branch.*{b}|Merge.*pull.*request.*{b}|{b}.*into",
            b = b
        )
    }
}

impl EvidenceSource for MergeCommitScan {
    fn name(&self) -> &'static str {
        "merge-commit-scan"
    }

    fn evaluate(
        &self,
        remote: &dyn RemoteOperations,
        branch: &str,
        protected: &ProtectedSet,
    ) -> Result<Evidence> {
        let pattern = Self::pattern_for(branch);

        for p in protected.iter() {
            if remote.log_matches(p, &pattern)? {
                return Ok(Evidence::Integrated {
                    detail: format!("merge commit message found in {}", p),
                });
            }
        }

        Ok(Evidence::NotIntegrated)
    }
}

/// The remote's own merged-ref listing. Overlaps with ancestry containment
/// by design, to tolerate remote-side caching differences.
pub struct RemoteMergedList;

impl EvidenceSource for RemoteMergedList {
    fn name(&self) -> &'static str {
        "remote-merged-list"
    }

    fn evaluate(
        &self,
        remote: &dyn RemoteOperations,
        branch: &str,
        protected: &ProtectedSet,
    ) -> Result<Evidence> {
        let remote_ref = format!("origin/{}", branch);

        for p in protected.iter() {
            if remote.merged_into(p)?.contains(&remote_ref) {
                return Ok(Evidence::Integrated {
                    detail: format!("listed among refs merged into {}", p),
                });
            }
        }

        Ok(Evidence::NotIntegrated)
    }
}

/// Ordered chain of evidence sources, first `Integrated` wins. A source
/// error is logged and treated as inconclusive; if no source fires, the
/// branch is not integrated.
pub struct MergeClassifier<'a> {
    sources: Vec<Box<dyn EvidenceSource + 'a>>,
}

impl<'a> MergeClassifier<'a> {
    /// The standard chain. The review source is omitted when no review
    /// backend is available (offline or test mode).
    pub fn standard(review: Option<&'a dyn ReviewOperations>) -> Self {
        let mut sources: Vec<Box<dyn EvidenceSource + 'a>> = Vec::new();
        if let Some(review) = review {
            sources.push(Box::new(ReviewRecord::new(review)));
        }
        sources.push(Box::new(AncestryContainment));
        sources.push(Box::new(MergeCommitScan));
        sources.push(Box::new(RemoteMergedList));
        Self { sources }
    }

    pub fn with_sources(sources: Vec<Box<dyn EvidenceSource + 'a>>) -> Self {
        Self { sources }
    }

    pub fn classify(
        &self,
        remote: &dyn RemoteOperations,
        branch: &str,
        protected: &ProtectedSet,
    ) -> IntegrationStatus {
        for source in &self.sources {
            match source.evaluate(remote, branch, protected) {
                Ok(Evidence::Integrated { detail }) => {
                    info!("Branch {} is integrated: {} [{}]", branch, detail, source.name());
                    return IntegrationStatus::Integrated;
                }
                Ok(Evidence::NotIntegrated) | Ok(Evidence::Inconclusive) => {
                    debug!("No merge evidence from {} for branch {}", source.name(), branch);
                }
                Err(e) => {
                    warn!(
                        "Evidence source {} failed for branch {}: {}",
                        source.name(),
                        branch,
                        e
                    );
                }
            }
        }

        IntegrationStatus::NotIntegrated
    }
}
