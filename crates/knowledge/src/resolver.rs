//! Question resolver.
//!
//! Decides whether an incoming question is close enough to one of the
//! curated questions to answer it with the curated answer. `Ok(None)` means
//! no confident match and the caller should fall back to its general model.

use qaroute_core::{
    ClassificationResult, KnowledgeBase, LabelScore, ResolveError, ResolvedAnswer, RouterConfig,
    DEFAULT_CUTOFF, DEFAULT_TIMEOUT_MS,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::classification::{HfZeroShotClient, ZeroShotClassifier};
use crate::source::{CachedSource, JsonFileSource, KnowledgeSource};

/// Default bound on a single classification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);

/// Full outcome of one resolution, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Highest-scoring known question, if any were scored
    pub best: Option<LabelScore>,

    /// Cutoff the score was compared against
    pub cutoff: f64,

    /// Curated answer when `best` cleared the cutoff
    pub answer: ResolvedAnswer,
}

impl Resolution {
    /// Whether a curated answer was selected.
    pub fn is_match(&self) -> bool {
        self.answer.is_some()
    }
}

/// Routes questions to curated answers.
#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn KnowledgeSource>,
    classifier: Arc<dyn ZeroShotClassifier>,
    cutoff: f64,
    timeout: Duration,
}

impl Resolver {
    /// Create a resolver with the default cutoff and timeout.
    pub fn new(
        source: Arc<dyn KnowledgeSource>,
        classifier: Arc<dyn ZeroShotClassifier>,
    ) -> Self {
        Self {
            source,
            classifier,
            cutoff: DEFAULT_CUTOFF,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build the file-backed resolver described by a configuration.
    pub fn from_config(config: &RouterConfig) -> Self {
        let file = JsonFileSource::new(&config.knowledge_path);
        let source: Arc<dyn KnowledgeSource> = if config.cache_knowledge {
            Arc::new(CachedSource::new(file))
        } else {
            Arc::new(file)
        };

        Self::new(source, Arc::new(HfZeroShotClient::new(&config.classifier)))
            .with_cutoff(config.cutoff)
            .with_timeout(config.classifier.timeout())
    }

    /// Set the cutoff used by [`resolve_default`](Self::resolve_default).
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Set the bound on each classification call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured cutoff.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Current knowledge base, as the resolver would see it.
    pub async fn knowledge(&self) -> Result<Arc<KnowledgeBase>, ResolveError> {
        Ok(self.source.load().await?)
    }

    /// Resolve with the configured cutoff.
    pub async fn resolve_default(&self, question: &str) -> Result<ResolvedAnswer, ResolveError> {
        self.resolve(question, self.cutoff).await
    }

    /// Return the curated answer whose question scores strictly above
    /// `cutoff`, or `None`.
    ///
    /// Empty or whitespace-only questions are rejected with
    /// [`ResolveError::EmptyQuestion`] before any classification call.
    pub async fn resolve(
        &self,
        question: &str,
        cutoff: f64,
    ) -> Result<ResolvedAnswer, ResolveError> {
        Ok(self.resolve_detailed(question, cutoff).await?.answer)
    }

    /// Like [`resolve`](Self::resolve) but also reports the winning label
    /// and its score.
    pub async fn resolve_detailed(
        &self,
        question: &str,
        cutoff: f64,
    ) -> Result<Resolution, ResolveError> {
        if question.trim().is_empty() {
            return Err(ResolveError::EmptyQuestion);
        }

        let kb = self.source.load().await?;
        if kb.is_empty() {
            debug!("Knowledge base is empty, nothing to match");
            return Ok(Resolution {
                best: None,
                cutoff,
                answer: None,
            });
        }

        let labels = kb.labels();
        debug!("Resolving {:?} against {} known questions", question, labels.len());

        let result = tokio::time::timeout(
            self.timeout,
            self.classifier.classify(question, &labels, true),
        )
        .await
        .map_err(|_| ResolveError::Timeout(self.timeout))??;

        result.validate_against(&labels)?;

        let best = select_best(&kb, &result);
        let answer = match &best {
            Some(top) if top.score > cutoff => {
                debug_assert!(kb.contains(&top.label), "winning label not in knowledge base");
                let answer = kb.answer_for(&top.label).ok_or_else(|| {
                    ResolveError::Invariant(format!(
                        "winning label {:?} missing from knowledge base",
                        top.label
                    ))
                })?;
                info!(
                    "Matched curated question {:?} (score {:.3} > {:.3})",
                    top.label, top.score, cutoff
                );
                Some(answer.to_string())
            }
            Some(top) => {
                info!(
                    "No confident match (best {:?} at {:.3}, cutoff {:.3})",
                    top.label, top.score, cutoff
                );
                None
            }
            None => None,
        };

        Ok(Resolution {
            best,
            cutoff,
            answer,
        })
    }
}

/// Highest-scoring label. Among equal scores the question that comes first
/// in the knowledge base wins.
pub fn select_best(kb: &KnowledgeBase, result: &ClassificationResult) -> Option<LabelScore> {
    let scores: HashMap<&str, f64> = result
        .scores
        .iter()
        .map(|s| (s.label.as_str(), s.score))
        .collect();

    let mut best: Option<(&str, f64)> = None;
    for (label, _) in kb.iter() {
        if let Some(&score) = scores.get(label) {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((label, score));
            }
        }
    }

    best.map(|(label, score)| LabelScore::new(label, score))
}
