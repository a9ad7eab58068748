//! Model discovery and ranking.
//!
//! The catalog turns a provider's model listing into a deterministic,
//! best-first candidate list optimized for the fast `flash` tier. The
//! outcome of discovery (including failure) is memoized for the lifetime of
//! the catalog, so discovery runs at most once per invocation.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::ai::{GenerationProvider, ModelInfo, ProviderError};

/// Token marking the fast/lightweight tier.
const FAST_TIER_MARKER: &str = "flash";

/// Upper bound on listing pages followed during discovery.
const MAX_DISCOVERY_PAGES: usize = 50;

const TIER_SUFFIX_BONUS: i64 = 300;
const TIER_INFIX_BONUS: i64 = 150;
const LATEST_BONUS: i64 = 50;
const UNSTABLE_PENALTY: i64 = 200;
const REDUCED_CAPACITY_PENALTY: i64 = 600;
const HEAVY_TIER_PENALTY: i64 = 2000;

/// A ranked model identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModelCandidate {
    /// Normalized model identifier, e.g. `gemini-2.5-flash`.
    pub identifier: String,
    /// Zero-based position in the final ordering.
    pub rank: usize,
}

/// Per-run model catalog with memoized discovery.
#[derive(Default)]
pub struct ModelCatalog {
    discovered: OnceCell<Vec<ModelCandidate>>,
}

impl ModelCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ordered candidate list, best first.
    ///
    /// An explicit override is returned unchanged as the sole candidate
    /// without contacting the provider; the client normalizes it on use.
    /// Otherwise the provider's listing is fetched once and ranked; a failed
    /// listing yields an empty list.
    pub async fn resolve(
        &self,
        provider: &dyn GenerationProvider,
        explicit_override: Option<&str>,
    ) -> Vec<ModelCandidate> {
        if let Some(model) = explicit_override.filter(|m| !m.trim().is_empty()) {
            debug!(model, "Using explicit model override");
            return vec![ModelCandidate {
                identifier: model.to_string(),
                rank: 0,
            }];
        }

        self.discovered
            .get_or_init(|| async {
                match discover(provider).await {
                    Ok(identifiers) => {
                        let ranked = rank_models(identifiers);
                        info!(
                            count = ranked.len(),
                            best = ranked.first().map(|c| c.identifier.as_str()).unwrap_or("-"),
                            "Resolved model candidates"
                        );
                        ranked
                    }
                    Err(e) => {
                        warn!(error = %e, "Model discovery failed; no candidates available");
                        Vec::new()
                    }
                }
            })
            .await
            .clone()
    }
}

/// Lists every model the provider offers, following pagination.
async fn discover(provider: &dyn GenerationProvider) -> Result<Vec<String>, ProviderError> {
    let mut identifiers = Vec::new();
    let mut page_token: Option<String> = None;

    for page_number in 1..=MAX_DISCOVERY_PAGES {
        let page = provider.list_models(page_token.as_deref()).await?;
        debug!(page = page_number, models = page.models.len(), "Fetched model page");

        identifiers.extend(
            page.models
                .iter()
                .filter(|m| supports_generation(m))
                .map(|m| normalize_identifier(&m.name).to_string()),
        );

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => return Ok(identifiers),
        }
    }

    warn!(
        pages = MAX_DISCOVERY_PAGES,
        "Model listing did not terminate; using the pages fetched so far"
    );
    Ok(identifiers)
}

fn supports_generation(model: &ModelInfo) -> bool {
    model.supported_generation_methods.is_empty()
        || model
            .supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
}

/// Strips everything up to and including the last `/`.
pub fn normalize_identifier(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[allow(clippy::unwrap_used)] // Compile-time constant pattern.
static FAMILY_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gemini-(\d+(?:\.\d+)?)").unwrap());

/// Parses the family/version token (`gemini-2.5-...` → 2.5).
fn family_version(identifier: &str) -> Option<f64> {
    FAMILY_VERSION_RE
        .captures(identifier)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn tokens(identifier: &str) -> impl Iterator<Item = &str> {
    identifier.split(['-', '_', '.'])
}

fn is_unstable(identifier: &str) -> bool {
    identifier.contains("experimental")
        || identifier.contains("preview")
        || identifier.contains("beta")
        || tokens(identifier).any(|t| t == "exp")
}

fn is_reduced_capacity(identifier: &str) -> bool {
    tokens(identifier).any(|t| {
        t == "mini"
            || t == "lite"
            || (t.len() > 1 && t.ends_with('b') && t[..t.len() - 1].chars().all(|c| c.is_ascii_digit()))
    })
}

/// Returns true if the identifier belongs in the candidate list.
pub fn is_eligible(identifier: &str) -> bool {
    let id = identifier.to_lowercase();
    id.contains(FAST_TIER_MARKER) && family_version(&id).is_some() && !is_unstable(&id)
}

/// Scores an identifier; higher is better.
pub fn score(identifier: &str) -> i64 {
    let id = identifier.to_lowercase();

    let mut score = if id.ends_with(FAST_TIER_MARKER) {
        TIER_SUFFIX_BONUS
    } else if id.contains(FAST_TIER_MARKER) {
        TIER_INFIX_BONUS
    } else {
        0
    };

    if let Some(version) = family_version(&id) {
        score += (version * 1000.0).round() as i64;
    }
    if tokens(&id).any(|t| t == "latest") {
        score += LATEST_BONUS;
    }
    if is_unstable(&id) {
        score -= UNSTABLE_PENALTY;
    }
    if is_reduced_capacity(&id) {
        score -= REDUCED_CAPACITY_PENALTY;
    }
    if tokens(&id).any(|t| t == "pro") {
        score -= HEAVY_TIER_PENALTY;
    }

    score
}

/// Filters, scores, sorts and deduplicates discovered identifiers.
///
/// Ties keep discovery order.
pub fn rank_models(identifiers: Vec<String>) -> Vec<ModelCandidate> {
    let mut scored: Vec<(i64, String)> = identifiers
        .into_iter()
        .filter(|id| is_eligible(id))
        .map(|id| (score(&id), id))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|(_, id)| seen.insert(id.clone()))
        .enumerate()
        .map(|(rank, (_, identifier))| ModelCandidate { identifier, rank })
        .collect()
}
