//! URL normalization gate.
//!
//! Every candidate string found by the scanners ends up here. A candidate is
//! resolved against the page it was found on and only absolute `http`/`https`
//! URLs survive. [`NormalizedUrl`] can only be built by [`normalize`], so a
//! [`ResultSet`] never holds anything that skipped the gate.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

/// Why a candidate was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("mailto link")]
    Mailto,

    #[error("cannot resolve: {0}")]
    Unresolvable(#[from] url::ParseError),

    #[error("unsupported scheme: {0}")]
    Scheme(String),
}

/// An absolute `http`/`https` URL that passed the gate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Resolve `candidate` against `base` and accept it if it is a web URL.
pub fn normalize(candidate: &str, base: &Url) -> Result<NormalizedUrl, Rejection> {
    if is_mailto(candidate) {
        return Err(Rejection::Mailto);
    }

    // Absolute candidates come back unchanged from join.
    let resolved = base.join(candidate)?;

    match resolved.scheme() {
        "http" | "https" => Ok(NormalizedUrl(resolved)),
        other => Err(Rejection::Scheme(other.to_string())),
    }
}

fn is_mailto(candidate: &str) -> bool {
    candidate
        .trim_start()
        .get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
}

/// Deduplicated set of normalized URLs for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    urls: BTreeSet<NormalizedUrl>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `candidate` through the gate and insert it if accepted.
    ///
    /// Returns `true` only when the set grew.
    pub fn admit(&mut self, candidate: &str, base: &Url) -> bool {
        match normalize(candidate, base) {
            Ok(url) => self.insert(url),
            Err(Rejection::Unresolvable(e)) => {
                debug!("Dropping unresolvable candidate {:?}: {}", candidate, e);
                false
            }
            Err(rejection) => {
                trace!("Rejected {:?}: {}", candidate, rejection);
                false
            }
        }
    }

    /// Admit every candidate, returning how many were new.
    pub fn admit_all<I, S>(&mut self, candidates: I, base: &Url) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .filter(|candidate| self.admit(candidate.as_ref(), base))
            .count()
    }

    pub fn insert(&mut self, url: NormalizedUrl) -> bool {
        self.urls.insert(url)
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: ResultSet) {
        self.urls.extend(other.urls);
    }

    /// Whether `url` is a member, compared by its exact string form.
    pub fn contains(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) if parsed.as_str() == url => self.urls.contains(&NormalizedUrl(parsed)),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedUrl> {
        self.urls.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = NormalizedUrl;
    type IntoIter = std::collections::btree_set::IntoIter<NormalizedUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a NormalizedUrl;
    type IntoIter = std::collections::btree_set::Iter<'a, NormalizedUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}
