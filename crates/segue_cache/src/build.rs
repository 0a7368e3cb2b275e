//! Building the immutable cache of one content version.

use crate::augment::{augment, flatten};
use crate::error::CacheError;
use rayon::prelude::*;
use segue_common::{ContentHash, SegueResult};
use segue_content::{Content, ContentDeserializer, ParseError};
use segue_diagnostics::{content_hash, ContentProblem, ProblemRegistry};
use segue_store::VersionStore;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Suffix of the files that hold content.
pub const CONTENT_SUFFIX: &str = ".json";

/// Every addressable node of one content version, keyed by qualified id.
///
/// Built once and never mutated afterwards.
#[derive(Debug)]
pub struct VersionCache {
    version: String,
    nodes: HashMap<String, Arc<Content>>,
    anonymous: Vec<Arc<Content>>,
    tags: BTreeSet<String>,
    files: usize,
}

impl VersionCache {
    /// Returns the version this cache was built from.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Looks up a node by qualified id.
    pub fn get(&self, id: &str) -> Option<&Arc<Content>> {
        self.nodes.get(id)
    }

    /// Returns the number of nodes with an id.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the version holds no addressable nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns every id, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Iterates over `(id, node)` pairs in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Arc<Content>)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    /// Returns the nodes without an id, such as bare figures, in file order.
    ///
    /// They cannot be looked up but still carry media and references.
    pub fn anonymous(&self) -> &[Arc<Content>] {
        &self.anonymous
    }

    /// Returns every tag used in the version.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns the number of content files read, including unparsable ones.
    pub fn files_read(&self) -> usize {
        self.files
    }
}

/// Accumulates flattened nodes while resolving duplicate ids.
struct CacheBuilder<'a> {
    version: &'a str,
    problems: &'a ProblemRegistry,
    nodes: HashMap<String, Arc<Content>>,
    identities: HashMap<String, ContentHash>,
    anonymous: Vec<Arc<Content>>,
    seen_anonymous: HashSet<ContentHash>,
    tags: BTreeSet<String>,
}

impl<'a> CacheBuilder<'a> {
    fn new(version: &'a str, problems: &'a ProblemRegistry) -> Self {
        Self {
            version,
            problems,
            nodes: HashMap::new(),
            identities: HashMap::new(),
            anonymous: Vec::new(),
            seen_anonymous: HashSet::new(),
            tags: BTreeSet::new(),
        }
    }

    fn insert(&mut self, node: Content) -> SegueResult<()> {
        self.tags.extend(
            node.tags
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        );
        let Some(id) = node.id.clone() else {
            // An identical id-less node from the same file is kept once.
            if self.seen_anonymous.insert(content_hash(&node)?) {
                self.anonymous.push(Arc::new(node));
            }
            return Ok(());
        };
        let identity = identity_hash(&node)?;

        match self.identities.get(&id) {
            None => {
                self.identities.insert(id.clone(), identity);
                self.nodes.insert(id, Arc::new(node));
            }
            Some(existing) if *existing == identity => {
                debug!(version = self.version, id = %id, "identical content reused");
            }
            Some(_) => {
                let first = self
                    .nodes
                    .get(&id)
                    .and_then(|n| n.canonical_source_file.clone())
                    .unwrap_or_default();
                let second = node.canonical_source_file.clone().unwrap_or_default();
                warn!(
                    version = self.version,
                    id = %id,
                    first = %first,
                    second = %second,
                    "duplicate id with different content"
                );
                self.problems.register(
                    self.version,
                    &node,
                    ContentProblem::duplicate_id(&id, &first, &second),
                )?;
            }
        }
        Ok(())
    }

    fn finish(self, files: usize) -> VersionCache {
        VersionCache {
            version: self.version.to_string(),
            nodes: self.nodes,
            anonymous: self.anonymous,
            tags: self.tags,
            files,
        }
    }
}

/// Hashes a node ignoring where it was read from, so the same fragment
/// reused in two files counts as the same content.
fn identity_hash(node: &Content) -> SegueResult<ContentHash> {
    let mut anonymous = node.clone();
    strip_source(&mut anonymous);
    content_hash(&anonymous)
}

fn strip_source(node: &mut Content) {
    node.canonical_source_file = None;
    for child in &mut node.children {
        strip_source(child);
    }
    if let Some(question) = node.kind.question_mut() {
        for hint in &mut question.hints {
            strip_source(hint);
        }
    }
}

/// Parses, augments and flattens every content file of a version.
///
/// Files are parsed in parallel; their nodes are inserted in path order so
/// that the first of two conflicting definitions is the one kept. Files that
/// fail to parse are recorded as problems against a placeholder node.
pub fn build_version_cache(
    store: &dyn VersionStore,
    deserializer: &ContentDeserializer,
    problems: &ProblemRegistry,
    version: &str,
) -> Result<VersionCache, CacheError> {
    let entries = store.tree_walk(version, CONTENT_SUFFIX)?;
    info!(version, files = entries.len(), "building content cache");

    let parsed: Vec<(&str, Result<Content, ParseError>)> = entries
        .par_iter()
        .map(|entry| (entry.path.as_str(), deserializer.parse_content(&entry.bytes)))
        .collect();

    let mut builder = CacheBuilder::new(version, problems);
    for (path, result) in parsed {
        match result {
            Ok(content) => {
                let content = augment(content, path, None);
                for node in flatten(&content) {
                    builder.insert(node)?;
                }
            }
            Err(e) => {
                warn!(version, path, error = %e, "unable to parse content file");
                problems.register(
                    version,
                    &Content::placeholder(path),
                    ContentProblem::parse_failure(path, &e),
                )?;
            }
        }
    }

    let cache = builder.finish(entries.len());
    info!(
        version,
        nodes = cache.len(),
        tags = cache.tags().len(),
        "content cache built"
    );
    Ok(cache)
}
