//! Utility functions for sparql-lgg

use crate::tree::{EdgeLabel, NodeLabel, QueryTree, QueryTreeBuilder, Term};
use crate::{Result, SparqlLggError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Save object to JSON file
pub fn save_json<T: Serialize, P: AsRef<Path>>(obj: &T, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(obj)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Load object from JSON file
pub fn load_json<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> Result<T> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let obj = serde_json::from_str(&contents)?;
    Ok(obj)
}

/// Stable hex fingerprint of a tree's structure
///
/// Equal for structurally equal trees, across processes and platforms.
pub fn tree_fingerprint(tree: &QueryTree) -> String {
    let digest = Sha256::digest(tree.canonical_form().as_bytes());
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Generate a random tree with `size` nodes
///
/// Labels are drawn from `vocabulary` literals plus the wildcard, edges from
/// `vocabulary` properties plus the type edge.
pub fn random_query_tree<R: Rng>(rng: &mut R, size: usize, vocabulary: usize) -> Result<QueryTree> {
    if size == 0 {
        return Err(SparqlLggError::EmptyInput);
    }
    let vocabulary = vocabulary.max(1);

    let mut builder = QueryTreeBuilder::new(random_label(rng, vocabulary));
    for node in 1..size {
        // Choose random parent from existing nodes
        let parent = rng.gen_range(0..node);
        let edge = match rng.gen_range(0..=vocabulary) {
            0 => EdgeLabel::Type,
            k => EdgeLabel::property(format!("http://example.org/p{}", k)),
        };
        builder.add_child(parent, node, edge, random_label(rng, vocabulary));
    }
    builder.build()
}

fn random_label<R: Rng>(rng: &mut R, vocabulary: usize) -> NodeLabel {
    match rng.gen_range(0..=vocabulary) {
        0 => NodeLabel::Wildcard,
        k => NodeLabel::Concrete(Term::literal(format!("v{}", k))),
    }
}

/// Timing utilities
pub mod timing {
    use log::debug;
    use std::time::{Duration, Instant};

    /// Timer that logs its lifetime at debug level when dropped
    pub struct Timer {
        start: Instant,
        name: String,
    }

    impl Timer {
        /// Start new timer
        pub fn new(name: &str) -> Self {
            Timer {
                start: Instant::now(),
                name: name.to_string(),
            }
        }

        /// Get elapsed time
        pub fn elapsed(&self) -> Duration {
            self.start.elapsed()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            debug!("{}: {:.3}s", self.name, self.elapsed().as_secs_f32());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_query_tree() {
        let mut rng = StdRng::seed_from_u64(42);
        for size in 1..=20 {
            let tree = random_query_tree(&mut rng, size, 3).unwrap();
            assert_eq!(tree.size(), size);
        }
        assert!(random_query_tree(&mut rng, 0, 3).is_err());
    }

    #[test]
    fn test_tree_fingerprint() {
        let tree = random_query_tree(&mut StdRng::seed_from_u64(7), 12, 2).unwrap();
        let same = random_query_tree(&mut StdRng::seed_from_u64(7), 12, 2).unwrap();
        assert_eq!(tree_fingerprint(&tree), tree_fingerprint(&same));
        assert_eq!(tree_fingerprint(&tree).len(), 64);

        let other = QueryTree::leaf(NodeLabel::literal("other"));
        assert_ne!(tree_fingerprint(&tree), tree_fingerprint(&other));
    }

    #[test]
    fn test_json_serialization() {
        let mut rng = StdRng::seed_from_u64(3);
        let tree = random_query_tree(&mut rng, 8, 3).unwrap();
        let path = std::env::temp_dir().join("sparql_lgg_test_tree.json");

        save_json(&tree, &path).unwrap();
        let loaded: QueryTree = load_json(&path).unwrap();

        assert_eq!(tree, loaded);
        assert_eq!(tree.dump(), loaded.dump());

        // Clean up
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<QueryTree> = load_json("/nonexistent/sparql_lgg/tree.json");
        assert!(matches!(result, Err(SparqlLggError::Io(_))));
    }
}
