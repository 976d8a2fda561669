use std::collections::BTreeMap;

use crate::recognition::domain::embedding::Embedding;
use crate::shared::detection::Label;

/// Known identities and their reference embeddings.
///
/// Built once at startup and immutable during a session. Backed by a
/// `BTreeMap` so match traversal is in lexicographic identity order and
/// equal best similarities resolve to the lexicographically-first name.
#[derive(Clone, Debug, Default)]
pub struct Gallery {
    entries: BTreeMap<String, Vec<Embedding>>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reference embedding to `identity`.
    pub fn insert(&mut self, identity: impl Into<String>, embedding: Embedding) {
        self.entries.entry(identity.into()).or_default().push(embedding);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identity_count(&self) -> usize {
        self.entries.len()
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Label a probe embedding by greedy nearest-neighbor over every stored
    /// embedding of every identity.
    ///
    /// A candidate identity is adopted only when its similarity strictly
    /// exceeds both `threshold` and the best similarity seen so far, so an
    /// exact tie keeps the earlier (lexicographically-first) identity.
    pub fn best_match(&self, probe: &Embedding, threshold: f32) -> Label {
        let mut label = Label::Unknown;
        let mut best_sim = threshold;

        for (identity, references) in &self.entries {
            for reference in references {
                let sim = probe.cosine_similarity(reference);
                if sim > best_sim {
                    best_sim = sim;
                    label = Label::Known(identity.clone());
                }
            }
        }

        label
    }
}

/// Derive an identity name from a reference-photo file stem.
///
/// A trailing `_<digits>` ordinal is stripped so `alice_1.jpg` and
/// `alice_2.jpg` both enroll as `alice`; any other underscore is part
/// of the name.
pub fn identity_from_stem(stem: &str) -> &str {
    match stem.rsplit_once('_') {
        Some((name, suffix))
            if !name.is_empty() && !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn e(values: &[f32]) -> Embedding {
        Embedding::new(values.to_vec())
    }

    #[test]
    fn test_match_above_threshold() {
        let mut gallery = Gallery::new();
        gallery.insert("alice", e(&[1.0, 0.0]));

        // cos = 0.8 against alice's reference
        let probe = e(&[0.8, 0.6]);
        assert_eq!(gallery.best_match(&probe, 0.5), Label::Known("alice".into()));
    }

    #[test]
    fn test_match_below_threshold_is_unknown() {
        let mut gallery = Gallery::new();
        gallery.insert("alice", e(&[1.0, 0.0]));

        // cos = 0.3
        let probe = e(&[0.3, (1.0f32 - 0.09).sqrt()]);
        assert_eq!(gallery.best_match(&probe, 0.5), Label::Unknown);
    }

    #[test]
    fn test_match_at_threshold_is_unknown() {
        // Similarity must strictly exceed the threshold
        let mut gallery = Gallery::new();
        gallery.insert("alice", e(&[1.0, 0.0]));

        let probe = e(&[0.5, (0.75f32).sqrt()]);
        assert_eq!(gallery.best_match(&probe, 0.5), Label::Unknown);
    }

    #[test]
    fn test_match_picks_highest_similarity_identity() {
        let mut gallery = Gallery::new();
        gallery.insert("alice", e(&[1.0, 0.0]));
        gallery.insert("bob", e(&[0.6, 0.8]));

        // Closer to bob's reference than alice's
        let probe = e(&[0.6, 0.8]);
        assert_eq!(gallery.best_match(&probe, 0.5), Label::Known("bob".into()));
    }

    #[test]
    fn test_match_tie_prefers_lexicographically_first() {
        let mut gallery = Gallery::new();
        // Identical references under two names; insertion order reversed
        // to show the map order is what decides.
        gallery.insert("zoe", e(&[1.0, 0.0]));
        gallery.insert("alice", e(&[1.0, 0.0]));

        let probe = e(&[1.0, 0.0]);
        assert_eq!(gallery.best_match(&probe, 0.5), Label::Known("alice".into()));
    }

    #[test]
    fn test_match_scans_all_references_of_an_identity() {
        let mut gallery = Gallery::new();
        gallery.insert("alice", e(&[0.0, 1.0]));
        gallery.insert("alice", e(&[1.0, 0.0])); // second photo matches

        let probe = e(&[1.0, 0.0]);
        assert_eq!(gallery.best_match(&probe, 0.5), Label::Known("alice".into()));
    }

    #[test]
    fn test_empty_gallery_matches_nothing() {
        let gallery = Gallery::new();
        assert_eq!(gallery.best_match(&e(&[1.0, 0.0]), 0.5), Label::Unknown);
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_identity_count() {
        let mut gallery = Gallery::new();
        gallery.insert("alice", e(&[1.0, 0.0]));
        gallery.insert("alice", e(&[0.0, 1.0]));
        gallery.insert("bob", e(&[1.0, 0.0]));
        assert_eq!(gallery.identity_count(), 2);
        let names: Vec<_> = gallery.identities().collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[rstest]
    #[case::ordinal("alice_1", "alice")]
    #[case::multi_digit("bob_12", "bob")]
    #[case::no_suffix("carol", "carol")]
    #[case::non_numeric_suffix("mary_jane", "mary_jane")]
    #[case::underscore_then_ordinal("mary_jane_2", "mary_jane")]
    #[case::only_digits("42", "42")]
    #[case::trailing_underscore("dave_", "dave_")]
    fn test_identity_from_stem(#[case] stem: &str, #[case] expected: &str) {
        assert_eq!(identity_from_stem(stem), expected);
    }
}
