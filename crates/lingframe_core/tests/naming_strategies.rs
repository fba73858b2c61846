use lingframe_core::{
    AtomLevel, AtomizationSchema, Atomizer, NamingConfig, NamingStrategyKind,
};
use std::collections::BTreeSet;

const SAMPLE: &str = "## Intro\n\nHello world. Bye now.\n\n## End\n\nDone.";

fn schema_with(strategy: NamingStrategyKind) -> AtomizationSchema {
    let naming = NamingConfig {
        strategy,
        ..NamingConfig::default()
    };
    AtomizationSchema::new("strategies", AtomLevel::ALL.to_vec(), naming)
        .expect("valid schema")
}

fn atomize_ids(strategy: NamingStrategyKind, level: AtomLevel) -> Vec<String> {
    let mut atomizer = Atomizer::new(schema_with(strategy)).expect("atomizer");
    let atoms = atomizer
        .atomize_text(SAMPLE, AtomLevel::Theme)
        .expect("atomize");
    collect_ids(&atoms, level)
}

fn collect_ids(atoms: &[lingframe_core::Atom], level: AtomLevel) -> Vec<String> {
    let mut ids = Vec::new();
    for atom in atoms {
        if atom.level == level {
            ids.push(atom.id.clone());
        }
        ids.extend(collect_ids(&atom.children, level));
    }
    ids
}

#[test]
fn hierarchical_ids_encode_the_path() {
    let sentence_ids = atomize_ids(NamingStrategyKind::Hierarchical, AtomLevel::Sentence);
    assert_eq!(
        sentence_ids,
        vec![
            "T001.P0001.S00001",
            "T001.P0001.S00002",
            "T002.P0001.S00001",
        ]
    );
}

#[test]
fn semantic_ids_derive_from_content() {
    let theme_ids = atomize_ids(NamingStrategyKind::Semantic, AtomLevel::Theme);
    assert_eq!(
        theme_ids,
        vec!["hello-world-bye-1", "done-1"]
    );
}

#[test]
fn hybrid_ids_pair_counters_with_slugs() {
    let theme_ids = atomize_ids(NamingStrategyKind::Hybrid, AtomLevel::Theme);
    assert_eq!(theme_ids, vec!["T001-hello-world-bye", "T002-done"]);
}

#[test]
fn every_strategy_produces_unique_ids_per_run() {
    for strategy in [
        NamingStrategyKind::Legacy,
        NamingStrategyKind::Hierarchical,
        NamingStrategyKind::Semantic,
        NamingStrategyKind::Uuid,
        NamingStrategyKind::Hybrid,
    ] {
        let mut all_ids = Vec::new();
        let mut atomizer = Atomizer::new(schema_with(strategy)).expect("atomizer");
        let atoms = atomizer
            .atomize_text(SAMPLE, AtomLevel::Theme)
            .expect("atomize");
        for level in AtomLevel::ALL {
            all_ids.extend(collect_ids(&atoms, level));
        }
        let unique: BTreeSet<&String> = all_ids.iter().collect();
        assert_eq!(unique.len(), all_ids.len(), "duplicates under {strategy:?}");
    }
}

#[test]
fn strategy_choice_never_changes_split_points() {
    let legacy_texts: Vec<String> = {
        let mut atomizer =
            Atomizer::new(schema_with(NamingStrategyKind::Legacy)).expect("atomizer");
        let atoms = atomizer
            .atomize_text(SAMPLE, AtomLevel::Theme)
            .expect("atomize");
        collect_texts(&atoms, AtomLevel::Sentence)
    };
    let uuid_texts: Vec<String> = {
        let mut atomizer =
            Atomizer::new(schema_with(NamingStrategyKind::Uuid)).expect("atomizer");
        let atoms = atomizer
            .atomize_text(SAMPLE, AtomLevel::Theme)
            .expect("atomize");
        collect_texts(&atoms, AtomLevel::Sentence)
    };
    assert_eq!(legacy_texts, uuid_texts);
}

fn collect_texts(atoms: &[lingframe_core::Atom], level: AtomLevel) -> Vec<String> {
    let mut texts = Vec::new();
    for atom in atoms {
        if atom.level == level {
            texts.push(atom.text.clone());
        }
        texts.extend(collect_texts(&atom.children, level));
    }
    texts
}
