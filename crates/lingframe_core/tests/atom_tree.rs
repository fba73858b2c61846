use lingframe_core::{
    Atom, AtomLevel, AtomizationSchema, Atomizer, Corpus, Document, PreamblePolicy,
};
use std::collections::BTreeSet;

const SAMPLE: &str = "## Intro\n\nHello world. Bye now.\n\n## End\n\nDone.";

fn atomize(text: &str) -> Corpus {
    let schema = AtomizationSchema::default();
    let mut atomizer = Atomizer::new(schema.clone()).expect("atomizer");
    let mut document = Document::new("doc-1", "memory", "plain");
    document.root_atoms = atomizer
        .atomize_text(text, AtomLevel::Theme)
        .expect("atomize");
    Corpus::new("sample", vec![document], schema)
}

#[test]
fn canonical_two_theme_document_atomizes_exactly() {
    let corpus = atomize(SAMPLE);

    let themes: Vec<&Atom> = corpus.iter_atoms(AtomLevel::Theme).collect();
    assert_eq!(themes.len(), 2);

    let intro = themes[0];
    assert_eq!(intro.id, "T001");
    assert_eq!(intro.title(), Some("Intro"));
    assert_eq!(intro.children.len(), 1);

    let paragraph = &intro.children[0];
    assert_eq!(paragraph.id, "P0001");
    assert_eq!(paragraph.children.len(), 2);
    assert_eq!(paragraph.children[0].text, "Hello world.");
    assert_eq!(paragraph.children[0].id, "S00001");
    assert_eq!(paragraph.children[1].text, "Bye now.");
    assert_eq!(paragraph.children[1].id, "S00002");
    assert_eq!(paragraph.children[0].children.len(), 2);
    assert_eq!(paragraph.children[1].children.len(), 2);

    let end = themes[1];
    assert_eq!(end.id, "T002");
    assert_eq!(end.title(), Some("End"));
    assert_eq!(end.children.len(), 1);
    let end_sentences = &end.children[0].children;
    assert_eq!(end_sentences.len(), 1);
    assert_eq!(end_sentences[0].text, "Done.");
    assert_eq!(end_sentences[0].children.len(), 1);
}

#[test]
fn word_counters_run_globally_across_themes() {
    let corpus = atomize(SAMPLE);
    let word_ids: Vec<String> = corpus
        .iter_atoms(AtomLevel::Word)
        .map(|word| word.id.clone())
        .collect();
    assert_eq!(
        word_ids,
        vec!["W000001", "W000002", "W000003", "W000004", "W000005"]
    );
}

#[test]
fn every_atom_carries_all_ancestor_references() {
    let corpus = atomize(SAMPLE);

    for word in corpus.iter_atoms(AtomLevel::Word) {
        assert!(word.ancestors.get(AtomLevel::Theme).is_some());
        assert!(word.ancestors.get(AtomLevel::Paragraph).is_some());
        assert!(word.ancestors.get(AtomLevel::Sentence).is_some());
    }

    let letters: Vec<&Atom> = corpus.iter_atoms(AtomLevel::Letter).collect();
    let first = letters.first().expect("letters exist");
    assert_eq!(first.ancestors.get(AtomLevel::Theme), Some("T001"));
    assert_eq!(first.ancestors.get(AtomLevel::Paragraph), Some("P0001"));
    assert_eq!(first.ancestors.get(AtomLevel::Sentence), Some("S00001"));
    assert_eq!(first.ancestors.get(AtomLevel::Word), Some("W000001"));
}

#[test]
fn ids_are_unique_per_level() {
    let corpus = atomize(SAMPLE);
    for level in AtomLevel::ALL {
        let ids: Vec<String> = corpus
            .iter_atoms(level)
            .map(|atom| atom.id.clone())
            .collect();
        let unique: BTreeSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "duplicate id at level {level}");
    }
}

#[test]
fn counts_are_consistent_across_adjacent_levels() {
    let corpus = atomize(SAMPLE);

    let words_from_sentences: usize = corpus
        .iter_atoms(AtomLevel::Sentence)
        .map(|sentence| sentence.children.len())
        .sum();
    assert_eq!(corpus.count_atoms(AtomLevel::Word), words_from_sentences);

    let letters_from_words: usize = corpus
        .iter_atoms(AtomLevel::Word)
        .map(|word| word.children.len())
        .sum();
    assert_eq!(corpus.count_atoms(AtomLevel::Letter), letters_from_words);

    let sentences_from_paragraphs: usize = corpus
        .iter_atoms(AtomLevel::Paragraph)
        .map(|paragraph| paragraph.children.len())
        .sum();
    assert_eq!(
        corpus.count_atoms(AtomLevel::Sentence),
        sentences_from_paragraphs
    );
}

#[test]
fn words_rebuild_sentences_and_letters_rebuild_words() {
    let corpus = atomize(SAMPLE);

    for sentence in corpus.iter_atoms(AtomLevel::Sentence) {
        let rebuilt = sentence.reconstructed_text();
        let normalized: Vec<&str> = sentence.text.split_whitespace().collect();
        assert_eq!(rebuilt, normalized.join(" "));
    }

    for word in corpus.iter_atoms(AtomLevel::Word) {
        assert_eq!(word.reconstructed_text(), word.text);
    }
}

#[test]
fn empty_input_produces_empty_counts() {
    let corpus = atomize("");
    for level in AtomLevel::ALL {
        assert_eq!(corpus.count_atoms(level), 0);
    }
}

#[test]
fn preamble_policy_controls_untitled_first_theme() {
    let text = "A loose opening paragraph.\n\n## Titled\n\nBody.";

    let kept = atomize(text);
    let themes: Vec<&Atom> = kept.iter_atoms(AtomLevel::Theme).collect();
    assert_eq!(themes.len(), 2);
    assert_eq!(themes[0].title(), None);
    assert_eq!(themes[0].text, "A loose opening paragraph.");
    assert_eq!(themes[1].title(), Some("Titled"));

    let mut schema = AtomizationSchema::default();
    schema.preamble = PreamblePolicy::Drop;
    let mut atomizer = Atomizer::new(schema).expect("atomizer");
    let atoms = atomizer
        .atomize_text(text, AtomLevel::Theme)
        .expect("atomize");
    assert_eq!(atoms.len(), 1);
    assert_eq!(atoms[0].title(), Some("Titled"));
}

#[test]
fn shallow_schema_stops_at_its_last_level() {
    let schema = AtomizationSchema::new(
        "shallow",
        vec![AtomLevel::Theme, AtomLevel::Paragraph, AtomLevel::Sentence],
        lingframe_core::NamingConfig::default(),
    )
    .expect("valid schema");
    let mut atomizer = Atomizer::new(schema.clone()).expect("atomizer");
    let atoms = atomizer
        .atomize_text(SAMPLE, AtomLevel::Theme)
        .expect("atomize");

    let sentence = &atoms[0].children[0].children[0];
    assert_eq!(sentence.level, AtomLevel::Sentence);
    assert!(sentence.children.is_empty());
    assert!(sentence.is_leaf(&schema));
}
