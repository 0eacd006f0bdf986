use ess_core::config::DocumentConfig;
use ess_core::traits::IDocumentIndex;
use ess_providers::{KeywordIndex, PolicyDocument};

const CORPUS: &str = r#"[
    {"source": "leave-policy", "text": "Employees accrue twelve casual leave days per year. Casual leave cannot be carried forward."},
    {"source": "travel-policy", "text": "Travel expenses must be submitted within thirty days with receipts attached."},
    {"source": "maternity-policy", "text": "Maternity leave is twenty six weeks of paid leave for eligible employees."}
]"#;

fn index() -> KeywordIndex {
    KeywordIndex::from_json(CORPUS, &DocumentConfig::default()).unwrap()
}

#[test]
fn best_match_comes_first() {
    let hits = index().search("casual leave carry forward", 5).unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].source.as_deref(), Some("leave-policy"));
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn unrelated_phrase_finds_nothing() {
    assert!(index().search("quarterly revenue forecast", 5).unwrap().is_empty());
}

#[test]
fn k_limits_results() {
    let hits = index().search("leave employees", 1).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(index().search("leave", 0).unwrap().is_empty());
}

#[test]
fn scores_are_bounded() {
    for hit in index().search("maternity leave weeks", 5).unwrap() {
        assert!(hit.score > 0.0 && hit.score <= 1.0);
    }
}

#[test]
fn search_is_deterministic() {
    let a = index().search("travel receipts", 5).unwrap();
    let b = index().search("travel receipts", 5).unwrap();
    assert_eq!(a, b);
}

#[test]
fn long_documents_are_chunked() {
    let config = DocumentConfig {
        chunk_size: 40,
        chunk_overlap: 10,
        ..DocumentConfig::default()
    };
    let mut idx = KeywordIndex::new(&config);
    idx.add_document(&PolicyDocument {
        source: "handbook".into(),
        text: "word ".repeat(50),
    });
    assert!(idx.len() > 1);
}

#[test]
fn malformed_corpus_is_unavailable() {
    assert!(KeywordIndex::from_json("{not json", &DocumentConfig::default()).is_err());
}
