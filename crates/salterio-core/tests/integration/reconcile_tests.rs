use std::fs;

use salterio_core::{
    AppError, ContentDomain, CorpusStore, MatchStrategy, ReconciliationEngine, load_references,
};
use tempfile::TempDir;

const CORPUS: &str = r#"[{"id":1,"ciclo":"A","tiempo_liturgico":"Pascua","titulo":"El Buen Pastor","lecturas":"Jn 10, 11-18","resumen":"","link":""},{"id":2,"ciclo":"C","tiempo_liturgico":"Cuaresma","titulo":"Tentaciones","lecturas":"Lc 4, 1-13","resumen":"","link":"https://diegojavier.example/2024/02/18/tentaciones"}]"#;

const REFERENCES: &str = r#"[
  {"title": "El Buen Pastor", "file": "contemplaciones - 2024.docx", "link": "https://diegojavier.example/2024/04/21/el-buen-pastor"},
  {"title": "El Buen Pastor", "file": "ejercicios - retiro.docx", "link": "https://diegojavier.example/ejercicio/pastor"},
  {"title": "Tentaciones", "file": "contemplaciones - 2024.docx", "link": "https://diegojavier.example/2024/02/18/tentaciones"}
]"#;

fn engine(strategy: MatchStrategy) -> ReconciliationEngine {
    ReconciliationEngine::new(ContentDomain::Contemplations.profile().reference_tag, strategy)
}

fn setup(corpus: &str) -> (TempDir, CorpusStore, Vec<salterio_core::ReferenceEntry>) {
    let dir = TempDir::new().unwrap();
    let corpus_path = dir.path().join("contemplaciones.json");
    fs::write(&corpus_path, corpus).unwrap();
    let refs_path = dir.path().join("references.json");
    fs::write(&refs_path, REFERENCES).unwrap();
    let refs = load_references(&refs_path).unwrap();
    (dir, CorpusStore::new(corpus_path), refs)
}

#[test]
fn fuzzy_reconcile_fills_missing_link_and_backs_up() {
    let (_dir, store, refs) = setup(CORPUS);

    let report = engine(MatchStrategy::Fuzzy { threshold: 0.2 })
        .reconcile(&store, &refs)
        .unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(report.matched, 2);
    assert_eq!(report.updates, 1);

    let backup = report.backup.expect("backup written");
    assert_eq!(fs::read_to_string(backup).unwrap(), CORPUS);

    let records = store.load().unwrap();
    assert_eq!(
        records[0].link,
        "https://diegojavier.example/2024/04/21/el-buen-pastor"
    );
    assert_eq!(
        records[1].link,
        "https://diegojavier.example/2024/02/18/tentaciones"
    );
    assert_eq!(records[0].readings, "Jn 10, 11-18");
}

#[test]
fn no_changes_leave_the_corpus_byte_identical() {
    let updated = CORPUS.replace(
        r#""link":""}"#,
        r#""link":"https://diegojavier.example/2024/04/21/el-buen-pastor"}"#,
    );
    let (_dir, store, refs) = setup(&updated);

    let report = engine(MatchStrategy::Exact).reconcile(&store, &refs).unwrap();

    assert_eq!(report.updates, 0);
    assert_eq!(report.matched, 2);
    assert_eq!(fs::read_to_string(store.path()).unwrap(), updated);
    assert!(store.backup_path().exists());
}

#[test]
fn exact_strategy_ignores_near_titles() {
    let corpus = CORPUS.replace("El Buen Pastor", "El buen pastor");
    let (_dir, store, refs) = setup(&corpus);

    let report = engine(MatchStrategy::Exact).reconcile(&store, &refs).unwrap();

    assert_eq!(report.unmatched, 1);
    assert_eq!(report.updates, 0);
    assert_eq!(fs::read_to_string(store.path()).unwrap(), corpus);
}

#[test]
fn missing_corpus_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = CorpusStore::new(dir.path().join("missing.json"));

    let err = engine(MatchStrategy::Exact).reconcile(&store, &[]).unwrap_err();

    assert!(matches!(err, AppError::PersistenceError(_)));
    assert!(!store.backup_path().exists());
}
