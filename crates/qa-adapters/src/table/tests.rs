//! Unit tests for static term tables.

use qa_authority::normalize::ResponseNormalizer;
use qa_authority::term::Term;
use rstest::{fixture, rstest};

use super::*;

const MESH_TERMS: &str = "\
terms:
  - id: D000001
    term: Calcimycin
  - id: D006331
    term: Heart Diseases
  - id: D006321
    term: Heart
";

#[fixture]
fn mesh() -> TermTable {
    let terms = TermList::parse(MESH_TERMS, "mesh.yml").expect("parse");
    TermTable::new(MESH, OperationSet::all(), terms)
}

fn ids(raw: &RawResult) -> Vec<String> {
    ResponseNormalizer::new()
        .normalize_many(raw)
        .expect("normalise")
        .iter()
        .map(|term| term.id().to_owned())
        .collect()
}

#[rstest]
fn search_is_case_insensitive_substring(mesh: TermTable) {
    let adapter = mesh.adapter();
    assert_eq!(ids(&adapter.search("HEART").expect("search")), ["D006331", "D006321"]);
    assert_eq!(ids(&adapter.search("mycin").expect("search")), ["D000001"]);
}

#[rstest]
fn list_all_returns_every_term(mesh: TermTable) {
    let adapter = mesh.adapter();
    assert_eq!(ids(&adapter.all().expect("all")).len(), 3);
}

#[rstest]
fn find_by_id(mesh: TermTable) {
    let raw = mesh.adapter().find("D000001").expect("find");
    let term = ResponseNormalizer::new().normalize_one(&raw).expect("normalise");
    assert_eq!(term, Term::new("D000001", "Calcimycin"));
}

#[rstest]
fn find_unknown_names_table(mesh: TermTable) {
    let error = mesh.adapter().find("D999999").expect_err("unknown");
    assert!(matches!(
        error,
        AuthorityError::TermNotFound { ref authority, .. } if authority == "mesh"
    ));
}

#[test]
fn search_only_table_hides_other_capabilities() {
    let terms = TermList::parse("terms:\n  - id: tib\n    term: Tibetan\n", "tgn.yml").expect("parse");
    let table = TermTable::new(TGNLANG, OperationSet::empty().with(Operation::Search), terms);
    let adapter = table.adapter();
    assert!(adapter.searcher().is_some());
    assert!(adapter.lister().is_none());
    assert!(adapter.finder().is_none());
    assert!(!table.descriptor().supports(Operation::ListAll));
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = TermTable::mesh(&dir.path().join("mesh.yml"));
    assert!(matches!(result, Err(TermFileError::Read { .. })));
}
