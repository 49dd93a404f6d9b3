//! Unit tests for the OCLC Terminology Services adapter.

use std::sync::Arc;

use qa_authority::descriptor::SubauthorityPolicy;
use qa_authority::normalize::ResponseNormalizer;
use qa_authority::term::Term;
use rstest::rstest;

use super::*;
use crate::tests::StubFetcher;

const MESH_SEARCH: &str = "http://tspilot.oclc.org/mesh/?query=oclcts.rootHeading+exact+%22heart*%22&version=1.1&operation=searchRetrieve&recordSchema=http%3A%2F%2Fzthes.z3950.org%2Fxml%2F1.0%2F&maximumRecords=10&startRecord=1&recordPacking=xml";

const MESH_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<searchRetrieveResponse xmlns="http://www.loc.gov/zing/srw/">
  <version>1.1</version>
  <numberOfRecords>2</numberOfRecords>
  <records>
    <record>
      <recordSchema>http://zthes.z3950.org/xml/1.0/</recordSchema>
      <recordPacking>xml</recordPacking>
      <recordData>
        <Zthes>
          <term>
            <termId>D006331</termId>
            <termName>Heart Diseases</termName>
            <termType>PT</termType>
            <relation>
              <relationType>BT</relationType>
              <termId>D002318</termId>
              <termName>Cardiovascular Diseases</termName>
            </relation>
          </term>
        </Zthes>
      </recordData>
    </record>
    <record>
      <recordData>
        <Zthes>
          <term>
            <termId>D006321</termId>
            <termName>Heart &amp; Lungs</termName>
          </term>
        </Zthes>
      </recordData>
    </record>
  </records>
</searchRetrieveResponse>"#;

fn build(fetcher: StubFetcher, terminology: &str) -> (OclctsAdapter, Arc<StubFetcher>) {
    let shared = Arc::new(fetcher);
    let handle: Arc<StubFetcher> = Arc::clone(&shared);
    let adapter = OclctsAdapter::new(handle, Some(terminology)).expect("adapter");
    (adapter, shared)
}

#[test]
fn descriptor_declares_search_with_open_subauthorities() {
    let descriptor = descriptor();
    assert!(descriptor.supports(Operation::Search));
    assert!(!descriptor.supports(Operation::ListAll));
    assert!(!descriptor.supports(Operation::FindById));
    assert_eq!(descriptor.policy(), SubauthorityPolicy::OpenAny);
}

#[rstest]
#[case::absent(None)]
#[case::empty(Some(""))]
fn construction_requires_terminology(#[case] subauthority: Option<&str>) {
    let result = OclctsAdapter::new(Arc::new(StubFetcher::new()), subauthority);
    assert!(matches!(result, Err(AuthorityError::Construction { .. })));
}

#[test]
fn search_url_targets_terminology() {
    let (adapter, _) = build(StubFetcher::new(), "mesh");
    assert_eq!(adapter.search_url("heart").expect("url"), MESH_SEARCH);
}

#[test]
fn search_url_escapes_terminology_segment() {
    let (adapter, _) = build(StubFetcher::new(), "a/b");
    let url = adapter.search_url("x").expect("url");
    assert!(url.starts_with("http://tspilot.oclc.org/a%2Fb/?query="), "{url}");
}

#[test]
fn search_reads_preferred_headings() {
    let (adapter, fetcher) = build(StubFetcher::new().with_text(MESH_SEARCH, MESH_RESPONSE), "mesh");

    let raw = adapter.search("heart").expect("search");
    let terms = ResponseNormalizer::new().normalize_many(&raw).expect("normalise");

    assert_eq!(fetcher.requested(), vec![MESH_SEARCH]);
    assert_eq!(
        terms,
        vec![
            Term::new("D006331", "Heart Diseases"),
            Term::new("D006321", "Heart & Lungs"),
        ]
    );
}

#[test]
fn search_without_records_is_empty() {
    let body = r#"<searchRetrieveResponse><numberOfRecords>0</numberOfRecords><records/></searchRetrieveResponse>"#;
    let (adapter, _) = build(StubFetcher::new().with_text(MESH_SEARCH, body), "mesh");

    let raw = adapter.search("heart").expect("search");
    assert_eq!(ResponseNormalizer::new().normalize_many(&raw).expect("normalise"), Vec::<Term>::new());
}

#[test]
fn sru_diagnostic_is_malformed_response() {
    let body = r#"<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
        <srw:diagnostics><diag:diagnostic xmlns:diag="http://www.loc.gov/zing/srw/diagnostic/">
        <diag:uri>info:srw/diagnostic/1/10</diag:uri><diag:message>Query syntax error</diag:message>
        </diag:diagnostic></srw:diagnostics></srw:searchRetrieveResponse>"#;
    let (adapter, _) = build(StubFetcher::new().with_text(MESH_SEARCH, body), "mesh");

    let error = adapter.search("heart").expect_err("diagnostic");
    assert!(
        matches!(&error, AuthorityError::MalformedResponse { message, .. } if message.contains("Query syntax error")),
        "{error:?}"
    );
}

#[test]
fn broken_xml_is_malformed_response() {
    let (adapter, _) = build(StubFetcher::new().with_text(MESH_SEARCH, "<records><record></records>"), "mesh");
    let error = adapter.search("heart").expect_err("broken");
    assert!(matches!(error, AuthorityError::MalformedResponse { .. }), "{error:?}");
}

#[test]
fn unreachable_backend_is_transient() {
    let (adapter, _) = build(StubFetcher::unreachable(), "mesh");
    let error = adapter.search("heart").expect_err("unreachable");
    assert!(error.is_transient());
}

#[test]
fn prefixed_records_decode_like_default_namespace() {
    let xml = r#"<srw:searchRetrieveResponse xmlns:srw="http://www.loc.gov/zing/srw/">
        <srw:records><srw:record><srw:recordData>
        <z:Zthes xmlns:z="http://zthes.z3950.org/xml/1.0/"><z:term><z:termName>Aorta</z:termName></z:term></z:Zthes>
        </srw:recordData></srw:record></srw:records></srw:searchRetrieveResponse>"#;
    assert_eq!(
        zthes::records(xml).expect("records"),
        vec![serde_json::json!({ "id": "Aorta", "label": "Aorta" })]
    );
}
