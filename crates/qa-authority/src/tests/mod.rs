//! Crate-level integration and BDD tests.

use serde_json::{Value, json};

use crate::adapter::{AuthorityAdapter, FindById, ListAll, Search, adapter_factory};
use crate::capability::{Operation, OperationSet};
use crate::descriptor::AuthorityDescriptor;
use crate::diagnostics::RecordingReporter;
use crate::dispatch::{DispatchEngine, DispatchResult, Payload};
use crate::error::AuthorityError;
use crate::normalize::{FieldMapping, RawResult};
use crate::registry::AuthorityRegistry;
use crate::wire::render;


/// Library of Congress sub-authorities in their published order.
const LOC_SUBAUTHORITIES: [&str; 42] = [
    "subjects",
    "names",
    "classification",
    "childrensSubjects",
    "genreForms",
    "performanceMediums",
    "graphicMaterials",
    "organizations",
    "relators",
    "countries",
    "ethnographicTerms",
    "geographicAreas",
    "languages",
    "iso639-1",
    "iso639-2",
    "iso639-5",
    "preservation",
    "actionsGranted",
    "agentType",
    "edtf",
    "contentLocationType",
    "copyrightStatus",
    "cryptographicHashFunctions",
    "environmentCharacteristic",
    "environmentPurpose",
    "eventRelatedAgentRole",
    "eventRelatedObjectRole",
    "eventType",
    "formatRegistryRole",
    "hardwareType",
    "inhibitorTarget",
    "inhibitorType",
    "objectCategory",
    "preservationLevelRole",
    "relationshipSubType",
    "relationshipType",
    "rightsBasis",
    "rightsRelatedAgentRole",
    "signatureEncoding",
    "signatureMethod",
    "softwareType",
    "storageMedium",
];

/// In-memory backend serving `count` generated records.
struct Stub {
    count: usize,
    prefix: String,
}

impl Stub {
    fn new(count: usize, subauthority: Option<&str>) -> Self {
        Self {
            count,
            prefix: subauthority.unwrap_or("term").to_owned(),
        }
    }

    fn records(&self) -> Value {
        Value::Array(
            (1..=self.count)
                .map(|n| {
                    json!({
                        "uri": format!("{}-{n}", self.prefix),
                        "prefLabel": format!("Label {n}"),
                    })
                })
                .collect(),
        )
    }
}

impl Search for Stub {
    fn search(&self, _query: &str) -> Result<RawResult, AuthorityError> {
        Ok(RawResult::new(self.records(), FieldMapping::skos()))
    }
}

impl ListAll for Stub {
    fn all(&self) -> Result<RawResult, AuthorityError> {
        Ok(RawResult::new(self.records(), FieldMapping::skos()))
    }
}

impl FindById for Stub {
    fn find(&self, id: &str) -> Result<RawResult, AuthorityError> {
        Ok(RawResult::plain(json!({ "id": id, "label": format!("Label for {id}") })))
    }
}

impl AuthorityAdapter for Stub {
    fn searcher(&self) -> Option<&dyn Search> {
        Some(self)
    }

    fn lister(&self) -> Option<&dyn ListAll> {
        Some(self)
    }

    fn finder(&self) -> Option<&dyn FindById> {
        Some(self)
    }
}

fn search_only() -> OperationSet {
    OperationSet::empty().with(Operation::Search)
}

/// Builds a small registry shaped like the production catalogue whose
/// backends each serve `count` records.
fn gateway_registry(count: usize) -> AuthorityRegistry {
    let mut builder = AuthorityRegistry::builder();
    builder
        .register(
            AuthorityDescriptor::new(
                "loc",
                OperationSet::empty()
                    .with(Operation::Search)
                    .with(Operation::FindById),
            )
            .with_required_subauthorities(LOC_SUBAUTHORITIES),
            adapter_factory(move |sub| Ok(Box::new(Stub::new(count, sub)))),
        )
        .expect("register loc");
    builder
        .register(
            AuthorityDescriptor::new("assign_fast", search_only())
                .with_qualified_name("AssignFast")
                .with_required_subauthorities([
                    "all",
                    "personal",
                    "corporate",
                    "event",
                    "uniform",
                    "topical",
                    "geographic",
                    "form_genre",
                ]),
            adapter_factory(move |sub| Ok(Box::new(Stub::new(count, sub)))),
        )
        .expect("register assign_fast");
    builder
        .register(
            AuthorityDescriptor::new("mesh", OperationSet::all()),
            adapter_factory(move |sub| Ok(Box::new(Stub::new(count, sub)))),
        )
        .expect("register mesh");
    builder
        .register(
            AuthorityDescriptor::new("tgnlang", search_only()),
            adapter_factory(move |sub| Ok(Box::new(Stub::new(count, sub)))),
        )
        .expect("register tgnlang");
    builder
        .register(
            AuthorityDescriptor::new("local", OperationSet::all())
                .with_required_subauthorities(["states"]),
            adapter_factory(move |sub| Ok(Box::new(Stub::new(count, sub)))),
        )
        .expect("register local");
    builder
        .register(
            AuthorityDescriptor::new("oclcts", search_only()).with_open_subauthorities(),
            adapter_factory(move |sub| Ok(Box::new(Stub::new(count, sub)))),
        )
        .expect("register oclcts");
    builder.build()
}

#[test]
fn loc_unknown_subauthority_reproduces_full_list() {
    let registry = gateway_registry(1);
    let reporter = RecordingReporter::new();
    let engine = DispatchEngine::new(&registry, &reporter);

    assert_eq!(
        engine.search("loc", Some("bogus"), "cats"),
        DispatchResult::NotFound(crate::dispatch::NotFoundReason::UnknownSubauthority)
    );
    let expected = concat!(
        "Unable to initialize sub-authority bogus for Qa::Authorities::Loc. ",
        "Valid sub-authorities are [\"subjects\", \"names\", \"classification\", ",
        "\"childrensSubjects\", \"genreForms\", \"performanceMediums\", ",
        "\"graphicMaterials\", \"organizations\", \"relators\", \"countries\", ",
        "\"ethnographicTerms\", \"geographicAreas\", \"languages\", \"iso639-1\", ",
        "\"iso639-2\", \"iso639-5\", \"preservation\", \"actionsGranted\", ",
        "\"agentType\", \"edtf\", \"contentLocationType\", \"copyrightStatus\", ",
        "\"cryptographicHashFunctions\", \"environmentCharacteristic\", ",
        "\"environmentPurpose\", \"eventRelatedAgentRole\", \"eventRelatedObjectRole\", ",
        "\"eventType\", \"formatRegistryRole\", \"hardwareType\", \"inhibitorTarget\", ",
        "\"inhibitorType\", \"objectCategory\", \"preservationLevelRole\", ",
        "\"relationshipSubType\", \"relationshipType\", \"rightsBasis\", ",
        "\"rightsRelatedAgentRole\", \"signatureEncoding\", \"signatureMethod\", ",
        "\"softwareType\", \"storageMedium\"]"
    );
    assert_eq!(reporter.messages(), vec![expected]);
}

#[test]
fn qualified_name_override_is_used_in_diagnostics() {
    let registry = gateway_registry(1);
    let reporter = RecordingReporter::new();
    let engine = DispatchEngine::new(&registry, &reporter);

    let _ = engine.search("assign_fast", Some("bogus"), "x");
    let messages = reporter.messages();
    assert_eq!(messages.len(), 1);
    assert!(
        messages[0]
            .starts_with("Unable to initialize sub-authority bogus for Qa::Authorities::AssignFast."),
        "unexpected message: {}",
        messages[0]
    );
}

#[test]
fn end_to_end_search_renders_skos_records() {
    let registry = gateway_registry(2);
    let engine = DispatchEngine::new(&registry, RecordingReporter::new());

    let result = engine.search("loc", Some("names"), "Twain");
    let response = render(Operation::Search, &result).expect("render");
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.body(),
        r#"[{"id":"names-1","label":"Label 1"},{"id":"names-2","label":"Label 2"}]"#
    );
}

#[test]
fn registry_is_shareable_across_threads() {
    let registry = std::sync::Arc::new(gateway_registry(3));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                let engine = DispatchEngine::new(&registry, RecordingReporter::new());
                engine.list_all("mesh", None)
            })
        })
        .collect();
    for handle in handles {
        let result = handle.join().expect("thread completes");
        assert!(matches!(result, DispatchResult::Success(Payload::Terms(ref t)) if t.len() == 3));
    }
}
