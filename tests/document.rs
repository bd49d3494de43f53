//! Loading documents, branches and variables through a source

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use figdom::tree::{NodeKind, Selector};
use figdom::variables::VariableValue;
use figdom::{Color, Document, DocumentError, DocumentSource, SvgConfig, VariableLibrary};
use futures::future::{self, FutureExt, LocalBoxFuture};

const MAIN: &str = r#"{"name": "Design System", "document": {
    "id": "0:0", "type": "DOCUMENT", "children": [
        {"id": "1:1", "type": "RECTANGLE", "name": "Swatch",
         "absoluteBoundingBox": {"x": 0, "y": 0, "width": 8, "height": 8},
         "fills": [{"type": "SOLID", "color": {"r": 1, "g": 0, "b": 0, "a": 1},
                    "boundVariables": {"color": {"type": "VARIABLE_ALIAS", "id": "VariableID:1"}}}],
         "fillGeometry": [{"path": "M0 0L8 0L8 8L0 8Z"}]}
    ]},
    "branches": [{"key": "branch-key", "name": "redesign"}]
}"#;

const BRANCH: &str = r#"{"name": "Design System (redesign)", "document": {
    "id": "0:0", "type": "DOCUMENT", "children": [
        {"id": "1:1", "type": "ELLIPSE", "name": "Swatch"}
    ]}
}"#;

const VARIABLES: &str = r#"{"status": 200, "meta": {
    "variables": {
        "VariableID:1": {
            "id": "VariableID:1", "name": "Color/Accent", "variableCollectionId": "c1",
            "resolvedType": "COLOR",
            "valuesByMode": {"m1": {"r": 1, "g": 0, "b": 0, "a": 1}}
        }
    },
    "variableCollections": {
        "c1": {"id": "c1", "name": "Palette", "modes": [{"modeId": "m1", "name": "Default"}], "defaultModeId": "m1"}
    }
}}"#;

struct MockSource {
    files: HashMap<&'static str, &'static str>,
    variables: HashMap<&'static str, &'static str>,
    requests: RefCell<Vec<String>>,
}

impl MockSource {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            files: HashMap::from([("main-key", MAIN), ("branch-key", BRANCH)]),
            variables: HashMap::from([("main-key", VARIABLES)]),
            requests: RefCell::default(),
        })
    }

    fn lookup(
        &self,
        table: &HashMap<&'static str, &'static str>,
        kind: &str,
        key: &str,
    ) -> Result<String, DocumentError> {
        self.requests.borrow_mut().push(format!("{kind}:{key}"));
        table
            .get(key)
            .map(|json| json.to_string())
            .ok_or_else(|| DocumentError::Fetch(format!("404 for {key}")))
    }
}

impl DocumentSource for MockSource {
    fn fetch_file<'a>(&'a self, key: &'a str) -> LocalBoxFuture<'a, Result<String, DocumentError>> {
        future::ready(self.lookup(&self.files, "file", key)).boxed_local()
    }

    fn fetch_variables<'a>(
        &'a self,
        key: &'a str,
    ) -> LocalBoxFuture<'a, Result<String, DocumentError>> {
        async move { self.lookup(&self.variables, "variables", key) }.boxed_local()
    }
}

#[test]
fn test_load_defers_variable_fetch() {
    let source = MockSource::new();
    let document = pollster::block_on(Document::load(source.clone(), "main-key")).unwrap();

    assert_eq!(document.name(), Some("Design System"));
    assert!(!document.library().is_resolved());
    assert_eq!(*source.requests.borrow(), vec!["file:main-key"]);

    let variable = pollster::block_on(document.library().resolve("VariableID:1"))
        .unwrap()
        .unwrap();
    assert_eq!(
        variable.resolved_value().unwrap(),
        VariableValue::Color(Color::rgba(1.0, 0.0, 0.0, 1.0))
    );
    assert_eq!(
        *source.requests.borrow(),
        vec!["file:main-key", "variables:main-key"]
    );

    // a second resolution does not fetch again
    pollster::block_on(document.library().resolve_all()).unwrap();
    assert_eq!(source.requests.borrow().len(), 2);
}

#[test]
fn test_render_with_variables_after_resolution() {
    let source = MockSource::new();
    let document = pollster::block_on(Document::load(source, "main-key")).unwrap();
    let config = SvgConfig::new().with_reference_variables(true);

    // referencing variables needs a resolved library
    assert!(document.render_svg(document.root(), &config).is_err());

    pollster::block_on(document.library().resolve_all()).unwrap();
    let svg = document.render_svg(document.root(), &config).unwrap();
    assert!(svg.contains("fill: var(--Color--Accent, rgba(255, 0, 0, 1))"));
}

#[test]
fn test_custom_variable_names() {
    let source = MockSource::new();
    let document = pollster::block_on(Document::load(source, "main-key")).unwrap();
    pollster::block_on(document.library().resolve_all()).unwrap();

    let config = SvgConfig::new().with_reference_variables(true);
    let svg = document
        .renderer(&config)
        .with_name_resolver(|variable| format!("--ds-{}", variable.name.replace('/', "-").to_lowercase()))
        .render_to_string(document.root())
        .unwrap();
    assert!(svg.contains("fill: var(--ds-color-accent, rgba(255, 0, 0, 1))"));
}

#[test]
fn test_switch_to_branch() {
    let source = MockSource::new();
    let document = pollster::block_on(Document::load(source.clone(), "main-key")).unwrap();
    assert_eq!(document.branches()[0].name, "redesign");

    let branch = pollster::block_on(document.branch("redesign")).unwrap();
    assert_eq!(branch.name(), Some("Design System (redesign)"));
    let swatch = branch
        .query_selector(&Selector::new().field("name", "Swatch"))
        .unwrap();
    assert_eq!(branch.tree()[swatch].kind, NodeKind::Ellipse);

    // the branch has no variables of its own
    let err = pollster::block_on(branch.library().resolve_all()).unwrap_err();
    assert!(err.to_string().contains("404 for branch-key"));
}

#[test]
fn test_unknown_branch() {
    let source = MockSource::new();
    let document = pollster::block_on(Document::load(source, "main-key")).unwrap();
    let err = pollster::block_on(document.branch("nope")).unwrap_err();
    assert!(matches!(err, DocumentError::BranchNotFound(name) if name == "nope"));
}

#[test]
fn test_parsed_document_has_no_source() {
    let document = Document::parse(MAIN, VariableLibrary::empty()).unwrap();
    let err = pollster::block_on(document.branch("redesign")).unwrap_err();
    assert!(matches!(err, DocumentError::MissingContext));
}

#[test]
fn test_missing_file_is_a_fetch_error() {
    let source = MockSource::new();
    let err = pollster::block_on(Document::load(source, "missing")).unwrap_err();
    assert!(matches!(err, DocumentError::Fetch(message) if message == "404 for missing"));
}
