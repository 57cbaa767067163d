//! End-to-end generation runs against scratch directories

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use courseqa_common::{Error, Locale};
use courseqa_e2e::{GenError, Generator, GeneratorConfig, SpecFileDescriptor, SPEC_FILES};

const TWO_PAGES: &str = r#"[
  { "key": "a", "name": "Course A", "url": "https://example.org/ua/a/", "locale": "ua",
    "expected": { "h1": "Course A" } },
  { "key": "b", "name": "Course B", "url": "https://example.org/ua-ru/b/", "locale": "ua-ru" }
]"#;

const HERO_SPEC: &str = r#"/// <reference types="cypress" />

const pages = require('../fixtures/pages.json');

describe('[a] Hero block', () => {
  beforeEach(() => {
    cy.viewport(1280, 720);
    cy.visit(page.url);
  });

  it('shows the heading', () => {
    cy.get('h1').should('contain', 'ASSERT_A');
  });
});

describe('[c] Hero block', () => {
  it('belongs to another page', () => {
    cy.get('h1').should('contain', 'ASSERT_C');
  });
});
"#;

const FOOTER_SPEC: &str = r#"
targetPages.forEach((page) => {
  describe(`[${page.key}] Footer`, () => {
    beforeEach(() => {
      cy.visit(page.url);
    });

    it('has footer', () => {
      cy.get('footer').should('be.visible');
    });
  });
});
"#;

struct Workspace {
    _dir: TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new(registry: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("specs")).expect("create specs dir");
        fs::write(root.join("pages.json"), registry).expect("write registry");
        Self { _dir: dir, root }
    }

    fn spec(&self, name: &str, text: &str) -> &Self {
        fs::write(self.root.join("specs").join(name), text).expect("write spec");
        self
    }

    fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            registry_path: self.root.join("pages.json"),
            specs_dir: self.root.join("specs"),
            output_dir: self.root.join("out"),
            ..Default::default()
        }
    }

    fn out(&self) -> PathBuf {
        self.root.join("out")
    }

    fn read_out(&self, name: &str) -> String {
        fs::read_to_string(self.out().join(name)).expect("read generated file")
    }
}

fn topics(names: &[&str]) -> Vec<SpecFileDescriptor> {
    SPEC_FILES
        .iter()
        .copied()
        .filter(|d| names.contains(&d.filename))
        .collect()
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("list dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn tagged_group_goes_to_its_page_and_others_get_placeholders() {
    let ws = Workspace::new(TWO_PAGES);
    ws.spec("04-hero-block.cy.js", HERO_SPEC);

    let report = Generator::new(ws.config())
        .with_spec_files(topics(&["04-hero-block.cy.js"]))
        .run()
        .expect("generation succeeds");

    assert_eq!(report.total(), 2);
    assert_eq!(listing(&ws.out()), vec!["a.cy.js", "b.cy.js"]);

    let a = ws.read_out("a.cy.js");
    assert!(a.contains("cy.get('h1').should('contain', 'ASSERT_A');"));
    assert!(!a.contains("ASSERT_C"));
    assert_eq!(a.matches("cy.visit(page.url);").count(), 1, "duplicated page hook is dropped");
    assert!(a.contains("  describe('Hero block', () => {\n    it('shows the heading', () => {"));

    let b = ws.read_out("b.cy.js");
    assert!(!b.contains("ASSERT_A"));
    assert!(b.contains("// Note: Tests from 04-hero-block.cy.js need to be manually integrated"));

    assert!(report.pages[0].is_complete());
    assert_eq!(report.pages[1].placeholders, 1);
    assert_eq!(report.degraded_pages(), 1);
    assert!(report.warnings.iter().any(|w| w.contains("[b] 04-hero-block.cy.js")));
}

#[test]
fn every_page_gets_a_file_even_without_any_spec_sources() {
    let ws = Workspace::new(TWO_PAGES);

    let report = Generator::new(ws.config()).run().expect("generation succeeds");

    assert_eq!(listing(&ws.out()), vec!["a.cy.js", "b.cy.js"]);
    let b = ws.read_out("b.cy.js");
    assert_eq!(b.matches("was not found, no tests generated").count(), SPEC_FILES.len());
    assert_eq!(report.pages[1].placeholders, SPEC_FILES.len());
    // One warning per missing topic file, not per page.
    assert_eq!(
        report.warnings.iter().filter(|w| w.starts_with("Spec file not found")).count(),
        SPEC_FILES.len()
    );
}

#[test]
fn fallback_template_is_marked_and_unwrapped() {
    let ws = Workspace::new(TWO_PAGES);
    ws.spec("12-footer.cy.js", FOOTER_SPEC);

    let report = Generator::new(ws.config())
        .with_spec_files(topics(&["12-footer.cy.js"]))
        .run()
        .expect("generation succeeds");

    let a = ws.read_out("a.cy.js");
    assert!(a.contains("    // Fallback template from 12-footer.cy.js"));
    assert!(a.contains("    it('has footer', () => {\n      cy.get('footer').should('be.visible');\n    });"));
    assert!(!a.contains("targetPages.forEach"));
    assert!(!a.contains("describe(`[${page.key}] Footer`"));
    assert_eq!(report.pages[0].fallback, 1);
}

#[test]
fn nested_braces_are_extracted_whole() {
    let ws = Workspace::new(TWO_PAGES);
    ws.spec(
        "11-pricing-section.cy.js",
        r#"
describe('[a] Pricing section', () => {
  it('shows a price', () => {
    cy.get('.price').then(($price) => {
      if ($price.length > 0) {
        const text = $price.text().replace(/[{}]/g, '');
        expect(text, '} is not a terminator').to.match(/\d/);
      }
    });
    cy.get('.currency').should('contain', 'AFTER_NESTED_BLOCK');
  });
});
"#,
    );

    Generator::new(ws.config())
        .with_spec_files(topics(&["11-pricing-section.cy.js"]))
        .run()
        .expect("generation succeeds");

    let a = ws.read_out("a.cy.js");
    assert!(a.contains("AFTER_NESTED_BLOCK"));
    assert!(a.contains("      if ($price.length > 0) {"));
}

#[test]
fn regeneration_is_byte_identical() {
    let ws = Workspace::new(TWO_PAGES);
    ws.spec("04-hero-block.cy.js", HERO_SPEC)
        .spec("12-footer.cy.js", FOOTER_SPEC);

    let generator = Generator::new(ws.config());
    generator.run().expect("first run");
    let first = (ws.read_out("a.cy.js"), ws.read_out("b.cy.js"));
    generator.run().expect("second run");
    let second = (ws.read_out("a.cy.js"), ws.read_out("b.cy.js"));

    assert_eq!(first, second);
}

#[test]
fn malformed_registry_aborts_without_touching_output() {
    let ws = Workspace::new(r#"{ "key": "a", "name": "A" }"#);
    fs::create_dir_all(ws.out()).expect("create out");
    fs::write(ws.out().join("notes.txt"), "keep me").expect("write unrelated file");

    let err = Generator::new(ws.config()).run().unwrap_err();

    assert!(matches!(err, GenError::Registry(Error::MalformedRegistry { .. })));
    assert_eq!(listing(&ws.out()), vec!["notes.txt"]);
    assert_eq!(fs::read_to_string(ws.out().join("notes.txt")).unwrap(), "keep me");
}

#[test]
fn malformed_registry_does_not_create_output_dir() {
    let ws = Workspace::new("not json");
    assert!(Generator::new(ws.config()).run().is_err());
    assert!(!ws.out().exists());
}

#[test]
fn unrelated_output_files_survive_and_stale_page_file_is_overwritten() {
    let ws = Workspace::new(TWO_PAGES);
    fs::create_dir_all(ws.out()).expect("create out");
    fs::write(ws.out().join("_helpers.js"), "module.exports = {};").expect("write helpers");
    fs::write(ws.out().join("a.cy.js"), "stale").expect("write stale");

    Generator::new(ws.config()).run().expect("generation succeeds");

    assert_eq!(listing(&ws.out()), vec!["_helpers.js", "a.cy.js", "b.cy.js"]);
    assert_eq!(
        fs::read_to_string(ws.out().join("_helpers.js")).unwrap(),
        "module.exports = {};"
    );
    assert!(ws.read_out("a.cy.js").starts_with("/// <reference types=\"cypress\" />"));
}

#[test]
fn unwritable_page_file_is_reported_and_other_pages_still_written() {
    let ws = Workspace::new(TWO_PAGES);
    fs::create_dir_all(ws.out().join("a.cy.js")).expect("block a.cy.js with a directory");

    let report = Generator::new(ws.config()).run().expect("generation completes");

    assert_eq!(report.total(), 2);
    assert!(!report.pages[0].written);
    assert!(report.pages[1].written);
    assert!(ws.read_out("b.cy.js").starts_with("/// <reference types=\"cypress\" />"));
    assert!(report.warnings.iter().any(|w| w.starts_with("[a] cannot write")));
}

#[test]
fn locale_filter_limits_pages() {
    let ws = Workspace::new(TWO_PAGES);
    let config = GeneratorConfig {
        locale: Some(Locale::Secondary),
        ..ws.config()
    };

    let report = Generator::new(config).run().expect("generation succeeds");

    assert_eq!(report.total(), 1);
    assert_eq!(listing(&ws.out()), vec!["b.cy.js"]);
}

#[test]
fn dry_run_writes_nothing() {
    let ws = Workspace::new(TWO_PAGES);
    let config = GeneratorConfig {
        dry_run: true,
        ..ws.config()
    };

    let report = Generator::new(config).run().expect("generation succeeds");

    assert_eq!(report.total(), 2);
    assert!(report.pages.iter().all(|p| !p.written));
    assert!(!ws.out().exists());
}
