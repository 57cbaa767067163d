//! Topic spec files the generator reads

use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{GenError, GenResult};

/// A topic spec file and the group name it gets in generated files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecFileDescriptor {
    pub filename: &'static str,
    pub topic: &'static str,
}

impl SpecFileDescriptor {
    pub const fn new(filename: &'static str, topic: &'static str) -> Self {
        Self { filename, topic }
    }
}

/// Known topic files, in the order their groups appear in generated files
pub const SPEC_FILES: &[SpecFileDescriptor] = &[
    SpecFileDescriptor::new("01-smoke-sanity.cy.js", "Smoke / Sanity / SEO checks"),
    SpecFileDescriptor::new("02-header-navigation.cy.js", "Header / Menu / Navigation"),
    SpecFileDescriptor::new("03-language-switcher.cy.js", "Language switcher / Localization"),
    SpecFileDescriptor::new("04-hero-block.cy.js", "Hero block"),
    SpecFileDescriptor::new("05-modal-form.cy.js", "Modal \"Записатися на курс\" (форма)"),
    SpecFileDescriptor::new("06-benefits-section.cy.js", "Benefits section (#benefits)"),
    SpecFileDescriptor::new("07-about-section.cy.js", "About section (#about)"),
    SpecFileDescriptor::new("08-course-program.cy.js", "Course program (#program) - accordion"),
    SpecFileDescriptor::new("09-learning-format.cy.js", "Learning format (#format)"),
    SpecFileDescriptor::new("10-reviews.cy.js", "Reviews (#reviews)"),
    SpecFileDescriptor::new("11-pricing-section.cy.js", "Pricing section"),
    SpecFileDescriptor::new("12-footer.cy.js", "Footer"),
    SpecFileDescriptor::new("13-analytics-datalayer.cy.js", "Analytics / dataLayer"),
    SpecFileDescriptor::new("14-responsive-cross-browser.cy.js", "Responsive / Cross-browser checks"),
    SpecFileDescriptor::new("15-accessibility.cy.js", "Accessibility checks"),
    SpecFileDescriptor::new("16-discount-section.cy.js", "Discount section"),
];

/// A spec file as read from disk
#[derive(Debug, Clone)]
pub struct SpecSource {
    pub descriptor: SpecFileDescriptor,
    pub path: PathBuf,
    /// `None` when the file does not exist
    pub text: Option<String>,
}

impl SpecSource {
    /// Read one spec file. A missing file is reported as
    /// [`GenError::MissingSpecFile`]; other read failures as I/O errors.
    pub fn read(dir: &Path, descriptor: SpecFileDescriptor) -> GenResult<Self> {
        let path = dir.join(descriptor.filename);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Self {
                descriptor,
                path,
                text: Some(text),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(GenError::MissingSpecFile { path }),
            Err(e) => Err(GenError::Io(e)),
        }
    }

    pub fn missing(dir: &Path, descriptor: SpecFileDescriptor) -> Self {
        Self {
            descriptor,
            path: dir.join(descriptor.filename),
            text: None,
        }
    }
}
