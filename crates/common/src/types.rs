//! Core types for CourseQA

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Page locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Ukrainian pages, served under `/ua/`
    #[serde(rename = "ua")]
    Primary,
    /// Russian-language pages, served under `/ua-ru/`
    #[serde(rename = "ua-ru")]
    Secondary,
}

impl Locale {
    /// Code used in the registry and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            Locale::Primary => "ua",
            Locale::Secondary => "ua-ru",
        }
    }

    /// Site home path for pages of this locale
    pub fn home_path(&self) -> &'static str {
        match self {
            Locale::Primary => "/ua/",
            Locale::Secondary => "/ua-ru/",
        }
    }

    /// Locale implied by a URL path
    pub fn from_path(path: &str) -> Self {
        if path.starts_with(Locale::Secondary.home_path()) {
            Locale::Secondary
        } else {
            Locale::Primary
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ua" => Ok(Locale::Primary),
            "ua-ru" => Ok(Locale::Secondary),
            other => Err(format!("unknown locale '{}' (expected ua or ua-ru)", other)),
        }
    }
}

/// Content a page is expected to show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedContent {
    /// Main heading text
    #[serde(default)]
    pub h1: Option<String>,

    /// Primary call-to-action label
    #[serde(default)]
    pub cta_text: Option<String>,

    /// Enrollment modal title
    #[serde(default)]
    pub modal_title: Option<String>,

    /// Enrollment form submit label
    #[serde(default)]
    pub submit_button_text: Option<String>,

    /// In-page anchors the navigation must resolve
    #[serde(default)]
    pub anchors: Vec<String>,

    /// Selector for the discount block when it differs from the default
    #[serde(default)]
    pub discount_section_selector: Option<String>,
}

/// Hidden field values of the footer lead form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZohoFooter {
    pub product_name: String,
    pub product_id: String,
    pub form_name: String,
    pub event_value: String,
}

/// A landing page under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    /// Unique short identifier, also the generated file stem
    pub key: String,

    /// Human-readable label
    pub name: String,

    /// Absolute page URL
    pub url: String,

    pub locale: Locale,

    #[serde(default)]
    pub expected: ExpectedContent,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoho_footer: Option<ZohoFooter>,
}

/// Page selection criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilter {
    /// Keep only pages of this locale
    #[serde(default)]
    pub locale: Option<Locale>,

    /// Keep only the page with this key
    #[serde(default)]
    pub key: Option<String>,
}

impl PageFilter {
    pub fn matches(&self, page: &PageDescriptor) -> bool {
        self.locale.map_or(true, |l| page.locale == l)
            && self.key.as_deref().map_or(true, |k| page.key == k)
    }
}
