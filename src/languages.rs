//! Language aggregation across projects.
//!
//! Given each matching project with its enabled languages, [`survey`] builds
//! the per-project language sets and the global union that every project
//! should end up with. Language ids (`l:fr`) are the set members throughout.

use crate::transifex::{language_id, Language, Project};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Project name -> ids of the languages enabled on it
pub type ProjectLanguages = BTreeMap<String, BTreeSet<String>>;

/// Ids of every language that should be enabled on all matching projects
pub type GlobalLanguageSet = BTreeSet<String>;

/// How the excluded locale is treated when building the global set.
///
/// The long-standing behaviour of this sync never actually dropped the
/// excluded locale (its check could not match), so `Legacy` keeps it in the
/// global set. `Enforce` leaves it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExclusionMode {
    #[default]
    Legacy,
    Enforce,
}

impl FromStr for ExclusionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "enforce" => Ok(Self::Enforce),
            other => Err(format!(
                "unknown exclusion mode '{}', expected 'legacy' or 'enforce'",
                other
            )),
        }
    }
}

impl fmt::Display for ExclusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Enforce => write!(f, "enforce"),
        }
    }
}

/// The locale kept out of the global set, and whether that is enforced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageExclusion {
    pub mode: ExclusionMode,
    /// Bare locale code, e.g. `uz`
    pub code: String,
}

impl LanguageExclusion {
    pub fn new(mode: ExclusionMode, code: impl Into<String>) -> Self {
        Self {
            mode,
            code: code.into(),
        }
    }

    /// Whether a language is the excluded locale, regardless of mode
    pub fn matches(&self, language: &Language) -> bool {
        language.code == self.code || self.matches_id(&language.id)
    }

    pub fn matches_id(&self, id: &str) -> bool {
        id == language_id(&self.code)
    }

    /// Whether a language is kept out of the global set
    pub fn excludes(&self, language: &Language) -> bool {
        self.mode == ExclusionMode::Enforce && self.matches(language)
    }
}

/// Per-project and global language sets for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageSurvey {
    pub project_languages: ProjectLanguages,
    pub global: GlobalLanguageSet,
    /// Ids that were seen but left out of `global` by the exclusion
    pub excluded: BTreeSet<String>,
}

impl LanguageSurvey {
    /// Languages from the global set that a project does not have yet.
    /// Projects absent from the survey are missing everything.
    pub fn missing_for(&self, project_name: &str) -> Vec<&str> {
        let enabled = self.project_languages.get(project_name);
        self.global
            .iter()
            .filter(|id| enabled.map_or(true, |set| !set.contains(*id)))
            .map(String::as_str)
            .collect()
    }
}

/// Build the language survey from each project's enabled languages.
///
/// Every language lands in its project's set; it lands in the global set
/// unless the exclusion applies. A project name listed twice keeps the
/// languages of its last listing.
pub fn survey(
    entries: &[(Project, Vec<Language>)],
    exclusion: &LanguageExclusion,
) -> LanguageSurvey {
    let mut result = LanguageSurvey::default();

    for (project, languages) in entries {
        let mut enabled = BTreeSet::new();

        for language in languages {
            enabled.insert(language.id.clone());

            if exclusion.excludes(language) {
                result.excluded.insert(language.id.clone());
            } else {
                result.global.insert(language.id.clone());
            }
        }

        result
            .project_languages
            .insert(project.name.clone(), enabled);
    }

    result
}
