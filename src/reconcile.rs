use crate::config::Config;
use crate::error::TransifexError;
use crate::filter::ProjectFilter;
use crate::languages::{
    survey, ExclusionMode, GlobalLanguageSet, LanguageExclusion, LanguageSurvey,
};
use crate::transifex::{Language, Project, TranslationService};
use tracing::{info, warn};

/// Matching projects with their enabled languages, as listed remotely
#[derive(Debug, Clone, Default)]
pub struct Scan {
    /// Projects in the organization, matching or not
    pub projects_total: usize,
    pub entries: Vec<(Project, Vec<Language>)>,
}

/// Languages one project is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPlan {
    pub project: Project,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAddition {
    pub project: String,
    pub language_id: String,
    pub error: String,
}

/// Outcome of a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub projects_total: usize,
    pub projects_matched: usize,
    pub global: GlobalLanguageSet,
    pub planned: usize,
    pub added: usize,
    pub failures: Vec<FailedAddition>,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// List the organization's projects and fetch languages of those matching the filter.
/// Any listing failure aborts the scan.
pub async fn scan<S>(service: &S, filter: &ProjectFilter) -> Result<Scan, TransifexError>
where
    S: TranslationService + ?Sized,
{
    let projects = service.list_projects().await?;
    let projects_total = projects.len();

    let mut entries = Vec::new();
    for project in projects.into_iter().filter(|p| filter.matches(&p.name)) {
        let languages = service.list_languages(&project).await?;
        entries.push((project, languages));
    }

    info!(
        "{} of {} projects match prefixes {:?}",
        entries.len(),
        projects_total,
        filter.prefixes()
    );

    Ok(Scan {
        projects_total,
        entries,
    })
}

/// Missing languages per matching project, in listing order
pub fn plan(entries: &[(Project, Vec<Language>)], survey: &LanguageSurvey) -> Vec<ProjectPlan> {
    entries
        .iter()
        .map(|(project, _)| ProjectPlan {
            project: project.clone(),
            missing: survey
                .missing_for(&project.name)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

/// Bring every matching project up to the global language set.
///
/// Listing errors abort the run. A failed addition is logged and recorded,
/// and the remaining additions still go ahead.
pub async fn sync<S>(service: &S, config: &Config) -> Result<SyncReport, TransifexError>
where
    S: TranslationService + ?Sized,
{
    let scan = scan(service, &config.project_filter).await?;

    let exclusion = LanguageExclusion::new(config.exclusion_mode, &config.excluded_language);
    let survey = survey(&scan.entries, &exclusion);

    info!("Global language set: {:?}", survey.global);
    if !survey.excluded.is_empty() {
        info!("Excluded from global set: {:?}", survey.excluded);
    }
    if config.exclusion_mode == ExclusionMode::Legacy
        && survey.global.iter().any(|id| exclusion.matches_id(id))
    {
        warn!(
            "Locale '{}' is in the global set and will be propagated (exclusion mode is legacy; set TX_EXCLUSION_MODE=enforce to skip it)",
            config.excluded_language
        );
    }

    let plans = plan(&scan.entries, &survey);
    let mut report = SyncReport {
        projects_total: scan.projects_total,
        projects_matched: scan.entries.len(),
        global: survey.global.clone(),
        planned: plans.iter().map(|p| p.missing.len()).sum(),
        dry_run: config.dry_run,
        ..Default::default()
    };

    for ProjectPlan { project, missing } in &plans {
        info!("{}", project.name);

        for language_id in missing {
            info!("Language {} missing from {}", language_id, project.name);
            if config.dry_run {
                continue;
            }

            match service.add_language(project, language_id).await {
                Ok(()) => report.added += 1,
                Err(e) => {
                    warn!("✗ Failed to add {} to {}: {}", language_id, project.name, e);
                    report.failures.push(FailedAddition {
                        project: project.name.clone(),
                        language_id: language_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    info!(
        "Sync complete: {} missing, {} added, {} failed{}",
        report.planned,
        report.added,
        report.failures.len(),
        if report.dry_run { " (dry run)" } else { "" }
    );

    Ok(report)
}
