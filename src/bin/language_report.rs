//! Language report binary - shows which languages each matching project is
//! missing, without changing anything on Transifex
//!
//! Usage:
//!   cargo run --bin language-report            # Table for humans
//!   cargo run --bin language-report -- --json  # Machine readable report
//!
//! Required environment variables:
//! - TX_TOKEN
//!
//! Optional:
//! - TX_ORGANIZATION (defaults to hisp-uio)
//! - TX_PROJECT_PREFIXES (defaults to ANDR,APP-,APP:)
//! - TX_EXCLUDED_LANGUAGE / TX_EXCLUSION_MODE (defaults to uz / legacy)

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use tx_language_sync::{
    config::Config,
    languages::{survey, LanguageExclusion},
    reconcile::{plan, scan, ProjectPlan},
    transifex::TransifexClient,
};

#[derive(Debug, Serialize)]
struct Report {
    generated_at: String,
    organization: String,
    projects_total: usize,
    global: Vec<String>,
    excluded: Vec<String>,
    projects: Vec<ProjectRow>,
}

#[derive(Debug, Serialize)]
struct ProjectRow {
    name: String,
    enabled: usize,
    missing: Vec<String>,
}

impl ProjectRow {
    fn new(plan: &ProjectPlan, enabled: usize) -> Self {
        Self {
            name: plan.project.name.clone(),
            enabled,
            missing: plan.missing.clone(),
        }
    }
}

fn render_table(report: &Report) -> String {
    let width = report
        .projects
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Project".len());

    let mut out = String::new();
    out.push_str(&format!(
        "Organization: {}  ({})\n",
        report.organization, report.generated_at
    ));
    out.push_str(&format!(
        "Matching projects: {} of {}\n",
        report.projects.len(),
        report.projects_total
    ));
    out.push_str(&format!(
        "Global language set ({}): {}\n",
        report.global.len(),
        report.global.join(", ")
    ));
    if !report.excluded.is_empty() {
        out.push_str(&format!("Excluded: {}\n", report.excluded.join(", ")));
    }
    out.push('\n');
    out.push_str(&format!(
        "{:<width$}  {:>7}  Missing\n",
        "Project",
        "Enabled",
        width = width
    ));
    for row in &report.projects {
        let missing = if row.missing.is_empty() {
            "-".to_string()
        } else {
            row.missing.join(", ")
        };
        out.push_str(&format!(
            "{:<width$}  {:>7}  {}\n",
            row.name,
            row.enabled,
            missing,
            width = width
        ));
    }
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("language_report=info".parse()?)
                .add_directive("tx_language_sync=info".parse()?),
        )
        .init();

    let as_json = std::env::args().any(|arg| arg == "--json");

    let config = Config::from_env()?;
    let client = TransifexClient::new(&config).context("Failed to build Transifex client")?;

    info!("Scanning projects of {}...", client.organization());
    let scan = scan(&client, &config.project_filter)
        .await
        .context("Failed to list projects and languages")?;

    let exclusion = LanguageExclusion::new(config.exclusion_mode, &config.excluded_language);
    let survey = survey(&scan.entries, &exclusion);

    let projects = plan(&scan.entries, &survey)
        .iter()
        .map(|p| {
            let enabled = survey
                .project_languages
                .get(&p.project.name)
                .map_or(0, |set| set.len());
            ProjectRow::new(p, enabled)
        })
        .collect();

    let report = Report {
        generated_at: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        organization: client.organization().to_string(),
        projects_total: scan.projects_total,
        global: survey.global.iter().cloned().collect(),
        excluded: survey.excluded.iter().cloned().collect(),
        projects,
    };

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print!("{}", render_table(&report));
    }

    Ok(())
}
