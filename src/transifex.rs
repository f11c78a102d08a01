use crate::config::Config;
use crate::error::{ConfigError, TransifexError};
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const JSON_API: &str = "application/vnd.api+json";

/// A Transifex project, as far as language sync cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project id, e.g. `o:hisp-uio:p:android-capture-app`
    pub id: String,
    pub name: String,
}

/// A language enabled on a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language id, e.g. `l:fr`. This is the value kept in language sets.
    pub id: String,
    /// Bare locale code, e.g. `fr`
    pub code: String,
    pub name: Option<String>,
}

/// Turn a bare locale code into a Transifex language id (`fr` -> `l:fr`)
pub fn language_id(code: &str) -> String {
    if code.starts_with("l:") {
        code.to_string()
    } else {
        format!("l:{}", code)
    }
}

/// Turn an organization slug into a Transifex organization id
pub fn organization_id(slug: &str) -> String {
    if slug.starts_with("o:") {
        slug.to_string()
    } else {
        format!("o:{}", slug)
    }
}

/// The remote operations language sync needs
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// All projects of the configured organization
    async fn list_projects(&self) -> Result<Vec<Project>, TransifexError>;

    /// Languages currently enabled on a project
    async fn list_languages(&self, project: &Project) -> Result<Vec<Language>, TransifexError>;

    /// Enable one language (by id) on a project
    async fn add_language(&self, project: &Project, language_id: &str)
        -> Result<(), TransifexError>;
}

// ==================== JSON:API payloads ====================

#[derive(Debug, Deserialize)]
struct Page<A> {
    data: Vec<Resource<A>>,
    #[serde(default)]
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
struct Resource<A> {
    id: String,
    attributes: A,
}

#[derive(Debug, Deserialize)]
struct Links {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectAttributes {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LanguageAttributes {
    code: String,
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct RelationshipRequest<'a> {
    data: Vec<Identifier<'a>>,
}

#[derive(Debug, Serialize)]
struct Identifier<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    id: &'a str,
}

// ==================== Client ====================

/// Transifex REST API v3 client
#[derive(Debug, Clone)]
pub struct TransifexClient {
    http: reqwest::Client,
    base_url: String,
    organization: String,
    token: String,
    retry: RetryConfig,
}

impl TransifexClient {
    pub fn new(config: &Config) -> Result<Self, TransifexError> {
        if config.api_token.trim().is_empty() {
            return Err(ConfigError::Missing("TX_TOKEN").into());
        }

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            organization: organization_id(&config.organization),
            token: config.api_token.clone(),
            retry: RetryConfig::api_call(),
        })
    }

    /// Override the retry policy (tests use short delays)
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    /// Fetch one page, retrying transient failures
    async fn get_page<A: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Page<A>, TransifexError> {
        with_retry_if(
            &self.retry,
            &format!("GET {}", url),
            || async {
                let response = self
                    .http
                    .get(url)
                    .bearer_auth(&self.token)
                    .header("Accept", JSON_API)
                    .query(query)
                    .send()
                    .await?;
                read_json(response, url).await
            },
            TransifexError::is_retryable,
        )
        .await
    }

    /// Follow `links.next` until the collection is exhausted
    async fn get_all<A: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Resource<A>>, TransifexError> {
        let mut resources = Vec::new();
        let mut page: Page<A> = self.get_page(url, query).await?;

        loop {
            resources.extend(page.data);
            match page.links.and_then(|l| l.next) {
                Some(next) => {
                    debug!("Following pagination link {}", next);
                    // The next link already carries the first request's query
                    page = self.get_page(&next, &[]).await?;
                }
                None => break,
            }
        }

        Ok(resources)
    }
}

#[async_trait]
impl TranslationService for TransifexClient {
    async fn list_projects(&self) -> Result<Vec<Project>, TransifexError> {
        let url = format!("{}/projects", self.base_url);
        let resources: Vec<Resource<ProjectAttributes>> = self
            .get_all(&url, &[("filter[organization]", self.organization.as_str())])
            .await?;

        info!(
            "Fetched {} projects for {}",
            resources.len(),
            self.organization
        );

        Ok(resources
            .into_iter()
            .map(|r| Project {
                id: r.id,
                name: r.attributes.name,
            })
            .collect())
    }

    async fn list_languages(&self, project: &Project) -> Result<Vec<Language>, TransifexError> {
        let url = format!("{}/projects/{}/languages", self.base_url, project.id);
        let resources: Vec<Resource<LanguageAttributes>> = self.get_all(&url, &[]).await?;

        Ok(resources
            .into_iter()
            .map(|r| Language {
                id: r.id,
                code: r.attributes.code,
                name: r.attributes.name,
            })
            .collect())
    }

    async fn add_language(
        &self,
        project: &Project,
        language_id: &str,
    ) -> Result<(), TransifexError> {
        let url = format!(
            "{}/projects/{}/relationships/languages",
            self.base_url, project.id
        );
        let payload = serde_json::to_vec(&RelationshipRequest {
            data: vec![Identifier {
                kind: "languages",
                id: language_id,
            }],
        })
        .map_err(|e| TransifexError::Decode {
            url: url.clone(),
            reason: format!("failed to encode request: {}", e),
        })?;

        with_retry_if(
            &self.retry,
            &format!("Add {} to {}", language_id, project.name),
            || async {
                let response = self
                    .http
                    .post(&url)
                    .bearer_auth(&self.token)
                    .header("Accept", JSON_API)
                    .header("Content-Type", JSON_API)
                    .body(payload.clone())
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    return Err(TransifexError::from_status(status.as_u16(), &url, body));
                }
                Ok(())
            },
            TransifexError::is_retryable,
        )
        .await
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
) -> Result<T, TransifexError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        return Err(TransifexError::from_status(status.as_u16(), url, body));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| TransifexError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
