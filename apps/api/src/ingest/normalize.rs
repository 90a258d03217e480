//! Per-provider normalizers: map each listing API's record shape into
//! `NormalizedJob`. One function per provider; `providers::fetch_provider`
//! picks the function from the `Provider` tag.

use serde_json::Value;

use crate::ingest::client::FetchError;
use crate::models::greenhouse::GreenhouseCompany;
use crate::models::job::{JobStatus, JobTag, NewJobPosting};

pub const DEFAULT_LOCATION: &str = "Remote";
pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_COMPANY: &str = "Unknown";

/// Common record shape every provider is mapped into.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub logo_url: Option<String>,
    pub status: JobStatus,
    pub tag: JobTag,
}

impl NormalizedJob {
    pub fn into_new_posting(self, actor: &str) -> NewJobPosting {
        NewJobPosting {
            title: self.title,
            company: self.company,
            location: self.location,
            description: self.description,
            status: self.status,
            tag: Some(self.tag),
            logo_url: self.logo_url,
            inserting_user_id: actor.to_string(),
        }
    }
}

/// Raw field values picked from a provider record, before defaults.
#[derive(Debug, Default)]
struct RawFields {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
    logo_url: Option<String>,
    is_match: bool,
}

impl RawFields {
    fn finish(self) -> NormalizedJob {
        NormalizedJob {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            company: self.company.unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
            location: self.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            description: self.description.unwrap_or_default(),
            logo_url: self.logo_url,
            status: JobStatus::Open,
            tag: if self.is_match {
                JobTag::Match
            } else {
                JobTag::Recommended
            },
        }
    }
}

/// RemoteOK: a top-level array whose first element is a legal notice.
pub fn normalize_remoteok(body: &Value) -> Result<Vec<NormalizedJob>, FetchError> {
    let records = body
        .as_array()
        .ok_or_else(|| FetchError::Shape("remoteok: expected a JSON array".to_string()))?;

    Ok(records
        .iter()
        .filter(|r| r.is_object() && r.get("legal").is_none())
        .map(|r| {
            RawFields {
                title: first_text(r, &["position", "title", "name"]),
                company: first_text(r, &["company", "company_name"]),
                location: first_text(r, &["location"]),
                description: first_text(r, &["description"]),
                logo_url: first_text(r, &["company_logo", "logo"]),
                is_match: indicates_match(r),
            }
            .finish()
        })
        .collect())
}

/// Remotive: `{ "jobs": [...] }`.
pub fn normalize_remotive(body: &Value) -> Result<Vec<NormalizedJob>, FetchError> {
    let records = jobs_array(body, "remotive")?;

    Ok(records
        .iter()
        .map(|r| {
            RawFields {
                title: first_text(r, &["title", "position", "name"]),
                company: first_text(r, &["company_name", "company"]),
                location: first_text(r, &["candidate_required_location", "location"]),
                description: first_text(r, &["description"]),
                logo_url: first_text(r, &["company_logo", "company_logo_url"]),
                is_match: indicates_match(r),
            }
            .finish()
        })
        .collect())
}

/// Greenhouse board API: `{ "jobs": [...] }` for one company. The board
/// does not name the company, so the configured display name is used.
pub fn normalize_greenhouse(
    body: &Value,
    company: &GreenhouseCompany,
) -> Result<Vec<NormalizedJob>, FetchError> {
    let records = jobs_array(body, "greenhouse")?;
    let company_name = non_empty(&company.name).or_else(|| non_empty(&company.handle));

    Ok(records
        .iter()
        .map(|r| {
            let location = r
                .pointer("/location/name")
                .and_then(|v| v.as_str())
                .and_then(non_empty)
                .or_else(|| first_text(r, &["location"]));
            RawFields {
                title: first_text(r, &["title", "name"]),
                company: company_name.clone(),
                location,
                description: first_text(r, &["content", "description"]),
                logo_url: None,
                is_match: indicates_match(r),
            }
            .finish()
        })
        .collect())
}

fn jobs_array<'a>(body: &'a Value, provider: &str) -> Result<&'a Vec<Value>, FetchError> {
    body.get("jobs")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FetchError::Shape(format!("{provider}: expected a \"jobs\" array")))
}

/// First non-blank string among `keys`, trimmed.
fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| record.get(*k).and_then(|v| v.as_str()))
        .find_map(non_empty)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn indicates_match(record: &Value) -> bool {
    record.get("tag").and_then(|v| v.as_str()) == Some("MATCH")
}
