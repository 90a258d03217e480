use tracing::{info, warn};

use crate::ingest::client::{FetchError, ListingClient};
use crate::ingest::normalize::{
    normalize_greenhouse, normalize_remoteok, normalize_remotive, NormalizedJob,
};
use crate::store::JobBoardStore;

pub const REMOTEOK_URL: &str = "https://remoteok.com/api";
pub const REMOTIVE_URL: &str = "https://remotive.com/api/remote-jobs";
pub const GREENHOUSE_BASE_URL: &str = "https://boards-api.greenhouse.io/v1/boards";

/// The external listing sources, polled in `ALL` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    RemoteOk,
    Remotive,
    Greenhouse,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::RemoteOk, Provider::Remotive, Provider::Greenhouse];

    /// Key of this provider's `SourceFetchLog` row.
    pub fn source_name(self) -> &'static str {
        match self {
            Provider::RemoteOk => "remoteok",
            Provider::Remotive => "remotive",
            Provider::Greenhouse => "greenhouse",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub remoteok_url: String,
    pub remotive_url: String,
    pub greenhouse_base_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            remoteok_url: REMOTEOK_URL.to_string(),
            remotive_url: REMOTIVE_URL.to_string(),
            greenhouse_base_url: GREENHOUSE_BASE_URL.to_string(),
        }
    }
}

impl ProviderEndpoints {
    pub fn greenhouse_board_url(&self, handle: &str) -> String {
        format!(
            "{}/{}/jobs?content=true",
            self.greenhouse_base_url.trim_end_matches('/'),
            handle
        )
    }
}

/// Records fetched from one provider, plus warnings for sub-requests that
/// failed without failing the provider as a whole.
#[derive(Debug, Default)]
pub struct ProviderFetch {
    pub records: Vec<NormalizedJob>,
    pub warnings: Vec<String>,
}

pub async fn fetch_provider(
    provider: Provider,
    client: &dyn ListingClient,
    store: &dyn JobBoardStore,
    endpoints: &ProviderEndpoints,
) -> Result<ProviderFetch, FetchError> {
    match provider {
        Provider::RemoteOk => {
            let body = client.get_json(&endpoints.remoteok_url).await?;
            Ok(ProviderFetch {
                records: normalize_remoteok(&body)?,
                warnings: Vec::new(),
            })
        }
        Provider::Remotive => {
            let body = client.get_json(&endpoints.remotive_url).await?;
            Ok(ProviderFetch {
                records: normalize_remotive(&body)?,
                warnings: Vec::new(),
            })
        }
        Provider::Greenhouse => {
            let companies = store.list_greenhouse_companies().await?;
            info!("Polling {} Greenhouse boards", companies.len());

            let mut fetch = ProviderFetch::default();
            for company in &companies {
                let url = endpoints.greenhouse_board_url(&company.handle);
                let result = match client.get_json(&url).await {
                    Ok(body) => normalize_greenhouse(&body, company),
                    Err(e) => Err(e),
                };
                match result {
                    Ok(mut records) => fetch.records.append(&mut records),
                    Err(e) => {
                        warn!("Greenhouse board '{}' failed: {e}", company.handle);
                        fetch
                            .warnings
                            .push(format!("greenhouse/{}: {e}", company.handle));
                    }
                }
            }
            Ok(fetch)
        }
    }
}
