use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use kube::api::DynamicObject;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, api::ListParams};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{CollectionId, RawObject, ResourceLister};

/// Timeout for connecting to K8s API
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading K8s API responses
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum retry attempts for transient failures
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (doubles each retry)
const RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Page size for paginated list requests
const PAGE_SIZE: u32 = 500;

/// Delay before retrying after failed attempt `attempt` (0-based); `None` after
/// the last attempt, when there is nothing left to wait for
fn backoff_delay(attempt: u32) -> Option<Duration> {
    (attempt + 1 < MAX_RETRIES).then(|| RETRY_BASE_DELAY * 2u32.pow(attempt))
}

/// Lists custom resources from a single cluster across all namespaces
#[derive(Clone)]
pub struct KubeLister {
    client: Client,
    cluster: String,
}

impl KubeLister {
    /// Connect using an explicit kubeconfig file, or infer the configuration
    /// (in-cluster service account, then `$KUBECONFIG` / `~/.kube/config`) when
    /// no path is given.
    pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Self> {
        let start = Instant::now();

        let mut config = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).with_context(|| {
                    format!("Failed to read kubeconfig: {}", path.display())
                })?;

                if let Some(ctx) = context
                    && !kubeconfig.contexts.iter().any(|c| c.name == ctx)
                {
                    return Err(anyhow!(
                        "Context '{}' not found in kubeconfig {}",
                        ctx,
                        path.display()
                    ));
                }

                Config::from_custom_kubeconfig(
                    kubeconfig,
                    &KubeConfigOptions {
                        context: context.map(String::from),
                        ..Default::default()
                    },
                )
                .await
                .with_context(|| format!("Failed to load kubeconfig: {}", path.display()))?
            }
            None if context.is_some() => Config::from_kubeconfig(&KubeConfigOptions {
                context: context.map(String::from),
                ..Default::default()
            })
            .await
            .context("Failed to load kubeconfig")?,
            None => Config::infer()
                .await
                .context("Failed to infer Kubernetes configuration")?,
        };

        // Set timeouts for reliability
        config.connect_timeout = Some(CONNECT_TIMEOUT);
        config.read_timeout = Some(READ_TIMEOUT);

        let cluster = config.cluster_url.to_string();
        let client = Client::try_from(config)
            .with_context(|| format!("Failed to create client for cluster '{}'", cluster))?;

        info!(
            cluster = %cluster,
            context = ?context,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Kubernetes client ready"
        );

        Ok(Self { client, cluster })
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// List all pages of a collection, following continue tokens
    async fn list_all_pages(
        &self,
        api: &Api<DynamicObject>,
        collection: &CollectionId,
    ) -> Result<Vec<DynamicObject>> {
        let mut all_items: Vec<DynamicObject> = Vec::new();
        let mut continue_token: Option<String> = None;
        let mut page_count = 0u32;

        loop {
            let mut params = ListParams::default().limit(PAGE_SIZE);
            if let Some(ref token) = continue_token {
                params = params.continue_token(token);
            }

            let list = self.list_page_with_retry(api, &params, collection).await?;

            let items_count = list.items.len();
            all_items.extend(list.items);
            page_count += 1;

            match list.metadata.continue_ {
                Some(token) if !token.is_empty() => {
                    debug!(
                        collection = %collection,
                        page = page_count,
                        items_this_page = items_count,
                        total_so_far = all_items.len(),
                        "Fetched page, continuing"
                    );
                    continue_token = Some(token);
                }
                _ => break,
            }
        }

        if page_count > 1 {
            debug!(
                collection = %collection,
                pages = page_count,
                total_items = all_items.len(),
                "Pagination complete"
            );
        }

        Ok(all_items)
    }

    /// Fetch a single page with retry logic
    async fn list_page_with_retry(
        &self,
        api: &Api<DynamicObject>,
        params: &ListParams,
        collection: &CollectionId,
    ) -> Result<kube::api::ObjectList<DynamicObject>> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match api.list(params).await {
                Ok(list) => return Ok(list),
                Err(e) => {
                    if !Self::is_retryable_error(&e) {
                        debug!(
                            collection = %collection,
                            cluster = %self.cluster,
                            error = %e,
                            "Non-retryable error"
                        );
                        return Err(anyhow!("K8s API error listing {}: {}", collection, e));
                    }

                    if let Some(delay) = backoff_delay(attempt) {
                        warn!(
                            collection = %collection,
                            cluster = %self.cluster,
                            attempt = attempt + 1,
                            max_attempts = MAX_RETRIES,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retryable error, backing off"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(anyhow!(
            "Failed to list {} after {} retries: {}",
            collection,
            MAX_RETRIES,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        ))
    }

    /// Check if an error is retryable (transient failures)
    fn is_retryable_error(err: &kube::Error) -> bool {
        match err {
            // Network/connection errors are retryable
            kube::Error::HyperError(_) => true,
            // API errors: retry on 429 (rate limit), 503 (unavailable), 504 (timeout)
            kube::Error::Api(api_err) => matches!(api_err.code, 429 | 503 | 504),
            _ => false,
        }
    }
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list(&self, collection: &CollectionId) -> Result<Vec<RawObject>> {
        let ar = collection.api_resource();
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &ar);

        debug!(
            collection = %collection,
            cluster = %self.cluster,
            kind = %collection.kind,
            "Listing custom resources across all namespaces"
        );

        let items = self.list_all_pages(&api, collection).await?;

        items
            .into_iter()
            .map(|item| {
                serde_json::to_value(item)
                    .map(RawObject::new)
                    .with_context(|| format!("Failed to convert {} object to JSON", collection))
            })
            .collect()
    }
}
