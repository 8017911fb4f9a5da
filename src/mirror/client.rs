use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;

use super::config::*;
use crate::errors::CatalogError;

/// Fixed, ordered pool of interchangeable mirror base URLs.
#[derive(Debug, Clone)]
pub struct MirrorPool {
    mirrors: Vec<String>,
}

impl MirrorPool {
    pub fn new(mirrors: Vec<String>) -> Self {
        let mirrors = mirrors
            .into_iter()
            .map(|m| m.trim_end_matches('/').to_string())
            .collect();
        Self { mirrors }
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }

    /// Candidate order for one request: the known-good head keeps its
    /// configured position, the tail is shuffled.
    pub fn candidate_order(&self, rng: &mut StdRng) -> Vec<String> {
        let mut order = self.mirrors.clone();
        if order.len() > KNOWN_GOOD_MIRRORS {
            order[KNOWN_GOOD_MIRRORS..].shuffle(rng);
        }
        order
    }
}

impl Default for MirrorPool {
    fn default() -> Self {
        Self::new(DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect())
    }
}

/// Resilient fetch across the mirror pool.
///
/// Mirrors are tried sequentially; a request fails only once every mirror
/// has exhausted its retry budget.
pub struct MirrorClient {
    pool: MirrorPool,
    http: Client,
    max_retries: u32,
    retry_delay: Duration,
    rng: Mutex<StdRng>,
}

impl MirrorClient {
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_pool(MirrorPool::default())
    }

    pub fn with_pool(pool: MirrorPool) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            pool,
            http,
            max_retries: MAX_RETRIES,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
            rng: Mutex::new(StdRng::from_os_rng()),
        })
    }

    /// Pin the shuffle RNG, so tests can fix the candidate order.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Override the retry budget and backoff base (tests use a short delay).
    pub fn with_retry_policy(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn pool(&self) -> &MirrorPool {
        &self.pool
    }

    /// Fetch `path` from the first mirror that answers with a 2xx, parsed
    /// as JSON.
    ///
    /// Failover policy per response:
    /// - 2xx: return immediately.
    /// - 429: advance to the next mirror, no same-mirror retry.
    /// - 5xx / transport error: retry the same mirror with linear backoff
    ///   (`delay * attempt`) up to the retry cap, then fail over.
    /// - other 4xx / unparseable body: hard error for this mirror, fail over.
    pub async fn fetch_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, CatalogError> {
        let candidates = {
            let mut rng = self.rng.lock().await;
            self.pool.candidate_order(&mut rng)
        };

        let mut last_err: Option<CatalogError> = None;

        'mirrors: for (idx, base) in candidates.iter().enumerate() {
            let url = format!("{}{}", base, path);

            for attempt in 1..=self.max_retries {
                log::debug!(
                    "[{}/{}] attempt {}/{}: {}",
                    idx + 1,
                    candidates.len(),
                    attempt,
                    self.max_retries,
                    url
                );

                match self.try_once(&url, params).await {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        let retry_same_mirror = match &e {
                            CatalogError::Network(_) => true,
                            CatalogError::Http(status) => *status >= 500,
                            // Rate limit and other 4xx: do not keep
                            // hammering this mirror.
                            _ => false,
                        };

                        log::warn!(
                            "[{}/{}] {} failed (attempt {}): {}",
                            idx + 1,
                            candidates.len(),
                            base,
                            attempt,
                            e
                        );
                        last_err = Some(e);

                        if !retry_same_mirror {
                            continue 'mirrors;
                        }
                        if attempt < self.max_retries {
                            tokio::time::sleep(self.retry_delay * attempt).await;
                        }
                    }
                }
            }
        }

        let detail = last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| format!("no mirrors configured for {}", path));
        log::error!("All {} mirrors failed for {}", candidates.len(), path);
        Err(CatalogError::AllMirrorsFailed(detail))
    }

    async fn try_once(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, CatalogError> {
        let url = reqwest::Url::parse_with_params(url, params)
            .map_err(|e| CatalogError::Parse(format!("bad request URL: {}", e)))?;

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            return Err(CatalogError::RateLimited);
        }
        if !status.is_success() {
            return Err(CatalogError::Http(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
