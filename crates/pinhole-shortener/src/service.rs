use async_trait::async_trait;
use pinhole_core::{
    normalize_url, Clock, LinkRecord, LinkStats, LinkStore, LinkTable, ShortCode,
    ShortenResponse, Shortener, ShortenerError, SystemClock,
};
use pinhole_generator::Generator;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, ShortenerError>;

pub const DEFAULT_MAX_ATTEMPTS: usize = 1024;

/// Configures a [`ShortenerService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Public base URL short links are served under, e.g. `http://localhost:5000`.
    #[builder(setter(into))]
    pub base_url: String,
    /// How many candidate codes to try before giving up on a crowded keyspace.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,
}

/// A concrete implementation of the `Shortener` trait.
///
/// The service is the single owner of the link table. The table is loaded
/// once by [`ShortenerService::open`] and kept behind an async mutex. Every
/// operation holds the lock for its whole read-modify-save cycle, so
/// concurrent resolves of one code never lose a click. A mutation is applied
/// to a copy of the table and only becomes visible once the store has saved
/// that copy; a failed save leaves the table untouched.
pub struct ShortenerService<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    clock: Arc<dyn Clock>,
    settings: ShortenerSettings,
    table: Arc<Mutex<LinkTable>>,
}

impl<S, G> Clone for ShortenerService<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: Arc::clone(&self.generator),
            clock: Arc::clone(&self.clock),
            settings: self.settings.clone(),
            table: Arc::clone(&self.table),
        }
    }
}

impl<S: LinkStore, G: Generator> ShortenerService<S, G> {
    /// Loads the persisted links and creates the service.
    ///
    /// Fails with [`ShortenerError::StorageRead`] when the store holds state
    /// that cannot be parsed.
    pub async fn open(store: S, generator: G, settings: ShortenerSettings) -> Result<Self> {
        let table = store.load().await?;
        info!(
            links = table.len(),
            base_url = %settings.base_url,
            "opened link store"
        );

        Ok(Self {
            store: Arc::new(store),
            generator: Arc::new(generator),
            clock: Arc::new(SystemClock),
            settings,
            table: Arc::new(Mutex::new(table)),
        })
    }

    /// Replaces the clock used to stamp new links.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.is_empty()
    }

    /// Shortens `url`.
    ///
    /// The URL is normalized first. If the normalized URL was shortened
    /// before, the existing code is returned and nothing is written.
    pub async fn shorten(&self, url: &str) -> Result<ShortenResponse> {
        let original_url = normalize_url(url)?;
        let mut table = self.table.lock().await;

        if let Some(code) = table.find_by_url(&original_url) {
            debug!(code = %code, url = %original_url, "url already shortened");
            return Ok(self.response(code.clone(), original_url));
        }

        let code = self.allocate_code(&table)?;
        let mut next = table.clone();
        next.insert(
            code.clone(),
            LinkRecord::new(original_url.clone(), self.clock.now()),
        );
        self.commit(&mut table, next).await?;

        info!(code = %code, url = %original_url, "created short link");
        Ok(self.response(code, original_url))
    }

    /// Counts one visit of `code` and returns the record after the increment.
    ///
    /// Unknown and malformed codes both fail with [`ShortenerError::NotFound`].
    pub async fn resolve(&self, code: &str) -> Result<LinkRecord> {
        let code = parse_code(code)?;
        let code = code.as_str();
        let mut table = self.table.lock().await;
        if !table.contains(code) {
            trace!(code = %code, "short code not found");
            return Err(not_found(code));
        }

        let mut next = table.clone();
        let clicks = next.clicks_mut(code).ok_or_else(|| not_found(code))?;
        *clicks = clicks.saturating_add(1);
        self.commit(&mut table, next).await?;

        let record = table.get(code).cloned().ok_or_else(|| not_found(code))?;
        debug!(
            code = %code,
            url = %record.original_url,
            clicks = record.clicks,
            "resolved short code"
        );
        Ok(record)
    }

    /// Returns the statistics of `code` without counting a visit.
    pub async fn stats(&self, code: &str) -> Result<LinkStats> {
        let code = parse_code(code)?;
        let table = self.table.lock().await;
        let record = table
            .get(code.as_str())
            .ok_or_else(|| not_found(code.as_str()))?;
        Ok(LinkStats::new(code, record))
    }

    /// Returns the statistics of every link, oldest first.
    pub async fn list(&self) -> Vec<LinkStats> {
        let table = self.table.lock().await;
        table
            .iter()
            .map(|(code, record)| LinkStats::new(code.clone(), record))
            .collect()
    }

    /// Writes the current table through the store.
    pub async fn flush(&self) -> Result<()> {
        let table = self.table.lock().await;
        self.store.save(&table).await?;
        debug!(links = table.len(), "flushed link store");
        Ok(())
    }

    /// Flushes the table and drops this handle.
    pub async fn shutdown(self) -> Result<()> {
        self.flush().await?;
        info!("link store shut down");
        Ok(())
    }

    /// Draws candidates until one is not taken, up to `max_attempts` times.
    fn allocate_code(&self, table: &LinkTable) -> Result<ShortCode> {
        for attempt in 1..=self.settings.max_attempts {
            let candidate: ShortCode = self.generator.generate().into();
            if !table.contains(candidate.as_str()) {
                return Ok(candidate);
            }
            trace!(code = %candidate, attempt, "short code collision, retrying");
        }

        error!(
            attempts = self.settings.max_attempts,
            links = table.len(),
            "no free short code found"
        );
        Err(ShortenerError::CodeSpaceExhausted {
            attempts: self.settings.max_attempts,
        })
    }

    /// Saves `next` and, only if that succeeds, makes it the current table.
    async fn commit(&self, current: &mut LinkTable, next: LinkTable) -> Result<()> {
        if let Err(err) = self.store.save(&next).await {
            error!(error = %err, "failed to persist links, change discarded");
            return Err(err.into());
        }
        *current = next;
        Ok(())
    }

    fn response(&self, code: ShortCode, original_url: String) -> ShortenResponse {
        ShortenResponse {
            short_url: code.to_url(&self.settings.base_url),
            short_code: code,
            original_url,
        }
    }
}

fn not_found(code: &str) -> ShortenerError {
    ShortenerError::NotFound(code.to_string())
}

/// A string that can never be a short code cannot name a link.
fn parse_code(code: &str) -> Result<ShortCode> {
    ShortCode::new(code).map_err(|err| {
        trace!(code = %code, error = %err, "rejected malformed short code");
        not_found(code)
    })
}

#[async_trait]
impl<S: LinkStore, G: Generator> Shortener for ShortenerService<S, G> {
    async fn shorten(&self, url: &str) -> Result<ShortenResponse> {
        ShortenerService::shorten(self, url).await
    }

    async fn resolve(&self, code: &str) -> Result<LinkRecord> {
        ShortenerService::resolve(self, code).await
    }

    async fn stats(&self, code: &str) -> Result<LinkStats> {
        ShortenerService::stats(self, code).await
    }
}
