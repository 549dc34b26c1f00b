//! DocumentDatabase: the facade owning the store and its collaborators
//!
//! All document work happens inside [`DocumentDatabase::batch`], which runs
//! one storage session: the closure's `Ok` commits it, an `Err` rolls it back.
//! Logical transactions span batches; their outcome is applied with
//! [`DocumentDatabase::complete_transaction`] or
//! [`DocumentDatabase::rollback_transaction`].

use std::num::NonZeroUsize;
use std::sync::Arc;

use docstore_concurrency::{AppliedShadow, TransactionRegistry};
use docstore_core::{
    Etag, EtagGenerator, Result, Timestamp, TransactionId, TransactionInformation,
};
use docstore_storage::{
    CacheStats, CodecPipeline, DocumentCache, LruDocumentCache, MemoryStore, NoopDocumentCache,
};
use tracing::{debug, info};

use crate::actions::DocumentStorageActions;
use crate::config::{ConfigError, DocumentStoreConfig};

/// Embedded document database
pub struct DocumentDatabase {
    config: DocumentStoreConfig,
    store: MemoryStore,
    etags: EtagGenerator,
    codecs: CodecPipeline,
    cache: Arc<dyn DocumentCache>,
    lru: Option<Arc<LruDocumentCache>>,
    transactions: TransactionRegistry,
}

impl DocumentDatabase {
    /// Open a database with the given configuration
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` if the configuration does not validate.
    pub fn open(config: DocumentStoreConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let codecs = CodecPipeline::from_ids(config.codecs.as_slice(), config.compression_level)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        info!(
            codecs = ?codecs.codec_ids(),
            cache_capacity = config.cache_capacity,
            "document database opened"
        );
        Ok(Self::assemble(config, codecs))
    }

    /// In-memory database with the default configuration
    pub fn in_memory() -> Self {
        Self::assemble(DocumentStoreConfig::default(), CodecPipeline::new())
    }

    fn assemble(config: DocumentStoreConfig, codecs: CodecPipeline) -> Self {
        let lru = NonZeroUsize::new(config.cache_capacity)
            .map(|capacity| Arc::new(LruDocumentCache::new(capacity)));
        let cache: Arc<dyn DocumentCache> = match &lru {
            Some(lru) => Arc::clone(lru) as Arc<dyn DocumentCache>,
            None => Arc::new(NoopDocumentCache),
        };
        Self {
            config,
            store: MemoryStore::new(),
            etags: EtagGenerator::new(),
            codecs,
            cache,
            lru,
            transactions: TransactionRegistry::new(),
        }
    }

    /// Replace the document cache
    pub fn with_cache(mut self, cache: Arc<dyn DocumentCache>) -> Self {
        self.cache = cache;
        self.lru = None;
        self
    }

    /// Replace the codec pipeline
    pub fn with_codecs(mut self, codecs: CodecPipeline) -> Self {
        self.codecs = codecs;
        self
    }

    /// Continue etag generation after `last`, e.g. the highest etag persisted
    /// by a previous process
    pub fn resume_etags_after(mut self, last: Etag) -> Self {
        self.etags = EtagGenerator::starting_after(last);
        self
    }

    /// The configuration the database was opened with
    pub fn config(&self) -> &DocumentStoreConfig {
        &self.config
    }

    /// Start a logical transaction with the configured timeout
    pub fn begin_transaction(&self) -> TransactionInformation {
        TransactionInformation::new().with_timeout(self.config.transaction_timeout())
    }

    /// Run `f` in one storage session
    ///
    /// The session commits when `f` returns `Ok` and rolls back otherwise.
    /// Transactions that wrote in `f` are registered only after the commit
    /// succeeds.
    ///
    /// # Errors
    ///
    /// The closure's error, or `WriteConflict` if another session committed
    /// a row this one touched.
    pub fn batch<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DocumentStorageActions<'_>) -> Result<T>,
    {
        let mut session = self.store.begin_session();
        let (result, pending) = {
            let mut actions = DocumentStorageActions::new(
                &mut session,
                &self.etags,
                &self.codecs,
                self.cache.as_ref(),
            );
            let result = f(&mut actions);
            (result, actions.into_pending())
        };
        match result {
            Ok(value) => {
                session.commit()?;
                if !pending.is_empty() {
                    self.transactions.register(pending, Timestamp::now());
                }
                Ok(value)
            }
            Err(e) => {
                debug!(error = %e, "batch failed, rolling back");
                session.rollback();
                Err(e)
            }
        }
    }

    /// Apply every pending change of `tx` and forget the transaction
    pub fn complete_transaction(&self, tx: TransactionId) -> Result<Vec<AppliedShadow>> {
        let applied = self.batch(|actions| actions.apply_transaction(tx))?;
        self.transactions.remove(tx);
        info!(transaction = %tx, changes = applied.len(), "transaction completed");
        Ok(applied)
    }

    /// Drop every pending change of `tx` and forget the transaction
    pub fn rollback_transaction(&self, tx: TransactionId) -> Result<usize> {
        let discarded = self.batch(|actions| actions.discard_transaction(tx))?;
        self.transactions.remove(tx);
        info!(transaction = %tx, changes = discarded, "transaction rolled back");
        Ok(discarded)
    }

    /// Transactions whose timeout passed before `now`
    pub fn expired_transactions(&self, now: Timestamp) -> Vec<TransactionId> {
        self.transactions.expired(now)
    }

    /// True if `tx` has pending changes registered
    pub fn is_transaction_active(&self, tx: TransactionId) -> bool {
        self.transactions.contains(tx)
    }

    /// Committed number of live documents
    pub fn document_count(&self) -> i64 {
        self.store.document_count()
    }

    /// Cache counters, if the built-in LRU cache is in use
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.lru.as_ref().map(|lru| lru.stats())
    }
}
