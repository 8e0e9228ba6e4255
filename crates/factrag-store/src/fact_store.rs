//! Fact Store
//!
//! Append-only store of atomic, sourced facts with semantic retrieval.
//!
//! Facts live in `<root>/facts.db`. The whole table (embeddings included) is
//! loaded at open into memory, and every mutation commits one
//! `BEGIN IMMEDIATE` transaction. A `generation` counter in `store_meta` is
//! bumped on each write so a store can detect that another process wrote
//! the file since it last looked.

use crate::config::StoreConfig;
use crate::embedding::{embed_in_batches, shorten_text};
use crate::schema::{migrate, timestamp_from_sql, timestamp_to_sql};
use crate::vector_index::{VectorIndex, VectorIndexError};
use crate::{Result, StoreError};
use chrono::{DateTime, TimeDelta, Utc};
use factrag_domain::fact::{to_epoch_seconds, validate_fact_fields};
use factrag_domain::traits::{EmbeddingModel, FactLookup};
use factrag_domain::{Fact, FactId};
use rusqlite::{params, Connection, TransactionBehavior};
use std::fmt::Display;
use std::fs;
use tracing::{debug, info, warn};

const FACTS_DB: &str = "facts.db";
const FACTS_SCHEMA_VERSION: i64 = 1;

const START_FACTS: &str = "--- START FACTS ---------------------------\n";
const END_FACTS: &str = "--- END FACTS ---------------------------\n";

/// How many results a similarity query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLimit {
    /// Every fact that passes the filters
    All,
    /// At most this many facts
    Top(usize),
}

impl QueryLimit {
    /// Convert the conventional `n_results` integer, where `-1` means all
    pub fn from_n_results(n_results: i64) -> Self {
        if n_results < 0 {
            QueryLimit::All
        } else {
            QueryLimit::Top(n_results as usize)
        }
    }

    fn as_option(self) -> Option<usize> {
        match self {
            QueryLimit::All => None,
            QueryLimit::Top(n) => Some(n),
        }
    }
}

impl Default for QueryLimit {
    fn default() -> Self {
        QueryLimit::Top(10)
    }
}

/// A fact returned by a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedFact {
    /// Fact ID
    pub id: FactId,
    /// Fact text
    pub content: String,
    /// Provenance URI
    pub source: String,
    /// Added time, `YYYY-MM-DD HH:MM:SS`
    pub added: String,
    /// Added time in epoch seconds
    pub added_epoch: f64,
    /// Distance from the query embedding
    pub distance: f32,
}

impl RetrievedFact {
    fn new(fact: &Fact, distance: f32) -> Self {
        Self {
            id: fact.id,
            content: fact.content.clone(),
            source: fact.source.clone(),
            added: fact.added_label(),
            added_epoch: fact.added_at_epoch(),
            distance,
        }
    }
}

/// Render `<id>: <content>` lines, optionally between START/END separators
///
/// An empty list renders as the empty string.
pub fn render_fact_lines<'a, I>(facts: I, skip_separator: bool) -> String
where
    I: IntoIterator<Item = (FactId, &'a str)>,
{
    let mut lines = String::new();
    for (id, content) in facts {
        lines.push_str(&format!("{}: {}\n", id, content));
    }
    if lines.is_empty() || skip_separator {
        return lines;
    }
    format!("{}{}{}", START_FACTS, lines, END_FACTS)
}

/// Durable fact store with an exact in-memory vector index
pub struct FactStore<E> {
    conn: Connection,
    embedder: E,
    config: StoreConfig,
    facts: Vec<Fact>,
    index: VectorIndex,
    generation: i64,
}

impl<E> FactStore<E>
where
    E: EmbeddingModel,
    E::Error: Display,
{
    /// Open (or create) the fact store under `config.root`
    ///
    /// All facts and embeddings are loaded eagerly.
    pub fn open(config: &StoreConfig, embedder: E) -> Result<Self> {
        config.validate().map_err(StoreError::Validation)?;
        fs::create_dir_all(&config.root)?;

        let conn = Connection::open(config.root.join(FACTS_DB))?;
        migrate(&conn, include_str!("facts_schema.sql"), FACTS_SCHEMA_VERSION)?;

        let generation = read_generation(&conn)?;
        let mut facts = Vec::new();
        let mut index = VectorIndex::new(embedder.dimension(), config.distance);
        append_loaded(&mut facts, &mut index, load_rows(&conn, 0)?)?;

        info!(facts = facts.len(), root = %config.root.display(), "Opened fact store");

        Ok(Self {
            conn,
            embedder,
            config: config.clone(),
            facts,
            index,
            generation,
        })
    }

    /// Add facts stamped with the current time
    ///
    /// Returns the assigned IDs, in input order.
    pub fn add_facts(&mut self, facts: &[String], sources: &[String]) -> Result<Vec<FactId>> {
        self.add_facts_at(facts, sources, Utc::now())
    }

    /// Add a single fact
    pub fn add_fact(&mut self, fact: &str, source: &str) -> Result<FactId> {
        let ids = self.add_facts(&[fact.to_string()], &[source.to_string()])?;
        ids.into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidData("No ID assigned".to_string()))
    }

    /// Add facts stamped with `at`
    ///
    /// `facts[i]` is attributed to `sources[i]`; the lists must have equal
    /// length. Embeddings are computed before the write transaction starts.
    pub fn add_facts_at(
        &mut self,
        facts: &[String],
        sources: &[String],
        at: DateTime<Utc>,
    ) -> Result<Vec<FactId>> {
        if facts.len() != sources.len() {
            return Err(StoreError::Validation(format!(
                "Got {} facts but {} sources",
                facts.len(),
                sources.len()
            )));
        }
        for (content, source) in facts.iter().zip(sources) {
            validate_fact_fields(content, source).map_err(StoreError::Validation)?;
        }
        if facts.is_empty() {
            return Ok(Vec::new());
        }

        // Stored timestamps keep microseconds; match them in memory
        let at = timestamp_from_sql(&timestamp_to_sql(&at))?;

        let embeddings = embed_in_batches(&self.embedder, facts, &self.config.embedding)
            .map_err(|e| StoreError::Embedding(e.to_string()))?;
        if embeddings.len() != facts.len() {
            return Err(StoreError::Embedding(format!(
                "Model returned {} embeddings for {} texts",
                embeddings.len(),
                facts.len()
            )));
        }
        for embedding in &embeddings {
            if embedding.len() != self.index.dimension() {
                return Err(VectorIndexError::DimensionMismatch {
                    expected: self.index.dimension(),
                    actual: embedding.len(),
                }
                .into());
            }
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let on_disk = read_generation(&tx)?;
        if on_disk != self.generation {
            let message = format!(
                "fact store changed on disk since it was loaded (generation {} now {})",
                self.generation, on_disk
            );
            if self.config.strict {
                return Err(StoreError::StaleWrite(message));
            }
            warn!("{}; picking up new facts before writing", message);
            let rows = load_rows(&tx, self.facts.len() as u64)?;
            append_loaded(&mut self.facts, &mut self.index, rows)?;
        }

        let start = self.facts.len() as u64;
        let added_at = timestamp_to_sql(&at);
        let added_at_epoch = to_epoch_seconds(&at);
        let mut new_facts = Vec::with_capacity(facts.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO facts (id, content, source, added_at, added_at_epoch, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (offset, ((content, source), embedding)) in
                facts.iter().zip(sources).zip(&embeddings).enumerate()
            {
                let id = FactId::new(start + offset as u64);
                stmt.execute(params![
                    id.value() as i64,
                    content,
                    source,
                    added_at,
                    added_at_epoch,
                    embedding_to_bytes(embedding),
                ])?;
                new_facts.push(
                    Fact::new(id, content.as_str(), source.as_str(), at)
                        .map_err(StoreError::Validation)?,
                );
            }
        }

        let generation = on_disk + 1;
        tx.execute(
            "UPDATE store_meta SET value = ?1 WHERE key = 'generation'",
            params![generation],
        )?;
        tx.commit()?;
        self.generation = generation;

        let ids: Vec<FactId> = new_facts.iter().map(|fact| fact.id).collect();
        for (fact, embedding) in new_facts.into_iter().zip(&embeddings) {
            self.index.add(fact.id, embedding)?;
            self.facts.push(fact);
        }

        info!(count = ids.len(), first = %ids[0], "Added facts");
        Ok(ids)
    }

    /// Nearest facts to `query`, closest first
    ///
    /// With `since`, only facts added strictly after it are considered;
    /// the limit applies after filtering. Ties go to the lower ID.
    pub fn query_to_fact_list(
        &self,
        query: &str,
        limit: QueryLimit,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RetrievedFact>> {
        if self.facts.is_empty() || limit == QueryLimit::Top(0) {
            return Ok(Vec::new());
        }

        let prepared = shorten_text(
            query,
            self.config.embedding.max_tokens,
            self.config.embedding.truncate_step,
            |t| self.embedder.token_count(t),
        );
        let embedding = self
            .embedder
            .embed(&prepared)
            .map_err(|e| StoreError::Embedding(e.to_string()))?;

        let hits = self.index.search(&embedding, limit.as_option(), |id| {
            match (since, self.facts.get(id.index())) {
                (None, _) => true,
                (Some(since), Some(fact)) => fact.added_at > since,
                (Some(_), None) => false,
            }
        })?;
        debug!(query_len = query.len(), hits = hits.len(), "Fact query");

        Ok(hits
            .into_iter()
            .filter_map(|(id, distance)| {
                self.facts
                    .get(id.index())
                    .map(|fact| RetrievedFact::new(fact, distance))
            })
            .collect())
    }

    /// Same as [`query_to_fact_list`](Self::query_to_fact_list), rendered as
    /// `<id>: <content>` lines
    pub fn query_to_fact_content(
        &self,
        query: &str,
        limit: QueryLimit,
        since: Option<DateTime<Utc>>,
        skip_separator: bool,
    ) -> Result<String> {
        let facts = self.query_to_fact_list(query, limit, since)?;
        Ok(render_fact_lines(
            facts.iter().map(|fact| (fact.id, fact.content.as_str())),
            skip_separator,
        ))
    }

    /// Facts added within the trailing `days` (fractional allowed), rendered
    pub fn get_all_recent_facts(&self, days: f64, skip_separator: bool) -> Result<String> {
        self.get_all_recent_facts_at(days, Utc::now(), skip_separator)
    }

    /// Facts added strictly after `now - days`, in ID order, rendered
    pub fn get_all_recent_facts_at(
        &self,
        days: f64,
        now: DateTime<Utc>,
        skip_separator: bool,
    ) -> Result<String> {
        Ok(render_fact_lines(
            self.recent_facts_at(days, now)?
                .into_iter()
                .map(|fact| (fact.id, fact.content.as_str())),
            skip_separator,
        ))
    }
}

impl<E> FactStore<E> {
    /// Point lookup by ID string (`f12`, `F12` or `12`)
    pub fn get_fact(&self, fact_id: &str) -> Result<&Fact> {
        FactId::parse(fact_id)
            .ok()
            .and_then(|id| self.facts.get(id.index()))
            .ok_or_else(|| StoreError::NotFound(format!("Fact not found: {}", fact_id)))
    }

    /// Source URI of a fact
    pub fn get_fact_source(&self, fact_id: &str) -> Result<String> {
        Ok(self.get_fact(fact_id)?.source.clone())
    }

    /// Text of a fact
    pub fn get_fact_content(&self, fact_id: &str) -> Result<String> {
        Ok(self.get_fact(fact_id)?.content.clone())
    }

    /// Full record of a fact
    pub fn get_fact_details(&self, fact_id: &str) -> Result<Fact> {
        self.get_fact(fact_id).cloned()
    }

    /// Number of stored facts
    pub fn count_facts(&self) -> usize {
        self.facts.len()
    }

    /// All fact texts in ID order
    pub fn get_facts_as_list(&self) -> Vec<String> {
        self.facts.iter().map(|fact| fact.content.clone()).collect()
    }

    /// Facts added strictly after `now - days`, in ID order
    pub fn recent_facts_at(&self, days: f64, now: DateTime<Utc>) -> Result<Vec<&Fact>> {
        let cutoff = window_start(days, now)?;
        Ok(self.facts.iter().filter(|fact| fact.added_at > cutoff).collect())
    }

    /// All facts in ID order, optionally only those added at or after `min_date`
    pub fn get_facts(&self, min_date: Option<DateTime<Utc>>) -> Vec<&Fact> {
        self.facts
            .iter()
            .filter(|fact| min_date.is_none_or(|min| fact.added_at >= min))
            .collect()
    }

    /// All loaded facts
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// The embedding model
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Pick up facts written by another process since the last load or write
    ///
    /// Returns the number of facts loaded.
    pub fn refresh(&mut self) -> Result<usize> {
        let on_disk = read_generation(&self.conn)?;
        if on_disk == self.generation {
            return Ok(0);
        }
        let before = self.facts.len();
        let rows = load_rows(&self.conn, before as u64)?;
        append_loaded(&mut self.facts, &mut self.index, rows)?;
        self.generation = on_disk;
        Ok(self.facts.len() - before)
    }
}

impl<E> FactLookup for FactStore<E> {
    type Error = StoreError;

    fn lookup_fact(&self, id: FactId) -> Result<Option<Fact>> {
        Ok(self.facts.get(id.index()).cloned())
    }
}

/// Start of a trailing window; windows reaching past the earliest
/// representable time start there
fn window_start(days: f64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if days.is_nan() || days < 0.0 {
        return Err(StoreError::Validation(format!(
            "days must be a non-negative number, got {}",
            days
        )));
    }
    Ok(TimeDelta::try_milliseconds((days * 86_400_000.0).round() as i64)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC))
}

fn read_generation(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT value FROM store_meta WHERE key = 'generation'",
        [],
        |row| row.get(0),
    )?)
}

/// Rows with `id >= from_id`, in ID order
fn load_rows(conn: &Connection, from_id: u64) -> Result<Vec<(Fact, Vec<f32>)>> {
    let mut stmt = conn.prepare(
        "SELECT id, content, source, added_at, embedding
         FROM facts WHERE id >= ?1 ORDER BY id",
    )?;
    let raw = stmt
        .query_map(params![from_id as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Vec<u8>>(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(id, content, source, added_at, embedding)| -> Result<(Fact, Vec<f32>)> {
            let id = u64::try_from(id)
                .map_err(|_| StoreError::InvalidData(format!("Negative fact ID {}", id)))?;
            let fact = Fact::new(FactId::new(id), content, source, timestamp_from_sql(&added_at)?)
                .map_err(StoreError::InvalidData)?;
            Ok((fact, bytes_to_embedding(&embedding)?))
        })
        .collect()
}

/// Append loaded rows; the index rejects gaps in the ID sequence
fn append_loaded(
    facts: &mut Vec<Fact>,
    index: &mut VectorIndex,
    rows: Vec<(Fact, Vec<f32>)>,
) -> Result<()> {
    for (fact, embedding) in rows {
        index.add(fact.id, &embedding)?;
        facts.push(fact);
    }
    Ok(())
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(StoreError::InvalidData(format!(
            "Embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
