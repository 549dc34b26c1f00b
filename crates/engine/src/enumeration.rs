//! Enumeration over the `by_etag` and `by_key` indexes
//!
//! Scans run over the session snapshot taken when the session began.
//! `documents_after` is lazy: rows are decoded only as the caller pulls them.

use docstore_core::{Etag, JsonDocument, Result};
use docstore_storage::{DocumentRecord, Session};

use crate::actions::DocumentStorageActions;
use crate::reader::DocumentReader;

impl<'a> DocumentStorageActions<'a> {
    /// Newest documents first
    ///
    /// Documents with a pending transactional change are flagged
    /// non-authoritative.
    pub fn documents_by_reverse_update_order(
        &self,
        skip: usize,
        take: usize,
    ) -> Result<Vec<JsonDocument>> {
        let reader = self.reader();
        self.session
            .documents_by_etag()
            .rev()
            .skip(skip)
            .take(take)
            .map(|record| decode_flagged(&reader, self.session, record))
            .collect()
    }

    /// Documents with etag strictly after `etag`, oldest first
    ///
    /// Stops after `take` documents. When `max_bytes` is set, the document
    /// whose size makes the running total exceed it is still returned, then
    /// the scan stops. A total landing exactly on `max_bytes` keeps going. When `until` is set, every document after the first is
    /// checked against it and one with etag `>= until` ends the scan.
    pub fn documents_after(
        &self,
        etag: Etag,
        take: usize,
        max_bytes: Option<u64>,
        until: Option<Etag>,
    ) -> DocumentsAfter<'_> {
        DocumentsAfter {
            records: Box::new(self.session.documents_after(etag)),
            reader: self.reader(),
            take,
            max_bytes,
            until,
            returned: 0,
            total_bytes: 0,
            done: false,
        }
    }

    /// Smallest live etag strictly after `etag`, or `etag` itself if none
    pub fn best_next_etag(&self, etag: Etag) -> Etag {
        self.session.first_etag_after(etag).unwrap_or(etag)
    }

    /// Documents whose key starts with `prefix`, ascending by key
    pub fn documents_with_key_prefix(
        &self,
        prefix: &str,
        skip: usize,
        take: usize,
    ) -> Result<Vec<JsonDocument>> {
        let reader = self.reader();
        self.session
            .documents_from_key(prefix)
            .take_while(|record| record.key.starts_with(prefix))
            .skip(skip)
            .take(take)
            .map(|record| decode_flagged(&reader, self.session, record))
            .collect()
    }
}

fn decode_flagged(
    reader: &DocumentReader<'_>,
    session: &Session,
    record: &DocumentRecord,
) -> Result<JsonDocument> {
    let modified = session.shadow(&record.key).is_some();
    reader.document(record.into(), modified)
}

/// Lazy scan returned by [`DocumentStorageActions::documents_after`]
pub struct DocumentsAfter<'s> {
    records: Box<dyn Iterator<Item = &'s DocumentRecord> + 's>,
    reader: DocumentReader<'s>,
    take: usize,
    max_bytes: Option<u64>,
    until: Option<Etag>,
    returned: usize,
    total_bytes: u64,
    done: bool,
}

impl DocumentsAfter<'_> {
    /// Bytes returned so far
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

impl Iterator for DocumentsAfter<'_> {
    type Item = Result<JsonDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.returned >= self.take {
            return None;
        }
        let Some(record) = self.records.next() else {
            self.done = true;
            return None;
        };
        if self.returned > 0 && self.until.is_some_and(|until| record.etag >= until) {
            self.done = true;
            return None;
        }

        let document = match self.reader.document(record.into(), false) {
            Ok(document) => document,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.returned += 1;
        self.total_bytes += document.serialized_size;
        if self.max_bytes.is_some_and(|max| self.total_bytes > max) {
            self.done = true;
        }
        Some(Ok(document))
    }
}
