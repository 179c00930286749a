//! RocksDB persistence for documents, identity and scanned contacts.

use anyhow::{Context, Result};
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use serde_json::Value;
use std::path::Path;
use wot_discovery::DiscoveryPayload;
use wot_docstore::MemoryDocumentStore;
use zeroize::Zeroizing;

/// Document URL → JSON document.
const CF_DOCUMENTS: &str = "documents";
/// Local secret key and personal document URL.
const CF_IDENTITY: &str = "identity";
/// Document URL → scanned discovery payload.
const CF_CONTACTS: &str = "contacts";

const KEY_SECRET: &[u8] = b"secret_key";
const KEY_DOC_URL: &[u8] = b"doc_url";

/// RocksDB-backed storage for the CLI.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_DOCUMENTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_IDENTITY, Options::default()),
            ColumnFamilyDescriptor::new(CF_CONTACTS, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)
            .with_context(|| format!("opening database at {}", path.display()))?;

        Ok(Self { db })
    }

    fn put(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        self.db.put_cf(&cf, key, value)?;
        Ok(())
    }

    fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let value = self.db.get_cf(&cf, key)?;
        Ok(value)
    }

    fn scan(&self, cf_name: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let cf = self
            .db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))?;
        let mut all = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, value) = item?;
            all.push((String::from_utf8(key.to_vec())?, value.to_vec()));
        }
        Ok(all)
    }

    pub fn put_document(&self, url: &str, doc: &Value) -> Result<()> {
        self.put(CF_DOCUMENTS, url.as_bytes(), &serde_json::to_vec(doc)?)
    }

    pub fn get_document(&self, url: &str) -> Result<Option<Value>> {
        match self.get(CF_DOCUMENTS, url.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Every stored document, ordered by URL.
    pub fn documents(&self) -> Result<Vec<(String, Value)>> {
        self.scan(CF_DOCUMENTS)?
            .into_iter()
            .map(|(url, bytes)| -> Result<(String, Value)> { Ok((url, serde_json::from_slice(&bytes)?)) })
            .collect()
    }

    /// Load every stored document into `store`.
    pub fn load_into(&self, store: &MemoryDocumentStore) -> Result<usize> {
        let documents = self.documents()?;
        let count = documents.len();
        for (url, doc) in documents {
            store.insert(&url, doc);
        }
        tracing::debug!(count, "documents loaded");
        Ok(count)
    }

    /// Write every document held by `store`.
    pub fn save_from(&self, store: &MemoryDocumentStore) -> Result<usize> {
        let snapshot = store.snapshot();
        for (url, doc) in &snapshot {
            self.put_document(url, doc)?;
        }
        tracing::debug!(count = snapshot.len(), "documents saved");
        Ok(snapshot.len())
    }

    pub fn put_identity(&self, secret: &[u8; 32], doc_url: &str) -> Result<()> {
        self.put(CF_IDENTITY, KEY_SECRET, secret)?;
        self.put(CF_IDENTITY, KEY_DOC_URL, doc_url.as_bytes())
    }

    /// Stored secret key and personal document URL.
    pub fn load_identity(&self) -> Result<Option<(Zeroizing<Vec<u8>>, String)>> {
        let Some(secret) = self.get(CF_IDENTITY, KEY_SECRET)? else {
            return Ok(None);
        };
        let secret = Zeroizing::new(secret);
        let doc_url = self
            .get(CF_IDENTITY, KEY_DOC_URL)?
            .context("identity has no personal document URL")?;
        Ok(Some((secret, String::from_utf8(doc_url)?)))
    }

    pub fn put_contact(&self, payload: &DiscoveryPayload) -> Result<()> {
        self.put(
            CF_CONTACTS,
            payload.user_doc_url.as_bytes(),
            &serde_json::to_vec(payload)?,
        )
    }

    pub fn contacts(&self) -> Result<Vec<DiscoveryPayload>> {
        self.scan(CF_CONTACTS)?
            .into_iter()
            .map(|(_, bytes)| -> Result<DiscoveryPayload> { Ok(serde_json::from_slice(&bytes)?) })
            .collect()
    }
}
