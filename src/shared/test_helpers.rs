//! In-memory stand-ins for the record store and object storage.
//!
//! Upload/download URLs issued by [`InMemoryObjectStorage`] look like
//! `memory://<bucket>/<key>?method=PUT&expires=300` and can be "followed"
//! with [`InMemoryObjectStorage::put_via_url`] / [`InMemoryObjectStorage::get_via_url`].

use async_trait::async_trait;
use axum::Router;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::router::build_router;
use crate::features::files::models::File;
use crate::features::files::repositories::FileRecordStore;
use crate::features::files::FileService;
use crate::modules::storage::ObjectStorage;

const BUCKET: &str = "filedrop-test";

#[derive(Default)]
pub struct InMemoryRecordStore {
    files: Mutex<HashMap<Uuid, File>>,
    fail_deletes: AtomicBool,
    fail_scans: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_scans(&self, fail: bool) {
        self.fail_scans.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileRecordStore for InMemoryRecordStore {
    async fn put(&self, file: &File) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(file.file_id, file.clone());
        Ok(())
    }

    async fn get(&self, file_id: Uuid) -> Result<Option<File>> {
        Ok(self.files.lock().unwrap().get(&file_id).cloned())
    }

    async fn update(&self, file: &File) -> Result<bool> {
        let mut files = self.files.lock().unwrap();
        match files.get_mut(&file.file_id) {
            Some(existing) => {
                existing.file_size = file.file_size;
                existing.status = file.status.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, file_id: Uuid) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("record store unavailable".to_string()));
        }
        self.files.lock().unwrap().remove(&file_id);
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<File>> {
        if self.fail_scans.load(Ordering::SeqCst) {
            return Err(AppError::Internal("record store unavailable".to_string()));
        }
        Ok(self.files.lock().unwrap().values().cloned().collect())
    }
}

pub struct InMemoryObjectStorage {
    key_prefix: String,
    expiry_secs: u32,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    failing: AtomicBool,
}

impl InMemoryObjectStorage {
    pub fn new(key_prefix: &str, expiry_secs: u32) -> Self {
        Self {
            key_prefix: key_prefix.to_string(),
            expiry_secs,
            objects: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every storage call return a storage error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    /// Act as the client PUTting bytes to an issued upload URL
    pub fn put_via_url(&self, url: &str, data: Vec<u8>) -> std::result::Result<(), String> {
        let key = Self::key_for(url, "PUT")?;
        self.objects.lock().unwrap().insert(key, data);
        Ok(())
    }

    /// Act as the client GETting an issued download URL
    pub fn get_via_url(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let key = Self::key_for(url, "GET")?;
        self.objects
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| format!("NoSuchKey: {}", key))
    }

    fn key_for(url: &str, method: &str) -> std::result::Result<String, String> {
        let rest = url
            .strip_prefix(&format!("memory://{}/", BUCKET))
            .ok_or_else(|| format!("not an in-memory URL: {}", url))?;
        let (key, query) = rest
            .split_once('?')
            .ok_or_else(|| format!("unsigned URL: {}", url))?;

        if !query.split('&').any(|p| p == format!("method={}", method)) {
            return Err(format!("URL is not signed for {}", method));
        }
        Ok(key.to_string())
    }

    fn url_for(&self, key: &str, method: &str) -> String {
        format!(
            "memory://{}/{}?method={}&expires={}",
            BUCKET, key, method, self.expiry_secs
        )
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Storage("storage unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    fn presigned_url_expiry_secs(&self) -> u32 {
        self.expiry_secs
    }

    async fn presign_upload(&self, key: &str, _content_type: &str) -> Result<String> {
        self.check_available()?;
        Ok(self.url_for(key, "PUT"))
    }

    async fn presign_download(&self, key: &str) -> Result<String> {
        self.check_available()?;
        Ok(self.url_for(key, "GET"))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn object_size(&self, key: &str) -> Result<Option<i64>> {
        self.check_available()?;
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|data| data.len() as i64))
    }
}

/// Router wired to fresh in-memory backends
pub struct TestApp {
    pub router: Router,
    pub records: Arc<InMemoryRecordStore>,
    pub storage: Arc<InMemoryObjectStorage>,
}

pub fn test_app() -> TestApp {
    let records = Arc::new(InMemoryRecordStore::new());
    let storage = Arc::new(InMemoryObjectStorage::new("uploads", 300));
    let service = Arc::new(FileService::new(records.clone(), storage.clone()));

    TestApp {
        router: build_router(service, vec!["*".to_string()]),
        records,
        storage,
    }
}
