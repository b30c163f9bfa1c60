//! In-memory [`ProductStore`] with DynamoDB-like paging, for tests.

use super::{Item, ProductStore, ScanPage, StoreError, KEY_ATTRIBUTE};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) struct MemoryStore {
    items: Mutex<BTreeMap<String, Item>>,
    page_size: usize,
    failure: Option<String>,
    scans: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            page_size: 100,
            failure: None,
            scans: AtomicUsize::new(0),
        }
    }
}

impl MemoryStore {
    /// Limit every scan page to `page_size` items.
    pub fn with_page_size(page_size: usize) -> Self {
        assert!(page_size > 0);
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// A store whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn insert(&self, item: Item) {
        let id = key_of(&item).expect("test item without string id");
        self.items.lock().unwrap().insert(id, item);
    }

    /// Number of scan calls served so far.
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::service(
                Some("ResourceNotFoundException"),
                message.clone(),
            )),
            None => Ok(()),
        }
    }

    fn page_after(&self, start: Option<&str>) -> ScanPage {
        let items = self.items.lock().unwrap();
        let mut remaining = items
            .iter()
            .filter(|(id, _)| start.map_or(true, |start| id.as_str() > start));

        let page: Vec<(&String, &Item)> = remaining.by_ref().take(self.page_size).collect();
        let last_evaluated_key = match (page.last(), remaining.next()) {
            (Some((id, _)), Some(_)) => Some(key_item(id)),
            _ => None,
        };

        ScanPage {
            items: page.into_iter().map(|(_, item)| item.clone()).collect(),
            last_evaluated_key,
        }
    }
}

fn key_of(item: &Item) -> Option<String> {
    item.get(KEY_ATTRIBUTE)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn key_item(id: &str) -> Item {
    let mut key = Item::new();
    key.insert(KEY_ATTRIBUTE.to_string(), Value::String(id.to_string()));
    key
}

impl ProductStore for MemoryStore {
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Item>, StoreError>> + Send {
        let result = self
            .check()
            .map(|()| self.items.lock().unwrap().get(id).cloned());
        async { result }
    }

    fn scan(
        &self,
        exclusive_start_key: Option<Item>,
    ) -> impl Future<Output = Result<ScanPage, StoreError>> + Send {
        self.scans.fetch_add(1, Ordering::SeqCst);
        let result = self.check().map(|()| {
            let start = exclusive_start_key.as_ref().and_then(key_of);
            self.page_after(start.as_deref())
        });
        async { result }
    }

    fn put(&self, item: Item) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = self.check().and_then(|()| match key_of(&item) {
            Some(id) => {
                self.items.lock().unwrap().insert(id, item);
                Ok(())
            }
            None => Err(StoreError::service(
                Some("ValidationException"),
                "One or more parameter values were invalid: Missing the key id in the item",
            )),
        });
        async { result }
    }

    fn update_attribute(
        &self,
        id: &str,
        attribute: &str,
        value: Value,
    ) -> impl Future<Output = Result<Item, StoreError>> + Send {
        let result = self.check().map(|()| {
            let mut items = self.items.lock().unwrap();
            let item = items.entry(id.to_string()).or_insert_with(|| key_item(id));
            item.insert(attribute.to_string(), value.clone());

            let mut updated = Item::new();
            updated.insert(attribute.to_string(), value);
            updated
        });
        async { result }
    }

    fn delete(&self, id: &str) -> impl Future<Output = Result<Option<Item>, StoreError>> + Send {
        let result = self
            .check()
            .map(|()| self.items.lock().unwrap().remove(id));
        async { result }
    }
}
