//! Text items and an in-memory document for scenario tests

use provflow::{downcast_item, DataItem, Document, ItemId, SharedItem};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// A piece of text, optionally carrying attribute items added in place
#[derive(Debug)]
pub struct TextItem {
    pub id: ItemId,
    pub text: String,
    attributes: Mutex<Vec<SharedItem>>,
}

impl TextItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            text: text.into(),
            attributes: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(text: impl Into<String>) -> SharedItem {
        Arc::new(Self::new(text))
    }

    pub fn add_attribute(&self, attribute: SharedItem) {
        self.attributes.lock().unwrap().push(attribute);
    }

    pub fn attributes(&self) -> Vec<SharedItem> {
        self.attributes.lock().unwrap().clone()
    }
}

impl DataItem for TextItem {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Text of an item known to be a `TextItem`
pub fn text_of(item: &SharedItem) -> String {
    downcast_item::<TextItem>(item)
        .map(|t| t.text.clone())
        .unwrap_or_else(|| panic!("{} is not a text item", item.id()))
}

pub fn texts(items: &[SharedItem]) -> Vec<String> {
    items.iter().map(text_of).collect()
}

/// Document holding items in labelled lists
#[derive(Debug)]
pub struct MockDocument {
    pub id: ItemId,
    items: BTreeMap<String, Vec<SharedItem>>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self {
            id: ItemId::new(),
            items: BTreeMap::new(),
        }
    }

    /// Add text items under `label`
    pub fn with_texts(mut self, label: &str, texts: &[&str]) -> Self {
        for text in texts {
            self.add_item(TextItem::shared(*text), label);
        }
        self
    }

    pub fn texts(&self, label: &str) -> Vec<String> {
        texts(&self.items_by_selector(label))
    }
}

impl Document for MockDocument {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn items_by_selector(&self, selector: &str) -> Vec<SharedItem> {
        self.items.get(selector).cloned().unwrap_or_default()
    }

    fn add_item(&mut self, item: SharedItem, label: &str) {
        self.items.entry(label.to_string()).or_default().push(item);
    }
}
