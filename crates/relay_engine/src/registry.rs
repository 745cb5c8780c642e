use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide working set of URLs to evaluate for each new real-time client.
///
/// Readers get an immutable snapshot; writers swap the whole list. A reader
/// racing a writer sees either the old list or the new one, never a mix.
#[derive(Debug, Default)]
pub struct UrlRegistry {
    current: RwLock<Arc<[String]>>,
}

impl UrlRegistry {
    pub fn new(initial: Vec<String>) -> Self {
        Self {
            current: RwLock::new(initial.into()),
        }
    }

    pub fn get(&self) -> Arc<[String]> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, urls: Vec<String>) {
        let next: Arc<[String]> = urls.into();
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn len(&self) -> usize {
        self.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_empty()
    }
}
