use serde::{Deserialize, Serialize};

/// Paginated list envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn single(results: Vec<T>) -> Self {
        Page {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// List endpoints answer either with a [`Page`] or with a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Paginated(Page<T>),
    Bare(Vec<T>),
}

impl<T> From<ListPayload<T>> for Page<T> {
    fn from(payload: ListPayload<T>) -> Self {
        match payload {
            ListPayload::Paginated(page) => page,
            ListPayload::Bare(results) => Page::single(results),
        }
    }
}
