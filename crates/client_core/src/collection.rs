//! Collection state and the reducer that owns every write to it.

use shared::protocol::ProductItem;

use crate::PAGE_SIZE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl FetchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// Data carried by a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPayload {
    pub data: Vec<ProductItem>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionAction {
    FetchPending,
    FetchFulfilled(FetchPayload),
    FetchRejected { message: String },
    SetPage(u32),
}

/// `error` is `Some` only while `status` is [`FetchStatus::Failed`].
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    pub items: Vec<ProductItem>,
    pub status: FetchStatus,
    pub error: Option<String>,
    pub page: u32,
    pub page_count: u64,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: FetchStatus::Idle,
            error: None,
            page: 1,
            page_count: 0,
        }
    }
}

impl CollectionState {
    pub fn apply(&mut self, action: CollectionAction) {
        match action {
            CollectionAction::FetchPending => {
                self.status = FetchStatus::Loading;
                self.error = None;
            }
            CollectionAction::FetchFulfilled(payload) => {
                self.items = payload.data;
                self.page_count = page_count_for(payload.total);
                self.status = FetchStatus::Succeeded;
                self.error = None;
            }
            CollectionAction::FetchRejected { message } => {
                // items and page_count stay as they were
                self.status = FetchStatus::Failed;
                self.error = Some(message);
            }
            CollectionAction::SetPage(page) => {
                self.page = page;
            }
        }
    }
}

pub fn page_count_for(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE)
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
