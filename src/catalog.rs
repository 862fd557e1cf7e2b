// Handles read-through caching of the backend style catalog

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::{StyleDetail, StyleList};

/// Style catalog lookups, fetched once per distinct key.
///
/// Failed lookups are not cached; the next call tries again.
pub struct StyleCatalog {
    client: Arc<ApiClient>,
    list: Mutex<Option<StyleList>>,
    details: Mutex<HashMap<u32, Arc<OnceCell<StyleDetail>>>>,
}

impl StyleCatalog {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            list: Mutex::new(None),
            details: Mutex::new(HashMap::new()),
        }
    }

    pub async fn list_styles(&self) -> Result<StyleList, ApiError> {
        // Held across the fetch so concurrent callers share one request.
        let mut cached = self.list.lock().await;
        if let Some(list) = cached.as_ref() {
            return Ok(list.clone());
        }

        let list = self.client.list_styles().await?;
        debug!(count = list.count, "style list cached");
        *cached = Some(list.clone());
        Ok(list)
    }

    /// Detail for the selected style.
    ///
    /// `None` or a negative id means nothing is selected yet; resolves to
    /// `Ok(None)` without contacting the backend.
    pub async fn style_detail(&self, selected: Option<i64>) -> Result<Option<StyleDetail>, ApiError> {
        let Some(style_id) = selected.and_then(|id| u32::try_from(id).ok()) else {
            return Ok(None);
        };

        // Map lock covers the cell lookup only; fetches run on the per-id cell.
        let cell = {
            let mut details = self.details.lock().await;
            Arc::clone(details.entry(style_id).or_default())
        };

        let detail = cell
            .get_or_try_init(|| async {
                let detail = self.client.style_detail(style_id).await?;
                debug!(style_id, "style detail cached");
                Ok::<_, ApiError>(detail)
            })
            .await?;
        Ok(Some(detail.clone()))
    }
}
