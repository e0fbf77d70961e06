//! Debounced place search for manual location entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::DomainError;
use crate::models::{PlaceSelection, PlaceSuggestion};

/// Place autocomplete and lookup.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn autocomplete(&self, query: &str) -> Result<Vec<PlaceSuggestion>, DomainError>;

    /// Resolves a suggestion to exact coordinates and a formatted address.
    /// An empty address means the service returned none.
    async fn details(&self, place_id: &str) -> Result<PlaceSelection, DomainError>;
}

#[derive(Debug, Clone, Copy)]
pub struct DebounceSettings {
    pub delay: Duration,
    pub min_query_len: usize,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            min_query_len: 3,
        }
    }
}

/// Turns keystrokes into at most one autocomplete request per typing burst.
///
/// Must be driven from inside a tokio runtime.
pub struct SearchDebouncer {
    search: Arc<dyn PlaceSearch>,
    settings: DebounceSettings,
    pending: Mutex<Option<JoinHandle<()>>>,
    generation: Arc<AtomicU64>,
    suggestions_tx: Arc<watch::Sender<Vec<PlaceSuggestion>>>,
}

impl SearchDebouncer {
    pub fn new(search: Arc<dyn PlaceSearch>, settings: DebounceSettings) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            search,
            settings,
            pending: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
            suggestions_tx: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<PlaceSuggestion>> {
        self.suggestions_tx.subscribe()
    }

    pub fn suggestions(&self) -> Vec<PlaceSuggestion> {
        self.suggestions_tx.borrow().clone()
    }

    /// Cancels the pending fetch and returns the new generation.
    fn cancel_pending(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        generation
    }

    pub fn on_query_changed(&self, query: &str) {
        let generation = self.cancel_pending();
        let query = query.trim().to_string();

        if query.chars().count() < self.settings.min_query_len {
            self.suggestions_tx.send_replace(Vec::new());
            return;
        }

        let search = self.search.clone();
        let current = self.generation.clone();
        let tx = self.suggestions_tx.clone();
        let delay = self.settings.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(query = %query, "Fetching place suggestions");
            let suggestions = match search.autocomplete(&query).await {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    warn!(error = %e, query = %query, "Place autocomplete failed");
                    Vec::new()
                }
            };
            if current.load(Ordering::SeqCst) == generation {
                tx.send_replace(suggestions);
            }
        });

        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *pending = Some(handle);
    }

    /// Resolves the chosen suggestion and clears the list. The suggestion's
    /// description stands in when the lookup has no address.
    pub async fn select(&self, suggestion: &PlaceSuggestion) -> Result<PlaceSelection, DomainError> {
        self.cancel_pending();
        self.suggestions_tx.send_replace(Vec::new());
        let mut selection = self.search.details(&suggestion.place_id).await?;
        if selection.address.trim().is_empty() {
            debug!(place_id = %suggestion.place_id, "Place details without address");
            selection.address = suggestion.description.clone();
        }
        Ok(selection)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSearch {
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeSearch {
        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PlaceSearch for FakeSearch {
        async fn autocomplete(&self, query: &str) -> Result<Vec<PlaceSuggestion>, DomainError> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(DomainError::NetworkUnavailable("offline".into()));
            }
            Ok(vec![PlaceSuggestion {
                place_id: format!("id-{query}"),
                description: format!("{query}, India"),
                main_text: query.to_string(),
                secondary_text: "India".to_string(),
            }])
        }

        async fn details(&self, place_id: &str) -> Result<PlaceSelection, DomainError> {
            let address = if place_id == "no-address" {
                String::new()
            } else {
                format!("resolved {place_id}")
            };
            Ok(PlaceSelection {
                latitude: 19.076,
                longitude: 72.8777,
                address,
            })
        }
    }

    fn debouncer(search: Arc<FakeSearch>) -> SearchDebouncer {
        SearchDebouncer::new(search, DebounceSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_issues_single_fetch() {
        let search = Arc::new(FakeSearch::default());
        let debouncer = debouncer(search.clone());

        debouncer.on_query_changed("Mum");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.on_query_changed("Mumb");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.on_query_changed("Mumbai");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(search.queries(), vec!["Mumbai"]);
        assert_eq!(debouncer.suggestions()[0].place_id, "id-Mumbai");
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_fetched_before_delay() {
        let search = Arc::new(FakeSearch::default());
        let debouncer = debouncer(search.clone());

        debouncer.on_query_changed("Delhi");
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(search.queries().is_empty());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(search.queries(), vec!["Delhi"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears_without_fetch() {
        let search = Arc::new(FakeSearch::default());
        let debouncer = debouncer(search.clone());

        debouncer.on_query_changed("Pune");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(debouncer.suggestions().len(), 1);

        debouncer.on_query_changed("Pu");
        assert!(debouncer.suggestions().is_empty());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(search.queries(), vec!["Pune"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_cancels_pending_fetch() {
        let search = Arc::new(FakeSearch::default());
        let debouncer = debouncer(search.clone());

        debouncer.on_query_changed("Kolkata");
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.on_query_changed("");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(search.queries().is_empty());
        assert!(debouncer.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autocomplete_failure_publishes_empty_list() {
        let search = Arc::new(FakeSearch {
            fail: true,
            ..Default::default()
        });
        let debouncer = debouncer(search.clone());
        let mut rx = debouncer.subscribe();

        debouncer.on_query_changed("Chennai");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(search.queries().len(), 1);
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_select_resolves_details_and_clears() {
        let search = Arc::new(FakeSearch::default());
        let debouncer = debouncer(search);
        let suggestion = PlaceSuggestion {
            place_id: "abc".to_string(),
            description: "Mumbai, Maharashtra, India".to_string(),
            main_text: "Mumbai".to_string(),
            secondary_text: "Maharashtra, India".to_string(),
        };

        let selection = debouncer.select(&suggestion).await.unwrap();
        assert_eq!(selection.address, "resolved abc");
        assert_eq!(selection.latitude, 19.076);
        assert!(debouncer.suggestions().is_empty());
    }

    #[tokio::test]
    async fn test_select_without_address_uses_description() {
        let debouncer = debouncer(Arc::new(FakeSearch::default()));
        let suggestion = PlaceSuggestion {
            place_id: "no-address".to_string(),
            description: "Pune, Maharashtra, India".to_string(),
            main_text: "Pune".to_string(),
            secondary_text: "Maharashtra, India".to_string(),
        };

        let selection = debouncer.select(&suggestion).await.unwrap();
        assert_eq!(selection.address, "Pune, Maharashtra, India");
    }
}
