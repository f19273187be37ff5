//! Pagination/search controller.
//!
//! Owns the client-visible list of people and sequences the three operations
//! that mutate it: initialize, load more and search. Every request is issued
//! as a [`FetchTicket`] stamped with the current generation; initialize and
//! search start a new generation, so a response that arrives after a reset
//! is recognised as stale and dropped instead of being appended to the new
//! result set.
use tracing::{debug, info, instrument, warn};

use crate::model::{Cursor, Page, Person};
use crate::swapi::{FetchError, PageRequest, PeopleService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Initialize,
    LoadMore,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching(FetchKind),
}

/// Result of feeding a response (or a no-op) through the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The page was applied to the list.
    Applied { kind: FetchKind, received: usize },
    /// Nothing to fetch; no request was made.
    Skipped,
    /// The ticket belonged to an older generation or was already completed;
    /// its response was dropped.
    Discarded,
}

/// Rows fetched so far for the active query plus pagination bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    rows: Vec<Person>,
    total_count: u64,
    fetched_count: u64,
    next_cursor: Option<Cursor>,
    query: String,
}

impl ListState {
    fn reset(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[Person] {
        &self.rows
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn fetched_count(&self) -> u64 {
        self.fetched_count
    }

    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// True while the server has pages left and a cursor to reach them.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some() && self.fetched_count < self.total_count
    }

    fn replace_with(&mut self, page: Page) {
        self.fetched_count = page.items.len() as u64;
        self.total_count = page.total_count;
        self.next_cursor = page.next_cursor;
        self.rows = page.items;
    }

    fn append(&mut self, page: Page) {
        self.fetched_count += page.items.len() as u64;
        self.next_cursor = page.next_cursor;
        self.rows.extend(page.items);
    }
}

/// A request handed out by the controller. Must be returned through
/// [`PeopleController::complete`] together with the fetch result; a ticket is
/// consumed by that call.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(Clone))]
pub struct FetchTicket {
    generation: u64,
    kind: FetchKind,
    request: PageRequest,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }
}

pub struct PeopleController<S> {
    service: S,
    state: ListState,
    phase: Phase,
    generation: u64,
    // Outstanding requests for this generation.
    first_page_pending: bool,
    pending_cursor: Option<Cursor>,
}

impl<S: PeopleService> PeopleController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: ListState::default(),
            phase: Phase::Idle,
            generation: 0,
            first_page_pending: false,
            pending_cursor: None,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    fn start_generation(&mut self, query: &str, kind: FetchKind) -> FetchTicket {
        self.generation += 1;
        self.state = ListState::reset(query);
        self.first_page_pending = true;
        self.pending_cursor = None;
        self.phase = Phase::Fetching(kind);
        FetchTicket {
            generation: self.generation,
            kind,
            request: PageRequest::First {
                query: query.to_string(),
            },
        }
    }

    /// Clear the list and issue a request for the unfiltered first page.
    pub fn begin_initialize(&mut self) -> FetchTicket {
        self.start_generation("", FetchKind::Initialize)
    }

    /// Clear the list, remember `query` and issue a request for its first
    /// page. An empty query is the same as [`Self::begin_initialize`].
    pub fn begin_search(&mut self, query: &str) -> FetchTicket {
        if query.is_empty() {
            return self.begin_initialize();
        }
        self.start_generation(query, FetchKind::Search)
    }

    /// Issue a request for the page behind the current cursor, or `None` when
    /// there is nothing left or the same cursor is already being fetched.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if !self.state.has_more() {
            debug!(
                fetched = self.state.fetched_count,
                total = self.state.total_count,
                "no more pages"
            );
            return None;
        }
        let cursor = self.state.next_cursor.clone()?;
        if self.pending_cursor.as_ref() == Some(&cursor) {
            debug!(%cursor, "load more already in flight");
            return None;
        }
        self.pending_cursor = Some(cursor.clone());
        self.phase = Phase::Fetching(FetchKind::LoadMore);
        Some(FetchTicket {
            generation: self.generation,
            kind: FetchKind::LoadMore,
            request: PageRequest::Next(cursor),
        })
    }

    /// Apply the outcome of a ticket's fetch. Stale tickets never touch state;
    /// a failed fetch leaves the list as it was when the ticket was issued.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, FetchError>,
    ) -> Result<Completion, FetchError> {
        if ticket.generation != self.generation {
            match &result {
                Ok(page) => warn!(
                    ticket = ticket.generation,
                    current = self.generation,
                    kind = ?ticket.kind,
                    dropped = page.items.len(),
                    "discarding stale response"
                ),
                Err(err) => debug!(?err, ticket = ticket.generation, "ignoring stale failure"),
            }
            return Ok(Completion::Discarded);
        }

        let outstanding = match &ticket.request {
            PageRequest::First { .. } => self.first_page_pending,
            PageRequest::Next(cursor) => self.pending_cursor.as_ref() == Some(cursor),
        };
        if !outstanding {
            debug!(kind = ?ticket.kind, "ticket already completed");
            return Ok(Completion::Discarded);
        }

        self.phase = Phase::Idle;
        match ticket.kind {
            FetchKind::Initialize | FetchKind::Search => self.first_page_pending = false,
            FetchKind::LoadMore => self.pending_cursor = None,
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(?err, kind = ?ticket.kind, "fetch failed");
                return Err(err);
            }
        };

        let received = page.items.len();
        match ticket.kind {
            FetchKind::Initialize | FetchKind::Search => self.state.replace_with(page),
            FetchKind::LoadMore => self.state.append(page),
        }
        info!(
            kind = ?ticket.kind,
            received,
            fetched = self.state.fetched_count,
            total = self.state.total_count,
            has_more = self.state.has_more(),
            "page applied"
        );
        Ok(Completion::Applied {
            kind: ticket.kind,
            received,
        })
    }

    async fn run(&mut self, ticket: FetchTicket) -> Result<Completion, FetchError> {
        let result = self.service.fetch_page(ticket.request()).await;
        self.complete(ticket, result)
    }

    #[instrument(skip_all)]
    pub async fn initialize(&mut self) -> Result<Completion, FetchError> {
        let ticket = self.begin_initialize();
        self.run(ticket).await
    }

    #[instrument(skip_all)]
    pub async fn load_more(&mut self) -> Result<Completion, FetchError> {
        match self.begin_load_more() {
            Some(ticket) => self.run(ticket).await,
            None => Ok(Completion::Skipped),
        }
    }

    #[instrument(skip_all, fields(query = %query))]
    pub async fn search(&mut self, query: &str) -> Result<Completion, FetchError> {
        let ticket = self.begin_search(query);
        self.run(ticket).await
    }

    /// Keep loading until the server reports no further pages or `max_pages`
    /// additional pages have been applied. Returns the number of pages applied.
    pub async fn load_all(&mut self, max_pages: Option<usize>) -> Result<usize, FetchError> {
        let mut pages = 0;
        while max_pages.map_or(true, |max| pages < max) {
            match self.load_more().await? {
                // An empty page would leave the walk spinning on the server's cursor.
                Completion::Applied { received: 0, .. } => break,
                Completion::Applied { .. } => pages += 1,
                Completion::Skipped | Completion::Discarded => break,
            }
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoService;

    #[async_trait]
    impl PeopleService for NoService {
        async fn fetch_page(&self, _request: &PageRequest) -> Result<Page, FetchError> {
            Ok(Page::default())
        }
    }

    fn page(count: u64, next: Option<&str>, names: &[&str]) -> Page {
        Page {
            items: names
                .iter()
                .map(|n| Person {
                    name: n.to_string(),
                    ..Default::default()
                })
                .collect(),
            total_count: count,
            next_cursor: next.map(Cursor::new),
            previous_cursor: None,
        }
    }

    fn names(state: &ListState) -> Vec<&str> {
        state.rows().iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn completed_load_more_ticket_cannot_apply_twice() {
        let mut controller = PeopleController::new(NoService);
        let first = controller.begin_initialize();
        controller
            .complete(first, Ok(page(5, Some("page2"), &["A", "B"])))
            .unwrap();

        let more = controller.begin_load_more().unwrap();
        let replay = more.clone();
        let done = controller
            .complete(more, Ok(page(5, Some("page3"), &["C", "D"])))
            .unwrap();
        assert_eq!(
            done,
            Completion::Applied {
                kind: FetchKind::LoadMore,
                received: 2
            }
        );

        let done = controller
            .complete(replay, Ok(page(5, Some("page3"), &["C", "D"])))
            .unwrap();
        assert_eq!(done, Completion::Discarded);
        assert_eq!(names(controller.state()), vec!["A", "B", "C", "D"]);
        assert_eq!(controller.state().fetched_count(), 4);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn completed_first_page_ticket_cannot_apply_twice() {
        let mut controller = PeopleController::new(NoService);
        let search = controller.begin_search("luke");
        let replay = search.clone();
        controller
            .complete(search, Ok(page(3, Some("page2"), &["Luke"])))
            .unwrap();
        controller.begin_load_more().unwrap();

        let done = controller
            .complete(replay, Ok(page(1, None, &["Other"])))
            .unwrap();
        assert_eq!(done, Completion::Discarded);
        assert_eq!(names(controller.state()), vec!["Luke"]);
        assert_eq!(
            controller.phase(),
            Phase::Fetching(FetchKind::LoadMore)
        );
    }

    #[test]
    fn failed_ticket_is_spent() {
        let mut controller = PeopleController::new(NoService);
        let first = controller.begin_initialize();
        controller
            .complete(first, Ok(page(5, Some("page2"), &["A", "B"])))
            .unwrap();

        let more = controller.begin_load_more().unwrap();
        let replay = more.clone();
        let err = controller.complete(
            more,
            Err(FetchError::InvalidUrl("page2".into())),
        );
        assert!(err.is_err());
        let done = controller
            .complete(replay, Ok(page(5, None, &["C"])))
            .unwrap();
        assert_eq!(done, Completion::Discarded);
        assert_eq!(names(controller.state()), vec!["A", "B"]);
    }
}
