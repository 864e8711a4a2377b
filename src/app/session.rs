use crate::adapters::render::{self, OutputFormat, ERROR_STATE, LOADING_MESSAGE};
use crate::app::commands::{Command, ViewMode};
use crate::core::page_state::{FetchOutcome, FetchTicket, PageState};
use crate::core::pagination::Pagination;
use crate::domain::model::{BranchRecord, Bounds, FetchedPage, Marker, ReferenceLocation};
use crate::domain::ports::{BranchSource, FitOptions, LocationProvider, MapView};
use crate::utils::error::{FetchError, LocatorError, Result};

pub const MAP_FIT: FitOptions = FitOptions {
    padding: 50,
    max_zoom: 15,
};
pub const DETAIL_ZOOM: u8 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One user's locator session: the page state plus the collaborators it
/// talks to.
pub struct LocatorSession<S, L, M> {
    source: S,
    locator: L,
    map: M,
    state: PageState,
    view: ViewMode,
    detail: Option<BranchRecord>,
    status: LoadStatus,
}

impl<S, L, M> LocatorSession<S, L, M>
where
    S: BranchSource,
    L: LocationProvider,
    M: MapView,
{
    pub fn new(source: S, locator: L, map: M, pagination: Pagination) -> Self {
        Self {
            source,
            locator,
            map,
            state: PageState::new(pagination),
            view: ViewMode::default(),
            detail: None,
            status: LoadStatus::default(),
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn detail(&self) -> Option<&BranchRecord> {
        self.detail.as_ref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Fetches the current page and applies it.
    pub async fn load_current_page(&mut self) -> Result<FetchOutcome> {
        let ticket = self.begin_fetch();
        let result = self.source.fetch_page(ticket.skip, ticket.limit).await;
        self.finish_fetch(&ticket, result)
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        tracing::info!("{} (page {})", LOADING_MESSAGE, self.state.pagination().current_page());
        self.status = LoadStatus::Loading;
        self.state.begin_fetch()
    }

    /// Applies the result of a fetch started with `begin_fetch`.
    ///
    /// Results for superseded tickets are dropped whether they succeeded or
    /// failed, so only the latest navigation decides what is shown.
    pub fn finish_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: std::result::Result<FetchedPage, FetchError>,
    ) -> Result<FetchOutcome> {
        if !self.state.is_current(ticket) {
            if let Err(e) = &result {
                tracing::debug!("Ignoring failure of superseded fetch: {}", e);
            }
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(page) => {
                let outcome = self.state.complete_fetch(ticket, page);
                if let FetchOutcome::Applied { loaded, total } = outcome {
                    tracing::info!(
                        "Loaded {} branches for page {} ({} total)",
                        loaded,
                        ticket.page,
                        total
                    );
                }
                self.status = LoadStatus::Ready;
                self.sync_map();
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!("Failed to load page {}: {}", ticket.page, e);
                self.status = LoadStatus::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Returns `false` without fetching when there is no next page.
    pub async fn next_page(&mut self) -> Result<bool> {
        if !self.state.pagination().can_go_next() {
            tracing::debug!("Already on the last page");
            return Ok(false);
        }
        self.state.pagination_mut().advance();
        self.detail = None;
        self.load_current_page().await?;
        Ok(true)
    }

    pub async fn previous_page(&mut self) -> Result<bool> {
        if !self.state.pagination().can_go_previous() {
            tracing::debug!("Already on the first page");
            return Ok(false);
        }
        self.state.pagination_mut().retreat();
        self.detail = None;
        self.load_current_page().await?;
        Ok(true)
    }

    pub fn search(&mut self, query: &str) -> usize {
        let visible = self.state.set_query(query);
        self.sync_map();
        visible
    }

    /// Looks up the user's position and ranks the loaded page by distance.
    ///
    /// On failure the session keeps whatever reference it had before.
    pub async fn locate(&mut self) -> Result<ReferenceLocation> {
        let location = self.locator.current_position().await.map_err(|e| {
            tracing::warn!("Error getting location: {}", e);
            LocatorError::from(e)
        })?;

        self.apply_reference_location(location);
        Ok(location)
    }

    pub fn apply_reference_location(&mut self, location: ReferenceLocation) {
        tracing::info!("Reference location set to {}", location);
        self.state.set_reference_location(location);
        self.map.place_user_marker(location);
        self.sync_map();
    }

    pub fn switch_view(&mut self, view: ViewMode) {
        self.view = view;
        if view == ViewMode::Map {
            self.sync_map();
        }
    }

    /// `position` is 1-based within the visible list.
    pub fn open_detail(&mut self, position: usize) -> Result<&BranchRecord> {
        let record = position
            .checked_sub(1)
            .and_then(|index| self.state.visible_record(index))
            .cloned()
            .ok_or_else(|| LocatorError::InvalidCommand {
                input: format!("open {}", position),
                reason: format!(
                    "only {} branches are listed",
                    self.state.visible_records().len()
                ),
            })?;

        if let Some(coordinates) = record.coordinates {
            self.map.focus(coordinates, DETAIL_ZOOM);
        }

        Ok(&*self.detail.insert(record))
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub async fn execute(&mut self, command: Command) -> Result<Flow> {
        tracing::debug!("Executing {:?}", command);
        match command {
            Command::Next => {
                self.next_page().await?;
            }
            Command::Previous => {
                self.previous_page().await?;
            }
            Command::Search(query) => {
                self.search(&query);
            }
            Command::View(view) => self.switch_view(view),
            Command::Locate => {
                self.locate().await?;
            }
            Command::Open(position) => {
                self.open_detail(position)?;
            }
            Command::Close => self.close_detail(),
            Command::Reload => {
                self.load_current_page().await?;
            }
            Command::Help => {}
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Pins every visible branch that has coordinates and fits the
    /// viewport around them.
    fn sync_map(&mut self) {
        let markers: Vec<Marker> = self
            .state
            .visible_records()
            .into_iter()
            .filter_map(|record| {
                record.coordinates.map(|position| Marker {
                    name: record.name.clone(),
                    position,
                })
            })
            .collect();

        self.map.place_markers(&markers);
        if let Some(bounds) = Bounds::from_points(markers.iter().map(|m| &m.position)) {
            self.map.fit_bounds(bounds, MAP_FIT);
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        if let LoadStatus::Failed(reason) = &self.status {
            tracing::debug!("Rendering error state: {}", reason);
            return Ok(format!("Error loading branches.\n\n{}", ERROR_STATE));
        }

        if let Some(record) = &self.detail {
            return Ok(render::render_detail(record, self.state.reference()));
        }

        let visible = self.state.visible_records();
        match (self.view, format) {
            (ViewMode::Map, _) => Ok(self.render_map_summary(&visible)),
            (ViewMode::List, OutputFormat::Json) => render::to_json(&visible),
            (ViewMode::List, OutputFormat::Csv) => render::to_csv(&visible),
            (ViewMode::List, OutputFormat::Text) => Ok(format!(
                "{}\n\n{}\n\n{}",
                render::results_summary(&self.state),
                render::render_list(&visible),
                self.page_footer()
            )),
        }
    }

    fn render_map_summary(&self, visible: &[&BranchRecord]) -> String {
        let mut lines = vec![render::results_summary(&self.state)];
        let pinned: Vec<String> = visible
            .iter()
            .filter_map(|record| {
                record
                    .coordinates
                    .map(|c| format!("  * {} ({})", record.name, c))
            })
            .collect();

        lines.push(format!("Map view: {} of {} branches pinned", pinned.len(), visible.len()));
        lines.extend(pinned);
        if let Some(location) = self.state.reference() {
            lines.push(format!("  @ You are here ({})", location));
        }
        lines.join("\n")
    }

    fn page_footer(&self) -> String {
        let pagination = self.state.pagination();
        let mut controls = Vec::new();
        if pagination.can_go_previous() {
            controls.push("prev");
        }
        if pagination.can_go_next() {
            controls.push("next");
        }

        let mut footer = if controls.is_empty() {
            format!("Page {}", pagination.current_page())
        } else {
            format!("Page {} [{}]", pagination.current_page(), controls.join(" | "))
        };
        if let Some(loaded_at) = self.state.loaded_at() {
            footer.push_str(&format!("  Updated {} UTC", loaded_at.format("%H:%M")));
        }
        footer
    }
}
