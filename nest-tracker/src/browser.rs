use crate::types::{ItemCatalog, ItemId, ItemPage, ItemRecord, TransformedState, DEFAULT_PAGE_SIZE};
use std::fmt;
use std::str::FromStr;

pub const LOADING_STATUS: &str = "Loading data...";
pub const LOADING_RANDOM_STATUS: &str = "Loading random items...";
pub const LOADED_STATUS: &str = "Data loaded.";
pub const LOAD_FAILED_STATUS: &str = "Failed to load data.";
pub const INVALID_ID_STATUS: &str = "Invalid Item ID";
pub const DETAILS_PLACEHOLDER: &str = "Click on an item to get details!";
pub const UNNAMED_ITEM: &str = "Unknown Item";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemFilter {
    #[default]
    All,
    Unknown,
    Transformed,
    NotTransformed,
}

impl ItemFilter {
    pub const ALL: [ItemFilter; 4] = [
        ItemFilter::All,
        ItemFilter::Unknown,
        ItemFilter::Transformed,
        ItemFilter::NotTransformed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ItemFilter::All => "All",
            ItemFilter::Unknown => "Unknown",
            ItemFilter::Transformed => "Transformed",
            ItemFilter::NotTransformed => "Not Transformed",
        }
    }

    /// `transformedState` query value, `None` when listing everything.
    pub fn transformed_state(self) -> Option<&'static str> {
        match self {
            ItemFilter::All => None,
            ItemFilter::Unknown => Some("unknown"),
            ItemFilter::Transformed => Some("yes"),
            ItemFilter::NotTransformed => Some("no"),
        }
    }
}

impl fmt::Display for ItemFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ItemFilter {
    type Err = String;

    /// Accepts the display labels and the service's state tags.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ItemFilter::All),
            "unknown" => Ok(ItemFilter::Unknown),
            "transformed" | "yes" => Ok(ItemFilter::Transformed),
            "not transformed" | "not-transformed" | "no" => Ok(ItemFilter::NotTransformed),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}

/// A read the host should issue against the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseRequest {
    Everything,
    Filtered { filter: ItemFilter, page: u32, size: u32 },
    ById(ItemId),
    RandomUnknown { count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Yellow,
    Green,
    Red,
    White,
}

/// Symbol drawn over an item icon for its transformed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateBadge {
    pub symbol: char,
    pub color: BadgeColor,
}

impl StateBadge {
    pub fn for_state(state: &TransformedState) -> Self {
        let (symbol, color) = match state {
            TransformedState::Unknown => ('?', BadgeColor::Yellow),
            TransformedState::Yes => ('Y', BadgeColor::Green),
            TransformedState::No => ('N', BadgeColor::Red),
            TransformedState::Other(_) => ('?', BadgeColor::White),
        };
        Self { symbol, color }
    }
}

pub fn status_text(state: &TransformedState) -> &'static str {
    match state {
        TransformedState::Unknown => "Unknown if item transforms.",
        TransformedState::Yes => "Item transforms.",
        TransformedState::No => "Item does not transform.",
        TransformedState::Other(_) => "Transformation state unknown.",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    pub name: String,
    pub item_id: ItemId,
    pub status_text: &'static str,
    pub badge: StateBadge,
}

impl ItemDetails {
    pub fn from_record(record: &ItemRecord) -> Self {
        let name = match record.item_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => UNNAMED_ITEM.to_string(),
        };

        Self {
            name,
            item_id: record.item_id,
            status_text: status_text(&record.transformed_state),
            badge: StateBadge::for_state(&record.transformed_state),
        }
    }
}

impl fmt::Display for ItemDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Item ID: {}", self.item_id)?;
        write!(f, "Status: {}", self.status_text)
    }
}

/// Headless state of the item listing panel: paging, filtering, search and
/// the details shown for a selected item. Rendering is left to the host.
pub struct ItemBrowser {
    filter: ItemFilter,
    current_page: u32,
    page_size: u32,
    items: Vec<ItemRecord>,
    total: u64,
    selected: Option<usize>,
    status: String,
    next_enabled: bool,
    previous_enabled: bool,
    pagination_label: String,
}

impl Default for ItemBrowser {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ItemBrowser {
    pub fn new(page_size: u32) -> Self {
        Self {
            filter: ItemFilter::All,
            current_page: 0,
            page_size: page_size.max(1),
            items: Vec::new(),
            total: 0,
            selected: None,
            status: LOADING_STATUS.to_string(),
            next_enabled: false,
            previous_enabled: false,
            pagination_label: String::new(),
        }
    }

    pub fn filter(&self) -> ItemFilter {
        self.filter
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn next_enabled(&self) -> bool {
        self.next_enabled
    }

    pub fn previous_enabled(&self) -> bool {
        self.previous_enabled
    }

    pub fn pagination_label(&self) -> &str {
        &self.pagination_label
    }

    pub fn change_filter(&mut self, filter: ItemFilter) -> BrowseRequest {
        self.filter = filter;
        self.current_page = 0;
        self.status = LOADING_STATUS.to_string();
        self.page_request()
    }

    /// Jumps straight to `page` under the current filter.
    pub fn go_to_page(&mut self, page: u32) -> BrowseRequest {
        self.current_page = page;
        self.status = LOADING_STATUS.to_string();
        self.page_request()
    }

    pub fn previous_page(&mut self) -> Option<BrowseRequest> {
        if self.current_page == 0 {
            return None;
        }
        self.current_page -= 1;
        self.status = LOADING_STATUS.to_string();
        Some(self.page_request())
    }

    pub fn next_page(&mut self) -> BrowseRequest {
        self.current_page = self.current_page.saturating_add(1);
        self.status = LOADING_STATUS.to_string();
        self.page_request()
    }

    pub fn random_unknown(&mut self) -> BrowseRequest {
        self.status = LOADING_RANDOM_STATUS.to_string();
        BrowseRequest::RandomUnknown { count: self.page_size }
    }

    /// Parses the search box. Blank input issues nothing; anything that is
    /// not an integer only updates the status.
    pub fn search(&mut self, input: &str) -> Option<BrowseRequest> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        match input.parse::<ItemId>() {
            Ok(item_id) => {
                self.status = format!("Searching for item ID: {}", item_id);
                Some(BrowseRequest::ById(item_id))
            }
            Err(_) => {
                self.set_error(INVALID_ID_STATUS);
                None
            }
        }
    }

    /// Replaces the listing with a page returned by the service, naming
    /// each item from the local catalog.
    pub fn apply_page(&mut self, page: ItemPage, catalog: &dyn ItemCatalog) {
        self.items = page
            .items
            .into_iter()
            .map(|mut record| {
                record.item_name = catalog.item_name(record.item_id);
                record
            })
            .collect();
        self.total = page.total;
        self.selected = None;
        self.status = LOADED_STATUS.to_string();

        let first = u64::from(self.current_page) * u64::from(self.page_size);
        self.pagination_label = format!(
            "Showing {}-{} of {}",
            first + 1,
            first + self.items.len() as u64,
            self.total
        );
        self.next_enabled = self.items.len() == self.page_size as usize;
        self.previous_enabled = self.current_page > 0;
    }

    pub fn set_error(&mut self, message: &str) {
        self.status = message.to_string();
    }

    /// Selects the item at `index`; out of range clears the selection.
    pub fn select(&mut self, index: Option<usize>) -> Option<ItemDetails> {
        self.selected = index.filter(|i| *i < self.items.len());
        self.details()
    }

    pub fn details(&self) -> Option<ItemDetails> {
        self.selected
            .and_then(|i| self.items.get(i))
            .map(ItemDetails::from_record)
    }

    /// Text for the details area, the placeholder when nothing is selected.
    pub fn details_text(&self) -> String {
        match self.details() {
            Some(details) => details.to_string(),
            None => DETAILS_PLACEHOLDER.to_string(),
        }
    }

    fn page_request(&self) -> BrowseRequest {
        BrowseRequest::Filtered {
            filter: self.filter,
            page: self.current_page,
            size: self.page_size,
        }
    }
}
