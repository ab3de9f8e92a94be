//! Consumer-side filters applied after visibility: upcoming/past tab and
//! category.

use serde::{Deserialize, Serialize};

use crate::join::EventViewModel;
use crate::types::Timestamp;

pub const TAB_UPCOMING: &str = "upcoming";
pub const TAB_PAST: &str = "past";

/// Category filter value that disables category filtering.
pub const CATEGORY_ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    /// Events at or after `now`.
    #[default]
    Upcoming,
    /// Events strictly before `now`.
    Past,
}

impl Tab {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            TAB_UPCOMING => Ok(Self::Upcoming),
            TAB_PAST => Ok(Self::Past),
            _ => Err(format!(
                "Invalid tab '{s}'. Must be one of: {TAB_UPCOMING}, {TAB_PAST}"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => TAB_UPCOMING,
            Self::Past => TAB_PAST,
        }
    }

    fn matches(&self, date: Timestamp, now: Timestamp) -> bool {
        match self {
            Self::Upcoming => date >= now,
            Self::Past => date < now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Match on the resolved category name.
    Named(String),
}

impl CategoryFilter {
    /// `"all"` (any case) disables the filter; anything else is a name.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(CATEGORY_ALL) {
            Self::All
        } else {
            Self::Named(s.to_string())
        }
    }

    fn matches(&self, category_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == category_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub tab: Tab,
    pub category: CategoryFilter,
}

impl FilterOptions {
    pub fn matches(&self, vm: &EventViewModel, now: Timestamp) -> bool {
        self.tab.matches(vm.date, now) && self.category.matches(&vm.category_name)
    }
}

/// Select the view models passing `options`, preserving order.
pub fn apply_filters(
    view_models: &[EventViewModel],
    options: &FilterOptions,
    now: Timestamp,
) -> Vec<EventViewModel> {
    view_models
        .iter()
        .filter(|vm| options.matches(vm, now))
        .cloned()
        .collect()
}
