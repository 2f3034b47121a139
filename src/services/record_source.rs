//! Trait and types for fetching missed-stop records by reporting window.

use async_trait::async_trait;
use clap::ValueEnum;
use thiserror::Error;

use missed_stops_ops::records::MissRecord;

/// A reporting window the dashboard can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Window {
    Today,
    Yesterday,
    #[value(name = "week")]
    ThisWeek,
    #[value(name = "month")]
    ThisMonth,
    #[value(name = "all-time")]
    AllTime,
}

/// All windows, in the order the dashboard renders them.
pub const ALL_WINDOWS: [Window; 5] = [
    Window::Today,
    Window::Yesterday,
    Window::ThisWeek,
    Window::ThisMonth,
    Window::AllTime,
];

impl Window {
    pub fn label(&self) -> &'static str {
        match self {
            Window::Today => "Today's Missed Stops",
            Window::Yesterday => "Yesterday's Missed Stops",
            Window::ThisWeek => "This Week's Missed Stops",
            Window::ThisMonth => "This Month's Missed Stops",
            Window::AllTime => "All Time Missed Stops",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// The weekly log the dashboard depends on has not been created yet.
    /// This halts the view; an operator has to create the sheet.
    #[error(
        "weekly log '{title}' does not exist in the shared folder; \
         ask an admin to create this week's log sheet"
    )]
    MissingWeeklyLog { title: String },
    #[error("record fetch failed: {message}")]
    Backend { message: String },
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        FetchError::Backend {
            message: format!("{err:#}"),
        }
    }
}

/// Fetches the raw records for one reporting window.
///
/// A missing daily tab or master log yields an empty vec, not an error; only
/// the weekly window treats its missing container as fatal.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_records(&self, window: Window) -> Result<Vec<MissRecord>, FetchError>;
}
