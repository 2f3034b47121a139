//! Typed records parsed from raw spreadsheet value grids.
//!
//! The Sheets API returns a tab as rows of cells; the first row is the
//! header. Rows map to records by exact column name, and missing or short
//! cells default to empty strings so no row can fail the parse.

use serde::{Deserialize, Serialize};

/// A single missed-stop row as logged in the weekly and master sheets.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissRecord {
    pub address: String,
    pub collection_status: String,
    pub service_type: String,
    pub route: String,
    pub date: String,
    pub time_sent_to_jpm: String,
}

/// A per-address row from the address list sheet, carrying the zone and
/// route assignment for each service.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: String,
    pub msw_zone: String,
    pub msw_route: String,
    pub ss_zone: String,
    pub ss_route: String,
    pub yw_zone: String,
    pub yw_route: String,
}

fn column(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|h| h.trim() == name)
}

fn cell(row: &[String], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
}

/// Maps a header-mapped value grid into miss records.
///
/// An empty grid (no header row) yields no records.
pub fn from_rows(values: &[Vec<String>]) -> Vec<MissRecord> {
    let Some((header, rows)) = values.split_first() else {
        return Vec::new();
    };

    let address = column(header, "Address");
    let status = column(header, "Collection Status");
    let service = column(header, "Service Type");
    let route = column(header, "Route");
    let date = column(header, "Date");
    let sent = column(header, "Time Sent to JPM");

    rows.iter()
        .map(|row| MissRecord {
            address: cell(row, address),
            collection_status: cell(row, status),
            service_type: cell(row, service),
            route: cell(row, route),
            date: cell(row, date),
            time_sent_to_jpm: cell(row, sent),
        })
        .collect()
}

/// Maps the address list grid into address records.
pub fn address_from_rows(values: &[Vec<String>]) -> Vec<AddressRecord> {
    let Some((header, rows)) = values.split_first() else {
        return Vec::new();
    };

    let address = column(header, "Address");
    let msw_zone = column(header, "MSW Zone");
    let msw_route = column(header, "MSW Route");
    let ss_zone = column(header, "SS Zone");
    let ss_route = column(header, "SS Route");
    let yw_zone = column(header, "YW Zone");
    let yw_route = column(header, "YW Route");

    rows.iter()
        .map(|row| AddressRecord {
            address: cell(row, address),
            msw_zone: cell(row, msw_zone),
            msw_route: cell(row, msw_route),
            ss_zone: cell(row, ss_zone),
            ss_route: cell(row, ss_route),
            yw_zone: cell(row, yw_zone),
            yw_route: cell(row, yw_route),
        })
        .collect()
}
