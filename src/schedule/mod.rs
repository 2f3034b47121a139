//! Calendar-driven business rules for collection operations.
//!
//! This module maps dates to operating zones and yard-waste rotation codes,
//! derives the canonical weekly-log titles and daily-tab labels, decodes a
//! route's service type from its numeric code, and counts the routes active
//! in today's zone.

pub mod calendar;
pub mod routes;
pub mod service;
