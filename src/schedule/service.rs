use serde::{Deserialize, Serialize};
use std::fmt;

/// The three collection service types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    /// Municipal solid waste.
    Msw,
    /// Single-stream recycling.
    Ss,
    /// Yard waste.
    Yw,
}

/// All service types, in display order.
pub const SERVICE_TYPES: [ServiceType; 3] =
    [ServiceType::Msw, ServiceType::Ss, ServiceType::Yw];

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Msw => "MSW",
            ServiceType::Ss => "SS",
            ServiceType::Yw => "YW",
        }
    }

    /// Determines the service type from a 4-digit route code.
    ///
    /// The route is left-padded with zeros to width 4. A '3' in the second
    /// position means single-stream; otherwise a '4' in the third position
    /// means yard waste; everything else is municipal solid waste.
    pub fn from_route(route: &str) -> Self {
        let padded = format!("{route:0>4}");
        let bytes = padded.as_bytes();
        if bytes[1] == b'3' {
            ServiceType::Ss
        } else if bytes[2] == b'4' {
            ServiceType::Yw
        } else {
            ServiceType::Msw
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
