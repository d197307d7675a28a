use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a file record.
///
/// `Pending` is initial, `Approved` is terminal, `Rejected` returns to
/// `Pending` when the owner resubmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    Pending,
    Approved,
    Rejected,
}

impl FileStatus {
    pub const ALL: [FileStatus; 3] = [FileStatus::Pending, FileStatus::Approved, FileStatus::Rejected];

    /// Numeric wire code: 0 pending, 1 approved, 2 rejected.
    pub fn code(self) -> u8 {
        match self {
            FileStatus::Pending => 0,
            FileStatus::Approved => 1,
            FileStatus::Rejected => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FileStatus::Pending),
            1 => Some(FileStatus::Approved),
            2 => Some(FileStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Pending => "pending",
            FileStatus::Approved => "approved",
            FileStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = String;

    /// Accepts a status name (case-insensitive) or its numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "0" => Ok(FileStatus::Pending),
            "approved" | "1" => Ok(FileStatus::Approved),
            "rejected" | "2" => Ok(FileStatus::Rejected),
            other => Err(format!("unknown file status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_wire_values() {
        assert_eq!(FileStatus::Pending.code(), 0);
        assert_eq!(FileStatus::Approved.code(), 1);
        assert_eq!(FileStatus::Rejected.code(), 2);
        for status in FileStatus::ALL {
            assert_eq!(FileStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(FileStatus::from_code(3), None);
    }

    #[test]
    fn parses_names_and_codes() {
        assert_eq!("Approved".parse::<FileStatus>().unwrap(), FileStatus::Approved);
        assert_eq!("2".parse::<FileStatus>().unwrap(), FileStatus::Rejected);
        assert!("archived".parse::<FileStatus>().is_err());
    }
}
