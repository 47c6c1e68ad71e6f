//! Sector taxonomy for simulated review work.
//!
//! Every catalog entry belongs to exactly one business sector. Sectors are
//! display tags only; they never influence routing or decisions.

use serde::{Deserialize, Serialize};

/// The business sectors a simulated task can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sector {
    Legal,
    Healthcare,
    Finance,
}

impl Sector {
    /// Returns all available sectors.
    pub fn all() -> Vec<Sector> {
        vec![Sector::Legal, Sector::Healthcare, Sector::Finance]
    }

    /// Returns the lowercase tag used in views and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Legal => "legal",
            Sector::Healthcare => "healthcare",
            Sector::Finance => "finance",
        }
    }

    /// Returns the human-readable display name for this sector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Sector::Legal => "Legal",
            Sector::Healthcare => "Healthcare",
            Sector::Finance => "Finance",
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legal" => Ok(Sector::Legal),
            "healthcare" => Ok(Sector::Healthcare),
            "finance" => Ok(Sector::Finance),
            other => Err(format!("unknown sector '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_all() {
        let all = Sector::all();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&Sector::Legal));
        assert!(all.contains(&Sector::Healthcare));
        assert!(all.contains(&Sector::Finance));
    }

    #[test]
    fn test_sector_parse_and_display() {
        for sector in Sector::all() {
            let parsed: Sector = sector.as_str().parse().expect("tag should parse");
            assert_eq!(parsed, sector);
            assert_eq!(sector.to_string(), sector.as_str());
        }
        assert_eq!("FINANCE".parse::<Sector>(), Ok(Sector::Finance));
        assert!("retail".parse::<Sector>().is_err());
    }

    #[test]
    fn test_sector_serde_tag() {
        let json = serde_json::to_string(&Sector::Healthcare).expect("should serialize");
        assert_eq!(json, "\"healthcare\"");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Sector::Legal.display_name(), "Legal");
        assert_eq!(Sector::Healthcare.display_name(), "Healthcare");
        assert_eq!(Sector::Finance.display_name(), "Finance");
    }
}
