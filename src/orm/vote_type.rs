//! Vote direction shared by thread_votes and comment_votes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    #[sea_orm(string_value = "up")]
    Up,
    #[sea_orm(string_value = "down")]
    Down,
}

impl VoteType {
    /// Parses form input. Anything but `up` or `down` is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::VoteType;

    #[test]
    fn test_parse_accepts_known_directions() {
        assert_eq!(VoteType::parse("up"), Some(VoteType::Up));
        assert_eq!(VoteType::parse("down"), Some(VoteType::Down));
    }

    #[test]
    fn test_parse_rejects_anything_else() {
        assert_eq!(VoteType::parse("UP"), None);
        assert_eq!(VoteType::parse("sideways"), None);
        assert_eq!(VoteType::parse(""), None);
    }
}
