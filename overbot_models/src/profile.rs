use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type};

use crate::id::{ProfileId, UserId};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    pub id: ProfileId,
    pub member_id: UserId,
    pub platform: Platform,
    pub username: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Pc,
    Xbox,
    Playstation,
    NintendoSwitch,
}

/// Free-text spellings accepted for a platform, already lowercased.
pub const PLATFORM_ALIASES: &[(&str, Platform)] = &[
    ("pc", Platform::Pc),
    ("bnet", Platform::Pc),
    ("xbl", Platform::Xbox),
    ("xbox", Platform::Xbox),
    ("ps", Platform::Playstation),
    ("psn", Platform::Playstation),
    ("ps4", Platform::Playstation),
    ("play", Platform::Playstation),
    ("playstation", Platform::Playstation),
    ("nsw", Platform::NintendoSwitch),
    ("switch", Platform::NintendoSwitch),
    ("nintendo-switch", Platform::NintendoSwitch),
];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownPlatform(pub String);

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Pc,
        Platform::Xbox,
        Platform::Playstation,
        Platform::NintendoSwitch,
    ];

    /// The value stored in the `profile.platform` column and used in provider routes.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Platform::Pc => "pc",
            Platform::Xbox => "xbl",
            Platform::Playstation => "psn",
            Platform::NintendoSwitch => "nintendo-switch",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Platform::Pc => "PC",
            Platform::Xbox => "Xbox",
            Platform::Playstation => "PlayStation",
            Platform::NintendoSwitch => "Nintendo Switch",
        }
    }

    /// Resolves user input such as `PS4` or `bnet` to a platform.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPlatform`] when the input matches no alias.
    pub fn from_alias(input: &str) -> Result<Self, UnknownPlatform> {
        let normalized = input.trim().to_lowercase();
        PLATFORM_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, platform)| *platform)
            .ok_or_else(|| UnknownPlatform(input.to_string()))
    }
}

/// Checks that every platform can be reached from the alias table and that every
/// alias is normalized. Run once at start-up.
///
/// # Errors
///
/// Returns a description of the first inconsistency found.
pub fn validate_aliases() -> Result<(), String> {
    for (alias, _) in PLATFORM_ALIASES {
        if alias.to_lowercase() != *alias || alias.trim() != *alias {
            return Err(format!("platform alias `{alias}` is not normalized"));
        }
    }
    for platform in Platform::ALL {
        if !PLATFORM_ALIASES.iter().any(|(_, p)| *p == platform) {
            return Err(format!("no alias resolves to {platform:?}"));
        }
        if Platform::from_alias(platform.key()) != Ok(platform) {
            return Err(format!("storage key of {platform:?} does not resolve back"));
        }
    }
    Ok(())
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.display_name())
    }
}

impl Display for UnknownPlatform {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "unknown platform: {}", self.0)
    }
}

impl StdError for UnknownPlatform {}

impl TryFrom<tokio_postgres::Row> for Profile {
    type Error = tokio_postgres::Error;

    fn try_from(row: tokio_postgres::Row) -> Result<Self, Self::Error> {
        let id = row.try_get("id")?;
        let member_id = row.try_get("member_id")?;
        let platform = row.try_get("platform")?;
        let username = row.try_get("username")?;

        Ok(Self {
            id,
            member_id,
            platform,
            username,
        })
    }
}

impl ToSql for Platform {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        <&str as ToSql>::to_sql(&self.key(), ty, out)
    }

    fn accepts(ty: &Type) -> bool {
        <&str as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Platform {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let key = <&str as FromSql>::from_sql(ty, raw)?;
        Ok(key.parse::<Platform>()?)
    }

    fn accepts(ty: &Type) -> bool {
        <&str as FromSql>::accepts(ty)
    }
}
