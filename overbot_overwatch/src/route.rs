use overbot_models::profile::Platform;
use url::{ParseError, Url};

pub enum Route<'a> {
    Profile {
        base: &'a str,
        platform: Platform,
        username: &'a str,
    },
}

impl Route<'_> {
    /// The full request URL. Every path segment is percent-encoded, so a
    /// username can never add segments or a query.
    ///
    /// # Errors
    ///
    /// Returns Err if the base is not an absolute URL.
    pub fn url(&self) -> Result<Url, ParseError> {
        match self {
            Route::Profile {
                base,
                platform,
                username,
            } => {
                let mut url = Url::parse(base)?;
                url.path_segments_mut()
                    .map_err(|()| ParseError::RelativeUrlWithCannotBeABaseBase)?
                    .pop_if_empty()
                    .push(platform.key())
                    .push("us")
                    .push(&battletag_segment(username))
                    .push("profile");
                Ok(url)
            }
        }
    }
}

/// BattleTags are addressed with `-` in place of `#`.
fn battletag_segment(username: &str) -> String {
    username.replace('#', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(base: &str, platform: Platform, username: &str) -> String {
        Route::Profile {
            base,
            platform,
            username,
        }
        .url()
        .unwrap()
        .to_string()
    }

    #[test]
    fn profile_route() {
        assert_eq!(
            profile("https://ow-api.com/v1/stats/", Platform::Pc, "Player#1234"),
            "https://ow-api.com/v1/stats/pc/us/Player-1234/profile"
        );
        assert_eq!(
            profile("https://ow-api.com/v1/stats", Platform::Pc, "Player#1234"),
            "https://ow-api.com/v1/stats/pc/us/Player-1234/profile"
        );
    }

    #[test]
    fn console_names_are_escaped() {
        assert_eq!(
            profile("http://localhost", Platform::Xbox, "Some Gamer"),
            "http://localhost/xbl/us/Some%20Gamer/profile"
        );
    }

    #[test]
    fn reserved_characters_stay_in_one_segment() {
        let url = Route::Profile {
            base: "http://localhost/v1/stats",
            platform: Platform::Pc,
            username: "a/b?c%#1",
        }
        .url()
        .unwrap();

        assert_eq!(url.path(), "/v1/stats/pc/us/a%2Fb%3Fc%25-1/profile");
        assert_eq!(url.query(), None);
        assert_eq!(url.path_segments().unwrap().count(), 6);
    }

    #[test]
    fn non_ascii_names_are_percent_encoded() {
        let url = profile("http://localhost", Platform::Pc, "플레이어#3001");
        assert!(url.is_ascii());
        assert_eq!(
            url,
            "http://localhost/pc/us/%ED%94%8C%EB%A0%88%EC%9D%B4%EC%96%B4-3001/profile"
        );
    }

    #[test]
    fn relative_base_is_rejected() {
        let route = Route::Profile {
            base: "not a url",
            platform: Platform::Pc,
            username: "Player#1",
        };
        assert!(route.url().is_err());
    }
}
