//! Reading single environment toggles under strict or lenient rules.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SessionConfigError};

/// One variable as found in the environment.
pub(super) enum Toggle<T> {
    Missing { name: &'static str },
    Invalid { name: &'static str, value: String },
    Valid(T),
}

impl<T: std::fmt::Debug> Toggle<T> {
    pub(super) fn read<E: Env>(env: &E, name: &'static str, parse: fn(&str) -> Option<T>) -> Self {
        match env.string(name) {
            None => Self::Missing { name },
            Some(value) => match parse(value.trim()) {
                Some(parsed) => Self::Valid(parsed),
                None => Self::Invalid { name, value },
            },
        }
    }

    /// Release builds turn anything but a valid value into an error; debug
    /// builds substitute `fallback` and warn.
    pub(super) fn resolve(
        self,
        mode: BuildMode,
        fallback: T,
        expected: &'static str,
    ) -> Result<T, SessionConfigError> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Missing { name } if mode.is_lenient() => {
                warn!(variable = name, default = ?fallback, "session toggle not set; using default");
                Ok(fallback)
            }
            Self::Invalid { name, value } if mode.is_lenient() => {
                warn!(
                    variable = name,
                    %value,
                    default = ?fallback,
                    "invalid session toggle; using default"
                );
                Ok(fallback)
            }
            Self::Missing { name } => Err(SessionConfigError::MissingEnv { name }),
            Self::Invalid { name, value } => Err(SessionConfigError::InvalidEnv {
                name,
                value,
                expected,
            }),
        }
    }
}

pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

pub(super) fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(true))]
    #[case("YES", Some(true))]
    #[case("n", Some(false))]
    #[case("off", None)]
    #[case("", None)]
    fn booleans_accept_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(raw), expected);
    }

    #[rstest]
    #[case("strict", Some(SameSite::Strict))]
    #[case("Lax", Some(SameSite::Lax))]
    #[case("NONE", Some(SameSite::None))]
    #[case("relaxed", None)]
    fn same_site_is_case_insensitive(#[case] raw: &str, #[case] expected: Option<SameSite>) {
        assert_eq!(parse_same_site(raw), expected);
    }

    #[rstest]
    fn lenient_mode_substitutes_the_fallback() {
        let toggle = Toggle::<bool>::Invalid {
            name: "SESSION_COOKIE_SECURE",
            value: "maybe".to_owned(),
        };
        assert!(toggle.resolve(BuildMode::Debug, true, "bool").expect("fallback"));
    }

    #[rstest]
    fn strict_mode_names_the_missing_variable() {
        let toggle = Toggle::<bool>::Missing {
            name: "SESSION_COOKIE_SECURE",
        };
        let err = toggle
            .resolve(BuildMode::Release, true, "bool")
            .expect_err("missing is fatal");
        assert!(matches!(
            err,
            SessionConfigError::MissingEnv {
                name: "SESSION_COOKIE_SECURE"
            }
        ));
    }
}
