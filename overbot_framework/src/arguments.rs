use overbot_models::{
    discord::application::interaction::application_command::{
        CommandDataOption, CommandOptionValue,
    },
    id::UserId,
    profile::Platform,
};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Debug, Eq, PartialEq)]
pub enum ArgumentError {
    /// A required option was not sent.
    Missing(&'static str),
    /// The option was sent with a value the command cannot use. Holds the
    /// message shown to the user.
    BadArgument(String),
}

pub trait Arguments {
    fn from_interaction(options: &[CommandDataOption]) -> Result<Self, ArgumentError>
    where
        Self: Sized;
}

pub trait Argument {
    fn from_interaction(option: &CommandDataOption) -> Result<Self, ArgumentError>
    where
        Self: Sized;
}

impl Arguments for () {
    fn from_interaction(_: &[CommandDataOption]) -> Result<Self, ArgumentError> {
        Ok(())
    }
}

/// Parses the option called `name`.
///
/// # Errors
///
/// Returns [`ArgumentError::Missing`] when the option was not sent.
pub fn required<T: Argument>(
    options: &[CommandDataOption],
    name: &'static str,
) -> Result<T, ArgumentError> {
    match options.iter().find(|o| o.name == name) {
        Some(option) => T::from_interaction(option),
        None => Err(ArgumentError::Missing(name)),
    }
}

/// Parses the option called `name` if it was sent.
///
/// # Errors
///
/// Returns Err when the option was sent but does not parse.
pub fn optional<T: Argument>(
    options: &[CommandDataOption],
    name: &'static str,
) -> Result<Option<T>, ArgumentError> {
    options
        .iter()
        .find(|o| o.name == name)
        .map(T::from_interaction)
        .transpose()
}

impl Argument for UserId {
    fn from_interaction(option: &CommandDataOption) -> Result<Self, ArgumentError> {
        match &option.value {
            CommandOptionValue::User(value) => Ok(UserId(*value)),
            CommandOptionValue::Integer(value) => u64::try_from(*value)
                .ok()
                .filter(|v| *v != 0)
                .map(UserId::new)
                .ok_or_else(|| ArgumentError::BadArgument(format!("`{value}` is not a member"))),
            _ => Err(ArgumentError::BadArgument(format!(
                "`{}` expects a member",
                option.name
            ))),
        }
    }
}

impl Argument for String {
    fn from_interaction(option: &CommandDataOption) -> Result<Self, ArgumentError> {
        match &option.value {
            CommandOptionValue::String(value) => Ok(value.trim().to_string()),
            _ => Err(ArgumentError::BadArgument(format!(
                "`{}` expects text",
                option.name
            ))),
        }
    }
}

impl Argument for Platform {
    fn from_interaction(option: &CommandDataOption) -> Result<Self, ArgumentError> {
        let value = String::from_interaction(option)?;
        Platform::from_alias(&value).map_err(|err| ArgumentError::BadArgument(err.to_string()))
    }
}

impl Display for ArgumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ArgumentError::Missing(name) => write!(f, "missing the `{name}` option"),
            ArgumentError::BadArgument(message) => f.write_str(message),
        }
    }
}

impl StdError for ArgumentError {}
