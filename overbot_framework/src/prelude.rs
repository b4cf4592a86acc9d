pub use crate::arguments::{optional, required, Argument, ArgumentError, Arguments};
pub use crate::chooser::StandbyChooser;
pub use crate::context::{BotContext, CommandContext};
pub use crate::error::FrameworkError;
pub use crate::handle_error;
pub use crate::prompt::prompt;

pub use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};

pub type CommandResult = Result<(), FrameworkError>;

pub const DARK_GREEN: u32 = 0x001F_8B4C;
