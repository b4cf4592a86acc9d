use overbot_framework::{
    context::{BotContext, CommandContext},
    spawn_command,
};

pub mod profile;

/// Starts the handler registered under the command's full name. Returns false
/// if no handler knows the command.
pub fn dispatch(bot: &BotContext, ctx: CommandContext) -> bool {
    let name = ctx.name.clone();
    match name.as_str() {
        "profile list" => spawn_command!(bot, ctx, profile::profile_list),
        "profile link" => spawn_command!(bot, ctx, profile::profile_link),
        "profile update" => spawn_command!(bot, ctx, profile::profile_update),
        "profile unlink" => spawn_command!(bot, ctx, profile::profile_unlink),
        "profile ratings" => spawn_command!(bot, ctx, profile::profile_ratings),
        "profile nickname" => spawn_command!(bot, ctx, profile::profile_nickname),
        "profile graph" => spawn_command!(bot, ctx, profile::profile_graph),
        _ => {
            tracing::warn!(name = %name, "received an unknown command");
            return false;
        }
    }
    true
}
