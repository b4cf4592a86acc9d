use dashmap::DashMap;
use overbot_core::{
    error::OverError,
    nickname::NicknameSync,
    profiles::ProfileLimits,
    selector::{ProfileChooser, ProfileSelector},
};
use overbot_database::Database;
use overbot_models::{
    discord::{
        application::interaction::application_command::CommandDataOption,
        channel::{
            message::{Component, Embed, MessageFlags},
            Message,
        },
        http::attachment::Attachment,
        id::{
            marker::{ApplicationMarker, InteractionMarker},
            Id,
        },
    },
    id::{GuildId, UserId},
};
use overbot_overwatch::OverwatchClient;
use std::{
    future::{Future, IntoFuture},
    ops::Deref,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::Notify;
use twilight_http::Client as TwilightClient;
use twilight_standby::Standby;

use crate::nicknames::DiscordNicknames;

pub struct BotContextInner {
    /// The module used to make requests to discord
    pub http: Arc<TwilightClient>,
    pub application_id: Id<ApplicationMarker>,
    pub database: Arc<Database>,
    pub overwatch: OverwatchClient,
    /// Receives component interactions forwarded by the endpoint
    pub standby: Arc<Standby>,
    pub nicknames: DiscordNicknames,
    pub menus: OpenMenus,
    pub settings: Settings,
}

#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub limits: ProfileLimits,
    pub select_timeout: Duration,
    pub nickname_length: usize,
}

#[derive(Clone)]
pub struct BotContext(pub Arc<BotContextInner>);

pub struct CommandContext {
    /// The full command path, e.g. `profile link`
    pub name: String,
    pub guild_id: Option<GuildId>,
    pub author_id: UserId,
    /// The author's username, used as the base of their nickname
    pub author_name: String,
    pub interaction_id: Id<InteractionMarker>,
    pub interaction_token: String,
    /// The options of the invoked subcommand
    pub options: Vec<CommandDataOption>,
    pub callback_invoked: AtomicBool,
}

impl BotContext {
    #[must_use]
    pub fn new(
        http: Arc<TwilightClient>,
        application_id: Id<ApplicationMarker>,
        database: Arc<Database>,
        overwatch: OverwatchClient,
        settings: Settings,
    ) -> Self {
        Self(Arc::new(BotContextInner {
            nicknames: DiscordNicknames { http: http.clone() },
            http,
            application_id,
            database,
            overwatch,
            standby: Arc::new(Standby::new()),
            menus: OpenMenus::default(),
            settings,
        }))
    }

    #[must_use]
    pub fn selector<'a>(&'a self, chooser: &'a dyn ProfileChooser) -> ProfileSelector<'a> {
        ProfileSelector {
            profiles: self.database.as_ref(),
            chooser,
            limits: self.settings.limits,
            timeout: self.settings.select_timeout,
        }
    }

    #[must_use]
    pub fn nickname_sync(&self) -> NicknameSync<'_> {
        let database = self.database.as_ref();
        NicknameSync {
            bindings: database,
            profiles: database,
            ratings: database,
            mutator: &self.nicknames,
            max_length: self.settings.nickname_length,
        }
    }

    /// Registers a new menu for `member` and cancels the one they had open.
    #[must_use]
    pub fn open_menu(&self, member: UserId) -> Arc<Notify> {
        self.menus.open(member)
    }

    pub fn close_menu(&self, member: UserId, notify: &Arc<Notify>) {
        self.menus.close(member, notify);
    }
}

/// The open menu of every member, used to cancel it when a newer one opens.
#[derive(Default)]
pub struct OpenMenus(DashMap<UserId, Arc<Notify>>);

impl OpenMenus {
    #[must_use]
    pub fn open(&self, member: UserId) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        if let Some(previous) = self.0.insert(member, notify.clone()) {
            tracing::debug!(member = %member, "superseding an open menu");
            previous.notify_one();
        }
        notify
    }

    /// Forgets the menu unless a newer one already replaced it.
    pub fn close(&self, member: UserId, notify: &Arc<Notify>) {
        self.0
            .remove_if(&member, |_, current| Arc::ptr_eq(current, notify));
    }
}

impl Deref for BotContext {
    type Target = BotContextInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl CommandContext {
    /// Sends a message for this command. The first call edits the deferred
    /// response, later calls send followups.
    #[must_use]
    pub fn respond<'a>(&'a self, bot: &'a BotContext) -> Respond<'a> {
        Respond {
            bot,
            ctx: self,
            content: None,
            components: None,
            embeds: None,
            attachments: None,
            ephemeral: false,
        }
    }
}

#[must_use = "a response does nothing unless awaited"]
pub struct Respond<'a> {
    bot: &'a BotContext,
    ctx: &'a CommandContext,
    content: Option<&'a str>,
    components: Option<&'a [Component]>,
    embeds: Option<&'a [Embed]>,
    attachments: Option<&'a [Attachment]>,
    ephemeral: bool,
}

impl<'a> Respond<'a> {
    pub fn content(mut self, content: &'a str) -> Self {
        self.content = Some(content);
        self
    }

    pub fn components(mut self, components: &'a [Component]) -> Self {
        self.components = Some(components);
        self
    }

    pub fn embeds(mut self, embeds: &'a [Embed]) -> Self {
        self.embeds = Some(embeds);
        self
    }

    pub fn attachments(mut self, attachments: &'a [Attachment]) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Only has an effect on followups.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    async fn exec(self) -> Result<Message, OverError> {
        let client = self.bot.http.interaction(self.bot.application_id);
        let token = self.ctx.interaction_token.as_str();

        let response = if self.ctx.callback_invoked.swap(true, Ordering::AcqRel) {
            let mut req = client.create_followup(token);
            if let Some(content) = self.content {
                req = req.content(content);
            }
            if let Some(components) = self.components {
                req = req.components(components);
            }
            if let Some(embeds) = self.embeds {
                req = req.embeds(embeds);
            }
            if let Some(attachments) = self.attachments {
                req = req.attachments(attachments);
            }
            if self.ephemeral {
                req = req.flags(MessageFlags::EPHEMERAL);
            }
            req.await?
        } else {
            let mut req = client.update_response(token);
            if let Some(content) = self.content {
                req = req.content(Some(content));
            }
            if let Some(components) = self.components {
                req = req.components(Some(components));
            }
            if let Some(embeds) = self.embeds {
                req = req.embeds(Some(embeds));
            }
            if let Some(attachments) = self.attachments {
                req = req.attachments(attachments);
            }
            req.await?
        };

        Ok(response.model().await?)
    }
}

impl<'a> IntoFuture for Respond<'a> {
    type Output = Result<Message, OverError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn a_newer_menu_cancels_the_older_one() {
        let menus = OpenMenus::default();
        let member = UserId::new(1);

        let first = menus.open(member);
        let second = menus.open(member);

        assert!(timeout(WAIT, first.notified()).await.is_ok());
        assert!(timeout(WAIT, second.notified()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn menus_of_other_members_are_left_open() {
        let menus = OpenMenus::default();
        let first = menus.open(UserId::new(1));
        let _other = menus.open(UserId::new(2));

        assert!(timeout(WAIT, first.notified()).await.is_err());
    }

    #[test]
    fn closing_a_replaced_menu_keeps_the_newer_one() {
        let menus = OpenMenus::default();
        let member = UserId::new(1);

        let stale = menus.open(member);
        let current = menus.open(member);
        menus.close(member, &stale);
        assert!(menus
            .0
            .get(&member)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), &current)));

        menus.close(member, &current);
        assert!(menus.0.get(&member).is_none());
    }
}
