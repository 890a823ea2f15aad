//! Command bridge: exposes the admin use cases to a front end.
//!
//! The `speedup` CLI is the front end shipped here, but nothing in this module
//! prints or parses arguments; any host (a web admin page, a hook runner)
//! can call [`dispatch`] and [`settings_panel`] with an [`AdminContext`] and
//! render the results itself.  Page output is passed through
//! [`filter_content`] before it is served.
//!
//! # Commands
//!
//! Every admin action is one [`Command`].  Commands keep the action names the
//! host already posts (`speedup_toggle_gzip`, ...), so a form that used to
//! trigger the old handler maps onto [`Command::from_action`] unchanged.
//!
//! # `CommandResult<T>` wrapper
//!
//! Every entry point returns `CommandResult<T>` rather than `Result<T, E>`,
//! so each response has the same JSON shape:
//! `{ success: bool, data: T | null, error: string | null, redirect: string | null }`.
//! After an action the front end is expected to go back to `redirect`, where
//! the panel picks up the notice the action left behind.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use speedup_core::content::lazy_load_images;
use speedup_core::{
    site_domain, BlockCatalog, Feature, FeatureState, PresencePolicy, SiteUrlError,
};
use thiserror::Error;
use tracing::info;

use crate::application::notices::{take_notice, Notice};
use crate::application::state::{self, StateStore, StoreError};
use crate::application::toggle_feature::{
    ErrorKind, SectionStore, ToggleController, VerificationProbe,
};
use crate::application::toggle_setting::{setting_state, toggle_setting, Setting};
use crate::infrastructure::network::probe::HttpProbe;
use crate::infrastructure::storage::block_file::BlockFileEditor;
use crate::infrastructure::storage::config::{AppConfig, ConfigError};
use crate::infrastructure::storage::state_file::TomlStateStore;

// ── Shared admin context ──────────────────────────────────────────────────────

/// Error raised while wiring the admin context from the config.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("invalid site URL: {0}")]
    SiteUrl(#[from] SiteUrlError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not open the state store: {0}")]
    Store(#[from] StoreError),
}

/// Everything one admin request needs, built once from [`AppConfig`].
///
/// Collaborators are shared behind `Arc`s; a fresh [`ToggleController`] is
/// assembled from them for every command.
pub struct AdminContext {
    config: AppConfig,
    catalog: BlockCatalog,
    sections: Arc<dyn SectionStore>,
    probe: Arc<dyn VerificationProbe>,
    store: Arc<dyn StateStore>,
}

impl AdminContext {
    /// Wires the production adapters: the `.htaccess` under the document
    /// root, the HTTP probe against the base URL and the TOML state file.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] if the base URL has no host, the state file
    /// location cannot be resolved, or the state file is unreadable.
    pub fn from_config(config: AppConfig) -> Result<Self, ContextError> {
        let policy: Arc<dyn PresencePolicy> = Arc::from(config.detection.policy());
        let sections = Arc::new(BlockFileEditor::with_policy(
            config.site.htaccess_path(),
            policy,
        ));
        let probe = Arc::new(HttpProbe::new(
            config.site.base_url.clone(),
            config.probe.timeout(),
        ));
        let store = Arc::new(TomlStateStore::open(config.admin.state_file_path()?)?);
        Self::with_parts(config, sections, probe, store)
    }

    /// Wires the context from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::SiteUrl`] if the base URL has no host.
    pub fn with_parts(
        config: AppConfig,
        sections: Arc<dyn SectionStore>,
        probe: Arc<dyn VerificationProbe>,
        store: Arc<dyn StateStore>,
    ) -> Result<Self, ContextError> {
        let catalog = BlockCatalog::new(site_domain(&config.site.base_url)?);
        Ok(Self {
            config,
            catalog,
            sections,
            probe,
            store,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    /// Builds the controller for one request.
    pub fn controller(&self) -> ToggleController {
        ToggleController::new(
            Arc::clone(&self.sections),
            Arc::clone(&self.probe),
            Arc::clone(&self.store),
            self.catalog.clone(),
        )
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// One admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "kebab-case")]
pub enum Command {
    Feature(Feature),
    Setting(Setting),
}

/// Returned when a name matches no [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl Command {
    /// Every command, in panel order.
    pub const ALL: [Command; 6] = [
        Command::Feature(Feature::Compression),
        Command::Feature(Feature::ExpiryHeaders),
        Command::Feature(Feature::HotlinkPrevention),
        Command::Setting(Setting::Pingbacks),
        Command::Setting(Setting::Emojis),
        Command::Setting(Setting::LazyLoad),
    ];

    /// Action name the host posts for this command.
    pub fn action_name(self) -> &'static str {
        match self {
            Command::Feature(Feature::Compression) => "speedup_toggle_gzip",
            Command::Feature(Feature::ExpiryHeaders) => "speedup_toggle_expire",
            Command::Feature(Feature::HotlinkPrevention) => "speedup_toggle_hotlinks",
            Command::Setting(Setting::Pingbacks) => "speedup_toggle_pingbacks",
            Command::Setting(Setting::Emojis) => "speedup_toggle_emojis",
            Command::Setting(Setting::LazyLoad) => "speedup_toggle_image_lazyload",
        }
    }

    /// Maps a host action name onto its command.
    pub fn from_action(name: &str) -> Option<Command> {
        Command::ALL.into_iter().find(|c| c.action_name() == name)
    }

    /// Short name used on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Command::Feature(f) => f.slug(),
            Command::Setting(s) => s.slug(),
        }
    }

    /// Parses a slug (`gzip`, `expire`, `emojis`, ...) or an action name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCommand`] when `name` matches neither.
    pub fn parse(name: &str) -> Result<Command, UnknownCommand> {
        if let Ok(feature) = name.parse::<Feature>() {
            return Ok(Command::Feature(feature));
        }
        if let Ok(setting) = name.parse::<Setting>() {
            return Ok(Command::Setting(setting));
        }
        Command::from_action(name).ok_or_else(|| UnknownCommand(name.to_string()))
    }

    fn label(self) -> String {
        match self {
            Command::Feature(f) => f.to_string(),
            Command::Setting(s) => s.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// Outcome of one command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToggleDto {
    pub target: String,
    pub label: String,
    pub state: FeatureState,
    /// Whether the managed file changed; always `false` for settings.
    pub file_changed: bool,
    /// Compression probe result, when the probe ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// One row of the settings panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelRowDto {
    pub target: String,
    pub label: String,
    pub action: String,
    pub state: FeatureState,
}

/// Notice shown above the panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticeDto {
    pub message: String,
    pub error: bool,
}

impl From<Notice> for NoticeDto {
    fn from(n: Notice) -> Self {
        Self {
            message: n.message().to_string(),
            error: n.is_error(),
        }
    }
}

/// Settings panel: the pending notice plus every command with its state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelDto {
    pub notice: Option<NoticeDto>,
    pub rows: Vec<PanelRowDto>,
}

/// Unified response wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Classification of `error` for front ends that branch on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub redirect: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            redirect: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
            error_kind: None,
            redirect: None,
        }
    }

    fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.error_kind = Some(format!("{kind:?}"));
        self
    }

    fn redirect_to(mut self, location: &str) -> Self {
        self.redirect = Some(location.to_string());
        self
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Runs `command` and points the front end back at the settings location.
pub fn dispatch(ctx: &AdminContext, command: Command) -> CommandResult<ToggleDto> {
    info!(action = command.action_name(), "dispatching admin command");

    let result = match command {
        Command::Feature(feature) => match ctx.controller().toggle(feature) {
            Ok(outcome) => CommandResult::ok(ToggleDto {
                target: command.slug().to_string(),
                label: command.label(),
                state: outcome.current,
                file_changed: outcome.changed(),
                verified: outcome.verified,
            }),
            Err(e) => CommandResult::err(e.to_string()).with_kind(e.kind()),
        },
        Command::Setting(setting) => match toggle_setting(ctx.store(), setting) {
            Ok(state) => CommandResult::ok(ToggleDto {
                target: command.slug().to_string(),
                label: command.label(),
                state,
                file_changed: false,
                verified: None,
            }),
            Err(e) => CommandResult::err(e.to_string()),
        },
    };

    result.redirect_to(&ctx.config.admin.settings_location)
}

/// Renders the panel and consumes the pending notice.
///
/// File-backed features show their last recorded flag, settings their
/// stored value.
pub fn settings_panel(ctx: &AdminContext) -> CommandResult<PanelDto> {
    let store = ctx.store();
    let notice = take_notice(store).map(NoticeDto::from);

    let rows = Command::ALL
        .into_iter()
        .map(|command| {
            let state = match command {
                Command::Feature(f) => FeatureState::from_present(state::flag_is(
                    store,
                    state::enabled_key(f),
                    state::ON,
                )),
                Command::Setting(s) => setting_state(store, s),
            };
            PanelRowDto {
                target: command.slug().to_string(),
                label: command.label(),
                action: command.action_name().to_string(),
                state,
            }
        })
        .collect();

    CommandResult::ok(PanelDto { notice, rows })
}

/// Rewrites rendered page content according to the stored settings.
///
/// With lazy loading on, image `src=` attributes become `data-src=`;
/// otherwise the content is returned as is.
pub fn filter_content(ctx: &AdminContext, content: &str) -> String {
    if setting_state(ctx.store(), Setting::LazyLoad).is_enabled() {
        lazy_load_images(content)
    } else {
        content.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
