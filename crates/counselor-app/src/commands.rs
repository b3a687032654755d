use anyhow::{Context, Result};
use counselor_api::HttpChatBackend;
use counselor_types::Profile;

use crate::cli::{Commands, ProfileAction};
use crate::render::{self, Palette};
use crate::app::{open_coordinator, AppConfig};

impl Commands {
    /// Execute a one-shot subcommand and return the text to print
    ///
    /// `Chat` is handled by the REPL and yields an empty string here.
    pub async fn execute(&self, config: &AppConfig) -> Result<String> {
        let mut coordinator = open_coordinator(config);
        let palette = Palette::for_theme(coordinator.theme());

        match self {
            Commands::Chat => Ok(String::new()),
            Commands::History { user } => {
                let user_id = user.clone().unwrap_or_else(|| coordinator.user_id());
                let entries = HttpChatBackend::new(config.backend_url.clone())
                    .history(&user_id)
                    .await
                    .with_context(|| format!("Failed to fetch history for {}", user_id))?;
                Ok(render::history(&entries, &palette))
            }
            Commands::Profile { action } => match action.as_ref().unwrap_or(&ProfileAction::Show) {
                ProfileAction::Show => Ok(render::profile_details(coordinator.profile())),
                ProfileAction::Set {
                    name,
                    education,
                    interests,
                } => {
                    coordinator
                        .save_profile(&Profile::new(name.as_str(), education.as_str(), interests.as_str()))
                        .context("Failed to save profile")?;
                    Ok(render::profile_details(coordinator.profile()))
                }
                ProfileAction::Clear => {
                    coordinator.sign_out().context("Failed to clear profile")?;
                    Ok("Profile signed out successfully!".to_string())
                }
            },
            Commands::Theme { theme } => {
                if let Some(theme) = theme {
                    coordinator
                        .set_theme(*theme)
                        .context("Failed to save theme")?;
                }
                Ok(coordinator.theme().to_string())
            }
        }
    }
}
