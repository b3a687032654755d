use chrono::{TimeZone, Utc};
use colored::{Color, ColoredString, Colorize};
use counselor_chat::Coordinator;
use counselor_types::{HistoryEntry, Message, Profile, Sender, Theme, BOT_LABEL};

const BOT_AVATAR: &str = "🦉";

/// Terminal colours for a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub muted: Color,
    pub user: Color,
    pub bot: Color,
    pub warning: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            // Light terminals: dark, saturated foregrounds
            Theme::Light => Self {
                accent: Color::Blue,
                muted: Color::Black,
                user: Color::Green,
                bot: Color::Magenta,
                warning: Color::Red,
            },
            Theme::Dark => Self {
                accent: Color::BrightCyan,
                muted: Color::BrightBlack,
                user: Color::BrightGreen,
                bot: Color::BrightMagenta,
                warning: Color::BrightYellow,
            },
        }
    }

    pub fn accent(&self, text: &str) -> ColoredString {
        text.color(self.accent).bold()
    }

    pub fn muted(&self, text: &str) -> ColoredString {
        text.color(self.muted)
    }

    pub fn warning(&self, text: &str) -> ColoredString {
        text.color(self.warning)
    }
}

pub fn banner(palette: &Palette) -> String {
    format!(
        "{}\n{}",
        palette.accent(&format!("{} Your Career Counselor", BOT_AVATAR)),
        palette.muted("Friendly career guidance & roadmaps. Type /help for commands.")
    )
}

pub fn help(palette: &Palette) -> String {
    let lines = [
        ("/new", "start a new chat"),
        ("/list", "show profile and chats"),
        ("/select N", "switch to chat N"),
        ("/delete N", "delete chat N"),
        ("/clear", "delete all chats"),
        ("/theme [light|dark]", "set or toggle the theme"),
        ("/profile", "edit your profile"),
        ("/signout", "forget your profile"),
        ("/history", "show exchanges stored by the backend"),
        ("exit", "quit"),
    ];
    lines
        .iter()
        .map(|(cmd, what)| format!("  {:<22}{}", palette.accent(cmd), palette.muted(what)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Profile block plus the chat history list, as in the sidebar
pub fn sidebar(coordinator: &Coordinator, palette: &Palette) -> String {
    let profile = coordinator.profile();
    let mut out = vec![
        format!(
            "[{}] {}",
            palette.accent(&profile.avatar_initial()),
            profile.display_name().bold()
        ),
        format!("    {}", palette.muted(profile.display_education())),
        palette.accent("History").to_string(),
    ];

    let sessions = coordinator.sessions();
    if sessions.is_empty() {
        out.push(format!("  {}", palette.muted("No chats yet")));
    } else {
        for (position, session) in sessions.iter() {
            let marker = if position == sessions.active_index() { ">" } else { " " };
            out.push(format!(
                " {} {}. {}",
                marker,
                position + 1,
                session.display_title(position)
            ));
        }
    }

    out.push(format!("Theme: {}", coordinator.theme()));
    out.join("\n")
}

pub fn message(msg: &Message, profile: &Profile, palette: &Palette) -> String {
    match msg.sender {
        Sender::Bot => format!(
            "{} {} {}",
            BOT_AVATAR,
            format!("{}:", BOT_LABEL).color(palette.bot).bold(),
            msg.text
        ),
        Sender::User => format!(
            "{} {} {}",
            profile.avatar_initial(),
            format!("{}:", profile.display_name()).color(palette.user).bold(),
            msg.text
        ),
    }
}

pub fn typing(palette: &Palette) -> String {
    format!(
        "{} {} {}",
        BOT_AVATAR,
        format!("{}:", BOT_LABEL).color(palette.bot).bold(),
        palette.muted("...")
    )
}

/// The active session's messages, or the empty state
pub fn chat_window(coordinator: &Coordinator, palette: &Palette) -> String {
    let Some(session) = coordinator.sessions().active() else {
        return palette.muted("No chats available. Start a new one!").to_string();
    };

    let mut out = vec![palette
        .accent(&format!("── {} ──", session.display_title(coordinator.sessions().active_index())))
        .to_string()];
    out.extend(
        session
            .messages()
            .iter()
            .map(|m| message(m, coordinator.profile(), palette)),
    );
    if coordinator.is_waiting() {
        out.push(typing(palette));
    }
    out.join("\n")
}

pub fn history(entries: &[HistoryEntry], palette: &Palette) -> String {
    if entries.is_empty() {
        return palette.muted("No stored history.").to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let when = entry
                .timestamp
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown time".to_string());
            format!(
                "{}\n  you: {}\n  bot: {}",
                palette.muted(&when),
                entry.message,
                entry.reply
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profile_details(profile: &Profile) -> String {
    if profile.is_empty() {
        return "No profile set".to_string();
    }
    format!(
        "Name: {}\nEducation: {}\nInterests: {}",
        profile.name, profile.education, profile.interests
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use counselor_types::FALLBACK_REPLY;

    fn plain() -> Palette {
        colored::control::set_override(false);
        Palette::for_theme(Theme::Light)
    }

    #[test]
    fn test_sidebar_marks_active_session() {
        let palette = plain();
        let mut c = Coordinator::in_memory();
        c.new_chat();
        c.select_chat(1);

        let out = sidebar(&c, &palette);
        assert!(out.contains("[G] Guest"));
        assert!(out.contains("No profile set"));
        assert!(out.contains("   1. New Chat"));
        assert!(out.contains(" > 2. Welcome Chat"));
        assert!(out.contains("Theme: light"));
    }

    #[test]
    fn test_sidebar_without_chats() {
        let palette = plain();
        let mut c = Coordinator::in_memory();
        c.clear_chats();
        assert!(sidebar(&c, &palette).contains("No chats yet"));
        assert_eq!(
            chat_window(&c, &palette),
            "No chats available. Start a new one!"
        );
    }

    #[test]
    fn test_chat_window_shows_typing_while_waiting() {
        let palette = plain();
        let mut c = Coordinator::in_memory();
        let submitted = c.submit("hello").unwrap();

        let out = chat_window(&c, &palette);
        assert!(out.contains("G Guest: hello"));
        assert!(out.ends_with("🦉 Chatbot: ..."));

        c.resolve(submitted.session_id, FALLBACK_REPLY.to_string());
        let out = chat_window(&c, &palette);
        assert!(out.ends_with(&format!("🦉 Chatbot: {}", FALLBACK_REPLY)));
    }

    #[test]
    fn test_history_formats_timestamps() {
        let palette = plain();
        let entries = vec![
            HistoryEntry {
                id: Some("local-1".to_string()),
                message: "hi".to_string(),
                reply: "Hello!".to_string(),
                timestamp: Some(0),
            },
            HistoryEntry {
                id: None,
                message: "cv?".to_string(),
                reply: "One page.".to_string(),
                timestamp: None,
            },
        ];
        let out = history(&entries, &palette);
        assert!(out.contains("1970-01-01 00:00"));
        assert!(out.contains("unknown time"));
        assert!(out.contains("  bot: One page."));
    }

    #[test]
    fn test_profile_details() {
        assert_eq!(profile_details(&Profile::default()), "No profile set");
        assert_eq!(
            profile_details(&Profile::new("Ada", "BSc", "AI")),
            "Name: Ada\nEducation: BSc\nInterests: AI"
        );
    }
}
