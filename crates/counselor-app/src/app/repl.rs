use anyhow::Result;
use colored::Colorize;
use counselor_api::HttpChatBackend;
use counselor_chat::{Coordinator, MessageExchange};
use counselor_types::{Profile, Theme};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;

use crate::render::{self, Palette};
use crate::app::setup::AppConfig;

/// A line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    New,
    List,
    /// Zero-based index
    Select(usize),
    /// Zero-based index
    Delete(usize),
    Clear,
    Theme(Option<Theme>),
    Profile,
    SignOut,
    History,
    Help,
    Exit,
    Invalid(String),
    Empty,
}

/// Parse one input line; chat positions are typed 1-based
pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if line == "exit" || line == "quit" {
        return ReplCommand::Exit;
    }
    if !line.starts_with('/') {
        return ReplCommand::Send(line.to_string());
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match command {
        "/new" => ReplCommand::New,
        "/list" => ReplCommand::List,
        "/select" => position(arg).map_or_else(
            || ReplCommand::Invalid(format!("Usage: /select N (got '{}')", arg)),
            ReplCommand::Select,
        ),
        "/delete" => position(arg).map_or_else(
            || ReplCommand::Invalid(format!("Usage: /delete N (got '{}')", arg)),
            ReplCommand::Delete,
        ),
        "/clear" => ReplCommand::Clear,
        "/theme" if arg.is_empty() => ReplCommand::Theme(None),
        "/theme" => match arg.parse::<Theme>() {
            Ok(theme) => ReplCommand::Theme(Some(theme)),
            Err(e) => ReplCommand::Invalid(e.to_string()),
        },
        "/profile" => ReplCommand::Profile,
        "/signout" => ReplCommand::SignOut,
        "/history" => ReplCommand::History,
        "/help" => ReplCommand::Help,
        other => ReplCommand::Invalid(format!("Unknown command '{}'. Type /help", other)),
    }
}

fn position(arg: &str) -> Option<usize> {
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n - 1),
        _ => None,
    }
}

/// Run interactive REPL mode
pub async fn run_repl_mode(config: &AppConfig, coordinator: Coordinator) -> Result<()> {
    let state = RefCell::new(coordinator);
    let exchange = MessageExchange::new(HttpChatBackend::new(config.backend_url.clone()));
    let mut rl = DefaultEditor::new()?;

    {
        let palette = Palette::for_theme(state.borrow().theme());
        println!("{}", render::banner(&palette));
        println!("{}\n", palette.muted(&format!("Backend: {}", config.backend_url)));
        println!("{}\n", render::sidebar(&state.borrow(), &palette));
    }

    loop {
        let (palette, prompt) = {
            let c = state.borrow();
            let palette = Palette::for_theme(c.theme());
            let title = c
                .sessions()
                .active()
                .map(|s| s.display_title(c.sessions().active_index()))
                .unwrap_or_else(|| "no chat".to_string());
            let prompt = format!(
                "{} {} ",
                format!("[{}]", title).color(palette.bot),
                format!("{}:", c.profile().display_name()).color(palette.user).bold()
            );
            (palette, prompt)
        };

        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".color(palette.accent));
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".color(palette.warning), e);
                break;
            }
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }

        match parse_command(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Exit => {
                println!("{}", "Goodbye!".color(palette.accent));
                break;
            }
            ReplCommand::Send(text) => send_message(&exchange, &state, &text).await,
            ReplCommand::New => {
                state.borrow_mut().new_chat();
                println!("{}", render::chat_window(&state.borrow(), &palette));
            }
            ReplCommand::List => println!("{}", render::sidebar(&state.borrow(), &palette)),
            ReplCommand::Select(index) => {
                if state.borrow_mut().select_chat(index) {
                    println!("{}", render::chat_window(&state.borrow(), &palette));
                } else {
                    println!("{}", palette.warning(&format!("No chat {}", index + 1)));
                }
            }
            ReplCommand::Delete(index) => {
                if state.borrow_mut().delete_chat(index) {
                    println!("{}", render::sidebar(&state.borrow(), &palette));
                } else {
                    println!("{}", palette.warning(&format!("No chat {}", index + 1)));
                }
            }
            ReplCommand::Clear => {
                state.borrow_mut().clear_chats();
                println!("{}", render::chat_window(&state.borrow(), &palette));
            }
            ReplCommand::Theme(theme) => {
                let mut c = state.borrow_mut();
                let theme = theme.unwrap_or_else(|| c.theme().toggled());
                if let Err(e) = c.set_theme(theme) {
                    eprintln!("{} {}", "Failed to save theme:".color(palette.warning), e);
                }
                let palette = Palette::for_theme(c.theme());
                println!("{}", palette.accent(&format!("Theme: {}", c.theme())));
            }
            ReplCommand::Profile => edit_profile(&mut rl, &state, &palette)?,
            ReplCommand::SignOut => match state.borrow_mut().sign_out() {
                Ok(()) => println!("{}", palette.accent("Profile signed out successfully!")),
                Err(e) => eprintln!("{} {}", "Sign out failed:".color(palette.warning), e),
            },
            ReplCommand::History => {
                let user_id = state.borrow().user_id();
                match exchange.backend().history(&user_id).await {
                    Ok(entries) => println!("{}", render::history(&entries, &palette)),
                    Err(e) => eprintln!("{} {}", "History unavailable:".color(palette.warning), e),
                }
            }
            ReplCommand::Help => println!("{}", render::help(&palette)),
            ReplCommand::Invalid(reason) => println!("{}", palette.warning(&reason)),
        }
    }

    Ok(())
}

async fn send_message(
    exchange: &MessageExchange<HttpChatBackend>,
    state: &RefCell<Coordinator>,
    text: &str,
) {
    let submitted = state.borrow_mut().submit(text);
    let Some(submitted) = submitted else {
        let palette = Palette::for_theme(state.borrow().theme());
        println!("{}", palette.warning("No chats available. Start a new one!"));
        return;
    };

    let seen = {
        let c = state.borrow();
        let palette = Palette::for_theme(c.theme());
        println!("{}", render::typing(&palette));
        c.active_messages().len()
    };

    if let Some(dispatch) = submitted.dispatch {
        exchange.drive(state, dispatch).await;
    }

    let c = state.borrow();
    let palette = Palette::for_theme(c.theme());
    if let Some(session) = c.sessions().get(submitted.session_id) {
        for message in session.messages().iter().skip(seen) {
            println!("{}", render::message(message, c.profile(), &palette));
        }
    }
}

/// Profile built from the three modal answers; `None` when all are empty
///
/// Answers replace the stored profile wholesale, so every prompt starts empty.
pub fn profile_from_answers(name: String, education: String, interests: String) -> Option<Profile> {
    let profile = Profile::new(name, education, interests);
    (!profile.is_empty()).then_some(profile)
}

/// Prompt for the three profile fields; all left empty cancels
fn edit_profile(rl: &mut DefaultEditor, state: &RefCell<Coordinator>, palette: &Palette) -> Result<()> {
    state.borrow_mut().open_profile();
    println!("{}", palette.muted("Set your profile (leave every field empty to cancel)"));

    let mut ask = |label: &str| -> Result<String> {
        match rl.readline(&format!("{}: ", label)) {
            Ok(value) => Ok(value),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    };

    let answers = profile_from_answers(ask("Name")?, ask("Education")?, ask("Interests")?);

    let mut c = state.borrow_mut();
    let Some(profile) = answers else {
        c.close_profile();
        println!("{}", palette.muted("Profile unchanged"));
        return Ok(());
    };

    match c.save_profile(&profile) {
        Ok(()) => println!("{}", render::sidebar(&c, palette)),
        Err(e) => {
            c.close_profile();
            eprintln!("{} {}", "Failed to save profile:".color(palette.warning), e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            parse_command("  What should I study?  "),
            ReplCommand::Send("What should I study?".to_string())
        );
        assert_eq!(parse_command("   "), ReplCommand::Empty);
        assert_eq!(parse_command("quit"), ReplCommand::Exit);
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(parse_command("/select 1"), ReplCommand::Select(0));
        assert_eq!(parse_command("/delete 3"), ReplCommand::Delete(2));
        assert!(matches!(parse_command("/select 0"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/delete x"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command("/select"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn test_theme_argument() {
        assert_eq!(parse_command("/theme"), ReplCommand::Theme(None));
        assert_eq!(parse_command("/theme dark"), ReplCommand::Theme(Some(Theme::Dark)));
        assert!(matches!(parse_command("/theme blue"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn test_profile_answers_replace_every_field() {
        assert_eq!(profile_from_answers(String::new(), String::new(), String::new()), None);
        assert_eq!(
            profile_from_answers("Ada".to_string(), String::new(), String::new()),
            Some(Profile::new("Ada", "", ""))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(parse_command("/frobnicate"), ReplCommand::Invalid(_)));
        assert_eq!(parse_command("/signout"), ReplCommand::SignOut);
    }
}
