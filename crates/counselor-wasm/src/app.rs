use counselor_chat::{Coordinator, KeyValueStore, MessageExchange, ProfileStore, ThemeStore};
use counselor_types::{Message, Profile, Sender, Theme, BOT_LABEL};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use web_sys::{Document, Event};

use crate::backend::FetchChatBackend;
use crate::dom;
use crate::storage::LocalStorageStore;
use crate::utils::escape_html;

const BOT_AVATAR: &str = "🦉";

/// The single-page chat UI: sidebar, chat window and profile modal
#[derive(Clone)]
pub struct CounselorApp {
    document: Document,
    state: Rc<RefCell<Coordinator>>,
    exchange: Rc<MessageExchange<FetchChatBackend>>,
}

impl CounselorApp {
    pub fn new(base_url: &str) -> Result<Self, JsValue> {
        let document = crate::document()?;
        let coordinator = match LocalStorageStore::new() {
            Ok(store) => {
                let backend: Rc<dyn KeyValueStore> = Rc::new(store);
                Coordinator::new(ProfileStore::new(backend.clone()), ThemeStore::new(backend))
            }
            Err(e) => {
                log::warn!("{}; profile and theme will not persist", e);
                Coordinator::in_memory()
            }
        };

        Ok(Self {
            document,
            state: Rc::new(RefCell::new(coordinator)),
            exchange: Rc::new(MessageExchange::new(FetchChatBackend::new(base_url))),
        })
    }

    pub fn start(self) -> Result<(), JsValue> {
        self.setup_sidebar()?;
        self.setup_composer()?;
        self.setup_profile_modal()?;

        self.apply_theme();
        self.render()
    }

    // ------------------------------------------------------------------
    // Event wiring
    // ------------------------------------------------------------------

    fn setup_sidebar(&self) -> Result<(), JsValue> {
        let app = self.clone();
        self.on_click("openProfileBtn", move || {
            app.state.borrow_mut().open_profile();
            app.clear_profile_inputs()?;
            app.render_modal()
        })?;

        let app = self.clone();
        self.on_click("newChatBtn", move || {
            app.state.borrow_mut().new_chat();
            app.render()
        })?;

        let app = self.clone();
        self.on_click("clearChatsBtn", move || {
            app.state.borrow_mut().clear_chats();
            app.render()
        })?;

        let app = self.clone();
        self.on_click("signOutBtn", move || {
            if let Err(e) = app.state.borrow_mut().sign_out() {
                log::warn!("Failed to clear stored profile: {}", e);
            }
            crate::window()?.alert_with_message("Profile signed out successfully!")?;
            app.render()
        })?;

        // One listener for the whole list; items carry data-index/data-action
        let history = dom::get_element_by_id(&self.document, "chatHistory")?;
        let app = self.clone();
        dom::add_listener(&history, "click", move |event: Event| {
            if let Err(e) = app.handle_history_click(&event) {
                log::error!("History click failed: {:?}", e);
            }
        })?;

        let select = dom::get_select_by_id(&self.document, "themeSelect")?;
        let app = self.clone();
        dom::add_listener(&select, "change", move |_event: Event| {
            if let Err(e) = app.handle_theme_change() {
                log::error!("Theme change failed: {:?}", e);
            }
        })?;

        Ok(())
    }

    fn setup_composer(&self) -> Result<(), JsValue> {
        let form = dom::get_element_by_id(&self.document, "composer")?;
        let app = self.clone();
        dom::add_listener(&form, "submit", move |event: Event| {
            event.prevent_default();
            if let Err(e) = app.handle_submit() {
                log::error!("Failed to send message: {:?}", e);
            }
        })
    }

    fn setup_profile_modal(&self) -> Result<(), JsValue> {
        let app = self.clone();
        self.on_click("profileSaveBtn", move || {
            let profile = Profile::new(
                dom::get_input_by_id(&app.document, "profileNameInput")?.value(),
                dom::get_input_by_id(&app.document, "profileEducationInput")?.value(),
                dom::get_input_by_id(&app.document, "profileInterestsInput")?.value(),
            );
            {
                let mut state = app.state.borrow_mut();
                if let Err(e) = state.save_profile(&profile) {
                    log::warn!("Failed to save profile: {}", e);
                    state.close_profile();
                }
            }
            app.render()
        })?;

        let app = self.clone();
        self.on_click("profileCancelBtn", move || {
            app.state.borrow_mut().close_profile();
            app.render()
        })
    }

    fn on_click<F>(&self, id: &str, mut handler: F) -> Result<(), JsValue>
    where
        F: FnMut() -> Result<(), JsValue> + 'static,
    {
        let element = dom::get_element_by_id(&self.document, id)?;
        let id = id.to_string();
        dom::add_listener(&element, "click", move |_event: Event| {
            if let Err(e) = handler() {
                log::error!("{} handler failed: {:?}", id, e);
            }
        })
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    fn handle_history_click(&self, event: &Event) -> Result<(), JsValue> {
        let Some(item) = dom::target_with_attribute(event, "data-action") else {
            return Ok(());
        };
        let Some(index) = item
            .get_attribute("data-index")
            .and_then(|i| i.parse::<usize>().ok())
        else {
            return Ok(());
        };

        match item.get_attribute("data-action").as_deref() {
            Some("delete") => {
                self.state.borrow_mut().delete_chat(index);
            }
            Some("select") => {
                self.state.borrow_mut().select_chat(index);
            }
            other => log::debug!("Ignoring history action {:?}", other),
        }
        self.render()
    }

    fn handle_theme_change(&self) -> Result<(), JsValue> {
        let value = dom::get_select_by_id(&self.document, "themeSelect")?.value();
        let theme = match value.parse::<Theme>() {
            Ok(theme) => theme,
            Err(e) => {
                log::warn!("{}", e);
                return Ok(());
            }
        };
        if let Err(e) = self.state.borrow_mut().set_theme(theme) {
            log::warn!("Failed to persist theme: {}", e);
        }
        self.apply_theme();
        Ok(())
    }

    fn handle_submit(&self) -> Result<(), JsValue> {
        let input = dom::get_input_by_id(&self.document, "messageInput")?;
        let text = input.value();
        if text.trim().is_empty() {
            return Ok(());
        }
        input.set_value("");

        let submitted = self.state.borrow_mut().submit(&text);
        self.render_messages()?;

        if let Some(dispatch) = submitted.and_then(|s| s.dispatch) {
            let app = self.clone();
            wasm_bindgen_futures::spawn_local(async move {
                app.exchange
                    .drive_with(&app.state, dispatch, |_| {
                        if let Err(e) = app.render() {
                            log::error!("Failed to render reply: {:?}", e);
                        }
                    })
                    .await;
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn apply_theme(&self) {
        let theme = self.state.borrow().theme();
        if let Some(body) = self.document.body() {
            body.set_class_name(theme.as_str());
        }
        if let Ok(select) = dom::get_select_by_id(&self.document, "themeSelect") {
            select.set_value(theme.as_str());
        }
    }

    fn render(&self) -> Result<(), JsValue> {
        self.render_sidebar()?;
        self.render_messages()?;
        self.render_modal()
    }

    fn render_sidebar(&self) -> Result<(), JsValue> {
        let state = self.state.borrow();
        let profile = state.profile();

        dom::get_element_by_id(&self.document, "profileAvatar")?
            .set_text_content(Some(&profile.avatar_initial()));
        dom::get_element_by_id(&self.document, "profileName")?
            .set_text_content(Some(profile.display_name()));
        dom::get_element_by_id(&self.document, "profileEducation")?
            .set_text_content(Some(profile.display_education()));

        let sessions = state.sessions();
        let history = dom::get_element_by_id(&self.document, "chatHistory")?;
        if sessions.is_empty() {
            history.set_inner_html(r#"<p class="muted">No chats yet</p>"#);
        } else {
            let items: String = sessions
                .iter()
                .map(|(index, session)| {
                    let active = if index == sessions.active_index() { " active" } else { "" };
                    format!(
                        r#"<li class="chat-item{active}">
                            <span data-action="select" data-index="{index}">{title}</span>
                            <button class="delete-chat" data-action="delete" data-index="{index}">🗑</button>
                        </li>"#,
                        active = active,
                        index = index,
                        title = escape_html(&session.display_title(index)),
                    )
                })
                .collect();
            history.set_inner_html(&format!("<ul>{}</ul>", items));
        }

        let clear = dom::get_html_element_by_id(&self.document, "clearChatsBtn")?;
        if sessions.is_empty() {
            dom::hide_element(&clear);
        } else {
            dom::show_element(&clear);
        }
        Ok(())
    }

    fn render_messages(&self) -> Result<(), JsValue> {
        let state = self.state.borrow();
        let container = dom::get_element_by_id(&self.document, "messages")?;
        let empty = dom::get_html_element_by_id(&self.document, "emptyChat")?;
        let composer = dom::get_html_element_by_id(&self.document, "composer")?;

        if state.sessions().active().is_none() {
            container.set_inner_html("");
            dom::show_element(&empty);
            dom::hide_element(&composer);
            return Ok(());
        }
        dom::hide_element(&empty);
        dom::show_element(&composer);

        let profile = state.profile();
        let mut html: String = state
            .active_messages()
            .iter()
            .map(|m| message_html(m, profile))
            .collect();
        if state.is_waiting() {
            html.push_str(&bubble_html("bot", BOT_AVATAR, BOT_LABEL, "..."));
        }
        container.set_inner_html(&html);
        dom::scroll_to_bottom(&container);
        Ok(())
    }

    fn render_modal(&self) -> Result<(), JsValue> {
        let modal = dom::get_html_element_by_id(&self.document, "profileModal")?;
        if self.state.borrow().is_profile_open() {
            dom::show_element(&modal);
        } else {
            dom::hide_element(&modal);
        }
        Ok(())
    }

    /// The modal always opens with empty fields
    fn clear_profile_inputs(&self) -> Result<(), JsValue> {
        for id in ["profileNameInput", "profileEducationInput", "profileInterestsInput"] {
            dom::get_input_by_id(&self.document, id)?.set_value("");
        }
        Ok(())
    }
}

fn message_html(message: &Message, profile: &Profile) -> String {
    match message.sender {
        Sender::Bot => bubble_html("bot", BOT_AVATAR, BOT_LABEL, &message.text),
        Sender::User => bubble_html(
            "user",
            &profile.avatar_initial(),
            profile.display_name(),
            &message.text,
        ),
    }
}

fn bubble_html(class: &str, avatar: &str, label: &str, text: &str) -> String {
    format!(
        r#"<div class="msg-row {}"><div class="avatar">{}</div><div><div class="label">{}</div><div class="bubble">{}</div></div></div>"#,
        class,
        escape_html(avatar),
        escape_html(label),
        escape_html(text)
    )
}
