use counselor_types::{ChatRequest, Message, Profile, SessionId, Theme};
use std::rc::Rc;

use crate::pending::{Dispatch, PendingReplies};
use crate::sessions::SessionList;
use crate::store::{MemoryStore, ProfileStore, StoreError, ThemeStore};

/// Result of accepting a user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub session_id: SessionId,
    /// Request to send now; `None` when it waits behind an in-flight request
    pub dispatch: Option<Dispatch>,
}

/// Root coordinator: owns the session list, the reply queue and the cached
/// profile and theme, and maps user actions onto them
pub struct Coordinator {
    sessions: SessionList,
    pending: PendingReplies,
    profile: Profile,
    theme: Theme,
    profile_open: bool,
    profile_store: ProfileStore,
    theme_store: ThemeStore,
}

impl Coordinator {
    /// Load profile and theme from the stores and start with the welcome session
    pub fn new(profile_store: ProfileStore, theme_store: ThemeStore) -> Self {
        let profile = profile_store.load();
        let theme = theme_store.load();
        log::debug!("Loaded profile for {} with {} theme", profile.display_name(), theme);

        Self {
            sessions: SessionList::with_welcome(),
            pending: PendingReplies::new(),
            profile,
            theme,
            profile_open: false,
            profile_store,
            theme_store,
        }
    }

    /// Coordinator over throwaway in-memory storage
    pub fn in_memory() -> Self {
        let backend = Rc::new(MemoryStore::new());
        Self::new(ProfileStore::new(backend.clone()), ThemeStore::new(backend))
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    pub fn sessions(&self) -> &SessionList {
        &self.sessions
    }

    pub fn new_chat(&mut self) -> SessionId {
        self.sessions.create()
    }

    pub fn select_chat(&mut self, index: usize) -> bool {
        self.sessions.select(index)
    }

    pub fn delete_chat(&mut self, index: usize) -> bool {
        match self.sessions.delete(index) {
            Some(removed) => {
                self.pending.forget(removed.id);
                true
            }
            None => false,
        }
    }

    pub fn clear_chats(&mut self) {
        self.sessions.clear_all();
        self.pending = PendingReplies::new();
    }

    pub fn update_messages(&mut self, messages: Vec<Message>) {
        self.sessions.update_messages(messages);
    }

    pub fn active_messages(&self) -> &[Message] {
        self.sessions.active().map(|s| s.messages()).unwrap_or(&[])
    }

    // ------------------------------------------------------------------
    // Message exchange
    // ------------------------------------------------------------------

    /// Accept user text for the active session
    ///
    /// Empty or whitespace-only text and a missing active session are
    /// ignored. Otherwise the trimmed text is appended right away and the
    /// request is either handed back for sending or queued.
    pub fn submit(&mut self, text: &str) -> Option<Submitted> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let session_id = self.sessions.active()?.id;

        self.sessions.append(session_id, Message::user(text));
        let request = ChatRequest {
            user_id: self.user_id(),
            message: text.to_string(),
        };
        let dispatch = self.pending.enqueue(session_id, request);

        Some(Submitted { session_id, dispatch })
    }

    /// Record the bot reply for `session_id` and return the next queued request
    pub fn resolve(&mut self, session_id: SessionId, reply: String) -> Option<Dispatch> {
        if !self.sessions.append(session_id, Message::bot(reply)) {
            log::debug!("Discarding reply for deleted session {}", session_id);
        }
        self.pending.complete(session_id)
    }

    /// Whether the displayed session is waiting for a reply
    pub fn is_waiting(&self) -> bool {
        self.sessions
            .active()
            .map(|s| self.pending.is_waiting(s.id))
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Profile and theme
    // ------------------------------------------------------------------

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Caller identifier sent with every chat request
    pub fn user_id(&self) -> String {
        self.profile.display_name().to_string()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.theme_store.save(theme)?;
        self.theme = theme;
        Ok(())
    }

    pub fn open_profile(&mut self) {
        self.profile_open = true;
    }

    pub fn is_profile_open(&self) -> bool {
        self.profile_open
    }

    /// Overwrite the stored profile, then close the modal
    pub fn save_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        self.profile_store.save(profile)?;
        self.close_profile();
        Ok(())
    }

    /// Close the modal and refresh the cached profile from storage
    pub fn close_profile(&mut self) {
        self.profile = self.profile_store.load();
        self.profile_open = false;
    }

    pub fn sign_out(&mut self) -> Result<(), StoreError> {
        self.profile = Profile::default();
        self.profile_store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KeyValueStore;
    use counselor_types::{Sender, GUEST_NAME, PROFILE_KEY};
    use pretty_assertions::assert_eq;

    fn with_backend() -> (Coordinator, Rc<MemoryStore>) {
        let backend = Rc::new(MemoryStore::new());
        let coordinator = Coordinator::new(
            ProfileStore::new(backend.clone()),
            ThemeStore::new(backend.clone()),
        );
        (coordinator, backend)
    }

    #[test]
    fn test_blank_input_changes_nothing() {
        let mut c = Coordinator::in_memory();
        assert!(c.submit("").is_none());
        assert!(c.submit("   \n\t").is_none());
        assert!(c.active_messages().is_empty());
        assert!(!c.is_waiting());
    }

    #[test]
    fn test_submit_appends_trimmed_user_message() {
        let mut c = Coordinator::in_memory();
        let submitted = c.submit("  hello there  ").unwrap();
        let dispatch = submitted.dispatch.unwrap();

        assert_eq!(c.active_messages(), &[Message::user("hello there")]);
        assert_eq!(dispatch.request.message, "hello there");
        assert_eq!(dispatch.request.user_id, GUEST_NAME);
        assert!(c.is_waiting());
    }

    #[test]
    fn test_resolve_appends_bot_and_clears_waiting() {
        let mut c = Coordinator::in_memory();
        let submitted = c.submit("hi").unwrap();
        assert!(c.resolve(submitted.session_id, "Hello!".to_string()).is_none());

        let senders: Vec<Sender> = c.active_messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Bot]);
        assert!(!c.is_waiting());
    }

    #[test]
    fn test_second_submit_is_queued() {
        let mut c = Coordinator::in_memory();
        let first = c.submit("a").unwrap();
        let second = c.submit("b").unwrap();
        assert!(second.dispatch.is_none());
        assert_eq!(c.active_messages().len(), 2);

        let next = c.resolve(first.session_id, "re: a".to_string()).unwrap();
        assert_eq!(next.request.message, "b");
        assert!(c.is_waiting());
        assert!(c.resolve(next.session_id, "re: b".to_string()).is_none());

        let texts: Vec<&str> = c.active_messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "re: a", "re: b"]);
    }

    #[test]
    fn test_reply_follows_its_session_after_switch() {
        let mut c = Coordinator::in_memory();
        let submitted = c.submit("question").unwrap();
        c.new_chat();
        c.resolve(submitted.session_id, "answer".to_string());

        assert!(c.active_messages().is_empty());
        assert_eq!(c.sessions().get(submitted.session_id).unwrap().messages().len(), 2);
    }

    #[test]
    fn test_reply_for_deleted_session_is_discarded() {
        let mut c = Coordinator::in_memory();
        c.new_chat();
        c.select_chat(1);
        let submitted = c.submit("question").unwrap();
        c.delete_chat(1);

        assert!(c.resolve(submitted.session_id, "answer".to_string()).is_none());
        assert_eq!(c.sessions().len(), 1);
        assert!(c.active_messages().is_empty());
    }

    #[test]
    fn test_submit_without_sessions_is_ignored() {
        let mut c = Coordinator::in_memory();
        c.clear_chats();
        assert!(c.submit("anyone?").is_none());
    }

    #[test]
    fn test_user_id_follows_profile_name() {
        let mut c = Coordinator::in_memory();
        c.save_profile(&Profile::new("Ada", "BSc", "AI")).unwrap();
        let dispatch = c.submit("hi").unwrap().dispatch.unwrap();
        assert_eq!(dispatch.request.user_id, "Ada");
    }

    #[test]
    fn test_theme_persists_on_change() {
        let (mut c, backend) = with_backend();
        assert_eq!(c.theme(), Theme::Light);
        c.set_theme(Theme::Dark).unwrap();

        let reopened = Coordinator::new(
            ProfileStore::new(backend.clone()),
            ThemeStore::new(backend),
        );
        assert_eq!(reopened.theme(), Theme::Dark);
    }

    /// Reads nothing and refuses every write
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend(format!("read-only: {}", key)))
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend(format!("read-only: {}", key)))
        }
    }

    #[test]
    fn test_failed_theme_save_keeps_current_theme() {
        let backend: Rc<dyn KeyValueStore> = Rc::new(ReadOnlyStore);
        let mut c = Coordinator::new(ProfileStore::new(backend.clone()), ThemeStore::new(backend));

        assert!(c.set_theme(Theme::Dark).is_err());
        assert_eq!(c.theme(), Theme::Light);
    }

    #[test]
    fn test_profile_saved_and_reloaded() {
        let (mut c, backend) = with_backend();
        c.open_profile();
        assert!(c.is_profile_open());

        let ada = Profile::new("Ada", "BSc", "AI");
        c.save_profile(&ada).unwrap();
        assert!(!c.is_profile_open());
        assert_eq!(c.profile(), &ada);

        let reopened = Coordinator::new(
            ProfileStore::new(backend.clone()),
            ThemeStore::new(backend),
        );
        assert_eq!(reopened.profile(), &ada);
    }

    #[test]
    fn test_close_profile_rereads_storage() {
        let (mut c, backend) = with_backend();
        backend
            .set(PROFILE_KEY, r#"{"name":"Grace","education":"PhD","interests":"compilers"}"#)
            .unwrap();
        c.open_profile();
        c.close_profile();
        assert_eq!(c.profile().name, "Grace");
    }

    #[test]
    fn test_sign_out_resets_profile() {
        let (mut c, backend) = with_backend();
        c.save_profile(&Profile::new("Ada", "BSc", "AI")).unwrap();
        c.sign_out().unwrap();

        assert_eq!(c.profile(), &Profile::default());
        assert_eq!(backend.get(PROFILE_KEY).unwrap(), None);
    }
}
