use counselor_types::{ChatSession, Message, SessionId, NEW_CHAT_TITLE, WELCOME_TITLE};

/// Ordered chat sessions, newest first, with the active index
///
/// Invariant: when the list is non-empty `active` is a valid index into it;
/// when it is empty `active` is 0 and nothing is displayed.
#[derive(Debug, Clone, Default)]
pub struct SessionList {
    sessions: Vec<ChatSession>,
    active: usize,
    next_id: SessionId,
}

impl SessionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The start-up state: a single welcome session
    pub fn with_welcome() -> Self {
        let mut list = Self::new();
        list.push_front(WELCOME_TITLE);
        list
    }

    fn push_front(&mut self, title: &str) -> SessionId {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(0, ChatSession::new(id, title));
        self.active = 0;
        id
    }

    /// Prepend an empty session and make it active
    pub fn create(&mut self) -> SessionId {
        let id = self.push_front(NEW_CHAT_TITLE);
        log::debug!("Created session {}", id);
        id
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.sessions.len() {
            log::warn!("Ignoring selection of missing session at {}", index);
            return false;
        }
        self.active = index;
        true
    }

    /// Remove the session at `index` and return it
    ///
    /// Active index afterwards: 0 if the list became empty or `index` was 0,
    /// otherwise `index - 1`.
    pub fn delete(&mut self, index: usize) -> Option<ChatSession> {
        if index >= self.sessions.len() {
            log::warn!("Ignoring deletion of missing session at {}", index);
            return None;
        }
        let removed = self.sessions.remove(index);
        self.active = if self.sessions.is_empty() || index == 0 {
            0
        } else {
            index - 1
        };
        log::debug!("Deleted session {} (active now {})", removed.id, self.active);
        Some(removed)
    }

    pub fn clear_all(&mut self) {
        self.sessions.clear();
        self.active = 0;
    }

    /// Replace the active session's messages wholesale
    pub fn update_messages(&mut self, messages: Vec<Message>) {
        if let Some(session) = self.sessions.get_mut(self.active) {
            session.replace_messages(messages);
        }
    }

    /// Append to the session with `id`, wherever it sits now
    pub fn append(&mut self, id: SessionId, message: Message) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.push(message);
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> Option<&ChatSession> {
        self.sessions.get(self.active)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn get(&self, id: SessionId) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ChatSession)> {
        self.sessions.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
