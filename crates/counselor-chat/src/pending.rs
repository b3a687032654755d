use counselor_types::{ChatRequest, SessionId};
use std::collections::{HashMap, HashSet, VecDeque};

/// A request ready to go to the remote collaborator, tagged with its session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub session_id: SessionId,
    pub request: ChatRequest,
}

/// Single-slot reply queue per session
///
/// At most one request per session is in flight. Later requests for the same
/// session wait here until the in-flight one completes, so replies land in
/// the order the user messages were sent.
#[derive(Debug, Default)]
pub struct PendingReplies {
    in_flight: HashSet<SessionId>,
    queued: HashMap<SessionId, VecDeque<ChatRequest>>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the dispatch to run now, or `None` if it was queued behind another
    pub fn enqueue(&mut self, session_id: SessionId, request: ChatRequest) -> Option<Dispatch> {
        if self.in_flight.insert(session_id) {
            Some(Dispatch { session_id, request })
        } else {
            self.queued.entry(session_id).or_default().push_back(request);
            log::debug!("Queued reply request for session {}", session_id);
            None
        }
    }

    /// Mark the in-flight request of `session_id` done and hand out the next one
    pub fn complete(&mut self, session_id: SessionId) -> Option<Dispatch> {
        let next = self
            .queued
            .get_mut(&session_id)
            .and_then(|queue| queue.pop_front());

        match next {
            Some(request) => Some(Dispatch { session_id, request }),
            None => {
                self.queued.remove(&session_id);
                self.in_flight.remove(&session_id);
                None
            }
        }
    }

    /// Drop everything known about a session that no longer exists
    pub fn forget(&mut self, session_id: SessionId) {
        self.in_flight.remove(&session_id);
        self.queued.remove(&session_id);
    }

    pub fn is_waiting(&self, session_id: SessionId) -> bool {
        self.in_flight.contains(&session_id)
    }

    pub fn queued_len(&self, session_id: SessionId) -> usize {
        self.queued.get(&session_id).map_or(0, VecDeque::len)
    }
}
