use crate::message::{Message, Role};
use crate::scroll::{ScrollAction, ScrollState, DEFAULT_SCROLL_THRESHOLD_PX};

/// How the in-progress assistant entry is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingView {
    /// Placeholder shown until the first text arrives.
    Thinking,
    LiveText,
}

/// The single mutable, not yet committed assistant entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    position: usize,
    text: String,
    view: PendingView,
}

impl PendingEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn view(&self) -> PendingView {
        self.view
    }

    /// Index in the committed list the entry will occupy once promoted.
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Ordered, render-ready conversation log.
///
/// Insertion order is display order. At most one pending entry exists at a
/// time. Every mutation reports how the viewport should react.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    pending: Option<PendingEntry>,
    scroll: ScrollState,
    threshold_px: u32,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD_PX)
    }
}

impl Transcript {
    pub fn new(threshold_px: u32) -> Self {
        Self {
            messages: Vec::new(),
            pending: None,
            scroll: ScrollState::default(),
            threshold_px,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.pending.is_none()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn pending(&self) -> Option<&PendingEntry> {
        self.pending.as_ref()
    }

    pub fn scroll(&self) -> ScrollState {
        self.scroll
    }

    pub fn threshold_px(&self) -> u32 {
        self.threshold_px
    }

    /// Records the viewport geometry reported by the renderer.
    pub fn update_viewport(&mut self, offset: u32, max_offset: u32) {
        self.scroll.update(offset, max_offset);
    }

    pub fn append(&mut self, message: Message) -> ScrollAction {
        let action = self.scroll_for(message.role);
        self.messages.push(message);
        self.apply(action)
    }

    /// Wholesale reconciliation with a server snapshot. Drops any pending
    /// entry and everything held locally.
    pub fn replace_all(&mut self, messages: Vec<Message>) -> ScrollAction {
        self.messages = messages;
        self.pending = None;
        self.apply(ScrollAction::SnapToBottom)
    }

    pub fn clear(&mut self) -> ScrollAction {
        self.messages.clear();
        self.pending = None;
        self.scroll = ScrollState::default();
        ScrollAction::SnapToBottom
    }

    /// Opens the pending entry with the thinking placeholder. An already
    /// open entry is kept as is.
    pub fn begin_pending(&mut self) -> ScrollAction {
        if self.pending.is_some() {
            tracing::warn!("pending entry already open; keeping the existing one");
            return ScrollAction::Preserve;
        }

        let action = self.scroll_for(Role::Assistant);
        self.pending = Some(PendingEntry {
            position: self.messages.len(),
            text: String::new(),
            view: PendingView::Thinking,
        });
        self.apply(action)
    }

    /// Swaps the thinking placeholder for the live text area. Returns false
    /// when there is no pending entry or it is already live.
    pub fn show_live_text(&mut self) -> bool {
        match self.pending.as_mut() {
            Some(pending) if pending.view == PendingView::Thinking => {
                pending.view = PendingView::LiveText;
                true
            }
            _ => false,
        }
    }

    /// Appends streamed text to the pending entry. Follows the same
    /// near-bottom rule as assistant messages.
    pub fn append_pending_text(&mut self, text: &str) -> ScrollAction {
        let action = self.scroll_for(Role::Assistant);
        match self.pending.as_mut() {
            Some(pending) => pending.text.push_str(text),
            None => {
                tracing::warn!("streamed text without a pending entry; dropped");
                return ScrollAction::Preserve;
            }
        }
        self.apply(action)
    }

    /// Promotes the pending text to an assistant message at the position the
    /// entry occupied. Empty text commits nothing and returns `None`.
    pub fn commit_pending(&mut self) -> Option<ScrollAction> {
        let pending = self.pending.take()?;
        if pending.text.is_empty() {
            return None;
        }

        let action = self.scroll_for(Role::Assistant);
        let position = pending.position.min(self.messages.len());
        self.messages
            .insert(position, Message::assistant(pending.text));
        Some(self.apply(action))
    }

    /// Drops the pending entry and returns its partial text.
    pub fn discard_pending(&mut self) -> Option<String> {
        self.pending.take().map(|pending| pending.text)
    }

    fn scroll_for(&self, role: Role) -> ScrollAction {
        if role.always_snaps() || self.scroll.is_near_bottom(self.threshold_px) {
            ScrollAction::SnapToBottom
        } else {
            ScrollAction::Preserve
        }
    }

    fn apply(&mut self, action: ScrollAction) -> ScrollAction {
        if action == ScrollAction::SnapToBottom {
            self.scroll.snap_to_bottom();
        }
        action
    }
}
