#![forbid(unsafe_code)]

//! Confirm-before-act workflow. One shared dialog state serves any number of call sites:
//! the caller registers what should happen, and the dialog decides whether it happens.

use std::fmt;

pub const DEFAULT_TITLE: &str = "Are you sure?";
pub const DEFAULT_MESSAGE: &str = "Are you sure you want to delete this item?";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub title: Option<String>,
    pub message: Option<String>,
}

impl ConfirmOptions {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            message: Some(message.into()),
        }
    }
}

/// Deferred action. `Ctx` is whatever the action needs when it finally runs
/// (for the console that is the session owning the store).
pub type PendingAction<Ctx> = Box<dyn FnOnce(&mut Ctx)>;

enum State<Ctx> {
    Idle,
    AwaitingConfirmation {
        title: String,
        message: String,
        action: PendingAction<Ctx>,
    },
}

pub struct Confirmation<Ctx> {
    state: State<Ctx>,
}

impl<Ctx> Default for Confirmation<Ctx> {
    fn default() -> Self {
        Self { state: State::Idle }
    }
}

impl<Ctx> fmt::Debug for Confirmation<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Idle => f.write_str("Confirmation::Idle"),
            State::AwaitingConfirmation { title, message, .. } => f
                .debug_struct("Confirmation::AwaitingConfirmation")
                .field("title", title)
                .field("message", message)
                .finish_non_exhaustive(),
        }
    }
}

impl<Ctx> Confirmation<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::AwaitingConfirmation { .. })
    }

    pub fn title(&self) -> Option<&str> {
        match &self.state {
            State::AwaitingConfirmation { title, .. } => Some(title),
            State::Idle => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.state {
            State::AwaitingConfirmation { message, .. } => Some(message),
            State::Idle => None,
        }
    }

    /// Open the dialog for `action` without running it. A second request while the
    /// dialog is open replaces the first; the replaced action is dropped uninvoked.
    pub fn request_confirmation(
        &mut self,
        action: impl FnOnce(&mut Ctx) + 'static,
        options: ConfirmOptions,
    ) {
        let title = options
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let message = options
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        self.state = State::AwaitingConfirmation {
            title,
            message,
            action: Box::new(action),
        };
    }

    /// Close the dialog and drop the pending action. Returns whether anything was pending.
    pub fn cancel(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = State::Idle;
        was_open
    }

    /// Run the pending action once and close. The dialog does not wait for any work the
    /// action starts; callers track that themselves. Returns whether an action ran.
    pub fn confirm(&mut self, ctx: &mut Ctx) -> bool {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::AwaitingConfirmation { action, .. } => {
                action(ctx);
                true
            }
            State::Idle => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_action(counter: &Rc<Cell<u32>>) -> impl FnOnce(&mut ()) + 'static {
        let counter = Rc::clone(counter);
        move |_| counter.set(counter.get() + 1)
    }

    #[test]
    fn request_then_cancel_never_runs_the_action() {
        let runs = Rc::new(Cell::new(0));
        let mut dialog = Confirmation::<()>::new();

        dialog.request_confirmation(counting_action(&runs), ConfirmOptions::default());
        assert!(dialog.is_open());
        assert_eq!(dialog.title(), Some(DEFAULT_TITLE));
        assert_eq!(dialog.message(), Some(DEFAULT_MESSAGE));

        assert!(dialog.cancel());
        assert!(!dialog.is_open());
        assert!(!dialog.confirm(&mut ()));
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn request_then_confirm_runs_exactly_once() {
        let runs = Rc::new(Cell::new(0));
        let mut dialog = Confirmation::<()>::new();

        dialog.request_confirmation(
            counting_action(&runs),
            ConfirmOptions::new("Delete Branch?", "Delete \"Main\"?"),
        );
        assert_eq!(dialog.title(), Some("Delete Branch?"));

        assert!(dialog.confirm(&mut ()));
        assert!(!dialog.is_open());
        assert!(!dialog.confirm(&mut ()));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn idle_cancel_is_a_no_op() {
        let mut dialog = Confirmation::<()>::new();
        assert!(!dialog.cancel());
        assert_eq!(dialog.title(), None);
    }

    #[test]
    fn newer_request_replaces_pending_action() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let mut dialog = Confirmation::<()>::new();

        dialog.request_confirmation(counting_action(&first), ConfirmOptions::default());
        dialog.request_confirmation(counting_action(&second), ConfirmOptions::default());
        dialog.confirm(&mut ());

        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn action_receives_the_context() {
        let mut dialog = Confirmation::<Vec<&'static str>>::new();
        dialog.request_confirmation(|log| log.push("deleted"), ConfirmOptions::default());

        let mut log = Vec::new();
        dialog.confirm(&mut log);
        assert_eq!(log, vec!["deleted"]);
    }
}
