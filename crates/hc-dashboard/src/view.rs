use std::cell::RefCell;
use std::rc::Rc;

/// Main body of a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel<T> {
    Loading(&'static str),
    Failed {
        message: String,
    },
    Empty {
        message: &'static str,
        hint: Option<&'static str>,
    },
    Ready(T),
}

impl<T> Panel<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(rows) => Some(rows),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Outcome of a user-triggered mutation; shown as a blocking alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            text: text.into(),
        }
    }
}

/// Redraw hook installed by the UI layer. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct Redraw(Rc<RefCell<Option<Rc<dyn Fn()>>>>);

impl Redraw {
    pub fn set(&self, hook: Rc<dyn Fn()>) {
        *self.0.borrow_mut() = Some(hook);
    }

    pub fn fire(&self) {
        let hook = self.0.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}
