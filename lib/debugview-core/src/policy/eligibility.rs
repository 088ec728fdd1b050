use crate::lifecycle::ScreenId;
use indexmap::IndexSet;
use std::cell::RefCell;

/// Decides which screens take part in the overlay policy.
pub trait EligibilityPredicate {
    fn is_eligible(&self, screen: &ScreenId) -> bool;
}

impl<F> EligibilityPredicate for F
where
    F: Fn(&ScreenId) -> bool,
{
    fn is_eligible(&self, screen: &ScreenId) -> bool {
        self(screen)
    }
}

/// Capability marker for screen types that show the debug overlay.
pub trait DebugUiScreen {
    const SCREEN_NAME: &'static str;
}

/// Explicit set of opted-in screen names.
#[derive(Debug, Default)]
pub struct OptInScreens {
    names: RefCell<IndexSet<String>>,
}

impl OptInScreens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opt_in(&self, name: impl Into<String>) {
        self.names.borrow_mut().insert(name.into());
    }

    pub fn opt_in_screen<S: DebugUiScreen>(&self) {
        self.opt_in(S::SCREEN_NAME);
    }

    pub fn opt_out(&self, name: &str) -> bool {
        self.names.borrow_mut().shift_remove(name)
    }
}

impl EligibilityPredicate for OptInScreens {
    fn is_eligible(&self, screen: &ScreenId) -> bool {
        self.names.borrow().contains(&screen.name)
    }
}
