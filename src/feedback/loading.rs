//! Global loading overlay
//!
//! Refreshes may overlap (the periodic one and a visibility-triggered one),
//! so the overlay tracks how many are in flight and only hides when the last
//! one finishes.

use std::cell::Cell;
use std::rc::Rc;

use crate::page::Page;

#[derive(Clone)]
pub struct LoadingIndicator {
    page: Rc<dyn Page>,
    in_flight: Rc<Cell<usize>>,
}

impl LoadingIndicator {
    pub fn new(page: Rc<dyn Page>) -> Self {
        Self {
            page,
            in_flight: Rc::new(Cell::new(0)),
        }
    }

    pub fn begin(&self) {
        let n = self.in_flight.get();
        self.in_flight.set(n + 1);
        if n == 0 {
            self.page.set_loading(true);
        }
    }

    pub fn end(&self) {
        match self.in_flight.get() {
            0 => {}
            1 => {
                self.in_flight.set(0);
                self.page.set_loading(false);
            }
            n => self.in_flight.set(n - 1),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get() > 0
    }
}
