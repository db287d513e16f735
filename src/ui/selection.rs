use crate::ai::ProviderResult;

/// Input to the selection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    MoveRight,
    MoveLeft,
    Confirm,
    Quit,
    Resize { width: u16, height: u16 },
}

/// Cursor over the comparison results.
///
/// Pure state: rendering and key handling live in `selection_view`. Once
/// `quitting` is set no event changes anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    cursor: usize,
    selectable: Vec<bool>,
    quitting: bool,
    chosen: Option<usize>,
    size: (u16, u16),
}

impl SelectionState {
    /// State over `results`; `None` when there is nothing to choose from
    pub fn try_new(results: &[ProviderResult]) -> Option<Self> {
        Self::from_selectable(results.iter().map(ProviderResult::is_success).collect())
    }

    /// One flag per entry telling whether it can be confirmed
    pub fn from_selectable(selectable: Vec<bool>) -> Option<Self> {
        if selectable.is_empty() {
            return None;
        }
        Some(Self {
            cursor: 0,
            selectable,
            quitting: false,
            chosen: None,
            size: (0, 0),
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }

    /// Last terminal size reported through `Resize`
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn update(mut self, event: SelectionEvent) -> Self {
        if self.quitting {
            return self;
        }

        let m = self.selectable.len();
        match event {
            SelectionEvent::MoveRight => self.cursor = (self.cursor + 1) % m,
            SelectionEvent::MoveLeft => self.cursor = (self.cursor + m - 1) % m,
            SelectionEvent::Confirm => {
                // Failed providers have nothing to run.
                if self.selectable[self.cursor] {
                    self.chosen = Some(self.cursor);
                    self.quitting = true;
                }
            }
            SelectionEvent::Quit => {
                self.chosen = None;
                self.quitting = true;
            }
            SelectionEvent::Resize { width, height } => self.size = (width, height),
        }

        self
    }

    /// Index of the confirmed entry, if the user confirmed one
    pub fn into_choice(self) -> Option<usize> {
        self.chosen
    }
}
