use std::cell::Cell;
use std::rc::Rc;

/// Grants exclusive ownership of a sheet's offset to one animation or fling.
///
/// Acquiring a token invalidates every earlier token at once. A motion checks
/// its token before applying each frame, so a superseded motion never moves
/// the sheet again.
#[derive(Debug, Default)]
pub struct MotionMutex {
    generation: Rc<Cell<u64>>,
}

impl MotionMutex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> MotionToken {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        MotionToken {
            generation,
            current: Rc::clone(&self.generation),
        }
    }

    /// Invalidates the current owner without granting a new token.
    pub fn invalidate(&self) {
        self.generation.set(self.generation.get() + 1);
    }
}

#[derive(Debug, Clone)]
pub struct MotionToken {
    generation: u64,
    current: Rc<Cell<u64>>,
}

impl MotionToken {
    pub fn is_current(&self) -> bool {
        self.current.get() == self.generation
    }
}
