//! Output verbosity.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Headers, results and per-item details.
    #[default]
    Normal,
    /// Final result only.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows headers and per-item details.
    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Normal)
    }
}
