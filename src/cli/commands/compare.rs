//! Compare command implementation.
//!
//! The `preflight compare` command prints how two versions order.

use std::cmp::Ordering;

use crate::cli::args::CompareArgs;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::version::{compare, Version};

use super::dispatcher::{Command, CommandResult};

/// The compare command implementation.
pub struct CompareCommand {
    args: CompareArgs,
}

impl CompareCommand {
    /// Create a new compare command.
    pub fn new(args: CompareArgs) -> Self {
        Self { args }
    }
}

impl Command for CompareCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        for input in [&self.args.left, &self.args.right] {
            if Version::parse(input).is_none() {
                ui.warning(&format!("'{}' is not a version; it sorts lowest", input));
            }
        }

        let symbol = match compare(&self.args.left, &self.args.right) {
            Ordering::Less => "<",
            Ordering::Equal => "=",
            Ordering::Greater => ">",
        };
        ui.raw(&format!("{} {} {}", self.args.left, symbol, self.args.right));
        Ok(CommandResult::success())
    }
}
