//! Undoable units of execution
//!
//! A [`Command`] wraps one step execution. The [`CommandInvoker`] queues
//! commands, runs them in FIFO order and keeps a LIFO history of the ones
//! that can be undone.

mod invoker;
mod step;

pub use invoker::CommandInvoker;
pub use step::StepCommand;

use async_trait::async_trait;

use crate::common::{Error, Result};

#[async_trait]
pub trait Command: Send {
    async fn execute(&mut self) -> Result<()>;

    /// Revert the effect of a successful `execute`
    async fn undo(&mut self) -> Result<()> {
        Err(Error::Unsupported(format!("{} cannot be undone", self.name())))
    }

    fn can_undo(&self) -> bool {
        false
    }

    fn can_execute(&self) -> bool {
        true
    }

    fn name(&self) -> String;

    fn description(&self) -> String {
        self.name()
    }
}
