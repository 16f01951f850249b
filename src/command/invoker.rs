//! FIFO command queue with optional undo history
//!
//! An invoker is confined to the scenario that owns it; it is not meant to be
//! shared across tasks.

use std::collections::VecDeque;

use super::Command;
use crate::common::{Error, Result};

pub struct CommandInvoker {
    queue: VecDeque<Box<dyn Command>>,
    history: Vec<Box<dyn Command>>,
    undo_enabled: bool,
}

impl Default for CommandInvoker {
    fn default() -> Self {
        Self::new(false)
    }
}

impl CommandInvoker {
    pub fn new(undo_enabled: bool) -> Self {
        Self {
            queue: VecDeque::new(),
            history: Vec::new(),
            undo_enabled,
        }
    }

    pub fn add_command(&mut self, command: Box<dyn Command>) {
        tracing::debug!(
            "Added command to queue: {} (queue size: {})",
            command.name(),
            self.queue.len() + 1
        );
        self.queue.push_back(command);
    }

    /// Run one command immediately, outside the queue
    pub async fn execute_command(&mut self, mut command: Box<dyn Command>) -> Result<()> {
        if !command.can_execute() {
            return Err(Error::CommandRejected(command.name()));
        }

        tracing::debug!("Executing command: {}", command.name());
        command.execute().await?;
        tracing::debug!("Command executed successfully: {}", command.name());
        self.record(command);
        Ok(())
    }

    /// Drain the queue in FIFO order
    ///
    /// On the first failure the remaining commands stay queued and the error
    /// reports the failing command and its position.
    pub async fn execute_all(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            tracing::debug!("No commands in queue to execute");
            return Ok(());
        }

        let total = self.queue.len();
        tracing::debug!("Executing {} queued commands", total);

        let mut index = 0;
        while let Some(command) = self.queue.pop_front() {
            let name = command.name();
            if let Err(e) = self.execute_command(command).await {
                tracing::debug!(
                    "Failed to execute command {} of {}: {}",
                    index + 1,
                    total,
                    e
                );
                return Err(Error::CommandFailed {
                    index,
                    total,
                    command: name,
                    source: Box::new(e),
                });
            }
            index += 1;
        }

        tracing::debug!("All {} commands executed successfully", total);
        Ok(())
    }

    /// Undo the most recent undoable command
    ///
    /// Returns `Ok(false)` when the history is empty. A failed undo puts the
    /// command back on top of the history so it can be retried.
    pub async fn undo_last(&mut self) -> Result<bool> {
        if !self.undo_enabled {
            return Err(Error::Unsupported(
                "Undo is not enabled for this invoker".to_string(),
            ));
        }

        let Some(mut command) = self.history.pop() else {
            tracing::warn!("No commands to undo");
            return Ok(false);
        };

        tracing::debug!("Undoing command: {}", command.name());
        match command.undo().await {
            Ok(()) => {
                tracing::debug!("Command undone successfully: {}", command.name());
                Ok(true)
            }
            Err(e) => {
                let name = command.name();
                tracing::error!("Failed to undo command: {} - {}", name, e);
                self.history.push(command);
                Err(Error::UndoFailed {
                    command: name,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Undo the whole history, most recent first; stops at the first failure
    pub async fn undo_all(&mut self) -> Result<usize> {
        let mut undone = 0;
        while self.undo_last().await? {
            undone += 1;
        }
        Ok(undone)
    }

    fn record(&mut self, command: Box<dyn Command>) {
        if self.undo_enabled && command.can_undo() {
            tracing::trace!("Command added to undo stack: {}", command.name());
            self.history.push(command);
        }
    }

    pub fn clear_queue(&mut self) {
        let size = self.queue.len();
        self.queue.clear();
        tracing::debug!("Cleared {} commands from queue", size);
    }

    pub fn clear_history(&mut self) {
        let size = self.history.len();
        self.history.clear();
        tracing::debug!("Cleared {} commands from history", size);
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn has_queued_commands(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_enabled && !self.history.is_empty()
    }

    pub fn is_undo_enabled(&self) -> bool {
        self.undo_enabled
    }

    /// Names of the queued commands, in execution order
    pub fn queued_names(&self) -> Vec<String> {
        self.queue.iter().map(|c| c.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Probe {
        name: &'static str,
        fail: bool,
        undoable: bool,
        fail_undo: Arc<Mutex<bool>>,
        log: Log,
    }

    impl Probe {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                fail: false,
                undoable: true,
                fail_undo: Arc::new(Mutex::new(false)),
                log: Arc::clone(log),
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn boxed(self) -> Box<dyn Command> {
            Box::new(self)
        }
    }

    #[async_trait]
    impl Command for Probe {
        async fn execute(&mut self) -> Result<()> {
            self.log.lock().unwrap().push(format!("exec {}", self.name));
            if self.fail {
                Err(Error::Assertion(format!("{} failed", self.name)))
            } else {
                Ok(())
            }
        }

        async fn undo(&mut self) -> Result<()> {
            if *self.fail_undo.lock().unwrap() {
                return Err(Error::Internal("undo broke".into()));
            }
            self.log.lock().unwrap().push(format!("undo {}", self.name));
            Ok(())
        }

        fn can_undo(&self) -> bool {
            self.undoable
        }

        fn name(&self) -> String {
            self.name.to_string()
        }
    }

    #[tokio::test]
    async fn test_execute_all_runs_fifo() {
        let log = Log::default();
        let mut invoker = CommandInvoker::new(true);
        for name in ["a", "b", "c"] {
            invoker.add_command(Probe::new(name, &log).boxed());
        }
        invoker.execute_all().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["exec a", "exec b", "exec c"]);
        assert_eq!(invoker.history_len(), 3);
        assert!(!invoker.has_queued_commands());
    }

    #[tokio::test]
    async fn test_failure_requeues_remainder() {
        let log = Log::default();
        let mut invoker = CommandInvoker::new(false);
        invoker.add_command(Probe::new("a", &log).boxed());
        invoker.add_command(Probe::new("b", &log).failing().boxed());
        invoker.add_command(Probe::new("c", &log).boxed());
        invoker.add_command(Probe::new("d", &log).boxed());

        let err = invoker.execute_all().await.unwrap_err();
        match &err {
            Error::CommandFailed {
                index,
                total,
                command,
                ..
            } => {
                assert_eq!((*index, *total), (1, 4));
                assert_eq!(command, "b");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(invoker.queued_names(), vec!["c", "d"]);
        assert_eq!(*log.lock().unwrap(), vec!["exec a", "exec b"]);
    }

    #[tokio::test]
    async fn test_undo_disabled_never_touches_history() {
        let log = Log::default();
        let mut invoker = CommandInvoker::new(false);
        invoker
            .execute_command(Probe::new("a", &log).boxed())
            .await
            .unwrap();
        for _ in 0..3 {
            let err = invoker.undo_last().await.unwrap_err();
            assert!(matches!(err, Error::Unsupported(_)));
            assert_eq!(err.kind(), crate::common::ErrorKind::Undo);
        }
        assert_eq!(invoker.history_len(), 0);
        assert!(!invoker.can_undo());
    }

    #[tokio::test]
    async fn test_only_undoable_commands_enter_history() {
        let log = Log::default();
        let mut invoker = CommandInvoker::new(true);
        let mut plain = Probe::new("plain", &log);
        plain.undoable = false;
        invoker.execute_command(plain.boxed()).await.unwrap();
        invoker
            .execute_command(Probe::new("typed", &log).boxed())
            .await
            .unwrap();
        assert_eq!(invoker.history_len(), 1);
    }

    #[tokio::test]
    async fn test_failed_undo_restores_history() {
        let log = Log::default();
        let mut invoker = CommandInvoker::new(true);
        let probe = Probe::new("a", &log);
        let fail_undo = Arc::clone(&probe.fail_undo);
        invoker.execute_command(probe.boxed()).await.unwrap();

        *fail_undo.lock().unwrap() = true;
        let err = invoker.undo_last().await.unwrap_err();
        assert!(matches!(err, Error::UndoFailed { .. }));
        assert_eq!(invoker.history_len(), 1);

        *fail_undo.lock().unwrap() = false;
        assert!(invoker.undo_last().await.unwrap());
        assert_eq!(invoker.history_len(), 0);
        assert!(!invoker.undo_last().await.unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["exec a", "undo a"]);
    }

    #[tokio::test]
    async fn test_undo_all_is_lifo() {
        let log = Log::default();
        let mut invoker = CommandInvoker::new(true);
        for name in ["a", "b"] {
            invoker.add_command(Probe::new(name, &log).boxed());
        }
        invoker.execute_all().await.unwrap();
        assert_eq!(invoker.undo_all().await.unwrap(), 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["exec a", "exec b", "undo b", "undo a"]
        );
    }
}
