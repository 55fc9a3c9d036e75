// SPDX-License-Identifier: GPL-3.0-only

//! Event loop owning the capture screen
//!
//! Every message, whether from user input or a finished task, goes through
//! one channel and is applied by one owner, so transitions never overlap.

use super::{CaptureScreen, Message};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

pub struct EventLoop {
    screen: CaptureScreen,
    sender: UnboundedSender<Message>,
    receiver: UnboundedReceiver<Message>,
}

impl EventLoop {
    pub fn new(screen: CaptureScreen) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            screen,
            sender,
            receiver,
        }
    }

    /// Run the screen's initial task
    pub fn start(&mut self) {
        self.screen.init().spawn(&self.sender);
    }

    /// Sender for messages from outside the loop, e.g. key presses
    pub fn sender(&self) -> UnboundedSender<Message> {
        self.sender.clone()
    }

    /// Apply a message now and spawn the task it returns
    pub fn dispatch(&mut self, message: Message) {
        let task = self.screen.update(message);
        if !task.is_none() {
            debug!(?task, "Spawning task");
            task.spawn(&self.sender);
        }
    }

    /// Wait for the next queued message and apply it
    pub async fn step(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Apply a queued message if there is one
    pub fn try_step(&mut self) -> bool {
        match self.receiver.try_recv() {
            Ok(message) => {
                self.dispatch(message);
                true
            }
            Err(_) => false,
        }
    }

    /// Process messages until `done` holds or `timeout` passes
    ///
    /// Returns whether the condition was reached.
    pub async fn run_until(
        &mut self,
        timeout: Duration,
        mut done: impl FnMut(&CaptureScreen) -> bool,
    ) -> bool {
        let wait = async {
            while !done(&self.screen) {
                if !self.step().await {
                    return false;
                }
            }
            true
        };
        tokio::time::timeout(timeout, wait).await.unwrap_or(false)
    }

    pub fn screen(&self) -> &CaptureScreen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut CaptureScreen {
        &mut self.screen
    }

    pub fn into_screen(self) -> CaptureScreen {
        self.screen
    }
}
