// SPDX-License-Identifier: GPL-3.0-only

//! Deferred work returned by the update function
//!
//! A [`Task`] is a set of message streams. Handlers never await a
//! collaborator themselves; they return a task and the event loop feeds
//! whatever it yields back into `update`.

use super::state::Message;
use futures::stream::{self, BoxStream, SelectAll};
use futures::{Future, Stream, StreamExt};
use tokio::sync::mpsc::UnboundedSender;

#[must_use = "a task does nothing unless it is run"]
pub struct Task {
    streams: Vec<BoxStream<'static, Message>>,
}

impl Task {
    /// A task that yields nothing
    pub fn none() -> Self {
        Self {
            streams: Vec::new(),
        }
    }

    /// Yield `message` right away
    pub fn done(message: Message) -> Self {
        Self::run(stream::iter([message]))
    }

    /// Run `future` and map its output to a message
    pub fn perform<T, F>(future: F, f: impl FnOnce(T) -> Message + Send + 'static) -> Self
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        Self::future(async move { f(future.await) })
    }

    pub fn future(future: impl Future<Output = Message> + Send + 'static) -> Self {
        Self::run(stream::once(future))
    }

    /// Run `future`, yielding its message if it produced one
    pub fn optional(future: impl Future<Output = Option<Message>> + Send + 'static) -> Self {
        Self::run(stream::once(future).filter_map(futures::future::ready))
    }

    /// Yield every message of `stream`
    pub fn run(stream: impl Stream<Item = Message> + Send + 'static) -> Self {
        Self {
            streams: vec![stream.boxed()],
        }
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            streams: tasks.into_iter().flat_map(|t| t.streams).collect(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.streams.is_empty()
    }

    /// Merge everything into one stream, messages arrive as they are ready
    pub fn into_stream(self) -> SelectAll<BoxStream<'static, Message>> {
        stream::select_all(self.streams)
    }

    /// Drive the task on the tokio runtime, forwarding messages to `sender`
    pub fn spawn(self, sender: &UnboundedSender<Message>) {
        for mut stream in self.streams {
            let sender = sender.clone();
            tokio::spawn(async move {
                while let Some(message) = stream.next().await {
                    if sender.send(message).is_err() {
                        break;
                    }
                }
            });
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("streams", &self.streams.len())
            .finish()
    }
}
