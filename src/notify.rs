//! User-facing outcome reporting. The engine only queues notices; the front
//! end decides how to show them.

use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub trait Notifier {
    fn notify(&mut self, level: NoticeLevel, message: String);

    fn info(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(NoticeLevel::Info, message.into());
    }

    fn success(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(NoticeLevel::Success, message.into());
    }

    fn warning(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(NoticeLevel::Warning, message.into());
    }

    fn error(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(NoticeLevel::Error, message.into());
    }
}

/// Bounded FIFO of pending notices.
#[derive(Clone, Debug, Default)]
pub struct NoticeQueue {
    pending: VecDeque<Notice>,
}

impl NoticeQueue {
    const CAPACITY: usize = 32;

    pub fn drain(&mut self) -> impl Iterator<Item = Notice> + '_ {
        self.pending.drain(..)
    }

    pub fn last(&self) -> Option<&Notice> {
        self.pending.back()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Notifier for NoticeQueue {
    fn notify(&mut self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!(%message, "notice"),
            NoticeLevel::Warning => tracing::warn!(%message, "notice"),
            NoticeLevel::Error => tracing::error!(%message, "notice"),
        }
        if self.pending.len() == Self::CAPACITY {
            self.pending.pop_front();
        }
        self.pending.push_back(Notice { level, message });
    }
}
