// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single update context.
//!
//! Supervisors, engine log sinks, pollers and the RPC client only enqueue
//! raw events. The dispatcher dequeues them in order, timestamps log lines,
//! and runs listeners on whichever task drives it.

use av_core::event::channel;
use av_core::{Clock, Event, EventReceiver, EventSender, Notification, SystemClock};

/// Consumer of dispatched notifications
pub trait Listener: Send {
    fn notify(&mut self, notification: &Notification);
}

impl<F> Listener for F
where
    F: FnMut(&Notification) + Send,
{
    fn notify(&mut self, notification: &Notification) {
        self(notification)
    }
}

pub struct Dispatcher<C: Clock = SystemClock> {
    rx: EventReceiver,
    tx: EventSender,
    clock: C,
    listeners: Vec<Box<dyn Listener>>,
}

impl Dispatcher<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Dispatcher<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Dispatcher<C> {
    pub fn with_clock(clock: C) -> Self {
        let (tx, rx) = channel();
        Self {
            rx,
            tx,
            clock,
            listeners: Vec::new(),
        }
    }

    /// Sender for producers; every clone feeds this dispatcher
    pub fn sender(&self) -> EventSender {
        self.tx.clone()
    }

    /// Listeners are called in subscription order
    pub fn subscribe(&mut self, listener: impl Listener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Wait for the next event and deliver it.
    ///
    /// Returns `None` once [`close`](Self::close) was called and the queue
    /// is drained.
    pub async fn next(&mut self) -> Option<Notification> {
        let event = self.rx.recv().await?;
        Some(self.deliver(event))
    }

    /// Deliver everything already queued without waiting
    pub fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.deliver(event);
            delivered += 1;
        }
        delivered
    }

    /// Refuse further events; queued ones can still be delivered
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Deliver events until closed
    pub async fn run(mut self) {
        while self.next().await.is_some() {}
    }

    fn deliver(&mut self, event: Event) -> Notification {
        let notification = Notification::stamp(event, self.clock.now());
        tracing::trace!(event = %notification, "dispatch");
        for listener in &mut self.listeners {
            listener.notify(&notification);
        }
        notification
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
