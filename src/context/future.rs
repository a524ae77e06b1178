use std::{
    future::Future,
    pin::Pin,
    task::{self, Poll},
};

use super::{Context, Frame, Registers};

/// A future that runs under its own [`Context`].
///
/// The context is installed around every poll of the inner future, and whatever the inner future
/// changes is kept for the next poll. The polling thread's own registers are left untouched,
/// so the future may move between executor threads freely.
#[must_use = "futures do nothing unless polled"]
pub struct WithContext<F> {
    inner: Pin<Box<F>>,
    registers: Registers,
}

impl<F> WithContext<F> {
    /// The context the inner future will see on its next poll.
    #[inline]
    pub fn context(&self) -> Context {
        self.registers.context
    }
}

impl<F: Future> Future for WithContext<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let frame = Frame::enter(this.registers);
        let output = this.inner.as_mut().poll(cx);
        this.registers = frame.exit();
        output
    }
}

pub trait ContextExt: Future + Sized {
    /// Runs this future under `context`.
    #[inline]
    fn with_context(self, context: Context) -> WithContext<Self> {
        WithContext {
            inner: Box::pin(self),
            registers: Registers::from(context),
        }
    }

    /// Runs this future under the calling thread's current context, captured now.
    #[inline]
    fn with_current_context(self) -> WithContext<Self> {
        self.with_context(Context::current())
    }
}

impl<F: Future> ContextExt for F {}
