use std::fmt;

/// The seam to the external browser-automation runtime: something that can
/// hand out live session objects (an authenticated page) and take them
/// back.
///
/// The orchestrator never constructs sessions itself and never holds one
/// as ambient global state; every session flows through a provider owned
/// by the [`ContextManager`].
pub trait SessionProvider {
    type Session;

    /// Create or check out a live session.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] when the runtime cannot produce a
    /// session. In shared mode this is fatal for the whole suite.
    fn acquire(&mut self) -> Result<Self::Session, SessionError>;

    /// Return a session for teardown.
    fn release(&mut self, session: Self::Session);
}

/// Whether tests of a suite share one long-lived session or each get a
/// fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    /// One session, acquired before the first test that needs it, reused
    /// by every test body, released once after the suite concludes.
    Shared,
    /// A fresh session per test, torn down as the test finishes.
    Isolated,
}

/// Owns the session lifecycle for one suite run.
///
/// In shared mode the single instance is initialized exactly once, lazily,
/// and released exactly once — on every exit path, including a scheduler
/// abort, via the `Drop` backstop.
pub struct ContextManager<P: SessionProvider> {
    provider: P,
    mode: ContextMode,
    shared: Option<P::Session>,
}

impl<P: SessionProvider> ContextManager<P> {
    pub fn new(provider: P, mode: ContextMode) -> Self {
        Self {
            provider,
            mode,
            shared: None,
        }
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Whether the shared session has been initialized and not yet
    /// released.
    pub fn has_live_session(&self) -> bool {
        self.shared.is_some()
    }

    /// Run `f` with the session appropriate for one test.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`SessionError`] when no session can be
    /// acquired; `f` is not invoked in that case.
    pub fn with_session<T>(&mut self, f: impl FnOnce(&mut P::Session) -> T) -> Result<T, SessionError> {
        match self.mode {
            ContextMode::Shared => {
                if self.shared.is_none() {
                    self.shared = Some(self.provider.acquire()?);
                }
                match self.shared.as_mut() {
                    Some(session) => Ok(f(session)),
                    None => Err(SessionError::new("shared session missing after acquisition")),
                }
            }
            ContextMode::Isolated => {
                let mut session = self.provider.acquire()?;
                let out = f(&mut session);
                self.provider.release(session);
                Ok(out)
            }
        }
    }

    /// Release the shared session, if one is live. Idempotent; also run by
    /// `Drop` so abort paths cannot leak the session.
    pub fn shutdown(&mut self) {
        if let Some(session) = self.shared.take() {
            self.provider.release(session);
        }
    }
}

impl<P: SessionProvider> Drop for ContextManager<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Failure to acquire a session from the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub message: String,
    pub detail: Option<String>,
}

impl SessionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session unavailable: {}", self.message)
    }
}

impl std::error::Error for SessionError {}
