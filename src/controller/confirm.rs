//! Two-step guard for destructive actions.

use std::future::Future;

use tracing::debug;

/// Confirmation request for a pending destructive action
#[derive(Debug, Clone)]
pub struct ConfirmationGate<T> {
    target: Option<T>,
    open: bool,
}

impl<T> Default for ConfirmationGate<T> {
    fn default() -> Self {
        Self {
            target: None,
            open: false,
        }
    }
}

impl<T> ConfirmationGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the confirmation view for `target`
    pub fn open(&mut self, target: T) {
        self.target = Some(target);
        self.open = true;
    }

    /// Close without side effects
    pub fn cancel(&mut self) {
        debug!("confirmation cancelled");
        self.close();
    }

    fn close(&mut self) {
        self.target = None;
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// True when a confirm would fire the guarded action
    pub fn armed(&self) -> bool {
        self.open && self.target.is_some()
    }

    /// Run `action` on the target if the gate is armed.
    ///
    /// The gate closes once the action completes, whatever its result.
    /// Returns `None` without running anything when the gate is not armed.
    pub async fn confirm<F, Fut, R>(&mut self, action: F) -> Option<R>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = R>,
    {
        if !self.open {
            return None;
        }
        let target = self.target.take()?;
        let result = action(target).await;
        self.close();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn test_confirm_without_open_does_nothing() {
        let mut gate: ConfirmationGate<&str> = ConfirmationGate::new();
        let fired = Cell::new(false);
        let flag = &fired;
        let result = gate.confirm(move |_| async move { flag.set(true) }).await;
        assert!(result.is_none());
        assert!(!fired.get());
    }

    #[tokio::test]
    async fn test_confirm_after_cancel_does_nothing() {
        let mut gate = ConfirmationGate::new();
        gate.open("r1");
        gate.cancel();
        assert!(!gate.is_open());
        assert!(gate.target().is_none());

        let result = gate.confirm(|id| async move { id.to_string() }).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_confirm_runs_once_and_closes() {
        let mut gate = ConfirmationGate::new();
        gate.open("r1");
        assert!(gate.armed());

        let result = gate.confirm(|id| async move { format!("deleted {id}") }).await;
        assert_eq!(result.as_deref(), Some("deleted r1"));
        assert!(!gate.is_open());

        let again = gate.confirm(|id| async move { format!("deleted {id}") }).await;
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_gate_closes_on_failed_action() {
        let mut gate = ConfirmationGate::new();
        gate.open(7u32);
        let result: Option<Result<(), String>> = gate
            .confirm(|_| async { Err("server refused".to_string()) })
            .await;
        assert!(matches!(result, Some(Err(_))));
        assert!(!gate.armed());
    }

    #[test]
    fn test_reopen_replaces_target() {
        let mut gate = ConfirmationGate::new();
        gate.open("r1");
        gate.open("r2");
        assert_eq!(gate.target(), Some(&"r2"));
    }
}
