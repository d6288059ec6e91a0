/// Result of attaching one container to the designated network.
///
/// Attachment only reaches a running container's network namespace after a
/// restart, so a successful attach is followed by an activation step. The
/// variants make the partial-failure case observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Attached; activation deliberately skipped (`restart_on_attach = false`).
    Attached,
    /// Attached and restarted.
    Activated,
    /// Attached, but the restart failed. The attachment stays in place.
    ActivationFailed { error: String },
}

impl AttachOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachOutcome::Attached => "attached",
            AttachOutcome::Activated => "activated",
            AttachOutcome::ActivationFailed { .. } => "activation_failed",
        }
    }
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub network_created: bool,
    /// Containers that were already members and were left untouched.
    pub already_members: Vec<String>,
    /// Containers attached during this pass, with their activation outcome.
    pub attached: Vec<(String, AttachOutcome)>,
    /// Containers whose attach call failed: (id, error).
    pub attach_failures: Vec<(String, String)>,
}

impl ReconcileReport {
    pub fn attach_count(&self) -> usize {
        self.attached.len()
    }

    pub fn activated_count(&self) -> usize {
        self.count(|o| matches!(o, AttachOutcome::Activated))
    }

    pub fn activation_failed_count(&self) -> usize {
        self.count(|o| matches!(o, AttachOutcome::ActivationFailed { .. }))
    }

    /// True when the pass changed nothing on the runtime.
    pub fn is_converged(&self) -> bool {
        !self.network_created && self.attached.is_empty() && self.attach_failures.is_empty()
    }

    fn count(&self, pred: impl Fn(&AttachOutcome) -> bool) -> usize {
        self.attached.iter().filter(|(_, o)| pred(o)).count()
    }
}
