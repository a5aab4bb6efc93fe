//! Reviewable policy choices the surrounding deployments disagree on.

/// Who may call `assign_role`. One deploy script has a single deployer assign
/// every role; another flow has each account self-assign. Both are supported,
/// chosen explicitly per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleAssignmentPolicy {
    /// Only the named administrative identity may assign roles.
    AdminOnly { admin: String },
    /// Any identity may assign a role, but only to itself.
    SelfService,
}

/// Whether Status gates stage-advancing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportGate {
    /// Status is an informational overlay; stage advances check Stage only.
    Lenient,
    /// Stage advances (manufacture, receive-by-X) require a completed
    /// transport leg, i.e. status == Completed.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPolicy {
    pub role_assignment: RoleAssignmentPolicy,
    pub transport_gate: TransportGate,
}

impl LedgerPolicy {
    /// Single-admin role assignment, lenient transport gating. Matches the
    /// deployment where one account provisions every participant.
    pub fn admin_only(admin: impl Into<String>) -> Self {
        Self {
            role_assignment: RoleAssignmentPolicy::AdminOnly {
                admin: admin.into(),
            },
            transport_gate: TransportGate::Lenient,
        }
    }
    /// Self-service role assignment, lenient transport gating.
    pub fn self_service() -> Self {
        Self {
            role_assignment: RoleAssignmentPolicy::SelfService,
            transport_gate: TransportGate::Lenient,
        }
    }
    pub fn with_transport_gate(mut self, gate: TransportGate) -> Self {
        self.transport_gate = gate;
        self
    }
}
