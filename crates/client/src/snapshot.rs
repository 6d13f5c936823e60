use huddle_protocol::{
    MeetingPermissions, ParticipantSummary, RecordingPermission, ServerEvent,
    WaitingRoomSettings,
};
use tracing::debug;

/// Where this connection currently stands with the meeting.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReplicaPhase {
    #[default]
    Disconnected,
    /// Queued in the waiting room.
    Waiting {
        welcome_message: Option<String>,
    },
    /// Terminal: the host denied admission.
    Denied {
        reason: String,
    },
    /// Terminal: the meeting was locked when we tried to join.
    Blocked,
    InMeeting,
}

/// Locally cached replica of the authoritative meeting state. Mutated only by
/// server events (via [`apply`](Self::apply)) or by the optimistic layer,
/// which owns the rollback path.
#[derive(Debug, Default)]
pub struct MeetingSnapshot {
    pub socket_id: Option<String>,
    pub meeting_id: Option<String>,
    pub phase: ReplicaPhase,
    pub participants: Vec<ParticipantSummary>,
    pub permissions: MeetingPermissions,
    pub is_locked: bool,
    pub recording_permission: RecordingPermission,
    pub waiting_settings: Option<WaitingRoomSettings>,
    pub waiting_count: usize,
    pub chat_disabled: bool,
}

impl MeetingSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn me(&self) -> Option<&ParticipantSummary> {
        let socket_id = self.socket_id.as_deref()?;
        self.participants.iter().find(|p| p.socket_id == socket_id)
    }

    fn me_mut(&mut self) -> Option<&mut ParticipantSummary> {
        let socket_id = self.socket_id.clone()?;
        self.participants
            .iter_mut()
            .find(|p| p.socket_id == socket_id)
    }

    /// Applies one authoritative event. Unknown or irrelevant events leave
    /// the snapshot untouched.
    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::Connected { socket_id } => {
                self.socket_id = Some(socket_id.clone());
            }
            ServerEvent::MeetingJoined {
                meeting_id,
                participants,
                permissions,
                is_locked,
                recording_permission,
                ..
            }
            | ServerEvent::WaitingRoomAdmitted {
                meeting_id,
                participants,
                permissions,
                is_locked,
                recording_permission,
                ..
            } => {
                self.meeting_id = Some(meeting_id.clone());
                self.phase = ReplicaPhase::InMeeting;
                self.participants = participants.clone();
                self.permissions = permissions.clone();
                self.is_locked = *is_locked;
                self.recording_permission = *recording_permission;
            }
            ServerEvent::WaitingRoomJoined {
                meeting_id,
                welcome_message,
                ..
            } => {
                self.meeting_id = Some(meeting_id.clone());
                self.phase = ReplicaPhase::Waiting {
                    welcome_message: welcome_message.clone(),
                };
            }
            ServerEvent::WaitingRoomDenied { reason } => {
                self.phase = ReplicaPhase::Denied {
                    reason: reason.clone(),
                };
            }
            ServerEvent::MeetingLocked { meeting_id } => {
                self.meeting_id = Some(meeting_id.clone());
                self.phase = ReplicaPhase::Blocked;
            }
            ServerEvent::MeetingLockChanged { is_locked, .. } => {
                self.is_locked = *is_locked;
            }
            ServerEvent::MeetingPermissionsUpdated {
                permissions,
                participants,
                ..
            } => {
                self.permissions = permissions.clone();
                self.participants = participants.clone();
            }
            ServerEvent::WaitingRoomSettingsUpdated { settings, .. } => {
                self.waiting_settings = Some(settings.clone());
            }
            ServerEvent::WaitingRoomParticipantJoined { waiting_count, .. }
            | ServerEvent::WaitingRoomLeft { waiting_count } => {
                self.waiting_count = *waiting_count;
            }
            ServerEvent::ParticipantJoined { participants, .. }
            | ServerEvent::ParticipantLeft { participants, .. }
            | ServerEvent::ParticipantRenamed { participants, .. }
            | ServerEvent::CoHostChanged { participants, .. } => {
                self.participants = participants.clone();
            }
            ServerEvent::ParticipantStateChanged { participant } => {
                if let Some(existing) = self
                    .participants
                    .iter_mut()
                    .find(|p| p.socket_id == participant.socket_id)
                {
                    *existing = participant.clone();
                }
            }
            ServerEvent::HandRaiseChanged {
                socket_id,
                is_hand_raised,
            } => {
                if let Some(p) = self
                    .participants
                    .iter_mut()
                    .find(|p| p.socket_id == *socket_id)
                {
                    p.is_hand_raised = *is_hand_raised;
                }
            }
            ServerEvent::SpotlightChanged {
                socket_id,
                is_spotlighted,
            } => {
                if let Some(p) = self
                    .participants
                    .iter_mut()
                    .find(|p| p.socket_id == *socket_id)
                {
                    p.is_spotlighted = *is_spotlighted;
                }
            }
            ServerEvent::RecordingPermissionChanged { permission, .. } => {
                self.recording_permission = *permission;
            }
            ServerEvent::ChatStateChanged { chat_disabled, .. } => {
                self.chat_disabled = *chat_disabled;
            }
            ServerEvent::RecordingPermissionRequested { .. }
            | ServerEvent::RecordingRequestDenied { .. }
            | ServerEvent::ActionError { .. } => {
                // Surfaced to the UI / optimistic layer, no replica change.
                debug!(?event, "event not reflected in snapshot");
            }
        }
    }

    /// Sets one of our own boolean flags and returns the previous value.
    /// Only the optimistic layer calls this.
    pub(crate) fn set_self_flag(&mut self, flag: SelfFlag, value: bool) -> Option<bool> {
        let me = self.me_mut()?;
        let slot = match flag {
            SelfFlag::HandRaised => &mut me.is_hand_raised,
            SelfFlag::Muted => &mut me.is_muted,
            SelfFlag::CameraOn => &mut me.is_camera_on,
        };
        let previous = *slot;
        *slot = value;
        Some(previous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelfFlag {
    HandRaised,
    Muted,
    CameraOn,
}
