use huddle_protocol::{
    ClientEvent, DeviceSettings, MeetingPermissionsPatch, ServerEvent, WaitingRoomSettingsPatch,
};

use crate::snapshot::MeetingSnapshot;

/// Contract between the UI layer and one feature's slice of meeting state.
///
/// The UI wires each adapter to its widgets: inbound server events that the
/// adapter `wants` get routed through `apply`, and user gestures call the
/// adapter's intent methods to obtain the event to emit. Rendering stays on
/// the UI side.
pub trait FeatureAdapter {
    fn wants(&self, event: &ServerEvent) -> bool;

    fn apply(&self, event: &ServerEvent, snapshot: &mut MeetingSnapshot) {
        snapshot.apply(event);
    }
}

/// Waiting-room feature: join requests on the participant side, queue
/// management on the host side.
#[derive(Debug, Default)]
pub struct WaitingRoomAdapter;

impl WaitingRoomAdapter {
    pub fn request_join(
        &self,
        meeting_id: &str,
        participant_name: &str,
        device_settings: DeviceSettings,
    ) -> ClientEvent {
        ClientEvent::RequestJoinMeeting {
            meeting_id: meeting_id.to_string(),
            participant_name: participant_name.to_string(),
            device_settings,
        }
    }

    pub fn admit(&self, meeting_id: &str, participant_socket_id: &str) -> ClientEvent {
        ClientEvent::AdmitParticipant {
            meeting_id: meeting_id.to_string(),
            participant_socket_id: participant_socket_id.to_string(),
        }
    }

    pub fn admit_all(&self, meeting_id: &str) -> ClientEvent {
        ClientEvent::AdmitAllParticipants {
            meeting_id: meeting_id.to_string(),
        }
    }

    pub fn deny(
        &self,
        meeting_id: &str,
        participant_socket_id: &str,
        reason: Option<String>,
    ) -> ClientEvent {
        ClientEvent::DenyParticipant {
            meeting_id: meeting_id.to_string(),
            participant_socket_id: participant_socket_id.to_string(),
            reason,
        }
    }

    pub fn update_settings(
        &self,
        meeting_id: &str,
        settings: WaitingRoomSettingsPatch,
    ) -> ClientEvent {
        ClientEvent::UpdateWaitingRoomSettings {
            meeting_id: meeting_id.to_string(),
            settings,
        }
    }
}

impl FeatureAdapter for WaitingRoomAdapter {
    fn wants(&self, event: &ServerEvent) -> bool {
        matches!(
            event,
            ServerEvent::WaitingRoomJoined { .. }
                | ServerEvent::WaitingRoomParticipantJoined { .. }
                | ServerEvent::WaitingRoomAdmitted { .. }
                | ServerEvent::WaitingRoomDenied { .. }
                | ServerEvent::WaitingRoomLeft { .. }
                | ServerEvent::WaitingRoomSettingsUpdated { .. }
        )
    }
}

/// Meeting lock feature.
#[derive(Debug, Default)]
pub struct LockAdapter;

impl LockAdapter {
    pub fn toggle(&self, is_locked: bool) -> ClientEvent {
        ClientEvent::ToggleMeetingLock { is_locked }
    }
}

impl FeatureAdapter for LockAdapter {
    fn wants(&self, event: &ServerEvent) -> bool {
        matches!(
            event,
            ServerEvent::MeetingLockChanged { .. } | ServerEvent::MeetingLocked { .. }
        )
    }
}

/// Permission bundle + rename feature.
#[derive(Debug, Default)]
pub struct PermissionsAdapter;

impl PermissionsAdapter {
    pub fn update(&self, permissions: MeetingPermissionsPatch) -> ClientEvent {
        ClientEvent::UpdateMeetingPermissions { permissions }
    }

    pub fn rename_self(&self, new_name: &str) -> ClientEvent {
        ClientEvent::RenameParticipant {
            new_name: new_name.to_string(),
        }
    }

    pub fn host_rename_self(&self, new_name: &str) -> ClientEvent {
        ClientEvent::HostRenameSelf {
            new_name: new_name.to_string(),
        }
    }
}

impl FeatureAdapter for PermissionsAdapter {
    fn wants(&self, event: &ServerEvent) -> bool {
        matches!(
            event,
            ServerEvent::MeetingPermissionsUpdated { .. }
                | ServerEvent::ParticipantRenamed { .. }
        )
    }
}

/// Recording-consent feature.
#[derive(Debug, Default)]
pub struct RecordingAdapter;

impl RecordingAdapter {
    pub fn request(&self, display_name: &str) -> ClientEvent {
        ClientEvent::RequestRecordingPermission {
            display_name: display_name.to_string(),
        }
    }

    pub fn respond(&self, request_id: &str, approve: bool) -> ClientEvent {
        ClientEvent::RespondRecordingRequest {
            request_id: request_id.to_string(),
            approve,
        }
    }

    pub fn suppress(&self, suppressed: bool) -> ClientEvent {
        ClientEvent::SuppressRecordingRequests { suppressed }
    }
}

impl FeatureAdapter for RecordingAdapter {
    fn wants(&self, event: &ServerEvent) -> bool {
        matches!(
            event,
            ServerEvent::RecordingPermissionRequested { .. }
                | ServerEvent::RecordingPermissionChanged { .. }
                | ServerEvent::RecordingRequestDenied { .. }
        )
    }
}

/// Roster feature: joins, leaves, flags, co-host and spotlight changes.
#[derive(Debug, Default)]
pub struct RosterAdapter;

impl RosterAdapter {
    pub fn set_co_host(&self, participant_socket_id: &str, is_co_host: bool) -> ClientEvent {
        ClientEvent::SetCoHost {
            participant_socket_id: participant_socket_id.to_string(),
            is_co_host,
        }
    }

    pub fn spotlight(&self, participant_socket_id: &str, is_spotlighted: bool) -> ClientEvent {
        ClientEvent::SpotlightParticipant {
            participant_socket_id: participant_socket_id.to_string(),
            is_spotlighted,
        }
    }

    pub fn leave(&self) -> ClientEvent {
        ClientEvent::LeaveMeeting
    }
}

impl FeatureAdapter for RosterAdapter {
    fn wants(&self, event: &ServerEvent) -> bool {
        matches!(
            event,
            ServerEvent::ParticipantJoined { .. }
                | ServerEvent::ParticipantLeft { .. }
                | ServerEvent::ParticipantStateChanged { .. }
                | ServerEvent::HandRaiseChanged { .. }
                | ServerEvent::CoHostChanged { .. }
                | ServerEvent::SpotlightChanged { .. }
        )
    }
}
