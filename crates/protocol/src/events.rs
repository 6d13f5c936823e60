use serde::{Deserialize, Serialize};

use crate::model::{
    DeviceSettings, MeetingPermissions, MeetingPermissionsPatch, ParticipantSummary,
    RecordingPermission, RecordingRequest, WaitingRoomSettings, WaitingRoomSettingsPatch,
    WaitingSummary,
};

/// Inbound socket events, `{"type": "...", "data": {...}}` on the wire.
///
/// Payloads are parsed at the boundary; a frame that does not match any
/// variant is answered with an `action-error` rather than dispatched on raw
/// JSON. Events without a `meeting_id` field act on the meeting the sending
/// socket is currently a member of.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    HostJoinMeeting {
        meeting_id: String,
        name: String,
    },
    RequestJoinMeeting {
        meeting_id: String,
        participant_name: String,
        #[serde(default)]
        device_settings: DeviceSettings,
    },
    AdmitParticipant {
        meeting_id: String,
        participant_socket_id: String,
    },
    AdmitAllParticipants {
        meeting_id: String,
    },
    DenyParticipant {
        meeting_id: String,
        participant_socket_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    ToggleMeetingLock {
        is_locked: bool,
    },
    UpdateWaitingRoomSettings {
        meeting_id: String,
        settings: WaitingRoomSettingsPatch,
    },
    UpdateMeetingPermissions {
        permissions: MeetingPermissionsPatch,
    },
    RenameParticipant {
        new_name: String,
    },
    HostRenameSelf {
        new_name: String,
    },
    RaiseHand,
    LowerHand,
    ToggleMute {
        is_muted: bool,
    },
    ToggleCamera {
        is_camera_on: bool,
    },
    SetCoHost {
        participant_socket_id: String,
        is_co_host: bool,
    },
    SpotlightParticipant {
        participant_socket_id: String,
        is_spotlighted: bool,
    },
    RequestRecordingPermission {
        display_name: String,
    },
    RespondRecordingRequest {
        request_id: String,
        approve: bool,
    },
    SuppressRecordingRequests {
        suppressed: bool,
    },
    LeaveMeeting,
}

/// Outbound socket events. Depending on the feature an event goes to the
/// whole room, to one participant's socket, or to the host socket only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// First frame on every connection; carries the server-assigned socket id.
    Connected {
        socket_id: String,
    },
    /// To a participant entering the active meeting (direct join or host).
    MeetingJoined {
        meeting_id: String,
        socket_id: String,
        participants: Vec<ParticipantSummary>,
        permissions: MeetingPermissions,
        is_locked: bool,
        recording_permission: RecordingPermission,
    },
    /// To a participant placed in the waiting room.
    WaitingRoomJoined {
        meeting_id: String,
        welcome_message: Option<String>,
        position: usize,
    },
    /// To the host: someone is waiting.
    WaitingRoomParticipantJoined {
        participant: WaitingSummary,
        waiting_count: usize,
    },
    /// To the admitted participant; carries the same snapshot as MeetingJoined.
    WaitingRoomAdmitted {
        meeting_id: String,
        socket_id: String,
        participants: Vec<ParticipantSummary>,
        permissions: MeetingPermissions,
        is_locked: bool,
        recording_permission: RecordingPermission,
    },
    /// To the denied participant only. Terminal.
    WaitingRoomDenied {
        reason: String,
    },
    /// To the host: a queued participant disconnected.
    WaitingRoomLeft {
        waiting_count: usize,
    },
    WaitingRoomSettingsUpdated {
        settings: WaitingRoomSettings,
        changed_by: String,
    },
    /// Terminal answer to a join attempt against a locked meeting.
    MeetingLocked {
        meeting_id: String,
    },
    MeetingLockChanged {
        is_locked: bool,
        changed_by: String,
    },
    MeetingPermissionsUpdated {
        permissions: MeetingPermissions,
        changed_by: String,
        participants: Vec<ParticipantSummary>,
    },
    ParticipantRenamed {
        socket_id: String,
        old_name: String,
        new_name: String,
        participants: Vec<ParticipantSummary>,
    },
    HandRaiseChanged {
        socket_id: String,
        is_hand_raised: bool,
    },
    ParticipantStateChanged {
        participant: ParticipantSummary,
    },
    CoHostChanged {
        socket_id: String,
        is_co_host: bool,
        participants: Vec<ParticipantSummary>,
    },
    SpotlightChanged {
        socket_id: String,
        is_spotlighted: bool,
    },
    ParticipantJoined {
        participant: ParticipantSummary,
        participants: Vec<ParticipantSummary>,
    },
    ParticipantLeft {
        socket_id: String,
        name: String,
        participants: Vec<ParticipantSummary>,
    },
    /// To the host socket only.
    RecordingPermissionRequested {
        request: RecordingRequest,
        pending_count: usize,
    },
    RecordingPermissionChanged {
        permission: RecordingPermission,
        changed_by: String,
    },
    /// Meeting-scoped chat flag; distinct from `permissions.chat_enabled`.
    ChatStateChanged {
        chat_disabled: bool,
        changed_by: String,
    },
    /// To the requester only.
    RecordingRequestDenied {
        request_id: String,
    },
    ActionError {
        code: String,
        message: String,
    },
}
