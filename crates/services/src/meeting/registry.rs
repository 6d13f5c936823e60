use chrono::Utc;
use dashmap::DashMap;
use huddle_config::MeetingSettings;
use huddle_protocol::{
    DeviceSettings, MeetingPermissions, MeetingPermissionsPatch, ParticipantRole,
    ParticipantSummary, RecordingPermission, RecordingRequest, WaitingRoomSettings,
    WaitingRoomSettingsPatch, WaitingSummary,
};
use nanoid::nanoid;
use parking_lot::RwLock;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{MeetingError, MeetingResult};
use crate::meeting::state::{GlobalChatState, Meeting, Participant};

/// Snapshot handed to a participant entering the active meeting; also the
/// payload base for the room-wide joined broadcast.
#[derive(Debug, Clone)]
pub struct JoinedMeeting {
    pub meeting_id: String,
    pub participant: ParticipantSummary,
    pub participants: Vec<ParticipantSummary>,
    pub permissions: MeetingPermissions,
    pub is_locked: bool,
    pub recording_permission: RecordingPermission,
}

#[derive(Debug)]
pub enum JoinOutcome {
    /// Queued in the waiting room; the host (if connected) gets a summary.
    Queued {
        waiting: WaitingSummary,
        waiting_count: usize,
        position: usize,
        welcome_message: Option<String>,
        host_socket_id: Option<String>,
    },
    /// Waiting room disabled: straight into the meeting.
    Admitted(JoinedMeeting),
    /// Terminal: locked meetings queue nobody.
    Locked,
}

#[derive(Debug)]
pub struct DeniedWaiting {
    pub socket_id: String,
    pub reason: String,
    pub waiting_count: usize,
}

#[derive(Debug)]
pub struct WaitingSettingsUpdate {
    pub settings: WaitingRoomSettings,
    pub changed_by: String,
    /// Participants auto-admitted because the update disabled the waiting
    /// room while they were queued.
    pub admitted: Vec<JoinedMeeting>,
}

#[derive(Debug)]
pub struct LockChange {
    pub is_locked: bool,
    pub changed_by: String,
}

#[derive(Debug)]
pub struct PermissionsUpdate {
    pub permissions: MeetingPermissions,
    pub changed_by: String,
    pub participants: Vec<ParticipantSummary>,
}

#[derive(Debug)]
pub struct RenameOutcome {
    pub socket_id: String,
    pub old_name: String,
    pub new_name: String,
    pub participants: Vec<ParticipantSummary>,
}

#[derive(Debug)]
pub struct CoHostChange {
    pub socket_id: String,
    pub is_co_host: bool,
    pub participants: Vec<ParticipantSummary>,
}

#[derive(Debug)]
pub enum RecordingAsk {
    Queued {
        request: RecordingRequest,
        pending_count: usize,
        host_socket_id: Option<String>,
    },
    /// Dropped server-side: the host opted out of further requests.
    Suppressed,
}

#[derive(Debug)]
pub enum RecordingReply {
    Approved {
        permission: RecordingPermission,
        changed_by: String,
    },
    Denied {
        request_id: String,
        requester_socket_id: String,
    },
}

#[derive(Debug)]
pub struct RecordingChange {
    pub permission: RecordingPermission,
    pub changed_by: String,
}

#[derive(Debug)]
pub struct ChatChange {
    pub disabled: bool,
    pub changed_by: String,
}

#[derive(Debug, Clone)]
pub struct ChatState {
    pub global_chat_disabled: bool,
    pub meeting_chat_disabled: Option<bool>,
}

#[derive(Debug)]
pub struct MeetingOverview {
    pub participants: Vec<ParticipantSummary>,
    /// Queued waiting-room entries, oldest first. Lets a reconnecting host
    /// page rebuild its queue view without replaying socket events.
    pub waiting: Vec<WaitingSummary>,
    pub is_locked: bool,
}

#[derive(Debug)]
pub enum DisconnectOutcome {
    LeftMeeting {
        meeting_id: String,
        socket_id: String,
        name: String,
        was_host: bool,
        participants: Vec<ParticipantSummary>,
    },
    LeftWaiting {
        meeting_id: String,
        waiting_count: usize,
        host_socket_id: Option<String>,
    },
}

/// Authoritative store of all meeting state. Records are created lazily on
/// first reference and live until `remove` or process exit.
///
/// Mutation methods are synchronous and never await while holding an entry
/// guard, so writes to one meeting are serialized by the map itself. They
/// return plain outcome values; the socket layer turns those into events
/// after the guard is gone.
pub struct MeetingRegistry {
    meetings: DashMap<String, Meeting>,
    /// socket id -> meeting id, for both active and waiting sockets.
    socket_index: DashMap<String, String>,
    global_chat: RwLock<GlobalChatState>,
    defaults: MeetingSettings,
}

impl MeetingRegistry {
    pub fn new(defaults: MeetingSettings) -> Self {
        Self {
            meetings: DashMap::new(),
            socket_index: DashMap::new(),
            global_chat: RwLock::new(GlobalChatState::default()),
            defaults,
        }
    }

    /// Creates a meeting with a generated `ddd-ddd-ddd` code and returns the
    /// code. Used by the HTTP create route; socket events create lazily.
    pub fn create_meeting(&self) -> String {
        loop {
            let code = generate_meeting_code();
            let mut created = false;
            self.meetings.entry(code.clone()).or_insert_with(|| {
                created = true;
                Meeting::new(code.clone(), &self.defaults)
            });
            if created {
                info!(%code, "meeting created");
                return code;
            }
        }
    }

    pub fn remove(&self, meeting_id: &str) -> bool {
        if let Some((_, meeting)) = self.meetings.remove(meeting_id) {
            for sid in meeting.participants.keys() {
                self.socket_index.remove(sid);
            }
            for w in meeting.waiting_room.summaries() {
                self.socket_index.remove(&w.socket_id);
            }
            info!(%meeting_id, "meeting removed");
            true
        } else {
            false
        }
    }

    pub fn meeting_count(&self) -> usize {
        self.meetings.len()
    }

    pub fn meeting_id_of(&self, socket_id: &str) -> Option<String> {
        self.socket_index.get(socket_id).map(|v| v.clone())
    }

    pub fn host_socket_id(&self, meeting_id: &str) -> Option<String> {
        self.meetings
            .get(meeting_id)
            .and_then(|m| m.host_socket_id.clone())
    }

    /// Socket ids of everyone in the active meeting (not the waiting room).
    pub fn member_socket_ids(&self, meeting_id: &str) -> Vec<String> {
        self.meetings
            .get(meeting_id)
            .map(|m| m.participants.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn overview(&self, meeting_id: &str) -> MeetingResult<MeetingOverview> {
        let meeting = self.meetings.get(meeting_id).ok_or(MeetingError::NotFound)?;
        Ok(MeetingOverview {
            participants: meeting.participant_summaries(),
            waiting: meeting.waiting_room.summaries(),
            is_locked: meeting.is_locked,
        })
    }

    pub fn waiting_list(&self, meeting_id: &str) -> MeetingResult<Vec<WaitingSummary>> {
        let meeting = self.meetings.get(meeting_id).ok_or(MeetingError::NotFound)?;
        Ok(meeting.waiting_room.summaries())
    }

    /// The host page connecting (or reconnecting). Creates the meeting on
    /// first reference and reassigns the host socket; reassignment resets the
    /// per-host-session recording-request suppression.
    pub fn host_join(
        &self,
        meeting_id: &str,
        socket_id: &str,
        name: &str,
    ) -> MeetingResult<JoinedMeeting> {
        if let Some(existing) = self.meeting_id_of(socket_id) {
            if existing != meeting_id {
                return Err(MeetingError::Validation(
                    "this connection is already in a meeting".into(),
                ));
            }
        }

        let mut meeting = self
            .meetings
            .entry(meeting_id.to_string())
            .or_insert_with(|| Meeting::new(meeting_id.to_string(), &self.defaults));

        if let Some(old_host) = meeting.host_socket_id.clone() {
            if old_host != socket_id {
                if let Some(p) = meeting.participants.get_mut(&old_host) {
                    p.role = ParticipantRole::Attendee;
                }
                meeting.recording.requests_suppressed = false;
            }
        }

        meeting.host_socket_id = Some(socket_id.to_string());
        meeting.participants.insert(
            socket_id.to_string(),
            Participant {
                name: name.to_string(),
                is_muted: false,
                is_camera_on: true,
                role: ParticipantRole::Host,
                is_spotlighted: false,
                is_hand_raised: false,
                joined_at: Utc::now(),
            },
        );

        let snapshot = snapshot_for(&meeting, socket_id);
        drop(meeting);
        self.socket_index
            .insert(socket_id.to_string(), meeting_id.to_string());
        info!(%meeting_id, %socket_id, "host joined");
        Ok(snapshot)
    }

    pub fn request_join(
        &self,
        meeting_id: &str,
        socket_id: &str,
        participant_name: &str,
        device: DeviceSettings,
    ) -> MeetingResult<JoinOutcome> {
        let name = participant_name.trim();
        if name.is_empty() {
            return Err(MeetingError::Validation("name cannot be empty".into()));
        }
        if self.socket_index.contains_key(socket_id) {
            return Err(MeetingError::Validation(
                "this connection is already in a meeting".into(),
            ));
        }

        let mut meeting = self
            .meetings
            .entry(meeting_id.to_string())
            .or_insert_with(|| Meeting::new(meeting_id.to_string(), &self.defaults));

        if meeting.is_locked {
            debug!(%meeting_id, %socket_id, "join rejected: meeting locked");
            return Ok(JoinOutcome::Locked);
        }

        if meeting.waiting_settings.enabled {
            if meeting.waiting_room.len() >= self.defaults.max_waiting_participants {
                return Err(MeetingError::Validation("waiting room is full".into()));
            }
            meeting
                .waiting_room
                .enqueue(socket_id.to_string(), name.to_string(), device);
            let waiting = meeting
                .waiting_room
                .get(socket_id)
                .map(|w| w.summary(socket_id))
                .ok_or(MeetingError::ParticipantNotFound)?;
            let waiting_count = meeting.waiting_room.len();
            let outcome = JoinOutcome::Queued {
                waiting,
                waiting_count,
                position: waiting_count,
                welcome_message: meeting.waiting_settings.welcome_message.clone(),
                host_socket_id: meeting.host_socket_id.clone(),
            };
            drop(meeting);
            self.socket_index
                .insert(socket_id.to_string(), meeting_id.to_string());
            debug!(%meeting_id, %socket_id, "queued in waiting room");
            return Ok(outcome);
        }

        // No waiting room: direct join, mute-on-entry still applies.
        let participant = Participant {
            name: name.to_string(),
            is_muted: meeting.waiting_settings.mute_on_entry || !device.mic_enabled,
            is_camera_on: device.camera_enabled,
            role: ParticipantRole::Attendee,
            is_spotlighted: false,
            is_hand_raised: false,
            joined_at: Utc::now(),
        };
        meeting
            .participants
            .insert(socket_id.to_string(), participant);
        let snapshot = snapshot_for(&meeting, socket_id);
        drop(meeting);
        self.socket_index
            .insert(socket_id.to_string(), meeting_id.to_string());
        debug!(%meeting_id, %socket_id, "joined directly");
        Ok(JoinOutcome::Admitted(snapshot))
    }

    /// Moves one waiting participant into the meeting. `Ok(None)` when the
    /// waiting record is already gone, so repeated admits are no-ops.
    pub fn admit(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        participant_socket_id: &str,
    ) -> MeetingResult<Option<JoinedMeeting>> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "admit participants")?;

        match meeting.admit_from_waiting(participant_socket_id) {
            Some(_) => {
                let snapshot = snapshot_for(&meeting, participant_socket_id);
                info!(%meeting_id, socket_id = %participant_socket_id, "participant admitted");
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    pub fn admit_all(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
    ) -> MeetingResult<Vec<JoinedMeeting>> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "admit participants")?;

        let queued: Vec<String> = meeting
            .waiting_room
            .summaries()
            .into_iter()
            .map(|w| w.socket_id)
            .collect();
        let mut admitted = Vec::with_capacity(queued.len());
        for sid in queued {
            if meeting.admit_from_waiting(&sid).is_some() {
                admitted.push(snapshot_for(&meeting, &sid));
            }
        }
        info!(%meeting_id, count = admitted.len(), "admitted all waiting participants");
        Ok(admitted)
    }

    /// `Ok(None)` when the waiting record is already gone.
    pub fn deny(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        participant_socket_id: &str,
        reason: Option<String>,
    ) -> MeetingResult<Option<DeniedWaiting>> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "deny participants")?;

        if meeting.waiting_room.take(participant_socket_id).is_none() {
            return Ok(None);
        }
        let waiting_count = meeting.waiting_room.len();
        drop(meeting);
        self.socket_index.remove(participant_socket_id);
        info!(%meeting_id, socket_id = %participant_socket_id, "waiting participant denied");
        Ok(Some(DeniedWaiting {
            socket_id: participant_socket_id.to_string(),
            reason: reason
                .unwrap_or_else(|| "The host denied your request to join".to_string()),
            waiting_count,
        }))
    }

    /// Merges a settings patch. Disabling the waiting room while people are
    /// queued admits every one of them; that is part of the operation's
    /// contract, not a side effect of later joins.
    pub fn update_waiting_settings(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        patch: &WaitingRoomSettingsPatch,
    ) -> MeetingResult<WaitingSettingsUpdate> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "change waiting-room settings")?;

        meeting.waiting_settings.merge(patch);

        let mut admitted = Vec::new();
        if !meeting.waiting_settings.enabled && !meeting.waiting_room.is_empty() {
            let queued: Vec<String> = meeting
                .waiting_room
                .summaries()
                .into_iter()
                .map(|w| w.socket_id)
                .collect();
            for sid in queued {
                if meeting.admit_from_waiting(&sid).is_some() {
                    admitted.push(snapshot_for(&meeting, &sid));
                }
            }
            info!(%meeting_id, count = admitted.len(), "waiting room disabled, queue admitted");
        }

        Ok(WaitingSettingsUpdate {
            settings: meeting.waiting_settings.clone(),
            changed_by: actor_name(&meeting, actor_socket_id),
            admitted,
        })
    }

    pub fn toggle_lock(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        is_locked: bool,
    ) -> MeetingResult<LockChange> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "lock the meeting")?;

        meeting.is_locked = is_locked;
        info!(%meeting_id, is_locked, "meeting lock changed");
        Ok(LockChange {
            is_locked,
            changed_by: actor_name(&meeting, actor_socket_id),
        })
    }

    pub fn update_permissions(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        patch: &MeetingPermissionsPatch,
    ) -> MeetingResult<PermissionsUpdate> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "change meeting permissions")?;

        meeting.permissions.merge(patch);

        // Turning on mute-all mutes everyone except the host right away.
        if patch.mute_all_participants == Some(true) {
            let host = meeting.host_socket_id.clone();
            for (sid, p) in meeting.participants.iter_mut() {
                if host.as_deref() != Some(sid) {
                    p.is_muted = true;
                }
            }
        }

        Ok(PermissionsUpdate {
            permissions: meeting.permissions.clone(),
            changed_by: actor_name(&meeting, actor_socket_id),
            participants: meeting.participant_summaries(),
        })
    }

    /// Validated rename. `host_path` skips the allow-rename permission check
    /// (the host renaming themselves is always allowed); everything else is
    /// validated identically on both paths.
    pub fn rename(
        &self,
        meeting_id: &str,
        socket_id: &str,
        new_name: &str,
        host_path: bool,
    ) -> MeetingResult<RenameOutcome> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;

        if !meeting.participants.contains_key(socket_id) {
            return Err(MeetingError::ParticipantNotFound);
        }
        if !host_path && !meeting.permissions.allow_rename && !meeting.can_mutate(socket_id) {
            return Err(MeetingError::Forbidden(
                "renaming is disabled for participants".into(),
            ));
        }

        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(MeetingError::Validation("name cannot be empty".into()));
        }
        if trimmed.chars().count() > self.defaults.rename_max_len {
            return Err(MeetingError::Validation(format!(
                "name is longer than {} characters",
                self.defaults.rename_max_len
            )));
        }
        if meeting.name_in_use(trimmed, socket_id) {
            return Err(MeetingError::NameTaken(trimmed.to_string()));
        }

        let participant = meeting
            .participants
            .get_mut(socket_id)
            .ok_or(MeetingError::ParticipantNotFound)?;
        if participant.name == trimmed {
            return Err(MeetingError::NameUnchanged);
        }

        let old_name = std::mem::replace(&mut participant.name, trimmed.to_string());
        info!(%meeting_id, %socket_id, %old_name, new_name = %trimmed, "participant renamed");
        Ok(RenameOutcome {
            socket_id: socket_id.to_string(),
            old_name,
            new_name: trimmed.to_string(),
            participants: meeting.participant_summaries(),
        })
    }

    pub fn set_hand_raised(
        &self,
        meeting_id: &str,
        socket_id: &str,
        is_hand_raised: bool,
    ) -> MeetingResult<(String, bool)> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        if is_hand_raised
            && !meeting.permissions.allow_hand_raising
            && !meeting.can_mutate(socket_id)
        {
            return Err(MeetingError::Forbidden("hand raising is disabled".into()));
        }
        let participant = meeting
            .participants
            .get_mut(socket_id)
            .ok_or(MeetingError::ParticipantNotFound)?;
        participant.is_hand_raised = is_hand_raised;
        Ok((socket_id.to_string(), is_hand_raised))
    }

    pub fn set_muted(
        &self,
        meeting_id: &str,
        socket_id: &str,
        is_muted: bool,
    ) -> MeetingResult<ParticipantSummary> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        if !is_muted && !meeting.permissions.allow_unmute && !meeting.can_mutate(socket_id) {
            return Err(MeetingError::Forbidden(
                "unmuting is disabled for participants".into(),
            ));
        }
        let participant = meeting
            .participants
            .get_mut(socket_id)
            .ok_or(MeetingError::ParticipantNotFound)?;
        participant.is_muted = is_muted;
        Ok(participant.summary(socket_id))
    }

    pub fn set_camera(
        &self,
        meeting_id: &str,
        socket_id: &str,
        is_camera_on: bool,
    ) -> MeetingResult<ParticipantSummary> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        let participant = meeting
            .participants
            .get_mut(socket_id)
            .ok_or(MeetingError::ParticipantNotFound)?;
        participant.is_camera_on = is_camera_on;
        Ok(participant.summary(socket_id))
    }

    /// Host only; co-hosts cannot mint other co-hosts.
    pub fn set_co_host(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        participant_socket_id: &str,
        is_co_host: bool,
    ) -> MeetingResult<CoHostChange> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        if !meeting.is_host(actor_socket_id) {
            return Err(MeetingError::Forbidden(
                "only the host can manage co-hosts".into(),
            ));
        }
        let participant = meeting
            .participants
            .get_mut(participant_socket_id)
            .ok_or(MeetingError::ParticipantNotFound)?;
        if participant.role != ParticipantRole::Host {
            participant.role = if is_co_host {
                ParticipantRole::CoHost
            } else {
                ParticipantRole::Attendee
            };
        }
        Ok(CoHostChange {
            socket_id: participant_socket_id.to_string(),
            is_co_host,
            participants: meeting.participant_summaries(),
        })
    }

    pub fn set_spotlight(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        participant_socket_id: &str,
        is_spotlighted: bool,
    ) -> MeetingResult<(String, bool)> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "spotlight participants")?;
        let participant = meeting
            .participants
            .get_mut(participant_socket_id)
            .ok_or(MeetingError::ParticipantNotFound)?;
        participant.is_spotlighted = is_spotlighted;
        Ok((participant_socket_id.to_string(), is_spotlighted))
    }

    pub fn request_recording(
        &self,
        meeting_id: &str,
        socket_id: &str,
        display_name: &str,
    ) -> MeetingResult<RecordingAsk> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;

        if meeting.recording.requests_suppressed {
            debug!(%meeting_id, %socket_id, "recording request suppressed");
            return Ok(RecordingAsk::Suppressed);
        }

        let request = RecordingRequest {
            request_id: nanoid!(10),
            participant_id: nanoid!(10),
            socket_id: socket_id.to_string(),
            display_name: display_name.to_string(),
            requested_at: Utc::now(),
        };
        meeting.recording.pending.push(request.clone());
        Ok(RecordingAsk::Queued {
            request,
            pending_count: meeting.recording.pending.len(),
            host_socket_id: meeting.host_socket_id.clone(),
        })
    }

    /// `Ok(None)` when the request id is unknown (already answered).
    pub fn respond_recording(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        request_id: &str,
        approve: bool,
    ) -> MeetingResult<Option<RecordingReply>> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "answer recording requests")?;

        let Some(request) = meeting.recording.take_request(request_id) else {
            return Ok(None);
        };

        if approve {
            meeting.recording.permission = RecordingPermission::RecordToComputer;
            info!(%meeting_id, %request_id, "recording request approved");
            Ok(Some(RecordingReply::Approved {
                permission: meeting.recording.permission,
                changed_by: actor_name(&meeting, actor_socket_id),
            }))
        } else {
            info!(%meeting_id, %request_id, "recording request denied");
            Ok(Some(RecordingReply::Denied {
                request_id: request.request_id,
                requester_socket_id: request.socket_id,
            }))
        }
    }

    pub fn set_recording_permission(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        permission: RecordingPermission,
    ) -> MeetingResult<RecordingChange> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "change the recording permission")?;
        meeting.recording.permission = permission;
        Ok(RecordingChange {
            permission,
            changed_by: actor_name(&meeting, actor_socket_id),
        })
    }

    pub fn recording_permission(&self, meeting_id: &str) -> MeetingResult<RecordingPermission> {
        self.meetings
            .get(meeting_id)
            .map(|m| m.recording.permission)
            .ok_or(MeetingError::NotFound)
    }

    /// Host-session scoped: only the current host may flip it, and it resets
    /// when the host socket is reassigned.
    pub fn set_suppress_recording(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        suppressed: bool,
    ) -> MeetingResult<()> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        if !meeting.is_host(actor_socket_id) {
            return Err(MeetingError::Forbidden(
                "only the host can suppress recording requests".into(),
            ));
        }
        meeting.recording.requests_suppressed = suppressed;
        Ok(())
    }

    pub fn set_chat_disabled(
        &self,
        meeting_id: &str,
        actor_socket_id: &str,
        disabled: bool,
    ) -> MeetingResult<ChatChange> {
        let mut meeting = self
            .meetings
            .get_mut(meeting_id)
            .ok_or(MeetingError::NotFound)?;
        gate(&meeting, actor_socket_id, "disable chat")?;
        meeting.chat_disabled = disabled;
        Ok(ChatChange {
            disabled,
            changed_by: actor_name(&meeting, actor_socket_id),
        })
    }

    pub fn chat_state(&self, meeting_id: Option<&str>) -> ChatState {
        ChatState {
            global_chat_disabled: self.global_chat.read().disabled,
            meeting_chat_disabled: meeting_id
                .and_then(|id| self.meetings.get(id).map(|m| m.chat_disabled)),
        }
    }

    pub fn set_global_chat_disabled(&self, disabled: bool, updated_by: Option<String>) {
        let mut chat = self.global_chat.write();
        chat.disabled = disabled;
        chat.updated_by = updated_by;
    }

    pub fn reset_global_chat(&self) {
        *self.global_chat.write() = GlobalChatState::default();
    }

    /// Removes the socket from whichever side of the meeting it is on.
    /// Host departure clears the host assignment and, with it, the
    /// host-session recording suppression.
    pub fn disconnect(&self, socket_id: &str) -> Option<DisconnectOutcome> {
        let (_, meeting_id) = self.socket_index.remove(socket_id)?;
        let mut meeting = self.meetings.get_mut(&meeting_id)?;

        if let Some(participant) = meeting.participants.remove(socket_id) {
            let was_host = meeting.host_socket_id.as_deref() == Some(socket_id);
            if was_host {
                meeting.host_socket_id = None;
                meeting.recording.requests_suppressed = false;
            }
            let participants = meeting.participant_summaries();
            info!(%meeting_id, %socket_id, was_host, "participant left");
            return Some(DisconnectOutcome::LeftMeeting {
                meeting_id: meeting_id.clone(),
                socket_id: socket_id.to_string(),
                name: participant.name,
                was_host,
                participants,
            });
        }

        if meeting.waiting_room.take(socket_id).is_some() {
            let waiting_count = meeting.waiting_room.len();
            let host_socket_id = meeting.host_socket_id.clone();
            debug!(%meeting_id, %socket_id, "waiting participant left");
            return Some(DisconnectOutcome::LeftWaiting {
                meeting_id: meeting_id.clone(),
                waiting_count,
                host_socket_id,
            });
        }

        None
    }
}

fn gate(meeting: &Meeting, socket_id: &str, action: &str) -> MeetingResult<()> {
    if meeting.can_mutate(socket_id) {
        Ok(())
    } else {
        Err(MeetingError::Forbidden(format!(
            "only the host or a co-host can {action}"
        )))
    }
}

fn actor_name(meeting: &Meeting, socket_id: &str) -> String {
    meeting
        .participants
        .get(socket_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| socket_id.to_string())
}

fn snapshot_for(meeting: &Meeting, socket_id: &str) -> JoinedMeeting {
    let participant = meeting
        .participants
        .get(socket_id)
        .map(|p| p.summary(socket_id))
        .unwrap_or_else(|| ParticipantSummary {
            socket_id: socket_id.to_string(),
            name: String::new(),
            is_muted: false,
            is_camera_on: false,
            role: ParticipantRole::Attendee,
            is_spotlighted: false,
            is_hand_raised: false,
        });
    JoinedMeeting {
        meeting_id: meeting.id.clone(),
        participant,
        participants: meeting.participant_summaries(),
        permissions: meeting.permissions.clone(),
        is_locked: meeting.is_locked,
        recording_permission: meeting.recording.permission,
    }
}

fn generate_meeting_code() -> String {
    let mut rng = rand::rng();
    let parts: Vec<String> = (0..3)
        .map(|_| {
            let n: u32 = rng.random_range(100..999);
            n.to_string()
        })
        .collect();
    parts.join("-")
}
