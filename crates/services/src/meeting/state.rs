use std::collections::HashMap;

use chrono::{DateTime, Utc};
use huddle_config::MeetingSettings;
use huddle_protocol::{
    DeviceSettings, MeetingPermissions, ParticipantRole, ParticipantSummary, RecordingPermission,
    RecordingRequest, WaitingRoomSettings, WaitingStatus, WaitingSummary,
};

/// A participant in the active meeting, keyed externally by socket id.
#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub is_muted: bool,
    pub is_camera_on: bool,
    pub role: ParticipantRole,
    pub is_spotlighted: bool,
    pub is_hand_raised: bool,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn summary(&self, socket_id: &str) -> ParticipantSummary {
        ParticipantSummary {
            socket_id: socket_id.to_string(),
            name: self.name.clone(),
            is_muted: self.is_muted,
            is_camera_on: self.is_camera_on,
            role: self.role,
            is_spotlighted: self.is_spotlighted,
            is_hand_raised: self.is_hand_raised,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaitingParticipant {
    pub name: String,
    pub device: DeviceSettings,
    pub requested_at: DateTime<Utc>,
    pub status: WaitingStatus,
}

impl WaitingParticipant {
    pub fn summary(&self, socket_id: &str) -> WaitingSummary {
        WaitingSummary {
            socket_id: socket_id.to_string(),
            name: self.name.clone(),
            requested_at: self.requested_at,
        }
    }
}

/// Holding area for participants awaiting admission. Composed into the
/// meeting record rather than layered over it; admission and denial both
/// remove the entry, so Waiting is the only status ever stored.
#[derive(Debug, Default)]
pub struct WaitingRoom {
    queue: HashMap<String, WaitingParticipant>,
}

impl WaitingRoom {
    pub fn enqueue(&mut self, socket_id: String, name: String, device: DeviceSettings) {
        self.queue.insert(
            socket_id,
            WaitingParticipant {
                name,
                device,
                requested_at: Utc::now(),
                status: WaitingStatus::Waiting,
            },
        );
    }

    pub fn take(&mut self, socket_id: &str) -> Option<WaitingParticipant> {
        self.queue.remove(socket_id)
    }

    pub fn contains(&self, socket_id: &str) -> bool {
        self.queue.contains_key(socket_id)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn get(&self, socket_id: &str) -> Option<&WaitingParticipant> {
        self.queue.get(socket_id)
    }

    pub fn summaries(&self) -> Vec<WaitingSummary> {
        let mut list: Vec<WaitingSummary> = self
            .queue
            .iter()
            .map(|(sid, w)| w.summary(sid))
            .collect();
        list.sort_by(|a, b| {
            a.requested_at
                .cmp(&b.requested_at)
                .then_with(|| a.socket_id.cmp(&b.socket_id))
        });
        list
    }
}

/// Recording consent state for one meeting. `requests_suppressed` is
/// per-host-session: it resets whenever the host socket is reassigned.
#[derive(Debug, Default)]
pub struct RecordingState {
    pub permission: RecordingPermission,
    pub pending: Vec<RecordingRequest>,
    pub requests_suppressed: bool,
}

impl RecordingState {
    pub fn take_request(&mut self, request_id: &str) -> Option<RecordingRequest> {
        let idx = self.pending.iter().position(|r| r.request_id == request_id)?;
        Some(self.pending.remove(idx))
    }
}

/// Authoritative record for one meeting. All mutation happens synchronously
/// under the registry's per-entry lock; a socket id lives in exactly one of
/// `participants` / `waiting_room` because every cross-collection move runs
/// inside a single `&mut Meeting` borrow.
#[derive(Debug)]
pub struct Meeting {
    pub id: String,
    pub host_socket_id: Option<String>,
    pub participants: HashMap<String, Participant>,
    pub waiting_room: WaitingRoom,
    pub waiting_settings: WaitingRoomSettings,
    pub permissions: MeetingPermissions,
    pub is_locked: bool,
    pub chat_disabled: bool,
    pub recording: RecordingState,
    pub created_at: DateTime<Utc>,
}

impl Meeting {
    pub fn new(id: String, defaults: &MeetingSettings) -> Self {
        Self {
            id,
            host_socket_id: None,
            participants: HashMap::new(),
            waiting_room: WaitingRoom::default(),
            waiting_settings: WaitingRoomSettings {
                enabled: defaults.waiting_room_enabled,
                mute_on_entry: defaults.mute_on_entry,
                welcome_message: defaults.welcome_message.clone(),
            },
            permissions: MeetingPermissions::default(),
            is_locked: false,
            chat_disabled: false,
            recording: RecordingState::default(),
            created_at: Utc::now(),
        }
    }

    /// The mutation gate: host socket, or a participant flagged co-host.
    pub fn can_mutate(&self, socket_id: &str) -> bool {
        if self.host_socket_id.as_deref() == Some(socket_id) {
            return true;
        }
        self.participants
            .get(socket_id)
            .is_some_and(|p| p.role == ParticipantRole::CoHost)
    }

    pub fn is_host(&self, socket_id: &str) -> bool {
        self.host_socket_id.as_deref() == Some(socket_id)
    }

    /// Participant list for broadcast payloads, in join order.
    pub fn participant_summaries(&self) -> Vec<ParticipantSummary> {
        let mut list: Vec<(&String, &Participant)> = self.participants.iter().collect();
        list.sort_by(|a, b| a.1.joined_at.cmp(&b.1.joined_at).then(a.0.cmp(b.0)));
        list.iter().map(|(sid, p)| p.summary(sid)).collect()
    }

    /// Case-insensitive name collision check against everyone except
    /// `exclude_socket_id`.
    pub fn name_in_use(&self, name: &str, exclude_socket_id: &str) -> bool {
        let lowered = name.to_lowercase();
        self.participants
            .iter()
            .any(|(sid, p)| sid != exclude_socket_id && p.name.to_lowercase() == lowered)
    }

    /// Moves a waiting entry into the active participants, applying the
    /// mute-on-entry setting. Returns None when the entry is gone (a second
    /// admit for the same socket is a no-op).
    pub fn admit_from_waiting(&mut self, socket_id: &str) -> Option<ParticipantSummary> {
        let waiting = self.waiting_room.take(socket_id)?;
        let participant = Participant {
            name: waiting.name,
            is_muted: self.waiting_settings.mute_on_entry || !waiting.device.mic_enabled,
            is_camera_on: waiting.device.camera_enabled,
            role: ParticipantRole::Attendee,
            is_spotlighted: false,
            is_hand_raised: false,
            joined_at: Utc::now(),
        };
        let summary = participant.summary(socket_id);
        self.participants.insert(socket_id.to_string(), participant);
        Some(summary)
    }
}

/// Process-wide chat kill switch, kept as a named record with an explicit
/// lifecycle instead of a bare module-level flag. Distinct from the
/// per-meeting `chat_disabled` flag and from `permissions.chat_enabled`.
#[derive(Debug, Clone, Default)]
pub struct GlobalChatState {
    pub disabled: bool,
    pub updated_by: Option<String>,
}
