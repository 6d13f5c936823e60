use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Host,
    CoHost,
    #[default]
    Attendee,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(default = "bool_true")]
    pub mic_enabled: bool,
    #[serde(default = "bool_true")]
    pub camera_enabled: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            mic_enabled: true,
            camera_enabled: true,
        }
    }
}

/// Broadcast-facing view of a participant in the active meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub socket_id: String,
    pub name: String,
    pub is_muted: bool,
    pub is_camera_on: bool,
    #[serde(default)]
    pub role: ParticipantRole,
    #[serde(default)]
    pub is_spotlighted: bool,
    #[serde(default)]
    pub is_hand_raised: bool,
}

/// Lifecycle of a waiting-room entry. Admitted/Denied are terminal: the
/// record leaves the waiting map the moment either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaitingStatus {
    #[default]
    Waiting,
    Admitted,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingSummary {
    pub socket_id: String,
    pub name: String,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitingRoomSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub mute_on_entry: bool,
    pub welcome_message: Option<String>,
}

impl Default for WaitingRoomSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mute_on_entry: false,
            welcome_message: None,
        }
    }
}

impl WaitingRoomSettings {
    pub fn merge(&mut self, patch: &WaitingRoomSettingsPatch) {
        if let Some(v) = patch.enabled {
            self.enabled = v;
        }
        if let Some(v) = patch.mute_on_entry {
            self.mute_on_entry = v;
        }
        if let Some(ref v) = patch.welcome_message {
            self.welcome_message = Some(v.clone());
        }
    }
}

/// Partial update for waiting-room settings; absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaitingRoomSettingsPatch {
    pub enabled: Option<bool>,
    pub mute_on_entry: Option<bool>,
    pub welcome_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingPermissions {
    #[serde(default = "bool_true")]
    pub allow_rename: bool,
    #[serde(default = "bool_true")]
    pub allow_unmute: bool,
    #[serde(default = "bool_true")]
    pub allow_hand_raising: bool,
    #[serde(default = "bool_true")]
    pub chat_enabled: bool,
    #[serde(default = "bool_true")]
    pub file_sharing: bool,
    #[serde(default = "bool_true")]
    pub emoji_reactions: bool,
    #[serde(default)]
    pub mute_all_participants: bool,
}

impl Default for MeetingPermissions {
    fn default() -> Self {
        Self {
            allow_rename: true,
            allow_unmute: true,
            allow_hand_raising: true,
            chat_enabled: true,
            file_sharing: true,
            emoji_reactions: true,
            mute_all_participants: false,
        }
    }
}

impl MeetingPermissions {
    /// Merge semantics of the permission bundle: absent patch fields keep
    /// the current value, present ones overwrite.
    pub fn merge(&mut self, patch: &MeetingPermissionsPatch) {
        if let Some(v) = patch.allow_rename {
            self.allow_rename = v;
        }
        if let Some(v) = patch.allow_unmute {
            self.allow_unmute = v;
        }
        if let Some(v) = patch.allow_hand_raising {
            self.allow_hand_raising = v;
        }
        if let Some(v) = patch.chat_enabled {
            self.chat_enabled = v;
        }
        if let Some(v) = patch.file_sharing {
            self.file_sharing = v;
        }
        if let Some(v) = patch.emoji_reactions {
            self.emoji_reactions = v;
        }
        if let Some(v) = patch.mute_all_participants {
            self.mute_all_participants = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingPermissionsPatch {
    pub allow_rename: Option<bool>,
    pub allow_unmute: Option<bool>,
    pub allow_hand_raising: Option<bool>,
    pub chat_enabled: Option<bool>,
    pub file_sharing: Option<bool>,
    pub emoji_reactions: Option<bool>,
    pub mute_all_participants: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RecordingPermission {
    #[default]
    #[serde(rename = "Don't Record")]
    DontRecord,
    #[serde(rename = "Record to Computer")]
    RecordToComputer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingRequest {
    pub request_id: String,
    pub participant_id: String,
    pub socket_id: String,
    pub display_name: String,
    pub requested_at: DateTime<Utc>,
}

fn bool_true() -> bool {
    true
}
