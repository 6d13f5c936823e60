use huddle_protocol::{ClientEvent, ServerEvent};
use tracing::debug;

use crate::snapshot::{MeetingSnapshot, SelfFlag};

/// One locally echoed change that the server has not confirmed yet.
#[derive(Debug, Clone)]
struct PendingUpdate {
    flag: SelfFlag,
    value: bool,
    previous: bool,
}

/// Optimistic handling of our own roster flags (hand raise, mute, camera).
///
/// `stage` applies the local echo and returns the event to emit; the update
/// stays pending until the authoritative broadcast confirms it or an
/// `action-error` rolls it back. Optimistic and authoritative state never
/// diverge silently: every staged entry is either confirmed or reverted.
#[derive(Debug, Default)]
pub struct OptimisticRoster {
    pending: Vec<PendingUpdate>,
}

impl OptimisticRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn stage_hand_raise(
        &mut self,
        snapshot: &mut MeetingSnapshot,
        raised: bool,
    ) -> Option<ClientEvent> {
        self.stage(snapshot, SelfFlag::HandRaised, raised)?;
        Some(if raised {
            ClientEvent::RaiseHand
        } else {
            ClientEvent::LowerHand
        })
    }

    pub fn stage_mute(
        &mut self,
        snapshot: &mut MeetingSnapshot,
        is_muted: bool,
    ) -> Option<ClientEvent> {
        self.stage(snapshot, SelfFlag::Muted, is_muted)?;
        Some(ClientEvent::ToggleMute { is_muted })
    }

    pub fn stage_camera(
        &mut self,
        snapshot: &mut MeetingSnapshot,
        is_camera_on: bool,
    ) -> Option<ClientEvent> {
        self.stage(snapshot, SelfFlag::CameraOn, is_camera_on)?;
        Some(ClientEvent::ToggleCamera { is_camera_on })
    }

    fn stage(
        &mut self,
        snapshot: &mut MeetingSnapshot,
        flag: SelfFlag,
        value: bool,
    ) -> Option<()> {
        let previous = snapshot.set_self_flag(flag, value)?;
        // Re-staging the same flag keeps the original pre-echo value so a
        // rollback lands on real state, not an earlier echo.
        if let Some(existing) = self.pending.iter_mut().find(|p| p.flag == flag) {
            existing.value = value;
        } else {
            self.pending.push(PendingUpdate {
                flag,
                value,
                previous,
            });
        }
        Some(())
    }

    /// Reconciles an inbound event against pending echoes. Confirmed entries
    /// are dropped; an `action-error` reverts everything still pending.
    pub fn reconcile(&mut self, snapshot: &mut MeetingSnapshot, event: &ServerEvent) {
        match event {
            ServerEvent::HandRaiseChanged {
                socket_id,
                is_hand_raised,
            } if Some(socket_id.as_str()) == snapshot.socket_id.as_deref() => {
                self.confirm(SelfFlag::HandRaised, *is_hand_raised);
            }
            ServerEvent::ParticipantStateChanged { participant }
                if Some(participant.socket_id.as_str()) == snapshot.socket_id.as_deref() =>
            {
                self.confirm(SelfFlag::Muted, participant.is_muted);
                self.confirm(SelfFlag::CameraOn, participant.is_camera_on);
            }
            ServerEvent::ActionError { code, .. } => {
                self.rollback(snapshot, code);
            }
            _ => {}
        }
    }

    fn confirm(&mut self, flag: SelfFlag, value: bool) {
        self.pending
            .retain(|p| !(p.flag == flag && p.value == value));
    }

    /// Reverts every pending echo on the snapshot.
    pub fn rollback(&mut self, snapshot: &mut MeetingSnapshot, code: &str) {
        for update in self.pending.drain(..) {
            debug!(flag = ?update.flag, %code, "rolling back optimistic update");
            snapshot.set_self_flag(update.flag, update.previous);
        }
    }
}
