//! Flow-table mutation and removal-notification bodies (`flow_mod`, `flow_removed`).

use crate::action::Action;
use crate::error::{CodecError, Result};
use crate::match_::{Match, MATCH_LEN};

/// `ofp_flow_mod_command` wire tags.
pub mod command {
    /// Create a new flow entry.
    pub const ADD: u16 = 0;
    /// Modify all matching flow entries.
    pub const MODIFY: u16 = 1;
    /// Modify only the strictly matching flow entry.
    pub const MODIFY_STRICT: u16 = 2;
    /// Delete all matching flow entries.
    pub const DELETE: u16 = 3;
    /// Delete only the strictly matching flow entry.
    pub const DELETE_STRICT: u16 = 4;
}

/// `ofp_flow_mod_flags` bits.
pub mod flags {
    /// Send a flow-removed notification when the entry expires or is deleted.
    pub const SEND_FLOW_REM: u16 = 1 << 0;
    /// Check for overlapping entries before adding.
    pub const CHECK_OVERLAP: u16 = 1 << 1;
    /// Install as an emergency entry (not subject to idle/hard timeout eviction).
    pub const EMERG: u16 = 1 << 2;
}

/// `ofp_flow_removed_reason` wire tags.
pub mod removed_reason {
    /// Flow idle time exceeded `idle_timeout`.
    pub const IDLE_TIMEOUT: u8 = 0;
    /// Flow exceeded `hard_timeout`.
    pub const HARD_TIMEOUT: u8 = 1;
    /// Explicit delete.
    pub const DELETE: u8 = 2;
}

/// Controller-to-switch command installing, modifying or removing a flow-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMod {
    /// Match predicate selecting the affected entry or entries.
    pub match_: Match,
    /// Opaque controller-assigned cookie, echoed back on removal.
    pub cookie: u64,
    /// One of the [`command`] constants.
    pub command: u16,
    /// Idle timeout before expiration, in seconds (`0` disables).
    pub idle_timeout: u16,
    /// Hard timeout before expiration, in seconds (`0` disables).
    pub hard_timeout: u16,
    /// Priority, used to order overlapping entries; higher wins.
    pub priority: u16,
    /// Buffered packet to apply this entry to immediately, or `0xFFFFFFFF` for none.
    pub buffer_id: u32,
    /// For delete commands, restricts the match to entries with this output port.
    pub out_port: u16,
    /// [`flags`] bitmap.
    pub flags: u16,
    /// Actions to apply; omitted on the wire for delete commands.
    pub actions: Vec<Action>,
}

impl FlowMod {
    /// Fixed-body length (excluding the header and the actions list): 64 octets.
    pub const FIXED_LEN: usize = MATCH_LEN + 8 + 2 + 2 + 2 + 2 + 4 + 2 + 2;

    /// Total body length, including actions.
    pub fn len(&self) -> u16 {
        let actions_len: u16 = if matches!(self.command, command::DELETE | command::DELETE_STRICT) {
            0
        } else {
            self.actions.iter().map(Action::len).sum()
        };
        Self::FIXED_LEN as u16 + actions_len
    }

    /// Marshal the message body (excluding the header).
    pub fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() as usize);
        out.extend_from_slice(&self.match_.marshal());
        out.extend_from_slice(&self.cookie.to_be_bytes());
        out.extend_from_slice(&self.command.to_be_bytes());
        out.extend_from_slice(&self.idle_timeout.to_be_bytes());
        out.extend_from_slice(&self.hard_timeout.to_be_bytes());
        out.extend_from_slice(&self.priority.to_be_bytes());
        out.extend_from_slice(&self.buffer_id.to_be_bytes());
        out.extend_from_slice(&self.out_port.to_be_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        if !matches!(self.command, command::DELETE | command::DELETE_STRICT) {
            out.extend_from_slice(&Action::marshal_list(&self.actions));
        }
        out
    }

    /// Parse the message body. `body_len` is the declared body length
    /// (`header.length - 8`), used to bound the trailing actions list.
    pub fn unmarshal(data: &[u8], body_len: usize) -> Result<Self> {
        if data.len() < Self::FIXED_LEN || body_len < Self::FIXED_LEN {
            return Err(CodecError::Truncated { what: "flow_mod", need: Self::FIXED_LEN, got: data.len() });
        }
        let match_ = Match::unmarshal(&data[0..MATCH_LEN])?;
        let mut at = MATCH_LEN;
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let cookie = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        at += 8;
        let command = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        let idle_timeout = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        let hard_timeout = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        let priority = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let buffer_id = u32::from_be_bytes(data[at..at + 4].try_into().expect("length checked"));
        at += 4;
        let out_port = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        let flags = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;

        let actions = if matches!(command, command::DELETE | command::DELETE_STRICT) {
            Vec::new()
        } else {
            Action::unmarshal_list(&data[at..body_len.min(data.len())])?
        };

        Ok(Self { match_, cookie, command, idle_timeout, hard_timeout, priority, buffer_id, out_port, flags, actions })
    }
}

/// Switch-to-controller notification that a flow entry expired or was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRemoved {
    /// Match predicate of the removed entry.
    pub match_: Match,
    /// Opaque cookie assigned when the entry was added.
    pub cookie: u64,
    /// Priority the entry was installed with.
    pub priority: u16,
    /// One of the [`removed_reason`] constants.
    pub reason: u8,
    /// Seconds the flow was alive.
    pub duration_sec: u32,
    /// Nanoseconds component of the alive duration.
    pub duration_nsec: u32,
    /// Idle timeout the entry was installed with.
    pub idle_timeout: u16,
    /// Packets matched over the entry's lifetime.
    pub packet_count: u64,
    /// Bytes matched over the entry's lifetime.
    pub byte_count: u64,
}

impl FlowRemoved {
    /// Fixed body length: 80 octets.
    pub const WIRE_LEN: usize = MATCH_LEN + 8 + 2 + 1 + 1 + 4 + 4 + 2 + 2 + 8 + 8;

    /// Marshal the message body.
    pub fn marshal(&self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[0..MATCH_LEN].copy_from_slice(&self.match_.marshal());
        let mut at = MATCH_LEN;
        out[at..at + 8].copy_from_slice(&self.cookie.to_be_bytes());
        at += 8;
        out[at..at + 2].copy_from_slice(&self.priority.to_be_bytes());
        at += 2;
        out[at] = self.reason;
        at += 2; // reason + pad
        out[at..at + 4].copy_from_slice(&self.duration_sec.to_be_bytes());
        at += 4;
        out[at..at + 4].copy_from_slice(&self.duration_nsec.to_be_bytes());
        at += 4;
        out[at..at + 2].copy_from_slice(&self.idle_timeout.to_be_bytes());
        at += 4; // idle_timeout + 2 pad
        out[at..at + 8].copy_from_slice(&self.packet_count.to_be_bytes());
        at += 8;
        out[at..at + 8].copy_from_slice(&self.byte_count.to_be_bytes());
        out
    }

    /// Parse the message body from `data`.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "flow_removed", need: Self::WIRE_LEN, got: data.len() });
        }
        let match_ = Match::unmarshal(&data[0..MATCH_LEN])?;
        let mut at = MATCH_LEN;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let cookie = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        at += 8;
        let priority = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        let reason = data[at];
        at += 2;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let duration_sec = u32::from_be_bytes(data[at..at + 4].try_into().expect("length checked"));
        at += 4;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let duration_nsec = u32::from_be_bytes(data[at..at + 4].try_into().expect("length checked"));
        at += 4;
        let idle_timeout = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 4;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let packet_count = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        at += 8;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let byte_count = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        Ok(Self { match_, cookie, priority, reason, duration_sec, duration_nsec, idle_timeout, packet_count, byte_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_3_flow_mod_add_round_trips() {
        let flow_mod = FlowMod {
            match_: Match::default()
                .with_dl_src([0x0a, 0, 0, 0, 0, 1])
                .with_dl_dst([0x0a, 0, 0, 0, 0, 2]),
            cookie: 0,
            command: command::ADD,
            idle_timeout: 3,
            hard_timeout: 0,
            priority: 1000,
            buffer_id: 0xFFFF_FFFF,
            out_port: 0,
            flags: 0,
            actions: vec![Action::Output { port: 2, max_len: 256 }],
        };
        let body = flow_mod.marshal();
        assert_eq!(body.len() as u16, flow_mod.len());
        let decoded = FlowMod::unmarshal(&body, body.len()).unwrap();
        assert_eq!(decoded, flow_mod);
        assert_eq!(decoded.actions.len(), 1);
        assert_eq!(decoded.actions[0], Action::Output { port: 2, max_len: 256 });
    }

    #[test]
    fn delete_command_omits_actions_on_wire() {
        let flow_mod = FlowMod {
            match_: Match::default(),
            cookie: 0,
            command: command::DELETE,
            idle_timeout: 0,
            hard_timeout: 0,
            priority: 0,
            buffer_id: 0xFFFF_FFFF,
            out_port: 0,
            flags: 0,
            actions: vec![Action::Output { port: 1, max_len: 0 }],
        };
        let body = flow_mod.marshal();
        assert_eq!(body.len(), FlowMod::FIXED_LEN);
    }

    #[test]
    fn flow_removed_round_trips() {
        let removed = FlowRemoved {
            match_: Match::default(),
            cookie: 7,
            priority: 10,
            reason: removed_reason::IDLE_TIMEOUT,
            duration_sec: 30,
            duration_nsec: 500,
            idle_timeout: 5,
            packet_count: 100,
            byte_count: 9000,
        };
        let wire = removed.marshal();
        assert_eq!(FlowRemoved::unmarshal(&wire).unwrap(), removed);
    }
}
