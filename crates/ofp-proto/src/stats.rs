//! The statistics request/reply family: one discriminator, seven bodies.

use crate::action::Action;
use crate::error::{CodecError, Result};
use crate::match_::{Match, MATCH_LEN};

/// `ofp_stats_types` wire tags.
pub mod stats_type {
    /// Switch description strings.
    pub const DESC: u16 = 0;
    /// Individual flow statistics.
    pub const FLOW: u16 = 1;
    /// Aggregate flow statistics.
    pub const AGGREGATE: u16 = 2;
    /// Flow table statistics.
    pub const TABLE: u16 = 3;
    /// Physical port statistics.
    pub const PORT: u16 = 4;
    /// Queue statistics for a port.
    pub const QUEUE: u16 = 5;
    /// Vendor extension.
    pub const VENDOR: u16 = 0xFFFF;
}

fn fixed_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn write_fixed_str(out: &mut [u8], s: &str) {
    let src = s.as_bytes();
    let n = src.len().min(out.len());
    out[..n].copy_from_slice(&src[..n]);
}

/// Switch description strings, carried only in a `stats_reply`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DescStats {
    /// Manufacturer description.
    pub mfr_desc: String,
    /// Hardware description.
    pub hw_desc: String,
    /// Software description.
    pub sw_desc: String,
    /// Serial number.
    pub serial_num: String,
    /// Human-readable description of the datapath.
    pub dp_desc: String,
}

impl DescStats {
    const MFR_LEN: usize = 256;
    const HW_LEN: usize = 256;
    const SW_LEN: usize = 256;
    const SERIAL_LEN: usize = 32;
    const DP_LEN: usize = 256;

    /// Total wire length of the fixed-width description block.
    pub const WIRE_LEN: usize = Self::MFR_LEN + Self::HW_LEN + Self::SW_LEN + Self::SERIAL_LEN + Self::DP_LEN;

    fn marshal(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::WIRE_LEN];
        let mut at = 0;
        write_fixed_str(&mut out[at..at + Self::MFR_LEN], &self.mfr_desc);
        at += Self::MFR_LEN;
        write_fixed_str(&mut out[at..at + Self::HW_LEN], &self.hw_desc);
        at += Self::HW_LEN;
        write_fixed_str(&mut out[at..at + Self::SW_LEN], &self.sw_desc);
        at += Self::SW_LEN;
        write_fixed_str(&mut out[at..at + Self::SERIAL_LEN], &self.serial_num);
        at += Self::SERIAL_LEN;
        write_fixed_str(&mut out[at..at + Self::DP_LEN], &self.dp_desc);
        out
    }

    fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "desc_stats", need: Self::WIRE_LEN, got: data.len() });
        }
        let mut at = 0;
        let mfr_desc = fixed_str(&data[at..at + Self::MFR_LEN]);
        at += Self::MFR_LEN;
        let hw_desc = fixed_str(&data[at..at + Self::HW_LEN]);
        at += Self::HW_LEN;
        let sw_desc = fixed_str(&data[at..at + Self::SW_LEN]);
        at += Self::SW_LEN;
        let serial_num = fixed_str(&data[at..at + Self::SERIAL_LEN]);
        at += Self::SERIAL_LEN;
        let dp_desc = fixed_str(&data[at..at + Self::DP_LEN]);
        Ok(Self { mfr_desc, hw_desc, sw_desc, serial_num, dp_desc })
    }
}

/// `stats_request` body selecting flows to summarise individually or in aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStatsRequest {
    /// Match predicate; only matching flow entries are reported.
    pub match_: Match,
    /// Table to query, or `0xFF` for all tables.
    pub table_id: u8,
    /// Restrict to flows with this output port, or [`crate::port::special::NONE`] for all.
    pub out_port: u16,
}

impl FlowStatsRequest {
    /// Wire size: 44 octets.
    pub const WIRE_LEN: usize = MATCH_LEN + 4;

    fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&self.match_.marshal());
        out.push(self.table_id);
        out.push(0);
        out.extend_from_slice(&self.out_port.to_be_bytes());
        out
    }

    fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "flow_stats_request", need: Self::WIRE_LEN, got: data.len() });
        }
        Ok(Self {
            match_: Match::unmarshal(&data[0..MATCH_LEN])?,
            table_id: data[MATCH_LEN],
            out_port: u16::from_be_bytes([data[MATCH_LEN + 2], data[MATCH_LEN + 3]]),
        })
    }
}

/// One flow entry reported by a `flow` `stats_reply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStats {
    /// Table the flow entry lives in.
    pub table_id: u8,
    /// Match predicate of the flow entry.
    pub match_: Match,
    /// Seconds the flow has been installed.
    pub duration_sec: u32,
    /// Nanoseconds component of the installed duration.
    pub duration_nsec: u32,
    /// Priority of the flow entry.
    pub priority: u16,
    /// Idle timeout before expiration, in seconds.
    pub idle_timeout: u16,
    /// Hard timeout before expiration, in seconds.
    pub hard_timeout: u16,
    /// Opaque controller-assigned cookie.
    pub cookie: u64,
    /// Packets matched by this entry.
    pub packet_count: u64,
    /// Bytes matched by this entry.
    pub byte_count: u64,
    /// Actions applied by this entry.
    pub actions: Vec<Action>,
}

impl FlowStats {
    const FIXED_LEN: usize = 2 + 1 + 1 + MATCH_LEN + 4 + 4 + 2 + 2 + 2 + 6 + 8 + 8 + 8;

    fn len(&self) -> u16 {
        let actions_len: u16 = self.actions.iter().map(Action::len).sum();
        Self::FIXED_LEN as u16 + actions_len
    }

    fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() as usize);
        out.extend_from_slice(&self.len().to_be_bytes());
        out.push(self.table_id);
        out.push(0);
        out.extend_from_slice(&self.match_.marshal());
        out.extend_from_slice(&self.duration_sec.to_be_bytes());
        out.extend_from_slice(&self.duration_nsec.to_be_bytes());
        out.extend_from_slice(&self.priority.to_be_bytes());
        out.extend_from_slice(&self.idle_timeout.to_be_bytes());
        out.extend_from_slice(&self.hard_timeout.to_be_bytes());
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&self.cookie.to_be_bytes());
        out.extend_from_slice(&self.packet_count.to_be_bytes());
        out.extend_from_slice(&self.byte_count.to_be_bytes());
        out.extend_from_slice(&Action::marshal_list(&self.actions));
        out
    }

    fn unmarshal(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < Self::FIXED_LEN {
            return Err(CodecError::Truncated { what: "flow_stats", need: Self::FIXED_LEN, got: data.len() });
        }
        let entry_len = u16::from_be_bytes([data[0], data[1]]) as usize;
        if entry_len < Self::FIXED_LEN || data.len() < entry_len {
            return Err(CodecError::Truncated { what: "flow_stats", need: entry_len, got: data.len() });
        }
        let table_id = data[2];
        let match_ = Match::unmarshal(&data[4..4 + MATCH_LEN])?;
        let mut at = 4 + MATCH_LEN;
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let duration_sec = u32::from_be_bytes(data[at..at + 4].try_into().expect("length checked"));
        at += 4;
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let duration_nsec = u32::from_be_bytes(data[at..at + 4].try_into().expect("length checked"));
        at += 4;
        let priority = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        let idle_timeout = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2;
        let hard_timeout = u16::from_be_bytes([data[at], data[at + 1]]);
        at += 2 + 6; // skip pad
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let cookie = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        at += 8;
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let packet_count = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        at += 8;
        #[allow(clippy::expect_used, reason = "slice width fixed by the FIXED_LEN bounds check above")]
        let byte_count = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        at += 8;
        let actions = Action::unmarshal_list(&data[at..entry_len])?;
        Ok((
            Self {
                table_id,
                match_,
                duration_sec,
                duration_nsec,
                priority,
                idle_timeout,
                hard_timeout,
                cookie,
                packet_count,
                byte_count,
                actions,
            },
            entry_len,
        ))
    }

    fn unmarshal_list(mut data: &[u8]) -> Result<Vec<Self>> {
        let mut out = Vec::new();
        while !data.is_empty() {
            let (entry, consumed) = Self::unmarshal(data)?;
            out.push(entry);
            data = &data[consumed..];
        }
        Ok(out)
    }
}

/// `aggregate` `stats_reply` body: a summary rather than per-flow detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateStats {
    /// Total packets matched by the summarised flows.
    pub packet_count: u64,
    /// Total bytes matched by the summarised flows.
    pub byte_count: u64,
    /// Number of flows summarised.
    pub flow_count: u32,
}

impl AggregateStats {
    /// Wire size: 24 octets.
    pub const WIRE_LEN: usize = 24;

    fn marshal(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&self.packet_count.to_be_bytes());
        out.extend_from_slice(&self.byte_count.to_be_bytes());
        out.extend_from_slice(&self.flow_count.to_be_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out
    }

    fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "aggregate_stats", need: Self::WIRE_LEN, got: data.len() });
        }
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let packet_count = u64::from_be_bytes(data[0..8].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let byte_count = u64::from_be_bytes(data[8..16].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let flow_count = u32::from_be_bytes(data[16..20].try_into().expect("length checked"));
        Ok(Self { packet_count, byte_count, flow_count })
    }
}

/// One entry in a `table` `stats_reply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    /// Table identifier.
    pub table_id: u8,
    /// Human-readable table name.
    pub name: String,
    /// Fields this table can match on.
    pub wildcards: u32,
    /// Maximum number of entries the table supports.
    pub max_entries: u32,
    /// Entries currently active.
    pub active_count: u32,
    /// Number of packets looked up in this table.
    pub lookup_count: u64,
    /// Number of packets that hit this table.
    pub matched_count: u64,
}

impl TableStats {
    const NAME_LEN: usize = 32;
    /// Wire size: 64 octets.
    pub const WIRE_LEN: usize = 1 + 3 + Self::NAME_LEN + 4 + 4 + 4 + 8 + 8;

    fn marshal(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::WIRE_LEN];
        out[0] = self.table_id;
        write_fixed_str(&mut out[4..4 + Self::NAME_LEN], &self.name);
        let mut at = 4 + Self::NAME_LEN;
        out[at..at + 4].copy_from_slice(&self.wildcards.to_be_bytes());
        at += 4;
        out[at..at + 4].copy_from_slice(&self.max_entries.to_be_bytes());
        at += 4;
        out[at..at + 4].copy_from_slice(&self.active_count.to_be_bytes());
        at += 4;
        out[at..at + 8].copy_from_slice(&self.lookup_count.to_be_bytes());
        at += 8;
        out[at..at + 8].copy_from_slice(&self.matched_count.to_be_bytes());
        out
    }

    fn unmarshal(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "table_stats", need: Self::WIRE_LEN, got: data.len() });
        }
        let table_id = data[0];
        let name = fixed_str(&data[4..4 + Self::NAME_LEN]);
        let mut at = 4 + Self::NAME_LEN;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let wildcards = u32::from_be_bytes(data[at..at + 4].try_into().expect("length checked"));
        at += 4;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let max_entries = u32::from_be_bytes(data[at..at + 4].try_into().expect("length checked"));
        at += 4;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let active_count = u32::from_be_bytes(data[at..at + 4].try_into().expect("length checked"));
        at += 4;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let lookup_count = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        at += 8;
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let matched_count = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
        Ok((Self { table_id, name, wildcards, max_entries, active_count, lookup_count, matched_count }, Self::WIRE_LEN))
    }

    fn unmarshal_list(mut data: &[u8]) -> Result<Vec<Self>> {
        let mut out = Vec::new();
        while !data.is_empty() {
            let (entry, consumed) = Self::unmarshal(data)?;
            out.push(entry);
            data = &data[consumed..];
        }
        Ok(out)
    }
}

/// `stats_request` body restricting port statistics to one port, or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortStatsRequest {
    /// Port to query, or [`crate::port::special::NONE`] for all ports.
    pub port_no: u16,
}

impl PortStatsRequest {
    /// Wire size: 8 octets.
    pub const WIRE_LEN: usize = 8;

    fn marshal(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::WIRE_LEN];
        out[0..2].copy_from_slice(&self.port_no.to_be_bytes());
        out
    }

    fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "port_stats_request", need: Self::WIRE_LEN, got: data.len() });
        }
        Ok(Self { port_no: u16::from_be_bytes([data[0], data[1]]) })
    }
}

/// One entry in a `port` `stats_reply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortStats {
    /// Port this entry describes.
    pub port_no: u16,
    /// Packets received.
    pub rx_packets: u64,
    /// Packets transmitted.
    pub tx_packets: u64,
    /// Bytes received.
    pub rx_bytes: u64,
    /// Bytes transmitted.
    pub tx_bytes: u64,
    /// Inbound packets dropped.
    pub rx_dropped: u64,
    /// Outbound packets dropped.
    pub tx_dropped: u64,
    /// Receive errors.
    pub rx_errors: u64,
    /// Transmit errors.
    pub tx_errors: u64,
    /// Receive frame alignment errors.
    pub rx_frame_err: u64,
    /// Receive overrun errors.
    pub rx_over_err: u64,
    /// Receive CRC errors.
    pub rx_crc_err: u64,
    /// Collisions detected.
    pub collisions: u64,
}

impl PortStats {
    /// Wire size: 104 octets.
    pub const WIRE_LEN: usize = 8 + 8 * 12;

    fn marshal(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::WIRE_LEN];
        out[0..2].copy_from_slice(&self.port_no.to_be_bytes());
        let fields = [
            self.rx_packets,
            self.tx_packets,
            self.rx_bytes,
            self.tx_bytes,
            self.rx_dropped,
            self.tx_dropped,
            self.rx_errors,
            self.tx_errors,
            self.rx_frame_err,
            self.rx_over_err,
            self.rx_crc_err,
            self.collisions,
        ];
        let mut at = 8;
        for field in fields {
            out[at..at + 8].copy_from_slice(&field.to_be_bytes());
            at += 8;
        }
        out
    }

    fn unmarshal(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "port_stats", need: Self::WIRE_LEN, got: data.len() });
        }
        let port_no = u16::from_be_bytes([data[0], data[1]]);
        let mut at = 8;
        let mut next = || {
            #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
            let v = u64::from_be_bytes(data[at..at + 8].try_into().expect("length checked"));
            at += 8;
            v
        };
        Ok((
            Self {
                port_no,
                rx_packets: next(),
                tx_packets: next(),
                rx_bytes: next(),
                tx_bytes: next(),
                rx_dropped: next(),
                tx_dropped: next(),
                rx_errors: next(),
                tx_errors: next(),
                rx_frame_err: next(),
                rx_over_err: next(),
                rx_crc_err: next(),
                collisions: next(),
            },
            Self::WIRE_LEN,
        ))
    }

    fn unmarshal_list(mut data: &[u8]) -> Result<Vec<Self>> {
        let mut out = Vec::new();
        while !data.is_empty() {
            let (entry, consumed) = Self::unmarshal(data)?;
            out.push(entry);
            data = &data[consumed..];
        }
        Ok(out)
    }
}

/// `stats_request` body selecting queues on a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatsRequest {
    /// Port owning the queue, or [`crate::port::special::ALL`] for all ports.
    pub port_no: u16,
    /// Queue to query, or `0xFFFFFFFF` for all queues on the port.
    pub queue_id: u32,
}

impl QueueStatsRequest {
    /// Wire size: 8 octets.
    pub const WIRE_LEN: usize = 8;

    fn marshal(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::WIRE_LEN];
        out[0..2].copy_from_slice(&self.port_no.to_be_bytes());
        out[4..8].copy_from_slice(&self.queue_id.to_be_bytes());
        out
    }

    fn unmarshal(data: &[u8]) -> Result<Self> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "queue_stats_request", need: Self::WIRE_LEN, got: data.len() });
        }
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let queue_id = u32::from_be_bytes(data[4..8].try_into().expect("length checked"));
        Ok(Self { port_no: u16::from_be_bytes([data[0], data[1]]), queue_id })
    }
}

/// One entry in a `queue` `stats_reply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Port owning this queue.
    pub port_no: u16,
    /// Queue identifier.
    pub queue_id: u32,
    /// Bytes transmitted via this queue.
    pub tx_bytes: u64,
    /// Packets transmitted via this queue.
    pub tx_packets: u64,
    /// Packets dropped due to overflow.
    pub tx_errors: u64,
}

impl QueueStats {
    /// Wire size: 32 octets.
    pub const WIRE_LEN: usize = 2 + 2 + 4 + 8 + 8 + 8;

    fn marshal(&self) -> Vec<u8> {
        let mut out = vec![0u8; Self::WIRE_LEN];
        out[0..2].copy_from_slice(&self.port_no.to_be_bytes());
        out[4..8].copy_from_slice(&self.queue_id.to_be_bytes());
        out[8..16].copy_from_slice(&self.tx_bytes.to_be_bytes());
        out[16..24].copy_from_slice(&self.tx_packets.to_be_bytes());
        out[24..32].copy_from_slice(&self.tx_errors.to_be_bytes());
        out
    }

    fn unmarshal(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated { what: "queue_stats", need: Self::WIRE_LEN, got: data.len() });
        }
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let queue_id = u32::from_be_bytes(data[4..8].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let tx_bytes = u64::from_be_bytes(data[8..16].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let tx_packets = u64::from_be_bytes(data[16..24].try_into().expect("length checked"));
        #[allow(clippy::expect_used, reason = "slice width fixed by the WIRE_LEN bounds check above")]
        let tx_errors = u64::from_be_bytes(data[24..32].try_into().expect("length checked"));
        Ok((
            Self { port_no: u16::from_be_bytes([data[0], data[1]]), queue_id, tx_bytes, tx_packets, tx_errors },
            Self::WIRE_LEN,
        ))
    }

    fn unmarshal_list(mut data: &[u8]) -> Result<Vec<Self>> {
        let mut out = Vec::new();
        while !data.is_empty() {
            let (entry, consumed) = Self::unmarshal(data)?;
            out.push(entry);
            data = &data[consumed..];
        }
        Ok(out)
    }
}

/// `OFPST_*` request flags; v1.0 defines none, the field is reserved.
pub const STATS_FLAGS_NONE: u16 = 0;

/// Type-dispatched body of a `stats_request`/`stats_reply` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsBody {
    /// Request for switch description strings; carries no request body.
    DescRequest,
    /// Switch description reply.
    Desc(DescStats),
    /// Request for individual flow statistics.
    FlowRequest(FlowStatsRequest),
    /// Individual flow statistics.
    Flow(Vec<FlowStats>),
    /// Request for an aggregate summary.
    AggregateRequest(FlowStatsRequest),
    /// Aggregate summary.
    Aggregate(AggregateStats),
    /// Request for flow-table statistics; carries no request body.
    TableRequest,
    /// Flow-table statistics.
    Table(Vec<TableStats>),
    /// Request for port statistics.
    PortRequest(PortStatsRequest),
    /// Port statistics.
    Port(Vec<PortStats>),
    /// Request for queue statistics.
    QueueRequest(QueueStatsRequest),
    /// Queue statistics.
    Queue(Vec<QueueStats>),
    /// Vendor-specific statistics body, either direction.
    Vendor {
        /// Vendor identifier.
        vendor: u32,
        /// Vendor-defined body.
        body: Vec<u8>,
    },
}

impl StatsBody {
    /// The `ofp_stats_types` discriminator for this body.
    pub fn stats_type(&self) -> u16 {
        match self {
            Self::DescRequest | Self::Desc(_) => stats_type::DESC,
            Self::FlowRequest(_) | Self::Flow(_) => stats_type::FLOW,
            Self::AggregateRequest(_) | Self::Aggregate(_) => stats_type::AGGREGATE,
            Self::TableRequest | Self::Table(_) => stats_type::TABLE,
            Self::PortRequest(_) | Self::Port(_) => stats_type::PORT,
            Self::QueueRequest(_) | Self::Queue(_) => stats_type::QUEUE,
            Self::Vendor { .. } => stats_type::VENDOR,
        }
    }

    /// Marshal the type-dispatched body (excluding the common type/flags header).
    pub fn marshal(&self) -> Vec<u8> {
        match self {
            Self::DescRequest | Self::TableRequest => Vec::new(),
            Self::Desc(d) => d.marshal(),
            Self::FlowRequest(r) | Self::AggregateRequest(r) => r.marshal(),
            Self::Flow(entries) => entries.iter().flat_map(FlowStats::marshal).collect(),
            Self::Aggregate(a) => a.marshal(),
            Self::Table(entries) => entries.iter().flat_map(TableStats::marshal).collect(),
            Self::PortRequest(r) => r.marshal(),
            Self::Port(entries) => entries.iter().flat_map(PortStats::marshal).collect(),
            Self::QueueRequest(r) => r.marshal(),
            Self::Queue(entries) => entries.iter().flat_map(QueueStats::marshal).collect(),
            Self::Vendor { vendor, body } => {
                let mut out = Vec::with_capacity(4 + body.len());
                out.extend_from_slice(&vendor.to_be_bytes());
                out.extend_from_slice(body);
                out
            },
        }
    }

    /// Decode a type-dispatched body. `is_request` distinguishes the two
    /// array-shaped-but-overloaded discriminators (e.g. `flow`, whose request
    /// and reply bodies differ completely).
    pub fn unmarshal(stats_type: u16, is_request: bool, data: &[u8]) -> Result<Self> {
        Ok(match (stats_type, is_request) {
            (stats_type::DESC, true) => Self::DescRequest,
            (stats_type::DESC, false) => Self::Desc(DescStats::unmarshal(data)?),
            (stats_type::FLOW, true) => Self::FlowRequest(FlowStatsRequest::unmarshal(data)?),
            (stats_type::FLOW, false) => Self::Flow(FlowStats::unmarshal_list(data)?),
            (stats_type::AGGREGATE, true) => Self::AggregateRequest(FlowStatsRequest::unmarshal(data)?),
            (stats_type::AGGREGATE, false) => Self::Aggregate(AggregateStats::unmarshal(data)?),
            (stats_type::TABLE, true) => Self::TableRequest,
            (stats_type::TABLE, false) => Self::Table(TableStats::unmarshal_list(data)?),
            (stats_type::PORT, true) => Self::PortRequest(PortStatsRequest::unmarshal(data)?),
            (stats_type::PORT, false) => Self::Port(PortStats::unmarshal_list(data)?),
            (stats_type::QUEUE, true) => Self::QueueRequest(QueueStatsRequest::unmarshal(data)?),
            (stats_type::QUEUE, false) => Self::Queue(QueueStats::unmarshal_list(data)?),
            (stats_type::VENDOR, _) => {
                if data.len() < 4 {
                    return Err(CodecError::Truncated { what: "vendor_stats", need: 4, got: data.len() });
                }
                #[allow(clippy::expect_used, reason = "slice width fixed by the length check above")]
                let vendor = u32::from_be_bytes(data[0..4].try_into().expect("length checked"));
                Self::Vendor { vendor, body: data[4..].to_vec() }
            },
            (other, _) => return Err(CodecError::UnknownStatsType(other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desc_stats_round_trips() {
        let desc = DescStats {
            mfr_desc: "Example Inc.".into(),
            hw_desc: "OF Reference".into(),
            sw_desc: "ofp-controller".into(),
            serial_num: "1".into(),
            dp_desc: "switch-1".into(),
        };
        let body = StatsBody::Desc(desc.clone());
        let wire = body.marshal();
        assert_eq!(wire.len(), DescStats::WIRE_LEN);
        let decoded = StatsBody::unmarshal(stats_type::DESC, false, &wire).unwrap();
        assert_eq!(decoded, StatsBody::Desc(desc));
    }

    #[test]
    fn port_stats_list_round_trips() {
        let entries = vec![
            PortStats { port_no: 1, rx_packets: 10, ..Default::default() },
            PortStats { port_no: 2, tx_bytes: 2048, ..Default::default() },
        ];
        let body = StatsBody::Port(entries.clone());
        let wire = body.marshal();
        assert_eq!(wire.len(), PortStats::WIRE_LEN * 2);
        let decoded = StatsBody::unmarshal(stats_type::PORT, false, &wire).unwrap();
        assert_eq!(decoded, StatsBody::Port(entries));
    }

    #[test]
    fn flow_stats_round_trips_with_actions() {
        let entry = FlowStats {
            table_id: 0,
            match_: Match::default(),
            duration_sec: 5,
            duration_nsec: 0,
            priority: 100,
            idle_timeout: 30,
            hard_timeout: 0,
            cookie: 42,
            packet_count: 7,
            byte_count: 980,
            actions: vec![Action::Output { port: 1, max_len: 0 }],
        };
        let body = StatsBody::Flow(vec![entry.clone()]);
        let wire = body.marshal();
        let decoded = StatsBody::unmarshal(stats_type::FLOW, false, &wire).unwrap();
        assert_eq!(decoded, StatsBody::Flow(vec![entry]));
    }
}
