//! Smart-meter log records and their fixed-width binary layout.

use serde::Serialize;

/// Bit width of every exported record field.
pub const FIELD_BITS: &[(&str, u32)] = &[
    ("record_type", 8),
    ("lossy_aggregation", 8),
    ("record_id", 64),
    ("meter_id", 64),
    ("account_number", 16),
    ("start_time", 32),
    ("end_time", 32),
    ("reading", 64),
    ("previous_state", 16),
    ("new_state", 16),
    ("time", 32),
];

/// Account number stamped on readings of meters with no billing account.
pub const UNASSIGNED_ACCOUNT: i16 = -1;

/// Looks up the bit width of a field in [`FIELD_BITS`].
pub fn field_bits(name: &str) -> Option<u32> {
    FIELD_BITS
        .iter()
        .find_map(|&(field, bits)| (field == name).then_some(bits))
}

fn encoded_len(fields: &[&str]) -> usize {
    let bits: u32 = fields.iter().filter_map(|f| field_bits(f)).sum();
    (bits / 8) as usize
}

/// What a history reading measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordType {
    PowerGeneration = 0,
    PowerStored = 1,
    PowerThrough = 2,
}

/// Connection state of a smart meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeterState {
    DisconnectedFromPowerNet = 0,
    RunningOnPowerNet = 1,
    Shutdown = 2,
    Initialized = 3,
    AggregatingData = 4,
    NotAggregatingData = 5,
}

/// Timestamped meter reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryLog {
    pub record_type: RecordType,
    pub lossy_aggregation: bool,
    pub meter_id: u64,
    pub account_number: i16,
    pub start_time: u32,
    pub end_time: u32,
    pub reading: f64,
    pub record_id: u64,
}

impl HistoryLog {
    const FIELDS: [&'static str; 8] = [
        "record_type",
        "lossy_aggregation",
        "meter_id",
        "account_number",
        "start_time",
        "end_time",
        "reading",
        "record_id",
    ];

    /// Encoded size in bytes (36).
    pub fn size() -> usize {
        encoded_len(&Self::FIELDS)
    }

    /// Big-endian fixed-width encoding in declaration order.
    pub fn encode(&self) -> [u8; 36] {
        let mut buf = [0u8; 36];
        let mut w = FieldWriter::new(&mut buf);
        w.put(&[self.record_type as u8]);
        w.put(&[u8::from(self.lossy_aggregation)]);
        w.put(&self.meter_id.to_be_bytes());
        w.put(&self.account_number.to_be_bytes());
        w.put(&self.start_time.to_be_bytes());
        w.put(&self.end_time.to_be_bytes());
        w.put(&self.reading.to_bits().to_be_bytes());
        w.put(&self.record_id.to_be_bytes());
        buf
    }
}

/// Meter state transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventLog {
    pub previous_state: MeterState,
    pub new_state: MeterState,
    pub meter_id: u64,
    pub time: u32,
    pub record_id: u64,
}

impl EventLog {
    const FIELDS: [&'static str; 5] = ["previous_state", "new_state", "meter_id", "time", "record_id"];

    /// Encoded size in bytes (24).
    pub fn size() -> usize {
        encoded_len(&Self::FIELDS)
    }

    /// Big-endian fixed-width encoding in declaration order.
    pub fn encode(&self) -> [u8; 24] {
        let mut buf = [0u8; 24];
        let mut w = FieldWriter::new(&mut buf);
        w.put(&(self.previous_state as u16).to_be_bytes());
        w.put(&(self.new_state as u16).to_be_bytes());
        w.put(&self.meter_id.to_be_bytes());
        w.put(&self.time.to_be_bytes());
        w.put(&self.record_id.to_be_bytes());
        buf
    }
}

struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}
