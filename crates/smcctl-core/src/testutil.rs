//! Scripted port and recording clock for unit tests

use std::collections::VecDeque;
use std::vec::Vec;

use crate::consts::{CMD_PORT, DATA_PORT};
use crate::io::{Clock, PortIo};

/// One observed port access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    /// Status register sampled, with the value returned
    Status(u8),
    /// Data port read, with the value returned
    ReadData(u8),
    /// Write to a port
    Write { port: u16, value: u8 },
}

/// Port that replays a fixed list of status bytes
///
/// Once the script is exhausted every status read returns `fallback`.
pub(crate) struct ScriptedPort {
    statuses: VecDeque<u8>,
    fallback: u8,
    data: VecDeque<u8>,
    pub ops: Vec<Op>,
}

impl ScriptedPort {
    pub fn new(statuses: &[u8], fallback: u8) -> Self {
        Self {
            statuses: statuses.iter().copied().collect(),
            fallback,
            data: VecDeque::new(),
            ops: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: &[u8]) -> Self {
        self.data = data.iter().copied().collect();
        self
    }

    pub fn status_reads(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Status(_)))
            .count()
    }

    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Write { port, value } => Some((*port, *value)),
                _ => None,
            })
            .collect()
    }

    pub fn data_reads(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::ReadData(_)))
            .count()
    }
}

impl PortIo for ScriptedPort {
    fn read_byte(&mut self, port: u16) -> u8 {
        match port {
            CMD_PORT => {
                let s = self.statuses.pop_front().unwrap_or(self.fallback);
                self.ops.push(Op::Status(s));
                s
            }
            DATA_PORT => {
                let d = self.data.pop_front().unwrap_or(0xFF);
                self.ops.push(Op::ReadData(d));
                d
            }
            _ => panic!("unexpected read from port 0x{:X}", port),
        }
    }

    fn write_byte(&mut self, port: u16, value: u8) {
        self.ops.push(Op::Write { port, value });
    }
}

/// Clock that records every requested delay
#[derive(Default)]
pub(crate) struct RecordingClock {
    pub sleeps: Vec<u32>,
}

impl Clock for RecordingClock {
    fn delay_us(&mut self, us: u32) {
        self.sleeps.push(us);
    }
}
