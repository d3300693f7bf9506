//! Observable machine state

use crate::error::{InterpreterError, InterpreterResult};
use primitive_types::U256;
use std::collections::BTreeMap;
use std::fmt;

/// Highest memory address the interpreter is willing to touch
pub const MEMORY_LIMIT: u64 = 1 << 24;

/// How execution ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Ran off the end of the code
    Finished,
    Stopped,
    Returned(Vec<u8>),
    Reverted(Vec<u8>),
    Invalid,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Finished => f.write_str("finished"),
            Termination::Stopped => f.write_str("stopped"),
            Termination::Returned(data) => write!(f, "returned 0x{}", hex::encode(data)),
            Termination::Reverted(data) => write!(f, "reverted 0x{}", hex::encode(data)),
            Termination::Invalid => f.write_str("invalid"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub topics: Vec<U256>,
    pub data: Vec<u8>,
}

/// Memory, storage, logs and call data of one execution.
///
/// Memory and storage are sparse: absent entries read as zero and zero
/// writes remove entries, so two states compare equal exactly when every
/// read would observe the same values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineState {
    memory: BTreeMap<u64, u8>,
    /// Size of the touched memory in bytes, a multiple of 32
    memory_size: u64,
    storage: BTreeMap<U256, U256>,
    logs: Vec<LogEntry>,
    calldata: Vec<u8>,
}

impl MachineState {
    pub fn new(calldata: Vec<u8>) -> Self {
        Self {
            calldata,
            ..Self::default()
        }
    }

    pub fn storage(&self) -> &BTreeMap<U256, U256> {
        &self.storage
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn calldata(&self) -> &[u8] {
        &self.calldata
    }

    pub fn memory_size(&self) -> u64 {
        self.memory_size
    }

    pub fn sload(&self, key: U256) -> U256 {
        self.storage.get(&key).copied().unwrap_or_default()
    }

    pub fn sstore(&mut self, key: U256, value: U256) {
        if value.is_zero() {
            self.storage.remove(&key);
        } else {
            self.storage.insert(key, value);
        }
    }

    /// Validates a memory range and extends the touched size
    fn touch(&mut self, offset: U256, size: U256) -> InterpreterResult<(u64, u64)> {
        if size.is_zero() {
            return Ok((0, 0));
        }
        let out_of_bounds = || InterpreterError::MemoryOutOfBounds {
            offset: offset.to_string(),
            size: size.to_string(),
        };
        if offset > U256::from(MEMORY_LIMIT) || size > U256::from(MEMORY_LIMIT) {
            return Err(out_of_bounds());
        }
        let (start, len) = (offset.low_u64(), size.low_u64());
        let end = start + len;
        if end > MEMORY_LIMIT {
            return Err(out_of_bounds());
        }
        let rounded = end.div_ceil(32) * 32;
        self.memory_size = self.memory_size.max(rounded);
        Ok((start, len))
    }

    pub fn read_memory(&mut self, offset: U256, size: U256) -> InterpreterResult<Vec<u8>> {
        let (start, len) = self.touch(offset, size)?;
        Ok((start..start + len)
            .map(|address| self.memory.get(&address).copied().unwrap_or(0))
            .collect())
    }

    pub fn write_memory(&mut self, offset: U256, bytes: &[u8]) -> InterpreterResult<()> {
        let (start, _) = self.touch(offset, U256::from(bytes.len()))?;
        for (address, byte) in (start..).zip(bytes) {
            if *byte == 0 {
                self.memory.remove(&address);
            } else {
                self.memory.insert(address, *byte);
            }
        }
        Ok(())
    }

    pub fn mload(&mut self, offset: U256) -> InterpreterResult<U256> {
        let bytes = self.read_memory(offset, U256::from(32))?;
        Ok(U256::from_big_endian(&bytes))
    }

    pub fn mstore(&mut self, offset: U256, value: U256) -> InterpreterResult<()> {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        self.write_memory(offset, &bytes)
    }

    /// Call data bytes from `offset`, zero padded past the end
    pub fn calldata_slice(&self, offset: U256, size: usize) -> Vec<u8> {
        let len = self.calldata.len();
        let start = if offset > U256::from(len) {
            len
        } else {
            offset.low_u64() as usize
        };
        (0..size)
            .map(|i| self.calldata.get(start + i).copied().unwrap_or(0))
            .collect()
    }

    pub fn log(&mut self, topics: Vec<U256>, data: Vec<u8>) {
        self.logs.push(LogEntry { topics, data });
    }
}
