//! EVM builtin semantics over 256-bit words

use crate::error::InterpreterError;
use crate::interpreter::Signal;
use crate::state::{MachineState, Termination};
use primitive_types::{U256, U512};
use tiny_keccak::{Hasher, Keccak};

fn sign_bit() -> U256 {
    U256::one() << 255
}

fn is_negative(value: U256) -> bool {
    value.bit(255)
}

fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

fn abs(value: U256) -> U256 {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

fn bool_word(value: bool) -> U256 {
    if value {
        U256::one()
    } else {
        U256::zero()
    }
}

fn narrow(value: U512) -> U256 {
    U256::try_from(value).unwrap_or_default()
}

pub fn sdiv(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let quotient = abs(a) / abs(b);
    if is_negative(a) != is_negative(b) {
        negate(quotient)
    } else {
        quotient
    }
}

pub fn smod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let remainder = abs(a) % abs(b);
    if is_negative(a) {
        negate(remainder)
    } else {
        remainder
    }
}

pub fn slt(a: U256, b: U256) -> bool {
    (a ^ sign_bit()) < (b ^ sign_bit())
}

pub fn byte(index: U256, value: U256) -> U256 {
    if index >= U256::from(32) {
        return U256::zero();
    }
    let shift = 8 * (31 - index.low_u64() as usize);
    (value >> shift) & U256::from(0xff)
}

pub fn shl(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256) {
        U256::zero()
    } else {
        value << shift.low_u64() as usize
    }
}

pub fn shr(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256) {
        U256::zero()
    } else {
        value >> shift.low_u64() as usize
    }
}

pub fn sar(shift: U256, value: U256) -> U256 {
    let negative = is_negative(value);
    if shift >= U256::from(256) {
        return if negative { U256::MAX } else { U256::zero() };
    }
    let shift = shift.low_u64() as usize;
    if negative {
        !((!value) >> shift)
    } else {
        value >> shift
    }
}

pub fn signextend(size: U256, value: U256) -> U256 {
    if size >= U256::from(31) {
        return value;
    }
    let bit = size.low_u64() as usize * 8 + 7;
    let mask = (U256::one() << bit) - U256::one();
    if value.bit(bit) {
        value | !mask
    } else {
        value & mask
    }
}

pub fn addmod(a: U256, b: U256, modulus: U256) -> U256 {
    if modulus.is_zero() {
        return U256::zero();
    }
    narrow((U512::from(a) + U512::from(b)) % U512::from(modulus))
}

pub fn mulmod(a: U256, b: U256, modulus: U256) -> U256 {
    if modulus.is_zero() {
        return U256::zero();
    }
    narrow(a.full_mul(b) % U512::from(modulus))
}

pub fn keccak256(data: &[u8]) -> U256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    U256::from_big_endian(&output)
}

/// Evaluate a builtin on already evaluated arguments
pub(crate) fn call(name: &str, args: &[U256], state: &mut MachineState) -> Result<Vec<U256>, Signal> {
    let arg = |index: usize| args.get(index).copied().unwrap_or_default();
    let one = |value: U256| Ok(vec![value]);
    let none = || Ok(Vec::new());

    match name {
        "add" => one(arg(0).overflowing_add(arg(1)).0),
        "sub" => one(arg(0).overflowing_sub(arg(1)).0),
        "mul" => one(arg(0).overflowing_mul(arg(1)).0),
        "div" => one(if arg(1).is_zero() { U256::zero() } else { arg(0) / arg(1) }),
        "sdiv" => one(sdiv(arg(0), arg(1))),
        "mod" => one(if arg(1).is_zero() { U256::zero() } else { arg(0) % arg(1) }),
        "smod" => one(smod(arg(0), arg(1))),
        "exp" => one(arg(0).overflowing_pow(arg(1)).0),
        "not" => one(!arg(0)),
        "lt" => one(bool_word(arg(0) < arg(1))),
        "gt" => one(bool_word(arg(0) > arg(1))),
        "slt" => one(bool_word(slt(arg(0), arg(1)))),
        "sgt" => one(bool_word(slt(arg(1), arg(0)))),
        "eq" => one(bool_word(arg(0) == arg(1))),
        "iszero" => one(bool_word(arg(0).is_zero())),
        "and" => one(arg(0) & arg(1)),
        "or" => one(arg(0) | arg(1)),
        "xor" => one(arg(0) ^ arg(1)),
        "byte" => one(byte(arg(0), arg(1))),
        "shl" => one(shl(arg(0), arg(1))),
        "shr" => one(shr(arg(0), arg(1))),
        "sar" => one(sar(arg(0), arg(1))),
        "addmod" => one(addmod(arg(0), arg(1), arg(2))),
        "mulmod" => one(mulmod(arg(0), arg(1), arg(2))),
        "signextend" => one(signextend(arg(0), arg(1))),
        "keccak256" => {
            let data = state.read_memory(arg(0), arg(1))?;
            one(keccak256(&data))
        }
        "pop" => none(),
        "mload" => one(state.mload(arg(0))?),
        "mstore" => {
            state.mstore(arg(0), arg(1))?;
            none()
        }
        "mstore8" => {
            state.write_memory(arg(0), &[arg(1).low_u32() as u8])?;
            none()
        }
        "msize" => one(U256::from(state.memory_size())),
        "sload" => one(state.sload(arg(0))),
        "sstore" => {
            state.sstore(arg(0), arg(1));
            none()
        }
        "calldataload" => one(U256::from_big_endian(&state.calldata_slice(arg(0), 32))),
        "calldatasize" => one(U256::from(state.calldata().len())),
        "calldatacopy" => {
            if arg(2) > U256::from(crate::state::MEMORY_LIMIT) {
                return Err(InterpreterError::MemoryOutOfBounds {
                    offset: arg(0).to_string(),
                    size: arg(2).to_string(),
                }
                .into());
            }
            let data = state.calldata_slice(arg(1), arg(2).low_u64() as usize);
            state.write_memory(arg(0), &data)?;
            none()
        }
        "log0" | "log1" | "log2" | "log3" | "log4" => {
            let data = state.read_memory(arg(0), arg(1))?;
            state.log(args.iter().skip(2).copied().collect(), data);
            none()
        }
        "stop" => Err(Signal::Halt(Termination::Stopped)),
        "return" => Err(Signal::Halt(Termination::Returned(
            state.read_memory(arg(0), arg(1))?,
        ))),
        "revert" => Err(Signal::Halt(Termination::Reverted(
            state.read_memory(arg(0), arg(1))?,
        ))),
        "invalid" => Err(Signal::Halt(Termination::Invalid)),
        // A fixed, empty execution environment
        "address" | "origin" | "caller" | "callvalue" | "codesize" | "gasprice"
        | "returndatasize" | "coinbase" | "timestamp" | "number" | "prevrandao"
        | "gaslimit" | "chainid" | "basefee" | "selfbalance" | "gas" => one(U256::zero()),
        "balance" | "extcodesize" | "extcodehash" | "blockhash" => one(U256::zero()),
        other => Err(InterpreterError::UnsupportedBuiltin(other.to_string()).into()),
    }
}
