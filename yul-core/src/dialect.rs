//! Dialects: builtin function metadata and type information
//!
//! Consumers query capabilities (side effects, state reads, literal-only
//! arguments, cost) by name and never match on a concrete builtin.

use crate::ast::{Literal, LiteralKind, Name};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata for one builtin function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinFunction {
    pub name: Name,
    pub parameters: usize,
    pub returns: usize,
    /// Writes memory, storage, logs or halts execution
    pub side_effects: bool,
    /// Result depends on mutable machine state (memory, storage, gas, ...)
    pub reads_state: bool,
    /// Argument positions that must be literals
    pub literal_arguments: Vec<usize>,
    /// Relative code size of one call
    pub cost: u64,
}

impl BuiltinFunction {
    /// Can be reordered, duplicated or removed without changing behaviour
    pub fn is_movable(&self) -> bool {
        !self.side_effects && !self.reads_state
    }

    pub fn requires_literal_argument(&self, index: usize) -> bool {
        self.literal_arguments.contains(&index)
    }
}

/// Input language flavour accepted by the assembly stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Assembly,
    #[default]
    StrictAssembly,
    Yul,
}

impl Language {
    pub fn dialect(self) -> Dialect {
        match self {
            Language::Assembly | Language::StrictAssembly => Dialect::evm(),
            Language::Yul => Dialect::evm_typed(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Assembly => "assembly",
            Language::StrictAssembly => "strict-assembly",
            Language::Yul => "yul",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assembly" => Ok(Language::Assembly),
            "strict-assembly" => Ok(Language::StrictAssembly),
            "yul" => Ok(Language::Yul),
            other => Err(format!("unknown language: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dialect {
    builtins: FxHashMap<Name, BuiltinFunction>,
    types: Vec<Name>,
    default_type: Option<Name>,
    bool_type: Option<Name>,
}

/// Builtins whose encoding copies a data region and is therefore larger
const COPYING_COST: u64 = 3;

#[derive(Clone, Copy)]
enum Effect {
    Pure,
    Reads,
    Writes,
}

// (name, parameters, returns, effect, copies data)
const EVM_BUILTINS: &[(&str, usize, usize, Effect, bool)] = &[
    ("stop", 0, 0, Effect::Writes, false),
    ("add", 2, 1, Effect::Pure, false),
    ("sub", 2, 1, Effect::Pure, false),
    ("mul", 2, 1, Effect::Pure, false),
    ("div", 2, 1, Effect::Pure, false),
    ("sdiv", 2, 1, Effect::Pure, false),
    ("mod", 2, 1, Effect::Pure, false),
    ("smod", 2, 1, Effect::Pure, false),
    ("exp", 2, 1, Effect::Pure, false),
    ("not", 1, 1, Effect::Pure, false),
    ("lt", 2, 1, Effect::Pure, false),
    ("gt", 2, 1, Effect::Pure, false),
    ("slt", 2, 1, Effect::Pure, false),
    ("sgt", 2, 1, Effect::Pure, false),
    ("eq", 2, 1, Effect::Pure, false),
    ("iszero", 1, 1, Effect::Pure, false),
    ("and", 2, 1, Effect::Pure, false),
    ("or", 2, 1, Effect::Pure, false),
    ("xor", 2, 1, Effect::Pure, false),
    ("byte", 2, 1, Effect::Pure, false),
    ("shl", 2, 1, Effect::Pure, false),
    ("shr", 2, 1, Effect::Pure, false),
    ("sar", 2, 1, Effect::Pure, false),
    ("addmod", 3, 1, Effect::Pure, false),
    ("mulmod", 3, 1, Effect::Pure, false),
    ("signextend", 2, 1, Effect::Pure, false),
    ("keccak256", 2, 1, Effect::Reads, false),
    ("address", 0, 1, Effect::Pure, false),
    ("balance", 1, 1, Effect::Reads, false),
    ("selfbalance", 0, 1, Effect::Reads, false),
    ("origin", 0, 1, Effect::Pure, false),
    ("caller", 0, 1, Effect::Pure, false),
    ("callvalue", 0, 1, Effect::Pure, false),
    ("calldataload", 1, 1, Effect::Pure, false),
    ("calldatasize", 0, 1, Effect::Pure, false),
    ("calldatacopy", 3, 0, Effect::Writes, true),
    ("codesize", 0, 1, Effect::Pure, false),
    ("codecopy", 3, 0, Effect::Writes, true),
    ("gasprice", 0, 1, Effect::Pure, false),
    ("extcodesize", 1, 1, Effect::Reads, false),
    ("extcodecopy", 4, 0, Effect::Writes, true),
    ("returndatasize", 0, 1, Effect::Reads, false),
    ("returndatacopy", 3, 0, Effect::Writes, true),
    ("extcodehash", 1, 1, Effect::Reads, false),
    ("blockhash", 1, 1, Effect::Pure, false),
    ("coinbase", 0, 1, Effect::Pure, false),
    ("timestamp", 0, 1, Effect::Pure, false),
    ("number", 0, 1, Effect::Pure, false),
    ("prevrandao", 0, 1, Effect::Pure, false),
    ("gaslimit", 0, 1, Effect::Pure, false),
    ("chainid", 0, 1, Effect::Pure, false),
    ("basefee", 0, 1, Effect::Pure, false),
    ("pop", 1, 0, Effect::Pure, false),
    ("mload", 1, 1, Effect::Reads, false),
    ("mstore", 2, 0, Effect::Writes, false),
    ("mstore8", 2, 0, Effect::Writes, false),
    ("sload", 1, 1, Effect::Reads, false),
    ("sstore", 2, 0, Effect::Writes, false),
    ("msize", 0, 1, Effect::Reads, false),
    ("gas", 0, 1, Effect::Reads, false),
    ("log0", 2, 0, Effect::Writes, false),
    ("log1", 3, 0, Effect::Writes, false),
    ("log2", 4, 0, Effect::Writes, false),
    ("log3", 5, 0, Effect::Writes, false),
    ("log4", 6, 0, Effect::Writes, false),
    ("create", 3, 1, Effect::Writes, false),
    ("create2", 4, 1, Effect::Writes, false),
    ("call", 7, 1, Effect::Writes, false),
    ("callcode", 7, 1, Effect::Writes, false),
    ("delegatecall", 6, 1, Effect::Writes, false),
    ("staticcall", 6, 1, Effect::Writes, false),
    ("return", 2, 0, Effect::Writes, false),
    ("revert", 2, 0, Effect::Writes, false),
    ("selfdestruct", 1, 0, Effect::Writes, false),
    ("invalid", 0, 0, Effect::Writes, false),
];

/// Builtins that name a data object or sub-object with a string literal
pub const DATA_BUILTINS: &[&str] = &["datasize", "dataoffset"];

impl Dialect {
    /// The untyped EVM dialect
    pub fn evm() -> Self {
        let mut builtins = FxHashMap::default();
        for &(name, parameters, returns, effect, copies) in EVM_BUILTINS {
            builtins.insert(
                name.to_string(),
                BuiltinFunction {
                    name: name.to_string(),
                    parameters,
                    returns,
                    side_effects: matches!(effect, Effect::Writes),
                    reads_state: matches!(effect, Effect::Reads),
                    literal_arguments: Vec::new(),
                    cost: if copies { COPYING_COST } else { 1 },
                },
            );
        }
        for name in DATA_BUILTINS {
            builtins.insert(
                name.to_string(),
                BuiltinFunction {
                    name: name.to_string(),
                    parameters: 1,
                    returns: 1,
                    side_effects: false,
                    reads_state: false,
                    literal_arguments: vec![0],
                    cost: 1,
                },
            );
        }
        builtins.insert(
            "datacopy".to_string(),
            BuiltinFunction {
                name: "datacopy".to_string(),
                parameters: 3,
                returns: 0,
                side_effects: true,
                reads_state: false,
                literal_arguments: Vec::new(),
                cost: COPYING_COST,
            },
        );
        Self {
            builtins,
            types: Vec::new(),
            default_type: None,
            bool_type: None,
        }
    }

    /// EVM dialect with `u256` and `bool` types
    pub fn evm_typed() -> Self {
        Self {
            types: vec!["u256".to_string(), "bool".to_string()],
            default_type: Some("u256".to_string()),
            bool_type: Some("bool".to_string()),
            ..Self::evm()
        }
    }

    pub fn builtin(&self, name: &str) -> Option<&BuiltinFunction> {
        self.builtins.get(name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    pub fn builtin_names(&self) -> impl Iterator<Item = &str> {
        self.builtins.keys().map(String::as_str)
    }

    pub fn is_typed(&self) -> bool {
        self.default_type.is_some()
    }

    pub fn types(&self) -> &[Name] {
        &self.types
    }

    pub fn default_type(&self) -> Option<&str> {
        self.default_type.as_deref()
    }

    pub fn bool_type(&self) -> Option<&str> {
        self.bool_type.as_deref()
    }

    /// Accepts a declared type annotation. Untyped dialects accept none.
    pub fn is_valid_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }

    /// The literal a fresh variable of the given type starts with
    pub fn zero_literal(&self, type_name: Option<&str>) -> Literal {
        match (type_name, self.bool_type()) {
            (Some(requested), Some(bool_type)) if requested == bool_type => {
                Literal::boolean(false).with_type(Some(bool_type.to_string()))
            }
            (type_name, _) => Literal {
                kind: LiteralKind::Number,
                value: "0".to_string(),
                type_name: type_name.map(str::to_string),
            },
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::evm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        let dialect = Dialect::evm();
        let add = dialect.builtin("add").unwrap();
        assert!(add.is_movable());
        assert_eq!((add.parameters, add.returns), (2, 1));

        let mload = dialect.builtin("mload").unwrap();
        assert!(!mload.side_effects);
        assert!(!mload.is_movable());

        let sstore = dialect.builtin("sstore").unwrap();
        assert!(sstore.side_effects);
    }

    #[test]
    fn test_copying_builtins_cost_more() {
        let dialect = Dialect::evm();
        assert_eq!(dialect.builtin("add").unwrap().cost, 1);
        assert_eq!(dialect.builtin("calldatacopy").unwrap().cost, COPYING_COST);
        assert_eq!(dialect.builtin("datacopy").unwrap().cost, COPYING_COST);
    }

    #[test]
    fn test_literal_arguments() {
        let dialect = Dialect::evm();
        assert!(dialect.builtin("datasize").unwrap().requires_literal_argument(0));
        assert!(!dialect.builtin("mstore").unwrap().requires_literal_argument(0));
    }

    #[test]
    fn test_language_dialects() {
        assert!(!Language::StrictAssembly.dialect().is_typed());
        let typed = Language::Yul.dialect();
        assert_eq!(typed.default_type(), Some("u256"));
        assert!(typed.is_valid_type("bool"));
        assert!(!typed.is_valid_type("u8"));
        assert_eq!("yul".parse::<Language>().unwrap(), Language::Yul);
        assert!("wasm".parse::<Language>().is_err());
    }

    #[test]
    fn test_zero_literal() {
        let typed = Dialect::evm_typed();
        assert_eq!(typed.zero_literal(Some("bool")).value, "false");
        assert_eq!(typed.zero_literal(Some("u256")).value, "0");
        assert_eq!(Dialect::evm().zero_literal(None), Literal::number("0"));
    }
}
