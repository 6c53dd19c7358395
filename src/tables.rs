//! The builtin tables the lowerer is parameterized by.
//!
//! Four maps drive dispatch: infix/prefix operators, builtin functions,
//! pseudovariables (bare names that are a single opcode), and pseudoarrays
//! (names that consume an index when accessed). Deployments extend them
//! through the `with_*` builders; the lowerer itself never changes.

use std::collections::HashMap;

/// A builtin function: opcode, argument count, and whether the opcode
/// leaves a result on the stack (statement position appends `POP` if so).
#[derive(Clone, Debug)]
pub struct Builtin {
    pub opcode: String,
    pub arity: usize,
    pub pushes_value: bool,
}

impl Builtin {
    pub fn new(opcode: impl Into<String>, arity: usize, pushes_value: bool) -> Self {
        Self {
            opcode: opcode.into(),
            arity,
            pushes_value,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tables {
    /// Source operator symbol -> opcode, e.g. `+` -> `ADD`.
    pub ops: HashMap<String, String>,
    /// Builtin function name -> opcode + arity.
    pub builtins: HashMap<String, Builtin>,
    /// Bare identifier -> zero-operand opcode, e.g. `tx.sender` -> `TXSENDER`.
    pub pseudovars: HashMap<String, String>,
    /// Indexable identifier -> index-consuming opcode, e.g. `tx.data` -> `TXDATA`.
    pub pseudoarrays: HashMap<String, String>,
}

impl Default for Tables {
    fn default() -> Self {
        let ops = [
            ("+", "ADD"),
            ("-", "SUB"),
            ("*", "MUL"),
            ("/", "DIV"),
            ("^", "EXP"),
            ("%", "MOD"),
            ("#/", "SDIV"),
            ("#%", "SMOD"),
            ("==", "EQ"),
            ("<=", "LE"),
            (">=", "GE"),
            ("<", "LT"),
            (">", "GT"),
            ("and", "AND"),
            ("or", "OR"),
            ("xor", "XOR"),
        ]
        .into_iter()
        .map(|(symbol, opcode)| (symbol.to_string(), opcode.to_string()))
        .collect();

        let builtins = [
            ("sha3", Builtin::new("SHA3", 3, true)),
            ("ecrecover", Builtin::new("ECRECOVER", 4, true)),
            ("byte", Builtin::new("BYTE", 2, true)),
            ("mkcall", Builtin::new("CALL", 7, true)),
            ("create", Builtin::new("CREATE", 5, true)),
            ("return", Builtin::new("RETURN", 2, false)),
            ("suicide", Builtin::new("SUICIDE", 1, false)),
        ]
        .into_iter()
        .map(|(name, builtin)| (name.to_string(), builtin))
        .collect();

        let pseudovars = [
            ("tx.sender", "TXSENDER"),
            ("tx.value", "TXVALUE"),
            ("tx.datan", "TXDATAN"),
            ("call.datasize", "DATAN"),
            ("call.value", "CALLVALUE"),
            ("call.gasprice", "GASPRICE"),
            ("call.origin", "ORIGIN"),
            ("basefee", "BASEFEE"),
            ("gas", "GAS"),
            ("balance", "BALANCE"),
            ("block.prevhash", "BLK_PREVHASH"),
            ("block.coinbase", "BLK_COINBASE"),
            ("block.timestamp", "BLK_TIMESTAMP"),
            ("block.number", "BLK_NUMBER"),
            ("block.difficulty", "BLK_DIFFICULTY"),
            ("block.gaslimit", "GASLIMIT"),
        ]
        .into_iter()
        .map(|(name, opcode)| (name.to_string(), opcode.to_string()))
        .collect();

        let pseudoarrays = [
            ("tx.data", "TXDATA"),
            ("call.data", "CALLDATA"),
            ("contract.storage", "SLOAD"),
            ("block.address_balance", "BALANCE"),
        ]
        .into_iter()
        .map(|(name, opcode)| (name.to_string(), opcode.to_string()))
        .collect();

        Self {
            ops,
            builtins,
            pseudovars,
            pseudoarrays,
        }
    }
}

impl Tables {
    /// An empty table set, for fully custom instruction surfaces.
    pub fn empty() -> Self {
        Self {
            ops: HashMap::new(),
            builtins: HashMap::new(),
            pseudovars: HashMap::new(),
            pseudoarrays: HashMap::new(),
        }
    }

    // ── Builder-pattern extension ─────────────────────────────────

    pub fn with_op(mut self, symbol: impl Into<String>, opcode: impl Into<String>) -> Self {
        self.ops.insert(symbol.into(), opcode.into());
        self
    }

    pub fn with_builtin(mut self, name: impl Into<String>, builtin: Builtin) -> Self {
        self.builtins.insert(name.into(), builtin);
        self
    }

    pub fn with_pseudovar(mut self, name: impl Into<String>, opcode: impl Into<String>) -> Self {
        self.pseudovars.insert(name.into(), opcode.into());
        self
    }

    pub fn with_pseudoarray(mut self, name: impl Into<String>, opcode: impl Into<String>) -> Self {
        self.pseudoarrays.insert(name.into(), opcode.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_optable() {
        let tables = Tables::default();
        assert_eq!(tables.ops.get("+").map(String::as_str), Some("ADD"));
        assert_eq!(tables.ops.get("#/").map(String::as_str), Some("SDIV"));
        assert_eq!(tables.ops.get("xor").map(String::as_str), Some("XOR"));
        // The logical connectives are rewritten, not table-dispatched.
        assert!(!tables.ops.contains_key("&&"));
        assert!(!tables.ops.contains_key("||"));
    }

    #[test]
    fn test_default_funtable() {
        let tables = Tables::default();
        let sha3 = &tables.builtins["sha3"];
        assert_eq!(sha3.opcode, "SHA3");
        assert_eq!(sha3.arity, 3);
        assert!(sha3.pushes_value);

        let ret = &tables.builtins["return"];
        assert_eq!(ret.opcode, "RETURN");
        assert_eq!(ret.arity, 2);
        assert!(!ret.pushes_value);

        assert_eq!(tables.builtins["mkcall"].opcode, "CALL");
        assert_eq!(tables.builtins["mkcall"].arity, 7);
    }

    #[test]
    fn test_default_pseudo_tables() {
        let tables = Tables::default();
        assert_eq!(
            tables.pseudovars.get("tx.sender").map(String::as_str),
            Some("TXSENDER")
        );
        assert_eq!(
            tables.pseudoarrays.get("contract.storage").map(String::as_str),
            Some("SLOAD")
        );
        assert_eq!(
            tables.pseudoarrays.get("tx.data").map(String::as_str),
            Some("TXDATA")
        );
    }

    #[test]
    fn test_extension_builders() {
        let tables = Tables::default()
            .with_builtin("sha256", Builtin::new("SHA256", 2, true))
            .with_builtin("ecsign", Builtin::new("ECSIGN", 2, true))
            .with_pseudovar("block.uncles", "BLK_UNCLES")
            .with_op("<<", "SHL");
        assert_eq!(tables.builtins["sha256"].opcode, "SHA256");
        assert_eq!(tables.builtins["ecsign"].arity, 2);
        assert_eq!(
            tables.pseudovars.get("block.uncles").map(String::as_str),
            Some("BLK_UNCLES")
        );
        assert_eq!(tables.ops.get("<<").map(String::as_str), Some("SHL"));
    }
}
