use arch::{
    mode::{AddrMode, Modes},
    op::Slot,
};
use thiserror::Error;

use crate::msg::Msgs;

#[derive(Error, Debug)]
pub enum Error {
    // ------------------------------------------------------------------------
    // Lexical: the token or line is skipped
    #[error("Line exceeds maximum length of {0} characters")]
    LineTooLong(usize),

    #[error("Invalid integer in .data: `{0}`")]
    InvalidInteger(String),

    #[error("Missing values after .data")]
    EmptyData,

    #[error("Invalid string in .string: `{0}`")]
    InvalidString(String),

    #[error("Missing string after .string")]
    MissingString,

    #[error("Missing symbol name after `{0}`")]
    MissingSymbol(String),

    #[error("Unexpected text after `{0}`: `{1}`")]
    TrailingText(String, String),

    #[error("Invalid label name: `{0}`")]
    InvalidLabel(String),

    #[error("Reserved word used as label: `{0}`")]
    ReservedLabel(String),

    // ------------------------------------------------------------------------
    // Semantic: the whole instruction line is discarded
    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("`{op}` expects {expected} operand(s), got {got}")]
    OperandCount {
        op: String,
        expected: usize,
        got: usize,
    },

    #[error("Illegal {slot} addressing mode for `{op}`: {mode} (allowed: {allowed})")]
    IllegalMode {
        op: String,
        slot: Slot,
        mode: AddrMode,
        allowed: Modes,
    },

    #[error("Invalid register: `{0}`")]
    InvalidRegister(String),

    #[error("Cannot parse `{0}` as immediate")]
    InvalidImmediate(String),

    #[error("Re-defined label: `{0}`")]
    RedefinedLabel(String),

    #[error("Previous definition of `{0}` is here")]
    PreviousDefinition(String),

    #[error("Undefined label: `{0}`")]
    UndefinedLabel(String),

    #[error("Entry label is not defined in this file: `{0}`")]
    UndefinedEntry(String),

    #[error("External label cannot be an entry: `{0}`")]
    ExternEntry(String),

    #[error("Label is both defined here and declared external: `{0}`")]
    ExternDefined(String),

    #[error("Relative reference to external label: `{0}`")]
    RelativeExtern(String),

    // ------------------------------------------------------------------------
    // Macro preprocessing: the file is not assembled
    #[error("`mcro` must be followed by exactly one name")]
    MacroHeader,

    #[error("Invalid macro name: `{0}`")]
    InvalidMacroName(String),

    #[error("Re-defined macro: `{0}`")]
    RedefinedMacro(String),

    #[error("Nested macro definition inside `{0}`")]
    NestedMacro(String),

    #[error("`mcroend` must be the only word on its line")]
    MacroEndArgs,

    #[error("`mcroend` without an open macro")]
    StrayMacroEnd,

    #[error("Macro `{0}` is not closed with `mcroend`")]
    UnclosedMacro(String),

    // ------------------------------------------------------------------------
    // Fatal: the file is abandoned immediately
    #[error("Memory exhausted: address {0} is outside the {1}-word address space")]
    MemoryOverflow(u32, u32),

    #[error("Pending word at address {0} has no object word")]
    Consistency(u32),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Config(String, #[source] serde_yaml::Error),
}

/// A fatal error together with the diagnostics reported before it.
#[derive(Error, Debug)]
#[error("{err}")]
pub struct Fatal {
    pub err: Error,
    pub msgs: Msgs,
}
