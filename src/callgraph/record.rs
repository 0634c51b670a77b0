//! Call dump records.
//!
//! A dump line is TAB separated: `seq, num, caller, callee, line, ...`.
//! The caller reads `Type:method(args)ret`, the callee
//! `(CALLTYPE)Type:method(args)ret`. Descriptors keep their parentheses.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Minimum number of TAB separated fields in a usable line
pub const MIN_FIELDS: usize = 5;

static CALLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\s:()]+):([^\s:()]+)(\(.*)$").expect("caller pattern is valid")
});

static CALLEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(([A-Za-z_]*)\)([^\s:()]+):([^\s:()]+)(\(.*)$").expect("callee pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub caller_type: String,
    pub caller_method: String,
    pub caller_descriptor: String,
    pub callee_type: String,
    pub callee_method: String,
    pub callee_descriptor: String,
    pub line_number: Option<u32>,
}

/// Why a dump line produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRejection {
    /// Empty or `#` comment; not counted as skipped
    Ignored,
    TooFewFields,
    BadCaller,
    BadCallee,
}

impl CallRecord {
    /// Parse one dump line
    pub fn parse_line(line: &str) -> Result<Self, LineRejection> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.starts_with('#') {
            return Err(LineRejection::Ignored);
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_FIELDS {
            return Err(LineRejection::TooFewFields);
        }

        let caller = CALLER
            .captures(fields[2].trim())
            .ok_or(LineRejection::BadCaller)?;
        let callee = CALLEE
            .captures(fields[3].trim())
            .ok_or(LineRejection::BadCallee)?;

        Ok(Self {
            caller_type: caller[1].to_string(),
            caller_method: caller[2].to_string(),
            caller_descriptor: caller[3].to_string(),
            callee_type: callee[2].to_string(),
            callee_method: callee[3].to_string(),
            callee_descriptor: callee[4].to_string(),
            line_number: fields[4].trim().parse().ok(),
        })
    }
}
