//! Student ID check for lab notebooks.
//!
//! Lab environments hand every student an ID between 01 and 30. The notebook
//! ships with the placeholder `XX`; this module tells the student whether
//! the value they set is usable and echoes the lab settings back for review.

use crate::console::Console;
use crate::core::db::{display_secret, MASKED_SECRET};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::ops::RangeInclusive;
use tracing::debug;

/// Placeholder value shipped in lab notebooks.
pub const UNSET_STUDENT_ID: &str = "XX";

pub const STUDENT_ID_RANGE: RangeInclusive<u32> = 1..=30;

const FIELD_WIDTH: usize = 16;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Result of checking a student ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentIdCheck {
    /// Still the `XX` placeholder.
    Unset,
    /// Not a number in the valid range.
    Invalid,
    Accepted(u32),
}

/// The lab settings echoed back once an ID is accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct LabProfile {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub source_database: String,
    pub source_schema: String,
}

impl LabProfile {
    /// The password as it should appear in console output.
    pub fn display_password(&self, reveal: bool) -> &str {
        display_secret(&self.password, reveal)
    }
}

impl std::fmt::Debug for LabProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabProfile")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &MASKED_SECRET)
            .field("source_database", &self.source_database)
            .field("source_schema", &self.source_schema)
            .finish()
    }
}

/// Classifies a student ID without printing anything.
///
/// Only ASCII digits are allowed; leading zeros are fine (`"07"` is 7).
pub fn check_student_id(student_id: &str) -> StudentIdCheck {
    if student_id == UNSET_STUDENT_ID {
        return StudentIdCheck::Unset;
    }
    if !DIGITS.is_match(student_id) {
        return StudentIdCheck::Invalid;
    }

    let significant = student_id.trim_start_matches('0');
    if significant.len() > 2 {
        return StudentIdCheck::Invalid;
    }
    let value = if significant.is_empty() {
        0
    } else {
        match significant.parse::<u32>() {
            Ok(v) => v,
            Err(_) => return StudentIdCheck::Invalid,
        }
    };

    if STUDENT_ID_RANGE.contains(&value) {
        StudentIdCheck::Accepted(value)
    } else {
        StudentIdCheck::Invalid
    }
}

/// Checks a student ID and prints guidance. On acceptance every lab setting
/// is echoed; the password is printed in clear only when `reveal_secrets`.
pub fn verify_student_id<W: Write>(
    student_id: &str,
    profile: &LabProfile,
    reveal_secrets: bool,
    console: &mut Console<W>,
) -> StudentIdCheck {
    let check = check_student_id(student_id);
    debug!(?check, "student id checked");

    match check {
        StudentIdCheck::Unset => {
            console.line(format_args!(
                "\nThe student ID is set to {}, please change to your assigned ID.",
                UNSET_STUDENT_ID
            ));
            console.line("Return to the top of the notebook and rerun this cell.\n");
        }
        StudentIdCheck::Invalid => {
            console.line(
                "\nInvalid student ID. Please enter a valid ID between 01 and 30.\n\
                 Return to the top of the notebook to set your assigned student ID.\n",
            );
        }
        StudentIdCheck::Accepted(_) => {
            let password = profile.display_password(reveal_secrets);
            console.line("");
            console.field("Student ID", FIELD_WIDTH, student_id);
            console.field("Host", FIELD_WIDTH, &profile.host);
            console.field("User", FIELD_WIDTH, &profile.user);
            console.field("Password", FIELD_WIDTH, password);
            console.field("Port", FIELD_WIDTH, profile.port);
            console.field("Source Database", FIELD_WIDTH, &profile.source_database);
            console.field("Source Schema", FIELD_WIDTH, &profile.source_schema);
        }
    }
    check
}
