// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the people holding the camera.
//
// Every technical error is mapped to plain English with a clear suggestion and
// the recovery the calling UI should offer.

use crate::error::FlatpageError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expected during normal use; the UI just falls back.
    Notice,
    /// User must do something (move a corner, pick another file).
    ActionRequired,
    /// Cannot be fixed by the user — a bug or an unwritable disk.
    Permanent,
}

/// What the caller should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Show the default crop region and let the user drag corners.
    FallbackCrop,
    /// Ask the user to adjust the corner placement.
    AdjustCorners,
    /// Ask for a different input file.
    ChooseAnotherFile,
    /// Fix the settings and re-run.
    FixSettings,
    /// Try the same operation again.
    Retry,
    /// Nothing sensible to offer.
    None,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub recovery: Recovery,
    pub severity: Severity,
}

/// Convert a `FlatpageError` into a `HumanError`.
pub fn humanize_error(err: &FlatpageError) -> HumanError {
    match err {
        FlatpageError::NotFound => HumanError {
            message: "We couldn't find the edges of the page.".into(),
            suggestion: "Drag the corners onto the page yourself, or retake the photo on a darker background.".into(),
            recovery: Recovery::FallbackCrop,
            severity: Severity::Notice,
        },

        FlatpageError::DegenerateTransform { .. } => HumanError {
            message: "Those corners don't form a page.".into(),
            suggestion: "Move the corners apart so each one sits on a different corner of the document.".into(),
            recovery: Recovery::AdjustCorners,
            severity: Severity::ActionRequired,
        },

        FlatpageError::InvalidQuadrilateral(_) => HumanError {
            message: "The corners cross over each other.".into(),
            suggestion: "Put the corners back in order: top-left, top-right, bottom-right, bottom-left.".into(),
            recovery: Recovery::AdjustCorners,
            severity: Severity::ActionRequired,
        },

        FlatpageError::Decode(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            recovery: Recovery::ChooseAnotherFile,
            severity: Severity::ActionRequired,
        },

        FlatpageError::Encode(detail) | FlatpageError::PdfError(detail) => HumanError {
            message: "We couldn't save the finished page.".into(),
            suggestion: format!("Try again, or choose a different output format. ({detail})"),
            recovery: Recovery::Retry,
            severity: Severity::Permanent,
        },

        FlatpageError::InvalidSettings(detail) => HumanError {
            message: "One of the page settings is out of range.".into(),
            suggestion: format!("Reset the settings to their defaults and try again. ({detail})"),
            recovery: Recovery::FixSettings,
            severity: Severity::ActionRequired,
        },

        FlatpageError::Config(detail) => HumanError {
            message: "The settings file couldn't be used.".into(),
            suggestion: format!("Delete the settings file to restore the defaults. ({detail})"),
            recovery: Recovery::FixSettings,
            severity: Severity::ActionRequired,
        },

        FlatpageError::Serialization(_) => HumanError {
            message: "The settings file is damaged.".into(),
            suggestion: "Delete the settings file to restore the defaults.".into(),
            recovery: Recovery::FixSettings,
            severity: Severity::ActionRequired,
        },

        FlatpageError::Io(io_err) => humanize_io_error(io_err),
    }
}

fn humanize_io_error(err: &std::io::Error) -> HumanError {
    match err.kind() {
        std::io::ErrorKind::NotFound => HumanError {
            message: "We couldn't find that file.".into(),
            suggestion: "Check the file name and folder, then try again.".into(),
            recovery: Recovery::ChooseAnotherFile,
            severity: Severity::ActionRequired,
        },
        std::io::ErrorKind::PermissionDenied => HumanError {
            message: "We're not allowed to use that file.".into(),
            suggestion: "Choose a folder you can write to, or check the file's permissions.".into(),
            recovery: Recovery::ChooseAnotherFile,
            severity: Severity::ActionRequired,
        },
        _ => HumanError {
            message: "Something went wrong reading or writing a file.".into(),
            suggestion: format!("Try again. ({err})"),
            recovery: Recovery::Retry,
            severity: Severity::Permanent,
        },
    }
}
