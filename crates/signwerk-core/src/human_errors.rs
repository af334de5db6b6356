// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the editor and the toolbox.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the surrounding application presents it.

use crate::error::SignwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Trying again may work (temporary file or rendering problem).
    Transient,
    /// The user must change something (pick a file, choose another page).
    ActionRequired,
    /// Cannot be fixed by retrying: damaged or unsupported input.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether repeating the same action could succeed.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `SignwerkError` into a `HumanError`.
pub fn humanize_error(err: &SignwerkError) -> HumanError {
    match err {
        SignwerkError::UnsupportedDocument(detail) => HumanError {
            message: "This type of file isn't supported.".into(),
            suggestion: format!("Use a PDF, or a PNG/JPEG image where images are accepted. (File type: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        SignwerkError::PdfError(detail) => {
            if detail.contains("encrypt") || detail.contains("password") {
                HumanError {
                    message: "This PDF is password-protected.".into(),
                    suggestion: "Remove the password with the program that created it, then try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There's a problem with this PDF file.".into(),
                    suggestion: "The file may be damaged. Try opening it in a PDF viewer first, or try a different file.".into(),
                    retriable: false,
                    severity: Severity::Permanent,
                }
            }
        }

        SignwerkError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a PNG or JPEG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        SignwerkError::Render(_) => HumanError {
            message: "We couldn't show this page.".into(),
            suggestion: "Try loading the document again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SignwerkError::Codec(_) => HumanError {
            message: "We couldn't save your changes into the document.".into(),
            suggestion: "Your annotations are still here. Try saving again, or remove the last annotation and retry.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SignwerkError::NoDocumentLoaded => HumanError {
            message: "No document is open.".into(),
            suggestion: "Open a PDF first, then add your annotations.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SignwerkError::PageOutOfRange { page_count, .. } => HumanError {
            message: "That page doesn't exist.".into(),
            suggestion: format!("Choose a page between 1 and {page_count}."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SignwerkError::InvalidColor(value) => HumanError {
            message: "That colour isn't valid.".into(),
            suggestion: format!("Use a colour written as #RRGGBB, for example #1a2b3c. (Got: {value})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SignwerkError::Config(detail) => HumanError {
            message: "The settings file has a mistake.".into(),
            suggestion: format!("Fix or delete the settings file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SignwerkError::Io(io) => match io.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "Check the file name and location, then try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We're not allowed to use that file.".into(),
                suggestion: "Choose a folder you can write to, or check the file's permissions.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Reading or writing a file failed.".into(),
                suggestion: "Make sure there is enough free space, then try again.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        SignwerkError::Serialization(_) => HumanError {
            message: "Some saved data couldn't be read.".into(),
            suggestion: "The settings file may be damaged. Delete it to restore the defaults.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
