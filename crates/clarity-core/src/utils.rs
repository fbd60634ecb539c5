// SPDX-License-Identifier: Apache-2.0

//! Utility functions for query values.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in a URI component.
///
/// Everything except ASCII alphanumerics and `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a value for use as a single URI component.
///
/// # Examples
///
/// ```
/// use clarity_core::utils::encode_component;
///
/// assert_eq!(encode_component("CodeClarityCE/frontend"), "CodeClarityCE%2Ffrontend");
/// assert_eq!(encode_component("JavaScript Analyzer"), "JavaScript%20Analyzer");
/// ```
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}
