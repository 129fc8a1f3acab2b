// Snapstream
// Copyright (c) 2025 The Snapstream Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Formats an integer as its ASCII decimal byte string.
///
/// Integer-encoded strings, ziplist integer entries, and intset elements are
/// all normalized through this function so that consumers observe the same
/// textual representation the source system would print.
pub(crate) fn ascii_decimal(value: i64) -> Box<[u8]> {
    value.to_string().into_bytes().into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::ascii_decimal;

    #[test]
    fn verify_ascii_decimal() {
        assert_eq!(ascii_decimal(0).as_ref(), b"0");
        assert_eq!(ascii_decimal(255).as_ref(), b"255");
        assert_eq!(ascii_decimal(-2).as_ref(), b"-2");
        assert_eq!(ascii_decimal(i64::MIN).as_ref(), b"-9223372036854775808");
    }
}
