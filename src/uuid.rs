/********************************************************************************
 * Copyright (c) 2023 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use std::fmt::Write as _;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// uProtocol stamps its UUIDs as RFC 4122 version 7: the version nibble sits
/// in bits 12-15 of `msb`, the variant in bits 62-63 of `lsb`.
const VERSION_SHIFT: u32 = 12;
const VERSION_7: u64 = 0x7;
const VARIANT_SHIFT: u32 = 62;
const VARIANT_RFC4122: u64 = 0b10;

fn version_nibble(msb: u64) -> u64 {
    (msb >> VERSION_SHIFT) & 0xF
}

fn variant_bits(lsb: u64) -> u64 {
    (lsb >> VARIANT_SHIFT) & 0b11
}

#[derive(Debug)]
pub struct UuidConversionError {
    message: String,
}

impl UuidConversionError {
    pub fn new<T: Into<String>>(message: T) -> UuidConversionError {
        UuidConversionError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for UuidConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error converting UUID: {}", self.message)
    }
}

impl std::error::Error for UuidConversionError {}

/// A 128-bit identifier, split into its most- and least-significant halves.
///
/// [`UUID::build`] stamps a version-7-shaped value (a millisecond timestamp
/// in the high bits of `msb`, random bits elsewhere), so identifiers are
/// both unique and sortable by creation order without a central counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UUID {
    pub msb: u64,
    pub lsb: u64,
}

impl UUID {
    /// Checks whether this UUID carries the version/variant bits a
    /// uProtocol-generated UUID requires.
    pub fn is_uprotocol_uuid(&self) -> bool {
        version_nibble(self.msb) == VERSION_7 && variant_bits(self.lsb) == VARIANT_RFC4122
    }

    /// Creates a UUID from a raw high/low pair.
    ///
    /// # Errors
    ///
    /// Fails if the pair does not carry a version-7/RFC-4122 tag.
    pub fn from_u64_pair(msb: u64, lsb: u64) -> Result<Self, UuidConversionError> {
        let candidate = UUID { msb, lsb };
        if !candidate.is_uprotocol_uuid() {
            return Err(UuidConversionError::new(
                "value is not a version-7, RFC-4122-variant UUID",
            ));
        }
        Ok(candidate)
    }

    fn stamp(now: Duration, random: &mut impl Rng) -> UUID {
        let millis = u64::try_from(now.as_millis())
            .expect("system clock is set further ahead than a 48-bit millisecond count can hold");

        // top 48 bits: timestamp; next 4: version; remaining 12: random
        let msb = (millis << 16) | (VERSION_7 << VERSION_SHIFT) | (random.next_u64() & 0x0FFF);
        // top 2 bits: variant; remaining 62: random
        let lsb = (VARIANT_RFC4122 << VARIANT_SHIFT) | (random.next_u64() >> 2);
        UUID { msb, lsb }
    }

    /// Creates a UUID suitable for use as a uProtocol message or request ID.
    ///
    /// # Panics
    ///
    /// If the system clock reads a time before the UNIX epoch.
    pub fn build() -> UUID {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system clock is set before the UNIX epoch");
        Self::stamp(now, &mut rand::rng())
    }

    /// Returns the millisecond timestamp this UUID was stamped with, or
    /// `None` if it is not [uProtocol-shaped](Self::is_uprotocol_uuid).
    pub fn get_time(&self) -> Option<u64> {
        self.is_uprotocol_uuid().then(|| self.msb >> 16)
    }

    /// Renders this UUID as a lower-case, hyphenated string per RFC 4122
    /// section 3.
    pub fn to_hyphenated_string(&self) -> String {
        let mut out = String::with_capacity(36);
        let _ = write!(
            out,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            self.msb >> 32,
            (self.msb >> 16) & 0xFFFF,
            self.msb & 0xFFFF,
            self.lsb >> 48,
            self.lsb & 0xFFFF_FFFF_FFFF,
        );
        out
    }
}

impl From<UUID> for String {
    fn from(value: UUID) -> Self {
        Self::from(&value)
    }
}

impl From<&UUID> for String {
    fn from(value: &UUID) -> Self {
        value.to_hyphenated_string()
    }
}

impl FromStr for UUID {
    type Err = UuidConversionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let groups: Vec<&str> = text.split('-').collect();
        let [g0, g1, g2, g3, g4] = &groups[..] else {
            return Err(UuidConversionError::new(
                "hyphenated UUID must have exactly 5 groups",
            ));
        };
        let (g0, g1, g2, g3, g4) = (*g0, *g1, *g2, *g3, *g4);
        let parse_group = |g: &str, name: &str| {
            u64::from_str_radix(g, 16)
                .map_err(|e| UuidConversionError::new(format!("group '{name}' is not valid hex: {e}")))
        };
        let msb = (parse_group(g0, "time_low")? << 32)
            | (parse_group(g1, "time_mid")? << 16)
            | parse_group(g2, "time_hi_and_version")?;
        let lsb = (parse_group(g3, "clock_seq")? << 48) | parse_group(g4, "node")?;
        UUID::from_bytes_unchecked(msb, lsb, [g0, g1, g2, g3, g4])
    }
}

impl UUID {
    /// `from_str` validates group widths too (the hex parse above accepts
    /// short groups silently), so this does the width check and hands back
    /// the already-assembled halves as a concrete `UUID`.
    fn from_bytes_unchecked(
        msb: u64,
        lsb: u64,
        groups: [&str; 5],
    ) -> Result<UUID, UuidConversionError> {
        let expected_widths = [8, 4, 4, 4, 12];
        for (group, expected) in groups.iter().zip(expected_widths) {
            if group.len() != expected {
                return Err(UuidConversionError::new(format!(
                    "group '{group}' should be {expected} hex digits long"
                )));
            }
        }
        Ok(UUID { msb, lsb })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng(u64);

    impl rand::TryRng for FixedRng {
        type Error = std::convert::Infallible;

        fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
            Ok(self.0 as u32)
        }
        fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
            Ok(self.0)
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Self::Error> {
            for byte in dest {
                *byte = self.0 as u8;
            }
            Ok(())
        }
    }

    #[test]
    fn from_u64_pair_accepts_a_well_formed_v7_value() {
        let msb = (0x0002_71F0_A9E0_u64 << 16) | (VERSION_7 << VERSION_SHIFT) | 0x0BC;
        let lsb = (VARIANT_RFC4122 << VARIANT_SHIFT) | 0x1234_5678_9ABC;
        let uuid = UUID::from_u64_pair(msb, lsb).expect("well-formed v7 value should parse");
        assert!(uuid.is_uprotocol_uuid());
        assert_eq!(uuid.get_time(), Some(0x0002_71F0_A9E0));
    }

    #[test]
    fn from_u64_pair_rejects_wrong_version_nibble() {
        let msb = (0x1_u64 << VERSION_SHIFT) & !(0xF << VERSION_SHIFT); // version nibble zeroed out
        let lsb = VARIANT_RFC4122 << VARIANT_SHIFT;
        assert!(UUID::from_u64_pair(msb, lsb).is_err());
    }

    #[test]
    fn from_u64_pair_rejects_wrong_variant_bits() {
        let msb = VERSION_7 << VERSION_SHIFT;
        let lsb = 0_u64; // variant bits cleared
        assert!(UUID::from_u64_pair(msb, lsb).is_err());
    }

    #[test]
    fn stamp_embeds_the_given_timestamp() {
        let now = Duration::from_millis(1_700_000_000_123);
        let uuid = UUID::stamp(now, &mut FixedRng(0xABCD));
        assert_eq!(uuid.get_time(), Some(1_700_000_000_123));
        assert!(uuid.is_uprotocol_uuid());
    }

    #[test]
    fn to_hyphenated_string_matches_rfc4122_layout() {
        let uuid = UUID {
            msb: 0x0123_4567_89AB_7CDE,
            lsb: 0x9012_3456_789A_BCDE,
        };
        assert_eq!(uuid.to_hyphenated_string(), "01234567-89ab-7cde-9012-3456789abcde");
    }

    #[test]
    fn string_round_trips_through_from_str() {
        let uuid = UUID::build();
        let text = String::from(&uuid);
        let parsed: UUID = text.parse().expect("a self-produced string should always parse");
        assert_eq!(uuid, parsed);
    }

    #[test]
    fn from_str_rejects_a_group_with_the_wrong_width() {
        assert!("0123456-89ab-7cde-9012-3456789abcde".parse::<UUID>().is_err());
    }

    #[test]
    fn build_produces_non_decreasing_timestamps() {
        let a = UUID::build();
        let b = UUID::build();
        assert!(a.get_time().unwrap() <= b.get_time().unwrap());
    }
}
