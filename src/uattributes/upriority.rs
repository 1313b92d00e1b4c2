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

use serde::{Deserialize, Serialize};

use crate::uattributes::UAttributesError;

/// A message's priority, as defined by the uProtocol Core API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum UPriority {
    #[default]
    Unspecified,
    Cs0,
    Cs1,
    Cs2,
    Cs3,
    Cs4,
    Cs5,
    Cs6,
}

impl UPriority {
    /// Encodes this priority to its wire code, e.g. `"CS2"`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use up_transport_zenoh::UPriority;
    ///
    /// assert_eq!(UPriority::Cs2.to_priority_code(), "CS2");
    /// ```
    pub fn to_priority_code(self) -> String {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Cs0 => "CS0",
            Self::Cs1 => "CS1",
            Self::Cs2 => "CS2",
            Self::Cs3 => "CS3",
            Self::Cs4 => "CS4",
            Self::Cs5 => "CS5",
            Self::Cs6 => "CS6",
        }
        .to_string()
    }

    /// Gets the priority for a wire code.
    ///
    /// # Errors
    ///
    /// Returns an error if the given string does not match a known priority code.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use up_transport_zenoh::UPriority;
    ///
    /// let priority = UPriority::try_from_priority_code("CS2").unwrap();
    /// assert_eq!(priority, UPriority::Cs2);
    ///
    /// assert!(UPriority::try_from_priority_code("not-supported").is_err());
    /// ```
    pub fn try_from_priority_code<T>(code: T) -> Result<Self, UAttributesError>
    where
        T: Into<String>,
    {
        let code = code.into();
        match code.as_str() {
            "UNSPECIFIED" => Ok(Self::Unspecified),
            "CS0" => Ok(Self::Cs0),
            "CS1" => Ok(Self::Cs1),
            "CS2" => Ok(Self::Cs2),
            "CS3" => Ok(Self::Cs3),
            "CS4" => Ok(Self::Cs4),
            "CS5" => Ok(Self::Cs5),
            "CS6" => Ok(Self::Cs6),
            _ => Err(UAttributesError::parsing_error(format!(
                "unknown priority [{}]",
                code
            ))),
        }
    }
}
