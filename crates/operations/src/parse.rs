// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Strict field extraction from a successful worker response.
//!
//! A missing or mistyped required field is an `INVALID_RESPONSE`, never a
//! silent default. Optional fields may be absent or `null`, but a present
//! value of the wrong type is still rejected.

use error_taxonomy::{catalog, DomainError, ErrorFactory};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub(crate) struct Fields<'a> {
    operation: &'static str,
    data: Option<&'a Map<String, Value>>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(operation: &'static str, data: Option<&'a Map<String, Value>>) -> Self {
        Self { operation, data }
    }

    pub(crate) fn required<T: DeserializeOwned>(&self, key: &str) -> Result<T, DomainError> {
        match self.raw(key) {
            Some(value) => self.decode(key, value),
            None => Err(self.invalid(format!("missing required field '{key}'"))),
        }
    }

    pub(crate) fn optional<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, DomainError> {
        self.raw(key).map(|v| self.decode(key, v)).transpose()
    }

    fn raw(&self, key: &str) -> Option<&'a Value> {
        self.data?.get(key).filter(|v| !v.is_null())
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, value: &Value) -> Result<T, DomainError> {
        T::deserialize(value).map_err(|e| self.invalid(format!("field '{key}': {e}")))
    }

    fn invalid(&self, detail: String) -> DomainError {
        tracing::warn!(operation = self.operation, %detail, "rejecting worker response");
        ErrorFactory::from_code(
            catalog::INVALID_RESPONSE,
            format!("{} response: {detail}", self.operation),
        )
    }
}
