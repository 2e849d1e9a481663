// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan document loading and validation

use crate::error::{Error, Result};
use crate::model::Floor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level plan document: floors ordered bottom to top
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanDocument {
    #[serde(default)]
    pub floors: Vec<Floor>,
}

impl PlanDocument {
    pub fn new(floors: Vec<Floor>) -> Self {
        Self { floors }
    }

    /// Parse a document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject documents with nothing to reconstruct.
    ///
    /// Floors without a design are tolerated as long as at least one floor
    /// has a non-empty design.
    pub fn validate(&self) -> Result<()> {
        if self.floors.is_empty() {
            return Err(Error::NoFloors);
        }
        let usable = self
            .floors
            .iter()
            .any(|f| f.design().map(|d| !d.is_empty()).unwrap_or(false));
        if usable {
            Ok(())
        } else {
            Err(Error::NoFloors)
        }
    }

    /// Validated floor list
    pub fn usable_floors(&self) -> Result<impl Iterator<Item = (usize, &Floor)>> {
        self.validate()?;
        Ok(self.floors.iter().enumerate())
    }

    /// Floor at `index`, failing when it has no design
    pub fn floor(&self, index: usize) -> Result<&Floor> {
        match self.floors.get(index) {
            Some(floor) if floor.design().is_some() => Ok(floor),
            _ => Err(Error::EmptyFloor { index }),
        }
    }
}
