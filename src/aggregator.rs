// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Resource aggregation across kinds.
//!
//! One request is a single linear pass: kinds in filter order, objects in listing
//! order, stopping as soon as the count budget runs out. A listing failure fails
//! the whole request; nothing collected before it is returned.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::kubernetes::{KindMapping, RawObject, ResourceLister};
use crate::status::{extract_connection_details, extract_readiness};

/// Remaining number of summaries a request may still emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Unlimited,
    Remaining(usize),
}

impl Budget {
    /// Map a wire count to a budget: zero or negative means no cap
    pub fn from_count(count: i32) -> Self {
        match usize::try_from(count) {
            Ok(n) if n > 0 => Budget::Remaining(n),
            _ => Budget::Unlimited,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Budget::Remaining(0))
    }

    fn consume(&mut self) {
        if let Budget::Remaining(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

/// Normalized request: budget plus the raw kind filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    pub budget: Budget,
    pub kind_filter: String,
}

impl ResourceQuery {
    pub fn new(count: i32, kind_filter: impl Into<String>) -> Self {
        Self {
            budget: Budget::from_count(count),
            kind_filter: kind_filter.into(),
        }
    }
}

/// Normalized status of one custom resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub name: String,
    /// Kind name as requested, not the collection identifier
    pub kind: String,
    pub ready: bool,
    pub status_message: String,
    pub connection_details: String,
}

impl ResourceSummary {
    pub fn from_object(kind: &str, obj: &RawObject) -> Self {
        let (status_message, ready) = extract_readiness(obj);
        Self {
            name: obj.name().to_string(),
            kind: kind.to_string(),
            ready,
            status_message,
            connection_details: extract_connection_details(obj),
        }
    }
}

/// Turns a query into an ordered, budget-bounded list of summaries
#[derive(Clone)]
pub struct Aggregator {
    kinds: Arc<KindMapping>,
    lister: Arc<dyn ResourceLister>,
}

impl Aggregator {
    pub fn new(kinds: Arc<KindMapping>, lister: Arc<dyn ResourceLister>) -> Self {
        Self { kinds, lister }
    }

    pub fn kinds(&self) -> &KindMapping {
        &self.kinds
    }

    pub async fn get_resources(&self, query: &ResourceQuery) -> Result<Vec<ResourceSummary>> {
        let start = Instant::now();
        let mut budget = query.budget;
        let mut summaries = Vec::new();

        'kinds: for kind in self.kinds.expand_filter(&query.kind_filter) {
            if budget.is_exhausted() {
                break;
            }

            let Some(collection) = self.kinds.resolve(&kind) else {
                debug!(kind = %kind, "Skipping unknown kind");
                continue;
            };

            let objects = self
                .lister
                .list(collection)
                .await
                .with_context(|| format!("Error fetching resources of kind '{}'", kind))?;

            debug!(kind = %kind, collection = %collection, objects = objects.len(), "Listed kind");

            for obj in &objects {
                if budget.is_exhausted() {
                    break 'kinds;
                }
                summaries.push(ResourceSummary::from_object(&kind, obj));
                budget.consume();
            }
        }

        info!(
            filter = %query.kind_filter,
            budget = ?query.budget,
            resources = summaries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Aggregated resources"
        );

        Ok(summaries)
    }
}
