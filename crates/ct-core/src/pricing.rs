//! Per-model token pricing.
//!
//! Unit costs are USD per million tokens. Lookup goes exact match, then the
//! longest table key that prefixes the model id (so dated ids like
//! `claude-opus-4-6-20260201` resolve to `claude-opus-4-6`), then a
//! sonnet-class fallback.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::usage::TokenCounts;

const PER_MILLION: f64 = 1_000_000.0;

/// Unit costs for one model, in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub cache_write: f64,
    pub cache_read: f64,
}

impl ModelPricing {
    pub const fn new(input: f64, output: f64, cache_write: f64, cache_read: f64) -> Self {
        Self {
            input,
            output,
            cache_write,
            cache_read,
        }
    }

    /// Cost of a token snapshot in USD.
    #[allow(clippy::cast_precision_loss)]
    pub fn cost_usd(&self, tokens: &TokenCounts) -> f64 {
        (tokens.input as f64 * self.input
            + tokens.output as f64 * self.output
            + tokens.cache_write as f64 * self.cache_write
            + tokens.cache_read as f64 * self.cache_read)
            / PER_MILLION
    }
}

/// Rates used when a model is not in the table.
pub const FALLBACK_PRICING: ModelPricing = ModelPricing::new(3.0, 15.0, 3.75, 0.3);

const BUILTIN_PRICING: &[(&str, ModelPricing)] = &[
    ("claude-opus-4-6", ModelPricing::new(5.0, 25.0, 6.25, 0.5)),
    ("claude-opus-4-5", ModelPricing::new(5.0, 25.0, 6.25, 0.5)),
    ("claude-opus-4-1", ModelPricing::new(15.0, 75.0, 18.75, 1.5)),
    ("claude-opus-4", ModelPricing::new(15.0, 75.0, 18.75, 1.5)),
    ("claude-sonnet-4-6", ModelPricing::new(3.0, 15.0, 3.75, 0.3)),
    ("claude-sonnet-4-5", ModelPricing::new(3.0, 15.0, 3.75, 0.3)),
    ("claude-sonnet-4", ModelPricing::new(3.0, 15.0, 3.75, 0.3)),
    ("claude-3-7-sonnet", ModelPricing::new(3.0, 15.0, 3.75, 0.3)),
    ("claude-3-5-sonnet", ModelPricing::new(3.0, 15.0, 3.75, 0.3)),
    ("claude-haiku-4-5", ModelPricing::new(1.0, 5.0, 1.25, 0.1)),
    ("claude-3-5-haiku", ModelPricing::new(0.8, 4.0, 1.0, 0.08)),
    ("claude-3-haiku", ModelPricing::new(0.25, 1.25, 0.3, 0.03)),
];

/// Model id to unit-cost table.
#[derive(Debug, Clone)]
pub struct PricingTable {
    models: HashMap<String, ModelPricing>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            models: BUILTIN_PRICING
                .iter()
                .map(|(model, pricing)| ((*model).to_string(), *pricing))
                .collect(),
        }
    }
}

impl PricingTable {
    /// An empty table. Every lookup resolves to [`FALLBACK_PRICING`].
    pub fn empty() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Adds or replaces the pricing for a model id (or id prefix).
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, pricing: ModelPricing) -> Self {
        self.models.insert(model.into(), pricing);
        self
    }

    /// Finds pricing for a model without applying the fallback.
    pub fn lookup(&self, model: &str) -> Option<&ModelPricing> {
        if let Some(pricing) = self.models.get(model) {
            return Some(pricing);
        }
        self.models
            .iter()
            .filter(|(key, _)| model.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, pricing)| pricing)
    }

    /// Resolves pricing for a model, falling back to sonnet-class rates.
    pub fn resolve(&self, model: &str) -> ModelPricing {
        self.lookup(model).copied().unwrap_or_else(|| {
            tracing::debug!(model, "no pricing for model, using fallback rates");
            FALLBACK_PRICING
        })
    }

    /// Cost in USD of `tokens` on `model`.
    pub fn cost_usd(&self, model: &str, tokens: &TokenCounts) -> f64 {
        self.resolve(model).cost_usd(tokens)
    }
}
