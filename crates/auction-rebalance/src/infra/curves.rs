//! Price curve registry.
//!
//! Curves are addressed by name in auction parameters and resolved on every
//! bid, so registry changes apply immediately to live auctions.

use {
    crate::domain::{
        curve::{
            BoundedStepwiseExponential,
            BoundedStepwiseLinear,
            Constant,
            PriceCurve,
        },
        rebalance::Error,
    },
    std::{collections::HashMap, sync::Arc},
};

pub const CONSTANT: &str = "constant";
pub const LINEAR: &str = "bounded-stepwise-linear";
pub const EXPONENTIAL: &str = "bounded-stepwise-exponential";

pub trait CurveRegistry: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Arc<dyn PriceCurve>, Error>;
}

/// The in-process registry of curve adapters.
#[derive(Default)]
pub struct Adapters {
    curves: HashMap<String, Arc<dyn PriceCurve>>,
}

impl Adapters {
    /// A registry preloaded with every curve this crate ships.
    pub fn bundled() -> Self {
        let mut adapters = Self::default();
        adapters.register(CONSTANT, Arc::new(Constant));
        adapters.register(LINEAR, Arc::new(BoundedStepwiseLinear));
        adapters.register(EXPONENTIAL, Arc::new(BoundedStepwiseExponential));
        adapters
    }

    pub fn register(&mut self, name: &str, curve: Arc<dyn PriceCurve>) {
        self.curves.insert(name.to_owned(), curve);
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn PriceCurve>> {
        self.curves.remove(name)
    }
}

impl CurveRegistry for Adapters {
    fn resolve(&self, name: &str) -> Result<Arc<dyn PriceCurve>, Error> {
        self.curves
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownCurve(name.to_owned()))
    }
}
