//! Guard configurations the operation bodies are composed over.
//!
//! Each instruction variant picks its configuration at compile time; the
//! processor has no runtime switch between them.

use crate::{
    guard::{AccessGuard, StrictGuard},
    math::{BalanceMath, CheckedMath},
    payment::{PaymentVerifier, PinnedPayment},
};

/// A set of guards applied to one operation body.
pub trait Configuration {
    type Guard: AccessGuard;
    type Payment: PaymentVerifier;
    type Math: BalanceMath;

    /// Short name used in program logs
    const LABEL: &'static str;
}

/// Every guard enforced.
pub struct Secure;

impl Configuration for Secure {
    type Guard = StrictGuard;
    type Payment = PinnedPayment;
    type Math = CheckedMath;

    const LABEL: &'static str = "secure";
}
