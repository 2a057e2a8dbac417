//! Bidder permissioning.
//!
//! Each basket carries its own allowlist. The engine additionally keeps the
//! grant order of currently-allowed bidders so that `allowed_bidders` can
//! enumerate them deterministically and `remove` can report exactly who lost
//! access.

use {crate::domain::eth::Address, std::collections::HashSet};

#[derive(Debug, Clone, Default)]
pub struct BidderPermissions {
    anyone_bid: bool,
    allowed: HashSet<Address>,
    // Grant-ordered view of `allowed`; each address appears at most once.
    history: Vec<Address>,
}

impl BidderPermissions {
    pub fn is_permitted(&self, bidder: Address) -> bool {
        self.anyone_bid || self.allowed.contains(&bidder)
    }

    /// Grants or revokes a single bidder. Granting an already-allowed bidder
    /// or revoking an unknown one is a no-op.
    pub fn set_status(&mut self, bidder: Address, allowed: bool) {
        if allowed {
            if self.allowed.insert(bidder) {
                self.history.push(bidder);
            }
        } else if self.allowed.remove(&bidder) {
            self.history.retain(|b| *b != bidder);
        }
    }

    /// Currently-allowed bidders, in grant order.
    pub fn allowed_bidders(&self) -> &[Address] {
        &self.history
    }

    pub fn anyone_bid(&self) -> bool {
        self.anyone_bid
    }

    pub fn set_anyone_bid(&mut self, anyone_bid: bool) {
        self.anyone_bid = anyone_bid;
    }

    /// Clears every permission, returning the bidders that lost access.
    pub fn revoke_all(&mut self) -> Vec<Address> {
        self.allowed.clear();
        self.anyone_bid = false;
        std::mem::take(&mut self.history)
    }
}
