//! Contract tiers
//!
//! A contract is the bid a player opens a round with: how many guesses they
//! commit to, and the payout multiplier earned for solving within that budget.

use std::fmt;
use std::str::FromStr;

/// Starting stake for every round
pub const BASE_POT: u64 = 10_000;

/// Identifier of one of the five tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractId {
    Safe,
    Standard,
    Risky,
    Hard,
    Extreme,
}

impl ContractId {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Standard => "standard",
            Self::Risky => "risky",
            Self::Hard => "hard",
            Self::Extreme => "extreme",
        }
    }

    /// The tier this id names
    #[must_use]
    pub const fn tier(self) -> ContractTier {
        // CONTRACTS is declared in variant order
        CONTRACTS[self as usize]
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CONTRACTS
            .iter()
            .map(|tier| tier.id)
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown contract: {s}"))
    }
}

/// Fixed configuration of one contract tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractTier {
    pub id: ContractId,
    pub label: &'static str,
    /// Guesses allowed before overtime starts
    pub guesses: u8,
    /// Payout multiplier in tenths (15 = 1.5x)
    pub multiplier_tenths: u32,
}

impl ContractTier {
    /// Multiplier as a float, for display only
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        f64::from(self.multiplier_tenths) / 10.0
    }

    /// `floor(pot × multiplier)`, exact in integers
    ///
    /// # Examples
    /// ```
    /// use flexword::contract::ContractId;
    ///
    /// let safe = ContractId::Safe.tier();
    /// assert_eq!(safe.apply_multiplier(10_000), 11_000);
    /// assert_eq!(safe.apply_multiplier(5), 5);
    /// ```
    #[must_use]
    pub fn apply_multiplier(&self, pot: u64) -> u64 {
        pot.saturating_mul(u64::from(self.multiplier_tenths)) / 10
    }

    /// Largest amount a win under this tier can pay
    #[must_use]
    pub fn max_payout(&self) -> u64 {
        self.apply_multiplier(BASE_POT)
    }
}

/// Every tier, safest first
pub const CONTRACTS: [ContractTier; 5] = [
    ContractTier {
        id: ContractId::Safe,
        label: "SAFE",
        guesses: 6,
        multiplier_tenths: 11,
    },
    ContractTier {
        id: ContractId::Standard,
        label: "STANDARD",
        guesses: 5,
        multiplier_tenths: 15,
    },
    ContractTier {
        id: ContractId::Risky,
        label: "RISKY",
        guesses: 4,
        multiplier_tenths: 30,
    },
    ContractTier {
        id: ContractId::Hard,
        label: "HARD",
        guesses: 3,
        multiplier_tenths: 50,
    },
    ContractTier {
        id: ContractId::Extreme,
        label: "EXTREME",
        guesses: 2,
        multiplier_tenths: 100,
    },
];
