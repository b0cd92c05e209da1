use crate::amount::LedgerAmount;
use crate::errors::{LedgerError, LedgerResult};
use rft_types::{
    Address, BPS_DENOMINATOR, DEFAULT_BURN_BPS, DEFAULT_OUTPUT_SCALE, DEFAULT_REFLECTION_BPS,
    DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL,
};
use serde::{Deserialize, Serialize};

/// Largest scale a `Decimal` can carry.
const MAX_OUTPUT_SCALE: u32 = 28;

/// Fee rates applied to every fee-bearing transfer, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Share removed from circulation and credited to the burn sink
    pub burn_bps: u32,
    /// Share redistributed to included holders by shrinking the rate
    pub reflection_bps: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            burn_bps: DEFAULT_BURN_BPS,
            reflection_bps: DEFAULT_REFLECTION_BPS,
        }
    }
}

impl FeeSchedule {
    pub fn total_bps(&self) -> u32 {
        self.burn_bps.saturating_add(self.reflection_bps)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.total_bps() > BPS_DENOMINATOR {
            return Err(LedgerError::InvalidParameter(format!(
                "burn ({}) and reflection ({}) together exceed {} bps",
                self.burn_bps, self.reflection_bps, BPS_DENOMINATOR
            )));
        }
        Ok(())
    }

    /// Split `amount` into burn, reflection and the receiver's credit.
    pub fn split<N: LedgerAmount>(&self, amount: N) -> LedgerResult<FeeSplit<N>> {
        let burn = amount.portion_bps(self.burn_bps)?;
        let reflection = amount.portion_bps(self.reflection_bps)?;
        let credit = amount.minus(burn)?.minus(reflection)?;
        Ok(FeeSplit {
            burn,
            reflection,
            credit,
            charged: true,
        })
    }
}

/// Outcome of the fee computation for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeSplit<N> {
    pub burn: N,
    pub reflection: N,
    pub credit: N,
    /// False when either party is fee-exempt
    pub charged: bool,
}

impl<N: LedgerAmount> FeeSplit<N> {
    pub fn exempt(amount: N) -> Self {
        Self {
            burn: N::zero(),
            reflection: N::zero(),
            credit: amount,
            charged: false,
        }
    }
}

/// How the creator's genesis balance is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenesisPolicy {
    /// Creator holds reflected units and earns reflection from the start
    #[default]
    CreatorIncluded,
    /// Creator holds true units and earns nothing passively
    CreatorExcluded,
}

/// Deployment-wide ledger parameters. Fixed at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    pub fees: FeeSchedule,
    pub genesis_policy: GenesisPolicy,
    /// Whether fee-exempt flags exist at all
    pub fee_exemption: bool,
    /// Decimal places kept when reporting balances (decimal backend only)
    pub output_scale: u32,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            genesis_policy: GenesisPolicy::default(),
            fee_exemption: true,
            output_scale: DEFAULT_OUTPUT_SCALE,
        }
    }
}

impl LedgerParams {
    pub fn validate(&self) -> LedgerResult<()> {
        self.fees.validate()?;
        if self.output_scale > MAX_OUTPUT_SCALE {
            return Err(LedgerError::InvalidParameter(format!(
                "output scale {} exceeds {}",
                self.output_scale, MAX_OUTPUT_SCALE
            )));
        }
        Ok(())
    }
}

/// Descriptive token metadata written at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub logo_url: String,
    pub website: String,
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            logo_url: String::new(),
            website: String::new(),
        }
    }
}

/// Everything genesis needs besides the parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisConfig<N> {
    /// Receives the whole initial supply and becomes operator
    pub creator: Address,
    /// The ledger's own address; excluded and fee-exempt
    pub contract: Address,
    pub initial_supply: N,
    pub token: TokenInfo,
}

impl<N: LedgerAmount> GenesisConfig<N> {
    pub fn new(creator: Address, contract: Address, initial_supply: N) -> Self {
        Self {
            creator,
            contract,
            initial_supply,
            token: TokenInfo::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn default_split() {
        let split = FeeSchedule::default().split(Decimal::from(1_000)).unwrap();
        assert_eq!(split.burn, Decimal::from(20));
        assert_eq!(split.reflection, Decimal::from(30));
        assert_eq!(split.credit, Decimal::from(950));
        assert!(split.charged);
    }

    #[test]
    fn exempt_split_credits_everything() {
        let split = FeeSplit::exempt(1_000u128);
        assert_eq!(split.credit, 1_000);
        assert_eq!(split.burn, 0);
        assert!(!split.charged);
    }

    #[test]
    fn fees_over_one_hundred_percent_rejected() {
        let fees = FeeSchedule {
            burn_bps: 6_000,
            reflection_bps: 5_000,
        };
        assert!(matches!(fees.validate(), Err(LedgerError::InvalidParameter(_))));
    }

    #[test]
    fn output_scale_bounded() {
        let params = LedgerParams {
            output_scale: 29,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        assert!(LedgerParams::default().validate().is_ok());
    }
}
