//! Asset definitions and per-account holdings.

use crate::errors::RuntimeError;
use crate::types::address::Address;

/// Parameters of a standard asset, fixed at creation except for the four
/// role addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetParams {
    /// Total supply in base units.
    pub total: u64,
    /// Decimals for display purposes only.
    pub decimals: u32,
    /// Whether fresh holdings start frozen.
    pub default_frozen: bool,
    /// Short unit name, e.g. ticker.
    pub unit_name: String,
    /// Full asset name.
    pub asset_name: String,
    /// Informational URL.
    pub url: String,
    /// Commitment to off-ledger metadata.
    pub metadata_hash: [u8; 32],
    /// May reconfigure role addresses and destroy the asset.
    pub manager: Address,
    /// Holds non-circulating supply.
    pub reserve: Address,
    /// May freeze and unfreeze holdings.
    pub freeze: Address,
    /// May revoke holdings from any account.
    pub clawback: Address,
}

/// Role-address changes requested by an asset-config transaction.
///
/// `None` leaves the role unchanged.
#[derive(Clone, Debug, Default)]
pub struct AssetModFields {
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

impl AssetParams {
    /// Applies role-address changes, enforcing the lock rules: a role that
    /// is currently the zero address stays blank forever, and a non-zero
    /// role can never be reset to the zero address.
    pub fn update_roles(
        &mut self,
        fields: &AssetModFields,
        asset_id: u64,
    ) -> Result<(), RuntimeError> {
        let roles: [(&'static str, &mut Address, &Option<Address>); 4] = [
            ("manager", &mut self.manager, &fields.manager),
            ("reserve", &mut self.reserve, &fields.reserve),
            ("freeze", &mut self.freeze, &fields.freeze),
            ("clawback", &mut self.clawback, &fields.clawback),
        ];
        for (role, current, requested) in roles {
            if let Some(next) = requested {
                if current.is_zero() || next.is_zero() {
                    return Err(RuntimeError::RoleAddressLocked { role, asset_id });
                }
                *current = *next;
            }
        }
        Ok(())
    }
}

/// One account's position in one asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetHolding {
    /// Amount held, in base units.
    pub amount: u64,
    /// Frozen holdings cannot be sent or received by ordinary transfers.
    pub frozen: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(manager: Address, freeze: Address) -> AssetParams {
        AssetParams {
            total: 1000,
            decimals: 0,
            default_frozen: false,
            unit_name: "T".to_string(),
            asset_name: "test".to_string(),
            url: String::new(),
            metadata_hash: [0; 32],
            manager,
            reserve: manager,
            freeze,
            clawback: manager,
        }
    }

    #[test]
    fn update_roles_reassigns_nonzero() {
        let a = Address([1; 32]);
        let b = Address([2; 32]);
        let mut p = params(a, a);
        p.update_roles(
            &AssetModFields {
                manager: Some(b),
                ..Default::default()
            },
            7,
        )
        .unwrap();
        assert_eq!(p.manager, b);
        assert_eq!(p.reserve, a);
    }

    #[test]
    fn update_roles_rejects_reset_to_zero() {
        let a = Address([1; 32]);
        let mut p = params(a, a);
        let err = p
            .update_roles(
                &AssetModFields {
                    freeze: Some(Address::zero()),
                    ..Default::default()
                },
                7,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::RoleAddressLocked { role: "freeze", asset_id: 7 }
        ));
    }

    #[test]
    fn update_roles_rejects_setting_blank_role() {
        let a = Address([1; 32]);
        let mut p = params(a, Address::zero());
        let err = p
            .update_roles(
                &AssetModFields {
                    freeze: Some(a),
                    ..Default::default()
                },
                7,
            )
            .unwrap_err();
        assert!(matches!(err, RuntimeError::RoleAddressLocked { .. }));
    }
}
