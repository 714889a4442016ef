//! Per-account ledger state.
//!
//! An account holds the native balance, asset holdings (opt-ins), local
//! application state, and the parameters of every asset and application it
//! created. All collections are ordered maps so iteration order, and with it
//! every derived hash and accessor result, is deterministic.

use crate::errors::RuntimeError;
use crate::ledger::app::{AppParams, LocalState, StateSchema};
use crate::ledger::asset::{AssetHolding, AssetParams};
use crate::ledger::{
    ASSET_MIN_BALANCE, BASE_MIN_BALANCE, MAX_CREATED_APPS, MAX_CREATED_ASSETS, MAX_OPTED_APPS,
};
use crate::types::address::Address;
use std::collections::BTreeMap;

/// One account in the world state.
#[derive(Clone, Debug)]
pub struct Account {
    address: Address,
    /// Spendable balance in micro-units.
    balance: u64,
    /// Asset id → holding, present only for opted-in assets.
    holdings: BTreeMap<u64, AssetHolding>,
    /// App id → local state, present only for opted-in applications.
    local_states: BTreeMap<u64, LocalState>,
    /// Applications created by this account.
    created_apps: BTreeMap<u64, AppParams>,
    /// Assets created by this account.
    created_assets: BTreeMap<u64, AssetParams>,
}

impl Account {
    /// Creates an account with the given balance and no opt-ins.
    pub fn new(address: Address, balance: u64) -> Account {
        Account {
            address,
            balance,
            holdings: BTreeMap::new(),
            local_states: BTreeMap::new(),
            created_apps: BTreeMap::new(),
            created_assets: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Minimum balance this account must keep: the base requirement plus a
    /// surcharge per opted-in asset and per application schema it carries
    /// (local schemas for opt-ins, global schemas for created apps).
    pub fn min_balance(&self) -> u64 {
        let assets = ASSET_MIN_BALANCE * self.holdings.len() as u64;
        let opted: u64 = self
            .local_states
            .values()
            .map(|ls| ls.schema.min_balance())
            .sum();
        let created: u64 = self
            .created_apps
            .values()
            .map(|app| app.global_schema.min_balance())
            .sum();
        BASE_MIN_BALANCE + assets + opted + created
    }

    /// Debits `amount`, failing if the remaining balance would drop below
    /// the minimum balance.
    pub fn deduct(&mut self, amount: u64) -> Result<(), RuntimeError> {
        let remaining = self.balance.checked_sub(amount);
        match remaining {
            Some(rest) if rest >= self.min_balance() => {
                self.balance = rest;
                Ok(())
            }
            _ => Err(RuntimeError::InsufficientAccountBalance {
                address: self.address.encode(),
                required: amount.saturating_add(self.min_balance()),
                available: self.balance,
            }),
        }
    }

    /// Credits `amount` to the balance.
    pub fn receive(&mut self, amount: u64) -> Result<(), RuntimeError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(RuntimeError::Uint64Overflow)?;
        Ok(())
    }

    /// Empties the balance, returning the drained amount.
    ///
    /// Used when a payment closes the sender out; closing is the one debit
    /// exempt from the minimum-balance rule.
    pub fn drain_balance(&mut self) -> u64 {
        std::mem::take(&mut self.balance)
    }

    /// Fails unless the balance covers the minimum balance.
    pub fn assert_min_balance(&self) -> Result<(), RuntimeError> {
        if self.balance < self.min_balance() {
            return Err(RuntimeError::InsufficientAccountBalance {
                address: self.address.encode(),
                required: self.min_balance(),
                available: self.balance,
            });
        }
        Ok(())
    }

    // =========================
    // Asset holdings
    // =========================

    pub fn holdings(&self) -> &BTreeMap<u64, AssetHolding> {
        &self.holdings
    }

    pub fn holding(&self, asset_id: u64) -> Option<&AssetHolding> {
        self.holdings.get(&asset_id)
    }

    pub(crate) fn holding_mut(
        &mut self,
        asset_id: u64,
    ) -> Result<&mut AssetHolding, RuntimeError> {
        let address = self.address.encode();
        self.holdings
            .get_mut(&asset_id)
            .ok_or(RuntimeError::AsaNotOptin { asset_id, address })
    }

    /// Allocates a holding slot for the asset. Opting in twice is a no-op.
    pub(crate) fn opt_in_to_asset(&mut self, asset_id: u64, default_frozen: bool) {
        self.holdings.entry(asset_id).or_insert(AssetHolding {
            amount: 0,
            frozen: default_frozen,
        });
    }

    pub(crate) fn remove_holding(&mut self, asset_id: u64) -> Option<AssetHolding> {
        self.holdings.remove(&asset_id)
    }

    // =========================
    // Application opt-ins
    // =========================

    pub fn local_states(&self) -> &BTreeMap<u64, LocalState> {
        &self.local_states
    }

    pub fn local_state(&self, app_id: u64) -> Option<&LocalState> {
        self.local_states.get(&app_id)
    }

    pub(crate) fn local_state_mut(&mut self, app_id: u64) -> Option<&mut LocalState> {
        self.local_states.get_mut(&app_id)
    }

    /// Allocates a local-state slot for the app. Opting in twice is a no-op.
    pub(crate) fn opt_in_to_app(
        &mut self,
        app_id: u64,
        schema: StateSchema,
    ) -> Result<(), RuntimeError> {
        if !self.local_states.contains_key(&app_id) && self.local_states.len() >= MAX_OPTED_APPS {
            return Err(RuntimeError::MaxLimitExceeded {
                what: "application opt-ins",
                limit: MAX_OPTED_APPS,
            });
        }
        self.local_states
            .entry(app_id)
            .or_insert_with(|| LocalState::new(schema));
        Ok(())
    }

    pub(crate) fn remove_local_state(&mut self, app_id: u64) -> Option<LocalState> {
        self.local_states.remove(&app_id)
    }

    // =========================
    // Created entities
    // =========================

    pub fn created_apps(&self) -> &BTreeMap<u64, AppParams> {
        &self.created_apps
    }

    pub fn created_app(&self, app_id: u64) -> Option<&AppParams> {
        self.created_apps.get(&app_id)
    }

    pub(crate) fn created_app_mut(&mut self, app_id: u64) -> Option<&mut AppParams> {
        self.created_apps.get_mut(&app_id)
    }

    pub(crate) fn add_created_app(
        &mut self,
        app_id: u64,
        params: AppParams,
    ) -> Result<(), RuntimeError> {
        if self.created_apps.len() >= MAX_CREATED_APPS {
            return Err(RuntimeError::MaxLimitExceeded {
                what: "created applications",
                limit: MAX_CREATED_APPS,
            });
        }
        self.created_apps.insert(app_id, params);
        Ok(())
    }

    pub(crate) fn remove_created_app(&mut self, app_id: u64) -> Option<AppParams> {
        self.created_apps.remove(&app_id)
    }

    pub fn created_assets(&self) -> &BTreeMap<u64, AssetParams> {
        &self.created_assets
    }

    pub fn created_asset(&self, asset_id: u64) -> Option<&AssetParams> {
        self.created_assets.get(&asset_id)
    }

    pub(crate) fn created_asset_mut(&mut self, asset_id: u64) -> Option<&mut AssetParams> {
        self.created_assets.get_mut(&asset_id)
    }

    pub(crate) fn add_created_asset(
        &mut self,
        asset_id: u64,
        params: AssetParams,
    ) -> Result<(), RuntimeError> {
        if self.created_assets.len() >= MAX_CREATED_ASSETS {
            return Err(RuntimeError::MaxLimitExceeded {
                what: "created assets",
                limit: MAX_CREATED_ASSETS,
            });
        }
        self.created_assets.insert(asset_id, params);
        Ok(())
    }

    pub(crate) fn remove_created_asset(&mut self, asset_id: u64) -> Option<AssetParams> {
        self.created_assets.remove(&asset_id)
    }
}
