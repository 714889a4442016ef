//! The world state: every account plus the global entity indexes.
//!
//! Applications and assets live inside their creator's account; the global
//! maps here only index entity id → creator address. The executor works on a
//! deep copy of this structure and swaps it in atomically on success.

use crate::errors::RuntimeError;
use crate::ledger::account::Account;
use crate::ledger::app::AppParams;
use crate::ledger::asset::AssetParams;
use crate::types::address::Address;
use std::collections::BTreeMap;

/// Complete ledger state for one runtime instance.
#[derive(Clone, Debug)]
pub struct WorldState {
    /// Address → account.
    accounts: BTreeMap<Address, Account>,
    /// App id → creator address.
    app_defs: BTreeMap<u64, Address>,
    /// Asset id → creator address.
    asset_defs: BTreeMap<u64, Address>,
    /// Monotonic id counter for applications.
    app_counter: u64,
    /// Monotonic id counter for assets.
    asset_counter: u64,
    /// Injected round, visible to programs via `global Round`.
    pub round: u64,
    /// Injected timestamp, visible via `global LatestTimestamp`.
    pub timestamp: u64,
}

impl WorldState {
    /// Creates an empty world state.
    pub fn new() -> WorldState {
        WorldState {
            accounts: BTreeMap::new(),
            app_defs: BTreeMap::new(),
            asset_defs: BTreeMap::new(),
            app_counter: 0,
            asset_counter: 0,
            round: 1,
            timestamp: 1,
        }
    }

    /// Adds or replaces an account.
    pub fn insert_account(&mut self, account: Account) {
        self.accounts.insert(account.address(), account);
    }

    pub fn account(&self, address: Address) -> Result<&Account, RuntimeError> {
        self.accounts
            .get(&address)
            .ok_or(RuntimeError::AccountDoesNotExist {
                address: address.encode(),
            })
    }

    pub fn account_mut(&mut self, address: Address) -> Result<&mut Account, RuntimeError> {
        self.accounts
            .get_mut(&address)
            .ok_or(RuntimeError::AccountDoesNotExist {
                address: address.encode(),
            })
    }

    pub fn has_account(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    pub fn accounts(&self) -> &BTreeMap<Address, Account> {
        &self.accounts
    }

    // =========================
    // Applications
    // =========================

    /// Allocates the next application id.
    pub fn next_app_id(&mut self) -> u64 {
        self.app_counter += 1;
        self.app_counter
    }

    /// Most recently allocated application id.
    pub fn last_app_id(&self) -> u64 {
        self.app_counter
    }

    pub fn register_app(&mut self, app_id: u64, creator: Address) {
        self.app_defs.insert(app_id, creator);
    }

    pub fn unregister_app(&mut self, app_id: u64) {
        self.app_defs.remove(&app_id);
    }

    pub fn app_defs(&self) -> &BTreeMap<u64, Address> {
        &self.app_defs
    }

    pub fn app_creator(&self, app_id: u64) -> Result<Address, RuntimeError> {
        self.app_defs
            .get(&app_id)
            .copied()
            .ok_or(RuntimeError::AppNotFound { app_id })
    }

    pub fn app_params(&self, app_id: u64) -> Result<&AppParams, RuntimeError> {
        let creator = self.app_creator(app_id)?;
        self.account(creator)?
            .created_app(app_id)
            .ok_or(RuntimeError::AppNotFound { app_id })
    }

    pub fn app_params_mut(&mut self, app_id: u64) -> Result<&mut AppParams, RuntimeError> {
        let creator = self.app_creator(app_id)?;
        self.account_mut(creator)?
            .created_app_mut(app_id)
            .ok_or(RuntimeError::AppNotFound { app_id })
    }

    // =========================
    // Assets
    // =========================

    /// Allocates the next asset id.
    pub fn next_asset_id(&mut self) -> u64 {
        self.asset_counter += 1;
        self.asset_counter
    }

    /// Most recently allocated asset id.
    pub fn last_asset_id(&self) -> u64 {
        self.asset_counter
    }

    pub fn register_asset(&mut self, asset_id: u64, creator: Address) {
        self.asset_defs.insert(asset_id, creator);
    }

    pub fn unregister_asset(&mut self, asset_id: u64) {
        self.asset_defs.remove(&asset_id);
    }

    pub fn asset_defs(&self) -> &BTreeMap<u64, Address> {
        &self.asset_defs
    }

    pub fn asset_creator(&self, asset_id: u64) -> Result<Address, RuntimeError> {
        self.asset_defs
            .get(&asset_id)
            .copied()
            .ok_or(RuntimeError::AssetNotFound { asset_id })
    }

    pub fn asset_params(&self, asset_id: u64) -> Result<&AssetParams, RuntimeError> {
        let creator = self.asset_creator(asset_id)?;
        self.account(creator)?
            .created_asset(asset_id)
            .ok_or(RuntimeError::AssetNotFound { asset_id })
    }

    pub fn asset_params_mut(&mut self, asset_id: u64) -> Result<&mut AssetParams, RuntimeError> {
        let creator = self.asset_creator(asset_id)?;
        self.account_mut(creator)?
            .created_asset_mut(asset_id)
            .ok_or(RuntimeError::AssetNotFound { asset_id })
    }

    /// Drops every account's local state for the given application.
    ///
    /// Deleting an application must not leave dangling opt-ins behind.
    pub fn clear_local_states(&mut self, app_id: u64) {
        for account in self.accounts.values_mut() {
            account.remove_local_state(app_id);
        }
    }

    // =========================
    // Consistency
    // =========================

    /// Verifies the cross-entity consistency rules that must hold after
    /// every accepted transaction group. Used by tests and debug assertions.
    pub fn check_invariants(&self) -> Result<(), RuntimeError> {
        for (&app_id, &creator) in &self.app_defs {
            self.account(creator)?
                .created_app(app_id)
                .ok_or(RuntimeError::AppNotFound { app_id })?;
        }
        for (&asset_id, &creator) in &self.asset_defs {
            self.account(creator)?
                .created_asset(asset_id)
                .ok_or(RuntimeError::AssetNotFound { asset_id })?;
        }
        for account in self.accounts.values() {
            for &asset_id in account.holdings().keys() {
                self.asset_creator(asset_id)?;
            }
            for (&app_id, local) in account.local_states() {
                self.app_creator(app_id)?;
                local.schema.assert_fits(&local.state)?;
            }
            for app in account.created_apps().values() {
                app.global_schema.assert_fits(&app.global_state)?;
            }
            // closed-out accounts keep a zero balance
            if account.balance() > 0 {
                account.assert_min_balance()?;
            }
        }
        Ok(())
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address([b; 32])
    }

    #[test]
    fn account_lookup() {
        let mut world = WorldState::new();
        world.insert_account(Account::new(addr(1), 100_000));
        assert_eq!(world.account(addr(1)).unwrap().balance(), 100_000);
        assert!(matches!(
            world.account(addr(2)),
            Err(RuntimeError::AccountDoesNotExist { .. })
        ));
    }

    #[test]
    fn id_counters_are_monotonic_and_independent() {
        let mut world = WorldState::new();
        assert_eq!(world.next_app_id(), 1);
        assert_eq!(world.next_app_id(), 2);
        assert_eq!(world.next_asset_id(), 1);
        assert_eq!(world.next_asset_id(), 2);
    }

    #[test]
    fn app_lookup_through_creator() {
        let mut world = WorldState::new();
        let creator = addr(1);
        let mut acc = Account::new(creator, 1_000_000);
        acc.add_created_app(
            1,
            AppParams {
                approval_program: "p".into(),
                clear_program: "c".into(),
                creator,
                global_state: Default::default(),
                global_schema: Default::default(),
                local_schema: Default::default(),
            },
        )
        .unwrap();
        world.insert_account(acc);
        world.register_app(1, creator);

        assert_eq!(world.app_creator(1).unwrap(), creator);
        assert_eq!(world.app_params(1).unwrap().approval_program, "p");
        assert!(matches!(
            world.app_params(2),
            Err(RuntimeError::AppNotFound { app_id: 2 })
        ));
    }

    #[test]
    fn invariants_catch_dangling_app_index() {
        let mut world = WorldState::new();
        world.insert_account(Account::new(addr(1), 100_000));
        world.register_app(9, addr(1));
        assert!(world.check_invariants().is_err());
    }

    #[test]
    fn invariants_catch_min_balance_violation() {
        let mut world = WorldState::new();
        world.insert_account(Account::new(addr(1), 1));
        assert!(matches!(
            world.check_invariants(),
            Err(RuntimeError::InsufficientAccountBalance { .. })
        ));
    }

    #[test]
    fn clone_is_a_deep_snapshot() {
        let mut world = WorldState::new();
        world.insert_account(Account::new(addr(1), 100_000));
        let snapshot = world.clone();
        world.account_mut(addr(1)).unwrap().deduct(20_000).unwrap();
        assert_eq!(snapshot.account(addr(1)).unwrap().balance(), 100_000);
        assert_eq!(world.account(addr(1)).unwrap().balance(), 80_000);
    }
}
