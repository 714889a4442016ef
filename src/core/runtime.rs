//! The runtime façade owning the canonical world state.
//!
//! `execute_tx` is the central entry point: it lowers caller parameters into
//! encoded transactions, assigns the group id, validates signatures and
//! validity windows, debits fees, dispatches each payload, and finally swaps
//! the transient state in. Entity helpers (`create_asset`, `add_app`, …)
//! are thin wrappers that submit one-transaction groups.

use crate::core::executor::Ctx;
use crate::core::transaction::{
    assign_group_id, AppCallArgs, ExecTx, PayFlags, Sign, TxParams,
};
use crate::core::{MAX_GROUP_SIZE, MAX_TXN_LIFE, MIN_TXN_FEE};
use crate::crypto::logic_sig::LogicSig;
use crate::errors::RuntimeError;
use crate::ledger::account::Account;
use crate::ledger::app::AppParams;
use crate::ledger::asset::{AssetHolding, AssetModFields, AssetParams};
use crate::ledger::world::WorldState;
use crate::types::address::Address;
use crate::types::value::Value;
use crate::{info, warn};

/// Deterministic execution runtime over a synthetic world state.
pub struct Runtime {
    world: WorldState,
}

impl Runtime {
    /// Creates a runtime seeded with the given accounts.
    pub fn new(accounts: Vec<Account>) -> Runtime {
        let mut world = WorldState::new();
        for account in accounts {
            world.insert_account(account);
        }
        Runtime { world }
    }

    /// Injects the round visible via `global Round`.
    pub fn set_round(&mut self, round: u64) {
        self.world.round = round;
    }

    /// Injects the timestamp visible via `global LatestTimestamp`.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.world.timestamp = timestamp;
    }

    /// Read access to the canonical world state.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Adds an account to the canonical state.
    pub fn add_account(&mut self, account: Account) {
        self.world.insert_account(account);
    }

    // =========================
    // Group execution
    // =========================

    /// Executes a transaction group atomically. See the module docs for the
    /// phase ordering.
    pub fn execute_tx(&mut self, txs: Vec<ExecTx>) -> Result<(), RuntimeError> {
        self.execute_tx_with_args(txs, &[])
    }

    /// Like [`Runtime::execute_tx`], with arguments that override each
    /// logic signature's own argument list.
    pub fn execute_tx_with_args(
        &mut self,
        txs: Vec<ExecTx>,
        program_args: &[Vec<u8>],
    ) -> Result<(), RuntimeError> {
        if txs.is_empty() || txs.len() > MAX_GROUP_SIZE {
            return Err(RuntimeError::InvalidTransactionParams {
                reason: format!(
                    "group of {} transactions outside 1..={}",
                    txs.len(),
                    MAX_GROUP_SIZE
                ),
            });
        }

        let mut encoded: Vec<_> = txs
            .iter()
            .map(|tx| tx.params.to_encoded(&tx.flags))
            .collect();
        assign_group_id(&mut encoded);

        let mut ctx = Ctx::new(self.world.clone(), encoded);
        let result = Self::apply_group(&mut ctx, &txs, program_args);
        match result {
            Ok(()) => {
                self.world = ctx.state;
                info!("committed group of {} transaction(s)", txs.len());
                Ok(())
            }
            Err(e) => {
                warn!("rejected group: {}", e);
                Err(e)
            }
        }
    }

    /// Pre-flight, fees, and dispatch against the transient context.
    fn apply_group(
        ctx: &mut Ctx,
        txs: &[ExecTx],
        program_args: &[Vec<u8>],
    ) -> Result<(), RuntimeError> {
        for (index, tx) in txs.iter().enumerate() {
            ctx.tx_index = index;
            Self::validate_common(ctx, index)?;
            Self::validate_signature(ctx, tx, program_args)?;
        }

        // fees for the whole group are charged before any payload executes
        for index in 0..txs.len() {
            ctx.deduct_fee(index)?;
        }

        for (index, tx) in txs.iter().enumerate() {
            ctx.tx_index = index;
            ctx.execute_params(&tx.params)?;
        }
        Ok(())
    }

    /// Sender resolution, fee floor, and validity-window checks.
    fn validate_common(ctx: &Ctx, index: usize) -> Result<(), RuntimeError> {
        let tx = &ctx.gtxs[index];
        ctx.state.account(tx.snd)?;

        if tx.fee < MIN_TXN_FEE {
            return Err(RuntimeError::InvalidTransactionParams {
                reason: format!("fee {} below the minimum of {}", tx.fee, MIN_TXN_FEE),
            });
        }

        if tx.fv != 0 || tx.lv != 0 {
            let round = ctx.state.round;
            if tx.fv > tx.lv || tx.lv - tx.fv > MAX_TXN_LIFE {
                return Err(RuntimeError::InvalidTransactionParams {
                    reason: format!("invalid validity window {}..={}", tx.fv, tx.lv),
                });
            }
            if round < tx.fv || round > tx.lv {
                return Err(RuntimeError::InvalidRound {
                    round,
                    first: tx.fv,
                    last: tx.lv,
                });
            }
        }
        Ok(())
    }

    /// Authorization checks: a secret key must resolve to the sender;
    /// a logic signature must validate for the sender and its program must
    /// accept under the stateless interpreter; carrying both is ambiguous.
    fn validate_signature(
        ctx: &mut Ctx,
        tx: &ExecTx,
        program_args: &[Vec<u8>],
    ) -> Result<(), RuntimeError> {
        let sender = tx.params.sender();
        match &tx.sign {
            None => Ok(()),
            Some(Sign::Secret(key)) => {
                if key.address() != sender {
                    return Err(RuntimeError::InvalidTransactionParams {
                        reason: "secret key does not resolve to the sender account".to_string(),
                    });
                }
                Ok(())
            }
            Some(Sign::Lsig(lsig)) => {
                lsig.verify(sender)?;
                ctx.run_logic_sig(lsig, program_args)
            }
            Some(Sign::SecretKeyAndLsig(..)) => Err(RuntimeError::InvalidTransactionParams {
                reason: "transaction carries both a secret key and a logic signature".to_string(),
            }),
        }
    }

    // =========================
    // Entity helpers
    // =========================

    /// Creates an asset and returns its id.
    pub fn create_asset(
        &mut self,
        creator: Address,
        params: AssetParams,
        flags: PayFlags,
    ) -> Result<u64, RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::DeployAsset {
                from: creator,
                params,
            },
            flags,
        )])?;
        Ok(self.world.last_asset_id())
    }

    /// Opts an account in to an asset.
    pub fn opt_in_to_asa(
        &mut self,
        asset_id: u64,
        address: Address,
        flags: PayFlags,
    ) -> Result<(), RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::OptInToAsset {
                from: address,
                asset_id,
            },
            flags,
        )])
    }

    /// Reconfigures an asset's role addresses.
    pub fn modify_asset(
        &mut self,
        sender: Address,
        asset_id: u64,
        fields: AssetModFields,
        flags: PayFlags,
    ) -> Result<(), RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::ModifyAsset {
                from: sender,
                asset_id,
                fields,
            },
            flags,
        )])
    }

    /// Freezes or unfreezes a holding.
    pub fn freeze_asset(
        &mut self,
        sender: Address,
        asset_id: u64,
        target: Address,
        frozen: bool,
        flags: PayFlags,
    ) -> Result<(), RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::FreezeAsset {
                from: sender,
                asset_id,
                target,
                frozen,
            },
            flags,
        )])
    }

    /// Claws back `amount` of an asset from `target` to `receiver`.
    pub fn revoke_asset(
        &mut self,
        receiver: Address,
        revoker: Address,
        asset_id: u64,
        target: Address,
        amount: u64,
        flags: PayFlags,
    ) -> Result<(), RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::RevokeAsset {
                revoker,
                asset_id,
                target,
                receiver,
                amount,
            },
            flags,
        )])
    }

    /// Destroys an asset whose supply has returned to its creator.
    pub fn destroy_asset(
        &mut self,
        sender: Address,
        asset_id: u64,
        flags: PayFlags,
    ) -> Result<(), RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::DestroyAsset {
                from: sender,
                asset_id,
            },
            flags,
        )])
    }

    /// Creates an application and returns its id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_app(
        &mut self,
        sender: Address,
        global_schema: crate::ledger::app::StateSchema,
        local_schema: crate::ledger::app::StateSchema,
        approval_src: &str,
        clear_src: &str,
        call: AppCallArgs,
        flags: PayFlags,
    ) -> Result<u64, RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::DeployApp {
                from: sender,
                approval_src: approval_src.to_string(),
                clear_src: clear_src.to_string(),
                global_schema,
                local_schema,
                call,
            },
            flags,
        )])?;
        Ok(self.world.last_app_id())
    }

    /// Opts an account in to an application.
    pub fn opt_in_to_app(
        &mut self,
        address: Address,
        app_id: u64,
        call: AppCallArgs,
        flags: PayFlags,
    ) -> Result<(), RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::OptInToApp {
                from: address,
                app_id,
                call,
            },
            flags,
        )])
    }

    /// Replaces an application's programs after its approval program
    /// accepts the update call.
    #[allow(clippy::too_many_arguments)]
    pub fn update_app(
        &mut self,
        sender: Address,
        app_id: u64,
        approval_src: &str,
        clear_src: &str,
        call: AppCallArgs,
        flags: PayFlags,
    ) -> Result<(), RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::UpdateApp {
                from: sender,
                app_id,
                approval_src: approval_src.to_string(),
                clear_src: clear_src.to_string(),
                call,
            },
            flags,
        )])
    }

    /// Deletes an application after its approval program accepts the
    /// delete call.
    pub fn delete_app(
        &mut self,
        sender: Address,
        app_id: u64,
        call: AppCallArgs,
        flags: PayFlags,
    ) -> Result<(), RuntimeError> {
        self.execute_tx(vec![ExecTx::new(
            TxParams::DeleteApp {
                from: sender,
                app_id,
                call,
            },
            flags,
        )])
    }

    /// Builds an unsigned (contract-mode) logic signature.
    pub fn get_logic_sig(&self, source: &str, args: Vec<Vec<u8>>) -> LogicSig {
        LogicSig::new(source, args)
    }

    // =========================
    // Accessors
    // =========================

    pub fn get_account(&self, address: Address) -> Result<&Account, RuntimeError> {
        self.world.account(address)
    }

    pub fn get_app(&self, app_id: u64) -> Result<&AppParams, RuntimeError> {
        self.world.app_params(app_id)
    }

    pub fn get_asset_def(&self, asset_id: u64) -> Result<&AssetParams, RuntimeError> {
        self.world.asset_params(asset_id)
    }

    pub fn get_asset_holding(
        &self,
        asset_id: u64,
        address: Address,
    ) -> Result<AssetHolding, RuntimeError> {
        self.world
            .account(address)?
            .holding(asset_id)
            .copied()
            .ok_or(RuntimeError::AsaNotOptin {
                asset_id,
                address: address.encode(),
            })
    }

    pub fn get_global_state(&self, app_id: u64, key: &[u8]) -> Option<Value> {
        self.world
            .app_params(app_id)
            .ok()?
            .global_state
            .get(key)
            .cloned()
    }

    pub fn get_local_state(&self, app_id: u64, address: Address, key: &[u8]) -> Option<Value> {
        self.world
            .account(address)
            .ok()?
            .local_state(app_id)?
            .state
            .get(key)
            .cloned()
    }
}
