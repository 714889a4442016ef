//! Application and asset state handlers (stateful mode only).
//!
//! Every `_ex`-style read pushes a `did_exist` flag below the value; when
//! the flag is 0 the value is `Uint64(0)`. Account references pop an index:
//! 0 is the transaction sender, 1..N index the transaction's accounts array.

use crate::core::executor::Ctx;
use crate::errors::RuntimeError;
use crate::interpreter::fields::{AssetHoldingField, AssetParamsField};
use crate::interpreter::interpreter::Interpreter;
use crate::ledger::app::assert_valid_key;
use crate::types::value::Value;

impl Interpreter<'_> {
    /// Pops an account index and resolves it to an address.
    fn pop_account(&mut self, ctx: &Ctx) -> Result<crate::types::address::Address, RuntimeError> {
        let index = self.stack.pop_uint64()?;
        ctx.address_by_index(index)
    }

    /// Pushes the missing-entry result: flag 0 below `Uint64(0)`.
    fn push_missing(&mut self) -> Result<(), RuntimeError> {
        self.stack.push(Value::Uint64(0))?;
        self.stack.push(Value::Uint64(0))
    }

    fn push_found(&mut self, value: Value) -> Result<(), RuntimeError> {
        self.stack.push(Value::Uint64(1))?;
        self.stack.push(value)
    }

    pub(crate) fn op_app_opted_in(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_opted_in")?;
        let app_id = self.stack.pop_uint64()?;
        let address = self.pop_account(ctx)?;
        let opted = ctx.state.account(address)?.local_state(app_id).is_some();
        self.stack.push(Value::from_bool(opted))
    }

    pub(crate) fn op_app_local_get(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_local_get")?;
        let key = self.stack.pop_bytes()?;
        let address = self.pop_account(ctx)?;
        let value = ctx
            .state
            .account(address)?
            .local_state(ctx.app_id)
            .and_then(|local| local.state.get(&key).cloned())
            .unwrap_or(Value::Uint64(0));
        self.stack.push(value)
    }

    pub(crate) fn op_app_local_get_ex(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_local_get_ex")?;
        let key = self.stack.pop_bytes()?;
        let app_id = self.stack.pop_uint64()?;
        let address = self.pop_account(ctx)?;
        let value = ctx
            .state
            .account(address)?
            .local_state(app_id)
            .and_then(|local| local.state.get(&key).cloned());
        match value {
            Some(v) => self.push_found(v),
            None => self.push_missing(),
        }
    }

    pub(crate) fn op_app_global_get(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_global_get")?;
        let key = self.stack.pop_bytes()?;
        let value = ctx
            .state
            .app_params(ctx.app_id)?
            .global_state
            .get(&key)
            .cloned()
            .unwrap_or(Value::Uint64(0));
        self.stack.push(value)
    }

    /// The popped application reference is a foreign-apps offset: 0 is the
    /// current application, i references `apfa[i-1]`.
    pub(crate) fn op_app_global_get_ex(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_global_get_ex")?;
        let key = self.stack.pop_bytes()?;
        let offset = self.stack.pop_uint64()?;
        let app_id = if offset == 0 {
            ctx.app_id
        } else {
            *ctx.tx()
                .apfa
                .get(offset as usize - 1)
                .ok_or(RuntimeError::IndexOutOfBound {
                    index: offset,
                    len: ctx.tx().apfa.len() + 1,
                })?
        };
        let value = ctx
            .state
            .app_params(app_id)
            .ok()
            .and_then(|app| app.global_state.get(&key).cloned());
        match value {
            Some(v) => self.push_found(v),
            None => self.push_missing(),
        }
    }

    pub(crate) fn op_app_local_put(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_local_put")?;
        let value = self.stack.pop()?;
        let key = self.stack.pop_bytes()?;
        let address = self.pop_account(ctx)?;
        assert_valid_key(&key)?;

        let app_id = ctx.app_id;
        let account = ctx.state.account_mut(address)?;
        let local = account
            .local_state_mut(app_id)
            .ok_or(RuntimeError::InvalidTransactionParams {
                reason: format!("account {} is not opted in to application {}", address, app_id),
            })?;
        local.state.insert(key, value);
        local.schema.assert_fits(&local.state)
    }

    pub(crate) fn op_app_global_put(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_global_put")?;
        let value = self.stack.pop()?;
        let key = self.stack.pop_bytes()?;
        assert_valid_key(&key)?;

        let app = ctx.state.app_params_mut(ctx.app_id)?;
        app.global_state.insert(key, value);
        app.global_schema.assert_fits(&app.global_state)
    }

    pub(crate) fn op_app_local_del(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_local_del")?;
        let key = self.stack.pop_bytes()?;
        let address = self.pop_account(ctx)?;
        let app_id = ctx.app_id;
        if let Some(local) = ctx.state.account_mut(address)?.local_state_mut(app_id) {
            local.state.remove(&key);
        }
        Ok(())
    }

    pub(crate) fn op_app_global_del(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("app_global_del")?;
        let key = self.stack.pop_bytes()?;
        let app = ctx.state.app_params_mut(ctx.app_id)?;
        app.global_state.remove(&key);
        Ok(())
    }

    pub(crate) fn op_balance(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("balance")?;
        let address = self.pop_account(ctx)?;
        let balance = ctx.state.account(address)?.balance();
        self.stack.push(Value::Uint64(balance))
    }

    pub(crate) fn op_min_balance(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        self.assert_stateful("min_balance")?;
        let address = self.pop_account(ctx)?;
        let min_balance = ctx.state.account(address)?.min_balance();
        self.stack.push(Value::Uint64(min_balance))
    }

    /// Pops (asset id, account index) and pushes the holding field with a
    /// did_exist flag below it.
    pub(crate) fn op_asset_holding_get(
        &mut self,
        field: AssetHoldingField,
        ctx: &mut Ctx,
    ) -> Result<(), RuntimeError> {
        self.assert_stateful("asset_holding_get")?;
        let asset_id = self.stack.pop_uint64()?;
        let address = self.pop_account(ctx)?;
        match ctx.state.account(address)?.holding(asset_id) {
            Some(holding) => {
                let value = match field {
                    AssetHoldingField::AssetBalance => Value::Uint64(holding.amount),
                    AssetHoldingField::AssetFrozen => Value::Uint64(holding.frozen as u64),
                };
                self.push_found(value)
            }
            None => self.push_missing(),
        }
    }

    /// Pops a foreign-assets array index and pushes the asset parameter
    /// with a did_exist flag below it.
    pub(crate) fn op_asset_params_get(
        &mut self,
        field: AssetParamsField,
        ctx: &mut Ctx,
    ) -> Result<(), RuntimeError> {
        self.assert_stateful("asset_params_get")?;
        let offset = self.stack.pop_uint64()?;
        let asset_id = *ctx
            .tx()
            .apas
            .get(offset as usize)
            .ok_or(RuntimeError::IndexOutOfBound {
                index: offset,
                len: ctx.tx().apas.len(),
            })?;
        match ctx.state.asset_params(asset_id) {
            Ok(params) => {
                let value = match field {
                    AssetParamsField::AssetTotal => Value::Uint64(params.total),
                    AssetParamsField::AssetDecimals => Value::Uint64(params.decimals as u64),
                    AssetParamsField::AssetDefaultFrozen => {
                        Value::Uint64(params.default_frozen as u64)
                    }
                    AssetParamsField::AssetUnitName => {
                        Value::Bytes(params.unit_name.as_bytes().to_vec())
                    }
                    AssetParamsField::AssetName => {
                        Value::Bytes(params.asset_name.as_bytes().to_vec())
                    }
                    AssetParamsField::AssetURL => Value::Bytes(params.url.as_bytes().to_vec()),
                    AssetParamsField::AssetMetadataHash => {
                        Value::Bytes(params.metadata_hash.to_vec())
                    }
                    AssetParamsField::AssetManager => Value::Bytes(params.manager.to_vec()),
                    AssetParamsField::AssetReserve => Value::Bytes(params.reserve.to_vec()),
                    AssetParamsField::AssetFreeze => Value::Bytes(params.freeze.to_vec()),
                    AssetParamsField::AssetClawback => Value::Bytes(params.clawback.to_vec()),
                };
                self.push_found(value)
            }
            Err(_) => self.push_missing(),
        }
    }
}
