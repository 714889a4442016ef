//! Transaction model: encoded transactions and caller-facing parameters.
//!
//! The encoded form (short field keys, mirroring the wire representation) is
//! the canonical representation inside the interpreter, so `txn` field
//! introspection is a single lookup. Callers describe work with the
//! [`TxParams`] sum and the engine lowers it into [`EncodedTx`] records.

use crate::core::MIN_TXN_FEE;
use crate::crypto::key_pair::PrivateKey;
use crate::crypto::logic_sig::LogicSig;
use crate::ledger::app::StateSchema;
use crate::ledger::asset::{AssetModFields, AssetParams};
use crate::types::address::Address;
use sha2::{Digest, Sha512_256};

/// Transaction type tag (`type` field of the encoded form).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxType {
    Pay,
    KeyReg,
    AssetConfig,
    AssetTransfer,
    AssetFreeze,
    AppCall,
}

impl TxType {
    /// Short string tag used in the encoded form.
    pub fn tag(&self) -> &'static str {
        match self {
            TxType::Pay => "pay",
            TxType::KeyReg => "keyreg",
            TxType::AssetConfig => "acfg",
            TxType::AssetTransfer => "axfer",
            TxType::AssetFreeze => "afrz",
            TxType::AppCall => "appl",
        }
    }

    /// Numeric form surfaced by the `TypeEnum` transaction field.
    pub fn type_enum(&self) -> u64 {
        match self {
            TxType::Pay => 1,
            TxType::KeyReg => 2,
            TxType::AssetConfig => 3,
            TxType::AssetTransfer => 4,
            TxType::AssetFreeze => 5,
            TxType::AppCall => 6,
        }
    }
}

/// Application-call completion kind (`apan` field).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnComplete {
    NoOp = 0,
    OptIn = 1,
    CloseOut = 2,
    ClearState = 3,
    UpdateApplication = 4,
    DeleteApplication = 5,
}

/// A transaction in its canonical encoded form.
///
/// Every variant shares the record; fields irrelevant to the `typ` tag keep
/// their zero values. The `txid` is sealed before group assignment so group
/// membership does not perturb transaction identity.
#[derive(Clone, Debug)]
pub struct EncodedTx {
    // common
    pub snd: Address,
    pub fee: u64,
    pub fv: u64,
    pub lv: u64,
    pub note: Vec<u8>,
    pub lx: [u8; 32],
    pub typ: TxType,
    pub grp: Option<[u8; 32]>,
    pub rekey: Option<Address>,
    /// Sealed transaction id.
    pub txid: [u8; 32],
    /// Position within the submitted group.
    pub group_index: u64,

    // pay
    pub rcv: Option<Address>,
    pub amt: u64,
    pub close: Option<Address>,

    // keyreg
    pub votekey: Vec<u8>,
    pub selkey: Vec<u8>,
    pub votefst: u64,
    pub votelst: u64,
    pub votekd: u64,

    // acfg
    pub caid: u64,
    pub apar: Option<AssetParams>,

    // axfer
    pub xaid: u64,
    pub aamt: u64,
    pub asnd: Option<Address>,
    pub arcv: Option<Address>,
    pub aclose: Option<Address>,

    // afrz
    pub faid: u64,
    pub fadd: Option<Address>,
    pub afrz: bool,

    // appl
    pub apid: u64,
    pub apan: OnComplete,
    pub apaa: Vec<Vec<u8>>,
    pub apat: Vec<Address>,
    pub apfa: Vec<u64>,
    pub apas: Vec<u64>,
    pub apap: String,
    pub apsu: String,
    pub apgs: StateSchema,
    pub apls: StateSchema,
}

impl EncodedTx {
    /// Creates an empty record of the given type for the given sender.
    pub fn new(typ: TxType, snd: Address) -> EncodedTx {
        EncodedTx {
            snd,
            fee: 0,
            fv: 0,
            lv: 0,
            note: Vec::new(),
            lx: [0; 32],
            typ,
            grp: None,
            rekey: None,
            txid: [0; 32],
            group_index: 0,
            rcv: None,
            amt: 0,
            close: None,
            votekey: Vec::new(),
            selkey: Vec::new(),
            votefst: 0,
            votelst: 0,
            votekd: 0,
            caid: 0,
            apar: None,
            xaid: 0,
            aamt: 0,
            asnd: None,
            arcv: None,
            aclose: None,
            faid: 0,
            fadd: None,
            afrz: false,
            apid: 0,
            apan: OnComplete::NoOp,
            apaa: Vec::new(),
            apat: Vec::new(),
            apfa: Vec::new(),
            apas: Vec::new(),
            apap: String::new(),
            apsu: String::new(),
            apgs: StateSchema::default(),
            apls: StateSchema::default(),
        }
    }

    /// Deterministic field encoding used for transaction ids.
    ///
    /// Fixed field order, little-endian integers, length-prefixed
    /// variable-size fields, one tag byte per optional field.
    fn encode(&self, out: &mut Vec<u8>) {
        fn put_u64(out: &mut Vec<u8>, v: u64) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        fn put_bytes(out: &mut Vec<u8>, v: &[u8]) {
            put_u64(out, v.len() as u64);
            out.extend_from_slice(v);
        }
        fn put_opt_addr(out: &mut Vec<u8>, v: &Option<Address>) {
            match v {
                Some(a) => {
                    out.push(1);
                    out.extend_from_slice(a.as_slice());
                }
                None => out.push(0),
            }
        }

        out.extend_from_slice(self.snd.as_slice());
        put_u64(out, self.fee);
        put_u64(out, self.fv);
        put_u64(out, self.lv);
        put_bytes(out, &self.note);
        out.extend_from_slice(&self.lx);
        put_bytes(out, self.typ.tag().as_bytes());
        put_opt_addr(out, &self.rekey);

        put_opt_addr(out, &self.rcv);
        put_u64(out, self.amt);
        put_opt_addr(out, &self.close);

        put_bytes(out, &self.votekey);
        put_bytes(out, &self.selkey);
        put_u64(out, self.votefst);
        put_u64(out, self.votelst);
        put_u64(out, self.votekd);

        put_u64(out, self.caid);
        match &self.apar {
            Some(p) => {
                out.push(1);
                put_u64(out, p.total);
                put_u64(out, p.decimals as u64);
                out.push(p.default_frozen as u8);
                put_bytes(out, p.unit_name.as_bytes());
                put_bytes(out, p.asset_name.as_bytes());
                put_bytes(out, p.url.as_bytes());
                out.extend_from_slice(&p.metadata_hash);
                out.extend_from_slice(p.manager.as_slice());
                out.extend_from_slice(p.reserve.as_slice());
                out.extend_from_slice(p.freeze.as_slice());
                out.extend_from_slice(p.clawback.as_slice());
            }
            None => out.push(0),
        }

        put_u64(out, self.xaid);
        put_u64(out, self.aamt);
        put_opt_addr(out, &self.asnd);
        put_opt_addr(out, &self.arcv);
        put_opt_addr(out, &self.aclose);

        put_u64(out, self.faid);
        put_opt_addr(out, &self.fadd);
        out.push(self.afrz as u8);

        put_u64(out, self.apid);
        put_u64(out, self.apan as u64);
        put_u64(out, self.apaa.len() as u64);
        for arg in &self.apaa {
            put_bytes(out, arg);
        }
        put_u64(out, self.apat.len() as u64);
        for addr in &self.apat {
            out.extend_from_slice(addr.as_slice());
        }
        put_u64(out, self.apfa.len() as u64);
        for id in &self.apfa {
            put_u64(out, *id);
        }
        put_u64(out, self.apas.len() as u64);
        for id in &self.apas {
            put_u64(out, *id);
        }
        put_bytes(out, self.apap.as_bytes());
        put_bytes(out, self.apsu.as_bytes());
        put_u64(out, self.apgs.num_uint);
        put_u64(out, self.apgs.num_byte_slice);
        put_u64(out, self.apls.num_uint);
        put_u64(out, self.apls.num_byte_slice);
    }

    /// Computes and stores the transaction id over the current field values.
    pub fn seal(&mut self) {
        let mut payload = Vec::with_capacity(256);
        self.encode(&mut payload);
        let mut hasher = Sha512_256::new();
        hasher.update(b"TX");
        hasher.update(&payload);
        self.txid = hasher.finalize().into();
    }
}

/// Computes a deterministic group id and stores it into every transaction.
///
/// Applied to every group of size greater than one before execution, so
/// programs observe a consistent `grp` across the whole group. Also records
/// each transaction's position for the `GroupIndex` field.
pub fn assign_group_id(txs: &mut [EncodedTx]) {
    for (index, tx) in txs.iter_mut().enumerate() {
        tx.group_index = index as u64;
    }
    if txs.len() < 2 {
        return;
    }
    let mut hasher = Sha512_256::new();
    hasher.update(b"TG");
    for tx in txs.iter() {
        hasher.update(tx.txid);
    }
    let gid: [u8; 32] = hasher.finalize().into();
    for tx in txs.iter_mut() {
        tx.grp = Some(gid);
    }
}

/// Common transaction parameters supplied by the caller ("pay flags").
#[derive(Clone, Debug)]
pub struct PayFlags {
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub note: Vec<u8>,
    pub lease: [u8; 32],
    pub rekey_to: Option<Address>,
    /// For payments: close the sender out to this account.
    pub close_to: Option<Address>,
}

impl Default for PayFlags {
    fn default() -> Self {
        PayFlags {
            fee: MIN_TXN_FEE,
            first_valid: 0,
            last_valid: 0,
            note: Vec::new(),
            lease: [0; 32],
            rekey_to: None,
            close_to: None,
        }
    }
}

/// Arrays and arguments attached to an application call.
#[derive(Clone, Debug, Default)]
pub struct AppCallArgs {
    pub app_args: Vec<Vec<u8>>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
}

/// How a transaction is authorized.
///
/// `SecretKeyAndLsig` represents ambiguous signing material and is always
/// rejected in pre-flight. A transaction submitted without a `Sign` is
/// treated as caller-authorized (the runtime is an off-chain harness).
#[derive(Clone)]
pub enum Sign {
    /// Plain signature: the key must resolve to the sender account.
    Secret(PrivateKey),
    /// Logic signature: validated and executed under the stateless
    /// interpreter.
    Lsig(LogicSig),
    /// Both kinds at once; rejected as ambiguous.
    SecretKeyAndLsig(PrivateKey, LogicSig),
}

/// Caller-facing description of one transaction's payload.
#[derive(Clone, Debug)]
pub enum TxParams {
    TransferAlgo {
        from: Address,
        to: Address,
        amount: u64,
    },
    TransferAsset {
        from: Address,
        to: Address,
        asset_id: u64,
        amount: u64,
        close_to: Option<Address>,
    },
    RevokeAsset {
        revoker: Address,
        asset_id: u64,
        target: Address,
        receiver: Address,
        amount: u64,
    },
    ModifyAsset {
        from: Address,
        asset_id: u64,
        fields: AssetModFields,
    },
    FreezeAsset {
        from: Address,
        asset_id: u64,
        target: Address,
        frozen: bool,
    },
    DestroyAsset {
        from: Address,
        asset_id: u64,
    },
    DeployAsset {
        from: Address,
        params: AssetParams,
    },
    OptInToAsset {
        from: Address,
        asset_id: u64,
    },
    DeployApp {
        from: Address,
        approval_src: String,
        clear_src: String,
        global_schema: StateSchema,
        local_schema: StateSchema,
        call: AppCallArgs,
    },
    OptInToApp {
        from: Address,
        app_id: u64,
        call: AppCallArgs,
    },
    CallApp {
        from: Address,
        app_id: u64,
        call: AppCallArgs,
    },
    CloseApp {
        from: Address,
        app_id: u64,
        call: AppCallArgs,
    },
    ClearApp {
        from: Address,
        app_id: u64,
        call: AppCallArgs,
    },
    UpdateApp {
        from: Address,
        app_id: u64,
        approval_src: String,
        clear_src: String,
        call: AppCallArgs,
    },
    DeleteApp {
        from: Address,
        app_id: u64,
        call: AppCallArgs,
    },
    KeyRegistration {
        from: Address,
        vote_key: Vec<u8>,
        selection_key: Vec<u8>,
        vote_first: u64,
        vote_last: u64,
        vote_key_dilution: u64,
    },
}

impl TxParams {
    /// Sender account of this transaction.
    pub fn sender(&self) -> Address {
        match self {
            TxParams::TransferAlgo { from, .. }
            | TxParams::TransferAsset { from, .. }
            | TxParams::ModifyAsset { from, .. }
            | TxParams::FreezeAsset { from, .. }
            | TxParams::DestroyAsset { from, .. }
            | TxParams::DeployAsset { from, .. }
            | TxParams::OptInToAsset { from, .. }
            | TxParams::DeployApp { from, .. }
            | TxParams::OptInToApp { from, .. }
            | TxParams::CallApp { from, .. }
            | TxParams::CloseApp { from, .. }
            | TxParams::ClearApp { from, .. }
            | TxParams::UpdateApp { from, .. }
            | TxParams::DeleteApp { from, .. }
            | TxParams::KeyRegistration { from, .. } => *from,
            TxParams::RevokeAsset { revoker, .. } => *revoker,
        }
    }

    /// Lowers the parameters into the canonical encoded form.
    pub fn to_encoded(&self, flags: &PayFlags) -> EncodedTx {
        let mut tx = match self {
            TxParams::TransferAlgo { from, to, amount } => {
                let mut tx = EncodedTx::new(TxType::Pay, *from);
                tx.rcv = Some(*to);
                tx.amt = *amount;
                tx.close = flags.close_to;
                tx
            }
            TxParams::TransferAsset {
                from,
                to,
                asset_id,
                amount,
                close_to,
            } => {
                let mut tx = EncodedTx::new(TxType::AssetTransfer, *from);
                tx.xaid = *asset_id;
                tx.aamt = *amount;
                tx.arcv = Some(*to);
                tx.aclose = *close_to;
                tx
            }
            TxParams::RevokeAsset {
                revoker,
                asset_id,
                target,
                receiver,
                amount,
            } => {
                let mut tx = EncodedTx::new(TxType::AssetTransfer, *revoker);
                tx.xaid = *asset_id;
                tx.aamt = *amount;
                tx.asnd = Some(*target);
                tx.arcv = Some(*receiver);
                tx
            }
            TxParams::ModifyAsset {
                from,
                asset_id,
                fields,
            } => {
                let mut tx = EncodedTx::new(TxType::AssetConfig, *from);
                tx.caid = *asset_id;
                tx.apar = Some(AssetParams {
                    total: 0,
                    decimals: 0,
                    default_frozen: false,
                    unit_name: String::new(),
                    asset_name: String::new(),
                    url: String::new(),
                    metadata_hash: [0; 32],
                    manager: fields.manager.unwrap_or(Address::zero()),
                    reserve: fields.reserve.unwrap_or(Address::zero()),
                    freeze: fields.freeze.unwrap_or(Address::zero()),
                    clawback: fields.clawback.unwrap_or(Address::zero()),
                });
                tx
            }
            TxParams::FreezeAsset {
                from,
                asset_id,
                target,
                frozen,
            } => {
                let mut tx = EncodedTx::new(TxType::AssetFreeze, *from);
                tx.faid = *asset_id;
                tx.fadd = Some(*target);
                tx.afrz = *frozen;
                tx
            }
            TxParams::DestroyAsset { from, asset_id } => {
                let mut tx = EncodedTx::new(TxType::AssetConfig, *from);
                tx.caid = *asset_id;
                tx
            }
            TxParams::DeployAsset { from, params } => {
                let mut tx = EncodedTx::new(TxType::AssetConfig, *from);
                tx.apar = Some(params.clone());
                tx
            }
            TxParams::OptInToAsset { from, asset_id } => {
                let mut tx = EncodedTx::new(TxType::AssetTransfer, *from);
                tx.xaid = *asset_id;
                tx.arcv = Some(*from);
                tx
            }
            TxParams::DeployApp {
                from,
                approval_src,
                clear_src,
                global_schema,
                local_schema,
                call,
            } => {
                let mut tx = Self::app_call_tx(*from, 0, OnComplete::NoOp, call);
                tx.apap = approval_src.clone();
                tx.apsu = clear_src.clone();
                tx.apgs = *global_schema;
                tx.apls = *local_schema;
                tx
            }
            TxParams::OptInToApp { from, app_id, call } => {
                Self::app_call_tx(*from, *app_id, OnComplete::OptIn, call)
            }
            TxParams::CallApp { from, app_id, call } => {
                Self::app_call_tx(*from, *app_id, OnComplete::NoOp, call)
            }
            TxParams::CloseApp { from, app_id, call } => {
                Self::app_call_tx(*from, *app_id, OnComplete::CloseOut, call)
            }
            TxParams::ClearApp { from, app_id, call } => {
                Self::app_call_tx(*from, *app_id, OnComplete::ClearState, call)
            }
            TxParams::UpdateApp {
                from,
                app_id,
                approval_src,
                clear_src,
                call,
            } => {
                let mut tx = Self::app_call_tx(*from, *app_id, OnComplete::UpdateApplication, call);
                tx.apap = approval_src.clone();
                tx.apsu = clear_src.clone();
                tx
            }
            TxParams::DeleteApp { from, app_id, call } => {
                Self::app_call_tx(*from, *app_id, OnComplete::DeleteApplication, call)
            }
            TxParams::KeyRegistration {
                from,
                vote_key,
                selection_key,
                vote_first,
                vote_last,
                vote_key_dilution,
            } => {
                let mut tx = EncodedTx::new(TxType::KeyReg, *from);
                tx.votekey = vote_key.clone();
                tx.selkey = selection_key.clone();
                tx.votefst = *vote_first;
                tx.votelst = *vote_last;
                tx.votekd = *vote_key_dilution;
                tx
            }
        };

        tx.fee = flags.fee;
        tx.fv = flags.first_valid;
        tx.lv = flags.last_valid;
        tx.note = flags.note.clone();
        tx.lx = flags.lease;
        tx.rekey = flags.rekey_to;
        tx.seal();
        tx
    }

    fn app_call_tx(
        from: Address,
        app_id: u64,
        apan: OnComplete,
        call: &AppCallArgs,
    ) -> EncodedTx {
        let mut tx = EncodedTx::new(TxType::AppCall, from);
        tx.apid = app_id;
        tx.apan = apan;
        tx.apaa = call.app_args.clone();
        tx.apat = call.accounts.clone();
        tx.apfa = call.foreign_apps.clone();
        tx.apas = call.foreign_assets.clone();
        tx
    }
}

/// One transaction as submitted to the engine: payload, authorization, and
/// common parameters.
#[derive(Clone)]
pub struct ExecTx {
    pub params: TxParams,
    pub sign: Option<Sign>,
    pub flags: PayFlags,
}

impl ExecTx {
    /// Caller-authorized transaction with the given payload and flags.
    pub fn new(params: TxParams, flags: PayFlags) -> ExecTx {
        ExecTx {
            params,
            sign: None,
            flags,
        }
    }

    /// Attaches authorization material.
    pub fn signed(mut self, sign: Sign) -> ExecTx {
        self.sign = Some(sign);
        self
    }
}
