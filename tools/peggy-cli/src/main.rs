//! peggy-cli: build and sign Peggy bridge messages.
//!
//! Every subcommand assembles one message, runs its stateless checks and
//! prints it as JSON. Broadcasting is left to the caller.
//!
//! ## Usage
//!
//! ```bash
//! # Queue a transfer to the external chain
//! peggy-cli send-to-eth --from umee1... 0x1111...1111 1000uumee 10uumee
//!
//! # Bind an orchestrator, signing the proof locally
//! peggy-cli set-orchestrator-address umeevaloper1... umee1... 0xabcd... \
//!     --eth-priv-key 0x... --nonce 0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use qc_18_peggy::domain::{batch_digest, sign_delegation, ClaimPayload};
use qc_18_peggy::{
    EthereumEvent, MsgConfirmBatch, MsgDelegateOrchestrator, MsgRequestBatch, MsgSendToExternal,
    MsgSubmitClaim, OutgoingTxBatch, PeggyMsg, PeggyParams,
};
use shared_crypto::{EthSignature, EthSigningKey};
use shared_types::{AccAddress, Coin, EthAddress, ValAddress, U256};

/// Peggy bridge transaction builder
#[derive(Parser, Debug)]
#[command(name = "peggy-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Module parameters as JSON (defaults when omitted)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Queue a transfer to an external address
    SendToEth {
        /// Sending account
        #[arg(long)]
        from: AccAddress,
        /// `0x`-prefixed external destination
        eth_dest: String,
        /// Amount, e.g. `1000uumee`
        amount: Coin,
        /// Bridge fee in the same denom
        bridge_fee: Coin,
    },

    /// Ask the module to batch pooled transfers of a denom
    BuildBatch {
        #[arg(long)]
        from: AccAddress,
        denom: String,
    },

    /// Delegate an orchestrator account and external key for a validator
    SetOrchestratorAddress {
        validator: ValAddress,
        orchestrator: AccAddress,
        eth_address: EthAddress,
        /// Pre-made custody proof (65-byte hex)
        #[arg(long, conflicts_with = "eth_priv_key")]
        orch_eth_sig: Option<EthSignature>,
        /// External private key to sign the proof with
        #[arg(long, requires = "nonce")]
        eth_priv_key: Option<String>,
        /// Current account sequence of the validator
        #[arg(long)]
        nonce: Option<u64>,
    },

    /// Sign the digest of a batch read from a JSON file
    ConfirmBatch {
        #[arg(long)]
        from: AccAddress,
        /// Batch as returned by the pending-batch query
        #[arg(long)]
        batch_file: PathBuf,
        #[arg(long)]
        eth_priv_key: String,
    },

    /// Report a deposit seen on the external chain
    SubmitDepositClaim {
        #[arg(long)]
        from: AccAddress,
        #[arg(long)]
        event_nonce: u64,
        #[arg(long)]
        eth_block_height: u64,
        #[arg(long)]
        eth_sender: EthAddress,
        #[arg(long)]
        token_contract: EthAddress,
        #[arg(long)]
        receiver: AccAddress,
        /// Decimal amount in the token's base unit
        #[arg(long)]
        amount: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let params = load_params(args.params.as_deref())?;
    let msg = build(args.command, &params)?;

    msg.validate_basic()
        .with_context(|| format!("{} failed validation", msg.name()))?;
    info!("[peggy-cli] Built {} for signer {}", msg.name(), msg.signer());

    println!("{}", serde_json::to_string_pretty(&msg)?);
    Ok(())
}

fn load_params(path: Option<&Path>) -> Result<PeggyParams> {
    let Some(path) = path else {
        return Ok(PeggyParams::default());
    };
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let params: PeggyParams =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    params.validate().context("invalid params")?;
    Ok(params)
}

fn build(command: Command, params: &PeggyParams) -> Result<PeggyMsg> {
    let msg = match command {
        Command::SendToEth {
            from,
            eth_dest,
            amount,
            bridge_fee,
        } => PeggyMsg::SendToExternal(MsgSendToExternal {
            sender: from,
            eth_dest,
            amount,
            bridge_fee,
        }),

        Command::BuildBatch { from, denom } => {
            PeggyMsg::RequestBatch(MsgRequestBatch { sender: from, denom })
        }

        Command::SetOrchestratorAddress {
            validator,
            orchestrator,
            eth_address,
            orch_eth_sig,
            eth_priv_key,
            nonce,
        } => {
            let eth_signature = match (orch_eth_sig, eth_priv_key) {
                (Some(sig), _) => sig,
                (None, Some(secret)) => {
                    let key = EthSigningKey::from_hex(&secret).context("bad --eth-priv-key")?;
                    if key.address() != eth_address {
                        bail!("--eth-priv-key controls {}, not {}", key.address(), eth_address);
                    }
                    sign_delegation(&key, &validator, nonce.unwrap_or_default())?
                }
                (None, None) => bail!("either --orch-eth-sig or --eth-priv-key is required"),
            };
            PeggyMsg::DelegateOrchestrator(MsgDelegateOrchestrator {
                validator,
                orchestrator,
                eth_address,
                eth_signature,
            })
        }

        Command::ConfirmBatch {
            from,
            batch_file,
            eth_priv_key,
        } => {
            let raw = fs::read_to_string(&batch_file)
                .with_context(|| format!("reading {}", batch_file.display()))?;
            let batch: OutgoingTxBatch = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", batch_file.display()))?;
            let key = EthSigningKey::from_hex(&eth_priv_key).context("bad --eth-priv-key")?;
            confirm(from, &batch, &key, params)?
        }

        Command::SubmitDepositClaim {
            from,
            event_nonce,
            eth_block_height,
            eth_sender,
            token_contract,
            receiver,
            amount,
        } => {
            let amount = U256::from_dec_str(&amount)
                .map_err(|e| anyhow::anyhow!("bad --amount {amount}: {e:?}"))?;
            PeggyMsg::SubmitClaim(MsgSubmitClaim {
                orchestrator: from,
                event: EthereumEvent {
                    event_nonce,
                    eth_block_height,
                    payload: ClaimPayload::Deposit {
                        eth_sender,
                        token_contract,
                        receiver,
                        amount,
                    },
                },
            })
        }
    };
    Ok(msg)
}

/// Recompute the digest locally and sign it; a batch file whose digest
/// does not match its contents is refused.
fn confirm(
    orchestrator: AccAddress,
    batch: &OutgoingTxBatch,
    key: &EthSigningKey,
    params: &PeggyParams,
) -> Result<PeggyMsg> {
    let digest = batch_digest(&params.peggy_id, &batch.denom, batch.batch_nonce, &batch.transactions);
    if digest != batch.digest {
        bail!(
            "batch {}/{} digest does not match its transactions (peggy_id {})",
            batch.denom,
            batch.batch_nonce,
            params.peggy_id
        );
    }
    debug!("[peggy-cli] Signing batch digest 0x{}", hex::encode(digest));
    Ok(PeggyMsg::ConfirmBatch(MsgConfirmBatch {
        orchestrator,
        denom: batch.denom.clone(),
        batch_nonce: batch.batch_nonce,
        signed_digest: digest,
        signature: key.sign_personal(&digest)?,
    }))
}
