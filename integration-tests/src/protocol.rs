use aggregation_hook::AggregationHook;
use error_stack::{report, Result, ResultExt};
use hyperlane_ton_api::{Domain, HookMetadata, Message, TokenStandard, MAILBOX_VERSION};
use interchain_gas_paymaster::contract::gas_limit;
use interchain_gas_paymaster::InterchainGasPaymaster;
use protocol_fee_hook::ProtocolFeeHook;
use ton_sandbox::{Blockchain, SendResult};
use ton_utils::{keccak256, Address, ArcCell, B256};
use token_router::Token;
use tracing::info;

use crate::config::{poll_until, DeploymentConfig};
use crate::contract::{Contract, Error};
use crate::interchain_gas_paymaster_contract::InterchainGasPaymasterContract;
use crate::jetton_contract::{JettonMinterContract, JettonWalletContract};
use crate::mailbox_contract::MailboxContract;
use crate::merkle_tree_hook_contract::MerkleTreeHookContract;
use crate::multisig_ism_contract::MultisigIsmContract;
use crate::protocol_fee_hook_contract::ProtocolFeeHookContract;
use crate::token_router_contract::TokenRouterContract;
use crate::validator::{multisig_metadata, Validator};
use crate::validator_announce_contract::ValidatorAnnounceContract;

/// Domain the inbound test messages come from.
pub const REMOTE_DOMAIN: Domain = 4321;
/// Merkle tree hook of the remote mailbox, as named in validator checkpoints.
pub const REMOTE_MERKLE_HOOK: B256 = B256::repeat_byte(0x4d);
/// What a relayer attaches to PROCESS to carry the message through every hop.
pub const PROCESS_VALUE: u128 = 100_000_000;

const TREASURY_BALANCE: u128 = 1_000_000_000_000_000_000;

/// A mailbox with its hooks and security module, all owned by the deployer. The required hook is
/// the gas paymaster, the default hook the merkle tree hook and the default ISM the multisig ISM.
pub struct Protocol {
    pub chain: Blockchain,
    pub config: DeploymentConfig,
    pub deployer: Address,
    pub relayer: Address,
    pub mailbox: MailboxContract,
    pub merkle_tree_hook: MerkleTreeHookContract,
    pub igp: InterchainGasPaymasterContract,
    pub protocol_fee_hook: ProtocolFeeHookContract,
    pub multisig_ism: MultisigIsmContract,
    pub validator_announce: ValidatorAnnounceContract,
}

/// The token side of a warp route.
#[derive(Clone, Copy, Debug)]
pub enum WarpToken {
    Native,
    /// The router is the admin of the minter.
    Synthetic { minter: JettonMinterContract },
    /// The router holds the escrowed jettons in its own wallet of an existing token.
    Collateral {
        minter: JettonMinterContract,
        escrow: JettonWalletContract,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct WarpRoute {
    pub router: TokenRouterContract,
    pub token: WarpToken,
}

impl WarpRoute {
    /// Account hash remote routers enroll this route under.
    pub fn router_hash(&self) -> B256 {
        self.router.contract_addr.hash
    }
}

impl Protocol {
    pub fn deploy(config: DeploymentConfig) -> Result<Self, Error> {
        let mut chain = Blockchain::new();
        let deployer = chain.treasury("deployer", TREASURY_BALANCE);
        let relayer = chain.treasury("relayer", TREASURY_BALANCE);
        let mailbox_address = Address::derived("mailbox");

        let merkle_tree_hook = MerkleTreeHookContract::instantiate_contract(
            &mut chain,
            deployer,
            "merkle_tree_hook",
            merkle_tree_hook::msg::InstantiateMsg {
                owner: deployer,
                mailbox: mailbox_address,
            },
        )?;
        let igp = InterchainGasPaymasterContract::instantiate_contract(
            &mut chain,
            deployer,
            "interchain_gas_paymaster",
            interchain_gas_paymaster::msg::InstantiateMsg {
                owner: deployer,
                beneficiary: deployer,
                gas_configs: config.gas_configs(),
            },
        )?;
        let protocol_fee_hook = ProtocolFeeHookContract::instantiate_contract(
            &mut chain,
            deployer,
            "protocol_fee_hook",
            protocol_fee_hook::msg::InstantiateMsg {
                owner: deployer,
                beneficiary: deployer,
                protocol_fee: u128::from(config.protocol_fee.protocol_fee),
                max_protocol_fee: u128::from(config.protocol_fee.max_protocol_fee),
            },
        )?;
        let multisig_ism = MultisigIsmContract::instantiate_contract(
            &mut chain,
            deployer,
            "multisig_ism",
            deployer,
            &config.validator_sets,
        )?;
        let mailbox = MailboxContract::instantiate_contract(
            &mut chain,
            deployer,
            "mailbox",
            mailbox::msg::InstantiateMsg {
                owner: deployer,
                version: config.mailbox.version,
                local_domain: config.mailbox.local_domain,
                initial_nonce: config.mailbox.initial_nonce,
                default_ism: multisig_ism.contract_addr,
                default_hook: merkle_tree_hook.contract_addr,
                required_hook: igp.contract_addr,
            },
        )?;
        let validator_announce = ValidatorAnnounceContract::instantiate_contract(
            &mut chain,
            deployer,
            "validator_announce",
            validator_announce::msg::InstantiateMsg {
                mailbox: mailbox.contract_addr,
                local_domain: config.mailbox.local_domain,
            },
        )?;

        info!(
            mailbox = %mailbox.contract_addr,
            local_domain = config.mailbox.local_domain,
            "protocol deployed"
        );

        Ok(Protocol {
            chain,
            config,
            deployer,
            relayer,
            mailbox,
            merkle_tree_hook,
            igp,
            protocol_fee_hook,
            multisig_ism,
            validator_announce,
        })
    }

    pub fn local_domain(&self) -> Domain {
        self.config.mailbox.local_domain
    }

    /// A funded wallet for a test actor.
    pub fn account(&mut self, name: &str) -> Address {
        self.chain.treasury(name, TREASURY_BALANCE)
    }

    /// Deploys a warp route of the configured standard. Routers start without remote routers.
    pub fn deploy_warp_route(&mut self, label: &str) -> Result<WarpRoute, Error> {
        let router_address = Address::derived(label);

        let token = match self.config.warp_route.standard {
            TokenStandard::Native => WarpToken::Native,
            TokenStandard::Synthetic => WarpToken::Synthetic {
                minter: JettonMinterContract::instantiate_contract(
                    &mut self.chain,
                    self.deployer,
                    &format!("{label}_synthetic"),
                    router_address,
                )?,
            },
            TokenStandard::Collateral => {
                let minter = JettonMinterContract::instantiate_contract(
                    &mut self.chain,
                    self.deployer,
                    &format!("{label}_collateral"),
                    self.deployer,
                )?;

                WarpToken::Collateral {
                    minter,
                    escrow: minter.wallet(router_address),
                }
            }
        };
        let router_token = match token {
            WarpToken::Native => Token::Native,
            WarpToken::Synthetic { minter } => Token::Synthetic {
                minter: minter.contract_addr,
            },
            WarpToken::Collateral { minter, escrow } => Token::Collateral {
                minter: minter.contract_addr,
                wallet: escrow.contract_addr,
            },
        };

        let router = TokenRouterContract::instantiate_contract(
            &mut self.chain,
            self.deployer,
            label,
            token_router::msg::InstantiateMsg {
                owner: self.deployer,
                mailbox: self.mailbox.contract_addr,
                token: router_token,
                amount_encoding: self.config.warp_route.amount_encoding,
                ism: None,
                routers: Default::default(),
            },
        )?;

        info!(router = %router.contract_addr, standard = %router_token.standard(), "warp route deployed");

        Ok(WarpRoute { router, token })
    }

    /// Enrolls `remote` as the router of `domain` and waits until the mapping is visible.
    pub fn enroll_remote_router(
        &mut self,
        route: &WarpRoute,
        domain: Domain,
        remote: B256,
    ) -> Result<(), Error> {
        let result = route
            .router
            .enroll_remote_router(&mut self.chain, self.deployer, domain, remote)?;
        if !result.all_succeeded() {
            return Err(report!(Error::Chain)).attach_printable_lazy(|| format!("SET_ROUTER failed:\n{result}"));
        }

        let chain = &self.chain;
        poll_until(&self.config.retry, || {
            route
                .router
                .query(chain)
                .ok()?
                .router(domain)
                .filter(|enrolled| *enrolled == remote)
        })
        .map(|_| ())
    }

    /// What a dispatch to `destination` must attach for the mailbox's required and default
    /// hooks.
    pub fn quote_dispatch(
        &self,
        destination: Domain,
        metadata: Option<&HookMetadata>,
    ) -> Result<u128, Error> {
        let mailbox = self.mailbox.query(&self.chain)?;
        let metadata = metadata.cloned().unwrap_or_default();

        [mailbox.required_hook(), mailbox.default_hook()]
            .into_iter()
            .try_fold(0u128, |total, hook| {
                let quote = self.quote_hook(hook, destination, &metadata)?;
                total
                    .checked_add(quote)
                    .ok_or_else(|| report!(Error::Quote))
            })
    }

    fn quote_hook(
        &self,
        hook: Address,
        destination: Domain,
        metadata: &HookMetadata,
    ) -> Result<u128, Error> {
        if let Some(igp) = self.chain.contract::<InterchainGasPaymaster>(&hook) {
            return gas_limit(metadata)
                .and_then(|gas| igp.quote_gas_payment(destination, gas))
                .change_context(Error::Quote);
        }

        if let Some(fee_hook) = self.chain.contract::<ProtocolFeeHook>(&hook) {
            return Ok(fee_hook.protocol_fee());
        }

        if let Some(aggregation) = self.chain.contract::<AggregationHook>(&hook) {
            return aggregation.hooks().iter().try_fold(0u128, |total, sub_hook| {
                let quote = self.quote_hook(*sub_hook, destination, metadata)?;
                total
                    .checked_add(quote)
                    .ok_or_else(|| report!(Error::Quote))
            });
        }

        // the merkle tree hook is free
        Ok(0)
    }

    /// An inbound message from the remote domain, addressed to this mailbox's domain.
    pub fn inbound_message(&self, nonce: u32, sender: B256, recipient: B256, body: ArcCell) -> Message {
        Message {
            version: MAILBOX_VERSION,
            nonce,
            origin: REMOTE_DOMAIN,
            sender,
            destination: self.local_domain(),
            recipient,
            body,
        }
    }

    /// Relays `message` with a checkpoint signed by `signers`.
    pub fn relay(&mut self, message: &Message, signers: &[&Validator]) -> Result<SendResult, Error> {
        let root = keccak256(message.id());
        let metadata = multisig_metadata(message, signers, REMOTE_MERKLE_HOOK, root, message.nonce)?;
        let relayer = self.relayer;

        self.mailbox
            .process(&mut self.chain, relayer, message.clone(), metadata, PROCESS_VALUE)
    }
}
