//! The per-network configuration table and the resolver that reads it.
//!
//! Every network-specific constant used by the deployment lives in [`PROFILES`].
//! The asymmetries between networks (e.g. the staging network rehearsing
//! production lock timing while the local chain uses short locks) are business
//! decisions, so they are written out literally rather than derived.

use alloy_primitives::{address, Address, U256};
use tracing::warn;

use crate::{
    constants::{BATCH_LENGTH_BLOCKS, SECONDS_PER_DAY, SECONDS_PER_WEEK, WEI_PER_TOKEN},
    errors::ProfileError,
    types::{
        AccountRef, ContractKind, NetworkId, NetworkProfile, PoolRole, PoolSource, Stage2Pool,
        Stage2Profile,
    },
};

/// The COS-ETH pair on mainnet
const MAINNET_COS_PAIR: Address = address!("7c0df3b6b8498f4634c8b1b687e512971df74aae");
/// The YFI-ETH pair on mainnet
const MAINNET_YFI_PAIR: Address = address!("2fdbadf3c4d5a8666bc06645b8358ab803996e28");
/// The UNI-ETH pair on mainnet
const MAINNET_UNI_PAIR: Address = address!("d3d2e2692501a5c9ca623199d38826e513033a17");
/// The reward token's own pair on mainnet
const MAINNET_NATIVE_PAIR: Address = address!("7186141bd5b90576019de6988b295a2210565618");

/// The stage 2 pools on networks without live pairs, all backed by mocks
const MOCK_STAGE2_POOLS: [Stage2Pool; 4] = [
    Stage2Pool {
        role: PoolRole::ExternalPair,
        source: PoolSource::Mock(ContractKind::MockLpToken),
        weight: 1,
    },
    Stage2Pool {
        role: PoolRole::TokenA,
        source: PoolSource::Mock(ContractKind::MockLpTokenA),
        weight: 1,
    },
    Stage2Pool {
        role: PoolRole::TokenB,
        source: PoolSource::Mock(ContractKind::MockLpTokenB),
        weight: 1,
    },
    Stage2Pool {
        role: PoolRole::NativePair,
        source: PoolSource::Mock(ContractKind::MockNativePair),
        weight: 3,
    },
];

/// A row of the configuration table
#[derive(Clone, Debug)]
struct ProfileEntry {
    /// The network the row configures
    network: NetworkId,
    /// The stage 1 emission rate, in base units per block
    emission_rate_wei: u128,
    /// The first rewarded block of stage 1
    start_block: u64,
    /// The last rewarded block of stage 1
    end_block: u64,
    /// See [`NetworkProfile::lock_duration_1`]
    lock_duration_1: u64,
    /// See [`NetworkProfile::lock_duration_2`]
    lock_duration_2: u64,
    /// The beneficiary of the team warm-up lock
    dev_team_beneficiary: AccountRef,
    /// The beneficiary of the reserve locks
    beneficiary: AccountRef,
    /// The live LP token registered in stage 1, if any
    external_pool_token: Option<Address>,
    /// The stage 2 configuration
    stage2: Stage2Profile,
}

/// The configuration table, one row per known network
const PROFILES: [ProfileEntry; 3] = [
    ProfileEntry {
        network: NetworkId::Production,
        emission_rate_wei: WEI_PER_TOKEN / 100,
        start_block: 10_965_050,
        end_block: 10_965_050 + BATCH_LENGTH_BLOCKS,
        lock_duration_1: 2 * SECONDS_PER_WEEK,
        lock_duration_2: 6 * SECONDS_PER_WEEK,
        dev_team_beneficiary: AccountRef::Fixed(address!(
            "f193198fde76ca3f25b3b263d98ea07bda6267e9"
        )),
        beneficiary: AccountRef::Fixed(address!("179047339a1c38f8a7820d89b401fd32179158a0")),
        external_pool_token: Some(MAINNET_COS_PAIR),
        stage2: Stage2Profile {
            batch_start_block: 11_066_600,
            lock_duration: 14 * SECONDS_PER_DAY,
            top_up_tokens: 3_430,
            pools: [
                Stage2Pool {
                    role: PoolRole::ExternalPair,
                    source: PoolSource::Fixed(MAINNET_COS_PAIR),
                    weight: 1,
                },
                Stage2Pool {
                    role: PoolRole::TokenA,
                    source: PoolSource::Fixed(MAINNET_YFI_PAIR),
                    weight: 1,
                },
                Stage2Pool {
                    role: PoolRole::TokenB,
                    source: PoolSource::Fixed(MAINNET_UNI_PAIR),
                    weight: 1,
                },
                Stage2Pool {
                    role: PoolRole::NativePair,
                    source: PoolSource::Fixed(MAINNET_NATIVE_PAIR),
                    weight: 3,
                },
            ],
        },
    },
    ProfileEntry {
        network: NetworkId::Staging,
        emission_rate_wei: WEI_PER_TOKEN / 100,
        start_block: 8_784_400,
        end_block: 8_840_500,
        lock_duration_1: 2 * SECONDS_PER_WEEK,
        lock_duration_2: 6 * SECONDS_PER_WEEK,
        dev_team_beneficiary: AccountRef::Fixed(address!(
            "2a9feeb2c33e7a181471c318694a8aaebe3a53ed"
        )),
        beneficiary: AccountRef::Deployer,
        external_pool_token: None,
        stage2: Stage2Profile {
            batch_start_block: 8_884_600,
            lock_duration: 14 * SECONDS_PER_DAY,
            top_up_tokens: 100,
            pools: MOCK_STAGE2_POOLS,
        },
    },
    ProfileEntry {
        network: NetworkId::Local,
        emission_rate_wei: WEI_PER_TOKEN,
        start_block: 50,
        end_block: 1_000,
        lock_duration_1: 300,
        lock_duration_2: 420,
        dev_team_beneficiary: AccountRef::Deployer,
        beneficiary: AccountRef::Deployer,
        external_pool_token: None,
        stage2: Stage2Profile {
            batch_start_block: 100,
            lock_duration: 300,
            top_up_tokens: 3_430,
            pools: MOCK_STAGE2_POOLS,
        },
    },
];

impl ProfileEntry {
    /// Build the profile described by this row
    fn to_profile(&self) -> NetworkProfile {
        NetworkProfile {
            network: self.network,
            emission_rate_per_block: U256::from(self.emission_rate_wei),
            start_block: self.start_block,
            end_block: self.end_block,
            lock_duration_1: self.lock_duration_1,
            lock_duration_2: self.lock_duration_2,
            dev_team_beneficiary: self.dev_team_beneficiary,
            beneficiary: self.beneficiary,
            external_pool_token: self.external_pool_token,
            stage2: self.stage2.clone(),
        }
    }
}

/// Get the profile of a known network
pub fn profile_for(network: NetworkId) -> NetworkProfile {
    PROFILES
        .iter()
        .find(|entry| entry.network == network)
        .map(ProfileEntry::to_profile)
        // Every `NetworkId` has a row in the table
        .unwrap_or_else(|| unreachable!("no profile for network {network}"))
}

/// Resolve a network identifier to its profile.
///
/// Unknown identifiers fall back to the local profile.
pub fn resolve(network_id: &str) -> NetworkProfile {
    match NetworkId::from_name(network_id) {
        Some(network) => profile_for(network),
        None => {
            warn!(
                "unknown network `{}`, falling back to the `{}` profile",
                network_id,
                NetworkId::Local
            );
            profile_for(NetworkId::Local)
        }
    }
}

/// Resolve a network identifier to its profile, rejecting unknown identifiers
pub fn resolve_strict(network_id: &str) -> Result<NetworkProfile, ProfileError> {
    NetworkId::from_name(network_id)
        .map(profile_for)
        .ok_or_else(|| ProfileError::UnknownNetwork(network_id.to_string()))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::{profile_for, resolve, resolve_strict, PROFILES};
    use crate::{
        errors::ProfileError,
        types::{AccountRef, NetworkId, PoolRole, PoolSource},
    };

    #[test]
    fn test_every_network_has_one_row() {
        for network in NetworkId::ALL {
            let rows = PROFILES.iter().filter(|e| e.network == network).count();
            assert_eq!(rows, 1, "network {network} must have exactly one profile");
        }
    }

    #[test]
    fn test_start_block_before_end_block() {
        for network in NetworkId::ALL {
            let profile = profile_for(network);
            assert!(profile.start_block < profile.end_block);
            assert!(profile.lock_duration_1 > 0);
            assert!(profile.lock_duration_2 > 0);
        }
    }

    #[test]
    fn test_resolve_is_pure() {
        for name in ["live", "ropsten", "development", "something-else"] {
            assert_eq!(resolve(name), resolve(name));
        }
    }

    #[test]
    fn test_resolve_aliases() {
        assert_eq!(resolve("mainnet").network, NetworkId::Production);
        assert_eq!(resolve("LIVE").network, NetworkId::Production);
        assert_eq!(resolve("local").network, NetworkId::Local);
        assert_eq!(resolve("ropsten").network, NetworkId::Staging);
    }

    #[test]
    fn test_unknown_network_falls_back_to_local() {
        let profile = resolve("goerli");
        assert_eq!(profile, profile_for(NetworkId::Local));
    }

    #[test]
    fn test_strict_resolution_rejects_unknown_network() {
        assert_eq!(
            resolve_strict("goerli"),
            Err(ProfileError::UnknownNetwork("goerli".to_string()))
        );
        assert!(resolve_strict("live").is_ok());
    }

    #[test]
    fn test_only_production_has_external_pool_token() {
        assert!(profile_for(NetworkId::Production).external_pool_token.is_some());
        assert!(profile_for(NetworkId::Staging).external_pool_token.is_none());
        assert!(profile_for(NetworkId::Local).external_pool_token.is_none());
    }

    #[test]
    fn test_production_end_block() {
        let profile = profile_for(NetworkId::Production);
        assert_eq!(profile.end_block - profile.start_block, 95_000);
        assert_ne!(profile.beneficiary, AccountRef::Deployer);
    }

    #[test]
    fn test_stage2_pool_order_and_weights() {
        for network in NetworkId::ALL {
            let pools = profile_for(network).stage2.pools;
            let roles: Vec<PoolRole> = pools.iter().map(|p| p.role).collect();
            let weights: Vec<u64> = pools.iter().map(|p| p.weight).collect();
            assert_eq!(
                roles,
                vec![
                    PoolRole::ExternalPair,
                    PoolRole::TokenA,
                    PoolRole::TokenB,
                    PoolRole::NativePair
                ]
            );
            assert_eq!(weights, vec![1, 1, 1, 3]);
        }
    }

    #[test]
    fn test_production_stage2_pools_are_fixed() {
        let profile = profile_for(NetworkId::Production);
        let external = profile.external_pool_token.unwrap();
        assert_eq!(profile.stage2.pools[0].source, PoolSource::Fixed(external));
        for pool in profile.stage2.pools {
            match pool.source {
                PoolSource::Fixed(addr) => assert_ne!(addr, Address::ZERO),
                PoolSource::Mock(kind) => panic!("unexpected mock {kind} on production"),
            }
        }
    }

    #[test]
    fn test_stage2_lock_timing() {
        let day = 86_400;
        assert_eq!(profile_for(NetworkId::Production).stage2.lock_duration, 14 * day);
        assert_eq!(profile_for(NetworkId::Staging).stage2.lock_duration, 14 * day);
        assert_eq!(profile_for(NetworkId::Local).stage2.lock_duration, 300);
    }
}
