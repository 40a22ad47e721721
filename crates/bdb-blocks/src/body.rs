//! Block bodies. Each fork adds fields after the previous fork's fields.

use bdb_codec::{Decode, DecodeError, Encode};
use bdb_config::ForkName;
use bdb_crypto::TreeHash;
use bdb_types::{Root, Signature};

use crate::containers::{
    Eth1Data, ExecutionPayload, SignedVoluntaryExit, SyncAggregate, MAX_VOLUNTARY_EXITS,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Phase0Body {
    pub randao_reveal: Signature,
    pub eth1_data: Eth1Data,
    pub graffiti: Root,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

impl_container!(Phase0Body {
    randao_reveal: Signature,
    eth1_data: Eth1Data,
    graffiti: Root,
    voluntary_exits: Vec<SignedVoluntaryExit> [max = MAX_VOLUNTARY_EXITS],
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AltairBody {
    pub randao_reveal: Signature,
    pub eth1_data: Eth1Data,
    pub graffiti: Root,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
    pub sync_aggregate: SyncAggregate,
}

impl_container!(AltairBody {
    randao_reveal: Signature,
    eth1_data: Eth1Data,
    graffiti: Root,
    voluntary_exits: Vec<SignedVoluntaryExit> [max = MAX_VOLUNTARY_EXITS],
    sync_aggregate: SyncAggregate,
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BellatrixBody {
    pub randao_reveal: Signature,
    pub eth1_data: Eth1Data,
    pub graffiti: Root,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
    pub sync_aggregate: SyncAggregate,
    pub execution_payload: ExecutionPayload,
}

impl_container!(BellatrixBody {
    randao_reveal: Signature,
    eth1_data: Eth1Data,
    graffiti: Root,
    voluntary_exits: Vec<SignedVoluntaryExit> [max = MAX_VOLUNTARY_EXITS],
    sync_aggregate: SyncAggregate,
    execution_payload: ExecutionPayload,
});

/// A block body of any known fork.
///
/// The variant is the body's fork. Decoding needs the fork up front because
/// the bytes carry no version tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BeaconBlockBody {
    Phase0(Phase0Body),
    Altair(AltairBody),
    Bellatrix(BellatrixBody),
}

impl BeaconBlockBody {
    /// An all-default body laid out for `fork`.
    pub fn empty(fork: ForkName) -> Self {
        match fork {
            ForkName::Phase0 => Self::Phase0(Phase0Body::default()),
            ForkName::Altair => Self::Altair(AltairBody::default()),
            ForkName::Bellatrix => Self::Bellatrix(BellatrixBody::default()),
        }
    }

    pub fn fork(&self) -> ForkName {
        match self {
            Self::Phase0(_) => ForkName::Phase0,
            Self::Altair(_) => ForkName::Altair,
            Self::Bellatrix(_) => ForkName::Bellatrix,
        }
    }

    pub fn decode_for(fork: ForkName, bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(match fork {
            ForkName::Phase0 => Self::Phase0(Phase0Body::decode(bytes)?),
            ForkName::Altair => Self::Altair(AltairBody::decode(bytes)?),
            ForkName::Bellatrix => Self::Bellatrix(BellatrixBody::decode(bytes)?),
        })
    }

    pub fn voluntary_exits(&self) -> &[SignedVoluntaryExit] {
        match self {
            Self::Phase0(b) => &b.voluntary_exits,
            Self::Altair(b) => &b.voluntary_exits,
            Self::Bellatrix(b) => &b.voluntary_exits,
        }
    }

    pub fn graffiti(&self) -> &Root {
        match self {
            Self::Phase0(b) => &b.graffiti,
            Self::Altair(b) => &b.graffiti,
            Self::Bellatrix(b) => &b.graffiti,
        }
    }

    pub fn sync_aggregate(&self) -> Option<&SyncAggregate> {
        match self {
            Self::Phase0(_) => None,
            Self::Altair(b) => Some(&b.sync_aggregate),
            Self::Bellatrix(b) => Some(&b.sync_aggregate),
        }
    }

    pub fn execution_payload(&self) -> Option<&ExecutionPayload> {
        match self {
            Self::Bellatrix(b) => Some(&b.execution_payload),
            _ => None,
        }
    }
}

impl Encode for BeaconBlockBody {
    fn is_fixed_len() -> bool {
        false
    }

    fn encoded_len(&self) -> usize {
        match self {
            Self::Phase0(b) => b.encoded_len(),
            Self::Altair(b) => b.encoded_len(),
            Self::Bellatrix(b) => b.encoded_len(),
        }
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Phase0(b) => b.encode_into(buf),
            Self::Altair(b) => b.encode_into(buf),
            Self::Bellatrix(b) => b.encode_into(buf),
        }
    }
}

impl TreeHash for BeaconBlockBody {
    fn tree_hash_root(&self) -> Root {
        match self {
            Self::Phase0(b) => b.tree_hash_root(),
            Self::Altair(b) => b.tree_hash_root(),
            Self::Bellatrix(b) => b.tree_hash_root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_parts_grow_per_fork() {
        // randao 96 + eth1 72 + graffiti 32 + exits offset 4
        assert_eq!(Phase0Body::default().encode().len(), 204);
        assert_eq!(AltairBody::default().encode().len(), 204 + 160);
        assert_eq!(BellatrixBody::default().encode().len(), 364 + 4 + 124);
    }

    #[test]
    fn body_from_one_fork_rejected_by_another() {
        let bytes = Phase0Body::default().encode();
        assert!(BeaconBlockBody::decode_for(ForkName::Altair, &bytes).is_err());
        assert!(BeaconBlockBody::decode_for(ForkName::Bellatrix, &bytes).is_err());

        let bytes = AltairBody::default().encode();
        assert!(BeaconBlockBody::decode_for(ForkName::Phase0, &bytes).is_err());
    }

    #[test]
    fn empty_matches_fork() {
        for fork in ForkName::ALL {
            let body = BeaconBlockBody::empty(fork);
            assert_eq!(body.fork(), fork);
            let decoded = BeaconBlockBody::decode_for(fork, &body.encode()).unwrap();
            assert_eq!(decoded, body);
        }
        assert!(BeaconBlockBody::empty(ForkName::Phase0).sync_aggregate().is_none());
        assert!(BeaconBlockBody::empty(ForkName::Bellatrix).execution_payload().is_some());
    }

    #[test]
    fn fork_changes_root() {
        let p0 = BeaconBlockBody::empty(ForkName::Phase0).tree_hash_root();
        let alt = BeaconBlockBody::empty(ForkName::Altair).tree_hash_root();
        assert_ne!(p0, alt);
    }
}
