//! Hard-fork consistency checks the header verifier delegates to.

use crate::chain_params::{ChainConfig, DAO_FORK_EXTRA, DAO_FORK_EXTRA_RANGE};
use crate::{ConsensusError, ConsensusResult};
use genchain_types::Header;

/// Check a header's extra data against the configured DAO fork side.
///
/// Inside the enforcement window, pro-fork chains require the marker extra
/// data and no-fork chains reject it; outside the window anything goes.
pub fn verify_dao_extra(config: &ChainConfig, header: &Header) -> ConsensusResult<()> {
    let fork = match config.dao_fork_block {
        Some(fork) => fork,
        None => return Ok(()),
    };
    let limit = fork.saturating_add(DAO_FORK_EXTRA_RANGE);
    if header.number < fork || header.number >= limit {
        return Ok(());
    }

    let marked = header.extra.as_slice() == DAO_FORK_EXTRA;
    if config.dao_fork_support != marked {
        return Err(ConsensusError::DaoExtraMismatch {
            number: header.number,
        });
    }
    Ok(())
}

/// Check a header against the pinned canonical fork hashes. Uncles are
/// exempt; they are non-canonical by definition.
pub fn verify_fork_hashes(
    config: &ChainConfig,
    header: &Header,
    uncle: bool,
) -> ConsensusResult<()> {
    if uncle {
        return Ok(());
    }
    if let Some(want) = config.fork_hashes.get(&header.number) {
        let have = header.hash();
        if have != *want {
            return Err(ConsensusError::ForkHashMismatch {
                number: header.number,
                have: have.to_hex(),
                want: want.to_hex(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dao_config(support: bool) -> ChainConfig {
        ChainConfig {
            dao_fork_block: Some(100),
            dao_fork_support: support,
            ..ChainConfig::default()
        }
    }

    fn header_with_extra(number: u64, extra: &[u8]) -> Header {
        Header {
            number,
            extra: extra.to_vec(),
            ..Header::default()
        }
    }

    #[test]
    fn pro_fork_side_requires_the_marker() {
        let config = dao_config(true);
        assert!(verify_dao_extra(&config, &header_with_extra(100, DAO_FORK_EXTRA)).is_ok());
        assert_eq!(
            verify_dao_extra(&config, &header_with_extra(105, b"")),
            Err(ConsensusError::DaoExtraMismatch { number: 105 })
        );
    }

    #[test]
    fn no_fork_side_rejects_the_marker() {
        let config = dao_config(false);
        assert!(verify_dao_extra(&config, &header_with_extra(103, b"")).is_ok());
        assert!(verify_dao_extra(&config, &header_with_extra(103, DAO_FORK_EXTRA)).is_err());
    }

    #[test]
    fn enforcement_stops_outside_the_window() {
        let config = dao_config(true);
        assert!(verify_dao_extra(&config, &header_with_extra(99, b"")).is_ok());
        assert!(verify_dao_extra(&config, &header_with_extra(110, b"")).is_ok());
    }

    #[test]
    fn unset_dao_fork_checks_nothing() {
        let config = ChainConfig::default();
        assert!(verify_dao_extra(&config, &header_with_extra(100, b"anything")).is_ok());
    }

    #[test]
    fn pinned_hashes_bind_canonical_headers_only() {
        let header = Header {
            number: 7,
            ..Header::default()
        };
        let mut config = ChainConfig::default();
        config.fork_hashes.insert(7, header.hash());
        assert!(verify_fork_hashes(&config, &header, false).is_ok());

        config.fork_hashes.insert(7, genchain_types::Hash32([1; 32]));
        assert!(verify_fork_hashes(&config, &header, false).is_err());
        assert!(verify_fork_hashes(&config, &header, true).is_ok());
    }
}
